//! Unsigned transaction assembly.
//!
//! Transactions leave the engine with zeroed placeholder signatures: the engine holds
//! no keys, the caller's wallet signs.

use std::sync::Arc;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use log::debug;
use solana_sdk::{
    hash::Hash, instruction::Instruction, message::Message, pubkey::Pubkey,
    transaction::Transaction,
};

use crate::error::EngineResult;
use crate::instruction::{InstructionEncoder, PriorityFee};
use crate::ledger::LedgerClient;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsignedTransaction {
    pub instructions: Vec<Instruction>,
    pub fee_payer: Pubkey,
    pub recent_blockhash: Hash,
    pub transaction: Transaction,
    /// Wire-format bytes (bincode), signatures zeroed.
    pub serialized: Vec<u8>,
}

impl UnsignedTransaction {
    pub fn to_base64(&self) -> String {
        BASE64.encode(&self.serialized)
    }

    /// Same instructions and payer, stamped with another blockhash.
    pub fn with_blockhash(&self, blockhash: Hash) -> EngineResult<Self> {
        assemble(self.instructions.clone(), &self.fee_payer, blockhash)
    }
}

/// Compose `instructions` into a transaction paid by `fee_payer` and valid from `checkpoint`.
pub fn assemble(
    instructions: Vec<Instruction>,
    fee_payer: &Pubkey,
    checkpoint: Hash,
) -> EngineResult<UnsignedTransaction> {
    let message = Message::new_with_blockhash(&instructions, Some(fee_payer), &checkpoint);
    let transaction = Transaction::new_unsigned(message);
    let serialized = bincode::serialize(&transaction)?;

    Ok(UnsignedTransaction {
        instructions,
        fee_payer: *fee_payer,
        recent_blockhash: checkpoint,
        transaction,
        serialized,
    })
}

/// Holding account that must exist before the trade instruction runs.
#[derive(Debug, Clone, Copy)]
pub struct HoldingRequirement {
    pub owner: Pubkey,
    pub token_id: Pubkey,
    pub account: Pubkey,
}

/// Builds trade transactions against live ledger state.
#[derive(Clone)]
pub struct TransactionAssembler {
    ledger: Arc<dyn LedgerClient>,
    encoder: InstructionEncoder,
}

impl TransactionAssembler {
    pub fn new(ledger: Arc<dyn LedgerClient>, encoder: InstructionEncoder) -> Self {
        Self { ledger, encoder }
    }

    /// Instruction order: compute budget (if any), holding-account creation (if the
    /// account is missing), then `trade`. The blockhash is fetched last, per build.
    pub async fn build(
        &self,
        fee_payer: &Pubkey,
        trade: Instruction,
        priority_fee: &PriorityFee,
        holding: Option<HoldingRequirement>,
    ) -> EngineResult<UnsignedTransaction> {
        let mut instructions = self.encoder.compute_budget_instructions(priority_fee);

        if let Some(required) = holding {
            if self.ledger.get_account(&required.account).await?.is_none() {
                debug!(
                    "holding account {} missing, prepending creation for owner {}",
                    required.account, required.owner
                );
                instructions.push(self.encoder.create_holding_account_instruction(
                    fee_payer,
                    &required.owner,
                    &required.token_id,
                )?);
            }
        }

        instructions.push(trade);

        let blockhash = self.ledger.latest_blockhash().await?;
        debug!("stamping transaction with blockhash {}", blockhash);
        assemble(instructions, fee_payer, blockhash)
    }
}
