//! Curve program instruction builders: buy, sell, and the helper instructions a trade
//! transaction carries (compute budget, holding-account creation).
//!
//! Payload layout: 8-byte discriminator, then Borsh-encoded args (u64 little-endian).
//!
//! Instructions:
//!   buy  = [102, 6, 61, 18, 1, 218, 235, 234] ++ amount ++ max_sol_cost
//!   sell = [51, 230, 133, 164, 1, 127, 131, 173] ++ amount ++ min_sol_output

use borsh::BorshSerialize;
use solana_sdk::{
    compute_budget::ComputeBudgetInstruction,
    instruction::{AccountMeta, Instruction},
    pubkey::Pubkey,
};

use crate::config::EngineConfig;
use crate::constants::{BUY_DISCRIMINATOR, CREATE_IDEMPOTENT_TAG, SELL_DISCRIMINATOR};
use crate::error::EngineResult;
use crate::pda::AddressDeriver;

// ── Param Structs (exact Borsh match to program) ────────────────────────────

#[derive(BorshSerialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuyArgs {
    /// Tokens to receive: the slippage-bounded minimum.
    pub amount: u64,
    /// Most lamports the program may take: the caller's input.
    pub max_sol_cost: u64,
}

#[derive(BorshSerialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SellArgs {
    /// Tokens to sell.
    pub amount: u64,
    pub min_sol_output: u64,
}

/// Compute-budget settings attached to a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PriorityFee {
    /// Micro-lamports per compute unit. Zero disables the priority fee.
    pub unit_price: u64,
    pub unit_limit: Option<u32>,
}

impl PriorityFee {
    pub fn new(unit_price: u64) -> Self {
        Self {
            unit_price,
            unit_limit: None,
        }
    }

    pub fn with_limit(mut self, unit_limit: u32) -> Self {
        self.unit_limit = Some(unit_limit);
        self
    }

    pub fn is_zero(&self) -> bool {
        self.unit_price == 0
    }
}

fn encode_data<A: BorshSerialize>(discriminator: [u8; 8], args: &A) -> EngineResult<Vec<u8>> {
    let mut data = Vec::with_capacity(8 + 16);
    data.extend_from_slice(&discriminator);
    args.serialize(&mut data)?;
    Ok(data)
}

/// Builds curve program instructions for the programs and accounts in [`EngineConfig`].
#[derive(Debug, Clone)]
pub struct InstructionEncoder {
    program_id: Pubkey,
    global_account: Pubkey,
    fee_recipient: Pubkey,
    event_authority: Pubkey,
    system_program: Pubkey,
    token_program: Pubkey,
    associated_token_program: Pubkey,
    rent_sysvar: Pubkey,
    default_compute_unit_limit: u32,
    deriver: AddressDeriver,
}

impl InstructionEncoder {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            program_id: config.program_id,
            global_account: config.global_account,
            fee_recipient: config.fee_recipient,
            event_authority: config.event_authority,
            system_program: config.system_program,
            token_program: config.token_program,
            associated_token_program: config.associated_token_program,
            rent_sysvar: config.rent_sysvar,
            default_compute_unit_limit: config.default_compute_unit_limit,
            deriver: AddressDeriver::new(config),
        }
    }

    /// Buy tokens with at most `input_base` lamports, receiving `min_output_quote` tokens.
    ///
    /// Accounts:
    ///   0.  `[]` global config
    ///   1.  `[writable]` fee_recipient
    ///   2.  `[]` mint
    ///   3.  `[writable]` bonding_curve PDA
    ///   4.  `[writable]` bonding_curve holding account (ATA)
    ///   5.  `[writable]` trader holding account (ATA)
    ///   6.  `[signer, writable]` trader
    ///   7.  `[]` system_program
    ///   8.  `[]` token_program
    ///   9.  `[]` rent sysvar
    ///   10. `[]` event_authority
    ///   11. `[]` curve program
    pub fn encode_buy(
        &self,
        trader: &Pubkey,
        token_id: &Pubkey,
        input_base: u64,
        min_output_quote: u64,
    ) -> EngineResult<Instruction> {
        let addresses = self.deriver.derive_addresses(token_id, trader)?;
        let args = BuyArgs {
            amount: min_output_quote,
            max_sol_cost: input_base,
        };

        Ok(Instruction {
            program_id: self.program_id,
            accounts: vec![
                AccountMeta::new_readonly(self.global_account, false),
                AccountMeta::new(self.fee_recipient, false),
                AccountMeta::new_readonly(*token_id, false),
                AccountMeta::new(addresses.curve_account, false),
                AccountMeta::new(addresses.curve_holding_account, false),
                AccountMeta::new(addresses.trader_holding_account, false),
                AccountMeta::new(*trader, true),
                AccountMeta::new_readonly(self.system_program, false),
                AccountMeta::new_readonly(self.token_program, false),
                AccountMeta::new_readonly(self.rent_sysvar, false),
                AccountMeta::new_readonly(self.event_authority, false),
                AccountMeta::new_readonly(self.program_id, false),
            ],
            data: encode_data(BUY_DISCRIMINATOR, &args)?,
        })
    }

    /// Sell `input_quote` tokens for at least `min_output_base` lamports.
    ///
    /// Accounts:
    ///   0.  `[]` global config
    ///   1.  `[writable]` fee_recipient
    ///   2.  `[]` mint
    ///   3.  `[writable]` bonding_curve PDA
    ///   4.  `[writable]` bonding_curve holding account (ATA)
    ///   5.  `[writable]` trader holding account (ATA)
    ///   6.  `[signer, writable]` trader
    ///   7.  `[]` system_program
    ///   8.  `[]` associated_token_program
    ///   9.  `[]` token_program
    ///   10. `[]` event_authority
    ///   11. `[]` curve program
    pub fn encode_sell(
        &self,
        trader: &Pubkey,
        token_id: &Pubkey,
        input_quote: u64,
        min_output_base: u64,
    ) -> EngineResult<Instruction> {
        let addresses = self.deriver.derive_addresses(token_id, trader)?;
        let args = SellArgs {
            amount: input_quote,
            min_sol_output: min_output_base,
        };

        Ok(Instruction {
            program_id: self.program_id,
            accounts: vec![
                AccountMeta::new_readonly(self.global_account, false),
                AccountMeta::new(self.fee_recipient, false),
                AccountMeta::new_readonly(*token_id, false),
                AccountMeta::new(addresses.curve_account, false),
                AccountMeta::new(addresses.curve_holding_account, false),
                AccountMeta::new(addresses.trader_holding_account, false),
                AccountMeta::new(*trader, true),
                AccountMeta::new_readonly(self.system_program, false),
                AccountMeta::new_readonly(self.associated_token_program, false),
                AccountMeta::new_readonly(self.token_program, false),
                AccountMeta::new_readonly(self.event_authority, false),
                AccountMeta::new_readonly(self.program_id, false),
            ],
            data: encode_data(SELL_DISCRIMINATOR, &args)?,
        })
    }

    /// Compute unit limit + price, or nothing for a zero fee.
    pub fn compute_budget_instructions(&self, priority_fee: &PriorityFee) -> Vec<Instruction> {
        if priority_fee.is_zero() {
            return Vec::new();
        }
        let limit = priority_fee
            .unit_limit
            .unwrap_or(self.default_compute_unit_limit);
        vec![
            ComputeBudgetInstruction::set_compute_unit_limit(limit),
            ComputeBudgetInstruction::set_compute_unit_price(priority_fee.unit_price),
        ]
    }

    /// Idempotent creation of `owner`'s holding account for `token_id`, paid by `payer`.
    ///
    /// Accounts:
    ///   0. `[signer, writable]` payer
    ///   1. `[writable]` holding account (ATA)
    ///   2. `[]` owner
    ///   3. `[]` mint
    ///   4. `[]` system_program
    ///   5. `[]` token_program
    pub fn create_holding_account_instruction(
        &self,
        payer: &Pubkey,
        owner: &Pubkey,
        token_id: &Pubkey,
    ) -> EngineResult<Instruction> {
        let holding = self.deriver.derive_holding_account(owner, token_id)?;
        Ok(Instruction {
            program_id: self.associated_token_program,
            accounts: vec![
                AccountMeta::new(*payer, true),
                AccountMeta::new(holding, false),
                AccountMeta::new_readonly(*owner, false),
                AccountMeta::new_readonly(*token_id, false),
                AccountMeta::new_readonly(self.system_program, false),
                AccountMeta::new_readonly(self.token_program, false),
            ],
            data: vec![CREATE_IDEMPOTENT_TAG],
        })
    }
}
