//! Caller-facing operations: quote, build buy/sell, holding lookup, status check.
//!
//! Every operation is independent. The engine keeps no state between calls beyond the
//! shared ledger handle, so it can be cloned freely across tasks.

use std::sync::Arc;

use log::info;
use solana_sdk::pubkey::Pubkey;
use spl_token::solana_program::program_pack::Pack;

use crate::config::EngineConfig;
use crate::curve::{BondingCurveState, Direction, Quote};
use crate::error::{EngineError, EngineResult};
use crate::instruction::{InstructionEncoder, PriorityFee};
use crate::ledger::{LedgerClient, RpcLedger};
use crate::pda::{parse_pubkey, AddressDeriver, TokenAddressSet};
use crate::simulator::{SimulationOutcome, Simulator};
use crate::status::{StatusChecker, TokenStatus};
use crate::transaction::{HoldingRequirement, TransactionAssembler, UnsignedTransaction};

/// Result of a build operation: the unsigned transaction plus the pricing it encodes.
#[derive(Debug, Clone)]
pub struct BuiltTrade {
    pub quote: Quote,
    /// Slippage-bounded minimum written into the instruction.
    pub min_output: u64,
    pub addresses: TokenAddressSet,
    pub transaction: UnsignedTransaction,
    /// Present when simulation ran. Advisory: a failed simulation still returns the
    /// transaction.
    pub simulation: Option<SimulationOutcome>,
}

impl BuiltTrade {
    pub fn serialized_transaction(&self) -> String {
        self.transaction.to_base64()
    }

    pub fn warning(&self) -> Option<&'static str> {
        self.simulation.as_ref().and_then(|s| s.warning())
    }
}

/// A trader's position in one token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Holding {
    pub holding_account: Pubkey,
    /// `None` when the holding account does not exist.
    pub token_amount: Option<u64>,
    /// Trader's native balance in lamports.
    pub native_balance: u64,
}

#[derive(Clone)]
pub struct TradeEngine {
    config: Arc<EngineConfig>,
    ledger: Arc<dyn LedgerClient>,
    deriver: AddressDeriver,
    encoder: InstructionEncoder,
    assembler: TransactionAssembler,
    simulator: Simulator,
    status: StatusChecker,
}

impl TradeEngine {
    pub fn new(config: EngineConfig, ledger: Arc<dyn LedgerClient>) -> Self {
        let deriver = AddressDeriver::new(&config);
        let encoder = InstructionEncoder::new(&config);
        Self {
            assembler: TransactionAssembler::new(ledger.clone(), encoder.clone()),
            simulator: Simulator::new(ledger.clone()),
            status: StatusChecker::new(ledger.clone(), deriver),
            config: Arc::new(config),
            ledger,
            deriver,
            encoder,
        }
    }

    /// Engine backed by a JSON-RPC node at `config.rpc_url`.
    pub fn connect(config: EngineConfig) -> Self {
        let ledger = RpcLedger::new(Arc::new(config.clone()));
        Self::new(config, Arc::new(ledger))
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn deriver(&self) -> &AddressDeriver {
        &self.deriver
    }

    pub fn encoder(&self) -> &InstructionEncoder {
        &self.encoder
    }

    /// Price `amount` against the token's live curve reserves.
    pub async fn quote(&self, token_id: &str, direction: Direction, amount: u64) -> EngineResult<Quote> {
        let mint = parse_pubkey(token_id)?;
        validate_amount(amount)?;
        let curve = self.load_curve(&mint).await?;
        self.price(&curve, direction, amount)
    }

    pub async fn build_buy(
        &self,
        token_id: &str,
        trader: &str,
        base_amount: u64,
        slippage_bps: u64,
        priority_fee: Option<PriorityFee>,
    ) -> EngineResult<BuiltTrade> {
        let mint = parse_pubkey(token_id)?;
        let trader = parse_pubkey(trader)?;
        self.build_trade(Direction::Buy, &mint, &trader, base_amount, slippage_bps, priority_fee)
            .await
    }

    pub async fn build_sell(
        &self,
        token_id: &str,
        trader: &str,
        quote_amount: u64,
        slippage_bps: u64,
        priority_fee: Option<PriorityFee>,
    ) -> EngineResult<BuiltTrade> {
        let mint = parse_pubkey(token_id)?;
        let trader = parse_pubkey(trader)?;
        self.build_trade(Direction::Sell, &mint, &trader, quote_amount, slippage_bps, priority_fee)
            .await
    }

    /// Sell `percent` (1..=100) of the trader's current token balance.
    pub async fn build_sell_percent(
        &self,
        token_id: &str,
        trader: &str,
        percent: u64,
        slippage_bps: u64,
        priority_fee: Option<PriorityFee>,
    ) -> EngineResult<BuiltTrade> {
        if percent == 0 || percent > 100 {
            return Err(EngineError::InvalidAmount(format!(
                "percentage must be between 1 and 100, got {}",
                percent
            )));
        }
        let mint = parse_pubkey(token_id)?;
        let trader = parse_pubkey(trader)?;

        let holding_account = self.deriver.derive_holding_account(&trader, &mint)?;
        let balance = self
            .token_balance(&holding_account)
            .await?
            .ok_or(EngineError::AccountNotFound(holding_account))?;
        let amount = ((balance as u128) * (percent as u128) / 100) as u64;

        self.build_trade(Direction::Sell, &mint, &trader, amount, slippage_bps, priority_fee)
            .await
    }

    pub async fn holding(&self, token_id: &str, trader: &str) -> EngineResult<Holding> {
        let mint = parse_pubkey(token_id)?;
        let trader = parse_pubkey(trader)?;
        self.holding_of(&mint, &trader).await
    }

    pub async fn check_status(&self, token_id: &str) -> EngineResult<TokenStatus> {
        self.status.check_status(token_id).await
    }

    /// Dry-run a previously built transaction with a fresh blockhash.
    pub async fn simulate(&self, transaction: &UnsignedTransaction) -> EngineResult<SimulationOutcome> {
        self.simulator.simulate(transaction).await
    }

    async fn build_trade(
        &self,
        direction: Direction,
        mint: &Pubkey,
        trader: &Pubkey,
        amount: u64,
        slippage_bps: u64,
        priority_fee: Option<PriorityFee>,
    ) -> EngineResult<BuiltTrade> {
        validate_amount(amount)?;
        if slippage_bps > crate::constants::BPS_DENOMINATOR {
            return Err(EngineError::InvalidSlippage(slippage_bps));
        }
        info!(
            "building {:?} of {} for token {} by {}",
            direction, amount, mint, trader
        );

        let curve = self.load_curve(mint).await?;
        let quote = self.price(&curve, direction, amount)?;
        let min_output = quote.min_output(slippage_bps)?;
        if min_output == 0 {
            return Err(EngineError::InvalidAmount(format!(
                "{} is too small to trade: minimum output rounds to zero",
                amount
            )));
        }

        let addresses = self.deriver.derive_addresses(mint, trader)?;
        let (trade_ix, holding) = match direction {
            Direction::Buy => (
                self.encoder.encode_buy(trader, mint, amount, min_output)?,
                Some(HoldingRequirement {
                    owner: *trader,
                    token_id: *mint,
                    account: addresses.trader_holding_account,
                }),
            ),
            Direction::Sell => (self.encoder.encode_sell(trader, mint, amount, min_output)?, None),
        };

        let transaction = self
            .assembler
            .build(trader, trade_ix, &priority_fee.unwrap_or_default(), holding)
            .await?;

        let simulation = if self.config.simulate_trades {
            Some(self.simulator.simulate_as_built(&transaction).await?)
        } else {
            None
        };

        Ok(BuiltTrade {
            quote,
            min_output,
            addresses,
            transaction,
            simulation,
        })
    }

    async fn load_curve(&self, mint: &Pubkey) -> EngineResult<BondingCurveState> {
        let curve_account = self.deriver.derive_curve_account(mint)?;
        let account = self
            .ledger
            .get_account(&curve_account)
            .await?
            .ok_or(EngineError::AccountNotFound(curve_account))?;

        let state = BondingCurveState::decode(&curve_account, &account.data)?;
        if state.complete {
            return Err(EngineError::Graduated(*mint));
        }
        Ok(state)
    }

    fn price(&self, curve: &BondingCurveState, direction: Direction, amount: u64) -> EngineResult<Quote> {
        let quote = Quote::compute(curve.reserves(), direction, amount, self.config.fee_bps)?;
        let (available, unit) = match direction {
            Direction::Buy => (curve.real_token_reserves, "tokens"),
            Direction::Sell => (curve.real_sol_reserves, "lamports"),
        };
        if quote.output_amount > available {
            return Err(EngineError::CurveExhausted(format!(
                "{:?} yields {} {} but only {} remain on the curve",
                direction, quote.output_amount, unit, available
            )));
        }
        Ok(quote)
    }

    async fn holding_of(&self, mint: &Pubkey, trader: &Pubkey) -> EngineResult<Holding> {
        let holding_account = self.deriver.derive_holding_account(trader, mint)?;
        let token_amount = self.token_balance(&holding_account).await?;
        let native_balance = self.ledger.get_balance(trader).await?;

        Ok(Holding {
            holding_account,
            token_amount,
            native_balance,
        })
    }

    /// Token amount in `holding_account`, or `None` when the account does not exist.
    async fn token_balance(&self, holding_account: &Pubkey) -> EngineResult<Option<u64>> {
        let Some(account) = self.ledger.get_account(holding_account).await? else {
            return Ok(None);
        };
        let token_account = spl_token::state::Account::unpack(&account.data).map_err(|e| {
            EngineError::MalformedAccount {
                account: *holding_account,
                reason: e.to_string(),
            }
        })?;
        Ok(Some(token_account.amount))
    }
}

fn validate_amount(amount: u64) -> EngineResult<()> {
    if amount == 0 {
        return Err(EngineError::InvalidAmount("amount must be positive".into()));
    }
    Ok(())
}
