//! Constant-product bonding curve math.
//!
//! Reserves are `u64` on-ledger; every intermediate value is `u128` so the product of
//! two reserves never overflows. Rounding always favours the curve: the post-trade
//! reserve is floored (so gross output rounds down) and the fee is ceiled.

use borsh::BorshDeserialize;
use serde::Serialize;
use solana_sdk::pubkey::Pubkey;

use crate::constants::{
    BONDING_CURVE_ACCOUNT_DISCRIMINATOR, BPS_DENOMINATOR, INITIAL_VIRTUAL_SOL_RESERVES,
    INITIAL_VIRTUAL_TOKEN_RESERVES, TOKEN_UNIT,
};
use crate::error::{EngineError, EngineResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Spend base currency (SOL) for tokens.
    Buy,
    /// Spend tokens for base currency.
    Sell,
}

/// Virtual reserves of one curve. `virtual_base` is the SOL side, `virtual_quote` the
/// token side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReserveState {
    pub virtual_base: u64,
    pub virtual_quote: u64,
}

impl ReserveState {
    pub fn new(virtual_base: u64, virtual_quote: u64) -> Self {
        Self {
            virtual_base,
            virtual_quote,
        }
    }

    /// Reserves of a curve that has not traded yet.
    pub fn initial() -> Self {
        Self::new(INITIAL_VIRTUAL_SOL_RESERVES, INITIAL_VIRTUAL_TOKEN_RESERVES)
    }
}

/// Output and fee of a single swap, both in output-leg units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapOutput {
    pub output: u64,
    pub fee: u64,
}

/// Tokens received (after fee) for `input_base` lamports.
pub fn quote_buy(reserves: ReserveState, input_base: u64, fee_bps: u64) -> EngineResult<SwapOutput> {
    swap(reserves.virtual_base, reserves.virtual_quote, input_base, fee_bps)
}

/// Lamports received (after fee) for `input_quote` raw token units.
pub fn quote_sell(reserves: ReserveState, input_quote: u64, fee_bps: u64) -> EngineResult<SwapOutput> {
    swap(reserves.virtual_quote, reserves.virtual_base, input_quote, fee_bps)
}

fn swap(reserve_in: u64, reserve_out: u64, amount_in: u64, fee_bps: u64) -> EngineResult<SwapOutput> {
    if amount_in == 0 {
        return Err(EngineError::InvalidAmount("input amount must be positive".into()));
    }
    if reserve_in == 0 || reserve_out == 0 {
        return Err(EngineError::CurveExhausted("reserves are empty".into()));
    }
    if fee_bps > BPS_DENOMINATOR {
        return Err(EngineError::InvalidAmount(format!("fee of {} bps", fee_bps)));
    }

    let k = (reserve_in as u128) * (reserve_out as u128);
    let new_in = (reserve_in as u128)
        .checked_add(amount_in as u128)
        .ok_or_else(|| EngineError::CurveExhausted("input reserve overflow".into()))?;
    let new_out = k / new_in;
    if new_out > reserve_out as u128 {
        return Err(EngineError::CurveExhausted("output reserve would grow".into()));
    }

    let gross = reserve_out as u128 - new_out;
    let fee = ceil_div(gross * fee_bps as u128, BPS_DENOMINATOR as u128);
    let net = gross - fee;

    Ok(SwapOutput {
        output: to_u64(net)?,
        fee: to_u64(fee)?,
    })
}

/// Minimum acceptable output after applying `slippage_bps` of tolerance, rounded down.
pub fn min_output_with_slippage(expected: u64, slippage_bps: u64) -> EngineResult<u64> {
    if slippage_bps > BPS_DENOMINATOR {
        return Err(EngineError::InvalidSlippage(slippage_bps));
    }
    let min = (expected as u128) * ((BPS_DENOMINATOR - slippage_bps) as u128)
        / BPS_DENOMINATOR as u128;
    to_u64(min)
}

fn ceil_div(a: u128, b: u128) -> u128 {
    (a + b - 1) / b
}

fn to_u64(v: u128) -> EngineResult<u64> {
    u64::try_from(v).map_err(|_| EngineError::CurveExhausted(format!("{} does not fit in u64", v)))
}

// ── Quote ───────────────────────────────────────────────────────────────────

/// Priced trade against a reserve snapshot. Never cached: reserves move with every trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Quote {
    pub direction: Direction,
    pub input_amount: u64,
    /// Net of fee.
    pub output_amount: u64,
    /// Lamports per whole token (10^6 raw units), rounded down. Saturates at `u64::MAX`.
    pub unit_price: u64,
    pub fee_amount: u64,
}

impl Quote {
    pub fn compute(
        reserves: ReserveState,
        direction: Direction,
        amount: u64,
        fee_bps: u64,
    ) -> EngineResult<Self> {
        let swap = match direction {
            Direction::Buy => quote_buy(reserves, amount, fee_bps)?,
            Direction::Sell => quote_sell(reserves, amount, fee_bps)?,
        };
        let (base, tokens) = match direction {
            Direction::Buy => (amount, swap.output),
            Direction::Sell => (swap.output, amount),
        };
        let unit_price = if tokens == 0 {
            0
        } else {
            let price = (base as u128) * (TOKEN_UNIT as u128) / tokens as u128;
            u64::try_from(price).unwrap_or(u64::MAX)
        };

        Ok(Self {
            direction,
            input_amount: amount,
            output_amount: swap.output,
            unit_price,
            fee_amount: swap.fee,
        })
    }

    pub fn min_output(&self, slippage_bps: u64) -> EngineResult<u64> {
        min_output_with_slippage(self.output_amount, slippage_bps)
    }
}

// ── On-ledger curve account ─────────────────────────────────────────────────

/// Decoded bonding-curve account.
#[derive(BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct BondingCurveState {
    pub virtual_token_reserves: u64,
    pub virtual_sol_reserves: u64,
    pub real_token_reserves: u64,
    pub real_sol_reserves: u64,
    pub token_total_supply: u64,
    pub complete: bool,
}

impl BondingCurveState {
    /// Decode raw account data. Bytes past `complete` are ignored; later program
    /// revisions append fields there.
    pub fn decode(account: &Pubkey, data: &[u8]) -> EngineResult<Self> {
        let malformed = |reason: String| EngineError::MalformedAccount {
            account: *account,
            reason,
        };

        if data.len() < 8 || data[..8] != BONDING_CURVE_ACCOUNT_DISCRIMINATOR {
            return Err(malformed("missing bonding curve discriminator".into()));
        }
        let mut body = &data[8..];
        Self::deserialize(&mut body).map_err(|e| malformed(e.to_string()))
    }

    pub fn reserves(&self) -> ReserveState {
        ReserveState::new(self.virtual_sol_reserves, self.virtual_token_reserves)
    }
}
