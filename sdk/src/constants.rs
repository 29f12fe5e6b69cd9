//! Bonding-curve program IDs, PDA seeds, instruction discriminators, and protocol defaults.

use solana_sdk::{pubkey, pubkey::Pubkey};

// ── Program IDs ─────────────────────────────────────────────────────────────

/// Bonding-curve launch program: creates tokens and trades them on the curve.
pub const CURVE_PROGRAM_ID: Pubkey = pubkey!("6EF8rrecthR5Dkzon8Nwu78hRvfCKubJ14M5uBEwF6P");

/// Global config account of the curve program (holds fee recipient and fee bps).
pub const GLOBAL_ACCOUNT: Pubkey = pubkey!("4wTV1YmiEkRvAtNtsSGPtUrqRYQMe5SKy2uB4Jjaxnjf");

/// Protocol fee recipient.
pub const FEE_RECIPIENT: Pubkey = pubkey!("CebN5WGQ4jvEPvsVU4EoHEpgzq1VV7AbicfhtW4xC9iM");

/// Anchor event authority PDA of the curve program.
pub const EVENT_AUTHORITY: Pubkey = pubkey!("Ce6TQqeHC9p8KetsN6JsjHK7UTZk7nasjjnr7XxXp9F1");

pub const SYSTEM_PROGRAM_ID: Pubkey = pubkey!("11111111111111111111111111111111");
pub const TOKEN_PROGRAM_ID: Pubkey = pubkey!("TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA");
pub const ASSOCIATED_TOKEN_PROGRAM_ID: Pubkey =
    pubkey!("ATokenGPvbdGVxr1b2hvZbsiqW5xWH25efTNsLJA8knL");
pub const RENT_SYSVAR_ID: Pubkey = pubkey!("SysvarRent111111111111111111111111111111111");

// ── PDA Seeds ───────────────────────────────────────────────────────────────

pub const BONDING_CURVE_SEED: &[u8] = b"bonding-curve";

// ── Instruction Discriminators ──────────────────────────────────────────────
// First 8 bytes of sha256("global:<name>").

pub const BUY_DISCRIMINATOR: [u8; 8] = [102, 6, 61, 18, 1, 218, 235, 234];
pub const SELL_DISCRIMINATOR: [u8; 8] = [51, 230, 133, 164, 1, 127, 131, 173];

/// Associated token program instruction tag for `CreateIdempotent`.
pub const CREATE_IDEMPOTENT_TAG: u8 = 1;

/// First 8 bytes of sha256("account:BondingCurve").
pub const BONDING_CURVE_ACCOUNT_DISCRIMINATOR: [u8; 8] = [23, 183, 248, 55, 96, 216, 172, 96];

// ── Curve Parameters ────────────────────────────────────────────────────────

/// Virtual SOL reserves a freshly launched curve starts with (30 SOL).
pub const INITIAL_VIRTUAL_SOL_RESERVES: u64 = 30_000_000_000;

/// Virtual token reserves a freshly launched curve starts with.
pub const INITIAL_VIRTUAL_TOKEN_RESERVES: u64 = 1_073_000_000_000_000;

/// Protocol fee on the output leg of every trade. 1% = 100 bps.
pub const DEFAULT_FEE_BPS: u64 = 100;

/// Basis-point denominator.
pub const BPS_DENOMINATOR: u64 = 10_000;

/// Raw units per whole token (6 decimals).
pub const TOKEN_UNIT: u64 = 1_000_000;

// ── Default Config Values ───────────────────────────────────────────────────

pub const DEFAULT_RPC_URL: &str = "https://api.mainnet-beta.solana.com";

/// Compute unit limit attached alongside a priority fee when none is requested.
pub const DEFAULT_COMPUTE_UNIT_LIMIT: u32 = 200_000;
