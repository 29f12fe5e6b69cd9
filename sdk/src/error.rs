use solana_sdk::pubkey::Pubkey;
use thiserror::Error;

/// Errors returned by every engine operation.
///
/// Only [`EngineError::NetworkUnavailable`] is worth retrying; the engine performs no
/// ledger mutation, so a retry is always safe.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Slippage tolerance {0} bps exceeds 10000")]
    InvalidSlippage(u64),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Bonding curve cannot satisfy the trade: {0}")]
    CurveExhausted(String),

    #[error("Program address derivation exhausted its bump seeds")]
    DerivationFailed,

    #[error("Ledger node unavailable: {0}")]
    NetworkUnavailable(String),

    #[error("Account {0} not found")]
    AccountNotFound(Pubkey),

    #[error("Token {0} has graduated from the bonding curve")]
    Graduated(Pubkey),

    #[error("Account {account} has unexpected data: {reason}")]
    MalformedAccount { account: Pubkey, reason: String },

    #[error("Serialization failed: {0}")]
    Serialization(String),
}

impl EngineError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, EngineError::NetworkUnavailable(_))
    }
}

impl From<bincode::Error> for EngineError {
    fn from(e: bincode::Error) -> Self {
        EngineError::Serialization(e.to_string())
    }
}

impl From<std::io::Error> for EngineError {
    fn from(e: std::io::Error) -> Self {
        EngineError::Serialization(e.to_string())
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
