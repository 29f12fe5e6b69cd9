//! Lifecycle of a token relative to its bonding curve.

use std::sync::Arc;

use log::debug;
use serde::Serialize;
use solana_sdk::pubkey::Pubkey;

use crate::error::{EngineError, EngineResult};
use crate::ledger::LedgerClient;
use crate::pda::{parse_pubkey, AddressDeriver};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "curve_account")]
pub enum TokenStatus {
    /// Curve account exists; carries its address. A curve whose `complete` flag is set
    /// but whose account has not been closed yet is still reported here, while
    /// `TradeEngine::quote` and the build operations refuse it as `Graduated`.
    Active(#[serde(serialize_with = "serialize_pubkey")] Pubkey),
    /// Curve account closed, mint still exists. One-way.
    Graduated,
    NotFound,
    InvalidIdentifier,
}

fn serialize_pubkey<S: serde::Serializer>(key: &Pubkey, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&key.to_string())
}

#[derive(Clone)]
pub struct StatusChecker {
    ledger: Arc<dyn LedgerClient>,
    deriver: AddressDeriver,
}

impl StatusChecker {
    pub fn new(ledger: Arc<dyn LedgerClient>, deriver: AddressDeriver) -> Self {
        Self { ledger, deriver }
    }

    /// Probe the curve account, then the mint. Network errors are returned, never
    /// reported as `NotFound`.
    pub async fn check_status(&self, token_id: &str) -> EngineResult<TokenStatus> {
        let mint = match parse_pubkey(token_id) {
            Ok(mint) => mint,
            Err(EngineError::InvalidAddress(reason)) => {
                debug!("status check on invalid identifier: {}", reason);
                return Ok(TokenStatus::InvalidIdentifier);
            }
            Err(e) => return Err(e),
        };
        self.check_mint(&mint).await
    }

    pub async fn check_mint(&self, mint: &Pubkey) -> EngineResult<TokenStatus> {
        let curve = self.deriver.derive_curve_account(mint)?;
        if self.ledger.get_account(&curve).await?.is_some() {
            return Ok(TokenStatus::Active(curve));
        }

        let status = if self.ledger.get_account(mint).await?.is_some() {
            TokenStatus::Graduated
        } else {
            TokenStatus::NotFound
        };
        debug!("token {} has no curve account: {:?}", mint, status);
        Ok(status)
    }
}
