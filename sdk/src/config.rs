//! Engine configuration: protocol addresses and fee parameters, fixed at construction.

use std::str::FromStr;

use solana_sdk::{commitment_config::CommitmentConfig, pubkey::Pubkey};
use thiserror::Error;

use crate::constants::*;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}

/// Immutable configuration shared by every component of the engine.
///
/// Program and account addresses live here rather than in module-level statics so
/// tests (and alternative clusters) can substitute their own.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub rpc_url: String,
    pub commitment: CommitmentConfig,
    pub program_id: Pubkey,
    pub global_account: Pubkey,
    pub fee_recipient: Pubkey,
    pub event_authority: Pubkey,
    pub system_program: Pubkey,
    pub token_program: Pubkey,
    pub associated_token_program: Pubkey,
    pub rent_sysvar: Pubkey,
    /// Fee on the output leg, in basis points.
    pub fee_bps: u64,
    pub default_compute_unit_limit: u32,
    /// Dry-run every built transaction before returning it.
    pub simulate_trades: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            rpc_url: DEFAULT_RPC_URL.to_string(),
            commitment: CommitmentConfig::confirmed(),
            program_id: CURVE_PROGRAM_ID,
            global_account: GLOBAL_ACCOUNT,
            fee_recipient: FEE_RECIPIENT,
            event_authority: EVENT_AUTHORITY,
            system_program: SYSTEM_PROGRAM_ID,
            token_program: TOKEN_PROGRAM_ID,
            associated_token_program: ASSOCIATED_TOKEN_PROGRAM_ID,
            rent_sysvar: RENT_SYSVAR_ID,
            fee_bps: DEFAULT_FEE_BPS,
            default_compute_unit_limit: DEFAULT_COMPUTE_UNIT_LIMIT,
            simulate_trades: true,
        }
    }
}

impl EngineConfig {
    /// Build a config from environment variables, keeping defaults for unset ones.
    ///
    /// Recognised variables: `RPC_URL`, `RPC_COMMITMENT`, `CURVE_PROGRAM`,
    /// `CURVE_GLOBAL_ACCOUNT`, `CURVE_FEE_RECIPIENT`, `CURVE_EVENT_AUTHORITY`,
    /// `CURVE_FEE_BPS`, `COMPUTE_UNIT_LIMIT`, `SIMULATE_TRADES`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup("RPC_URL") {
            config.rpc_url = url;
        }
        if let Some(raw) = lookup("RPC_COMMITMENT") {
            config.commitment = CommitmentConfig::from_str(&raw).map_err(|e| {
                ConfigError::Invalid {
                    var: "RPC_COMMITMENT",
                    reason: e.to_string(),
                }
            })?;
        }

        config.program_id = pubkey_var(&lookup, "CURVE_PROGRAM", config.program_id)?;
        config.global_account = pubkey_var(&lookup, "CURVE_GLOBAL_ACCOUNT", config.global_account)?;
        config.fee_recipient = pubkey_var(&lookup, "CURVE_FEE_RECIPIENT", config.fee_recipient)?;
        config.event_authority =
            pubkey_var(&lookup, "CURVE_EVENT_AUTHORITY", config.event_authority)?;

        if let Some(raw) = lookup("CURVE_FEE_BPS") {
            let fee_bps: u64 = raw.parse().map_err(|e| ConfigError::Invalid {
                var: "CURVE_FEE_BPS",
                reason: format!("{}", e),
            })?;
            if fee_bps > BPS_DENOMINATOR {
                return Err(ConfigError::Invalid {
                    var: "CURVE_FEE_BPS",
                    reason: format!("{} exceeds {}", fee_bps, BPS_DENOMINATOR),
                });
            }
            config.fee_bps = fee_bps;
        }

        if let Some(raw) = lookup("COMPUTE_UNIT_LIMIT") {
            config.default_compute_unit_limit =
                raw.parse().map_err(|e| ConfigError::Invalid {
                    var: "COMPUTE_UNIT_LIMIT",
                    reason: format!("{}", e),
                })?;
        }

        if let Some(raw) = lookup("SIMULATE_TRADES") {
            config.simulate_trades = match raw.to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" => true,
                "0" | "false" | "no" => false,
                other => {
                    return Err(ConfigError::Invalid {
                        var: "SIMULATE_TRADES",
                        reason: format!("expected a boolean, got {:?}", other),
                    })
                }
            };
        }

        Ok(config)
    }
}

fn pubkey_var<F>(lookup: &F, var: &'static str, default: Pubkey) -> Result<Pubkey, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(var) {
        Some(raw) => Pubkey::from_str(&raw).map_err(|e| ConfigError::Invalid {
            var,
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}
