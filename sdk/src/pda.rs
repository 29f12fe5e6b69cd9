//! Program-derived addresses touched by a trade.

use std::str::FromStr;

use serde::Serialize;
use solana_sdk::pubkey::Pubkey;

use crate::config::EngineConfig;
use crate::constants::BONDING_CURVE_SEED;
use crate::error::{EngineError, EngineResult};

/// Every address a buy or sell of one token by one trader touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TokenAddressSet {
    #[serde(serialize_with = "serialize_pubkey")]
    pub token_id: Pubkey,
    #[serde(serialize_with = "serialize_pubkey")]
    pub curve_account: Pubkey,
    #[serde(serialize_with = "serialize_pubkey")]
    pub curve_holding_account: Pubkey,
    #[serde(serialize_with = "serialize_pubkey")]
    pub trader_holding_account: Pubkey,
}

fn serialize_pubkey<S: serde::Serializer>(key: &Pubkey, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&key.to_string())
}

/// Parse a base58 account key supplied by a caller.
pub fn parse_pubkey(raw: &str) -> EngineResult<Pubkey> {
    Pubkey::from_str(raw).map_err(|e| EngineError::InvalidAddress(format!("{:?}: {}", raw, e)))
}

/// Derives curve and holding accounts under the programs held in [`EngineConfig`].
#[derive(Debug, Clone, Copy)]
pub struct AddressDeriver {
    program_id: Pubkey,
    token_program: Pubkey,
    associated_token_program: Pubkey,
}

impl AddressDeriver {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            program_id: config.program_id,
            token_program: config.token_program,
            associated_token_program: config.associated_token_program,
        }
    }

    /// Curve account PDA (seeds: ["bonding-curve", mint]).
    pub fn find_curve_account(&self, token_id: &Pubkey) -> EngineResult<(Pubkey, u8)> {
        Pubkey::try_find_program_address(&[BONDING_CURVE_SEED, token_id.as_ref()], &self.program_id)
            .ok_or(EngineError::DerivationFailed)
    }

    pub fn derive_curve_account(&self, token_id: &Pubkey) -> EngineResult<Pubkey> {
        self.find_curve_account(token_id).map(|(pda, _)| pda)
    }

    /// Associated token account of `owner` for `token_id`
    /// (seeds: [owner, token_program, mint] under the associated token program).
    pub fn derive_holding_account(&self, owner: &Pubkey, token_id: &Pubkey) -> EngineResult<Pubkey> {
        Pubkey::try_find_program_address(
            &[owner.as_ref(), self.token_program.as_ref(), token_id.as_ref()],
            &self.associated_token_program,
        )
        .map(|(pda, _)| pda)
        .ok_or(EngineError::DerivationFailed)
    }

    pub fn derive_addresses(&self, token_id: &Pubkey, trader: &Pubkey) -> EngineResult<TokenAddressSet> {
        let curve_account = self.derive_curve_account(token_id)?;
        Ok(TokenAddressSet {
            token_id: *token_id,
            curve_account,
            curve_holding_account: self.derive_holding_account(&curve_account, token_id)?,
            trader_holding_account: self.derive_holding_account(trader, token_id)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use spl_associated_token_account::get_associated_token_address;

    use super::*;

    fn deriver() -> AddressDeriver {
        AddressDeriver::new(&EngineConfig::default())
    }

    #[test]
    fn curve_account_is_pure() {
        let mint = Pubkey::new_unique();
        let a = deriver().derive_curve_account(&mint).unwrap();
        let b = deriver().derive_curve_account(&mint).unwrap();
        assert_eq!(a.to_bytes(), b.to_bytes());
        assert_ne!(a, deriver().derive_curve_account(&Pubkey::new_unique()).unwrap());
    }

    #[test]
    fn curve_account_is_off_curve() {
        let mint = Pubkey::new_unique();
        let pda = deriver().derive_curve_account(&mint).unwrap();
        assert!(!pda.is_on_curve());
    }

    #[test]
    fn holding_account_matches_associated_token_program() {
        let owner = Pubkey::new_unique();
        let mint = Pubkey::new_unique();
        assert_eq!(
            deriver().derive_holding_account(&owner, &mint).unwrap(),
            get_associated_token_address(&owner, &mint)
        );
    }

    #[test]
    fn address_set_links_curve_and_holdings() {
        let mint = Pubkey::new_unique();
        let trader = Pubkey::new_unique();
        let set = deriver().derive_addresses(&mint, &trader).unwrap();

        assert_eq!(set.token_id, mint);
        assert_eq!(set.curve_account, deriver().derive_curve_account(&mint).unwrap());
        assert_eq!(
            set.curve_holding_account,
            get_associated_token_address(&set.curve_account, &mint)
        );
        assert_eq!(set.trader_holding_account, get_associated_token_address(&trader, &mint));
        assert_eq!(set, deriver().derive_addresses(&mint, &trader).unwrap());
    }

    #[test]
    fn derivation_follows_configured_program() {
        let mint = Pubkey::new_unique();
        let config = EngineConfig {
            program_id: Pubkey::new_unique(),
            ..EngineConfig::default()
        };
        assert_ne!(
            AddressDeriver::new(&config).derive_curve_account(&mint).unwrap(),
            deriver().derive_curve_account(&mint).unwrap()
        );
    }

    #[test]
    fn parse_rejects_wrong_length_and_charset() {
        assert!(parse_pubkey("So11111111111111111111111111111111111111112").is_ok());
        assert!(matches!(parse_pubkey("abc"), Err(EngineError::InvalidAddress(_))));
        assert!(matches!(
            parse_pubkey("0OIl0OIl0OIl0OIl0OIl0OIl0OIl0OIl0OIl0OIl0OI"),
            Err(EngineError::InvalidAddress(_))
        ));
        assert!(parse_pubkey("").is_err());
    }

    #[test]
    fn parse_rejects_padded_identifiers() {
        let key = "So11111111111111111111111111111111111111112";
        assert!(matches!(
            parse_pubkey(&format!(" {}", key)),
            Err(EngineError::InvalidAddress(_))
        ));
        assert!(matches!(
            parse_pubkey(&format!("{}\n", key)),
            Err(EngineError::InvalidAddress(_))
        ));
    }
}
