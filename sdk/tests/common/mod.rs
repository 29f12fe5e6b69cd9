// In-memory ledger for engine tests: fixed blockhash, scripted accounts and
// simulation results, and a log of every call made.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bondcurve_sdk::constants::*;
use bondcurve_sdk::{
    EngineConfig, EngineError, EngineResult, LedgerClient, LedgerSimulation, TradeEngine,
};
use solana_sdk::{account::Account, hash::Hash, pubkey::Pubkey, transaction::Transaction};
use spl_token::solana_program::program_pack::Pack;

// ── Fixtures ─────────────────────────────────────────────────────────────────

pub const LAUNCH_REAL_TOKEN_RESERVES: u64 = 793_100_000_000_000;
/// Real SOL paid in by earlier buyers, available to sellers.
pub const CURVE_REAL_SOL_RESERVES: u64 = 5_000_000_000;
pub const TOTAL_SUPPLY: u64 = 1_000_000_000_000_000;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn mint() -> Pubkey {
    Pubkey::new_from_array([7u8; 32])
}

pub fn trader() -> Pubkey {
    Pubkey::new_from_array([9u8; 32])
}

/// Raw curve account bytes, with a trailing creator key as newer program revisions write.
pub fn curve_account_data(
    virtual_sol: u64,
    virtual_token: u64,
    real_token: u64,
    real_sol: u64,
    complete: bool,
) -> Vec<u8> {
    let mut data = BONDING_CURVE_ACCOUNT_DISCRIMINATOR.to_vec();
    data.extend_from_slice(&virtual_token.to_le_bytes());
    data.extend_from_slice(&virtual_sol.to_le_bytes());
    data.extend_from_slice(&real_token.to_le_bytes());
    data.extend_from_slice(&real_sol.to_le_bytes());
    data.extend_from_slice(&TOTAL_SUPPLY.to_le_bytes());
    data.push(complete as u8);
    data.extend_from_slice(&[3u8; 32]);
    data
}

pub fn curve_account(data: Vec<u8>) -> Account {
    Account {
        lamports: 1_500_000,
        data,
        owner: CURVE_PROGRAM_ID,
        executable: false,
        rent_epoch: 0,
    }
}

pub fn launch_curve() -> Account {
    curve_account(curve_account_data(
        INITIAL_VIRTUAL_SOL_RESERVES,
        INITIAL_VIRTUAL_TOKEN_RESERVES,
        LAUNCH_REAL_TOKEN_RESERVES,
        CURVE_REAL_SOL_RESERVES,
        false,
    ))
}

pub fn mint_account() -> Account {
    Account {
        lamports: 1_461_600,
        data: vec![0u8; spl_token::state::Mint::LEN],
        owner: TOKEN_PROGRAM_ID,
        executable: false,
        rent_epoch: 0,
    }
}

pub fn token_account(mint: &Pubkey, owner: &Pubkey, amount: u64) -> Account {
    let state = spl_token::state::Account {
        mint: *mint,
        owner: *owner,
        amount,
        state: spl_token::state::AccountState::Initialized,
        ..Default::default()
    };
    let mut data = vec![0u8; spl_token::state::Account::LEN];
    spl_token::state::Account::pack(state, &mut data).unwrap();
    Account {
        lamports: 2_039_280,
        data,
        owner: TOKEN_PROGRAM_ID,
        executable: false,
        rent_epoch: 0,
    }
}

// ── Mock ledger ──────────────────────────────────────────────────────────────

pub struct MockLedger {
    accounts: Mutex<HashMap<Pubkey, Account>>,
    balances: Mutex<HashMap<Pubkey, u64>>,
    blockhash: Mutex<Hash>,
    simulation: Mutex<LedgerSimulation>,
    offline: AtomicBool,
    calls: Mutex<Vec<&'static str>>,
    simulated: Mutex<Vec<Transaction>>,
}

impl MockLedger {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            accounts: Mutex::new(HashMap::new()),
            balances: Mutex::new(HashMap::new()),
            blockhash: Mutex::new(Hash::new_from_array([42u8; 32])),
            simulation: Mutex::new(LedgerSimulation {
                err: None,
                logs: vec!["Program log: Instruction: Buy".to_string()],
                units_consumed: Some(52_000),
            }),
            offline: AtomicBool::new(false),
            calls: Mutex::new(Vec::new()),
            simulated: Mutex::new(Vec::new()),
        })
    }

    pub fn insert_account(&self, address: Pubkey, account: Account) {
        self.accounts.lock().unwrap().insert(address, account);
    }

    pub fn set_balance(&self, address: Pubkey, lamports: u64) {
        self.balances.lock().unwrap().insert(address, lamports);
    }

    pub fn set_blockhash(&self, blockhash: Hash) {
        *self.blockhash.lock().unwrap() = blockhash;
    }

    pub fn blockhash(&self) -> Hash {
        *self.blockhash.lock().unwrap()
    }

    pub fn set_simulation(&self, simulation: LedgerSimulation) {
        *self.simulation.lock().unwrap() = simulation;
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    pub fn simulated(&self) -> Vec<Transaction> {
        self.simulated.lock().unwrap().clone()
    }

    fn record(&self, call: &'static str) -> EngineResult<()> {
        self.calls.lock().unwrap().push(call);
        if self.offline.load(Ordering::SeqCst) {
            return Err(EngineError::NetworkUnavailable(format!(
                "{}: connection refused",
                call
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl LedgerClient for MockLedger {
    async fn latest_blockhash(&self) -> EngineResult<Hash> {
        self.record("latest_blockhash")?;
        Ok(self.blockhash())
    }

    async fn get_account(&self, address: &Pubkey) -> EngineResult<Option<Account>> {
        self.record("get_account")?;
        Ok(self.accounts.lock().unwrap().get(address).cloned())
    }

    async fn simulate(&self, transaction: &Transaction) -> EngineResult<LedgerSimulation> {
        self.record("simulate")?;
        self.simulated.lock().unwrap().push(transaction.clone());
        Ok(self.simulation.lock().unwrap().clone())
    }

    async fn get_balance(&self, address: &Pubkey) -> EngineResult<u64> {
        self.record("get_balance")?;
        Ok(self.balances.lock().unwrap().get(address).copied().unwrap_or(0))
    }
}

/// Engine over `ledger` with default mainnet addresses.
pub fn engine(ledger: &Arc<MockLedger>) -> TradeEngine {
    TradeEngine::new(EngineConfig::default(), ledger.clone())
}

/// Ledger holding a freshly launched curve for [`mint`].
pub fn launched() -> (Arc<MockLedger>, TradeEngine) {
    init_logging();
    let ledger = MockLedger::new();
    let engine = engine(&ledger);
    let curve = engine.deriver().derive_curve_account(&mint()).unwrap();
    ledger.insert_account(curve, launch_curve());
    ledger.insert_account(mint(), mint_account());
    (ledger, engine)
}
