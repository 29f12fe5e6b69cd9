//! Ledger node boundary. Everything the engine reads from the network goes through
//! [`LedgerClient`]; [`RpcLedger`] is the production implementation.

use std::sync::Arc;

use async_trait::async_trait;
use solana_client::{
    client_error::ClientError, nonblocking::rpc_client::RpcClient,
    rpc_config::RpcSimulateTransactionConfig,
};
use solana_sdk::{account::Account, hash::Hash, pubkey::Pubkey, transaction::Transaction};

use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};

/// Raw result of a dry run, before classification.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LedgerSimulation {
    /// Node error rendered as text; `None` when the transaction would succeed.
    pub err: Option<String>,
    pub logs: Vec<String>,
    pub units_consumed: Option<u64>,
}

#[async_trait]
pub trait LedgerClient: Send + Sync {
    async fn latest_blockhash(&self) -> EngineResult<Hash>;

    async fn get_account(&self, address: &Pubkey) -> EngineResult<Option<Account>>;

    /// Dry-run without signature verification.
    async fn simulate(&self, transaction: &Transaction) -> EngineResult<LedgerSimulation>;

    async fn get_balance(&self, address: &Pubkey) -> EngineResult<u64>;
}

/// [`LedgerClient`] over a JSON-RPC node. Cloning shares the underlying connection pool.
#[derive(Clone)]
pub struct RpcLedger {
    rpc: Arc<RpcClient>,
    config: Arc<EngineConfig>,
}

impl RpcLedger {
    pub fn new(config: Arc<EngineConfig>) -> Self {
        let rpc = RpcClient::new_with_commitment(config.rpc_url.clone(), config.commitment);
        Self {
            rpc: Arc::new(rpc),
            config,
        }
    }

    pub fn with_client(rpc: Arc<RpcClient>, config: Arc<EngineConfig>) -> Self {
        Self { rpc, config }
    }
}

fn unavailable(context: &str, e: ClientError) -> EngineError {
    EngineError::NetworkUnavailable(format!("{}: {}", context, e))
}

#[async_trait]
impl LedgerClient for RpcLedger {
    async fn latest_blockhash(&self) -> EngineResult<Hash> {
        self.rpc
            .get_latest_blockhash()
            .await
            .map_err(|e| unavailable("getLatestBlockhash", e))
    }

    async fn get_account(&self, address: &Pubkey) -> EngineResult<Option<Account>> {
        let response = self
            .rpc
            .get_account_with_commitment(address, self.config.commitment)
            .await
            .map_err(|e| unavailable("getAccountInfo", e))?;
        Ok(response.value)
    }

    async fn simulate(&self, transaction: &Transaction) -> EngineResult<LedgerSimulation> {
        let sim_config = RpcSimulateTransactionConfig {
            sig_verify: false,
            replace_recent_blockhash: false,
            commitment: Some(self.config.commitment),
            ..RpcSimulateTransactionConfig::default()
        };
        let result = self
            .rpc
            .simulate_transaction_with_config(transaction, sim_config)
            .await
            .map_err(|e| unavailable("simulateTransaction", e))?
            .value;

        Ok(LedgerSimulation {
            err: result.err.map(|e| format!("{:?}", e)),
            logs: result.logs.unwrap_or_default(),
            units_consumed: result.units_consumed,
        })
    }

    async fn get_balance(&self, address: &Pubkey) -> EngineResult<u64> {
        self.rpc
            .get_balance(address)
            .await
            .map_err(|e| unavailable("getBalance", e))
    }
}
