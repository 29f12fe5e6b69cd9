//! Dry-run of unsigned transactions and classification of node failures.

use std::sync::Arc;

use log::{debug, warn};
use serde::Serialize;

use crate::error::EngineResult;
use crate::ledger::{LedgerClient, LedgerSimulation};
use crate::transaction::UnsignedTransaction;

/// Why a simulated transaction would fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SimulationFailure {
    InsufficientFunds,
    SlippageExceeded,
    /// Usually the curve account is gone because the token graduated.
    AccountNotFound,
    ProgramError,
    Unknown,
}

impl SimulationFailure {
    pub fn hint(&self) -> &'static str {
        match self {
            SimulationFailure::InsufficientFunds => {
                "Insufficient balance to cover the trade and network fees"
            }
            SimulationFailure::SlippageExceeded => {
                "Price moved beyond the slippage tolerance; retry with a fresh quote or higher slippage"
            }
            SimulationFailure::AccountNotFound => {
                "A required account does not exist; the token may have graduated from the bonding curve"
            }
            SimulationFailure::ProgramError => "The curve program rejected the transaction",
            SimulationFailure::Unknown => "Simulation failed for an unrecognised reason",
        }
    }
}

/// Curve program custom errors that signal a slippage bound was hit.
const SLIPPAGE_MARKERS: &[&str] = &[
    "custom(6002)",
    "custom(6003)",
    "0x1772",
    "0x1773",
    "toomuchsolrequired",
    "toolittlesolreceived",
    "slippage",
];

const INSUFFICIENT_FUNDS_MARKERS: &[&str] = &[
    "insufficientfunds",
    "insufficient funds",
    "insufficient lamports",
];

const ACCOUNT_NOT_FOUND_MARKERS: &[&str] = &[
    "accountnotfound",
    "programaccountnotfound",
    "accountnotinitialized",
    "could not find account",
    "0xbc4",
];

const PROGRAM_ERROR_MARKERS: &[&str] = &["instructionerror", "custom program error", "failed:"];

/// Map a node error and its logs to a [`SimulationFailure`].
///
/// Markers are matched case-insensitively. Slippage is checked first: a slippage
/// failure is also an `InstructionError` and must not fall through to `ProgramError`.
pub fn classify_failure(err: &str, logs: &[String]) -> SimulationFailure {
    let mut haystack = err.to_ascii_lowercase();
    for line in logs {
        haystack.push('\n');
        haystack.push_str(&line.to_ascii_lowercase());
    }
    let contains_any = |markers: &[&str]| markers.iter().any(|m| haystack.contains(m));

    if contains_any(SLIPPAGE_MARKERS) {
        SimulationFailure::SlippageExceeded
    } else if contains_any(INSUFFICIENT_FUNDS_MARKERS) {
        SimulationFailure::InsufficientFunds
    } else if contains_any(ACCOUNT_NOT_FOUND_MARKERS) {
        SimulationFailure::AccountNotFound
    } else if contains_any(PROGRAM_ERROR_MARKERS) {
        SimulationFailure::ProgramError
    } else {
        SimulationFailure::Unknown
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SimulationOutcome {
    pub will_succeed: bool,
    /// Opaque node error, verbatim.
    pub error_code: Option<String>,
    pub failure: Option<SimulationFailure>,
    pub logs: Vec<String>,
    pub units_consumed: Option<u64>,
}

impl SimulationOutcome {
    pub fn from_ledger(raw: LedgerSimulation) -> Self {
        let failure = raw
            .err
            .as_deref()
            .map(|err| classify_failure(err, &raw.logs));
        Self {
            will_succeed: raw.err.is_none(),
            error_code: raw.err,
            failure,
            logs: raw.logs,
            units_consumed: raw.units_consumed,
        }
    }

    pub fn warning(&self) -> Option<&'static str> {
        self.failure.map(|f| f.hint())
    }
}

#[derive(Clone)]
pub struct Simulator {
    ledger: Arc<dyn LedgerClient>,
}

impl Simulator {
    pub fn new(ledger: Arc<dyn LedgerClient>) -> Self {
        Self { ledger }
    }

    /// Re-stamp `transaction` with a fresh blockhash and dry-run it.
    pub async fn simulate(&self, transaction: &UnsignedTransaction) -> EngineResult<SimulationOutcome> {
        let blockhash = self.ledger.latest_blockhash().await?;
        let fresh = transaction.with_blockhash(blockhash)?;
        self.simulate_as_built(&fresh).await
    }

    /// Dry-run `transaction` with the blockhash it already carries. Only for
    /// transactions assembled moments ago.
    pub async fn simulate_as_built(
        &self,
        transaction: &UnsignedTransaction,
    ) -> EngineResult<SimulationOutcome> {
        let raw = self.ledger.simulate(&transaction.transaction).await?;
        let outcome = SimulationOutcome::from_ledger(raw);

        match (outcome.failure, outcome.error_code.as_deref()) {
            (Some(failure), Some(err)) => warn!("simulation failed ({:?}): {}", failure, err),
            _ => debug!(
                "simulation succeeded, units consumed: {:?}",
                outcome.units_consumed
            ),
        }
        Ok(outcome)
    }
}
