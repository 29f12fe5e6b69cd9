//! Bonding-curve SDK: pricing, address derivation, instruction encoding and unsigned
//! transaction assembly for a constant-product token launch program.
//!
//! The engine holds no keys. Every built transaction carries placeholder signatures
//! and is handed back to the caller's wallet for signing.

pub mod config;
pub mod constants;
pub mod curve;
pub mod engine;
pub mod error;
pub mod instruction;
pub mod ledger;
pub mod pda;
pub mod simulator;
pub mod status;
pub mod transaction;

pub use config::{ConfigError, EngineConfig};
pub use curve::{BondingCurveState, Direction, Quote, ReserveState};
pub use engine::{BuiltTrade, Holding, TradeEngine};
pub use error::{EngineError, EngineResult};
pub use instruction::{InstructionEncoder, PriorityFee};
pub use ledger::{LedgerClient, LedgerSimulation, RpcLedger};
pub use pda::{AddressDeriver, TokenAddressSet};
pub use simulator::{SimulationFailure, SimulationOutcome, Simulator};
pub use status::{StatusChecker, TokenStatus};
pub use transaction::{TransactionAssembler, UnsignedTransaction};
