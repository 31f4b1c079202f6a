//! EnergyLedger Core
//!
//! Deterministic state-transition core for the energy-unit ledger: canonical
//! binary codec, tagged key scheme, record layouts over a transactional
//! key-value view, six fixed-cost actions, and the RocksDB receipt store.
//!
//! # Invariants
//!
//! - Deterministic replay: same actions in the same order produce the same
//!   state bytes
//! - Failed actions never leave a partial write behind
//! - Arithmetic never wraps; overflow and underflow are explicit failures
//! - Zero balances and credits are deleted, never stored

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    rust_2018_idioms,
    missing_debug_implementations,
    clippy::all
)]

pub mod actions;
pub mod codec;
pub mod config;
pub mod error;
pub mod ids;
pub mod keys;
pub mod math;
pub mod metrics;
pub mod records;
pub mod state;
pub mod store;

// Re-exports
pub use actions::{Action, ActionRegistry, ExecResult, TypedAction};
pub use config::Config;
pub use error::{Error, Result};
pub use ids::{AssetId, Id, Identity};
pub use state::{MemState, StateOverlay, StateScan, StateView};
pub use store::ReceiptStore;
