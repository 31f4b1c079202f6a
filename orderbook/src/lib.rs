//! EnergyLedger Order Index
//!
//! Derived, in-memory view of the resting orders in the ledger: one indexed
//! max-heap per traded pair, a configurable pair filter, and the block
//! acceptance driver that keeps receipts, metrics, and the index in step
//! with execution results.
//!
//! Everything here is reconstructible: dropping the index and calling
//! [`book::OrderBook::rebuild`] against the ledger view yields the same
//! contents.

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    rust_2018_idioms,
    missing_debug_implementations,
    clippy::all
)]

pub mod accepted;
pub mod book;
pub mod heap;

// Re-exports
pub use accepted::{AcceptedBlock, AcceptedTx, Acceptor};
pub use book::{OrderBook, Pair, TrackedPairs};
pub use heap::{IndexedHeap, IndexedOrder};
