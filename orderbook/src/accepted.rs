//! Block acceptance
//!
//! Drives the post-execution side effects of an accepted block: stage one
//! receipt per transaction, bump the per-action counters, and route
//! successful order actions into the in-memory index. Receipts for the whole
//! block commit as one batch after every transaction has been processed.
//!
//! Index updates for fills are driven by the decoded fill payload in the
//! execution result, never by any order snapshot captured before execution,
//! so an order exhausted mid-block leaves the index as soon as its remaining
//! hits zero.

use crate::book::{OrderBook, Pair};
use crate::heap::IndexedOrder;
use energy_ledger::actions::{OrderResult, TypedAction};
use energy_ledger::metrics::Metrics;
use energy_ledger::{ExecResult, Id, Identity, ReceiptStore, Result};

/// One transaction of an accepted block, with its execution result
#[derive(Debug, Clone)]
pub struct AcceptedTx {
    /// Transaction id
    pub tx_id: Id,
    /// Identity that signed the transaction
    pub actor: Identity,
    /// The decoded action
    pub action: TypedAction,
    /// Outcome of executing the action
    pub result: ExecResult,
}

/// An accepted block ready for receipting and indexing
#[derive(Debug, Clone)]
pub struct AcceptedBlock {
    /// Block height
    pub height: u64,
    /// Block timestamp, stamped onto every receipt
    pub timestamp: i64,
    /// Transactions in execution order
    pub txs: Vec<AcceptedTx>,
}

/// Applies accepted blocks to the receipt store, metrics, and order index
pub struct Acceptor {
    store: ReceiptStore,
    book: OrderBook,
    metrics: Metrics,
}

impl std::fmt::Debug for Acceptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Acceptor")
            .field("book", &self.book)
            .finish_non_exhaustive()
    }
}

impl Acceptor {
    /// Wire the three sinks together
    pub fn new(store: ReceiptStore, book: OrderBook, metrics: Metrics) -> Self {
        Self {
            store,
            book,
            metrics,
        }
    }

    /// The order index
    pub fn book(&self) -> &OrderBook {
        &self.book
    }

    /// The receipt store
    pub fn store(&self) -> &ReceiptStore {
        &self.store
    }

    /// The action counters
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Process one accepted block. Every transaction gets a receipt whether
    /// it succeeded or not; only successful order actions touch the index.
    pub fn accept_block(&self, block: &AcceptedBlock) -> Result<()> {
        let mut batch = self.store.batch();
        for tx in &block.txs {
            batch.store_receipt(&tx.tx_id, block.timestamp, tx.result.success, tx.result.units);
            if !tx.result.success {
                continue;
            }
            self.count(&tx.action);
            self.route(tx)?;
        }
        self.store.commit(batch)?;
        tracing::debug!(
            height = block.height,
            txs = block.txs.len(),
            "accepted block"
        );
        Ok(())
    }

    fn count(&self, action: &TypedAction) {
        match action {
            TypedAction::IssueAsset(_) => self.metrics.issue_asset.inc(),
            TypedAction::Produce(_) => self.metrics.produce.inc(),
            TypedAction::Consume(_) => self.metrics.consume.inc(),
            TypedAction::CreateOrder(_) => self.metrics.create_order.inc(),
            TypedAction::FillOrder(_) => self.metrics.fill_order.inc(),
            TypedAction::CloseOrder(_) => self.metrics.close_order.inc(),
        }
    }

    fn route(&self, tx: &AcceptedTx) -> Result<()> {
        match &tx.action {
            TypedAction::CreateOrder(create) => {
                let pair = Pair {
                    input: create.input,
                    output: create.output,
                };
                self.book.add(
                    pair,
                    IndexedOrder {
                        id: tx.tx_id,
                        rank: OrderBook::rank(create.in_tick, create.out_tick),
                        in_tick: create.in_tick,
                        out_tick: create.out_tick,
                        remaining: create.supply,
                        owner: tx.actor,
                    },
                );
            }
            TypedAction::CloseOrder(close) => {
                self.book.remove(&close.order);
            }
            TypedAction::FillOrder(fill) => {
                let payload = OrderResult::decode(&tx.result.output)?;
                if payload.remaining == 0 {
                    self.book.remove(&fill.order);
                } else {
                    self.book.update_remaining(&fill.order, payload.remaining);
                }
            }
            TypedAction::IssueAsset(_) | TypedAction::Produce(_) | TypedAction::Consume(_) => {}
        }
        Ok(())
    }
}
