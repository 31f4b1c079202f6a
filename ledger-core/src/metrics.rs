//! Action metrics
//!
//! One counter per action kind, bumped by the acceptance pass for successful
//! actions only. The registry is owned here, never global.

use prometheus::{IntCounter, Registry};
use std::sync::Arc;

/// Per-action counters
#[derive(Clone)]
pub struct Metrics {
    /// Successful issue-asset actions
    pub issue_asset: IntCounter,
    /// Successful produce actions
    pub produce: IntCounter,
    /// Successful consume actions
    pub consume: IntCounter,
    /// Successful create-order actions
    pub create_order: IntCounter,
    /// Successful fill-order actions
    pub fill_order: IntCounter,
    /// Successful close-order actions
    pub close_order: IntCounter,
    /// Owning registry
    pub registry: Arc<Registry>,
}

impl Metrics {
    /// Create and register all counters on a fresh registry
    pub fn new() -> prometheus::Result<Self> {
        let registry = Arc::new(Registry::new());

        let issue_asset =
            IntCounter::new("actions_issue_asset", "number of issue asset actions")?;
        let produce = IntCounter::new("actions_produce", "number of produce actions")?;
        let consume = IntCounter::new("actions_consume", "number of consume actions")?;
        let create_order =
            IntCounter::new("actions_create_order", "number of create order actions")?;
        let fill_order = IntCounter::new("actions_fill_order", "number of fill order actions")?;
        let close_order =
            IntCounter::new("actions_close_order", "number of close order actions")?;

        registry.register(Box::new(issue_asset.clone()))?;
        registry.register(Box::new(produce.clone()))?;
        registry.register(Box::new(consume.clone()))?;
        registry.register(Box::new(create_order.clone()))?;
        registry.register(Box::new(fill_order.clone()))?;
        registry.register(Box::new(close_order.clone()))?;

        Ok(Self {
            issue_asset,
            produce,
            consume,
            create_order,
            fill_order,
            close_order,
            registry,
        })
    }
}

impl std::fmt::Debug for Metrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Metrics").finish_non_exhaustive()
    }
}
