//! Deterministic state-transition actions
//!
//! Six actions mutate the ledger: issue asset, produce, consume, create
//! order, fill order, close order. Each declares its state-key footprint
//! before execution, costs a deterministic number of units, encodes with the
//! canonical codec, and executes validate-then-mutate against a buffered
//! overlay so a failure never leaves a partial write behind.
//!
//! Only malformed wire bytes reject a transaction outright. Business-rule
//! violations, arithmetic failures, and storage errors all become
//! *unsuccessful* results that still consume units.

use crate::codec::{Packer, Unpacker};
use crate::error::{Error, Result};
use crate::ids::{Id, Identity};
use crate::state::{StateOverlay, StateView};
use std::collections::HashMap;

mod close_order;
mod consume;
mod create_order;
mod fill_order;
mod issue_asset;
mod produce;

pub use close_order::CloseOrder;
pub use consume::Consume;
pub use create_order::CreateOrder;
pub use fill_order::{FillOrder, OrderResult};
pub use issue_asset::IssueAsset;
pub use produce::Produce;

/// Wire type byte for [`IssueAsset`]
pub const ISSUE_ASSET_TAG: u8 = 0x0;
/// Wire type byte for [`Produce`]
pub const PRODUCE_TAG: u8 = 0x1;
/// Wire type byte for [`Consume`]
pub const CONSUME_TAG: u8 = 0x2;
/// Wire type byte for [`CreateOrder`]
pub const CREATE_ORDER_TAG: u8 = 0x3;
/// Wire type byte for [`FillOrder`]
pub const FILL_ORDER_TAG: u8 = 0x4;
/// Wire type byte for [`CloseOrder`]
pub const CLOSE_ORDER_TAG: u8 = 0x5;

/// A storage key an action will read or write
pub type StateKey = Vec<u8>;

/// Outcome of executing one action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecResult {
    /// Whether the action applied its mutations
    pub success: bool,
    /// Units consumed, success or not
    pub units: u64,
    /// Opaque output payload: empty, a validation code, or action output
    pub output: Vec<u8>,
}

impl ExecResult {
    /// Successful result with an output payload
    pub fn success(units: u64, output: Vec<u8>) -> Self {
        Self {
            success: true,
            units,
            output,
        }
    }

    /// Unsuccessful result carrying a validation code or error bytes
    pub fn failure(units: u64, output: &[u8]) -> Self {
        Self {
            success: false,
            units,
            output: output.to_vec(),
        }
    }
}

/// Render an error as an output payload
pub fn err_bytes(err: &Error) -> Vec<u8> {
    err.to_string().into_bytes()
}

/// Validation failure codes surfaced in unsuccessful results
pub mod output {
    /// Value field is zero
    pub const VALUE_ZERO: &[u8] = b"value is zero";
    /// Asset metadata exceeds the bound
    pub const METADATA_TOO_LARGE: &[u8] = b"metadata is too large";
    /// The native asset cannot be produced
    pub const ASSET_IS_NATIVE: &[u8] = b"asset is native";
    /// Referenced asset was never issued
    pub const ASSET_MISSING: &[u8] = b"asset missing";
    /// Cross-domain assets cannot be produced locally
    pub const CROSS_DOMAIN_ASSET: &[u8] = b"asset has cross-domain origin";
    /// Actor does not own the asset
    pub const WRONG_OWNER: &[u8] = b"wrong owner";
    /// Order input and output assets are identical
    pub const SAME_IN_OUT: &[u8] = b"in and out are identical";
    /// Input tick is zero
    pub const IN_TICK_ZERO: &[u8] = b"in tick is zero";
    /// Output tick is zero
    pub const OUT_TICK_ZERO: &[u8] = b"out tick is zero";
    /// Order supply is zero
    pub const SUPPLY_ZERO: &[u8] = b"supply is zero";
    /// Order supply is not a whole multiple of the output tick
    pub const SUPPLY_MISALIGNED: &[u8] = b"supply is misaligned";
    /// Referenced order does not exist
    pub const ORDER_MISSING: &[u8] = b"order missing";
    /// Actor is not authorized to close the order
    pub const UNAUTHORIZED: &[u8] = b"unauthorized";
    /// Supplied input asset does not match the order
    pub const WRONG_IN: &[u8] = b"wrong in asset";
    /// Supplied output asset does not match the order
    pub const WRONG_OUT: &[u8] = b"wrong out asset";
    /// Fill value is not a whole multiple of the input tick
    pub const VALUE_MISALIGNED: &[u8] = b"value is misaligned";
    /// Fill clipped to zero whole ticks
    pub const INSUFFICIENT_REMAINING: &[u8] = b"insufficient order remaining";
}

/// A deterministic state-transition action
pub trait Action {
    /// Every storage key this action may read or write, computed from its
    /// parameters and the invoking identity before execution
    fn state_keys(&self, actor: &Identity, tx_id: &Id) -> Vec<StateKey>;

    /// Deterministic unit cost, charged regardless of success
    fn max_units(&self) -> u64;

    /// Append the canonical field encoding (without the type byte)
    fn encode(&self, p: &mut Packer);

    /// Validate and mutate. Runs against a buffered overlay of `state`;
    /// mutations apply only when the whole action succeeds.
    fn execute(&self, state: &mut dyn StateView, actor: &Identity, tx_id: &Id) -> ExecResult;
}

/// An action tagged with its wire type, as delivered at block acceptance
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypedAction {
    /// Issue a new asset
    IssueAsset(IssueAsset),
    /// Mint supply to a recipient
    Produce(Produce),
    /// Burn supply from the actor's balance
    Consume(Consume),
    /// Escrow supply into a resting order
    CreateOrder(CreateOrder),
    /// Partially or fully fill a resting order
    FillOrder(FillOrder),
    /// Close a resting order and refund the escrow
    CloseOrder(CloseOrder),
}

impl TypedAction {
    /// The action as a trait object
    pub fn as_action(&self) -> &dyn Action {
        match self {
            TypedAction::IssueAsset(a) => a,
            TypedAction::Produce(a) => a,
            TypedAction::Consume(a) => a,
            TypedAction::CreateOrder(a) => a,
            TypedAction::FillOrder(a) => a,
            TypedAction::CloseOrder(a) => a,
        }
    }

    /// Wire type byte
    pub fn tag(&self) -> u8 {
        match self {
            TypedAction::IssueAsset(_) => ISSUE_ASSET_TAG,
            TypedAction::Produce(_) => PRODUCE_TAG,
            TypedAction::Consume(_) => CONSUME_TAG,
            TypedAction::CreateOrder(_) => CREATE_ORDER_TAG,
            TypedAction::FillOrder(_) => FILL_ORDER_TAG,
            TypedAction::CloseOrder(_) => CLOSE_ORDER_TAG,
        }
    }

    /// Canonical wire encoding: type byte followed by the field encoding
    pub fn encode(&self) -> Vec<u8> {
        let mut p = Packer::new();
        p.pack_u8(self.tag());
        self.as_action().encode(&mut p);
        p.into_bytes()
    }
}

/// Decode function for one action type
pub type DecodeFn = fn(&mut Unpacker<'_>) -> Result<TypedAction>;

/// Explicit action decoder registry.
///
/// Constructed at startup and passed by reference; there is no process-wide
/// registry. Unknown type bytes and malformed payloads are hard admission
/// failures.
#[derive(Debug, Default)]
pub struct ActionRegistry {
    decoders: HashMap<u8, DecodeFn>,
}

impl ActionRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a decoder for a type byte; replaces any existing entry
    pub fn register(&mut self, tag: u8, decode: DecodeFn) {
        self.decoders.insert(tag, decode);
    }

    /// Registry with all six standard actions
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry.register(ISSUE_ASSET_TAG, issue_asset::decode);
        registry.register(PRODUCE_TAG, produce::decode);
        registry.register(CONSUME_TAG, consume::decode);
        registry.register(CREATE_ORDER_TAG, create_order::decode);
        registry.register(FILL_ORDER_TAG, fill_order::decode);
        registry.register(CLOSE_ORDER_TAG, close_order::decode);
        registry
    }

    /// Decode a full action encoding (type byte plus fields). Trailing bytes
    /// are rejected.
    pub fn decode(&self, bytes: &[u8]) -> Result<TypedAction> {
        let mut u = Unpacker::new(bytes);
        let tag = u.unpack_u8()?;
        let decode = self
            .decoders
            .get(&tag)
            .ok_or_else(|| Error::Codec(format!("unknown action type {:#x}", tag)))?;
        let action = decode(&mut u)?;
        u.finish()?;
        Ok(action)
    }
}

/// Run an action's mutations against a buffered overlay of `state`,
/// committing only on success. The closure returns `Ok(output)` for a
/// successful action and `Err(code)` for a validation failure.
pub(crate) fn execute_buffered<F>(state: &mut dyn StateView, units: u64, body: F) -> ExecResult
where
    F: FnOnce(&mut StateOverlay<'_>) -> std::result::Result<Vec<u8>, FailureCode>,
{
    let mut overlay = StateOverlay::new(state);
    match body(&mut overlay) {
        Ok(out) => match overlay.commit() {
            Ok(()) => ExecResult::success(units, out),
            Err(err) => ExecResult::failure(units, &err_bytes(&err)),
        },
        Err(FailureCode::Output(code)) => ExecResult::failure(units, code),
        Err(FailureCode::Error(err)) => ExecResult::failure(units, &err_bytes(&err)),
    }
}

/// Why an action body bailed out: a validation code or a propagated error
pub(crate) enum FailureCode {
    Output(&'static [u8]),
    Error(Error),
}

impl From<Error> for FailureCode {
    fn from(err: Error) -> Self {
        FailureCode::Error(err)
    }
}
