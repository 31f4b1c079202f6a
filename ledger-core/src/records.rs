//! Record layouts and storage operations
//!
//! Canonical value layouts for the five record kinds, plus the atomic
//! read-modify-write primitives the actions are built on. All integer fields
//! are big-endian fixed width. Balances and credits use tombstone-by-absence:
//! a missing record reads as zero and a record that reaches zero is deleted,
//! never stored as zero.

use crate::codec::{Packer, Unpacker};
use crate::error::{Error, Result};
use crate::ids::{AssetId, Id, Identity};
use crate::keys;
use crate::math;
use crate::state::StateView;

/// Upper bound on asset metadata length
pub const MAX_METADATA_LEN: usize = 256;

// ---------------------------------------------------------------------------
// Receipts
// ---------------------------------------------------------------------------

/// Transaction receipt: `timestamp(8) | success(1) | units(8)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Receipt {
    /// Timestamp of the accepting block
    pub timestamp: i64,
    /// Whether the action executed successfully
    pub success: bool,
    /// Units consumed, success or not
    pub units: u64,
}

impl Receipt {
    /// Canonical encoding
    pub fn encode(&self) -> Vec<u8> {
        let mut p = Packer::new();
        p.pack_i64(self.timestamp);
        p.pack_u8(if self.success { 0x1 } else { 0x0 });
        p.pack_u64(self.units);
        p.into_bytes()
    }

    /// Decode the canonical encoding
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let mut u = Unpacker::new(bytes);
        let timestamp = u.unpack_i64()?;
        let success = match u.unpack_u8()? {
            0x0 => false,
            0x1 => true,
            b => return Err(Error::Codec(format!("invalid success byte {:#x}", b))),
        };
        let units = u.unpack_u64(false)?;
        u.finish()?;
        Ok(Self {
            timestamp,
            success,
            units,
        })
    }
}

// ---------------------------------------------------------------------------
// Balances
// ---------------------------------------------------------------------------

fn decode_amount(bytes: &[u8]) -> Result<u64> {
    let mut u = Unpacker::new(bytes);
    let amount = u.unpack_u64(false)?;
    u.finish()?;
    Ok(amount)
}

/// Balance of `owner` in `asset`; absent record reads as zero
pub fn get_balance(state: &dyn StateView, owner: &Identity, asset: &AssetId) -> Result<u64> {
    match state.get(&keys::balance_key(owner, asset))? {
        Some(v) => decode_amount(&v),
        None => Ok(0),
    }
}

/// Overwrite a balance record
pub fn set_balance(
    state: &mut dyn StateView,
    owner: &Identity,
    asset: &AssetId,
    amount: u64,
) -> Result<()> {
    state.insert(&keys::balance_key(owner, asset), &amount.to_be_bytes())
}

/// Credit `amount` to a balance, overflow-checked.
///
/// The arithmetic failure is returned before any write; a zero result deletes
/// the record.
pub fn add_balance(
    state: &mut dyn StateView,
    owner: &Identity,
    asset: &AssetId,
    amount: u64,
) -> Result<()> {
    let current = get_balance(state, owner, asset)?;
    store_amount(
        state,
        &keys::balance_key(owner, asset),
        math::add(current, amount)?,
    )
}

/// Debit `amount` from a balance, underflow-checked
pub fn sub_balance(
    state: &mut dyn StateView,
    owner: &Identity,
    asset: &AssetId,
    amount: u64,
) -> Result<()> {
    let current = get_balance(state, owner, asset)?;
    store_amount(
        state,
        &keys::balance_key(owner, asset),
        math::sub(current, amount)?,
    )
}

fn store_amount(state: &mut dyn StateView, key: &[u8], amount: u64) -> Result<()> {
    if amount == 0 {
        return state.remove(key);
    }
    state.insert(key, &amount.to_be_bytes())
}

// ---------------------------------------------------------------------------
// Credits
// ---------------------------------------------------------------------------

/// Cross-domain transfer credit for (asset, destination); absent reads as zero
pub fn get_credit(state: &dyn StateView, asset: &AssetId, destination: &Id) -> Result<u64> {
    match state.get(&keys::credit_key(asset, destination))? {
        Some(v) => decode_amount(&v),
        None => Ok(0),
    }
}

/// Credit `amount` to a cross-domain credit record, overflow-checked
pub fn add_credit(
    state: &mut dyn StateView,
    asset: &AssetId,
    destination: &Id,
    amount: u64,
) -> Result<()> {
    let current = get_credit(state, asset, destination)?;
    store_amount(
        state,
        &keys::credit_key(asset, destination),
        math::add(current, amount)?,
    )
}

/// Debit `amount` from a cross-domain credit record, underflow-checked
pub fn sub_credit(
    state: &mut dyn StateView,
    asset: &AssetId,
    destination: &Id,
    amount: u64,
) -> Result<()> {
    let current = get_credit(state, asset, destination)?;
    store_amount(
        state,
        &keys::credit_key(asset, destination),
        math::sub(current, amount)?,
    )
}

// ---------------------------------------------------------------------------
// Assets
// ---------------------------------------------------------------------------

/// Asset record: `metadata_len(2) | metadata | supply(8) | owner(32) | origin(1)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    /// Bounded descriptive bytes, fixed at issuance
    pub metadata: Vec<u8>,
    /// Outstanding supply
    pub supply: u64,
    /// The issuing identity; only it may produce
    pub owner: Identity,
    /// True when the asset arrived via a cross-domain transfer
    pub cross_domain: bool,
}

impl Asset {
    /// Canonical encoding
    pub fn encode(&self) -> Vec<u8> {
        let mut p = Packer::new();
        p.pack_bytes(&self.metadata);
        p.pack_u64(self.supply);
        p.pack_identity(&self.owner);
        p.pack_u8(if self.cross_domain { 0x1 } else { 0x0 });
        p.into_bytes()
    }

    /// Decode the canonical encoding
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let mut u = Unpacker::new(bytes);
        let metadata = u.unpack_bytes(MAX_METADATA_LEN)?;
        let supply = u.unpack_u64(false)?;
        let owner = u.unpack_identity(false)?;
        let cross_domain = u.unpack_u8()? == 0x1;
        u.finish()?;
        Ok(Self {
            metadata,
            supply,
            owner,
            cross_domain,
        })
    }
}

/// Fetch an asset record; `Ok(None)` when it was never issued
pub fn get_asset(state: &dyn StateView, asset: &AssetId) -> Result<Option<Asset>> {
    match state.get(&keys::asset_key(asset))? {
        Some(v) => Ok(Some(Asset::decode(&v)?)),
        None => Ok(None),
    }
}

/// Whole-record overwrite of an asset
pub fn set_asset(state: &mut dyn StateView, asset: &AssetId, record: &Asset) -> Result<()> {
    state.insert(&keys::asset_key(asset), &record.encode())
}

/// Delete an asset record
pub fn delete_asset(state: &mut dyn StateView, asset: &AssetId) -> Result<()> {
    state.remove(&keys::asset_key(asset))
}

// ---------------------------------------------------------------------------
// Orders
// ---------------------------------------------------------------------------

/// Resting order: `in(32) | in_tick(8) | out(32) | out_tick(8) | remaining(8) | owner(32)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Order {
    /// Asset the order creator wants to receive
    pub input: AssetId,
    /// Input units per tick
    pub in_tick: u64,
    /// Asset the order creator escrowed and is selling
    pub output: AssetId,
    /// Output units per tick
    pub out_tick: u64,
    /// Escrowed output still available; a whole multiple of `out_tick`
    pub remaining: u64,
    /// The order creator
    pub owner: Identity,
}

impl Order {
    /// Canonical encoding
    pub fn encode(&self) -> Vec<u8> {
        let mut p = Packer::new();
        p.pack_asset_id(&self.input);
        p.pack_u64(self.in_tick);
        p.pack_asset_id(&self.output);
        p.pack_u64(self.out_tick);
        p.pack_u64(self.remaining);
        p.pack_identity(&self.owner);
        p.into_bytes()
    }

    /// Decode the canonical encoding
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let mut u = Unpacker::new(bytes);
        let input = u.unpack_asset_id()?;
        let in_tick = u.unpack_u64(false)?;
        let output = u.unpack_asset_id()?;
        let out_tick = u.unpack_u64(false)?;
        let remaining = u.unpack_u64(false)?;
        let owner = u.unpack_identity(false)?;
        u.finish()?;
        Ok(Self {
            input,
            in_tick,
            output,
            out_tick,
            remaining,
            owner,
        })
    }
}

/// Fetch an order record; `Ok(None)` when closed or never created
pub fn get_order(state: &dyn StateView, order: &Id) -> Result<Option<Order>> {
    match state.get(&keys::order_key(order))? {
        Some(v) => Ok(Some(Order::decode(&v)?)),
        None => Ok(None),
    }
}

/// Whole-record overwrite of an order
pub fn set_order(state: &mut dyn StateView, order: &Id, record: &Order) -> Result<()> {
    state.insert(&keys::order_key(order), &record.encode())
}

/// Delete an order record
pub fn delete_order(state: &mut dyn StateView, order: &Id) -> Result<()> {
    state.remove(&keys::order_key(order))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::MemState;

    fn owner() -> Identity {
        Identity::new([9u8; 32])
    }

    fn asset() -> AssetId {
        AssetId::Issued(Id::from_data(b"kwh"))
    }

    #[test]
    fn test_receipt_roundtrip() {
        let receipt = Receipt {
            timestamp: 1_700_000_000,
            success: true,
            units: 88,
        };
        assert_eq!(Receipt::decode(&receipt.encode()).unwrap(), receipt);
        // layout: 8 + 1 + 8
        assert_eq!(receipt.encode().len(), 17);
    }

    #[test]
    fn test_receipt_rejects_bad_success_byte() {
        let mut bytes = Receipt {
            timestamp: 0,
            success: false,
            units: 0,
        }
        .encode();
        bytes[8] = 0x2;
        assert!(Receipt::decode(&bytes).is_err());
    }

    #[test]
    fn test_balance_absent_is_zero() {
        let state = MemState::new();
        assert_eq!(get_balance(&state, &owner(), &asset()).unwrap(), 0);
    }

    #[test]
    fn test_balance_add_sub_tombstone() {
        let mut state = MemState::new();
        add_balance(&mut state, &owner(), &asset(), 100).unwrap();
        assert_eq!(get_balance(&state, &owner(), &asset()).unwrap(), 100);

        sub_balance(&mut state, &owner(), &asset(), 100).unwrap();
        assert_eq!(get_balance(&state, &owner(), &asset()).unwrap(), 0);
        // zero-valued record deleted, not stored
        assert!(state.is_empty());
    }

    #[test]
    fn test_balance_underflow_no_partial_write() {
        let mut state = MemState::new();
        add_balance(&mut state, &owner(), &asset(), 10).unwrap();
        assert!(sub_balance(&mut state, &owner(), &asset(), 11)
            .unwrap_err()
            .is_arithmetic());
        assert_eq!(get_balance(&state, &owner(), &asset()).unwrap(), 10);
    }

    #[test]
    fn test_balance_overflow_detected() {
        let mut state = MemState::new();
        add_balance(&mut state, &owner(), &asset(), u64::MAX).unwrap();
        assert!(add_balance(&mut state, &owner(), &asset(), 1)
            .unwrap_err()
            .is_arithmetic());
        assert_eq!(get_balance(&state, &owner(), &asset()).unwrap(), u64::MAX);
    }

    #[test]
    fn test_credit_tombstone() {
        let mut state = MemState::new();
        let dest = Id::from_data(b"domain");
        add_credit(&mut state, &asset(), &dest, 5).unwrap();
        assert_eq!(get_credit(&state, &asset(), &dest).unwrap(), 5);
        sub_credit(&mut state, &asset(), &dest, 5).unwrap();
        assert!(state.is_empty());
    }

    #[test]
    fn test_asset_roundtrip() {
        let mut state = MemState::new();
        let record = Asset {
            metadata: b"kwh".to_vec(),
            supply: 1000,
            owner: owner(),
            cross_domain: false,
        };
        set_asset(&mut state, &asset(), &record).unwrap();
        assert_eq!(get_asset(&state, &asset()).unwrap(), Some(record));

        delete_asset(&mut state, &asset()).unwrap();
        assert_eq!(get_asset(&state, &asset()).unwrap(), None);
    }

    #[test]
    fn test_asset_layout_matches_spec() {
        let record = Asset {
            metadata: b"ab".to_vec(),
            supply: 7,
            owner: owner(),
            cross_domain: true,
        };
        let bytes = record.encode();
        // metadata_len(2) | metadata(2) | supply(8) | owner(32) | origin(1)
        assert_eq!(bytes.len(), 2 + 2 + 8 + 32 + 1);
        assert_eq!(&bytes[..2], &[0, 2]);
        assert_eq!(bytes[bytes.len() - 1], 0x1);
    }

    #[test]
    fn test_order_roundtrip() {
        let mut state = MemState::new();
        let id = Id::from_data(b"order");
        let record = Order {
            input: AssetId::Native,
            in_tick: 1,
            output: asset(),
            out_tick: 10,
            remaining: 100,
            owner: owner(),
        };
        set_order(&mut state, &id, &record).unwrap();
        assert_eq!(get_order(&state, &id).unwrap(), Some(record));
        assert_eq!(record.encode().len(), 32 + 8 + 32 + 8 + 8 + 32);

        delete_order(&mut state, &id).unwrap();
        assert_eq!(get_order(&state, &id).unwrap(), None);
    }
}
