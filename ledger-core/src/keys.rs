//! Storage key namespace
//!
//! One leading tag byte per record kind keeps the key spaces disjoint and
//! lexicographically grouped no matter what the field values are. Field order
//! and width after the tag are fixed, so two logically equal keys are always
//! byte-identical. Builders return fixed-size arrays; nothing here allocates.

use crate::ids::{AssetId, Id, Identity, ID_LEN};

/// Transaction receipt records
pub const TX_TAG: u8 = 0x0;
/// Account balance records
pub const BALANCE_TAG: u8 = 0x1;
/// Asset records
pub const ASSET_TAG: u8 = 0x2;
/// Resting order records
pub const ORDER_TAG: u8 = 0x3;
/// Cross-domain credit records
pub const CREDIT_TAG: u8 = 0x4;
/// Last accepted height
pub const HEIGHT_TAG: u8 = 0x5;
/// Incoming cross-domain messages
pub const INCOMING_MSG_TAG: u8 = 0x6;
/// Outgoing cross-domain messages
pub const OUTGOING_MSG_TAG: u8 = 0x7;

/// `0x0 | tx_id`
pub fn tx_key(id: &Id) -> [u8; 1 + ID_LEN] {
    tagged_id(TX_TAG, id.as_bytes())
}

/// `0x1 | identity | asset`
pub fn balance_key(owner: &Identity, asset: &AssetId) -> [u8; 1 + ID_LEN * 2] {
    tagged_pair(BALANCE_TAG, owner.as_bytes(), &asset.to_bytes())
}

/// `0x2 | asset`
pub fn asset_key(asset: &AssetId) -> [u8; 1 + ID_LEN] {
    tagged_id(ASSET_TAG, &asset.to_bytes())
}

/// `0x3 | order_id`
pub fn order_key(order: &Id) -> [u8; 1 + ID_LEN] {
    tagged_id(ORDER_TAG, order.as_bytes())
}

/// `0x4 | asset | destination`
pub fn credit_key(asset: &AssetId, destination: &Id) -> [u8; 1 + ID_LEN * 2] {
    tagged_pair(CREDIT_TAG, &asset.to_bytes(), destination.as_bytes())
}

/// `0x5`
pub fn height_key() -> [u8; 1] {
    [HEIGHT_TAG]
}

/// `0x6 | source_domain | msg_id`
pub fn incoming_msg_key(source_domain: &Id, msg_id: &Id) -> [u8; 1 + ID_LEN * 2] {
    tagged_pair(INCOMING_MSG_TAG, source_domain.as_bytes(), msg_id.as_bytes())
}

/// `0x7 | tx_id`
pub fn outgoing_msg_key(tx_id: &Id) -> [u8; 1 + ID_LEN] {
    tagged_id(OUTGOING_MSG_TAG, tx_id.as_bytes())
}

fn tagged_id(tag: u8, id: &[u8; ID_LEN]) -> [u8; 1 + ID_LEN] {
    let mut k = [0u8; 1 + ID_LEN];
    k[0] = tag;
    k[1..].copy_from_slice(id);
    k
}

fn tagged_pair(tag: u8, a: &[u8; ID_LEN], b: &[u8; ID_LEN]) -> [u8; 1 + ID_LEN * 2] {
    let mut k = [0u8; 1 + ID_LEN * 2];
    k[0] = tag;
    k[1..1 + ID_LEN].copy_from_slice(a);
    k[1 + ID_LEN..].copy_from_slice(b);
    k
}
