//! Fixed-width identifiers
//!
//! Transactions, assets, orders, and cross-domain destinations are all keyed
//! by 32-byte opaque ids. Account identities are the same width. Both encode
//! as raw bytes everywhere, so every logically equal value has exactly one
//! byte representation.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

/// Width of [`Id`] and [`Identity`] in bytes
pub const ID_LEN: usize = 32;

/// 32-byte opaque identifier (transaction, asset, order, domain, message)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Id([u8; ID_LEN]);

impl Id {
    /// Wrap raw bytes
    pub const fn new(bytes: [u8; ID_LEN]) -> Self {
        Self(bytes)
    }

    /// Derive an id from arbitrary bytes (SHA-256)
    pub fn from_data(data: &[u8]) -> Self {
        Self(Sha256::digest(data).into())
    }

    /// Raw bytes
    pub fn as_bytes(&self) -> &[u8; ID_LEN] {
        &self.0
    }

    /// True if every byte is zero
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; ID_LEN]
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_hex(f, &self.0)
    }
}

impl FromStr for Id {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        Ok(Self(parse_hex(s)?))
    }
}

/// Account identity: the invoking-party value extracted from an authenticated
/// transaction by the (external) auth layer. Opaque to this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Identity([u8; ID_LEN]);

impl Identity {
    /// Wrap raw bytes
    pub const fn new(bytes: [u8; ID_LEN]) -> Self {
        Self(bytes)
    }

    /// Raw bytes
    pub fn as_bytes(&self) -> &[u8; ID_LEN] {
        &self.0
    }

    /// True if every byte is zero
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; ID_LEN]
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_hex(f, &self.0)
    }
}

/// Asset identifier.
///
/// The native unit of account and issued assets are distinct cases rather
/// than an all-zero sentinel id. On the wire and in keys, `Native` still
/// encodes as 32 zero bytes, so the canonical layouts are unchanged; only the
/// type system gained the distinction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AssetId {
    /// The native unit of account
    Native,
    /// An asset created by an issuance transaction (keyed by that tx id)
    Issued(Id),
}

impl AssetId {
    /// Canonical 32-byte encoding
    pub fn to_bytes(&self) -> [u8; ID_LEN] {
        match self {
            AssetId::Native => [0u8; ID_LEN],
            AssetId::Issued(id) => *id.as_bytes(),
        }
    }

    /// Decode from the canonical 32-byte form: all-zero is `Native`
    pub fn from_bytes(bytes: [u8; ID_LEN]) -> Self {
        if bytes == [0u8; ID_LEN] {
            AssetId::Native
        } else {
            AssetId::Issued(Id::new(bytes))
        }
    }

    /// True for the native unit of account
    pub fn is_native(&self) -> bool {
        matches!(self, AssetId::Native)
    }
}

impl Default for AssetId {
    fn default() -> Self {
        AssetId::Native
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetId::Native => write!(f, "native"),
            AssetId::Issued(id) => write!(f, "{}", id),
        }
    }
}

impl FromStr for AssetId {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        if s == "native" {
            return Ok(AssetId::Native);
        }
        let id = Id::from_str(s)?;
        if id.is_zero() {
            return Ok(AssetId::Native);
        }
        Ok(AssetId::Issued(id))
    }
}

fn write_hex(f: &mut fmt::Formatter<'_>, bytes: &[u8]) -> fmt::Result {
    for b in bytes {
        write!(f, "{:02x}", b)?;
    }
    Ok(())
}

fn parse_hex(s: &str) -> crate::Result<[u8; ID_LEN]> {
    let s = s.as_bytes();
    if s.len() != ID_LEN * 2 {
        return Err(crate::Error::Codec(format!(
            "expected {} hex chars, got {}",
            ID_LEN * 2,
            s.len()
        )));
    }
    let digit = |c: u8| -> crate::Result<u8> {
        match c {
            b'0'..=b'9' => Ok(c - b'0'),
            b'a'..=b'f' => Ok(c - b'a' + 10),
            b'A'..=b'F' => Ok(c - b'A' + 10),
            _ => Err(crate::Error::Codec(format!("invalid hex char {:?}", c as char))),
        }
    };
    let mut out = [0u8; ID_LEN];
    for (i, chunk) in s.chunks_exact(2).enumerate() {
        out[i] = (digit(chunk[0])? << 4) | digit(chunk[1])?;
    }
    Ok(out)
}
