//! Canonical wire codec
//!
//! Every action and record encodes through [`Packer`] and decodes through
//! [`Unpacker`]: fixed-width big-endian integers, raw 32-byte ids, and
//! `u16`-length-prefixed byte strings with a caller-supplied bound. Encoding
//! is the exact inverse of decoding; [`Unpacker::finish`] rejects trailing
//! bytes so a value has exactly one accepted encoding.

use crate::error::{Error, Result};
use crate::ids::{AssetId, Id, Identity, ID_LEN};
use bytes::{Buf, BufMut};

/// Canonical binary writer
#[derive(Debug, Default)]
pub struct Packer {
    buf: Vec<u8>,
}

impl Packer {
    /// New empty packer
    pub fn new() -> Self {
        Self::default()
    }

    /// Write a single byte
    pub fn pack_u8(&mut self, v: u8) {
        self.buf.put_u8(v);
    }

    /// Write a big-endian u16
    pub fn pack_u16(&mut self, v: u16) {
        self.buf.put_u16(v);
    }

    /// Write a big-endian u64
    pub fn pack_u64(&mut self, v: u64) {
        self.buf.put_u64(v);
    }

    /// Write a big-endian i64
    pub fn pack_i64(&mut self, v: i64) {
        self.buf.put_i64(v);
    }

    /// Write a raw 32-byte id
    pub fn pack_id(&mut self, id: &Id) {
        self.buf.put_slice(id.as_bytes());
    }

    /// Write a raw 32-byte identity
    pub fn pack_identity(&mut self, identity: &Identity) {
        self.buf.put_slice(identity.as_bytes());
    }

    /// Write an asset id (native encodes as 32 zero bytes)
    pub fn pack_asset_id(&mut self, asset: &AssetId) {
        self.buf.put_slice(&asset.to_bytes());
    }

    /// Write a u16-length-prefixed byte string
    pub fn pack_bytes(&mut self, bytes: &[u8]) {
        debug_assert!(bytes.len() <= u16::MAX as usize);
        self.buf.put_u16(bytes.len() as u16);
        self.buf.put_slice(bytes);
    }

    /// Finish and take the encoded bytes
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

/// Canonical binary reader
#[derive(Debug)]
pub struct Unpacker<'a> {
    buf: &'a [u8],
}

impl<'a> Unpacker<'a> {
    /// Read from a byte slice
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf }
    }

    fn need(&self, n: usize) -> Result<()> {
        if self.buf.remaining() < n {
            return Err(Error::Codec(format!(
                "unexpected end of input: need {}, have {}",
                n,
                self.buf.remaining()
            )));
        }
        Ok(())
    }

    /// Read a single byte
    pub fn unpack_u8(&mut self) -> Result<u8> {
        self.need(1)?;
        Ok(self.buf.get_u8())
    }

    /// Read a big-endian u16
    pub fn unpack_u16(&mut self) -> Result<u16> {
        self.need(2)?;
        Ok(self.buf.get_u16())
    }

    /// Read a big-endian u64; `require_nonzero` rejects zero at admission
    pub fn unpack_u64(&mut self, require_nonzero: bool) -> Result<u64> {
        self.need(8)?;
        let v = self.buf.get_u64();
        if require_nonzero && v == 0 {
            return Err(Error::Codec("expected non-zero u64".to_string()));
        }
        Ok(v)
    }

    /// Read a big-endian i64
    pub fn unpack_i64(&mut self) -> Result<i64> {
        self.need(8)?;
        Ok(self.buf.get_i64())
    }

    fn unpack_array(&mut self) -> Result<[u8; ID_LEN]> {
        self.need(ID_LEN)?;
        let mut out = [0u8; ID_LEN];
        self.buf.copy_to_slice(&mut out);
        Ok(out)
    }

    /// Read a 32-byte id; `require_nonzero` rejects the all-zero id
    pub fn unpack_id(&mut self, require_nonzero: bool) -> Result<Id> {
        let id = Id::new(self.unpack_array()?);
        if require_nonzero && id.is_zero() {
            return Err(Error::Codec("expected non-zero id".to_string()));
        }
        Ok(id)
    }

    /// Read a 32-byte identity; `require_nonzero` rejects the all-zero value
    pub fn unpack_identity(&mut self, require_nonzero: bool) -> Result<Identity> {
        let identity = Identity::new(self.unpack_array()?);
        if require_nonzero && identity.is_zero() {
            return Err(Error::Codec("expected non-zero identity".to_string()));
        }
        Ok(identity)
    }

    /// Read an asset id (all-zero decodes to native)
    pub fn unpack_asset_id(&mut self) -> Result<AssetId> {
        Ok(AssetId::from_bytes(self.unpack_array()?))
    }

    /// Read a u16-length-prefixed byte string of at most `limit` bytes
    pub fn unpack_bytes(&mut self, limit: usize) -> Result<Vec<u8>> {
        let len = self.unpack_u16()? as usize;
        if len > limit {
            return Err(Error::Codec(format!(
                "byte string too long: {} > {}",
                len, limit
            )));
        }
        self.need(len)?;
        let mut out = vec![0u8; len];
        self.buf.copy_to_slice(&mut out);
        Ok(out)
    }

    /// Bytes not yet consumed
    pub fn remaining(&self) -> usize {
        self.buf.remaining()
    }

    /// Assert the input is fully consumed
    pub fn finish(self) -> Result<()> {
        if self.buf.has_remaining() {
            return Err(Error::Codec(format!(
                "{} trailing bytes after decode",
                self.buf.remaining()
            )));
        }
        Ok(())
    }
}
