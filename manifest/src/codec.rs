//! NØNOS Manifest Field Codec
//!
//! Fixed-width little-endian integers and known-length byte blobs. Header and
//! TLV framing both go through here; nothing in the crate reads or writes
//! integers in host byte order.

use crate::error::{ManifestError, Result};

/// Append the low `width` bytes of `value`, least significant first.
///
/// `width` must be 1, 2, 4 or 8 and `value` must fit in it.
pub fn put_le(out: &mut Vec<u8>, value: u64, width: usize) {
    debug_assert!(matches!(width, 1 | 2 | 4 | 8));
    debug_assert!(width == 8 || value >> (width * 8) == 0);
    out.extend_from_slice(&value.to_le_bytes()[..width]);
}

/// Decode a `width`-byte little-endian integer from the front of `bytes`.
pub fn get_le(bytes: &[u8], width: usize) -> Result<u64> {
    debug_assert!(matches!(width, 1 | 2 | 4 | 8));
    if bytes.len() < width {
        return Err(ManifestError::TruncatedInput {
            offset: 0,
            needed: width,
            remaining: bytes.len(),
        });
    }
    let mut raw = [0u8; 8];
    raw[..width].copy_from_slice(&bytes[..width]);
    Ok(u64::from_le_bytes(raw))
}

/// Append-only encoder.
#[derive(Debug, Default)]
pub struct ByteWriter {
    buf: Vec<u8>,
}

impl ByteWriter {
    pub fn with_capacity(cap: usize) -> Self {
        Self { buf: Vec::with_capacity(cap) }
    }

    #[inline]
    pub fn put_u8(&mut self, v: u8) {
        put_le(&mut self.buf, v.into(), 1);
    }

    #[inline]
    pub fn put_u16(&mut self, v: u16) {
        put_le(&mut self.buf, v.into(), 2);
    }

    #[inline]
    pub fn put_u32(&mut self, v: u32) {
        put_le(&mut self.buf, v.into(), 4);
    }

    #[inline]
    pub fn put_bytes(&mut self, b: &[u8]) {
        self.buf.extend_from_slice(b);
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

/// Bounds-checked cursor over a borrowed buffer. Offsets in errors are
/// absolute positions in that buffer.
#[derive(Debug, Clone)]
pub struct ByteReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    #[inline]
    pub fn offset(&self) -> usize {
        self.pos
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// Borrow the next `n` bytes and advance past them.
    pub fn get_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        if self.remaining() < n {
            return Err(ManifestError::TruncatedInput {
                offset: self.pos,
                needed: n,
                remaining: self.remaining(),
            });
        }
        let out = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(out)
    }

    /// Read exactly `N` bytes into an array.
    pub fn get_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.get_bytes(N)?);
        Ok(out)
    }

    fn get_uint(&mut self, width: usize) -> Result<u64> {
        let at = self.pos;
        let bytes = self.get_bytes(width)?;
        get_le(bytes, width).map_err(|_| ManifestError::TruncatedInput {
            offset: at,
            needed: width,
            remaining: bytes.len(),
        })
    }

    pub fn get_u8(&mut self) -> Result<u8> {
        Ok(self.get_uint(1)? as u8)
    }

    pub fn get_u16(&mut self) -> Result<u16> {
        Ok(self.get_uint(2)? as u16)
    }

    pub fn get_u32(&mut self) -> Result<u32> {
        Ok(self.get_uint(4)? as u32)
    }

    /// Move the cursor forward to absolute offset `to`.
    pub fn skip_to(&mut self, to: usize) -> Result<()> {
        if to < self.pos {
            return Ok(());
        }
        self.get_bytes(to - self.pos).map(|_| ())
    }
}
