//! NØNOS Manifest Header
//!
//! Layout (little-endian):
//!   +----------------------+ 0
//!   | magic                | 4  (46 4D 4F 44, the LE dword 0x444F4D46)
//!   | version              | 2  (u16)
//!   | sig_alg              | 2  (u16)  1 = Ed25519
//!   | header_len           | 2  (u16)  offset of the first TLV record
//!   | reserved             | 2  (u16)  zero, carried verbatim
//!   +----------------------+ 12 == HEADER_FIELDS_LEN
//!   | extension bytes      | header_len - 12 (zero in version 1)
//!   +----------------------+ header_len
//!
//! Readers always seek to `header_len`; `HEADER_LEN` is only what this
//! version of the builder writes.

use crate::codec::{ByteReader, ByteWriter};
use crate::error::{ManifestError, Result};

pub const MANIFEST_MAGIC: [u8; 4] = 0x444F_4D46u32.to_le_bytes();
pub const FORMAT_VERSION: u16 = 1;

/// Bytes taken by the fields defined in this version.
pub const HEADER_FIELDS_LEN: usize = 12;

/// Header length written by the builder for format version 1.
pub const HEADER_LEN: u16 = 16;

/// Signature scheme identifier carried in `sig_alg`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SigAlgo {
    Ed25519,
    Unknown(u16),
}

impl SigAlgo {
    pub const ED25519_ID: u16 = 1;

    pub fn from_u16(v: u16) -> Self {
        match v {
            Self::ED25519_ID => SigAlgo::Ed25519,
            other => SigAlgo::Unknown(other),
        }
    }

    pub fn as_u16(self) -> u16 {
        match self {
            SigAlgo::Ed25519 => Self::ED25519_ID,
            SigAlgo::Unknown(v) => v,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ManifestHeader {
    pub magic: [u8; 4],
    pub version: u16,
    pub sig_alg: u16,
    pub header_len: u16,
    pub reserved: u16,
}

impl ManifestHeader {
    /// Header the builder emits for the current format.
    pub fn current() -> Self {
        Self {
            magic: MANIFEST_MAGIC,
            version: FORMAT_VERSION,
            sig_alg: SigAlgo::Ed25519.as_u16(),
            header_len: HEADER_LEN,
            reserved: 0,
        }
    }

    pub fn sig_algo(&self) -> SigAlgo {
        SigAlgo::from_u16(self.sig_alg)
    }

    /// Write the defined fields followed by `extension`, which must fill the
    /// header exactly up to `header_len`.
    pub fn encode(&self, w: &mut ByteWriter, extension: &[u8]) -> Result<()> {
        if (self.header_len as usize) < HEADER_FIELDS_LEN
            || self.header_len as usize != HEADER_FIELDS_LEN + extension.len()
        {
            return Err(ManifestError::BadHeaderLength(self.header_len));
        }
        w.put_bytes(&self.magic);
        w.put_u16(self.version);
        w.put_u16(self.sig_alg);
        w.put_u16(self.header_len);
        w.put_u16(self.reserved);
        w.put_bytes(extension);
        Ok(())
    }

    /// Read and check the defined fields. Leaves the reader right after them;
    /// the caller seeks to `header_len`.
    pub fn decode(r: &mut ByteReader<'_>) -> Result<Self> {
        if r.remaining() < HEADER_FIELDS_LEN {
            return Err(ManifestError::TruncatedInput {
                offset: r.offset(),
                needed: HEADER_FIELDS_LEN,
                remaining: r.remaining(),
            });
        }

        let magic = r.get_array::<4>()?;
        if magic != MANIFEST_MAGIC {
            return Err(ManifestError::BadMagic(magic));
        }

        let version = r.get_u16()?;
        if version != FORMAT_VERSION {
            return Err(ManifestError::UnsupportedVersion(version));
        }

        let sig_alg = r.get_u16()?;
        let header_len = r.get_u16()?;
        let reserved = r.get_u16()?;
        if (header_len as usize) < HEADER_FIELDS_LEN {
            return Err(ManifestError::BadHeaderLength(header_len));
        }

        Ok(Self { magic, version, sig_alg, header_len, reserved })
    }
}
