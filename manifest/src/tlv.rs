//! NØNOS Manifest TLV Record Layer
//!
//! Record framing (little-endian, no padding, no terminator):
//!
//! ```text
//!   +-----------+-----------+------------------+
//!   | tag (u16) | len (u16) | value (len bytes)|
//!   +-----------+-----------+------------------+
//! ```
//!
//! The stream ends where the buffer ends. Tags are an open set: unknown tags
//! are framed and yielded like any other so newer manifests still scan on
//! older parsers. Which tags are mandatory is the parser's business, checked
//! after the whole stream has been read.

use core::fmt;

use crate::codec::{ByteReader, ByteWriter};
use crate::error::{ManifestError, Result};

/// Size of the tag + length prefix of every record.
pub const RECORD_HEADER_LEN: usize = 4;

/// Largest value a single record can frame.
pub const MAX_VALUE_LEN: usize = u16::MAX as usize;

pub const BUILD_UUID_LEN: usize = 16;
pub const BRIDGE_IPV4_LEN: usize = 5;
pub const EGRESS_NAT_LEN: usize = 1;

/// Record tag. Any u16 is a valid tag; only three are interpreted.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Tag(pub u16);

impl Tag {
    /// 4 IPv4 octets followed by the prefix byte.
    pub const BRIDGE_IPV4: Tag = Tag(0x0001);
    /// Single byte, 0 or 1.
    pub const EGRESS_NAT: Tag = Tag(0x0002);
    /// 16 raw UUID bytes.
    pub const BUILD_UUID: Tag = Tag(0x0003);

    /// Tags this crate understands, in the order the builder emits them.
    pub const KNOWN: [Tag; 3] = [Tag::BUILD_UUID, Tag::BRIDGE_IPV4, Tag::EGRESS_NAT];

    pub fn name(self) -> Option<&'static str> {
        match self {
            Tag::BRIDGE_IPV4 => Some("bridge_ipv4"),
            Tag::EGRESS_NAT => Some("egress_nat"),
            Tag::BUILD_UUID => Some("build_uuid"),
            _ => None,
        }
    }

    /// Exact value width for fixed-width tags; `None` for unknown tags.
    pub fn fixed_width(self) -> Option<usize> {
        match self {
            Tag::BRIDGE_IPV4 => Some(BRIDGE_IPV4_LEN),
            Tag::EGRESS_NAT => Some(EGRESS_NAT_LEN),
            Tag::BUILD_UUID => Some(BUILD_UUID_LEN),
            _ => None,
        }
    }

    pub fn is_known(self) -> bool {
        self.name().is_some()
    }
}

impl fmt::Debug for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "0x{:04x}({})", self.0, name),
            None => write!(f, "0x{:04x}", self.0),
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

fn check_width(tag: Tag, len: usize) -> Result<()> {
    if let (Some(field), Some(expected)) = (tag.name(), tag.fixed_width()) {
        if expected != len {
            return Err(ManifestError::LengthMismatch { field, expected, actual: len });
        }
    }
    Ok(())
}

/// Append one record.
pub fn encode_record(w: &mut ByteWriter, tag: Tag, value: &[u8]) -> Result<()> {
    if value.len() > MAX_VALUE_LEN {
        return Err(ManifestError::OversizeValue { tag: tag.0, len: value.len() });
    }
    check_width(tag, value.len())?;
    w.put_u16(tag.0);
    w.put_u16(value.len() as u16);
    w.put_bytes(value);
    Ok(())
}

/// A record borrowed from a manifest buffer. `offset` is where its tag sits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Record<'a> {
    pub tag: Tag,
    pub offset: usize,
    pub value: &'a [u8],
}

impl Record<'_> {
    pub fn to_owned(&self) -> TlvRecord {
        TlvRecord { tag: self.tag, value: self.value.to_vec() }
    }
}

/// Owned record, used to carry unknown tags through decode/re-encode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlvRecord {
    pub tag: Tag,
    pub value: Vec<u8>,
}

/// Record stream from a start offset to the end of the buffer.
///
/// Yields each record in wire order. Stops for good after the first error.
pub struct Records<'a> {
    reader: ByteReader<'a>,
    done: bool,
}

impl<'a> Records<'a> {
    pub fn new(buf: &'a [u8], start: usize) -> Result<Self> {
        let mut reader = ByteReader::new(buf);
        reader.skip_to(start)?;
        Ok(Self { reader, done: false })
    }

    fn read_one(&mut self) -> Result<Record<'a>> {
        let offset = self.reader.offset();
        let remaining = self.reader.remaining();
        if remaining < RECORD_HEADER_LEN {
            return Err(ManifestError::TrailingGarbage { offset, remaining });
        }

        let tag = Tag(self.reader.get_u16()?);
        let declared = self.reader.get_u16()? as usize;
        check_width(tag, declared)?;

        let value = self.reader.get_bytes(declared).map_err(|_| ManifestError::TruncatedRecord {
            tag: tag.0,
            offset,
            declared,
            remaining: self.reader.remaining(),
        })?;

        Ok(Record { tag, offset, value })
    }
}

impl<'a> Iterator for Records<'a> {
    type Item = Result<Record<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.reader.remaining() == 0 {
            return None;
        }
        let rec = self.read_one();
        if rec.is_err() {
            self.done = true;
        }
        Some(rec)
    }
}

/// Scan every record from `start` to the end of `buf`.
pub fn decode_records(buf: &[u8], start: usize) -> Result<Vec<Record<'_>>> {
    Records::new(buf, start)?.collect()
}
