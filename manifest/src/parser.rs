//! NØNOS Manifest Parser
//!
//! Symmetric counterpart of the builder. Anything the builder emits parses;
//! any buffer breaking a format invariant is rejected outright, never loaded
//! with partial or defaulted data.

use tracing::{debug, warn};

use crate::builder::encode_with;
use crate::codec::ByteReader;
use crate::error::{ManifestError, Result};
use crate::facts::{BridgeConfig, ManifestFacts};
use crate::header::{ManifestHeader, HEADER_FIELDS_LEN};
use crate::tlv::{Record, Records, Tag, TlvRecord};

/// Fully decoded manifest, including whatever this parser does not
/// interpret, so it can be re-emitted byte for byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    pub header: ManifestHeader,
    /// Header bytes between the defined fields and `header_len`.
    pub extension: Vec<u8>,
    pub facts: ManifestFacts,
    /// Unknown records in wire order.
    pub unknown: Vec<TlvRecord>,
}

impl Manifest {
    /// Re-encode. Mandatory records come out in canonical order, unknown
    /// records after them.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        encode_with(&self.header, &self.extension, &self.facts, &self.unknown)
    }
}

/// Parse `buf` and return only the provisioning facts.
pub fn parse(buf: &[u8]) -> Result<ManifestFacts> {
    decode(buf).map(|m| m.facts)
}

/// Parse `buf` into the full manifest view.
pub fn decode(buf: &[u8]) -> Result<Manifest> {
    let mut r = ByteReader::new(buf);
    let header = ManifestHeader::decode(&mut r).map_err(|e| {
        warn!(error = %e, "manifest header rejected");
        e
    })?;

    let start = header.header_len as usize;
    r.skip_to(start)?;
    let extension = buf[HEADER_FIELDS_LEN..start].to_vec();

    let mut build_uuid = None;
    let mut bridge = None;
    let mut egress_nat = None;
    let mut unknown = Vec::new();

    for rec in Records::new(buf, start)? {
        let rec = rec?;
        match rec.tag {
            Tag::BUILD_UUID => set_once(&mut build_uuid, rec.tag, fixed::<16>(&rec)?)?,
            Tag::BRIDGE_IPV4 => {
                let cfg = BridgeConfig::from_bytes(&fixed::<5>(&rec)?);
                set_once(&mut bridge, rec.tag, cfg)?
            }
            Tag::EGRESS_NAT => {
                let flag = match fixed::<1>(&rec)? {
                    [0] => false,
                    [1] => true,
                    [value] => {
                        return Err(ManifestError::InvalidValue { field: "egress_nat", value })
                    }
                };
                set_once(&mut egress_nat, rec.tag, flag)?
            }
            other => {
                debug!(tag = %other, offset = rec.offset, len = rec.value.len(), "skipping unknown record");
                unknown.push(rec.to_owned());
            }
        }
    }

    let facts = ManifestFacts {
        build_uuid: build_uuid.ok_or(ManifestError::MissingField("build_uuid"))?,
        bridge: bridge.ok_or(ManifestError::MissingField("bridge_ipv4"))?,
        egress_nat: egress_nat.ok_or(ManifestError::MissingField("egress_nat"))?,
    };

    debug!(len = buf.len(), unknown = unknown.len(), "manifest decoded");
    Ok(Manifest { header, extension, facts, unknown })
}

fn set_once<T>(slot: &mut Option<T>, tag: Tag, value: T) -> Result<()> {
    if slot.is_some() {
        return Err(ManifestError::DuplicateField(tag.name().unwrap_or("unknown")));
    }
    *slot = Some(value);
    Ok(())
}

fn fixed<const N: usize>(rec: &Record<'_>) -> Result<[u8; N]> {
    rec.value.try_into().map_err(|_| ManifestError::LengthMismatch {
        field: rec.tag.name().unwrap_or("unknown"),
        expected: N,
        actual: rec.value.len(),
    })
}
