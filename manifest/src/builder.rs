//! NØNOS Manifest Builder
//!
//! Facts in, one immutable buffer out. Records are always emitted in the
//! canonical order (build identifier, bridge config, egress flag) even though
//! parsers must not rely on it.

use tracing::debug;

use crate::codec::ByteWriter;
use crate::error::Result;
use crate::facts::{ManifestFacts, RawFacts};
use crate::header::{ManifestHeader, HEADER_FIELDS_LEN, HEADER_LEN};
use crate::tlv::{
    encode_record, Tag, TlvRecord, BRIDGE_IPV4_LEN, BUILD_UUID_LEN, EGRESS_NAT_LEN,
    RECORD_HEADER_LEN,
};

/// Total size of a manifest with exactly the mandatory records.
pub const MANIFEST_LEN: usize = HEADER_LEN as usize
    + 3 * RECORD_HEADER_LEN
    + BUILD_UUID_LEN
    + BRIDGE_IPV4_LEN
    + EGRESS_NAT_LEN;

/// Validate `raw` and encode it. Nothing is returned unless every mandatory
/// fact is present and well-formed.
pub fn build(raw: &RawFacts) -> Result<Vec<u8>> {
    let facts = ManifestFacts::try_from(raw)?;
    encode(&facts)
}

/// Encode already-validated facts under the current header.
pub fn encode(facts: &ManifestFacts) -> Result<Vec<u8>> {
    let header = ManifestHeader::current();
    let extension = [0u8; HEADER_LEN as usize - HEADER_FIELDS_LEN];
    encode_with(&header, &extension, facts, &[])
}

/// Encode with an explicit header and any extra records appended after the
/// mandatory ones. Used to re-emit a decoded manifest unchanged.
pub(crate) fn encode_with(
    header: &ManifestHeader,
    extension: &[u8],
    facts: &ManifestFacts,
    extra: &[TlvRecord],
) -> Result<Vec<u8>> {
    let extra_len: usize = extra.iter().map(|r| RECORD_HEADER_LEN + r.value.len()).sum();
    let mut w = ByteWriter::with_capacity(MANIFEST_LEN + extension.len() + extra_len);

    header.encode(&mut w, extension)?;
    encode_record(&mut w, Tag::BUILD_UUID, &facts.build_uuid)?;
    encode_record(&mut w, Tag::BRIDGE_IPV4, &facts.bridge.to_bytes())?;
    encode_record(&mut w, Tag::EGRESS_NAT, &[u8::from(facts.egress_nat)])?;
    for rec in extra {
        encode_record(&mut w, rec.tag, &rec.value)?;
    }

    debug!(len = w.len(), extra = extra.len(), "manifest encoded");
    Ok(w.into_bytes())
}
