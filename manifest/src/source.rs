//! Fact-sheet reader.
//!
//! Line-oriented `key: value` text, e.g.
//!
//! ```text
//! build_uuid: "6f1c2a4e-8d3b-4b7a-9e21-0c5d7f3a9b12"
//! bridge_ip4: 10.0.0.1
//! prefix: 24
//! egress_nat: yes
//! ```
//!
//! Unrecognized keys are ignored. Presence and length of mandatory facts are
//! left to the builder; this only rejects values it cannot read at all.

use std::io::BufRead;

use tracing::{debug, warn};

use crate::error::{ManifestError, Result};
use crate::facts::RawFacts;

/// Parse a fact sheet held in memory.
pub fn parse_fact_sheet(text: &str) -> Result<RawFacts> {
    let mut raw = RawFacts::default();
    for (idx, line) in text.lines().enumerate() {
        apply_line(&mut raw, idx + 1, line)?;
    }
    Ok(raw)
}

/// Parse a fact sheet from any buffered reader. Unreadable input is reported
/// as a malformed sheet.
pub fn read_fact_sheet<R: BufRead>(reader: R) -> Result<RawFacts> {
    let mut raw = RawFacts::default();
    for (idx, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| {
            warn!(line = idx + 1, error = %e, "fact sheet unreadable");
            ManifestError::InvalidField("fact_sheet")
        })?;
        apply_line(&mut raw, idx + 1, &line)?;
    }
    Ok(raw)
}

fn apply_line(raw: &mut RawFacts, lineno: usize, line: &str) -> Result<()> {
    let Some((key, value)) = line.trim().split_once(':') else {
        return Ok(());
    };
    let value = value.trim().trim_matches('"');

    match key.trim() {
        "build_uuid" => raw.build_uuid = Some(parse_uuid(value).map_err(|e| reject(lineno, e))?),
        "bridge_ip4" => raw.bridge_ipv4 = parse_dotted_quad(value).map_err(|e| reject(lineno, e))?,
        "prefix" => raw.prefix = Some(parse_prefix(value).map_err(|e| reject(lineno, e))?),
        "egress_nat" => raw.egress_nat = parse_flag(value),
        other => debug!(line = lineno, key = other, "ignoring unrecognized key"),
    }
    Ok(())
}

fn reject(lineno: usize, e: ManifestError) -> ManifestError {
    warn!(line = lineno, error = %e, "fact sheet value rejected");
    e
}

/// Dashes anywhere are dropped, the rest must be hex. Any even length is
/// returned; the builder decides whether it is 16 bytes.
fn parse_uuid(value: &str) -> Result<Vec<u8>> {
    let compact: String = value.chars().filter(|c| *c != '-').collect();
    hex::decode(compact).map_err(|_| ManifestError::InvalidField("build_uuid"))
}

/// Anything other than four dot-separated parts leaves the bridge address
/// unset; a part outside 0..=255 is an error.
fn parse_dotted_quad(value: &str) -> Result<Option<Vec<u8>>> {
    let parts: Vec<&str> = value.split('.').collect();
    if parts.len() != 4 {
        return Ok(None);
    }
    parts
        .iter()
        .map(|p| p.trim().parse::<u8>().map_err(|_| ManifestError::InvalidField("bridge_ipv4")))
        .collect::<Result<Vec<u8>>>()
        .map(Some)
}

/// Signed decimal, masked to its low byte.
fn parse_prefix(value: &str) -> Result<u8> {
    let v: i64 = value.parse().map_err(|_| ManifestError::InvalidField("prefix"))?;
    Ok((v & 0xff) as u8)
}

fn parse_flag(value: &str) -> bool {
    matches!(value.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}
