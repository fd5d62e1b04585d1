// cli/src/manifestctl/inspect.rs  Decode a manifest for humans or tooling

use std::path::Path;

use colored::Colorize;
use serde_json::{json, Value};
use uuid::Uuid;

use nonos_manifest::{decode, Manifest, SigAlgo};

use super::artifacts::{fingerprint, read_artifact};
use super::CliError;

pub fn run(path: &Path, json: bool) -> Result<(), CliError> {
    let bytes = read_artifact(path)?;
    let manifest = decode(&bytes)?;

    if json {
        let mut report = to_json(&manifest);
        report["manifest"] = json!(path.display().to_string());
        report["len"] = json!(bytes.len());
        report["sha256"] = json!(fingerprint(&bytes));
        println!("{}", serde_json::to_string_pretty(&report).unwrap_or_default());
        return Ok(());
    }

    let h = &manifest.header;
    let f = &manifest.facts;
    println!("{} {} ({} bytes)", "[inspect]".cyan(), path.display(), bytes.len());
    println!(" - sha256: {}", fingerprint(&bytes));
    println!(
        " - header: version {} | sig_alg {} ({}) | header_len {} | reserved 0x{:04x}",
        h.version,
        h.sig_alg,
        sig_alg_name(h.sig_algo()),
        h.header_len,
        h.reserved
    );
    println!(" - build_uuid: {}", Uuid::from_bytes(f.build_uuid).hyphenated());
    println!(" - bridge_ipv4: {}", f.bridge);
    println!(" - egress_nat: {}", f.egress_nat);
    for rec in &manifest.unknown {
        println!("   [unknown] tag {} ({} bytes) {}", rec.tag, rec.value.len(), hex::encode(&rec.value));
    }
    Ok(())
}

fn sig_alg_name(alg: SigAlgo) -> &'static str {
    match alg {
        SigAlgo::Ed25519 => "ed25519",
        SigAlgo::Unknown(_) => "unknown",
    }
}

fn to_json(m: &Manifest) -> Value {
    let h = &m.header;
    let f = &m.facts;
    let unknown: Vec<Value> = m
        .unknown
        .iter()
        .map(|r| json!({ "tag": r.tag.0, "len": r.value.len(), "value": hex::encode(&r.value) }))
        .collect();
    json!({
        "header": {
            "magic": hex::encode(h.magic),
            "version": h.version,
            "sig_alg": h.sig_alg,
            "sig_alg_name": sig_alg_name(h.sig_algo()),
            "header_len": h.header_len,
            "reserved": h.reserved,
        },
        "facts": {
            "build_uuid": Uuid::from_bytes(f.build_uuid).hyphenated().to_string(),
            "bridge_ipv4": f.bridge.addr.to_string(),
            "prefix": f.bridge.prefix,
            "egress_nat": f.egress_nat,
        },
        "unknown": unknown,
    })
}
