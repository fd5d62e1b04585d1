// cli/src/manifestctl/pack.rs  Fact sheet -> manifest.tlv

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use colored::Colorize;
use serde_json::json;
use tracing::info;

use nonos_manifest::{build, read_fact_sheet};

use super::artifacts::{fingerprint, write_artifact};
use super::CliError;

/// Read and validate the fact sheet, returning the encoded manifest. Nothing
/// is written here.
pub fn pack_file(source: &Path) -> Result<Vec<u8>, CliError> {
    let file = File::open(source).map_err(|e| CliError::Read { path: source.to_path_buf(), source: e })?;
    let raw = read_fact_sheet(BufReader::new(file))?;
    let bytes = build(&raw)?;
    info!(source = %source.display(), len = bytes.len(), "manifest packed");
    Ok(bytes)
}

pub fn run(source: &Path, out: &Path, json: bool) -> Result<(), CliError> {
    let bytes = pack_file(source)?;
    write_artifact(out, &bytes)?;

    if json {
        let report = json!({
            "manifest": out.display().to_string(),
            "len": bytes.len(),
            "sha256": fingerprint(&bytes),
        });
        println!("{}", report);
    } else {
        println!(
            "{} manifest written: {} ({} bytes, sha256 {})",
            "[pack]".cyan(),
            out.display(),
            bytes.len(),
            fingerprint(&bytes)
        );
    }
    Ok(())
}
