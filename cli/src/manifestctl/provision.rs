// cli/src/manifestctl/provision.rs  Pack + sign into an ESP-style output directory
//
// Signs the in-memory buffer that is written, so the pair on disk always
// matches. The manifest is only written once the key has been accepted.

use std::fs;
use std::path::Path;

use colored::Colorize;
use serde_json::json;
use tracing::info;

use nonos_manifest::ManifestSigner;

use super::artifacts::{fingerprint, write_artifact};
use super::config::OutputConfig;
use super::pack::pack_file;
use super::CliError;

pub fn run(
    source: &Path,
    out_dir: &Path,
    privkey_hex: &str,
    names: &OutputConfig,
    json: bool,
) -> Result<(), CliError> {
    let signer = ManifestSigner::from_hex(privkey_hex)?;
    let bytes = pack_file(source)?;
    let sig = signer.sign(&bytes);

    fs::create_dir_all(out_dir).map_err(|e| CliError::Write { path: out_dir.to_path_buf(), source: e })?;
    let manifest_path = out_dir.join(&names.manifest_file);
    let sig_path = out_dir.join(&names.signature_file);
    write_artifact(&manifest_path, &bytes)?;
    write_artifact(&sig_path, &sig)?;
    info!(dir = %out_dir.display(), "provisioning artifacts written");

    if json {
        let report = json!({
            "manifest": manifest_path.display().to_string(),
            "signature": sig_path.display().to_string(),
            "len": bytes.len(),
            "sha256": fingerprint(&bytes),
            "public_key": hex::encode(signer.public_key()),
        });
        println!("{}", report);
    } else {
        println!("{} manifest  -> {}", "[provision]".cyan(), manifest_path.display());
        println!("{} signature -> {}", "[provision]".cyan(), sig_path.display());
        println!(" - sha256: {}", fingerprint(&bytes));
        println!(" - pubkey: {}", hex::encode(signer.public_key()));
    }
    Ok(())
}
