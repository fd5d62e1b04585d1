// cli/src/manifestctl/sign.rs  Detached Ed25519 signatures for manifest artifacts
//
// Keys are parsed before any file is touched, so bad key material always
// reports as a key error and never leaves an artifact behind.

use std::path::Path;

use colored::Colorize;
use serde_json::json;
use tracing::info;

use nonos_manifest::{ManifestSigner, ManifestVerifier};

use super::artifacts::{fingerprint, read_artifact, signature_path_for, write_artifact};
use super::CliError;

pub fn run_sign(
    privkey_hex: &str,
    manifest: &Path,
    out: Option<&Path>,
    json: bool,
) -> Result<(), CliError> {
    let signer = ManifestSigner::from_hex(privkey_hex)?;
    let sig_path = match out {
        Some(p) => p.to_path_buf(),
        None => signature_path_for(manifest)?,
    };
    if sig_path == manifest {
        return Err(CliError::Usage("signature would overwrite the manifest".into()));
    }

    let bytes = read_artifact(manifest)?;
    let sig = signer.sign(&bytes);
    write_artifact(&sig_path, &sig)?;
    info!(manifest = %manifest.display(), signature = %sig_path.display(), "manifest signed");

    if json {
        let report = json!({
            "manifest": manifest.display().to_string(),
            "signature": sig_path.display().to_string(),
            "sha256": fingerprint(&bytes),
            "public_key": hex::encode(signer.public_key()),
        });
        println!("{}", report);
    } else {
        println!(
            "{} {} -> {} (pubkey {})",
            "[sign]".cyan(),
            manifest.display(),
            sig_path.display(),
            hex::encode(signer.public_key())
        );
    }
    Ok(())
}

pub fn run_verify(
    pubkey_hex: &str,
    manifest: &Path,
    signature: Option<&Path>,
    json: bool,
) -> Result<(), CliError> {
    let verifier = ManifestVerifier::from_hex(pubkey_hex)?;
    let sig_path = match signature {
        Some(p) => p.to_path_buf(),
        None => signature_path_for(manifest)?,
    };

    let bytes = read_artifact(manifest)?;
    let sig = read_artifact(&sig_path)?;
    let valid = verifier.verify(&bytes, &sig);

    if json {
        let report = json!({
            "manifest": manifest.display().to_string(),
            "signature": sig_path.display().to_string(),
            "valid": valid,
        });
        println!("{}", report);
    } else if valid {
        println!("{} '{}' verified {}", "[verify]".cyan(), manifest.display(), "OK".green().bold());
    } else {
        println!("{} '{}' integrity {}", "[verify]".cyan(), manifest.display(), "FAILED".red().bold());
    }

    if valid {
        Ok(())
    } else {
        Err(CliError::Verification(manifest.to_path_buf()))
    }
}
