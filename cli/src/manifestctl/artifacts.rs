// cli/src/manifestctl/artifacts.rs  Manifest / signature files on disk
//
// Artifacts are immutable once written: each write lands in a temp file next
// to the target and is renamed over it, so readers never see half a file.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tempfile::NamedTempFile;
use tracing::debug;

use super::CliError;

pub fn read_artifact(path: &Path) -> Result<Vec<u8>, CliError> {
    fs::read(path).map_err(|source| CliError::Read { path: path.to_path_buf(), source })
}

pub fn write_artifact(path: &Path, bytes: &[u8]) -> Result<(), CliError> {
    let write_err = |source| CliError::Write { path: path.to_path_buf(), source };

    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir).map_err(write_err)?;
    tmp.write_all(bytes).map_err(write_err)?;
    tmp.as_file().sync_all().map_err(write_err)?;
    tmp.persist(path).map_err(|e| write_err(e.error))?;

    debug!(path = %path.display(), len = bytes.len(), "artifact written");
    Ok(())
}

/// `manifest.tlv` pairs with `manifest.sig`.
pub fn signature_path_for(manifest: &Path) -> Result<PathBuf, CliError> {
    let sig = manifest.with_extension("sig");
    if sig == manifest {
        return Err(CliError::Usage(format!(
            "cannot derive a signature path from {}, name it explicitly",
            manifest.display()
        )));
    }
    Ok(sig)
}

/// SHA-256 of the artifact bytes, hex.
pub fn fingerprint(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}
