// cli/src/manifestctl/mod.rs  NØN-OS manifest tool commands and error mapping

use std::io;
use std::path::PathBuf;

use nonos_manifest::ManifestError;

pub mod artifacts;
pub mod config;
pub mod inspect;
pub mod logging;
pub mod pack;
pub mod provision;
pub mod sign;

pub const EXIT_USAGE: u8 = 1;
pub const EXIT_INVALID: u8 = 2;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("{0}")]
    Manifest(#[from] ManifestError),

    #[error("signature check FAILED for {}", .0.display())]
    Verification(PathBuf),

    #[error("cannot read {}: {}", .path.display(), .source)]
    Read { path: PathBuf, source: io::Error },

    #[error("cannot write {}: {}", .path.display(), .source)]
    Write { path: PathBuf, source: io::Error },

    #[error("bad config {}: {}", .path.display(), .reason)]
    Config { path: PathBuf, reason: String },

    #[error("{0}")]
    Usage(String),
}

impl CliError {
    /// 1 for usage, config and I/O problems; 2 when the input itself or the
    /// key material is wrong, or a signature does not hold.
    pub fn exit_code(&self) -> u8 {
        match self {
            CliError::Manifest(_) | CliError::Verification(_) => EXIT_INVALID,
            CliError::Read { .. }
            | CliError::Write { .. }
            | CliError::Config { .. }
            | CliError::Usage(_) => EXIT_USAGE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes() {
        assert_eq!(CliError::from(ManifestError::BadMagic(*b"XXXX")).exit_code(), 2);
        assert_eq!(CliError::from(ManifestError::InvalidKey("short".into())).exit_code(), 2);
        assert_eq!(CliError::Verification(PathBuf::from("m.tlv")).exit_code(), 2);
        assert_eq!(CliError::Usage("x".into()).exit_code(), 1);
        let read = CliError::Read {
            path: PathBuf::from("/nope"),
            source: io::Error::from(io::ErrorKind::NotFound),
        };
        assert_eq!(read.exit_code(), 1);
        assert!(read.to_string().starts_with("cannot read /nope"));
    }
}
