// cli/src/manifestctl/config.rs  Tool configuration (TOML)
//
//   [output]
//   manifest_file = "manifest.tlv"
//   signature_file = "manifest.sig"
//
//   [log]
//   level = "warn"

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::CliError;

const DEFAULT_CONFIG_PATH: &str = "/etc/nonos/manifest.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToolConfig {
    pub output: OutputConfig,
    pub log: LogConfig,
}

/// Artifact file names used by `provision`. The boot stage looks for these
/// names on the ESP, so they are plain names, never paths.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    pub manifest_file: String,
    pub signature_file: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            manifest_file: "manifest.tlv".into(),
            signature_file: "manifest.sig".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogConfig {
    /// tracing filter directive, e.g. "warn" or "nonos_manifest=debug"
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self { level: "warn".into() }
    }
}

/// An explicitly named file must exist; the system-wide default is optional.
pub fn load(explicit: Option<&Path>) -> Result<ToolConfig, CliError> {
    match explicit {
        Some(path) => read(path),
        None if Path::new(DEFAULT_CONFIG_PATH).is_file() => read(Path::new(DEFAULT_CONFIG_PATH)),
        None => Ok(ToolConfig::default()),
    }
}

fn read(path: &Path) -> Result<ToolConfig, CliError> {
    let text = fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse(&text).map_err(|reason| CliError::Config { path: path.to_path_buf(), reason })
}

fn parse(text: &str) -> Result<ToolConfig, String> {
    let cfg: ToolConfig = toml::from_str(text).map_err(|e| e.to_string())?;
    for name in [&cfg.output.manifest_file, &cfg.output.signature_file] {
        if !is_plain_file_name(name) {
            return Err(format!("output file name {:?} must be a plain file name", name));
        }
    }
    if cfg.output.manifest_file == cfg.output.signature_file {
        return Err("manifest_file and signature_file must differ".into());
    }
    Ok(cfg)
}

fn is_plain_file_name(name: &str) -> bool {
    let p = PathBuf::from(name);
    !name.is_empty() && p.file_name().map_or(false, |f| f == p.as_os_str())
}
