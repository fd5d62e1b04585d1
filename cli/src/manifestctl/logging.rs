// cli/src/manifestctl/logging.rs  tracing setup
// Logs go to stderr so stdout stays clean for --json.

use tracing_subscriber::EnvFilter;

use super::config::LogConfig;

/// RUST_LOG wins, then -v, then the configured level.
pub fn init(cfg: &LogConfig, verbose: u8) {
    let level = match verbose {
        0 => cfg.level.as_str(),
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
