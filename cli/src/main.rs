// cli/src/main.rs  NØN-OS Provisioning Manifest Tool
// Packs device provisioning facts into a signed TLV manifest and checks it
// the way the boot stage will.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand};
use colored::Colorize;

mod manifestctl;
use manifestctl::{config, inspect, logging, pack, provision, sign, CliError};

#[derive(Parser)]
#[command(
    name = "nonos-manifest",
    version,
    author = "NØNOS core@dev",
    about = "nonos-manifest: signed provisioning manifests for NØNOS devices",
    long_about = "Builds the binary provisioning manifest (build id, bridge IPv4, egress NAT) from a fact sheet, \
                  signs it with a detached Ed25519 signature, and verifies or inspects existing artifacts."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable JSON output
    #[arg(long, global = true)]
    json: bool,

    /// Tool configuration file (TOML)
    #[arg(long, global = true, env = "NONOS_MANIFEST_CONFIG")]
    config: Option<PathBuf>,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a manifest from a key: value fact sheet
    Pack { source: PathBuf, out: PathBuf },
    /// Write a detached signature for a manifest
    Sign {
        /// 32-byte Ed25519 private seed, hex
        privkey_hex: String,
        manifest: PathBuf,
        /// Defaults to the manifest path with a .sig extension
        out: Option<PathBuf>,
    },
    /// Check a manifest against its detached signature
    Verify {
        /// 32-byte Ed25519 public key, hex
        pubkey_hex: String,
        manifest: PathBuf,
        /// Defaults to the manifest path with a .sig extension
        signature: Option<PathBuf>,
    },
    /// Decode a manifest and print its contents
    Inspect { manifest: PathBuf },
    /// Pack and sign in one step into an output directory
    Provision {
        source: PathBuf,
        out_dir: PathBuf,
        /// 32-byte Ed25519 private seed, hex
        privkey_hex: String,
    },
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // --help / --version land here too and are not failures
            let code = if e.use_stderr() { manifestctl::EXIT_USAGE } else { 0 };
            let _ = e.print();
            return ExitCode::from(code);
        }
    };

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", "[manifest]".red().bold(), e);
            ExitCode::from(e.exit_code())
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let cfg = config::load(cli.config.as_deref())?;
    logging::init(&cfg.log, cli.verbose);

    match cli.command {
        Commands::Pack { source, out } => pack::run(&source, &out, cli.json),
        Commands::Sign { privkey_hex, manifest, out } => {
            sign::run_sign(&privkey_hex, &manifest, out.as_deref(), cli.json)
        }
        Commands::Verify { pubkey_hex, manifest, signature } => {
            sign::run_verify(&pubkey_hex, &manifest, signature.as_deref(), cli.json)
        }
        Commands::Inspect { manifest } => inspect::run(&manifest, cli.json),
        Commands::Provision { source, out_dir, privkey_hex } => {
            provision::run(&source, &out_dir, &privkey_hex, &cfg.output, cli.json)
        }
    }
}
