//! assetsync: incremental static-site upload to S3-compatible storage.
//!
//! # Usage
//!
//! ```text
//! assetsync [--config <path>] [--verbose] sync <output-dir> [--dry-run]
//! assetsync [--config <path>] manifest [--json]
//! assetsync [--config <path>] check
//! ```

mod commands;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{check::CheckArgs, manifest::ManifestArgs, sync::SyncArgs};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "assetsync",
    version,
    about = "Upload changed build output to an S3-compatible bucket",
    long_about = None,
)]
struct Cli {
    /// Configuration file (default: ./assetsync.yaml).
    #[arg(long, short = 'c', global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Upload changed files and remove stale ones.
    Sync(SyncArgs),

    /// Show the fingerprint manifest stored in the bucket.
    Manifest(ManifestArgs),

    /// Validate the configuration and print the resolved settings.
    Check(CheckArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = cli.config.as_deref();
    match cli.command {
        Commands::Sync(args) => args.run(config),
        Commands::Manifest(args) => args.run(config),
        Commands::Check(args) => args.run(config),
    }
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
