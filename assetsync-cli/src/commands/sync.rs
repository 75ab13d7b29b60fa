//! `assetsync sync <output-dir>`: one incremental pass.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use assetsync_sync::{pipeline, FileOutcome, StaleOutcome, SyncReport};

use super::load_config;

/// Arguments for `assetsync sync`.
#[derive(Args, Debug)]
pub struct SyncArgs {
    /// Build output directory to upload.
    pub output_dir: PathBuf,

    /// Report what would change without touching the bucket.
    #[arg(long)]
    pub dry_run: bool,
}

impl SyncArgs {
    pub fn run(self, config: Option<&Path>) -> Result<()> {
        let (_, cfg) = load_config(config)?;
        let report = pipeline::deploy_blocking(&cfg, &self.output_dir, self.dry_run)
            .with_context(|| {
                format!(
                    "sync of '{}' to {}/{} failed",
                    self.output_dir.display(),
                    cfg.bucket,
                    cfg.prefix
                )
            })?;
        print_results(&cfg.bucket, &cfg.prefix, &report);
        Ok(())
    }
}

fn print_results(bucket: &str, prefix: &str, report: &SyncReport) {
    let marker = if report.dry_run { "[dry-run] " } else { "" };

    if report.is_noop() {
        println!(
            "{marker}✓ {bucket}/{prefix} up to date ({} unchanged)",
            report.unchanged()
        );
        return;
    }

    println!(
        "{marker}✓ {bucket}/{prefix} synced ({} uploaded, {} unchanged, {} removed) in {} ms",
        report.uploaded(),
        report.unchanged(),
        report.removed(),
        report.duration_ms
    );

    for outcome in &report.files {
        match outcome {
            FileOutcome::Uploaded { name, compressed: true } => println!("  ↑  {name} (gzip)"),
            FileOutcome::Uploaded { name, .. } => println!("  ↑  {name}"),
            FileOutcome::WouldUpload { name } => println!("  ~  {name}"),
            FileOutcome::Unchanged { .. } => {}
        }
    }
    for outcome in &report.stale {
        match outcome {
            StaleOutcome::Deleted { name } => println!("  ✗  {name}"),
            StaleOutcome::WouldDelete { name } => println!("  ~✗ {name}"),
            StaleOutcome::Tagged { name, tag } => println!("  ⚑  {name} ({tag})"),
            StaleOutcome::WouldTag { name, tag } => println!("  ~⚑ {name} ({tag})"),
        }
    }
}
