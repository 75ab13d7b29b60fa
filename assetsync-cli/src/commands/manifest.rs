//! `assetsync manifest`: inspect the remote fingerprint map.

use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use assetsync_core::{Config, Manifest, MANIFEST_KEY};
use assetsync_sync::pipeline;

use super::load_config;

/// Arguments for `assetsync manifest`.
#[derive(Args, Debug)]
pub struct ManifestArgs {
    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

impl ManifestArgs {
    pub fn run(self, config: Option<&Path>) -> Result<()> {
        let (_, cfg) = load_config(config)?;
        let manifest = pipeline::current_manifest_blocking(&cfg).with_context(|| {
            format!("failed to read {}/{}/{MANIFEST_KEY}", cfg.bucket, cfg.prefix)
        })?;

        if self.json {
            return print_json(&cfg, manifest.as_ref());
        }
        print_table(&cfg, manifest);
        Ok(())
    }
}

#[derive(Serialize)]
struct ManifestJson<'a> {
    bucket: &'a str,
    prefix: &'a str,
    synced: bool,
    entries: Option<&'a Manifest>,
}

#[derive(Tabled)]
struct ManifestRow {
    #[tabled(rename = "name")]
    name: String,
    #[tabled(rename = "sha256")]
    hash: String,
}

fn print_json(cfg: &Config, manifest: Option<&Manifest>) -> Result<()> {
    let payload = ManifestJson {
        bucket: &cfg.bucket,
        prefix: &cfg.prefix,
        synced: manifest.is_some(),
        entries: manifest,
    };
    println!(
        "{}",
        serde_json::to_string_pretty(&payload).context("failed to serialize manifest JSON")?
    );
    Ok(())
}

fn print_table(cfg: &Config, manifest: Option<Manifest>) {
    let Some(manifest) = manifest else {
        println!(
            "{} {}/{} has never been synced.",
            "■".bright_black().bold(),
            cfg.bucket,
            cfg.prefix
        );
        return;
    };

    println!(
        "{} {}/{} | {} files",
        "■".green().bold(),
        cfg.bucket,
        cfg.prefix,
        manifest.len()
    );
    if manifest.is_empty() {
        return;
    }

    let rows: Vec<ManifestRow> = manifest
        .iter()
        .map(|(name, fp)| ManifestRow {
            name: name.clone(),
            hash: fp.hash.clone(),
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");
}
