//! `assetsync check`: validate configuration offline.

use std::path::Path;

use anyhow::Result;
use clap::Args;

use super::load_config;

/// Arguments for `assetsync check`.
#[derive(Args, Debug)]
pub struct CheckArgs {}

impl CheckArgs {
    pub fn run(self, config: Option<&Path>) -> Result<()> {
        let (path, cfg) = load_config(config)?;

        println!("✓ {} is valid", path.display());
        println!("  bucket:          {}", cfg.bucket);
        println!("  region:          {}", cfg.region);
        println!("  prefix:          {}", cfg.prefix);
        println!("  endpoint:        {}", cfg.endpoint);
        println!("  access key:      {}", cfg.credentials.access_key_id);
        println!("  path style:      {}", on_off(cfg.force_path_style));
        println!("  strip .html:     {}", on_off(cfg.clean_html_suffix));
        match &cfg.delete_tag {
            Some(tag) => println!("  stale objects:   tag {tag}"),
            None => println!("  stale objects:   delete"),
        }
        match cfg.gzip {
            Some(gzip) => println!("  gzip:            level {}", gzip.level),
            None => println!("  gzip:            off"),
        }
        Ok(())
    }
}

fn on_off(flag: bool) -> &'static str {
    if flag {
        "on"
    } else {
        "off"
    }
}
