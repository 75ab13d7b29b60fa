pub mod check;
pub mod manifest;
pub mod sync;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

use assetsync_core::{config, Config};

/// Load and validate the configuration, returning the path it came from.
pub fn load_config(explicit: Option<&Path>) -> Result<(PathBuf, Config)> {
    let cwd = std::env::current_dir().context("could not determine working directory")?;
    let path = config::resolve_path(explicit, &cwd);
    let cfg = config::load_at(&path)
        .with_context(|| format!("invalid configuration in '{}'", path.display()))?;
    debug!("loaded config from {}", path.display());
    Ok((path, cfg))
}
