//! Local build output enumeration.
//!
//! Files are listed depth-first with each directory's entries sorted by name,
//! so enumeration order (and with it upload and log order) is stable across
//! runs and platforms.

use std::path::{Path, PathBuf};

use tracing::warn;

use crate::error::{io_err, SyncError};

/// A regular file under the output root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalFile {
    /// Absolute (or root-joined) path on disk.
    pub path: PathBuf,
    /// Path relative to the root, `/`-separated.
    pub relative: String,
}

/// List every regular file under `root`, recursively.
///
/// Symlinks to files are followed; symlinks to directories are not descended.
/// Entries whose names are not valid UTF-8 are skipped with a warning, since
/// they have no unambiguous key in the bucket.
pub fn list_files(root: &Path) -> Result<Vec<LocalFile>, SyncError> {
    let mut out = Vec::new();
    collect(root, root, &mut out)?;
    Ok(out)
}

fn collect(root: &Path, dir: &Path, out: &mut Vec<LocalFile>) -> Result<(), SyncError> {
    let mut entries = std::fs::read_dir(dir)
        .map_err(|e| io_err(dir, e))?
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| io_err(dir, e))?;
    entries.sort_by_key(|e| e.file_name());

    for entry in entries {
        let path = entry.path();
        if entry.file_name().to_str().is_none() {
            warn!("skipping {}: name is not valid UTF-8", path.display());
            continue;
        }
        let file_type = entry.file_type().map_err(|e| io_err(&path, e))?;
        if file_type.is_dir() {
            collect(root, &path, out)?;
            continue;
        }
        let is_file = if file_type.is_symlink() {
            std::fs::metadata(&path)
                .map(|m| m.is_file())
                .unwrap_or(false)
        } else {
            file_type.is_file()
        };
        if is_file {
            if let Some(relative) = relative_name(root, &path) {
                out.push(LocalFile { path, relative });
            }
        }
    }
    Ok(())
}

fn relative_name(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).unwrap_or(path);
    let parts = rel
        .components()
        .map(|c| c.as_os_str().to_str())
        .collect::<Option<Vec<_>>>()?;
    Some(parts.join("/"))
}

/// Name under which `relative` is addressed in the bucket and the manifest.
///
/// With `clean_html_suffix`, a trailing `.html` is dropped (`about.html` ->
/// `about`); no other suffix is ever touched.
pub fn logical_name(relative: &str, clean_html_suffix: bool) -> String {
    if clean_html_suffix {
        if let Some(stem) = relative.strip_suffix(".html") {
            return stem.to_string();
        }
    }
    relative.to_string()
}
