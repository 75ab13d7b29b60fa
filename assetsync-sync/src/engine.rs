//! One incremental sync pass.
//!
//! ## Pass protocol
//!
//! 1. List every regular file under the output root.
//! 2. Load the previous manifest (absent → empty).
//! 3. For each file, in listing order: derive its logical name, note it as
//!    seen, hash it, record the hash in the new manifest, and upload only if
//!    the hash differs from the previous entry.
//! 4. Delete (or tag) every previous entry that was never seen.
//! 5. Write the new manifest, even when nothing changed.
//!
//! A local file whose logical name is the manifest key is skipped with a
//! warning; it is never uploaded, recorded, or treated as stale.
//!
//! Remote calls are made strictly one after another. A failure aborts the
//! pass before the manifest is written; the next pass re-diffs against the
//! old manifest and converges.

use std::collections::HashSet;
use std::time::Instant;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use assetsync_core::{Config, DeleteTag, GzipOptions, Manifest, MANIFEST_KEY};
use assetsync_store::BlobClient;

use crate::error::{io_err, SyncError};
use crate::{local, manifest, payload};

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Per-pass behaviour switches.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncOptions {
    /// Strip a trailing `.html` from logical names.
    pub clean_html_suffix: bool,
    /// Tag stale objects with this pair instead of deleting them.
    pub delete_tag: Option<DeleteTag>,
    /// Compress non-HTML uploads.
    pub gzip: Option<GzipOptions>,
    /// Compute and report, but make no remote mutation.
    pub dry_run: bool,
}

impl SyncOptions {
    pub fn from_config(cfg: &Config, dry_run: bool) -> Self {
        Self {
            clean_html_suffix: cfg.clean_html_suffix,
            delete_tag: cfg.delete_tag.clone(),
            gzip: cfg.gzip,
            dry_run,
        }
    }
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// What happened to one local file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    /// Content changed (or is new) and was uploaded.
    Uploaded { name: String, compressed: bool },
    /// Hash matches the manifest; no remote call.
    Unchanged { name: String },
    /// `dry_run`: the file *would* have been uploaded.
    WouldUpload { name: String },
}

impl FileOutcome {
    pub fn name(&self) -> &str {
        match self {
            FileOutcome::Uploaded { name, .. }
            | FileOutcome::Unchanged { name }
            | FileOutcome::WouldUpload { name } => name,
        }
    }
}

/// What happened to one manifest entry whose local file is gone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StaleOutcome {
    Deleted { name: String },
    Tagged { name: String, tag: DeleteTag },
    WouldDelete { name: String },
    WouldTag { name: String, tag: DeleteTag },
}

impl StaleOutcome {
    pub fn name(&self) -> &str {
        match self {
            StaleOutcome::Deleted { name }
            | StaleOutcome::Tagged { name, .. }
            | StaleOutcome::WouldDelete { name }
            | StaleOutcome::WouldTag { name, .. } => name,
        }
    }
}

/// Summary of a pass.
#[derive(Debug, Clone)]
pub struct SyncReport {
    pub started_at: DateTime<Utc>,
    pub duration_ms: u128,
    pub dry_run: bool,
    /// One entry per local file, in listing order.
    pub files: Vec<FileOutcome>,
    /// One entry per stale manifest name, in name order.
    pub stale: Vec<StaleOutcome>,
    /// The manifest written (or, under `dry_run`, that would be written).
    pub manifest: Manifest,
}

impl SyncReport {
    pub fn uploaded(&self) -> usize {
        self.files
            .iter()
            .filter(|f| !matches!(f, FileOutcome::Unchanged { .. }))
            .count()
    }

    pub fn unchanged(&self) -> usize {
        self.files.len() - self.uploaded()
    }

    pub fn removed(&self) -> usize {
        self.stale.len()
    }

    /// `true` when the pass made (or would make) no asset mutation.
    pub fn is_noop(&self) -> bool {
        self.uploaded() == 0 && self.stale.is_empty()
    }
}

// ---------------------------------------------------------------------------
// sync_dir
// ---------------------------------------------------------------------------

/// Synchronize the files under `root` with the bucket behind `client`.
pub async fn sync_dir(
    client: &BlobClient,
    root: &std::path::Path,
    opts: &SyncOptions,
) -> Result<SyncReport, SyncError> {
    let started_at = Utc::now();
    let timer = Instant::now();

    // Steps 1–2: local listing and previous manifest.
    let files = local::list_files(root)?;
    let previous = manifest::load(client).await?.unwrap_or_default();
    debug!(
        "{} local files, {} manifest entries under '{}'",
        files.len(),
        previous.len(),
        client.prefix()
    );

    // Step 3: hash, record, upload changed files.
    let mut next = Manifest::new();
    let mut seen: HashSet<String> = HashSet::new();
    let mut outcomes = Vec::with_capacity(files.len());

    for file in &files {
        let name = local::logical_name(&file.relative, opts.clean_html_suffix);
        if name == MANIFEST_KEY {
            warn!(
                "skipping {}: '{MANIFEST_KEY}' is reserved for the manifest",
                file.path.display()
            );
            continue;
        }
        if previous.contains(&name) {
            seen.insert(name.clone());
        }

        let bytes = std::fs::read(&file.path).map_err(|e| io_err(&file.path, e))?;
        let fingerprint = manifest::fingerprint(&bytes);
        let changed = previous.get(&name) != Some(&fingerprint);
        next.insert(name.clone(), fingerprint);

        let outcome = if !changed {
            debug!("unchanged: {name}");
            FileOutcome::Unchanged { name }
        } else if opts.dry_run {
            info!("[dry-run] would upload: {name}");
            FileOutcome::WouldUpload { name }
        } else {
            let upload = payload::prepare(&file.path, &name, bytes, opts.gzip)?;
            client.store(&name, upload.body, &upload.meta).await?;
            info!("uploaded: {name} ({})", upload.meta.content_type);
            FileOutcome::Uploaded {
                name,
                compressed: upload.compressed,
            }
        };
        outcomes.push(outcome);
    }

    // Step 4: entries whose local file is gone.
    let mut stale = Vec::new();
    for name in previous
        .names()
        .filter(|n| !seen.contains(*n) && *n != MANIFEST_KEY)
    {
        let name = name.to_string();
        let outcome = match (&opts.delete_tag, opts.dry_run) {
            (Some(tag), true) => {
                info!("[dry-run] would tag: {name} ({tag})");
                StaleOutcome::WouldTag {
                    name,
                    tag: tag.clone(),
                }
            }
            (None, true) => {
                info!("[dry-run] would delete: {name}");
                StaleOutcome::WouldDelete { name }
            }
            (Some(tag), false) => {
                client.tag(&name, &tag.key, &tag.value).await?;
                info!("tagged: {name} ({tag})");
                StaleOutcome::Tagged {
                    name,
                    tag: tag.clone(),
                }
            }
            (None, false) => {
                client.delete(&name).await?;
                info!("deleted: {name}");
                StaleOutcome::Deleted { name }
            }
        };
        stale.push(outcome);
    }

    // Step 5: publish the new manifest (skipped in dry-run).
    if !opts.dry_run {
        manifest::save(client, &next).await?;
    }

    let report = SyncReport {
        started_at,
        duration_ms: timer.elapsed().as_millis(),
        dry_run: opts.dry_run,
        files: outcomes,
        stale,
        manifest: next,
    };
    let prefix = if opts.dry_run { "[dry-run] " } else { "" };
    info!(
        "{prefix}deployed '{}': {} uploaded, {} unchanged, {} removed in {} ms",
        client.prefix(),
        report.uploaded(),
        report.unchanged(),
        report.removed(),
        report.duration_ms
    );
    Ok(report)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::fs;
    use std::sync::Arc;

    use assetsync_store::{Call, MemoryBackend};
    use tempfile::TempDir;

    use super::*;

    fn setup() -> (Arc<MemoryBackend>, BlobClient, TempDir) {
        let backend = Arc::new(MemoryBackend::new());
        let client = BlobClient::new(backend.clone(), "www");
        (backend, client, TempDir::new().unwrap())
    }

    #[tokio::test]
    async fn dry_run_makes_no_mutation() {
        let (backend, client, dist) = setup();
        backend.insert(
            "www/fingerprints.json",
            r#"{"old.js":{"hash":"00"}}"#,
        );
        fs::write(dist.path().join("new.js"), "n").unwrap();

        let opts = SyncOptions {
            dry_run: true,
            ..SyncOptions::default()
        };
        let report = sync_dir(&client, dist.path(), &opts).await.unwrap();

        assert!(backend.mutations().is_empty(), "dry-run must not mutate");
        assert_eq!(
            report.files,
            vec![FileOutcome::WouldUpload {
                name: "new.js".into()
            }]
        );
        assert_eq!(
            report.stale,
            vec![StaleOutcome::WouldDelete {
                name: "old.js".into()
            }]
        );
        assert!(report.manifest.contains("new.js"));
    }

    #[tokio::test]
    async fn dry_run_reports_tagging_when_configured() {
        let (backend, client, dist) = setup();
        backend.insert("www/fingerprints.json", r#"{"old.js":{"hash":"00"}}"#);
        let tag = DeleteTag {
            key: "stale".into(),
            value: "stale".into(),
        };
        let opts = SyncOptions {
            dry_run: true,
            delete_tag: Some(tag.clone()),
            ..SyncOptions::default()
        };

        let report = sync_dir(&client, dist.path(), &opts).await.unwrap();
        assert_eq!(
            report.stale,
            vec![StaleOutcome::WouldTag {
                name: "old.js".into(),
                tag
            }]
        );
        assert!(backend.mutations().is_empty());
    }

    #[tokio::test]
    async fn manifest_is_written_last() {
        let (backend, client, dist) = setup();
        backend.insert("www/fingerprints.json", r#"{"old.js":{"hash":"00"}}"#);
        backend.insert("www/old.js", "o");
        fs::write(dist.path().join("a.js"), "a").unwrap();

        sync_dir(&client, dist.path(), &SyncOptions::default())
            .await
            .unwrap();

        assert_eq!(
            backend.mutations(),
            vec![
                Call::Put("www/a.js".into()),
                Call::Delete("www/old.js".into()),
                Call::Put("www/fingerprints.json".into()),
            ]
        );
    }

    #[tokio::test]
    async fn report_counts() {
        let (_backend, client, dist) = setup();
        fs::write(dist.path().join("a.js"), "a").unwrap();
        fs::write(dist.path().join("b.js"), "b").unwrap();

        let first = sync_dir(&client, dist.path(), &SyncOptions::default())
            .await
            .unwrap();
        assert_eq!((first.uploaded(), first.unchanged(), first.removed()), (2, 0, 0));
        assert!(!first.is_noop());

        let second = sync_dir(&client, dist.path(), &SyncOptions::default())
            .await
            .unwrap();
        assert_eq!((second.uploaded(), second.unchanged(), second.removed()), (0, 2, 0));
        assert!(second.is_noop());
    }
}
