//! Post-build entry point used by the CLI and by build-tool hosts.

use std::path::Path;
use std::sync::Arc;

use tracing::info;

use assetsync_core::{Config, Manifest};
use assetsync_store::{BlobClient, S3Backend};

use crate::engine::{sync_dir, SyncOptions, SyncReport};
use crate::error::{io_err, SyncError};
use crate::manifest;

/// S3-backed client for `cfg`, keyed under `cfg.prefix`.
pub fn client_for(cfg: &Config) -> BlobClient {
    BlobClient::new(Arc::new(S3Backend::from_config(cfg)), cfg.prefix.clone())
}

/// Run one full pass of `output_dir` against the bucket described by `cfg`.
pub async fn deploy(cfg: &Config, output_dir: &Path, dry_run: bool) -> Result<SyncReport, SyncError> {
    let client = client_for(cfg);
    info!(
        "syncing {} to {}/{} via {}",
        output_dir.display(),
        cfg.bucket,
        cfg.prefix,
        cfg.endpoint
    );
    sync_dir(&client, output_dir, &SyncOptions::from_config(cfg, dry_run)).await
}

/// The manifest currently stored for `cfg`, `None` if the prefix was never synced.
pub async fn current_manifest(cfg: &Config) -> Result<Option<Manifest>, SyncError> {
    manifest::load(&client_for(cfg)).await
}

/// [`deploy`] on a private current-thread runtime, for synchronous hosts.
pub fn deploy_blocking(
    cfg: &Config,
    output_dir: &Path,
    dry_run: bool,
) -> Result<SyncReport, SyncError> {
    block_on(deploy(cfg, output_dir, dry_run))
}

/// [`current_manifest`] on a private current-thread runtime.
pub fn current_manifest_blocking(cfg: &Config) -> Result<Option<Manifest>, SyncError> {
    block_on(current_manifest(cfg))
}

fn block_on<T>(
    fut: impl std::future::Future<Output = Result<T, SyncError>>,
) -> Result<T, SyncError> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| io_err("tokio-runtime", e))?;
    runtime.block_on(fut)
}

#[cfg(test)]
mod tests {
    use assetsync_core::{Credentials, DeleteTag, GzipOptions};

    use super::*;

    fn config() -> Config {
        Config {
            bucket: "site".into(),
            region: "us-east-1".into(),
            prefix: "www".into(),
            endpoint: "http://127.0.0.1:9".into(),
            credentials: Credentials {
                access_key_id: "AKIA".into(),
                secret_access_key: "secret".into(),
                session_token: None,
            },
            force_path_style: true,
            clean_html_suffix: true,
            delete_tag: Some(DeleteTag {
                key: "stale".into(),
                value: "stale".into(),
            }),
            gzip: Some(GzipOptions { level: 4 }),
        }
    }

    #[test]
    fn options_follow_config() {
        let opts = SyncOptions::from_config(&config(), true);
        assert!(opts.clean_html_suffix);
        assert!(opts.dry_run);
        assert_eq!(opts.gzip, Some(GzipOptions { level: 4 }));
        assert_eq!(opts.delete_tag.unwrap().key, "stale");
    }

    #[test]
    fn client_uses_config_prefix() {
        let client = client_for(&config());
        assert_eq!(client.prefix(), "www");
        assert_eq!(client.backend_name(), "s3");
        assert_eq!(client.normalize_key("app.js"), "www/app.js");
    }

    #[test]
    fn missing_output_dir_fails_before_any_request() {
        let tmp = tempfile::TempDir::new().unwrap();
        let err = deploy_blocking(&config(), &tmp.path().join("dist"), false).unwrap_err();
        assert!(matches!(err, SyncError::Io { .. }), "got: {err}");
    }
}
