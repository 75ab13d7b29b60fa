//! Error types for assetsync-sync.

use std::path::PathBuf;

use thiserror::Error;

use assetsync_store::StoreError;

/// All errors that abort a sync pass.
#[derive(Debug, Error)]
pub enum SyncError {
    /// A remote call failed for a reason other than "not found".
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to compress {name}: {source}")]
    Compress {
        name: String,
        #[source]
        source: std::io::Error,
    },

    /// The remote manifest exists but is not valid JSON of the expected shape.
    #[error("manifest at {key} is corrupt: {source}")]
    ManifestParse {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// JSON serialization error (manifest write).
    #[error("manifest JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience constructor for [`SyncError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SyncError {
    SyncError::Io {
        path: path.into(),
        source,
    }
}
