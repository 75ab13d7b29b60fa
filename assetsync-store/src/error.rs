//! Error types for assetsync-store.

use thiserror::Error;

/// All errors a blob store backend can report.
///
/// [`BlobClient`](crate::BlobClient) absorbs `NotFound` (and `AccessDenied`
/// on reads); everything else reaches the caller.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The object does not exist.
    #[error("object not found: {key}")]
    NotFound { key: String },

    /// The service refused access to this object.
    #[error("access denied for object: {key}")]
    AccessDenied { key: String },

    /// Any other failed request: network, credentials, throttling, ...
    #[error("{op} failed for {key}: {message}")]
    Request {
        op: &'static str,
        key: String,
        message: String,
    },

    /// Fetched bytes were not the expected JSON document.
    #[error("invalid JSON in {key}: {source}")]
    Json {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// A request could not be assembled locally.
    #[error("invalid request: {message}")]
    Build { message: String },
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }

    pub fn is_access_denied(&self) -> bool {
        matches!(self, StoreError::AccessDenied { .. })
    }
}
