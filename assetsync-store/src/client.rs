//! Engine-facing blob client.
//!
//! Keys passed in are logical (`assets/app.js`); keys handed to the backend
//! are `<prefix>/assets/app.js`. [`BlobClient::normalize_key`] is the only
//! place that shape is decided.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::backend::{ObjectBackend, PutMetadata};
use crate::error::StoreError;

#[derive(Clone)]
pub struct BlobClient {
    backend: Arc<dyn ObjectBackend>,
    prefix: String,
}

impl BlobClient {
    pub fn new(backend: Arc<dyn ObjectBackend>, prefix: impl Into<String>) -> Self {
        Self {
            backend,
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    /// `<prefix>/<key>` with exactly one separating slash.
    pub fn normalize_key(&self, key: &str) -> String {
        let prefix = self.prefix.trim_end_matches('/');
        let key = key.trim_start_matches('/');
        if prefix.is_empty() {
            key.to_string()
        } else {
            format!("{prefix}/{key}")
        }
    }

    /// Fetch an object; `None` when it is missing or access to it is denied.
    pub async fn fetch(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let full = self.normalize_key(key);
        match self.backend.get(&full).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.is_not_found() || e.is_access_denied() => {
                debug!(key = %full, reason = %e, "treating object as absent");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// [`fetch`](Self::fetch) and parse as JSON. Absence passes through.
    pub async fn fetch_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StoreError> {
        let Some(bytes) = self.fetch(key).await? else {
            return Ok(None);
        };
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|source| StoreError::Json {
                key: self.normalize_key(key),
                source,
            })
    }

    pub async fn store(&self, key: &str, body: Vec<u8>, meta: &PutMetadata) -> Result<(), StoreError> {
        self.backend.put(&self.normalize_key(key), body, meta).await
    }

    /// Delete an object. Already absent counts as success.
    pub async fn delete(&self, key: &str) -> Result<(), StoreError> {
        let full = self.normalize_key(key);
        match self.backend.delete(&full).await {
            Err(e) if e.is_not_found() => {
                warn!(key = %full, "delete: object already absent");
                Ok(())
            }
            other => other,
        }
    }

    /// Attach `tag_key=tag_value` to an object. A missing object is skipped.
    pub async fn tag(&self, key: &str, tag_key: &str, tag_value: &str) -> Result<(), StoreError> {
        let full = self.normalize_key(key);
        match self.backend.put_tag(&full, tag_key, tag_value).await {
            Err(e) if e.is_not_found() => {
                warn!(key = %full, "tag: object already absent");
                Ok(())
            }
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryBackend;

    fn client(prefix: &str) -> BlobClient {
        BlobClient::new(Arc::new(MemoryBackend::new()), prefix)
    }

    #[test]
    fn normalize_key_joins_with_single_slash() {
        let c = client("www");
        assert_eq!(c.normalize_key("app.js"), "www/app.js");
        assert_eq!(c.normalize_key("/app.js"), "www/app.js");
        assert_eq!(c.normalize_key("//css/site.css"), "www/css/site.css");

        let c = client("www/");
        assert_eq!(c.normalize_key("app.js"), "www/app.js");
    }

    #[test]
    fn normalize_key_keeps_nested_prefix() {
        let c = client("sites/blog");
        assert_eq!(c.normalize_key("fingerprints.json"), "sites/blog/fingerprints.json");
    }

    #[test]
    fn empty_prefix_leaves_key_unprefixed() {
        let c = client("");
        assert_eq!(c.normalize_key("/index.html"), "index.html");
    }
}
