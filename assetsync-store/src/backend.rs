//! Transport-level seam between [`BlobClient`](crate::BlobClient) and a
//! concrete object store.
//!
//! Backends see fully-prefixed keys and report missing objects as
//! [`StoreError::NotFound`]; they never decide whether that is fatal.

use assetsync_core::Acl;

use crate::error::StoreError;

/// Headers stored alongside an uploaded object.
///
/// Content length is always taken from the body by the backend.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PutMetadata {
    pub content_type: String,
    pub content_encoding: Option<String>,
    pub cache_control: Option<String>,
    pub acl: Option<Acl>,
}

impl PutMetadata {
    pub fn new(content_type: impl Into<String>) -> Self {
        Self {
            content_type: content_type.into(),
            ..Self::default()
        }
    }

    pub fn with_content_encoding(mut self, encoding: impl Into<String>) -> Self {
        self.content_encoding = Some(encoding.into());
        self
    }

    pub fn with_cache_control(mut self, directive: impl Into<String>) -> Self {
        self.cache_control = Some(directive.into());
        self
    }

    pub fn with_acl(mut self, acl: Acl) -> Self {
        self.acl = Some(acl);
        self
    }
}

#[async_trait::async_trait]
pub trait ObjectBackend: Send + Sync + 'static {
    /// Fetch the full body of `key`.
    async fn get(&self, key: &str) -> Result<Vec<u8>, StoreError>;

    /// Create or replace `key`.
    async fn put(&self, key: &str, body: Vec<u8>, meta: &PutMetadata) -> Result<(), StoreError>;

    async fn delete(&self, key: &str) -> Result<(), StoreError>;

    /// Replace the tag set of `key` with the single pair `tag_key=tag_value`.
    async fn put_tag(&self, key: &str, tag_key: &str, tag_value: &str) -> Result<(), StoreError>;

    /// Short backend name for log lines.
    fn name(&self) -> &'static str;
}
