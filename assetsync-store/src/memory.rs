//! In-process backend.
//!
//! Holds objects, metadata and tags in memory and records every call in
//! order, so a whole sync pass can be replayed and inspected without a
//! network. Keys can be marked as failing or access-denied to exercise the
//! error paths.

use std::collections::{BTreeMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use crate::backend::{ObjectBackend, PutMetadata};
use crate::error::StoreError;

/// One recorded backend call, with the fully-prefixed key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Get(String),
    Put(String),
    Delete(String),
    Tag {
        key: String,
        tag_key: String,
        tag_value: String,
    },
}

impl Call {
    pub fn key(&self) -> &str {
        match self {
            Call::Get(key) | Call::Put(key) | Call::Delete(key) => key,
            Call::Tag { key, .. } => key,
        }
    }

    /// `true` for everything except reads.
    pub fn is_mutation(&self) -> bool {
        !matches!(self, Call::Get(_))
    }
}

/// An object as held by [`MemoryBackend`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub body: Vec<u8>,
    pub meta: PutMetadata,
    pub tags: BTreeMap<String, String>,
}

#[derive(Debug, Default)]
struct MemoryState {
    objects: BTreeMap<String, StoredObject>,
    calls: Vec<Call>,
    failing: HashSet<String>,
    denied: HashSet<String>,
}

#[derive(Debug, Default)]
pub struct MemoryBackend {
    state: Mutex<MemoryState>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MemoryState> {
        // A panicking test thread must not hide the recorded state.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Seed an object without recording a call.
    pub fn insert(&self, key: impl Into<String>, body: impl Into<Vec<u8>>) {
        self.state().objects.insert(
            key.into(),
            StoredObject {
                body: body.into(),
                meta: PutMetadata::new("application/octet-stream"),
                tags: BTreeMap::new(),
            },
        );
    }

    pub fn object(&self, key: &str) -> Option<StoredObject> {
        self.state().objects.get(key).cloned()
    }

    pub fn keys(&self) -> Vec<String> {
        self.state().objects.keys().cloned().collect()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state().calls.clone()
    }

    /// Recorded calls other than reads.
    pub fn mutations(&self) -> Vec<Call> {
        self.state()
            .calls
            .iter()
            .filter(|c| c.is_mutation())
            .cloned()
            .collect()
    }

    pub fn clear_calls(&self) {
        self.state().calls.clear();
    }

    /// Every later call touching `key` fails with [`StoreError::Request`].
    pub fn fail_on(&self, key: impl Into<String>) {
        self.state().failing.insert(key.into());
    }

    /// Every later call touching `key` fails with [`StoreError::AccessDenied`].
    pub fn deny(&self, key: impl Into<String>) {
        self.state().denied.insert(key.into());
    }

    /// Forget every key registered with [`fail_on`](Self::fail_on) or [`deny`](Self::deny).
    pub fn clear_faults(&self) {
        let mut state = self.state();
        state.failing.clear();
        state.denied.clear();
    }

    fn check(state: &MemoryState, op: &'static str, key: &str) -> Result<(), StoreError> {
        if state.failing.contains(key) {
            return Err(StoreError::Request {
                op,
                key: key.to_string(),
                message: "injected failure".to_string(),
            });
        }
        if state.denied.contains(key) {
            return Err(StoreError::AccessDenied { key: key.to_string() });
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl ObjectBackend for MemoryBackend {
    async fn get(&self, key: &str) -> Result<Vec<u8>, StoreError> {
        let mut state = self.state();
        state.calls.push(Call::Get(key.to_string()));
        Self::check(&state, "GetObject", key)?;
        state
            .objects
            .get(key)
            .map(|o| o.body.clone())
            .ok_or_else(|| StoreError::NotFound { key: key.to_string() })
    }

    async fn put(&self, key: &str, body: Vec<u8>, meta: &PutMetadata) -> Result<(), StoreError> {
        let mut state = self.state();
        state.calls.push(Call::Put(key.to_string()));
        Self::check(&state, "PutObject", key)?;
        state.objects.insert(
            key.to_string(),
            StoredObject {
                body,
                meta: meta.clone(),
                tags: BTreeMap::new(),
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        let mut state = self.state();
        state.calls.push(Call::Delete(key.to_string()));
        Self::check(&state, "DeleteObject", key)?;
        state
            .objects
            .remove(key)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound { key: key.to_string() })
    }

    async fn put_tag(&self, key: &str, tag_key: &str, tag_value: &str) -> Result<(), StoreError> {
        let mut state = self.state();
        state.calls.push(Call::Tag {
            key: key.to_string(),
            tag_key: tag_key.to_string(),
            tag_value: tag_value.to_string(),
        });
        Self::check(&state, "PutObjectTagging", key)?;
        let object = state
            .objects
            .get_mut(key)
            .ok_or_else(|| StoreError::NotFound { key: key.to_string() })?;
        object.tags.clear();
        object.tags.insert(tag_key.to_string(), tag_value.to_string());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_then_get_roundtrips_body_and_meta() {
        let backend = MemoryBackend::new();
        let meta = PutMetadata::new("text/css").with_cache_control("max-age=60");
        backend.put("p/site.css", b"body{}".to_vec(), &meta).await.unwrap();

        assert_eq!(backend.get("p/site.css").await.unwrap(), b"body{}");
        assert_eq!(backend.object("p/site.css").unwrap().meta, meta);
        assert_eq!(
            backend.calls(),
            vec![Call::Put("p/site.css".into()), Call::Get("p/site.css".into())]
        );
    }

    #[tokio::test]
    async fn missing_objects_report_not_found() {
        let backend = MemoryBackend::new();
        assert!(backend.get("nope").await.unwrap_err().is_not_found());
        assert!(backend.delete("nope").await.unwrap_err().is_not_found());
        assert!(backend.put_tag("nope", "k", "v").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn tagging_replaces_tag_set() {
        let backend = MemoryBackend::new();
        backend.insert("a.js", "x");
        backend.put_tag("a.js", "first", "1").await.unwrap();
        backend.put_tag("a.js", "stale", "stale").await.unwrap();

        let tags = backend.object("a.js").unwrap().tags;
        assert_eq!(tags.len(), 1);
        assert_eq!(tags.get("stale").map(String::as_str), Some("stale"));
    }

    #[tokio::test]
    async fn injected_failures_apply_per_key() {
        let backend = MemoryBackend::new();
        backend.fail_on("bad");
        backend.deny("secret");

        let err = backend.put("bad", vec![], &PutMetadata::default()).await.unwrap_err();
        assert!(matches!(err, StoreError::Request { op: "PutObject", .. }), "got: {err}");
        assert!(backend.get("secret").await.unwrap_err().is_access_denied());
        assert!(backend.object("bad").is_none());
    }
}
