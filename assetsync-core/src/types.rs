//! Domain types for assetsync.
//!
//! The [`Manifest`] is the only thing persisted by the engine; its JSON shape
//! (`{"<logical name>": {"hash": "<sha256 hex>"}}`) must stay stable across
//! versions, so it carries no version field and tolerates unknown keys.

use std::collections::btree_map;
use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Key of the manifest object, relative to the configured bucket prefix.
pub const MANIFEST_KEY: &str = "fingerprints.json";

/// Compression level used when `gzip: true` is configured.
pub const DEFAULT_GZIP_LEVEL: u32 = 6;

// ---------------------------------------------------------------------------
// Manifest
// ---------------------------------------------------------------------------

/// Content fingerprint of one uploaded file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fingerprint {
    /// Lowercase hex SHA-256 of the file's raw bytes.
    pub hash: String,
}

impl Fingerprint {
    pub fn new(hash: impl Into<String>) -> Self {
        Self { hash: hash.into() }
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.hash.fmt(f)
    }
}

/// Mapping from logical name to the fingerprint last uploaded under it.
///
/// Backed by a `BTreeMap` so the serialized form is ordered by name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Manifest {
    entries: BTreeMap<String, Fingerprint>,
}

impl Manifest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Fingerprint> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Record `fingerprint` under `name`, returning the previous entry.
    pub fn insert(&mut self, name: impl Into<String>, fingerprint: Fingerprint) -> Option<Fingerprint> {
        self.entries.insert(name.into(), fingerprint)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, Fingerprint> {
        self.entries.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

impl<'a> IntoIterator for &'a Manifest {
    type Item = (&'a String, &'a Fingerprint);
    type IntoIter = btree_map::Iter<'a, String, Fingerprint>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl FromIterator<(String, Fingerprint)> for Manifest {
    fn from_iter<I: IntoIterator<Item = (String, Fingerprint)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Upload policy
// ---------------------------------------------------------------------------

/// Canned access-control setting attached to an uploaded object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Acl {
    Private,
    PublicRead,
}

impl Acl {
    /// The canned-ACL string understood by S3-compatible services.
    pub fn as_str(self) -> &'static str {
        match self {
            Acl::Private => "private",
            Acl::PublicRead => "public-read",
        }
    }
}

impl fmt::Display for Acl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tag attached to a stale object in place of deleting it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteTag {
    pub key: String,
    pub value: String,
}

impl fmt::Display for DeleteTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.key, self.value)
    }
}

/// Payload compression settings for non-HTML uploads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GzipOptions {
    /// Deflate level, 0 (store) through 9 (best).
    pub level: u32,
}

impl Default for GzipOptions {
    fn default() -> Self {
        Self {
            level: DEFAULT_GZIP_LEVEL,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manifest_serializes_as_flat_object() {
        let mut manifest = Manifest::new();
        manifest.insert("index.html", Fingerprint::new("aa"));
        manifest.insert("app.js", Fingerprint::new("bb"));

        let json = serde_json::to_string(&manifest).expect("serialize");
        assert_eq!(json, r#"{"app.js":{"hash":"bb"},"index.html":{"hash":"aa"}}"#);
    }

    #[test]
    fn manifest_ignores_unknown_fingerprint_fields() {
        let json = r#"{"about":{"hash":"cc","size":12}}"#;
        let manifest: Manifest = serde_json::from_str(json).expect("deserialize");
        assert_eq!(manifest.get("about"), Some(&Fingerprint::new("cc")));
    }

    #[test]
    fn insert_returns_previous_entry() {
        let mut manifest = Manifest::new();
        assert!(manifest.insert("a", Fingerprint::new("1")).is_none());
        let prev = manifest.insert("a", Fingerprint::new("2"));
        assert_eq!(prev, Some(Fingerprint::new("1")));
        assert_eq!(manifest.len(), 1);
    }

    #[test]
    fn acl_and_tag_display() {
        assert_eq!(Acl::PublicRead.to_string(), "public-read");
        assert_eq!(Acl::Private.to_string(), "private");
        let tag = DeleteTag {
            key: "lifecycle".into(),
            value: "expire".into(),
        };
        assert_eq!(tag.to_string(), "lifecycle=expire");
    }

    #[test]
    fn gzip_defaults_to_level_six() {
        assert_eq!(GzipOptions::default().level, DEFAULT_GZIP_LEVEL);
    }
}
