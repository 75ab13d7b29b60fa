//! Manifest persistence: the fingerprint map stored in the bucket itself.
//!
//! The manifest lives at `<prefix>/fingerprints.json`, is read once at the
//! start of a pass and written once at the end. It is never patched in place.

use sha2::{Digest, Sha256};

use assetsync_core::{Acl, Fingerprint, Manifest, MANIFEST_KEY};
use assetsync_store::{BlobClient, PutMetadata, StoreError};

use crate::error::SyncError;

/// SHA-256 fingerprint of raw file bytes.
pub fn fingerprint(bytes: &[u8]) -> Fingerprint {
    let mut h = Sha256::new();
    h.update(bytes);
    Fingerprint::new(hex::encode(h.finalize()))
}

/// Load the remote manifest.
///
/// `Ok(None)` when it has never been written (or is not readable); a
/// manifest that exists but does not parse is an error, never an empty map.
pub async fn load(client: &BlobClient) -> Result<Option<Manifest>, SyncError> {
    match client.fetch_json::<Manifest>(MANIFEST_KEY).await {
        Ok(manifest) => Ok(manifest),
        Err(StoreError::Json { key, source }) => Err(SyncError::ManifestParse { key, source }),
        Err(e) => Err(e.into()),
    }
}

/// Replace the remote manifest with `manifest` (JSON, private).
pub async fn save(client: &BlobClient, manifest: &Manifest) -> Result<(), SyncError> {
    let body = serde_json::to_vec_pretty(manifest)?;
    let meta = PutMetadata::new("application/json").with_acl(Acl::Private);
    client.store(MANIFEST_KEY, body, &meta).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use assetsync_store::MemoryBackend;

    use super::*;

    fn setup() -> (Arc<MemoryBackend>, BlobClient) {
        let backend = Arc::new(MemoryBackend::new());
        let client = BlobClient::new(backend.clone(), "www");
        (backend, client)
    }

    #[test]
    fn fingerprint_is_sha256_hex() {
        assert_eq!(
            fingerprint(b"").hash,
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(fingerprint(b"hello").hash.len(), 64);
    }

    #[tokio::test]
    async fn absent_manifest_loads_as_none() {
        let (_backend, client) = setup();
        assert!(load(&client).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn roundtrip_save_load() {
        let (backend, client) = setup();
        let mut manifest = Manifest::new();
        manifest.insert("index.html", fingerprint(b"<html>"));
        manifest.insert("app.js", fingerprint(b"console.log(1)"));

        save(&client, &manifest).await.unwrap();
        let loaded = load(&client).await.unwrap().expect("present");
        assert_eq!(loaded, manifest);

        let stored = backend.object("www/fingerprints.json").expect("stored");
        assert_eq!(stored.meta.content_type, "application/json");
        assert_eq!(stored.meta.acl, Some(Acl::Private));
        assert!(stored.meta.cache_control.is_none());
    }

    #[tokio::test]
    async fn corrupt_manifest_is_a_parse_error() {
        let (backend, client) = setup();
        backend.insert("www/fingerprints.json", "[1, 2");

        let err = load(&client).await.unwrap_err();
        match err {
            SyncError::ManifestParse { key, .. } => assert_eq!(key, "www/fingerprints.json"),
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn wrong_shape_manifest_is_a_parse_error() {
        let (backend, client) = setup();
        backend.insert("www/fingerprints.json", r#"{"app.js":"deadbeef"}"#);
        assert!(matches!(
            load(&client).await.unwrap_err(),
            SyncError::ManifestParse { .. }
        ));
    }
}
