//! Upload body and headers for a changed file.
//!
//! | file          | cache-control     | gzip (when enabled) |
//! |---------------|-------------------|---------------------|
//! | `text/html`   | none              | never               |
//! | anything else | 1 year, immutable | yes                 |
//!
//! Every asset is uploaded `public-read`.

use std::io::Write;
use std::path::Path;

use flate2::write::GzEncoder;
use flate2::Compression;
use tracing::info;

use assetsync_core::{Acl, GzipOptions};
use assetsync_store::PutMetadata;

use crate::error::SyncError;

/// Cache-control for fingerprinted, non-HTML assets.
pub const IMMUTABLE_CACHE_CONTROL: &str = "public, max-age=31536000, immutable";

/// Body and metadata ready for [`BlobClient::store`](assetsync_store::BlobClient::store).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payload {
    pub body: Vec<u8>,
    pub meta: PutMetadata,
    pub compressed: bool,
}

/// MIME type from the file extension, `application/octet-stream` when unknown.
pub fn content_type_for(path: &Path) -> String {
    mime_guess::from_path(path)
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}

pub fn is_html(content_type: &str) -> bool {
    content_type == "text/html"
}

/// Build the upload for `source` (the on-disk path, which decides the
/// content type even when `name` has had its `.html` suffix stripped).
pub fn prepare(
    source: &Path,
    name: &str,
    bytes: Vec<u8>,
    gzip: Option<GzipOptions>,
) -> Result<Payload, SyncError> {
    let content_type = content_type_for(source);
    let mut meta = PutMetadata::new(content_type.as_str()).with_acl(Acl::PublicRead);

    if is_html(&content_type) {
        return Ok(Payload {
            body: bytes,
            meta,
            compressed: false,
        });
    }

    meta = meta.with_cache_control(IMMUTABLE_CACHE_CONTROL);
    let Some(gzip) = gzip else {
        return Ok(Payload {
            body: bytes,
            meta,
            compressed: false,
        });
    };

    let original = bytes.len();
    let body = compress(&bytes, gzip.level).map_err(|source| SyncError::Compress {
        name: name.to_string(),
        source,
    })?;
    info!("compressed: {name} ({original} -> {} bytes)", body.len());
    Ok(Payload {
        body,
        meta: meta.with_content_encoding("gzip"),
        compressed: true,
    })
}

fn compress(bytes: &[u8], level: u32) -> std::io::Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::with_capacity(bytes.len() / 2), Compression::new(level));
    encoder.write_all(bytes)?;
    encoder.finish()
}
