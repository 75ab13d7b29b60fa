//! S3-compatible backend on top of `aws-sdk-s3`.
//!
//! Works against AWS S3 and S3-compatible services (MinIO, Cloudflare R2,
//! Backblaze B2) via an explicit endpoint and optional path-style addressing.

use aws_config::BehaviorVersion;
use aws_sdk_s3::config::http::HttpResponse;
use aws_sdk_s3::config::{Credentials as SdkCredentials, Region, SharedCredentialsProvider};
use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{ObjectCannedAcl, Tag, Tagging};
use aws_sdk_s3::Client;
use tracing::debug;

use assetsync_core::{Acl, Config};

use crate::backend::{ObjectBackend, PutMetadata};
use crate::error::StoreError;

#[derive(Clone)]
pub struct S3Backend {
    client: Client,
    bucket: String,
}

impl S3Backend {
    /// Build a client from validated configuration. No request is sent.
    pub fn from_config(cfg: &Config) -> Self {
        let creds = SdkCredentials::new(
            &cfg.credentials.access_key_id,
            &cfg.credentials.secret_access_key,
            cfg.credentials.session_token.clone(),
            None,
            "assetsync",
        );
        let conf = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(cfg.region.clone()))
            .endpoint_url(&cfg.endpoint)
            .force_path_style(cfg.force_path_style)
            .credentials_provider(SharedCredentialsProvider::new(creds))
            .build();

        Self {
            client: Client::from_conf(conf),
            bucket: cfg.bucket.clone(),
        }
    }
}

fn canned_acl(acl: Acl) -> ObjectCannedAcl {
    match acl {
        Acl::Private => ObjectCannedAcl::Private,
        Acl::PublicRead => ObjectCannedAcl::PublicRead,
    }
}

/// Map an SDK failure onto the store taxonomy.
///
/// The S3 error code wins; the HTTP status is only consulted when the
/// response carried no code (HEAD-style empty bodies).
fn classify<E>(op: &'static str, key: &str, err: SdkError<E, HttpResponse>) -> StoreError
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
{
    let status = err.raw_response().map(|r| r.status().as_u16());
    let (not_found, denied) = match err.code() {
        Some(code) => (
            matches!(code, "NoSuchKey" | "NotFound"),
            matches!(code, "AccessDenied" | "Forbidden"),
        ),
        None => (status == Some(404), status == Some(403)),
    };

    if not_found {
        StoreError::NotFound { key: key.to_string() }
    } else if denied {
        StoreError::AccessDenied { key: key.to_string() }
    } else {
        StoreError::Request {
            op,
            key: key.to_string(),
            message: DisplayErrorContext(&err).to_string(),
        }
    }
}

#[async_trait::async_trait]
impl ObjectBackend for S3Backend {
    async fn get(&self, key: &str) -> Result<Vec<u8>, StoreError> {
        let out = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| classify("GetObject", key, e))?;
        let body = out.body.collect().await.map_err(|e| StoreError::Request {
            op: "GetObject",
            key: key.to_string(),
            message: e.to_string(),
        })?;
        let bytes = body.into_bytes();
        debug!(key, len = bytes.len(), "S3 GET ok");
        Ok(bytes.to_vec())
    }

    async fn put(&self, key: &str, body: Vec<u8>, meta: &PutMetadata) -> Result<(), StoreError> {
        let len = body.len();
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_length(len as i64)
            .content_type(&meta.content_type)
            .set_content_encoding(meta.content_encoding.clone())
            .set_cache_control(meta.cache_control.clone())
            .set_acl(meta.acl.map(canned_acl))
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(|e| classify("PutObject", key, e))?;
        debug!(key, len, content_type = %meta.content_type, "S3 PUT ok");
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| classify("DeleteObject", key, e))?;
        debug!(key, "S3 DELETE ok");
        Ok(())
    }

    async fn put_tag(&self, key: &str, tag_key: &str, tag_value: &str) -> Result<(), StoreError> {
        let build_err = |e: aws_sdk_s3::error::BuildError| StoreError::Build {
            message: e.to_string(),
        };
        let tag = Tag::builder()
            .key(tag_key)
            .value(tag_value)
            .build()
            .map_err(build_err)?;
        let tagging = Tagging::builder().tag_set(tag).build().map_err(build_err)?;

        self.client
            .put_object_tagging()
            .bucket(&self.bucket)
            .key(key)
            .tagging(tagging)
            .send()
            .await
            .map_err(|e| classify("PutObjectTagging", key, e))?;
        debug!(key, tag_key, tag_value, "S3 PUT tagging ok");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "s3"
    }
}

#[cfg(test)]
mod tests {
    use aws_sdk_s3::error::ErrorMetadata;
    use aws_sdk_s3::operation::get_object::GetObjectError;
    use aws_sdk_s3::primitives::SdkBody;
    use aws_sdk_s3::types::error::NoSuchKey;

    use super::*;

    fn service_error(err: GetObjectError, status: u16) -> SdkError<GetObjectError, HttpResponse> {
        let raw = HttpResponse::new(status.try_into().unwrap(), SdkBody::empty());
        SdkError::service_error(err, raw)
    }

    fn coded(code: &str) -> GetObjectError {
        GetObjectError::generic(ErrorMetadata::builder().code(code).message("test").build())
    }

    #[test]
    fn no_such_key_is_not_found() {
        let err = service_error(GetObjectError::NoSuchKey(NoSuchKey::builder().build()), 404);
        assert!(classify("GetObject", "www/a.js", err).is_not_found());
    }

    #[test]
    fn access_denied_code_is_access_denied() {
        let err = service_error(coded("AccessDenied"), 403);
        assert!(classify("GetObject", "www/a.js", err).is_access_denied());
    }

    #[test]
    fn codeless_403_falls_back_to_status() {
        let err = service_error(GetObjectError::generic(ErrorMetadata::builder().build()), 403);
        assert!(classify("GetObject", "www/a.js", err).is_access_denied());
    }

    #[test]
    fn codeless_404_falls_back_to_status() {
        let err = service_error(GetObjectError::generic(ErrorMetadata::builder().build()), 404);
        assert!(classify("GetObject", "www/a.js", err).is_not_found());
    }

    #[test]
    fn missing_bucket_stays_fatal_despite_404() {
        let err = service_error(coded("NoSuchBucket"), 404);
        match classify("GetObject", "www/a.js", err) {
            StoreError::Request { op, key, .. } => {
                assert_eq!(op, "GetObject");
                assert_eq!(key, "www/a.js");
            }
            other => panic!("expected a request error, got {other}"),
        }
    }
}
