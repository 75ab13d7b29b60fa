//! YAML configuration.
//!
//! # File shape
//!
//! ```yaml
//! bucket: my-site
//! region: us-east-1
//! prefix: www
//! endpoint: "https://s3.{region}.amazonaws.com"
//! credentials:
//!   accessKeyId: AKIA...
//!   secretAccessKey: ...
//! cleanHtmlSuffix: true
//! deleteUseTag: stale          # or {key: lifecycle, value: expire}
//! gzip: true                   # or {level: 9}
//! ```
//!
//! # API pattern
//!
//! [`RawConfig`] mirrors the file exactly, every field optional.
//! [`RawConfig::validate`] turns it into a [`Config`] or fails on the first
//! problem. [`load_at`] does both for a file on disk.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ConfigError;
use crate::template::{self, TemplateFields};
use crate::types::{DeleteTag, GzipOptions};

/// Config file looked up in the working directory when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "assetsync.yaml";

// ---------------------------------------------------------------------------
// 1. Raw (as parsed)
// ---------------------------------------------------------------------------

/// Configuration exactly as it appears in YAML.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawConfig {
    pub bucket: Option<String>,
    pub region: Option<String>,
    pub prefix: Option<String>,
    pub endpoint: Option<String>,
    pub credentials: Option<RawCredentials>,
    #[serde(default)]
    pub force_path_style: bool,
    #[serde(default)]
    pub clean_html_suffix: bool,
    pub delete_use_tag: Option<RawDeleteTag>,
    pub gzip: Option<RawGzip>,
}

#[derive(Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCredentials {
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    pub session_token: Option<String>,
}

impl fmt::Debug for RawCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &self.secret_access_key.as_ref().map(|_| "<redacted>"))
            .field("session_token", &self.session_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// `deleteUseTag: stale` or `deleteUseTag: {key: .., value: ..}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawDeleteTag {
    Name(String),
    Pair { key: String, value: String },
}

/// `gzip: true` or `gzip: {level: ..}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawGzip {
    Enabled(bool),
    Params { level: Option<u32> },
}

// ---------------------------------------------------------------------------
// 2. Validated
// ---------------------------------------------------------------------------

/// Static credentials for the blob store.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: Option<String>,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field("session_token", &self.session_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Fully validated configuration for one sync pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub bucket: String,
    pub region: String,
    /// Key prefix with leading and trailing slashes removed.
    pub prefix: String,
    /// Endpoint URL with every template placeholder resolved.
    pub endpoint: String,
    pub credentials: Credentials,
    pub force_path_style: bool,
    pub clean_html_suffix: bool,
    pub delete_tag: Option<DeleteTag>,
    pub gzip: Option<GzipOptions>,
}

impl RawConfig {
    /// Check every option and resolve the endpoint template.
    pub fn validate(self) -> Result<Config, ConfigError> {
        let bucket = required(self.bucket, "bucket")?;
        let region = required(self.region, "region")?;
        let prefix = required(
            self.prefix.map(|p| p.trim().trim_matches('/').to_string()),
            "prefix",
        )?;
        let endpoint_template = required(self.endpoint, "endpoint")?;

        let raw_creds = self
            .credentials
            .ok_or(ConfigError::MissingField { field: "credentials" })?;
        let credentials = Credentials {
            access_key_id: required(raw_creds.access_key_id, "credentials.accessKeyId")?,
            secret_access_key: required(
                raw_creds.secret_access_key,
                "credentials.secretAccessKey",
            )?,
            session_token: raw_creds.session_token.filter(|t| !t.trim().is_empty()),
        };

        let delete_tag = self.delete_use_tag.map(validate_delete_tag).transpose()?;
        let gzip = match self.gzip {
            None | Some(RawGzip::Enabled(false)) => None,
            Some(RawGzip::Enabled(true)) => Some(GzipOptions::default()),
            Some(RawGzip::Params { level }) => {
                let level = level.unwrap_or(GzipOptions::default().level);
                if level > 9 {
                    return Err(ConfigError::InvalidGzipLevel { level });
                }
                Some(GzipOptions { level })
            }
        };

        let endpoint = template::render(
            &endpoint_template,
            &TemplateFields {
                bucket: &bucket,
                region: &region,
                prefix: &prefix,
            },
        )?;

        Ok(Config {
            bucket,
            region,
            prefix,
            endpoint,
            credentials,
            force_path_style: self.force_path_style,
            clean_html_suffix: self.clean_html_suffix,
            delete_tag,
            gzip,
        })
    }
}

fn required(value: Option<String>, field: &'static str) -> Result<String, ConfigError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
        _ => Err(ConfigError::MissingField { field }),
    }
}

fn validate_delete_tag(raw: RawDeleteTag) -> Result<DeleteTag, ConfigError> {
    let (key, value) = match raw {
        RawDeleteTag::Name(name) => (name.clone(), name),
        RawDeleteTag::Pair { key, value } => (key, value),
    };
    if key.trim().is_empty() || value.trim().is_empty() {
        return Err(ConfigError::InvalidDeleteTag);
    }
    Ok(DeleteTag { key, value })
}

// ---------------------------------------------------------------------------
// 3. Load
// ---------------------------------------------------------------------------

/// Parse YAML text; `origin` is only used for error messages.
pub fn parse_str(yaml: &str, origin: &Path) -> Result<RawConfig, ConfigError> {
    serde_yaml::from_str(yaml).map_err(|source| ConfigError::Parse {
        path: origin.to_path_buf(),
        source,
    })
}

/// Load and validate the configuration file at `path`.
pub fn load_at(path: &Path) -> Result<Config, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_str(&contents, path)?.validate()
}

/// Resolve the config path: the explicit one, else [`DEFAULT_CONFIG_FILE`] under `cwd`.
pub fn resolve_path(explicit: Option<&Path>, cwd: &Path) -> PathBuf {
    match explicit {
        Some(p) => p.to_path_buf(),
        None => cwd.join(DEFAULT_CONFIG_FILE),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
