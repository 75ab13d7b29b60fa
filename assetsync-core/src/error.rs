//! Error types for assetsync-core.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise while loading or validating configuration.
///
/// Every variant is fatal and is raised before any remote call is made.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("I/O error reading config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML parse error on load, with file path and line context from serde_yaml.
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// A required option is absent or blank.
    #[error("missing required option `{field}`")]
    MissingField { field: &'static str },

    /// `deleteUseTag` was given with an empty key or value.
    #[error("deleteUseTag needs a non-empty key and value")]
    InvalidDeleteTag,

    /// `gzip.level` is outside the range accepted by deflate.
    #[error("gzip level {level} is out of range (expected 0-9)")]
    InvalidGzipLevel { level: u32 },

    /// The endpoint template could not be tokenized.
    #[error("malformed endpoint template '{template}': {reason}")]
    MalformedTemplate {
        template: String,
        reason: &'static str,
    },

    /// A `{name}` placeholder names an unknown field or one that is empty.
    #[error("endpoint placeholder '{{{placeholder}}}' does not resolve to a value")]
    UnresolvedPlaceholder { placeholder: String },
}
