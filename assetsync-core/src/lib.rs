//! assetsync core library: domain types and configuration.
//!
//! - [`types`]: manifest, fingerprint and upload-policy types
//! - [`config`]: YAML configuration loading and eager validation
//! - [`template`]: `{field}` substitution for endpoint templates
//! - [`error`]: [`ConfigError`]

pub mod config;
pub mod error;
pub mod template;
pub mod types;

pub use config::{Config, Credentials, RawConfig};
pub use error::ConfigError;
pub use types::{Acl, DeleteTag, Fingerprint, GzipOptions, Manifest, MANIFEST_KEY};
