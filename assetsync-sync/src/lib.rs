//! # assetsync-sync
//!
//! Incremental sync of a build output directory to a blob store.
//!
//! Call [`sync_dir`] with a [`BlobClient`](assetsync_store::BlobClient) to run
//! one pass, or [`pipeline::deploy`] to build the S3 client from a validated
//! [`Config`](assetsync_core::Config) and run the pass in one step.

pub mod engine;
pub mod error;
pub mod local;
pub mod manifest;
pub mod payload;
pub mod pipeline;

pub use engine::{sync_dir, FileOutcome, StaleOutcome, SyncOptions, SyncReport};
pub use error::SyncError;
