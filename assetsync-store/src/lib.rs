//! # assetsync-store
//!
//! Blob store client for the sync engine.
//!
//! [`BlobClient`] is the only type the engine talks to: it prefixes every
//! logical key and turns "not found" into an absent value or a no-op. The
//! transport lives behind the [`ObjectBackend`] trait, implemented for S3
//! ([`S3Backend`]) and for process memory ([`MemoryBackend`]).

pub mod backend;
pub mod client;
pub mod error;
pub mod memory;
pub mod s3;

pub use backend::{ObjectBackend, PutMetadata};
pub use client::BlobClient;
pub use error::StoreError;
pub use memory::{Call, MemoryBackend, StoredObject};
pub use s3::S3Backend;
