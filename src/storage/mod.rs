//! Object storage for scraped artifacts.
//!
//! The pipeline addresses everything by deterministic string keys
//! (see [`keys`]); stores only need put/get/copy/delete.

mod fs;
pub mod keys;
mod memory;

pub use fs::LocalObjectStore;
pub use memory::MemoryObjectStore;

use async_trait::async_trait;
use thiserror::Error;

/// Errors from object-store operations.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("object not found: {0}")]
    NotFound(String),

    #[error("invalid key: {0}")]
    InvalidKey(String),

    #[error("I/O error for key {key}: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },
}

/// Key-addressed store for text artifacts (HTML pages, CSV, JSON).
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Write an object, overwriting any previous content at the key.
    async fn put(&self, key: &str, content: &str, content_type: &str) -> Result<(), StorageError>;

    /// Read an object; `None` when the key does not exist.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Copy an object to a new key. Missing source is an error.
    async fn copy(&self, src_key: &str, dst_key: &str) -> Result<(), StorageError>;

    /// Delete an object. Deleting a missing key is not an error.
    async fn delete(&self, key: &str) -> Result<(), StorageError>;
}
