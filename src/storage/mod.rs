//! Key-value storage backends.
//!
//! History lives in a single named slot. The slot is reached through the
//! [`KeyValueStore`] trait; tests swap the file backend for an in-memory one.

pub mod file;
#[cfg(test)]
pub mod memory;

pub use file::FileStore;
#[cfg(test)]
pub use memory::MemoryStore;

use thiserror::Error;

/// Errors from storage backends.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid storage key: {0:?}")]
    InvalidKey(String),

    #[error("storage quota exceeded: {size} bytes (limit {limit})")]
    QuotaExceeded { size: usize, limit: usize },
}

pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// String slots addressed by key.
pub trait KeyValueStore: Send + Sync {
    /// Read a slot. `Ok(None)` when it was never written.
    fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Overwrite a slot with `value`.
    fn set(&self, key: &str, value: &str) -> StorageResult<()>;
}
