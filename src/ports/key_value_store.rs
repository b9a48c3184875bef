//! Key-Value Store Port - string-keyed persistence for wizard state.
//!
//! Values are opaque strings (the application stores JSON). Stores must
//! survive process restarts to support resuming a session; in-memory
//! implementations exist for tests.

use async_trait::async_trait;

/// Errors that can occur during key-value operations
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Invalid key '{key}': {reason}")]
    InvalidKey { key: String, reason: String },

    #[error("IO error: {0}")]
    IoError(String),
}

/// Port for a namespaced string key-value store
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Reads a value. Returns `None` when the key is absent.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Writes a value, replacing any previous one.
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Removes a key. Removing an absent key is not an error.
    async fn remove(&self, key: &str) -> Result<(), StorageError>;
}
