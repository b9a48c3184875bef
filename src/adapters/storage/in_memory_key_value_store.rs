//! In-Memory Key-Value Store Adapter
//!
//! Keeps values in a shared map. Clones share the same map, which lets a
//! test "restart" a controller over the storage a previous one wrote.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::ports::{KeyValueStore, StorageError};

/// In-memory key-value storage
#[derive(Debug, Clone, Default)]
pub struct InMemoryKeyValueStore {
    values: Arc<RwLock<HashMap<String, String>>>,
    fail_writes: Arc<AtomicBool>,
}

impl InMemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent `set` fail with an IO error (for tests).
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of stored keys
    pub async fn len(&self) -> usize {
        self.values.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.values.read().await.is_empty()
    }

    pub async fn contains(&self, key: &str) -> bool {
        self.values.read().await.contains_key(key)
    }

    /// Stored keys in sorted order
    pub async fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.values.read().await.keys().cloned().collect();
        keys.sort();
        keys
    }
}

#[async_trait]
impl KeyValueStore for InMemoryKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.values.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::IoError("writes disabled".to_string()));
        }
        self.values
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.values.write().await.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn set_get_remove() {
        let store = InMemoryKeyValueStore::new();
        assert_eq!(store.get("wizard_step").await.unwrap(), None);

        store.set("wizard_step", "\"mass\"").await.unwrap();
        assert_eq!(
            store.get("wizard_step").await.unwrap().as_deref(),
            Some("\"mass\"")
        );

        store.remove("wizard_step").await.unwrap();
        assert!(store.is_empty().await);
        store.remove("wizard_step").await.unwrap();
    }

    #[tokio::test]
    async fn clones_share_state() {
        let store = InMemoryKeyValueStore::new();
        let other = store.clone();
        store.set("a", "1").await.unwrap();
        assert!(other.contains("a").await);
        assert_eq!(other.keys().await, vec!["a".to_string()]);
    }

    #[tokio::test]
    async fn failing_writes_leave_values_untouched() {
        let store = InMemoryKeyValueStore::new();
        store.set("a", "1").await.unwrap();
        store.fail_writes(true);
        assert!(store.set("a", "2").await.is_err());
        assert_eq!(store.get("a").await.unwrap().as_deref(), Some("1"));
    }
}
