//! Experiment history kept as one JSON array in a key-value store.
//!
//! Newest first, capped at a fixed number of records. A value that fails
//! to parse reads as an empty history and is overwritten by the next save.
//! Inside a readable array, a single malformed record is skipped and the
//! rest are kept.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::domain::foundation::ExperimentId;
use crate::domain::history::ExperimentRecord;
use crate::domain::wizard::AccumulatedState;
use crate::ports::{ExperimentHistory, HistoryError, KeyValueStore};

/// Storage key for the history array.
pub const HISTORY_KEY: &str = "experiment_history";

/// Default number of records kept.
pub const DEFAULT_HISTORY_LIMIT: usize = 20;

pub struct StoredExperimentHistory {
    store: Arc<dyn KeyValueStore>,
    limit: usize,
    /// Serializes read-modify-write cycles.
    write_lock: Mutex<()>,
}

impl StoredExperimentHistory {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self::with_limit(store, DEFAULT_HISTORY_LIMIT)
    }

    pub fn with_limit(store: Arc<dyn KeyValueStore>, limit: usize) -> Self {
        Self {
            store,
            limit: limit.max(1),
            write_lock: Mutex::new(()),
        }
    }

    async fn read(&self) -> Result<Vec<ExperimentRecord>, HistoryError> {
        let Some(raw) = self.store.get(HISTORY_KEY).await? else {
            return Ok(Vec::new());
        };
        let entries: Vec<Value> = match serde_json::from_str(&raw) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(error = %e, "experiment history is unreadable, treating as empty");
                return Ok(Vec::new());
            }
        };
        let records = entries
            .into_iter()
            .filter_map(|entry| match serde_json::from_value(entry) {
                Ok(record) => Some(record),
                Err(e) => {
                    tracing::warn!(error = %e, "skipping malformed experiment record");
                    None
                }
            })
            .collect();
        Ok(records)
    }

    async fn write(&self, records: &[ExperimentRecord]) -> Result<(), HistoryError> {
        let json = serde_json::to_string(records)
            .map_err(|e| HistoryError::SerializationFailed(e.to_string()))?;
        self.store.set(HISTORY_KEY, &json).await?;
        Ok(())
    }
}

#[async_trait]
impl ExperimentHistory for StoredExperimentHistory {
    async fn save(
        &self,
        input: &AccumulatedState,
        result: &Value,
    ) -> Result<ExperimentRecord, HistoryError> {
        let _guard = self.write_lock.lock().await;

        let record = ExperimentRecord::new(input.clone(), result.clone());
        let mut records = self.read().await?;
        records.insert(0, record.clone());
        records.truncate(self.limit);
        self.write(&records).await?;

        tracing::info!(experiment_id = %record.id, material = %record.material_name, "experiment saved to history");
        Ok(record)
    }

    async fn list(&self) -> Result<Vec<ExperimentRecord>, HistoryError> {
        self.read().await
    }

    async fn find(&self, id: ExperimentId) -> Result<Option<ExperimentRecord>, HistoryError> {
        Ok(self.read().await?.into_iter().find(|r| r.id == id))
    }

    async fn delete(&self, id: ExperimentId) -> Result<(), HistoryError> {
        let _guard = self.write_lock.lock().await;

        let mut records = self.read().await?;
        let before = records.len();
        records.retain(|r| r.id != id);
        if records.len() != before {
            self.write(&records).await?;
        }
        Ok(())
    }

    async fn clear(&self) -> Result<(), HistoryError> {
        let _guard = self.write_lock.lock().await;
        self.store.remove(HISTORY_KEY).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::storage::InMemoryKeyValueStore;
    use serde_json::json;

    fn input(name: &str) -> AccumulatedState {
        AccumulatedState {
            material_name: Some(name.to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn saves_newest_first() {
        let history = StoredExperimentHistory::new(Arc::new(InMemoryKeyValueStore::new()));
        history.save(&input("first"), &json!({})).await.unwrap();
        history.save(&input("second"), &json!({})).await.unwrap();

        let names: Vec<_> = history
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.material_name)
            .collect();
        assert_eq!(names, vec!["second", "first"]);
    }

    #[tokio::test]
    async fn caps_at_limit() {
        let history =
            StoredExperimentHistory::with_limit(Arc::new(InMemoryKeyValueStore::new()), 3);
        for i in 0..5 {
            history.save(&input(&format!("m{}", i)), &json!({})).await.unwrap();
        }

        let records = history.list().await.unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].material_name, "m4");
        assert_eq!(records[2].material_name, "m2");
    }

    #[tokio::test]
    async fn default_limit_is_twenty() {
        let history = StoredExperimentHistory::new(Arc::new(InMemoryKeyValueStore::new()));
        for i in 0..25 {
            history.save(&input(&format!("m{}", i)), &json!({})).await.unwrap();
        }
        assert_eq!(history.list().await.unwrap().len(), DEFAULT_HISTORY_LIMIT);
    }

    #[tokio::test]
    async fn find_and_delete_by_id() {
        let history = StoredExperimentHistory::new(Arc::new(InMemoryKeyValueStore::new()));
        let kept = history.save(&input("kept"), &json!({})).await.unwrap();
        let gone = history.save(&input("gone"), &json!({})).await.unwrap();

        assert_eq!(history.find(gone.id).await.unwrap().unwrap().material_name, "gone");
        history.delete(gone.id).await.unwrap();
        assert!(history.find(gone.id).await.unwrap().is_none());
        assert_eq!(history.list().await.unwrap(), vec![kept]);

        history.delete(ExperimentId::new()).await.unwrap();
    }

    #[tokio::test]
    async fn corrupt_history_reads_as_empty() {
        let store = Arc::new(InMemoryKeyValueStore::new());
        store.set(HISTORY_KEY, "{not json").await.unwrap();
        let history = StoredExperimentHistory::new(store);

        assert!(history.list().await.unwrap().is_empty());
        history.save(&input("fresh"), &json!({})).await.unwrap();
        assert_eq!(history.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn malformed_record_does_not_wipe_the_others() {
        let store = Arc::new(InMemoryKeyValueStore::new());
        let history = StoredExperimentHistory::new(store.clone());
        history.save(&input("older"), &json!({})).await.unwrap();
        history.save(&input("newer"), &json!({})).await.unwrap();

        let mut raw: Vec<Value> =
            serde_json::from_str(&store.get(HISTORY_KEY).await.unwrap().unwrap()).unwrap();
        raw[1]["full_input_json"] = json!({"num_trials": "many", "category": 7});
        raw.push(json!({"id": "not-a-uuid"}));
        store
            .set(HISTORY_KEY, &serde_json::to_string(&raw).unwrap())
            .await
            .unwrap();

        let records = history.list().await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].material_name, "older");
        assert_eq!(records[1].inputs(), None);

        history.save(&input("latest"), &json!({})).await.unwrap();
        let names: Vec<_> = history
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.material_name)
            .collect();
        assert_eq!(names, vec!["latest", "newer", "older"]);
    }

    #[tokio::test]
    async fn clear_removes_everything() {
        let store = Arc::new(InMemoryKeyValueStore::new());
        let history = StoredExperimentHistory::new(store.clone());
        history.save(&input("x"), &json!({})).await.unwrap();
        history.clear().await.unwrap();
        assert!(history.list().await.unwrap().is_empty());
        assert!(!store.contains(HISTORY_KEY).await);
    }

    #[tokio::test]
    async fn storage_failure_is_reported() {
        let store = Arc::new(InMemoryKeyValueStore::new());
        store.fail_writes(true);
        let history = StoredExperimentHistory::new(store);
        let err = history.save(&input("x"), &json!({})).await.unwrap_err();
        assert!(matches!(err, HistoryError::Storage(_)));
    }
}
