//! Experiment History Port - the list of completed experiments.
//!
//! May be backed by local storage or a remote store; callers only see
//! records newest first.

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::foundation::ExperimentId;
use crate::domain::history::ExperimentRecord;
use crate::domain::wizard::AccumulatedState;

use super::StorageError;

#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    #[error("Experiment not found: {0}")]
    NotFound(ExperimentId),

    #[error("Failed to serialize history: {0}")]
    SerializationFailed(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Port for saving and browsing completed experiments
#[async_trait]
pub trait ExperimentHistory: Send + Sync {
    /// Records a completed experiment and returns the stored record.
    async fn save(
        &self,
        input: &AccumulatedState,
        result: &Value,
    ) -> Result<ExperimentRecord, HistoryError>;

    /// All records, newest first.
    async fn list(&self) -> Result<Vec<ExperimentRecord>, HistoryError>;

    /// Looks up one record.
    async fn find(&self, id: ExperimentId) -> Result<Option<ExperimentRecord>, HistoryError>;

    /// Removes one record. Deleting an unknown id is not an error.
    async fn delete(&self, id: ExperimentId) -> Result<(), HistoryError>;

    /// Removes every record.
    async fn clear(&self) -> Result<(), HistoryError>;
}
