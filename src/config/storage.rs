//! Local storage configuration

use serde::Deserialize;
use std::path::PathBuf;

use super::error::ValidationError;

/// Where wizard state, history and exports live on disk
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Directory for the key-value store backing the wizard
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Directory exported reports are written to
    #[serde(default = "default_export_dir")]
    pub export_dir: PathBuf,

    /// Number of experiments kept in the history
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
}

impl StorageConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.history_limit == 0 {
            return Err(ValidationError::InvalidHistoryLimit);
        }
        Ok(())
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            export_dir: default_export_dir(),
            history_limit: default_history_limit(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data/wizard")
}

fn default_export_dir() -> PathBuf {
    PathBuf::from("./data/exports")
}

fn default_history_limit() -> usize {
    20
}
