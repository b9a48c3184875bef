//! Report Exporter Port - writes results out for the user.

use async_trait::async_trait;
use serde_json::Value;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("Invalid export name: {0}")]
    InvalidName(String),

    #[error("Failed to serialize result: {0}")]
    SerializationFailed(String),

    #[error("IO error: {0}")]
    IoError(String),
}

/// Port for exporting a result document
#[async_trait]
pub trait ReportExporter: Send + Sync {
    /// Writes the raw result as pretty-printed JSON.
    async fn export_json(&self, result: &Value, name: &str) -> Result<PathBuf, ExportError>;

    /// Writes the rendered text report.
    async fn export_report(&self, result: &Value, name: &str) -> Result<PathBuf, ExportError>;
}
