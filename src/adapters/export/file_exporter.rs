//! Writes results into an export directory.

use async_trait::async_trait;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::domain::report;
use crate::ports::{ExportError, ReportExporter};

/// Exports to `<dir>/<name>.json` and `<dir>/<name>.txt`.
#[derive(Debug, Clone)]
pub struct FileReportExporter {
    dir: PathBuf,
}

impl FileReportExporter {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    async fn write(&self, name: &str, extension: &str, contents: &str) -> Result<PathBuf, ExportError> {
        let stem = sanitize(name)?;
        fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| ExportError::IoError(e.to_string()))?;

        let path = self.dir.join(format!("{}.{}", stem, extension));
        fs::write(&path, contents)
            .await
            .map_err(|e| ExportError::IoError(e.to_string()))?;

        tracing::info!(path = %path.display(), "result exported");
        Ok(path)
    }
}

/// Reduces a user-supplied name to a safe file stem.
fn sanitize(name: &str) -> Result<String, ExportError> {
    let stem: String = name
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    let stem = stem.trim_matches('_').to_string();
    if stem.is_empty() {
        return Err(ExportError::InvalidName(name.to_string()));
    }
    Ok(stem)
}

#[async_trait]
impl ReportExporter for FileReportExporter {
    async fn export_json(&self, result: &Value, name: &str) -> Result<PathBuf, ExportError> {
        let json = serde_json::to_string_pretty(result)
            .map_err(|e| ExportError::SerializationFailed(e.to_string()))?;
        self.write(name, "json", &json).await
    }

    async fn export_report(&self, result: &Value, name: &str) -> Result<PathBuf, ExportError> {
        self.write(name, "txt", &report::render(result)).await
    }
}
