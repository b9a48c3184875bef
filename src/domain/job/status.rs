//! Status reports returned by the optimizer's status endpoint.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Remote job status as reported by `GET /status/{job_id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum JobStatus {
    Pending,
    Running,
    Done,
    Failed,
    /// Any status string this client does not know about.
    Other(String),
}

impl From<String> for JobStatus {
    fn from(raw: String) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pending" | "queued" => JobStatus::Pending,
            "running" | "processing" => JobStatus::Running,
            "done" | "completed" | "complete" => JobStatus::Done,
            "failed" | "error" => JobStatus::Failed,
            _ => JobStatus::Other(raw),
        }
    }
}

impl From<JobStatus> for String {
    fn from(status: JobStatus) -> Self {
        match status {
            JobStatus::Pending => "pending".to_string(),
            JobStatus::Running => "running".to_string(),
            JobStatus::Done => "done".to_string(),
            JobStatus::Failed => "failed".to_string(),
            JobStatus::Other(raw) => raw,
        }
    }
}

/// One poll response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusReport {
    pub status: JobStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// What a single poll means for the polling loop.
#[derive(Debug, Clone, PartialEq)]
pub enum PollVerdict {
    Finished(Value),
    Failed(Option<String>),
    StillRunning,
}

impl StatusReport {
    pub fn pending() -> Self {
        Self {
            status: JobStatus::Pending,
            result: None,
            error: None,
        }
    }

    pub fn done(result: Value) -> Self {
        Self {
            status: JobStatus::Done,
            result: Some(result),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            status: JobStatus::Failed,
            result: None,
            error: Some(error.into()),
        }
    }

    /// Classifies the report. A `done` status without a result (or with a
    /// `null` one) is not terminal yet.
    pub fn verdict(self) -> PollVerdict {
        match self.status {
            JobStatus::Done => match self.result {
                Some(result) if !result.is_null() => PollVerdict::Finished(result),
                _ => PollVerdict::StillRunning,
            },
            JobStatus::Failed => PollVerdict::Failed(self.error),
            JobStatus::Pending | JobStatus::Running | JobStatus::Other(_) => {
                PollVerdict::StillRunning
            }
        }
    }
}
