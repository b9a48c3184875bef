//! Identity of one submitted optimization job.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::{Timestamp, ValidationError};

/// Opaque job identifier issued by the optimizer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(String);

impl JobId {
    /// Wraps a server-issued id, rejecting blank values.
    pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
        let id = id.into();
        let trimmed = id.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::empty_field("job_id"));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A submitted job that has not reached a terminal resolution yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobHandle {
    pub job_id: JobId,
    pub created_at: Timestamp,
}

impl JobHandle {
    pub fn new(job_id: JobId) -> Self {
        Self {
            job_id,
            created_at: Timestamp::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn job_id_is_trimmed_and_non_blank() {
        assert_eq!(JobId::new("  abc123 ").unwrap().as_str(), "abc123");
        assert!(JobId::new("   ").is_err());
    }

    #[test]
    fn handle_serializes_with_camel_case() {
        let handle = JobHandle::new(JobId::new("abc123").unwrap());
        let json = serde_json::to_value(&handle).unwrap();
        assert_eq!(json["jobId"], "abc123");
        assert!(json.get("createdAt").is_some());
    }
}
