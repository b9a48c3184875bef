//! Optimizer Client Port - the remote optimization service.
//!
//! Submission returns a job id; the job is then polled by id until it
//! reports a terminal status. Implementations apply a per-request timeout;
//! the overall polling budget belongs to the caller.

use async_trait::async_trait;

use crate::domain::job::{JobId, StatusReport};
use crate::domain::wizard::OptimizationRequest;

/// Errors from a single optimizer request
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum OptimizerError {
    #[error("Network error: {0}")]
    Transport(String),

    #[error("Request timed out")]
    Timeout,

    #[error("API returned status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Port for submitting and polling optimization jobs
#[async_trait]
pub trait OptimizerClient: Send + Sync {
    /// Submits a payload (`POST /optimize`) and returns the issued job id.
    async fn submit(&self, request: &OptimizationRequest) -> Result<JobId, OptimizerError>;

    /// Fetches the current status of a job (`GET /status/{job_id}`).
    async fn status(&self, job_id: &JobId) -> Result<StatusReport, OptimizerError>;
}
