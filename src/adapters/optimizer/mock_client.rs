//! Mock Optimizer Client for testing.
//!
//! Queued responses are consumed in order. When a queue runs dry the mock
//! falls back to a generated job id for submissions and `pending` for
//! status polls, so a test only scripts the calls it cares about.
//!
//! # Example
//!
//! ```ignore
//! let optimizer = MockOptimizerClient::new()
//!     .with_job_id("abc123")
//!     .with_status(StatusReport::pending())
//!     .with_status(StatusReport::done(json!({"ok": true})));
//! ```

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::time::sleep;

use crate::domain::job::{JobId, StatusReport};
use crate::domain::wizard::OptimizationRequest;
use crate::ports::{OptimizerClient, OptimizerError};

/// Mock optimizer for testing.
#[derive(Debug, Clone, Default)]
pub struct MockOptimizerClient {
    submissions: Arc<Mutex<VecDeque<Result<String, OptimizerError>>>>,
    statuses: Arc<Mutex<VecDeque<Result<StatusReport, OptimizerError>>>>,
    /// Simulated latency per request.
    delay: Duration,
    submitted: Arc<Mutex<Vec<OptimizationRequest>>>,
    polled: Arc<Mutex<Vec<JobId>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MockOptimizerClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a successful submission returning `job_id`.
    pub fn with_job_id(self, job_id: impl Into<String>) -> Self {
        lock(&self.submissions).push_back(Ok(job_id.into()));
        self
    }

    /// Queues a failed submission.
    pub fn with_submit_error(self, error: OptimizerError) -> Self {
        lock(&self.submissions).push_back(Err(error));
        self
    }

    /// Queues a status report.
    pub fn with_status(self, report: StatusReport) -> Self {
        self.push_status(Ok(report));
        self
    }

    /// Queues a failed status request.
    pub fn with_status_error(self, error: OptimizerError) -> Self {
        self.push_status(Err(error));
        self
    }

    /// Sets simulated latency per request.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Queues a status response on a mock that is already shared.
    pub fn push_status(&self, response: Result<StatusReport, OptimizerError>) {
        lock(&self.statuses).push_back(response);
    }

    pub fn submit_count(&self) -> usize {
        lock(&self.submitted).len()
    }

    pub fn submitted(&self) -> Vec<OptimizationRequest> {
        lock(&self.submitted).clone()
    }

    pub fn poll_count(&self) -> usize {
        lock(&self.polled).len()
    }

    /// Job ids in the order they were polled.
    pub fn polled(&self) -> Vec<JobId> {
        lock(&self.polled).clone()
    }
}

#[async_trait]
impl OptimizerClient for MockOptimizerClient {
    async fn submit(&self, request: &OptimizationRequest) -> Result<JobId, OptimizerError> {
        let call = {
            let mut submitted = lock(&self.submitted);
            submitted.push(request.clone());
            submitted.len()
        };

        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }

        let next = lock(&self.submissions).pop_front();
        let id = next.unwrap_or_else(|| Ok(format!("mock-job-{}", call)))?;
        JobId::new(id).map_err(|e| OptimizerError::InvalidResponse(e.to_string()))
    }

    async fn status(&self, job_id: &JobId) -> Result<StatusReport, OptimizerError> {
        lock(&self.polled).push(job_id.clone());

        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }

        let next = lock(&self.statuses).pop_front();
        next.unwrap_or_else(|| Ok(StatusReport::pending()))
    }
}
