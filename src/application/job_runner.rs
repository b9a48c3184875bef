//! Submission and bounded polling of optimization jobs.
//!
//! The runner never touches the wizard session. It reports a [`JobOutcome`]
//! and leaves applying it to the caller. Every wait is raced against a
//! [`CancelToken`] so a reset or a loaded experiment stops the loop at the
//! next await point.

use serde_json::Value;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::time::sleep;

use crate::domain::foundation::StateMachine;
use crate::domain::job::{JobHandle, JobPhase, PollPolicy, PollVerdict};
use crate::domain::wizard::OptimizationRequest;
use crate::ports::{OptimizerClient, OptimizerError};

/// How a job ended, from the client's point of view.
#[derive(Debug, Clone, PartialEq)]
pub enum JobOutcome {
    /// The job finished with a result document.
    Completed(Value),
    /// Submission failed, or the optimizer reported the job as failed.
    Failed(JobFailure),
    /// The attempt budget ran out without a terminal status.
    TimedOut { attempts: u32 },
    /// A newer generation took over; nothing should be applied.
    Cancelled,
}

#[derive(Debug, Clone, PartialEq)]
pub enum JobFailure {
    Submission(OptimizerError),
    Remote(Option<String>),
}

impl JobOutcome {
    /// Terminal phase this outcome corresponds to.
    pub fn phase(&self) -> JobPhase {
        match self {
            JobOutcome::Completed(_) => JobPhase::Done,
            JobOutcome::Failed(_) => JobPhase::Failed,
            JobOutcome::TimedOut { .. } => JobPhase::TimedOut,
            JobOutcome::Cancelled => JobPhase::Cancelled,
        }
    }
}

/// Handle on a generation counter. Any change to the counter after the
/// token was issued cancels it.
#[derive(Debug, Clone)]
pub struct CancelToken {
    rx: watch::Receiver<u64>,
    generation: u64,
}

impl CancelToken {
    pub fn new(rx: watch::Receiver<u64>) -> Self {
        let generation = *rx.borrow();
        Self { rx, generation }
    }

    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow() != self.generation
    }

    /// Resolves once the token is cancelled or the counter is dropped.
    pub async fn cancelled(&mut self) {
        loop {
            if self.is_cancelled() {
                return;
            }
            if self.rx.changed().await.is_err() {
                return;
            }
        }
    }
}

/// Drives one job through submit and poll.
#[derive(Clone)]
pub struct JobRunner {
    optimizer: Arc<dyn OptimizerClient>,
    policy: PollPolicy,
}

impl JobRunner {
    pub fn new(optimizer: Arc<dyn OptimizerClient>, policy: PollPolicy) -> Self {
        Self { optimizer, policy }
    }

    /// Submits the payload once. Failures are final; nothing is retried.
    pub async fn submit(
        &self,
        request: &OptimizationRequest,
        cancel: &mut CancelToken,
    ) -> Result<JobHandle, JobOutcome> {
        let phase = advance(None, JobPhase::Idle, JobPhase::Submitting);

        let submitted = tokio::select! {
            _ = cancel.cancelled() => {
                advance(None, phase, JobPhase::Cancelled);
                return Err(JobOutcome::Cancelled);
            }
            submitted = self.optimizer.submit(request) => submitted,
        };

        match submitted {
            Ok(job_id) => {
                tracing::info!(job_id = %job_id, "optimization job submitted");
                advance(Some(job_id.as_str()), phase, JobPhase::Polling);
                Ok(JobHandle::new(job_id))
            }
            Err(e) => {
                tracing::error!(error = %e, "optimization submission failed");
                advance(None, phase, JobPhase::Failed);
                Err(JobOutcome::Failed(JobFailure::Submission(e)))
            }
        }
    }

    /// Polls until the job finishes, fails, exhausts the attempt budget or
    /// is cancelled.
    ///
    /// The first poll happens immediately. Transport errors and non-success
    /// statuses are transient: they are logged and still consume an attempt.
    pub async fn poll(&self, handle: &JobHandle, cancel: &mut CancelToken) -> JobOutcome {
        let job_id = handle.job_id.as_str();
        let phase = advance(Some(job_id), JobPhase::Idle, JobPhase::Polling);
        let max_attempts = self.policy.max_attempts;

        for attempt in 1..=max_attempts {
            tracing::debug!(job_id, attempt, max_attempts, "polling job status");

            let polled = tokio::select! {
                _ = cancel.cancelled() => return self.finish(job_id, phase, JobOutcome::Cancelled),
                polled = self.optimizer.status(&handle.job_id) => polled,
            };

            match polled {
                Ok(report) => match report.verdict() {
                    PollVerdict::Finished(result) => {
                        return self.finish(job_id, phase, JobOutcome::Completed(result));
                    }
                    PollVerdict::Failed(error) => {
                        return self.finish(
                            job_id,
                            phase,
                            JobOutcome::Failed(JobFailure::Remote(error)),
                        );
                    }
                    PollVerdict::StillRunning => {}
                },
                Err(e) => {
                    tracing::warn!(job_id, attempt, error = %e, "status poll failed, will retry");
                }
            }

            if attempt < max_attempts {
                tokio::select! {
                    _ = cancel.cancelled() => return self.finish(job_id, phase, JobOutcome::Cancelled),
                    _ = sleep(self.policy.interval) => {}
                }
            }
        }

        self.finish(
            job_id,
            phase,
            JobOutcome::TimedOut {
                attempts: max_attempts,
            },
        )
    }

    fn finish(&self, job_id: &str, phase: JobPhase, outcome: JobOutcome) -> JobOutcome {
        advance(Some(job_id), phase, outcome.phase());
        match &outcome {
            JobOutcome::Completed(_) => tracing::info!(job_id, "optimization job completed"),
            JobOutcome::Failed(failure) => {
                tracing::warn!(job_id, failure = ?failure, "optimization job failed")
            }
            JobOutcome::TimedOut { attempts } => {
                tracing::warn!(job_id, attempts, "optimization job timed out")
            }
            JobOutcome::Cancelled => tracing::info!(job_id, "polling cancelled"),
        }
        outcome
    }
}

fn advance(job_id: Option<&str>, from: JobPhase, to: JobPhase) -> JobPhase {
    match from.transition_to(to) {
        Ok(next) => {
            tracing::trace!(job_id, from = ?from, to = ?next, "job phase changed");
            next
        }
        Err(e) => {
            tracing::warn!(job_id, error = %e, "unexpected job phase change");
            to
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::optimizer::MockOptimizerClient;
    use crate::domain::job::{JobId, StatusReport};
    use crate::domain::wizard::{MaterialCategory, OptimizationGoal, ProcessingGoal, UserType};
    use serde_json::json;
    use std::time::Duration;

    fn request() -> OptimizationRequest {
        OptimizationRequest {
            user_type: UserType::Student,
            category: MaterialCategory::Biomass,
            material_name: "Rice Straw".to_string(),
            mass: 50.0,
            processing_goal: ProcessingGoal::RawBiochar,
            optimization_goal: OptimizationGoal::MaxCo2,
            activation: None,
            composite: None,
            moisture: 0.3,
            num_trials: 10,
        }
    }

    fn fast_policy(max_attempts: u32) -> PollPolicy {
        PollPolicy::new(Duration::from_millis(5), max_attempts)
    }

    fn token() -> (watch::Sender<u64>, CancelToken) {
        let (tx, rx) = watch::channel(0);
        (tx, CancelToken::new(rx))
    }

    fn handle(id: &str) -> JobHandle {
        JobHandle::new(JobId::new(id).unwrap())
    }

    #[tokio::test]
    async fn submit_returns_handle() {
        let mock = MockOptimizerClient::new().with_job_id("abc123");
        let runner = JobRunner::new(Arc::new(mock.clone()), fast_policy(3));
        let (_tx, mut cancel) = token();

        let handle = runner.submit(&request(), &mut cancel).await.unwrap();

        assert_eq!(handle.job_id.as_str(), "abc123");
        assert_eq!(mock.submitted(), vec![request()]);
    }

    #[tokio::test]
    async fn submit_failure_is_not_retried() {
        let mock = MockOptimizerClient::new().with_submit_error(OptimizerError::Rejected {
            status: 500,
            body: "boom".to_string(),
        });
        let runner = JobRunner::new(Arc::new(mock.clone()), fast_policy(3));
        let (_tx, mut cancel) = token();

        let outcome = runner.submit(&request(), &mut cancel).await.unwrap_err();

        assert!(matches!(
            outcome,
            JobOutcome::Failed(JobFailure::Submission(OptimizerError::Rejected { status: 500, .. }))
        ));
        assert_eq!(mock.submit_count(), 1);
    }

    #[tokio::test]
    async fn polls_until_done() {
        let mock = MockOptimizerClient::new()
            .with_status(StatusReport::pending())
            .with_status_error(OptimizerError::Rejected {
                status: 502,
                body: String::new(),
            })
            .with_status(StatusReport::done(json!({"score": 1})));
        let runner = JobRunner::new(Arc::new(mock.clone()), fast_policy(10));
        let (_tx, mut cancel) = token();

        let outcome = runner.poll(&handle("abc123"), &mut cancel).await;

        assert_eq!(outcome, JobOutcome::Completed(json!({"score": 1})));
        assert_eq!(mock.poll_count(), 3);
    }

    #[tokio::test]
    async fn remote_failure_ends_polling() {
        let mock = MockOptimizerClient::new().with_status(StatusReport::failed("diverged"));
        let runner = JobRunner::new(Arc::new(mock.clone()), fast_policy(10));
        let (_tx, mut cancel) = token();

        let outcome = runner.poll(&handle("abc123"), &mut cancel).await;

        assert_eq!(
            outcome,
            JobOutcome::Failed(JobFailure::Remote(Some("diverged".to_string())))
        );
        assert_eq!(mock.poll_count(), 1);
    }

    #[tokio::test]
    async fn exhausting_attempts_times_out() {
        let mock = MockOptimizerClient::new();
        let runner = JobRunner::new(Arc::new(mock.clone()), fast_policy(4));
        let (_tx, mut cancel) = token();

        let outcome = runner.poll(&handle("abc123"), &mut cancel).await;

        assert_eq!(outcome, JobOutcome::TimedOut { attempts: 4 });
        assert_eq!(mock.poll_count(), 4);
    }

    #[tokio::test]
    async fn bumping_the_generation_cancels_polling() {
        let mock = MockOptimizerClient::new();
        let runner = JobRunner::new(
            Arc::new(mock.clone()),
            PollPolicy::new(Duration::from_secs(60), 120),
        );
        let (tx, mut cancel) = token();

        let task = tokio::spawn(async move { runner.poll(&handle("abc123"), &mut cancel).await });
        while mock.poll_count() == 0 {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
        tx.send_modify(|g| *g += 1);

        let outcome = tokio::time::timeout(Duration::from_secs(5), task)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(outcome, JobOutcome::Cancelled);
        assert_eq!(mock.poll_count(), 1);
    }

    #[tokio::test]
    async fn already_cancelled_token_stops_before_polling() {
        let mock = MockOptimizerClient::new();
        let runner = JobRunner::new(Arc::new(mock.clone()), fast_policy(3));
        let (tx, mut cancel) = token();
        tx.send_modify(|g| *g += 1);

        let outcome = runner.poll(&handle("abc123"), &mut cancel).await;

        assert_eq!(outcome, JobOutcome::Cancelled);
        assert!(cancel.is_cancelled());
    }

    #[test]
    fn outcomes_map_to_terminal_phases() {
        for outcome in [
            JobOutcome::Completed(json!({})),
            JobOutcome::Failed(JobFailure::Remote(None)),
            JobOutcome::TimedOut { attempts: 1 },
            JobOutcome::Cancelled,
        ] {
            assert!(outcome.phase().is_terminal());
        }
    }
}
