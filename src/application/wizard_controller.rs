//! WizardController - the coordinator between the wizard session, the
//! optimizer job, persistence and the experiment history.
//!
//! All session mutation happens under one async mutex. Long-running job
//! work (submit, poll) runs outside the lock; every mutation that follows
//! an await first checks the job's [`CancelToken`], so a reset or a loaded
//! experiment that bumped the generation in the meantime wins.

use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{watch, Mutex};

use crate::domain::foundation::ExperimentId;
use crate::domain::history::{compare, Comparison, ExperimentRecord};
use crate::domain::job::{JobHandle, PollPolicy};
use crate::domain::wizard::{
    AccumulatedState, InputOutcome, InputRejection, OptimizationRequest, PayloadValidationError,
    Step, WizardError, WizardSession,
};
use crate::ports::{ExperimentHistory, HistoryError, OptimizerClient};

use super::job_runner::{CancelToken, JobFailure, JobOutcome, JobRunner};
use super::persistence::WizardPersistence;

const CONNECTION_FAILED: &str = "Server connection failed after multiple attempts.";
const TRY_AGAIN: &str = "The API might be processing your request. Please try again in a moment.";
const POLLING_EXHAUSTED: &str = "Maximum polling attempts reached without successful response";

/// Errors surfaced by controller operations.
#[derive(Debug, Error)]
pub enum ControllerError {
    #[error(transparent)]
    Wizard(#[from] WizardError),

    #[error(transparent)]
    History(#[from] HistoryError),

    #[error("Experiment not found: {0}")]
    NotFound(ExperimentId),
}

/// What was found in storage at start-up.
#[derive(Debug, Clone, PartialEq)]
pub enum Rehydrated {
    /// Nothing usable was persisted.
    Fresh,
    /// An in-progress conversation was restored.
    Restored,
    /// A finished experiment was restored.
    Completed,
    /// A job was in flight; call [`WizardController::resume`].
    ResumePolling(JobHandle),
}

/// Result of one user turn.
#[derive(Debug, Clone, PartialEq)]
pub enum Turn {
    Rejected(InputRejection),
    Advanced(Step),
    PayloadInvalid(PayloadValidationError),
    Finished(JobOutcome),
}

struct Inner {
    session: Mutex<WizardSession>,
    persistence: WizardPersistence,
    runner: JobRunner,
    history: Arc<dyn ExperimentHistory>,
    generation: watch::Sender<u64>,
}

/// Cheap to clone; clones share one session.
#[derive(Clone)]
pub struct WizardController {
    inner: Arc<Inner>,
}

impl WizardController {
    pub fn new(
        persistence: WizardPersistence,
        optimizer: Arc<dyn OptimizerClient>,
        history: Arc<dyn ExperimentHistory>,
        policy: PollPolicy,
    ) -> Self {
        let (generation, _) = watch::channel(0);
        Self {
            inner: Arc::new(Inner {
                session: Mutex::new(WizardSession::new()),
                persistence,
                runner: JobRunner::new(optimizer, policy),
                history,
                generation,
            }),
        }
    }

    /// Restores whatever the previous run left behind.
    pub async fn rehydrate(&self) -> Rehydrated {
        let Some(parts) = self.inner.persistence.load().await else {
            tracing::debug!("no persisted wizard session");
            return Rehydrated::Fresh;
        };

        let mut session = self.inner.session.lock().await;
        *session = WizardSession::from_parts(parts);
        tracing::info!(step = session.step().as_str(), "wizard session restored");

        if session.result().is_some() {
            Rehydrated::Completed
        } else if let Some(job) = session.job() {
            Rehydrated::ResumePolling(job.clone())
        } else {
            Rehydrated::Restored
        }
    }

    /// Re-enters the polling loop for a restored job. The attempt budget
    /// starts over. Returns `None` when no job is in flight.
    pub async fn resume(&self) -> Option<JobOutcome> {
        let (handle, token) = {
            let session = self.inner.session.lock().await;
            if !session.is_processing() {
                return None;
            }
            (session.job()?.clone(), self.token())
        };

        tracing::info!(job_id = %handle.job_id, "resuming polling for persisted job");
        Some(self.poll_job(handle, token).await)
    }

    /// Handles one line of user input. When the answer completes the
    /// wizard, the job is submitted and polled before this returns.
    pub async fn handle_input(&self, raw: &str) -> Result<Turn, ControllerError> {
        let (request, token) = {
            let mut session = self.inner.session.lock().await;
            let outcome = session.submit_answer(raw)?;
            let turn = match outcome {
                InputOutcome::Rejected(rejection) => Some(Turn::Rejected(rejection)),
                InputOutcome::Advanced(step) => {
                    tracing::debug!(step = step.as_str(), "wizard advanced");
                    Some(Turn::Advanced(step))
                }
                InputOutcome::ReadyToSubmit => None,
            };
            if let Some(turn) = turn {
                self.save(&session).await;
                return Ok(turn);
            }

            match self.prepare_submission(&mut session).await {
                Ok(ready) => ready,
                Err(invalid) => return Ok(Turn::PayloadInvalid(invalid)),
            }
        };

        Ok(Turn::Finished(self.run_submission(request, token).await))
    }

    /// Resubmits after a hard failure on the final step.
    pub async fn retry_submission(&self) -> Result<Turn, ControllerError> {
        let (request, token) = {
            let mut session = self.inner.session.lock().await;
            session.begin_retry()?;
            match self.prepare_submission(&mut session).await {
                Ok(ready) => ready,
                Err(invalid) => return Ok(Turn::PayloadInvalid(invalid)),
            }
        };

        tracing::info!("retrying submission");
        Ok(Turn::Finished(self.run_submission(request, token).await))
    }

    /// Undoes the last transition. `Ok(false)` when there was nothing to undo.
    pub async fn go_back(&self) -> Result<bool, ControllerError> {
        let mut session = self.inner.session.lock().await;
        let moved = session.go_back()?;
        if moved {
            tracing::debug!(step = session.step().as_str(), "went back");
            self.save(&session).await;
        }
        Ok(moved)
    }

    /// Starts over. Cancels any in-flight job and removes every wizard key.
    pub async fn reset(&self) {
        let mut session = self.inner.session.lock().await;
        self.bump_generation();
        session.reset();
        self.inner.persistence.clear().await;
        tracing::info!("wizard reset");
    }

    /// Replaces the session with a saved experiment.
    pub async fn load_experiment(&self, id: ExperimentId) -> Result<(), ControllerError> {
        let record = self.find_record(id).await?;
        let inputs = record.inputs().unwrap_or_else(|| {
            tracing::warn!(
                experiment_id = %id,
                "stored inputs are unreadable, loading result only"
            );
            AccumulatedState::default()
        });

        let mut session = self.inner.session.lock().await;
        self.bump_generation();
        let notification = format!(
            "Loaded experiment: {} ({})",
            record.material_name, record.timestamp
        );
        session.load_experiment(inputs, record.full_result_json, notification);
        self.save(&session).await;
        tracing::info!(experiment_id = %id, "experiment loaded");
        Ok(())
    }

    pub async fn history_list(&self) -> Result<Vec<ExperimentRecord>, ControllerError> {
        Ok(self.inner.history.list().await?)
    }

    /// Compares two saved experiments side by side.
    pub async fn compare_experiments(
        &self,
        a: ExperimentId,
        b: ExperimentId,
    ) -> Result<Comparison, ControllerError> {
        let first = self.find_record(a).await?;
        let second = self.find_record(b).await?;
        Ok(compare(&first, &second))
    }

    pub async fn delete_experiment(&self, id: ExperimentId) -> Result<(), ControllerError> {
        self.inner.history.delete(id).await?;
        tracing::info!(experiment_id = %id, "experiment deleted");
        Ok(())
    }

    async fn find_record(&self, id: ExperimentId) -> Result<ExperimentRecord, ControllerError> {
        self.inner
            .history
            .find(id)
            .await?
            .ok_or(ControllerError::NotFound(id))
    }

    /// Copy of the current session.
    pub async fn snapshot(&self) -> WizardSession {
        self.inner.session.lock().await.clone()
    }

    /// Assembles the payload for a session that just entered processing.
    /// On success the session is saved and a token for the job is issued
    /// while the lock is still held.
    async fn prepare_submission(
        &self,
        session: &mut WizardSession,
    ) -> Result<(OptimizationRequest, CancelToken), PayloadValidationError> {
        match session.payload() {
            Ok(request) => {
                self.save(session).await;
                Ok((request, self.token()))
            }
            Err(invalid) => {
                tracing::warn!(
                    violations = invalid.violations.len(),
                    "payload rejected before submission"
                );
                session.payload_rejected(&invalid);
                self.save(session).await;
                Err(invalid)
            }
        }
    }

    async fn run_submission(
        &self,
        request: OptimizationRequest,
        mut token: CancelToken,
    ) -> JobOutcome {
        let handle = match self.inner.runner.submit(&request, &mut token).await {
            Ok(handle) => handle,
            Err(outcome) => {
                self.apply_outcome(&outcome, &token).await;
                return outcome;
            }
        };

        {
            let mut session = self.inner.session.lock().await;
            if token.is_cancelled() {
                return JobOutcome::Cancelled;
            }
            session.job_submitted(handle.clone());
            self.save(&session).await;
        }

        self.poll_job(handle, token).await
    }

    async fn poll_job(&self, handle: JobHandle, mut token: CancelToken) -> JobOutcome {
        let outcome = self.inner.runner.poll(&handle, &mut token).await;
        self.apply_outcome(&outcome, &token).await;
        outcome
    }

    async fn apply_outcome(&self, outcome: &JobOutcome, token: &CancelToken) {
        let mut session = self.inner.session.lock().await;
        if token.is_cancelled() {
            tracing::debug!("discarding outcome of a superseded job");
            return;
        }

        match outcome {
            JobOutcome::Completed(result) => {
                session.job_succeeded(result.clone());
                self.save(&session).await;
                self.record_experiment(&mut session, result).await;
            }
            JobOutcome::Failed(failure) => {
                session.job_failed(failure_message(failure));
                self.save(&session).await;
            }
            JobOutcome::TimedOut { .. } => {
                session.job_failed(connection_failed(POLLING_EXHAUSTED));
                self.save(&session).await;
            }
            JobOutcome::Cancelled => {}
        }
    }

    /// Answers are only forgotten once the experiment is safely recorded.
    async fn record_experiment(&self, session: &mut WizardSession, result: &Value) {
        match self.inner.history.save(session.state(), result).await {
            Ok(record) => {
                tracing::info!(experiment_id = %record.id, "experiment recorded");
                session.forget_inputs();
                self.save(session).await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to record experiment, keeping inputs");
            }
        }
    }

    /// A pristine session is stored as no session at all, so rewinding to
    /// the first step does not leave an older snapshot behind.
    async fn save(&self, session: &WizardSession) {
        if session.is_pristine() {
            self.inner.persistence.clear().await;
            return;
        }
        self.inner.persistence.save(session).await;
    }

    fn token(&self) -> CancelToken {
        CancelToken::new(self.inner.generation.subscribe())
    }

    fn bump_generation(&self) {
        self.inner
            .generation
            .send_modify(|generation| *generation = generation.wrapping_add(1));
    }
}

fn connection_failed(details: &str) -> String {
    format!("{CONNECTION_FAILED}\n\nError Details:\n{details}\n\n{TRY_AGAIN}")
}

fn failure_message(failure: &JobFailure) -> String {
    match failure {
        JobFailure::Submission(e) => connection_failed(&e.to_string()),
        JobFailure::Remote(error) => format!(
            "The optimization job failed.\n\nError Details:\n{}",
            error.as_deref().unwrap_or("Unknown error")
        ),
    }
}
