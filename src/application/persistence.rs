//! Wizard persistence over a key-value store.
//!
//! The session is spread over a fixed set of keys so each part can be
//! restored (or found corrupt) on its own. Write failures are logged and
//! swallowed: losing a save must never interrupt the conversation.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

use crate::domain::job::{JobHandle, JobId};
use crate::domain::wizard::{
    AccumulatedState, ConversationLog, NavigationHistory, SessionParts, Step, WizardSession,
};
use crate::ports::KeyValueStore;

pub const STATE_KEY: &str = "wizard_state";
pub const STEP_KEY: &str = "wizard_step";
pub const STEP_INDEX_KEY: &str = "wizard_step_index";
pub const JOB_KEY: &str = "wizard_job_id";
pub const MESSAGES_KEY: &str = "wizard_messages";
pub const RESULT_KEY: &str = "wizard_result_data";
pub const NAVIGATION_KEY: &str = "wizard_history";

/// Every key owned by the wizard.
pub const WIZARD_KEYS: [&str; 7] = [
    STATE_KEY,
    STEP_KEY,
    STEP_INDEX_KEY,
    JOB_KEY,
    MESSAGES_KEY,
    RESULT_KEY,
    NAVIGATION_KEY,
];

#[derive(Clone)]
pub struct WizardPersistence {
    store: Arc<dyn KeyValueStore>,
}

impl WizardPersistence {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Writes the whole session.
    ///
    /// Answers are kept while no result exists or while they are non-empty;
    /// once a result has been recorded and the answers forgotten, their key
    /// is removed. Absent job/result/navigation slots remove their keys.
    pub async fn save(&self, session: &WizardSession) {
        let state = session.state();
        if session.result().is_none() || *state != AccumulatedState::default() {
            self.put(STATE_KEY, state).await;
        } else {
            self.delete(STATE_KEY).await;
        }

        self.put(STEP_KEY, &session.step()).await;
        self.put(STEP_INDEX_KEY, &session.step_index()).await;
        self.put(MESSAGES_KEY, session.log()).await;

        if session.history().is_empty() {
            self.delete(NAVIGATION_KEY).await;
        } else {
            self.put(NAVIGATION_KEY, session.history()).await;
        }

        match session.job() {
            Some(job) => self.put(JOB_KEY, job).await,
            None => self.delete(JOB_KEY).await,
        }

        match session.result() {
            Some(result) => self.put(RESULT_KEY, result).await,
            None => self.delete(RESULT_KEY).await,
        }
    }

    /// Removes every wizard key.
    pub async fn clear(&self) {
        for key in WIZARD_KEYS {
            self.delete(key).await;
        }
    }

    /// Reads back a persisted session.
    ///
    /// A stored result takes priority and restores straight to `Complete`.
    /// Otherwise the answers, step and log must all be readable; anything
    /// less reads as no session at all. Navigation history and the job
    /// handle are optional and dropped individually when unreadable.
    pub async fn load(&self) -> Option<SessionParts> {
        let log = self.read::<ConversationLog>(MESSAGES_KEY).await;

        if let Some(result) = self.read::<Value>(RESULT_KEY).await.filter(|r| !r.is_null()) {
            let log = log.filter(|l| !l.is_empty()).unwrap_or_else(ConversationLog::seeded);
            return Some(SessionParts {
                step: Step::Complete,
                state: self.read(STATE_KEY).await.unwrap_or_default(),
                step_index: Step::Complete.progress_index(),
                log,
                history: NavigationHistory::new(),
                job: None,
                result: Some(result),
            });
        }

        let state = self.read::<AccumulatedState>(STATE_KEY).await?;
        let step = self.read::<Step>(STEP_KEY).await?;
        let log = log.filter(|l| !l.is_empty())?;
        let step_index = self
            .read::<u8>(STEP_INDEX_KEY)
            .await
            .unwrap_or_else(|| step.progress_index());
        let history = self.read(NAVIGATION_KEY).await.unwrap_or_default();
        let job = self.read_job().await;

        Some(SessionParts {
            step,
            state,
            step_index,
            log,
            history,
            job,
            result: None,
        })
    }

    /// Accepts a full handle, or a bare job id as older clients stored it.
    async fn read_job(&self) -> Option<JobHandle> {
        let raw = self.raw(JOB_KEY).await?;
        if let Ok(handle) = serde_json::from_str::<JobHandle>(&raw) {
            return Some(handle);
        }
        let id = serde_json::from_str::<String>(&raw).unwrap_or(raw);
        match JobId::new(id) {
            Ok(id) => Some(JobHandle::new(id)),
            Err(_) => {
                tracing::warn!(key = JOB_KEY, "ignoring unreadable job handle");
                None
            }
        }
    }

    async fn raw(&self, key: &str) -> Option<String> {
        match self.store.get(key).await {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(key, error = %e, "failed to read persisted wizard state");
                None
            }
        }
    }

    async fn read<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.raw(key).await?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(key, error = %e, "ignoring corrupt persisted wizard state");
                None
            }
        }
    }

    async fn put<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        let json = match serde_json::to_string(value) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!(key, error = %e, "failed to serialize wizard state");
                return;
            }
        };
        if let Err(e) = self.store.set(key, &json).await {
            tracing::warn!(key, error = %e, "failed to persist wizard state");
        }
    }

    async fn delete(&self, key: &str) {
        if let Err(e) = self.store.remove(key).await {
            tracing::warn!(key, error = %e, "failed to remove persisted wizard state");
        }
    }
}
