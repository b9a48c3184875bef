//! One wizard conversation.
//!
//! `WizardSession` owns everything that changes while a user walks the
//! step graph: the current step, the accumulated answers, the log, the
//! undo stack and the job/result slots. It is synchronous and performs no
//! I/O; the application layer drives submission and persistence around it.

use serde_json::Value;

use crate::domain::job::JobHandle;
use crate::domain::report;

use super::conversation::ConversationLog;
use super::errors::WizardError;
use super::navigation::{NavigationHistory, NavigationSnapshot};
use super::payload::{OptimizationRequest, PayloadValidationError};
use super::state::AccumulatedState;
use super::step::{next_step, Step, MAX_STEP_INDEX};
use super::validation::{validate, InputRejection};

/// What happened to one line of user input.
#[derive(Debug, Clone, PartialEq)]
pub enum InputOutcome {
    /// Input did not satisfy the step; nothing but the log changed.
    Rejected(InputRejection),
    /// The session moved to a new data-collection step.
    Advanced(Step),
    /// The last answer was accepted; the payload should be submitted.
    ReadyToSubmit,
}

/// Everything needed to rebuild a session from storage.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionParts {
    pub step: Step,
    pub state: AccumulatedState,
    pub step_index: u8,
    pub log: ConversationLog,
    pub history: NavigationHistory,
    pub job: Option<JobHandle>,
    pub result: Option<Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WizardSession {
    step: Step,
    state: AccumulatedState,
    step_index: u8,
    log: ConversationLog,
    history: NavigationHistory,
    processing: bool,
    job: Option<JobHandle>,
    result: Option<Value>,
}

impl Default for WizardSession {
    fn default() -> Self {
        Self::new()
    }
}

impl WizardSession {
    /// A fresh session on the first step with the greeting in the log.
    pub fn new() -> Self {
        let step = Step::initial();
        Self {
            step,
            state: AccumulatedState::default(),
            step_index: step.progress_index(),
            log: ConversationLog::seeded(),
            history: NavigationHistory::new(),
            processing: false,
            job: None,
            result: None,
        }
    }

    /// Rebuilds a session from persisted parts.
    ///
    /// A stored result always wins: the session lands on `Complete` with no
    /// job. Otherwise a stored job means the session is still processing.
    pub fn from_parts(parts: SessionParts) -> Self {
        if parts.result.is_some() {
            return Self {
                step: Step::Complete,
                state: parts.state,
                step_index: MAX_STEP_INDEX,
                log: parts.log,
                history: parts.history,
                processing: false,
                job: None,
                result: parts.result,
            };
        }

        Self {
            processing: parts.job.is_some(),
            step: parts.step,
            state: parts.state,
            step_index: parts.step_index.min(MAX_STEP_INDEX),
            log: parts.log,
            history: parts.history,
            job: parts.job,
            result: None,
        }
    }

    /// Handles one line of user input.
    pub fn submit_answer(&mut self, raw: &str) -> Result<InputOutcome, WizardError> {
        if self.processing {
            return Err(WizardError::Busy);
        }
        if self.step.is_terminal() {
            return Err(WizardError::AlreadyComplete);
        }

        let marker = self.log.len();
        self.log.push_user(raw);

        let answer = match validate(self.step, raw) {
            Ok(answer) => answer,
            Err(rejection) => {
                self.log.push_assistant(rejection.message);
                return Ok(InputOutcome::Rejected(rejection));
            }
        };

        let merged = self.state.apply(&answer);
        self.history.push(NavigationSnapshot {
            step: self.step,
            state: std::mem::replace(&mut self.state, merged),
            step_index: self.step_index,
            conversation_length: marker,
        });

        let next = next_step(self.step, &self.state);
        self.step = next;
        self.step_index = next.progress_index();
        self.log.push_prompt(next);

        if next.is_terminal() {
            self.processing = true;
            Ok(InputOutcome::ReadyToSubmit)
        } else {
            Ok(InputOutcome::Advanced(next))
        }
    }

    /// Undoes the most recent transition. Returns `false` when there is
    /// nothing to undo.
    pub fn go_back(&mut self) -> Result<bool, WizardError> {
        if self.processing {
            return Err(WizardError::Busy);
        }
        let Some(snapshot) = self.history.pop() else {
            return Ok(false);
        };

        self.step = snapshot.step;
        self.state = snapshot.state;
        self.step_index = snapshot.step_index;
        self.log.rewind_to(snapshot.conversation_length);
        self.job = None;
        self.result = None;
        Ok(true)
    }

    /// Drops everything and starts over from the greeting.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Replaces the session with a previously completed experiment.
    pub fn load_experiment(
        &mut self,
        state: AccumulatedState,
        result: Value,
        notification: impl Into<String>,
    ) {
        let mut log = ConversationLog::new();
        log.push_assistant(notification);
        log.push_result(raw_result_block(&result));
        log.push_result(report::render(&result));

        *self = Self {
            step: Step::Complete,
            state,
            step_index: MAX_STEP_INDEX,
            log,
            history: NavigationHistory::new(),
            processing: false,
            job: None,
            result: Some(result),
        };
    }

    /// Assembles the submission payload from the current answers.
    pub fn payload(&self) -> Result<OptimizationRequest, PayloadValidationError> {
        OptimizationRequest::assemble(&self.state)
    }

    /// Records that the payload failed its pre-submission check.
    pub fn payload_rejected(&mut self, error: &PayloadValidationError) {
        self.log.push_assistant(error.to_message());
        self.processing = false;
    }

    pub fn job_submitted(&mut self, handle: JobHandle) {
        self.job = Some(handle);
    }

    /// Appends the raw result and the rendered report, then settles on
    /// `Complete`.
    pub fn job_succeeded(&mut self, result: Value) {
        self.log.push_result(raw_result_block(&result));
        self.log.push_result(report::render(&result));
        self.step = Step::Complete;
        self.step_index = MAX_STEP_INDEX;
        self.result = Some(result);
        self.job = None;
        self.processing = false;
    }

    /// Hard failure: the answers stay, the job is dropped.
    pub fn job_failed(&mut self, message: impl Into<String>) {
        self.log.push_assistant(message);
        self.job = None;
        self.processing = false;
    }

    /// Clears the answers and the undo stack once the result has been
    /// recorded elsewhere.
    pub fn forget_inputs(&mut self) {
        self.state = AccumulatedState::default();
        self.history.clear();
    }

    /// Re-enters processing after a hard failure on `Complete`.
    pub fn begin_retry(&mut self) -> Result<(), WizardError> {
        if self.processing {
            return Err(WizardError::Busy);
        }
        if !self.step.is_terminal() || self.result.is_some() {
            return Err(WizardError::NothingToRetry);
        }
        self.processing = true;
        self.log.push_prompt(Step::Complete);
        Ok(())
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn state(&self) -> &AccumulatedState {
        &self.state
    }

    pub fn step_index(&self) -> u8 {
        self.step_index
    }

    pub fn progress_percent(&self) -> u8 {
        ((u32::from(self.step_index) * 100) / u32::from(MAX_STEP_INDEX)) as u8
    }

    pub fn log(&self) -> &ConversationLog {
        &self.log
    }

    pub fn history(&self) -> &NavigationHistory {
        &self.history
    }

    pub fn is_processing(&self) -> bool {
        self.processing
    }

    pub fn job(&self) -> Option<&JobHandle> {
        self.job.as_ref()
    }

    pub fn result(&self) -> Option<&Value> {
        self.result.as_ref()
    }

    /// True until the first answer has been given.
    pub fn is_pristine(&self) -> bool {
        self.history.is_empty()
            && self.log.len() == 1
            && self.result.is_none()
            && self.job.is_none()
    }

    pub fn to_parts(&self) -> SessionParts {
        SessionParts {
            step: self.step,
            state: self.state.clone(),
            step_index: self.step_index,
            log: self.log.clone(),
            history: self.history.clone(),
            job: self.job.clone(),
            result: self.result.clone(),
        }
    }
}

fn raw_result_block(result: &Value) -> String {
    let pretty = serde_json::to_string_pretty(result).unwrap_or_else(|_| result.to_string());
    format!("```json\n{}\n```", pretty)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::job::JobId;
    use crate::domain::wizard::choices::{ActivationMethod, ProcessingGoal};
    use proptest::prelude::*;
    use serde_json::json;

    const STUDENT_PATH: [&str; 8] = [
        "Student / Learning Mode",
        "No",
        "biomass",
        "Rice Straw",
        "50",
        "raw_biochar",
        "max_co2",
        "10",
    ];

    fn answer_all(session: &mut WizardSession, answers: &[&str]) -> InputOutcome {
        let mut last = None;
        for answer in answers {
            last = Some(session.submit_answer(answer).unwrap());
        }
        last.unwrap()
    }

    fn handle(id: &str) -> JobHandle {
        JobHandle::new(JobId::new(id).unwrap())
    }

    #[test]
    fn new_session_is_seeded() {
        let session = WizardSession::new();
        assert_eq!(session.step(), Step::UserType);
        assert_eq!(session.step_index(), 0);
        assert_eq!(session.log().len(), 1);
        assert!(session.is_pristine());
        assert!(!session.is_processing());
    }

    #[test]
    fn rejected_input_only_touches_the_log() {
        let mut session = WizardSession::new();
        answer_all(&mut session, &["Researcher", "Yes"]);
        let before_state = session.state().clone();
        let before_history = session.history().len();

        let outcome = session.submit_answer("1.5").unwrap();

        assert!(matches!(outcome, InputOutcome::Rejected(_)));
        assert_eq!(session.step(), Step::MoistureValue);
        assert_eq!(session.state(), &before_state);
        assert_eq!(session.state().moisture, None);
        assert_eq!(session.history().len(), before_history);
        assert_eq!(
            session.log().last().unwrap().content,
            "Please enter a valid number between 0 and 1."
        );
    }

    #[test]
    fn student_path_reaches_submission() {
        let mut session = WizardSession::new();
        let outcome = answer_all(&mut session, &STUDENT_PATH);

        assert_eq!(outcome, InputOutcome::ReadyToSubmit);
        assert_eq!(session.step(), Step::Complete);
        assert_eq!(session.step_index(), MAX_STEP_INDEX);
        assert!(session.is_processing());
        assert_eq!(
            session.log().last().unwrap().content,
            "Processing your request and generating optimal recipe..."
        );

        let payload = session.payload().unwrap();
        assert_eq!(payload.moisture, 0.3);
        assert!(payload.activation.is_none());
        assert!(payload.composite.is_none());
    }

    #[test]
    fn input_while_processing_is_refused() {
        let mut session = WizardSession::new();
        answer_all(&mut session, &STUDENT_PATH);
        assert_eq!(session.submit_answer("hello"), Err(WizardError::Busy));
        assert_eq!(session.go_back(), Err(WizardError::Busy));
    }

    #[test]
    fn composite_physical_skips_agent_steps() {
        let mut session = WizardSession::new();
        answer_all(
            &mut session,
            &[
                "Industrial",
                "No",
                "plastic",
                "Other",
                "PET flakes",
                "200",
                "composite_filter",
                "balanced",
                "physical",
            ],
        );
        assert_eq!(session.step(), Step::CompositeStrategy);
        assert_eq!(
            session.state().activation.as_ref().unwrap().method,
            ActivationMethod::Physical
        );
        assert_eq!(session.state().material_name.as_deref(), Some("PET flakes"));
    }

    #[test]
    fn go_back_restores_pre_transition_values() {
        let mut session = WizardSession::new();
        answer_all(&mut session, &["Student", "No", "biomass"]);
        let step = session.step();
        let state = session.state().clone();
        let index = session.step_index();
        let length = session.log().len();

        session.submit_answer("Rice Straw").unwrap();
        assert!(session.go_back().unwrap());

        assert_eq!(session.step(), step);
        assert_eq!(session.state(), &state);
        assert_eq!(session.step_index(), index);
        assert_eq!(session.log().len(), length);
    }

    #[test]
    fn go_back_after_rejection_keeps_the_error_exchange() {
        let mut session = WizardSession::new();
        session.submit_answer("Student").unwrap();
        session.submit_answer("maybe").unwrap();
        let length = session.log().len();

        session.submit_answer("No").unwrap();
        session.go_back().unwrap();
        assert_eq!(session.log().len(), length);
    }

    #[test]
    fn go_back_with_empty_history_is_a_no_op() {
        let mut session = WizardSession::new();
        assert_eq!(session.go_back(), Ok(false));
        assert!(session.is_pristine());
    }

    #[test]
    fn success_renders_result_and_report() {
        let mut session = WizardSession::new();
        answer_all(&mut session, &STUDENT_PATH);
        session.job_submitted(handle("abc123"));
        session.job_succeeded(json!({"predicted_performance": {"co2_adsorption_score": 0.9}}));

        assert!(!session.is_processing());
        assert!(session.job().is_none());
        let entries = session.log().entries();
        let tail = &entries[entries.len() - 2..];
        assert!(tail.iter().all(|e| e.is_result));
        assert!(tail[0].content.starts_with("```json\n"));
        assert!(tail[1].content.starts_with(report::REPORT_TITLE));
    }

    #[test]
    fn failure_keeps_answers_and_allows_retry() {
        let mut session = WizardSession::new();
        answer_all(&mut session, &STUDENT_PATH);
        session.job_submitted(handle("abc123"));
        session.job_failed("Server connection failed.");

        assert!(!session.is_processing());
        assert!(session.job().is_none());
        assert_eq!(session.state().mass, Some(50.0));
        assert!(session.begin_retry().is_ok());
        assert!(session.is_processing());
    }

    #[test]
    fn retry_needs_a_failed_completion() {
        let mut session = WizardSession::new();
        assert_eq!(session.begin_retry(), Err(WizardError::NothingToRetry));

        answer_all(&mut session, &STUDENT_PATH);
        assert_eq!(session.begin_retry(), Err(WizardError::Busy));

        session.job_succeeded(json!({}));
        assert_eq!(session.begin_retry(), Err(WizardError::NothingToRetry));
    }

    #[test]
    fn payload_rejection_clears_processing() {
        let mut session = WizardSession::new();
        answer_all(&mut session, &STUDENT_PATH);
        let error = OptimizationRequest::assemble(&AccumulatedState::default()).unwrap_err();
        session.payload_rejected(&error);
        assert!(!session.is_processing());
        assert!(session
            .log()
            .last()
            .unwrap()
            .content
            .starts_with("Validation Error:\n"));
    }

    #[test]
    fn load_experiment_replaces_the_log() {
        let mut session = WizardSession::new();
        answer_all(&mut session, &["Student", "No"]);
        let state = AccumulatedState {
            processing_goal: Some(ProcessingGoal::RawBiochar),
            ..Default::default()
        };

        session.load_experiment(state.clone(), json!({"a": 1}), "Loaded experiment");

        assert_eq!(session.step(), Step::Complete);
        assert_eq!(session.step_index(), MAX_STEP_INDEX);
        assert_eq!(session.state(), &state);
        assert!(session.history().is_empty());
        let contents: Vec<_> = session.log().iter().map(|e| e.content.clone()).collect();
        assert_eq!(contents.len(), 3);
        assert_eq!(contents[0], "Loaded experiment");
        assert!(contents[1].contains("\"a\": 1"));
        assert!(contents[2].starts_with(report::REPORT_TITLE));
    }

    #[test]
    fn from_parts_prefers_result() {
        let mut session = WizardSession::new();
        answer_all(&mut session, &["Student"]);
        let mut parts = session.to_parts();
        parts.job = Some(handle("abc123"));
        parts.result = Some(json!({}));

        let restored = WizardSession::from_parts(parts);
        assert_eq!(restored.step(), Step::Complete);
        assert!(restored.job().is_none());
        assert!(!restored.is_processing());
    }

    #[test]
    fn from_parts_with_job_is_processing() {
        let mut session = WizardSession::new();
        answer_all(&mut session, &STUDENT_PATH);
        session.job_submitted(handle("abc123"));

        let restored = WizardSession::from_parts(session.to_parts());
        assert!(restored.is_processing());
        assert_eq!(restored.job().unwrap().job_id.as_str(), "abc123");
        assert_eq!(restored, session);
    }

    #[test]
    fn progress_percent_tracks_index() {
        let mut session = WizardSession::new();
        assert_eq!(session.progress_percent(), 0);
        answer_all(&mut session, &STUDENT_PATH);
        assert_eq!(session.progress_percent(), 100);
    }

    /// Answers that are always valid for each step, with variety where the
    /// step branches.
    fn answer_for(step: Step, choice: usize) -> String {
        let pick = |opts: &[&str]| opts[choice % opts.len()].to_string();
        match step {
            Step::UserType => pick(&["Researcher", "factory", "learning"]),
            Step::MoistureKnown | Step::ConcentrationKnown => pick(&["Yes", "No"]),
            Step::MoistureValue => pick(&["0", "0.45", "1"]),
            Step::Category => pick(&["agricultural", "biomass", "plastic", "mixed"]),
            Step::Material => pick(&["Rice Straw", "Date Palm Seeds", "Other"]),
            Step::MaterialCustom => "Coconut shell".to_string(),
            Step::Mass => pick(&["1", "50", "750.5"]),
            Step::ProcessingGoal => pick(&["raw_biochar", "activated_carbon", "composite_filter"]),
            Step::OptimizationGoal => pick(&["max_co2", "balanced", "max_stability"]),
            Step::ActivationMethod => pick(&["chemical", "physical"]),
            Step::ActivationAgent => pick(&["HCl", "KOH", "H3PO4"]),
            Step::ConcentrationValue => pick(&["0.5", "2", "3.75"]),
            Step::CompositeStrategy => pick(&["manual", "auto"]),
            Step::NumTrials => pick(&["1", "10", "42"]),
            Step::Complete => String::new(),
        }
    }

    proptest! {
        #[test]
        fn every_path_assembles_a_consistent_payload(choices in prop::collection::vec(0usize..12, 15)) {
            let mut session = WizardSession::new();
            let mut visited = Vec::new();
            for choice in &choices {
                if session.step().is_terminal() {
                    break;
                }
                visited.push(session.step());
                let answer = answer_for(session.step(), *choice);
                let outcome = session.submit_answer(&answer).unwrap();
                prop_assert!(!matches!(outcome, InputOutcome::Rejected(_)));
            }
            prop_assert_eq!(session.step(), Step::Complete);

            let payload = session.payload().unwrap();
            let activation_visited = visited.contains(&Step::ActivationMethod);
            prop_assert_eq!(payload.activation.is_some(), activation_visited);
            prop_assert_eq!(payload.processing_goal.requires_activation(), activation_visited);
            prop_assert_eq!(
                payload.composite.is_some(),
                visited.contains(&Step::CompositeStrategy)
            );
            prop_assert_eq!(
                payload.composite.is_some(),
                payload.processing_goal.is_composite()
            );
            prop_assert!((0.0..=1.0).contains(&payload.moisture));
        }

        #[test]
        fn go_back_then_redo_is_idempotent(
            choices in prop::collection::vec(0usize..12, 1..15),
        ) {
            let mut session = WizardSession::new();
            for choice in &choices {
                if session.step().is_terminal() {
                    break;
                }
                let answer = answer_for(session.step(), *choice);
                let before = session.clone();

                session.submit_answer(&answer).unwrap();
                if session.is_processing() {
                    break;
                }
                let after = session.clone();

                prop_assert!(session.go_back().unwrap());
                prop_assert_eq!(session.step(), before.step());
                prop_assert_eq!(session.state(), before.state());
                prop_assert_eq!(session.step_index(), before.step_index());
                prop_assert_eq!(session.log().len(), before.log().len());

                session.submit_answer(&answer).unwrap();
                prop_assert_eq!(session.step(), after.step());
                prop_assert_eq!(session.state(), after.state());
                prop_assert_eq!(session.log().len(), after.log().len());
            }
        }
    }
}
