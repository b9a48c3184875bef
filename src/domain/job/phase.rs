//! Lifecycle of one optimization job on the client side.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::StateMachine;

/// Where the job runner is in the submit/poll cycle.
///
/// `Idle` → `Submitting` → `Polling` → {`Done`, `Failed`, `TimedOut`}.
/// A resumed job enters `Polling` straight from `Idle`. Any non-terminal
/// phase may be `Cancelled` by a reset or a loaded experiment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobPhase {
    Idle,
    Submitting,
    Polling,
    Done,
    Failed,
    TimedOut,
    Cancelled,
}

impl Default for JobPhase {
    fn default() -> Self {
        Self::Idle
    }
}

impl StateMachine for JobPhase {
    fn can_transition_to(&self, target: &Self) -> bool {
        use JobPhase::*;
        matches!(
            (self, target),
            (Idle, Submitting)
                | (Idle, Polling) // resume
                | (Idle, Cancelled)
                | (Submitting, Polling)
                | (Submitting, Failed)
                | (Submitting, Cancelled)
                | (Polling, Done)
                | (Polling, Failed)
                | (Polling, TimedOut)
                | (Polling, Cancelled)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use JobPhase::*;
        match self {
            Idle => vec![Submitting, Polling, Cancelled],
            Submitting => vec![Polling, Failed, Cancelled],
            Polling => vec![Done, Failed, TimedOut, Cancelled],
            Done | Failed | TimedOut | Cancelled => vec![],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn happy_path_is_valid() {
        let phase = JobPhase::default()
            .transition_to(JobPhase::Submitting)
            .and_then(|p| p.transition_to(JobPhase::Polling))
            .and_then(|p| p.transition_to(JobPhase::Done))
            .unwrap();
        assert!(phase.is_terminal());
    }

    #[test]
    fn resume_skips_submission() {
        assert!(JobPhase::Idle.can_transition_to(&JobPhase::Polling));
    }

    #[test]
    fn terminal_phases_have_no_exits() {
        for phase in [
            JobPhase::Done,
            JobPhase::Failed,
            JobPhase::TimedOut,
            JobPhase::Cancelled,
        ] {
            assert!(phase.is_terminal(), "{:?}", phase);
            assert!(phase.transition_to(JobPhase::Polling).is_err());
        }
    }

    #[test]
    fn cannot_time_out_before_polling() {
        assert!(JobPhase::Submitting.transition_to(JobPhase::TimedOut).is_err());
    }

    #[test]
    fn transition_table_matches_predicate() {
        use JobPhase::*;
        for from in [Idle, Submitting, Polling, Done, Failed, TimedOut, Cancelled] {
            for to in from.valid_transitions() {
                assert!(from.can_transition_to(&to));
            }
        }
    }
}
