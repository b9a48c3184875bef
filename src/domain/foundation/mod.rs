//! Foundation module - Shared domain primitives.
//!
//! Contains identifiers, timestamps, the state machine trait and the
//! validation error type that form the vocabulary of the wizard domain.

mod errors;
mod ids;
mod state_machine;
mod timestamp;

pub use errors::ValidationError;
pub use ids::{EntryId, ExperimentId};
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;
