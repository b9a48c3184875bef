//! Application layer - coordinates the wizard session with its ports.
//!
//! The domain session is synchronous and I/O free; this layer persists it,
//! runs the optimizer job around it and records finished experiments.

pub mod job_runner;
pub mod persistence;
pub mod wizard_controller;

pub use job_runner::{CancelToken, JobFailure, JobOutcome, JobRunner};
pub use persistence::{WizardPersistence, WIZARD_KEYS};
pub use wizard_controller::{ControllerError, Rehydrated, Turn, WizardController};
