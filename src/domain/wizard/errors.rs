//! Errors for operations the wizard refuses in its current mode.

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum WizardError {
    #[error("A request is already being processed")]
    Busy,

    #[error("This experiment is already complete")]
    AlreadyComplete,

    #[error("There is no failed submission to retry")]
    NothingToRetry,
}
