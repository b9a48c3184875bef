//! The experiment wizard: step graph, answers, validation and session.

mod choices;
mod conversation;
mod errors;
mod navigation;
mod payload;
mod session;
mod state;
mod step;
mod validation;

pub use choices::{
    ActivationAgent, ActivationMethod, CompositeStrategy, MaterialCategory, OptimizationGoal,
    ProcessingGoal, UserType, YesNo,
};
pub use conversation::{ConversationEntry, ConversationLog, EntryRole};
pub use errors::WizardError;
pub use navigation::{NavigationHistory, NavigationSnapshot};
pub use payload::{OptimizationRequest, PayloadValidationError};
pub use session::{InputOutcome, SessionParts, WizardSession};
pub use state::{AccumulatedState, Activation, Composite, Concentration, DEFAULT_MOISTURE};
pub use step::{next_step, Step, CUSTOM_MATERIAL_OPTION, MAX_STEP_INDEX};
pub use validation::{validate, Answer, InputRejection, MaterialChoice};
