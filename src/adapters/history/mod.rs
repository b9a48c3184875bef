//! Experiment History Adapters
//!
//! - **StoredExperimentHistory** - JSON array under one key of any KeyValueStore

mod stored_history;

pub use stored_history::{StoredExperimentHistory, DEFAULT_HISTORY_LIMIT, HISTORY_KEY};
