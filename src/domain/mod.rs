//! Domain layer containing the wizard logic and its value types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared primitives (IDs, timestamps, validation errors, state machines)
//! - `wizard` - Step graph, accumulated answers, conversation log and session
//! - `job` - Remote optimization jobs and their client-side lifecycle
//! - `report` - Partial schema over result documents and the text report
//! - `history` - Saved experiment records

pub mod foundation;
pub mod history;
pub mod job;
pub mod report;
pub mod wizard;
