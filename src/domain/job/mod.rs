//! Remote optimization jobs: identity, status reports and lifecycle.

mod handle;
mod phase;
mod policy;
mod status;

pub use handle::{JobHandle, JobId};
pub use phase::JobPhase;
pub use policy::PollPolicy;
pub use status::{JobStatus, PollVerdict, StatusReport};
