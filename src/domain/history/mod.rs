//! Experiment history records and side-by-side comparison.

mod compare;
mod record;

pub use compare::{compare, risk_score, Comparison, ComparisonRow, Recommendation, Side};
pub use record::ExperimentRecord;
