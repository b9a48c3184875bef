//! Saved experiments.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::foundation::{ExperimentId, Timestamp};
use crate::domain::report::ResultPayload;
use crate::domain::wizard::AccumulatedState;

const UNKNOWN: &str = "Unknown";

/// One completed experiment: the inputs that were submitted and the
/// optimizer's full result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentRecord {
    pub id: ExperimentId,
    pub timestamp: Timestamp,
    pub material_name: String,
    pub category: String,
    pub optimization_goal: String,
    pub co2_score: Option<f64>,
    /// Kept as raw JSON so a record whose inputs no longer parse still
    /// lists and compares.
    pub full_input_json: Value,
    pub full_result_json: Value,
}

impl ExperimentRecord {
    /// Builds a record, filling display fields the inputs lack with "Unknown".
    pub fn new(input: AccumulatedState, result: Value) -> Self {
        let material_name = input
            .material_name
            .clone()
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| UNKNOWN.to_string());
        let category = input
            .category
            .map(|c| c.as_str().to_string())
            .unwrap_or_else(|| UNKNOWN.to_string());
        let optimization_goal = input
            .optimization_goal
            .map(|g| g.as_str().to_string())
            .unwrap_or_else(|| UNKNOWN.to_string());
        let co2_score = ResultPayload::from_value(&result).co2_score();

        Self {
            id: ExperimentId::new(),
            timestamp: Timestamp::now(),
            material_name,
            category,
            optimization_goal,
            co2_score,
            full_input_json: serde_json::to_value(&input).unwrap_or_default(),
            full_result_json: result,
        }
    }

    /// The submitted answers, if they still parse.
    pub fn inputs(&self) -> Option<AccumulatedState> {
        serde_json::from_value(self.full_input_json.clone()).ok()
    }

    /// One-line description for listings.
    pub fn summary(&self) -> String {
        let score = self
            .co2_score
            .map(|s| format!("{:.2}", s))
            .unwrap_or_else(|| "N/A".to_string());
        format!(
            "{} | {} ({}) | {} | CO₂ score {}",
            self.timestamp, self.material_name, self.category, self.optimization_goal, score
        )
    }
}
