//! Submission payload assembled from the accumulated answers.
//!
//! The step graph already guarantees every required field is present by
//! the time `complete` is reached; [`OptimizationRequest::assemble`] checks
//! again and reports every violation at once before anything is sent.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::foundation::ValidationError;

use super::choices::{MaterialCategory, OptimizationGoal, ProcessingGoal, UserType};
use super::state::{AccumulatedState, Activation, Composite};

/// Body of `POST /optimize`.
///
/// `activation` and `composite` serialize as `null` when absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationRequest {
    pub user_type: UserType,
    pub category: MaterialCategory,
    pub material_name: String,
    pub mass: f64,
    pub processing_goal: ProcessingGoal,
    pub optimization_goal: OptimizationGoal,
    pub activation: Option<Activation>,
    pub composite: Option<Composite>,
    pub moisture: f64,
    pub num_trials: u32,
}

/// Every field that kept the payload from being submitted.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("payload has {} violation(s)", violations.len())]
pub struct PayloadValidationError {
    pub violations: Vec<ValidationError>,
}

impl PayloadValidationError {
    /// Chat message listing each violation on its own line.
    pub fn to_message(&self) -> String {
        let lines: Vec<String> = self.violations.iter().map(|v| v.to_string()).collect();
        format!("Validation Error:\n{}", lines.join("\n"))
    }
}

impl OptimizationRequest {
    /// Builds the request, collecting every violated precondition.
    pub fn assemble(state: &AccumulatedState) -> Result<Self, PayloadValidationError> {
        let mut violations = Vec::new();

        let user_type = require(state.user_type, "user_type", &mut violations);
        let category = require(state.category, "category", &mut violations);
        let material_name = match state.material_name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => Some(name.to_string()),
            _ => {
                violations.push(ValidationError::empty_field("material_name"));
                None
            }
        };
        let mass = match state.mass {
            Some(m) if m > 0.0 => Some(m),
            Some(m) => {
                violations.push(ValidationError::out_of_range("mass", "a positive number", m));
                None
            }
            None => {
                violations.push(ValidationError::empty_field("mass"));
                None
            }
        };
        let processing_goal = require(state.processing_goal, "processing_goal", &mut violations);
        let optimization_goal =
            require(state.optimization_goal, "optimization_goal", &mut violations);
        let moisture = match state.moisture {
            Some(m) if (0.0..=1.0).contains(&m) => Some(m),
            Some(m) => {
                violations.push(ValidationError::out_of_range("moisture", "between 0 and 1", m));
                None
            }
            None => {
                violations.push(ValidationError::empty_field("moisture"));
                None
            }
        };
        let num_trials = match state.num_trials {
            Some(n) if n > 0 => Some(n),
            Some(n) => {
                violations.push(ValidationError::out_of_range(
                    "num_trials",
                    "a positive integer",
                    n,
                ));
                None
            }
            None => {
                violations.push(ValidationError::empty_field("num_trials"));
                None
            }
        };

        match (
            user_type,
            category,
            material_name,
            mass,
            processing_goal,
            optimization_goal,
            moisture,
            num_trials,
        ) {
            (
                Some(user_type),
                Some(category),
                Some(material_name),
                Some(mass),
                Some(processing_goal),
                Some(optimization_goal),
                Some(moisture),
                Some(num_trials),
            ) if violations.is_empty() => Ok(Self {
                user_type,
                category,
                material_name,
                mass,
                processing_goal,
                optimization_goal,
                activation: state.activation.clone(),
                composite: state.composite.clone(),
                moisture,
                num_trials,
            }),
            _ => Err(PayloadValidationError { violations }),
        }
    }
}

fn require<T>(value: Option<T>, field: &str, violations: &mut Vec<ValidationError>) -> Option<T> {
    if value.is_none() {
        violations.push(ValidationError::empty_field(field));
    }
    value
}
