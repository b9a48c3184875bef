//! Accumulated answers collected across the wizard.
//!
//! Every field stays `None` until the step that owns it has been
//! validated. Merging an answer never touches unrelated fields.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::choices::{
    ActivationAgent, ActivationMethod, CompositeStrategy, MaterialCategory, OptimizationGoal,
    ProcessingGoal, UserType,
};
use super::validation::{Answer, MaterialChoice};

/// Moisture assumed when the user does not know it.
pub const DEFAULT_MOISTURE: f64 = 0.3;

/// The growing record of answers for one session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccumulatedState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_type: Option<UserType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub knows_moisture: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub moisture: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<MaterialCategory>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub material_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mass: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processing_goal: Option<ProcessingGoal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub optimization_goal: Option<OptimizationGoal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activation: Option<Activation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub composite: Option<Composite>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_trials: Option<u32>,
}

/// Activation stage settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activation {
    #[serde(rename = "type")]
    pub method: ActivationMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent: Option<ActivationAgent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub concentration: Option<Concentration>,
}

impl Activation {
    pub fn new(method: ActivationMethod) -> Self {
        Self {
            method,
            agent: None,
            concentration: None,
        }
    }
}

/// Agent concentration: either a user-supplied value or left to the optimizer.
///
/// Serialized as a bare number or the string `"auto"`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Concentration {
    Value(f64),
    Auto,
}

impl Serialize for Concentration {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Concentration::Value(v) => serializer.serialize_f64(*v),
            Concentration::Auto => serializer.serialize_str("auto"),
        }
    }
}

impl<'de> Deserialize<'de> for Concentration {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(f64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(v) => Ok(Concentration::Value(v)),
            Raw::Text(s) if s.eq_ignore_ascii_case("auto") => Ok(Concentration::Auto),
            Raw::Text(s) => Err(serde::de::Error::custom(format!(
                "invalid concentration '{}'",
                s
            ))),
        }
    }
}

/// Composite filter settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Composite {
    pub strategy: CompositeStrategy,
}

impl AccumulatedState {
    /// Returns a copy of this state with the validated answer merged in.
    pub fn apply(&self, answer: &Answer) -> AccumulatedState {
        let mut next = self.clone();
        match answer {
            Answer::UserType(user_type) => next.user_type = Some(*user_type),
            Answer::MoistureKnown(known) => {
                next.knows_moisture = Some(*known);
                if !known {
                    next.moisture = Some(DEFAULT_MOISTURE);
                }
            }
            Answer::Moisture(moisture) => next.moisture = Some(*moisture),
            Answer::Category(category) => next.category = Some(*category),
            Answer::Material(MaterialChoice::Named(name)) => next.material_name = Some(name.clone()),
            Answer::Material(MaterialChoice::Other) => next.material_name = None,
            Answer::CustomMaterial(name) => next.material_name = Some(name.clone()),
            Answer::Mass(mass) => next.mass = Some(*mass),
            Answer::ProcessingGoal(goal) => next.processing_goal = Some(*goal),
            Answer::OptimizationGoal(goal) => next.optimization_goal = Some(*goal),
            Answer::ActivationMethod(method) => next.activation = Some(Activation::new(*method)),
            Answer::ActivationAgent(agent) => {
                next.activation
                    .get_or_insert_with(|| Activation::new(ActivationMethod::Chemical))
                    .agent = Some(*agent);
            }
            Answer::ConcentrationKnown(known) => {
                let activation = next
                    .activation
                    .get_or_insert_with(|| Activation::new(ActivationMethod::Chemical));
                activation.concentration = if *known { None } else { Some(Concentration::Auto) };
            }
            Answer::Concentration(value) => {
                next.activation
                    .get_or_insert_with(|| Activation::new(ActivationMethod::Chemical))
                    .concentration = Some(Concentration::Value(*value));
            }
            Answer::CompositeStrategy(strategy) => {
                next.composite = Some(Composite {
                    strategy: *strategy,
                })
            }
            Answer::NumTrials(trials) => next.num_trials = Some(*trials),
        }
        next
    }

    /// True once the user has declined to give a concentration.
    pub fn concentration_is_auto(&self) -> bool {
        matches!(
            self.activation.as_ref().and_then(|a| a.concentration),
            Some(Concentration::Auto)
        )
    }
}
