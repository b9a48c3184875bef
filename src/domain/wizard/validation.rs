//! Per-step input validation.
//!
//! Raw user text is parsed into an [`Answer`] before anything is mutated.
//! A rejection carries the re-prompt shown to the user; the step and the
//! accumulated state stay exactly as they were.

use thiserror::Error;

use super::choices::{
    ActivationAgent, ActivationMethod, CompositeStrategy, MaterialCategory, OptimizationGoal,
    ProcessingGoal, UserType, YesNo,
};
use super::step::{Step, CUSTOM_MATERIAL_OPTION};

const SELECT_OPTION: &str = "Please select one of the provided options.";
const MOISTURE_RANGE: &str = "Please enter a valid number between 0 and 1.";
const POSITIVE_NUMBER: &str = "Please enter a valid positive number.";
const POSITIVE_INTEGER: &str = "Please enter a valid positive integer.";
const MATERIAL_NAME: &str = "Please enter a material name.";
const NO_INPUT_EXPECTED: &str = "This experiment is already complete.";

/// A validated answer for one step.
#[derive(Debug, Clone, PartialEq)]
pub enum Answer {
    UserType(UserType),
    MoistureKnown(bool),
    Moisture(f64),
    Category(MaterialCategory),
    Material(MaterialChoice),
    CustomMaterial(String),
    Mass(f64),
    ProcessingGoal(ProcessingGoal),
    OptimizationGoal(OptimizationGoal),
    ActivationMethod(ActivationMethod),
    ActivationAgent(ActivationAgent),
    ConcentrationKnown(bool),
    Concentration(f64),
    CompositeStrategy(CompositeStrategy),
    NumTrials(u32),
}

/// Answer to the material step.
#[derive(Debug, Clone, PartialEq)]
pub enum MaterialChoice {
    Named(String),
    /// The "Other" sentinel: the name is asked for next.
    Other,
}

/// Input that does not satisfy the current step.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct InputRejection {
    pub step: Step,
    pub message: &'static str,
}

impl InputRejection {
    fn new(step: Step, message: &'static str) -> Self {
        Self { step, message }
    }
}

/// Validates raw input for `step`. Choices and numbers are matched on the
/// trimmed input; free-text names keep the raw text.
pub fn validate(step: Step, raw: &str) -> Result<Answer, InputRejection> {
    let input = raw.trim();
    let reject = |message| InputRejection::new(step, message);

    match step {
        Step::UserType => UserType::from_answer(input)
            .map(Answer::UserType)
            .ok_or_else(|| reject(SELECT_OPTION)),
        Step::MoistureKnown => YesNo::from_label(input)
            .map(|a| Answer::MoistureKnown(a.is_yes()))
            .ok_or_else(|| reject(SELECT_OPTION)),
        Step::MoistureValue => parse_number(input)
            .filter(|m| (0.0..=1.0).contains(m))
            .map(Answer::Moisture)
            .ok_or_else(|| reject(MOISTURE_RANGE)),
        Step::Category => MaterialCategory::from_label(input)
            .map(Answer::Category)
            .ok_or_else(|| reject(SELECT_OPTION)),
        Step::Material => {
            if input.is_empty() {
                Err(reject(MATERIAL_NAME))
            } else if input.eq_ignore_ascii_case(CUSTOM_MATERIAL_OPTION) {
                Ok(Answer::Material(MaterialChoice::Other))
            } else {
                Ok(Answer::Material(MaterialChoice::Named(raw.to_string())))
            }
        }
        Step::MaterialCustom => {
            if input.is_empty() {
                Err(reject(MATERIAL_NAME))
            } else {
                Ok(Answer::CustomMaterial(raw.to_string()))
            }
        }
        Step::Mass => parse_number(input)
            .filter(|m| *m > 0.0)
            .map(Answer::Mass)
            .ok_or_else(|| reject(POSITIVE_NUMBER)),
        Step::ProcessingGoal => ProcessingGoal::from_label(input)
            .map(Answer::ProcessingGoal)
            .ok_or_else(|| reject(SELECT_OPTION)),
        Step::OptimizationGoal => OptimizationGoal::from_label(input)
            .map(Answer::OptimizationGoal)
            .ok_or_else(|| reject(SELECT_OPTION)),
        Step::ActivationMethod => ActivationMethod::from_label(input)
            .map(Answer::ActivationMethod)
            .ok_or_else(|| reject(SELECT_OPTION)),
        Step::ActivationAgent => ActivationAgent::from_label(input)
            .map(Answer::ActivationAgent)
            .ok_or_else(|| reject(SELECT_OPTION)),
        Step::ConcentrationKnown => YesNo::from_label(input)
            .map(|a| Answer::ConcentrationKnown(a.is_yes()))
            .ok_or_else(|| reject(SELECT_OPTION)),
        Step::ConcentrationValue => parse_number(input)
            .filter(|c| *c > 0.0)
            .map(Answer::Concentration)
            .ok_or_else(|| reject(POSITIVE_NUMBER)),
        Step::CompositeStrategy => CompositeStrategy::from_label(input)
            .map(Answer::CompositeStrategy)
            .ok_or_else(|| reject(SELECT_OPTION)),
        Step::NumTrials => input
            .parse::<u32>()
            .ok()
            .filter(|n| *n > 0)
            .map(Answer::NumTrials)
            .ok_or_else(|| reject(POSITIVE_INTEGER)),
        Step::Complete => Err(reject(NO_INPUT_EXPECTED)),
    }
}

fn parse_number(input: &str) -> Option<f64> {
    input.parse::<f64>().ok().filter(|v| v.is_finite())
}
