//! Step graph for the experiment wizard.
//!
//! All branch policy lives in [`next_step`]. It is evaluated on the state
//! *after* the current answer has been merged, so every branch is a pure
//! function of the accumulated answers.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::state::AccumulatedState;
use super::choices::ActivationMethod;

/// Highest progress index, shown once the wizard reaches `Complete`.
pub const MAX_STEP_INDEX: u8 = 10;

/// Label of the material option that leads to free-text entry.
pub const CUSTOM_MATERIAL_OPTION: &str = "Other";

/// One node of the conversation graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    UserType,
    MoistureKnown,
    MoistureValue,
    Category,
    Material,
    MaterialCustom,
    Mass,
    ProcessingGoal,
    OptimizationGoal,
    ActivationMethod,
    ActivationAgent,
    ConcentrationKnown,
    ConcentrationValue,
    CompositeStrategy,
    NumTrials,
    Complete,
}

impl Step {
    /// Every step, data-collection steps first and `Complete` last.
    pub fn all() -> &'static [Step] {
        &[
            Step::UserType,
            Step::MoistureKnown,
            Step::MoistureValue,
            Step::Category,
            Step::Material,
            Step::MaterialCustom,
            Step::Mass,
            Step::ProcessingGoal,
            Step::OptimizationGoal,
            Step::ActivationMethod,
            Step::ActivationAgent,
            Step::ConcentrationKnown,
            Step::ConcentrationValue,
            Step::CompositeStrategy,
            Step::NumTrials,
            Step::Complete,
        ]
    }

    /// The step every session starts on.
    pub fn initial() -> Step {
        Step::UserType
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Step::Complete)
    }

    /// Snake-case name, matching the serialized form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Step::UserType => "user_type",
            Step::MoistureKnown => "moisture_known",
            Step::MoistureValue => "moisture_value",
            Step::Category => "category",
            Step::Material => "material",
            Step::MaterialCustom => "material_custom",
            Step::Mass => "mass",
            Step::ProcessingGoal => "processing_goal",
            Step::OptimizationGoal => "optimization_goal",
            Step::ActivationMethod => "activation_method",
            Step::ActivationAgent => "activation_agent",
            Step::ConcentrationKnown => "concentration_known",
            Step::ConcentrationValue => "concentration_value",
            Step::CompositeStrategy => "composite_strategy",
            Step::NumTrials => "num_trials",
            Step::Complete => "complete",
        }
    }

    /// Assistant prompt shown when this step becomes current.
    pub fn prompt(&self) -> &'static str {
        match self {
            Step::UserType => "Welcome to Quantum-Morph AI Lab.\n\nWho are you?",
            Step::MoistureKnown => "Do you know the moisture content?",
            Step::MoistureValue => "Enter moisture content (value between 0 and 1):",
            Step::Category => "Select material category:",
            Step::Material => "Select material:",
            Step::MaterialCustom => "Enter custom material name:",
            Step::Mass => "Enter sample mass (grams):",
            Step::ProcessingGoal => "Select processing target:",
            Step::OptimizationGoal => "Select optimization objective:",
            Step::ActivationMethod => "Select activation method:",
            Step::ActivationAgent => "Select activation agent:",
            Step::ConcentrationKnown => "Do you know the concentration?",
            Step::ConcentrationValue => "Enter concentration value:",
            Step::CompositeStrategy => "Select composite strategy:",
            Step::NumTrials => "Enter number of virtual experiments (num_trials):",
            Step::Complete => "Processing your request and generating optimal recipe...",
        }
    }

    /// Selectable option labels, in display order. `None` for free input.
    pub fn options(&self) -> Option<&'static [&'static str]> {
        match self {
            Step::UserType => Some(&[
                "Researcher / Scientist",
                "Industrial User (Factory)",
                "Student / Learning Mode",
            ]),
            Step::MoistureKnown | Step::ConcentrationKnown => Some(&["Yes", "No"]),
            Step::Category => Some(&["agricultural", "biomass", "plastic", "mixed"]),
            Step::Material => Some(&["Rice Straw", "Date Palm Seeds", CUSTOM_MATERIAL_OPTION]),
            Step::ProcessingGoal => Some(&["raw_biochar", "activated_carbon", "composite_filter"]),
            Step::OptimizationGoal => Some(&["max_co2", "balanced", "max_stability"]),
            Step::ActivationMethod => Some(&["chemical", "physical"]),
            Step::ActivationAgent => Some(&["HCl", "KOH", "H3PO4"]),
            Step::CompositeStrategy => Some(&["manual", "auto"]),
            Step::MoistureValue
            | Step::MaterialCustom
            | Step::Mass
            | Step::ConcentrationValue
            | Step::NumTrials
            | Step::Complete => None,
        }
    }

    /// Display-only progress slot for this step (0..=MAX_STEP_INDEX).
    ///
    /// Branches share slots, so the sequence seen by a user can skip values.
    pub fn progress_index(&self) -> u8 {
        match self {
            Step::UserType => 0,
            Step::MoistureKnown => 1,
            Step::MoistureValue | Step::Category => 2,
            Step::Material | Step::MaterialCustom => 3,
            Step::Mass => 4,
            Step::ProcessingGoal => 5,
            Step::OptimizationGoal => 6,
            Step::ActivationMethod | Step::ActivationAgent => 7,
            Step::ConcentrationKnown | Step::ConcentrationValue => 8,
            Step::CompositeStrategy | Step::NumTrials => 9,
            Step::Complete => MAX_STEP_INDEX,
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Successor of `current` given the state after its answer was merged.
pub fn next_step(current: Step, state: &AccumulatedState) -> Step {
    match current {
        Step::UserType => Step::MoistureKnown,
        Step::MoistureKnown => {
            if state.knows_moisture == Some(true) {
                Step::MoistureValue
            } else {
                Step::Category
            }
        }
        Step::MoistureValue => Step::Category,
        Step::Category => Step::Material,
        Step::Material => {
            if state.material_name.is_some() {
                Step::Mass
            } else {
                Step::MaterialCustom
            }
        }
        Step::MaterialCustom => Step::Mass,
        Step::Mass => Step::ProcessingGoal,
        Step::ProcessingGoal => Step::OptimizationGoal,
        Step::OptimizationGoal => {
            if state.processing_goal.is_some_and(|g| g.requires_activation()) {
                Step::ActivationMethod
            } else {
                Step::NumTrials
            }
        }
        Step::ActivationMethod => match state.activation.as_ref().map(|a| a.method) {
            Some(ActivationMethod::Chemical) => Step::ActivationAgent,
            _ => after_activation(state),
        },
        Step::ActivationAgent => Step::ConcentrationKnown,
        Step::ConcentrationKnown => {
            if state.concentration_is_auto() {
                after_activation(state)
            } else {
                Step::ConcentrationValue
            }
        }
        Step::ConcentrationValue => after_activation(state),
        Step::CompositeStrategy => Step::NumTrials,
        Step::NumTrials | Step::Complete => Step::Complete,
    }
}

fn after_activation(state: &AccumulatedState) -> Step {
    if state.processing_goal.is_some_and(|g| g.is_composite()) {
        Step::CompositeStrategy
    } else {
        Step::NumTrials
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::wizard::choices::ProcessingGoal;
    use crate::domain::wizard::state::{Activation, Concentration};

    fn with_goal(goal: ProcessingGoal) -> AccumulatedState {
        AccumulatedState {
            processing_goal: Some(goal),
            ..Default::default()
        }
    }

    #[test]
    fn raw_biochar_skips_activation() {
        let state = with_goal(ProcessingGoal::RawBiochar);
        assert_eq!(next_step(Step::OptimizationGoal, &state), Step::NumTrials);
    }

    #[test]
    fn activated_goals_visit_activation() {
        for goal in [ProcessingGoal::ActivatedCarbon, ProcessingGoal::CompositeFilter] {
            assert_eq!(
                next_step(Step::OptimizationGoal, &with_goal(goal)),
                Step::ActivationMethod
            );
        }
    }

    #[test]
    fn physical_activation_goes_to_composite_only_for_filters() {
        let mut state = with_goal(ProcessingGoal::CompositeFilter);
        state.activation = Some(Activation::new(ActivationMethod::Physical));
        assert_eq!(next_step(Step::ActivationMethod, &state), Step::CompositeStrategy);

        state.processing_goal = Some(ProcessingGoal::ActivatedCarbon);
        assert_eq!(next_step(Step::ActivationMethod, &state), Step::NumTrials);
    }

    #[test]
    fn chemical_activation_asks_for_agent() {
        let mut state = with_goal(ProcessingGoal::ActivatedCarbon);
        state.activation = Some(Activation::new(ActivationMethod::Chemical));
        assert_eq!(next_step(Step::ActivationMethod, &state), Step::ActivationAgent);
        assert_eq!(next_step(Step::ActivationAgent, &state), Step::ConcentrationKnown);
    }

    #[test]
    fn concentration_known_branches_on_auto_marker() {
        let mut state = with_goal(ProcessingGoal::CompositeFilter);
        state.activation = Some(Activation::new(ActivationMethod::Chemical));
        assert_eq!(next_step(Step::ConcentrationKnown, &state), Step::ConcentrationValue);

        state.activation.as_mut().unwrap().concentration = Some(Concentration::Auto);
        assert_eq!(next_step(Step::ConcentrationKnown, &state), Step::CompositeStrategy);

        state.processing_goal = Some(ProcessingGoal::ActivatedCarbon);
        assert_eq!(next_step(Step::ConcentrationKnown, &state), Step::NumTrials);
    }

    #[test]
    fn moisture_and_material_branches() {
        let mut state = AccumulatedState {
            knows_moisture: Some(true),
            ..Default::default()
        };
        assert_eq!(next_step(Step::MoistureKnown, &state), Step::MoistureValue);
        state.knows_moisture = Some(false);
        assert_eq!(next_step(Step::MoistureKnown, &state), Step::Category);

        assert_eq!(next_step(Step::Material, &state), Step::MaterialCustom);
        state.material_name = Some("Rice Straw".to_string());
        assert_eq!(next_step(Step::Material, &state), Step::Mass);
    }

    #[test]
    fn num_trials_is_last_data_step() {
        assert_eq!(next_step(Step::NumTrials, &AccumulatedState::default()), Step::Complete);
        assert!(Step::Complete.is_terminal());
        assert!(!Step::NumTrials.is_terminal());
    }

    #[test]
    fn progress_indices_stay_within_bounds() {
        for step in Step::all() {
            assert!(step.progress_index() <= MAX_STEP_INDEX);
        }
        assert_eq!(Step::UserType.progress_index(), 0);
        assert_eq!(Step::Complete.progress_index(), MAX_STEP_INDEX);
    }

    #[test]
    fn there_are_fifteen_data_steps() {
        let data_steps = Step::all().iter().filter(|s| !s.is_terminal()).count();
        assert_eq!(data_steps, 15);
    }

    #[test]
    fn as_str_matches_serde_name() {
        for step in Step::all() {
            let json = serde_json::to_string(step).unwrap();
            assert_eq!(json, format!("\"{}\"", step.as_str()));
        }
    }
}
