//! Closed option sets offered by the wizard.
//!
//! Every enum carries its wire label (used both in the submission payload
//! and as the option text shown to the user) and parses answers
//! case-insensitively against that label.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Declares a closed choice enum with a wire label per variant.
///
/// Generates `ALL`, `as_str`, `from_label` and `Display`, and renames each
/// variant for serde so the label is also the JSON representation.
macro_rules! choice_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident => $label:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                $(#[$vmeta])*
                #[serde(rename = $label)]
                $variant,
            )+
        }

        impl $name {
            /// All variants in display order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// The wire label of this choice.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $label,)+
                }
            }

            /// Matches an answer against the labels, ignoring case and
            /// surrounding whitespace.
            pub fn from_label(input: &str) -> Option<Self> {
                let input = input.trim();
                Self::ALL
                    .iter()
                    .copied()
                    .find(|choice| choice.as_str().eq_ignore_ascii_case(input))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

choice_enum! {
    /// Who is driving the wizard.
    UserType {
        Researcher => "researcher",
        Industrial => "industrial",
        Student => "student",
    }
}

impl UserType {
    /// Keyword match used by the first step, where the displayed options
    /// are descriptive ("Researcher / Scientist") rather than wire labels.
    pub fn from_answer(input: &str) -> Option<Self> {
        let input = input.to_lowercase();
        if input.contains("researcher") || input.contains("scientist") {
            Some(UserType::Researcher)
        } else if input.contains("industrial") || input.contains("factory") {
            Some(UserType::Industrial)
        } else if input.contains("student") || input.contains("learning") {
            Some(UserType::Student)
        } else {
            None
        }
    }
}

choice_enum! {
    /// Feedstock family.
    MaterialCategory {
        Agricultural => "agricultural",
        Biomass => "biomass",
        Plastic => "plastic",
        Mixed => "mixed",
    }
}

choice_enum! {
    /// What the run should produce.
    ProcessingGoal {
        RawBiochar => "raw_biochar",
        ActivatedCarbon => "activated_carbon",
        CompositeFilter => "composite_filter",
    }
}

impl ProcessingGoal {
    /// Activated carbon and composite filters go through an activation stage.
    pub fn requires_activation(&self) -> bool {
        matches!(self, ProcessingGoal::ActivatedCarbon | ProcessingGoal::CompositeFilter)
    }

    pub fn is_composite(&self) -> bool {
        matches!(self, ProcessingGoal::CompositeFilter)
    }
}

choice_enum! {
    /// Objective handed to the optimizer.
    OptimizationGoal {
        MaxCo2 => "max_co2",
        Balanced => "balanced",
        MaxStability => "max_stability",
    }
}

choice_enum! {
    ActivationMethod {
        Chemical => "chemical",
        Physical => "physical",
    }
}

choice_enum! {
    /// Chemical activation agent.
    ActivationAgent {
        HCl => "HCl",
        Koh => "KOH",
        H3po4 => "H3PO4",
    }
}

choice_enum! {
    CompositeStrategy {
        Manual => "manual",
        Auto => "auto",
    }
}

choice_enum! {
    /// Answer to the yes/no questions.
    YesNo {
        Yes => "Yes",
        No => "No",
    }
}

impl YesNo {
    pub fn is_yes(&self) -> bool {
        matches!(self, YesNo::Yes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_match_case_insensitively() {
        assert_eq!(MaterialCategory::from_label("BIOMASS"), Some(MaterialCategory::Biomass));
        assert_eq!(ActivationAgent::from_label("koh"), Some(ActivationAgent::Koh));
        assert_eq!(ActivationAgent::from_label(" h3po4 "), Some(ActivationAgent::H3po4));
        assert_eq!(OptimizationGoal::from_label("Max_CO2"), Some(OptimizationGoal::MaxCo2));
    }

    #[test]
    fn unknown_labels_are_rejected() {
        assert_eq!(ProcessingGoal::from_label("graphene"), None);
        assert_eq!(YesNo::from_label("maybe"), None);
        assert_eq!(CompositeStrategy::from_label(""), None);
    }

    #[test]
    fn user_type_matches_keywords() {
        assert_eq!(UserType::from_answer("Researcher / Scientist"), Some(UserType::Researcher));
        assert_eq!(UserType::from_answer("Industrial User (Factory)"), Some(UserType::Industrial));
        assert_eq!(UserType::from_answer("Student / Learning Mode"), Some(UserType::Student));
        assert_eq!(UserType::from_answer("I run a factory"), Some(UserType::Industrial));
        assert_eq!(UserType::from_answer("hobbyist"), None);
    }

    #[test]
    fn serde_uses_wire_labels() {
        assert_eq!(serde_json::to_string(&OptimizationGoal::MaxCo2).unwrap(), "\"max_co2\"");
        assert_eq!(serde_json::to_string(&ActivationAgent::HCl).unwrap(), "\"HCl\"");
        let goal: ProcessingGoal = serde_json::from_str("\"composite_filter\"").unwrap();
        assert_eq!(goal, ProcessingGoal::CompositeFilter);
    }

    #[test]
    fn processing_goal_branch_helpers() {
        assert!(!ProcessingGoal::RawBiochar.requires_activation());
        assert!(ProcessingGoal::ActivatedCarbon.requires_activation());
        assert!(ProcessingGoal::CompositeFilter.requires_activation());
        assert!(ProcessingGoal::CompositeFilter.is_composite());
        assert!(!ProcessingGoal::ActivatedCarbon.is_composite());
    }
}
