//! Partial schema over the optimizer's result document.
//!
//! The optimizer's JSON is loosely typed. Every field at every level is
//! optional, and a value of an unexpected JSON type reads as absent rather
//! than failing the whole document.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::fmt;

fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

macro_rules! partial_section {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$fmeta:meta])* $field:ident : $ty:ty ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, Deserialize)]
        pub struct $name {
            $(
                $(#[$fmeta])*
                #[serde(default, deserialize_with = "lenient")]
                pub $field: Option<$ty>,
            )*
        }
    };
}

/// A displayed value the optimizer may send as a number or as text.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Quantity {
    Number(f64),
    Text(String),
}

impl Quantity {
    pub fn is_number(&self) -> bool {
        matches!(self, Quantity::Number(_))
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Quantity::Number(n) => write!(f, "{}", n),
            Quantity::Text(s) => f.write_str(s),
        }
    }
}

partial_section! {
    /// Top level of a completed job's result.
    ResultPayload {
        material: MaterialSection,
        process_plan: ProcessPlan,
        predicted_performance: PerformanceSection,
        risk_assessment: RiskSection,
        scientific_explanation: String,
    }
}

partial_section! {
    MaterialSection {
        name: String,
        category: String,
        input_mass_g: Quantity,
        /// Older optimizer builds report the mass under this name.
        mass: Quantity,
        moisture: f64,
    }
}

partial_section! {
    ProcessPlan {
        pyrolysis: Pyrolysis,
        activation: ActivationPlan,
        washing: Washing,
        drying: Drying,
        composite_formation: CompositeFormation,
    }
}

partial_section! {
    Pyrolysis {
        temperature_celsius: Quantity,
        duration_hours: Quantity,
        heating_rate: Quantity,
        atmosphere: String,
    }
}

partial_section! {
    ActivationPlan {
        #[serde(rename = "type")]
        kind: String,
        agent: String,
        concentration: Quantity,
        solution_volume_ml: Quantity,
        chemical_mass_g: Quantity,
        soaking_time_hours: Quantity,
        temperature: Quantity,
        duration: Quantity,
        acid_mass_g: Quantity,
    }
}

partial_section! {
    Washing {
        enabled: bool,
        method: String,
    }
}

partial_section! {
    Drying {
        temperature_celsius: Quantity,
        duration_hours: Quantity,
    }
}

partial_section! {
    CompositeFormation {
        enabled: bool,
        fractions: Components,
        masses_g: Components,
    }
}

partial_section! {
    /// Per-component breakdown of a composite filter.
    Components {
        biochar: f64,
        binder: f64,
        plasticizer: f64,
    }
}

partial_section! {
    PerformanceSection {
        co2_adsorption_score: f64,
        stability_score: f64,
        structural_regime: String,
        confidence: f64,
    }
}

partial_section! {
    RiskSection {
        overall_risk: String,
        most_sensitive_step: String,
        recommendation: String,
    }
}

impl ResultPayload {
    /// Reads whatever this schema recognizes from `value`.
    ///
    /// Never fails: a non-object document yields an empty payload.
    pub fn from_value(value: &Value) -> Self {
        serde_json::from_value(value.clone()).unwrap_or_default()
    }

    pub fn co2_score(&self) -> Option<f64> {
        self.predicted_performance
            .as_ref()
            .and_then(|p| p.co2_adsorption_score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_object_is_empty_payload() {
        assert_eq!(ResultPayload::from_value(&json!({})), ResultPayload::default());
    }

    #[test]
    fn non_object_documents_read_as_empty() {
        assert_eq!(ResultPayload::from_value(&json!([1, 2])), ResultPayload::default());
        assert_eq!(ResultPayload::from_value(&json!(null)), ResultPayload::default());
        assert_eq!(ResultPayload::from_value(&json!("done")), ResultPayload::default());
    }

    #[test]
    fn wrong_types_are_dropped_field_by_field() {
        let payload = ResultPayload::from_value(&json!({
            "material": {"name": 42, "category": "biomass", "moisture": "wet"},
            "predicted_performance": {"co2_adsorption_score": 3.5, "confidence": "high"},
            "risk_assessment": "low"
        }));

        let material = payload.material.unwrap();
        assert_eq!(material.name, None);
        assert_eq!(material.category.as_deref(), Some("biomass"));
        assert_eq!(material.moisture, None);

        let perf = payload.predicted_performance.unwrap();
        assert_eq!(perf.co2_adsorption_score, Some(3.5));
        assert_eq!(perf.confidence, None);

        assert_eq!(payload.risk_assessment, None);
    }

    #[test]
    fn quantities_accept_numbers_and_text() {
        let payload = ResultPayload::from_value(&json!({
            "process_plan": {"pyrolysis": {"temperature_celsius": 550, "heating_rate": "10-15"}}
        }));
        let pyro = payload.process_plan.unwrap().pyrolysis.unwrap();
        assert_eq!(pyro.temperature_celsius, Some(Quantity::Number(550.0)));
        assert_eq!(pyro.heating_rate, Some(Quantity::Text("10-15".to_string())));
        assert_eq!(Quantity::Number(550.0).to_string(), "550");
        assert_eq!(Quantity::Number(2.5).to_string(), "2.5");
    }

    #[test]
    fn activation_type_is_read_from_type_key() {
        let payload = ResultPayload::from_value(&json!({
            "process_plan": {"activation": {"type": "chemical", "agent": "KOH"}}
        }));
        let activation = payload.process_plan.unwrap().activation.unwrap();
        assert_eq!(activation.kind.as_deref(), Some("chemical"));
        assert_eq!(activation.agent.as_deref(), Some("KOH"));
    }

    #[test]
    fn co2_score_is_read_from_performance() {
        let payload = ResultPayload::from_value(&json!({
            "predicted_performance": {"co2_adsorption_score": 0.82}
        }));
        assert_eq!(payload.co2_score(), Some(0.82));
        assert_eq!(ResultPayload::default().co2_score(), None);
    }
}
