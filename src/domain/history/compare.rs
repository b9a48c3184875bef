//! Side-by-side comparison of two saved experiments.
//!
//! Result fields are read null-safely: a missing or null path shows as
//! "N/A". Each experiment gets a single score,
//! `co2 + confidence * 10 - risk * 2`, and the higher one is recommended.

use serde_json::Value;
use std::fmt;

use super::ExperimentRecord;

const NOT_AVAILABLE: &str = "N/A";

/// Which experiment a row favours.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    A,
    B,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recommendation {
    A,
    B,
    Equal,
}

impl Recommendation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Recommendation::A => "Experiment A",
            Recommendation::B => "Experiment B",
            Recommendation::Equal => "Equal",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonRow {
    pub label: &'static str,
    pub value_a: String,
    pub value_b: String,
    /// `None` when the row is informational or the values tie.
    pub better: Option<Side>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    pub rows: Vec<ComparisonRow>,
    pub score_a: f64,
    pub score_b: f64,
    pub recommendation: Recommendation,
}

/// Risk bucket: low 1, medium or moderate 2, high 3. Anything else,
/// including a missing value, counts as medium.
pub fn risk_score(risk: &str) -> u8 {
    let risk = risk.to_lowercase();
    if risk.contains("low") {
        1
    } else if risk.contains("medium") || risk.contains("moderate") {
        2
    } else if risk.contains("high") {
        3
    } else {
        2
    }
}

/// Compares experiment `a` against experiment `b`.
pub fn compare(a: &ExperimentRecord, b: &ExperimentRecord) -> Comparison {
    let side_a = Figures::of(a);
    let side_b = Figures::of(b);
    let score_a = side_a.score();
    let score_b = side_b.score();

    let rows = vec![
        informational("Material Name", &a.material_name, &b.material_name),
        informational("Category", &a.category, &b.category),
        informational(
            "Optimization Goal",
            &a.optimization_goal,
            &b.optimization_goal,
        ),
        informational(
            "Pyrolysis Temperature (°C)",
            &display(a, "process_plan.pyrolysis.temperature_celsius", NOT_AVAILABLE),
            &display(b, "process_plan.pyrolysis.temperature_celsius", NOT_AVAILABLE),
        ),
        informational(
            "Pyrolysis Duration (hours)",
            &display(a, "process_plan.pyrolysis.duration_hours", NOT_AVAILABLE),
            &display(b, "process_plan.pyrolysis.duration_hours", NOT_AVAILABLE),
        ),
        informational(
            "Activation Method",
            &display(a, "process_plan.activation.type", "None"),
            &display(b, "process_plan.activation.type", "None"),
        ),
        informational(
            "Activation Agent",
            &display(a, "process_plan.activation.agent", "-"),
            &display(b, "process_plan.activation.agent", "-"),
        ),
        ComparisonRow {
            label: "CO₂ Adsorption Score",
            value_a: format!("{:.2}", side_a.co2),
            value_b: format!("{:.2}", side_b.co2),
            better: higher(side_a.co2, side_b.co2),
        },
        ComparisonRow {
            label: "Model Confidence",
            value_a: percent(side_a.confidence),
            value_b: percent(side_b.confidence),
            better: match (side_a.confidence, side_b.confidence) {
                (Some(x), Some(y)) => higher(x, y),
                _ => None,
            },
        },
        ComparisonRow {
            label: "Risk Level",
            value_a: side_a.risk.clone(),
            value_b: side_b.risk.clone(),
            // lower risk wins
            better: higher(f64::from(side_b.risk_score), f64::from(side_a.risk_score)),
        },
    ];

    let recommendation = match higher(score_a, score_b) {
        Some(Side::A) => Recommendation::A,
        Some(Side::B) => Recommendation::B,
        None => Recommendation::Equal,
    };

    Comparison {
        rows,
        score_a,
        score_b,
        recommendation,
    }
}

struct Figures {
    co2: f64,
    confidence: Option<f64>,
    risk: String,
    risk_score: u8,
}

impl Figures {
    fn of(record: &ExperimentRecord) -> Self {
        let risk = display(record, "risk_assessment.overall_risk", NOT_AVAILABLE);
        Self {
            co2: record.co2_score.unwrap_or(0.0),
            confidence: extract(record, "predicted_performance.confidence").and_then(Value::as_f64),
            risk_score: risk_score(&risk),
            risk,
        }
    }

    fn score(&self) -> f64 {
        self.co2 + self.confidence.map_or(0.0, |c| c * 10.0) - f64::from(self.risk_score) * 2.0
    }
}

/// Walks a dotted path through the result. Null counts as missing.
fn extract<'a>(record: &'a ExperimentRecord, path: &str) -> Option<&'a Value> {
    path.split('.')
        .try_fold(&record.full_result_json, |value, part| value.get(part))
        .filter(|value| !value.is_null())
}

/// Text for a result field. `empty` stands in for an empty string and
/// "N/A" for a missing one.
fn display(record: &ExperimentRecord, path: &str, empty: &str) -> String {
    match extract(record, path) {
        None => NOT_AVAILABLE.to_string(),
        Some(Value::String(s)) if s.is_empty() => empty.to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

fn percent(confidence: Option<f64>) -> String {
    confidence
        .map(|c| format!("{:.1}%", c * 100.0))
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

fn higher(a: f64, b: f64) -> Option<Side> {
    if a > b {
        Some(Side::A)
    } else if b > a {
        Some(Side::B)
    } else {
        None
    }
}

fn informational(label: &'static str, a: &str, b: &str) -> ComparisonRow {
    ComparisonRow {
        label,
        value_a: a.to_string(),
        value_b: b.to_string(),
        better: None,
    }
}

impl fmt::Display for Comparison {
    /// Plain-text table; `*` marks the better value of a row.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mark = |row: &ComparisonRow, side: Side| if row.better == Some(side) { "*" } else { " " };

        writeln!(f, "{:<28} {:<24} {:<24}", "Parameter", "Experiment A", "Experiment B")?;
        for row in &self.rows {
            writeln!(
                f,
                "{:<28} {}{:<23} {}{:<23}",
                row.label,
                mark(row, Side::A),
                row.value_a,
                mark(row, Side::B),
                row.value_b
            )?;
        }
        writeln!(f)?;
        writeln!(f, "Score: A {:.2} | B {:.2}", self.score_a, self.score_b)?;
        write!(f, "Recommended: {}", self.recommendation.as_str())
    }
}
