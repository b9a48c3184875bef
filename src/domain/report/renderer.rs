//! Plain-text scientific report.
//!
//! Total over any subset of fields: a missing section is either skipped or
//! rendered with an explicit placeholder, never an error.

use serde_json::Value;

use super::payload::{
    ActivationPlan, Components, CompositeFormation, MaterialSection, PerformanceSection,
    ProcessPlan, Quantity, ResultPayload, RiskSection,
};

pub const REPORT_TITLE: &str = "SCIENTIFIC ANALYSIS REPORT";

const TRADE_OFF_NOTE: &str = "The optimization algorithm balances the trade-off between CO₂ adsorption capacity and structural stability to achieve the specified objective while maintaining material integrity.";

const DISCLAIMER: [&str; 4] = [
    "These results represent model-based predictions generated using quantum-inspired",
    "optimization techniques. The process parameters have been optimized based on",
    "computational models and should be validated through experimental trials before",
    "implementation at scale.",
];

const NOT_AVAILABLE: &str = "N/A";

/// Renders the report for a raw result document.
pub fn render(result: &Value) -> String {
    render_payload(&ResultPayload::from_value(result))
}

/// Renders the report for an already-parsed payload.
pub fn render_payload(payload: &ResultPayload) -> String {
    let mut out = Report::default();

    out.line(REPORT_TITLE);
    out.heavy_rule();
    out.blank();

    material(&mut out, payload.material.as_ref());

    out.line("PROCESS DESIGN");
    out.light_rule();
    if let Some(plan) = &payload.process_plan {
        process_plan(&mut out, plan);
    }

    out.line("PREDICTED PERFORMANCE");
    out.light_rule();
    if let Some(perf) = &payload.predicted_performance {
        performance(&mut out, perf);
    }

    out.line("RISK ASSESSMENT");
    out.light_rule();
    if let Some(risk) = &payload.risk_assessment {
        risk_assessment(&mut out, risk);
    }

    if let Some(explanation) = non_empty(&payload.scientific_explanation) {
        out.line("SCIENTIFIC RATIONALE");
        out.light_rule();
        out.line(explanation);
        let both_scores = payload.predicted_performance.as_ref().is_some_and(|p| {
            p.co2_adsorption_score.is_some() && p.stability_score.is_some()
        });
        if both_scores {
            out.blank();
            out.line(TRADE_OFF_NOTE);
        }
        out.blank();
    }

    out.heavy_rule();
    out.line("FINAL NOTE");
    out.light_rule();
    for line in DISCLAIMER {
        out.line(line);
    }

    out.finish()
}

fn material(out: &mut Report, material: Option<&MaterialSection>) {
    let name = material.and_then(|m| non_empty(&m.name)).unwrap_or(NOT_AVAILABLE);
    let category = material
        .and_then(|m| non_empty(&m.category))
        .unwrap_or(NOT_AVAILABLE);
    let mass = material
        .and_then(|m| m.input_mass_g.as_ref().or(m.mass.as_ref()))
        .map(|q| format!("{} g", q))
        .unwrap_or_else(|| NOT_AVAILABLE.to_string());
    let moisture = material
        .and_then(|m| m.moisture)
        .map(|m| format!("{:.1}%", m * 100.0))
        .unwrap_or_else(|| NOT_AVAILABLE.to_string());

    out.line("MATERIAL SPECIFICATION");
    out.line(format!("Material: {}", name));
    out.line(format!("Category: {}", category));
    out.line(format!("Input Mass: {}", mass));
    out.line(format!("Moisture Content: {}", moisture));
    out.blank();
}

fn process_plan(out: &mut Report, plan: &ProcessPlan) {
    if let Some(pyro) = &plan.pyrolysis {
        out.line("Pyrolysis Conditions:");
        out.bullet_opt("Temperature", pyro.temperature_celsius.as_ref(), "°C");
        out.bullet_opt("Duration", pyro.duration_hours.as_ref(), " hours");
        out.bullet_opt("Heating Rate", pyro.heating_rate.as_ref(), "°C/min");
        if let Some(atmosphere) = non_empty(&pyro.atmosphere) {
            out.bullet("Atmosphere", atmosphere);
        }
        out.blank();
    }

    match &plan.activation {
        Some(activation) => activation_block(out, activation),
        None => {
            out.line("Activation Process:");
            out.bullet("Status", "Disabled");
            out.blank();
        }
    }

    if let Some(washing) = &plan.washing {
        out.line("Washing Step:");
        if let Some(enabled) = washing.enabled {
            out.bullet("Status", if enabled { "Enabled" } else { "Disabled" });
        }
        if let Some(method) = non_empty(&washing.method) {
            out.bullet("Method", method);
        }
        out.blank();
    }

    if let Some(drying) = &plan.drying {
        out.line("Drying Conditions:");
        out.bullet_opt("Temperature", drying.temperature_celsius.as_ref(), "°C");
        out.bullet_opt("Duration", drying.duration_hours.as_ref(), " hours");
        out.blank();
    }

    if let Some(composite) = &plan.composite_formation {
        if composite.enabled == Some(true) {
            composite_block(out, composite);
        }
    }
}

fn activation_block(out: &mut Report, act: &ActivationPlan) {
    out.line("Activation Process:");
    out.bullet("Status", "Enabled");
    if let Some(kind) = non_empty(&act.kind) {
        out.bullet("Method", kind);
    }
    if let Some(agent) = non_empty(&act.agent) {
        out.bullet("Agent", agent);
    }
    if let Some(concentration) = &act.concentration {
        let unit = if concentration.is_number() { " % w/v" } else { "" };
        out.bullet("Concentration", format!("{}{}", concentration, unit));
    }
    out.bullet_opt("Solution Volume", act.solution_volume_ml.as_ref(), " mL");
    out.bullet_opt("Chemical Mass", act.chemical_mass_g.as_ref(), " g");
    out.bullet_opt("Soaking Time", act.soaking_time_hours.as_ref(), " hours");
    out.bullet_opt("Activation Temperature", act.temperature.as_ref(), "°C");
    out.bullet_opt("Activation Duration", act.duration.as_ref(), " minutes");
    out.bullet_opt("Acid Mass", act.acid_mass_g.as_ref(), " g");
    out.blank();
}

fn composite_block(out: &mut Report, composite: &CompositeFormation) {
    out.line("COMPOSITE FORMATION");
    out.light_rule();

    if let Some(fractions) = &composite.fractions {
        out.line("Composite Composition:");
        components(out, fractions, |label, v| {
            (format!("{} Fraction", label), format!("{:.1}%", v * 100.0))
        });
        out.blank();
    }

    if let Some(masses) = &composite.masses_g {
        out.line("Component Mass Distribution:");
        components(out, masses, |label, v| (label.to_string(), format!("{:.2} g", v)));
        out.blank();
    }
}

fn components(out: &mut Report, parts: &Components, fmt: impl Fn(&str, f64) -> (String, String)) {
    for (label, value) in [
        ("Biochar", parts.biochar),
        ("Binder", parts.binder),
        ("Plasticizer", parts.plasticizer),
    ] {
        if let Some(v) = value {
            let (label, text) = fmt(label, v);
            out.bullet(&label, text);
        }
    }
}

fn performance(out: &mut Report, perf: &PerformanceSection) {
    if let Some(score) = perf.co2_adsorption_score {
        out.line(format!("CO₂ Adsorption Score: {:.2}", score));
    }
    if let Some(score) = perf.stability_score {
        out.line(format!("Structural Stability Score: {:.2}", score));
    }
    if let Some(regime) = non_empty(&perf.structural_regime) {
        out.line(format!("Structural Regime: {}", regime));
    }
    if let Some(confidence) = perf.confidence {
        out.line(format!("Model Confidence: {:.1}%", confidence * 100.0));
    }
    out.blank();
}

fn risk_assessment(out: &mut Report, risk: &RiskSection) {
    if let Some(level) = non_empty(&risk.overall_risk) {
        out.line(format!("Overall Risk Level: {}", level));
    }
    if let Some(step) = non_empty(&risk.most_sensitive_step) {
        out.line(format!("Most Sensitive Process Step: {}", step));
    }
    if let Some(recommendation) = non_empty(&risk.recommendation) {
        out.blank();
        out.line("Recommendation:");
        out.line(recommendation);
    }
    out.blank();
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

#[derive(Default)]
struct Report {
    lines: Vec<String>,
}

impl Report {
    fn line(&mut self, text: impl Into<String>) {
        self.lines.push(text.into());
    }

    fn blank(&mut self) {
        self.lines.push(String::new());
    }

    fn heavy_rule(&mut self) {
        self.lines.push("═".repeat(50));
    }

    fn light_rule(&mut self) {
        self.lines.push("─".repeat(50));
    }

    fn bullet(&mut self, label: &str, value: impl std::fmt::Display) {
        self.lines.push(format!("  • {}: {}", label, value));
    }

    fn bullet_opt(&mut self, label: &str, value: Option<&Quantity>, unit: &str) {
        if let Some(value) = value {
            self.lines.push(format!("  • {}: {}{}", label, value, unit));
        }
    }

    fn finish(self) -> String {
        self.lines.join("\n")
    }
}
