//! Optimizer result documents and the text report derived from them.

mod payload;
mod renderer;

pub use payload::{
    ActivationPlan, Components, CompositeFormation, Drying, MaterialSection, PerformanceSection,
    ProcessPlan, Pyrolysis, Quantity, ResultPayload, RiskSection, Washing,
};
pub use renderer::{render, render_payload, REPORT_TITLE};
