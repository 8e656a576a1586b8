//! # Cost Calculations
//!
//! Everything here follows the same pattern:
//!
//! - an input record (JSON-serializable, canonical units)
//! - a result record (JSON-serializable)
//! - a pure function from one to the other
//!
//! ## Available Calculations
//!
//! - [`inputs`] - Input assembly: catalog specs, project assumptions, overrides
//! - [`cost`] - The cost engine: geometry, time, material, labor, financing
//! - [`pnl`] - Two-column (cash vs accounting) per-home P&L
//! - [`benchmark`] - Printed cost versus a conventional build cost
//! - [`scenario`] - Side-by-side comparison of up to four scenarios

pub mod benchmark;
pub mod cost;
pub mod inputs;
pub mod pnl;
pub mod scenario;

// Re-export commonly used types
pub use benchmark::{compare_to_market, MarketComparison};
pub use cost::{calculate_costs, safe_div, AuditTrail, CostComponent, CostResult, CostWarning};
pub use inputs::{CostInputs, CostOverrides, ProjectAssumptions};
pub use pnl::{build_pnl, PnlLine, PnlLineKind, PnlMetrics, PnlStatement};
pub use scenario::{
    compare_scenarios, Cell, ChartPoint, Comparison, ComparisonMetric, ComparisonRow, Scenario,
    ScenarioSpec, MAX_SCENARIOS,
};
