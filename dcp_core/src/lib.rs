//! # dcp_core - 3D Concrete Printing Cost Engine
//!
//! `dcp_core` estimates what it costs to print the walls of a home with a
//! 3D concrete printer. Given a printer, a material and a set of project
//! assumptions it produces a deterministic per-home and per-project breakdown
//! that separates cash costs from accrual (depreciation-inclusive) costs.
//! All inputs and outputs are JSON-serializable.
//!
//! ## Design Philosophy
//!
//! - **Stateless**: Pure functions that take input and return results
//! - **JSON-First**: All types implement Serialize/Deserialize
//! - **Total**: The engine clamps degenerate input and reports risk as warnings
//! - **Canonical units**: Feet, millimeters, lb/ft³, short tons and USD
//!   internally; unit systems are display projections only
//!
//! ## Quick Start
//!
//! ```rust
//! use dcp_core::calculations::{calculate_costs, CostInputs, CostOverrides, ProjectAssumptions};
//! use dcp_core::catalog::Catalog;
//!
//! let catalog = Catalog::builtin();
//! let overrides = CostOverrides {
//!     num_homes: Some(20),
//!     ..Default::default()
//! };
//! let inputs = CostInputs::from_catalog(
//!     catalog,
//!     "COBOD BOD2",
//!     "Local Concrete + D.fab",
//!     &ProjectAssumptions::default(),
//!     &overrides,
//! );
//! let result = calculate_costs(&inputs, false);
//!
//! let json = serde_json::to_string_pretty(&result).unwrap();
//! assert!(json.contains("accrual_total_per_home"));
//! ```
//!
//! ## Modules
//!
//! - [`calculations`] - Cost engine, P&L, market benchmark, scenario comparison
//! - [`catalog`] - Printer and material reference data
//! - [`finance`] - Loan payments and printer acquisition modes
//! - [`units`] - Type-safe unit wrappers and display projections
//! - [`report`] - Text summaries and CSV tables
//! - [`errors`] - Structured error types

pub mod calculations;
pub mod catalog;
pub mod errors;
pub mod finance;
pub mod report;
pub mod units;

/// Catalog tables compiled from `data/*.toml` by the build script
pub(crate) mod generated {
    include!(concat!(env!("OUT_DIR"), "/generated.rs"));
}

// Re-export commonly used types at crate root for convenience
pub use calculations::{
    build_pnl, calculate_costs, compare_scenarios, compare_to_market, CostInputs, CostOverrides,
    CostResult, ProjectAssumptions,
};
pub use catalog::{Catalog, MaterialSpec, PrinterSpec};
pub use errors::{CalcError, CalcResult};
pub use finance::{monthly_payment, AcquisitionMode};
pub use units::UnitSystem;
