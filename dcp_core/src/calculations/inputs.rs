//! # Cost Inputs
//!
//! The fully-populated parameter record the cost engine consumes, and the
//! defaults-then-overrides merge that builds it:
//!
//! ```text
//! PrinterSpec + MaterialSpec      (catalog defaults)
//!        + ProjectAssumptions     (project-wide defaults)
//!        + CostOverrides          (sparse, explicit user edits; always win)
//!        = CostInputs
//! ```
//!
//! Two fields are derived when not overridden: printer moves come from the
//! homes-per-move heuristic and the monthly payment from the loan terms.
//!
//! All values are canonical units (ft, ft², mm, mm/s, lb/ft³, USD/ton, USD).
//!
//! ## Example
//!
//! ```rust
//! use dcp_core::calculations::{CostInputs, CostOverrides, ProjectAssumptions};
//! use dcp_core::catalog;
//!
//! let printer = catalog::get_printer("WASP Crane");
//! let material = catalog::get_material("CyBe Mortar");
//! let overrides = CostOverrides {
//!     num_homes: Some(4),
//!     layer_height_mm: Some(18.0),
//!     ..Default::default()
//! };
//!
//! let inputs = CostInputs::assemble(&printer, &material, &ProjectAssumptions::default(), &overrides);
//! assert_eq!(inputs.layer_height_mm, 18.0);   // override wins over the catalog
//! assert_eq!(inputs.bead_width_mm, 40.0);     // catalog default
//! assert_eq!(inputs.printer_moves, 2);        // 4 homes / 2 homes per move
//! ```

use serde::{Deserialize, Serialize};

use crate::catalog::{Catalog, MaterialSpec, PrinterSpec};
use crate::errors::{CalcError, CalcResult};
use crate::finance::{monthly_payment, AcquisitionMode};

/// Input parameters for one cost computation.
///
/// ## JSON Example
///
/// ```json
/// {
///   "floor_area_sqft": 1500.0,
///   "wall_density": 0.2,
///   "wall_height_ft": 9.0,
///   "passes_per_layer": 2,
///   "layer_height_mm": 20.0,
///   "bead_width_mm": 50.0,
///   "print_speed_mm_s": 250.0,
///   "efficiency": 0.65,
///   "complexity_penalty": 0.0,
///   "num_homes": 1,
///   "printer_moves": 1,
///   "setup_days": 1.0,
///   "teardown_days": 1.0,
///   "crew_size": 3,
///   "material_price_per_ton": 70.0,
///   "waste_fraction": 0.1,
///   "density_pcf": 145.0,
///   "labor_rate_per_hr": 40.0,
///   "crane_rate_per_day": 1500.0,
///   "rebar_cost_per_ft": 0.0,
///   "misc_cost_per_wall_sqft": 0.0,
///   "overhead_per_home": 0.0,
///   "printer_price_usd": 580000.0,
///   "depreciation_years": 5.0,
///   "residual_fraction": 0.2,
///   "homes_per_year": 12.0,
///   "upfront_fraction": 1.0,
///   "acquisition_mode": "OwnedCash",
///   "monthly_payment": 0.0
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostInputs {
    // --- Geometry ---
    /// Conditioned floor area per home (ft²)
    pub floor_area_sqft: f64,
    /// Linear feet of printed wall per ft² of floor
    pub wall_density: f64,
    /// Printed wall height (ft)
    pub wall_height_ft: f64,
    /// Nozzle passes per layer (2 = double shell)
    pub passes_per_layer: u32,

    // --- Print resolution ---
    /// Layer height (mm)
    pub layer_height_mm: f64,
    /// Bead width (mm)
    pub bead_width_mm: f64,

    // --- Throughput ---
    /// Nominal nozzle travel speed (mm/s)
    pub print_speed_mm_s: f64,
    /// Overall equipment effectiveness, 0..=1
    pub efficiency: f64,
    /// Speed reduction for geometric complexity, 0..1 (0 = off)
    #[serde(default)]
    pub complexity_penalty: f64,

    // --- Project scale ---
    /// Homes in the project (≥ 1)
    pub num_homes: u32,
    /// Printer relocations over the project
    pub printer_moves: u32,

    // --- Mobilization ---
    /// Setup per move (days)
    pub setup_days: f64,
    /// Teardown per move (days)
    pub teardown_days: f64,
    /// Site crew size
    pub crew_size: u32,

    // --- Economics ---
    /// Material price (USD per short ton)
    pub material_price_per_ton: f64,
    /// Material waste fraction, 0..=1
    pub waste_fraction: f64,
    /// Dry density (lb/ft³)
    pub density_pcf: f64,
    /// Crew labor rate (USD/hr per person)
    pub labor_rate_per_hr: f64,
    /// Crane / logistics day rate (USD/day)
    pub crane_rate_per_day: f64,
    /// Reinforcement cost per linear ft of wall
    #[serde(default)]
    pub rebar_cost_per_ft: f64,
    /// Other integration scope per ft² of wall surface
    #[serde(default)]
    pub misc_cost_per_wall_sqft: f64,
    /// Company overhead allocated per home (used by the P&L)
    #[serde(default)]
    pub overhead_per_home: f64,

    // --- Printer acquisition ---
    /// Printer hardware price (USD)
    pub printer_price_usd: f64,
    /// Depreciation / amortization term (years)
    pub depreciation_years: f64,
    /// Residual value at end of term, fraction of price
    pub residual_fraction: f64,
    /// Homes printed per year (utilization)
    pub homes_per_year: f64,
    /// Fraction of the price paid in cash up front
    pub upfront_fraction: f64,
    /// Owned-cash, owned-financed or leased
    #[serde(default)]
    pub acquisition_mode: AcquisitionMode,
    /// Loan or lease payment (USD/month)
    #[serde(default)]
    pub monthly_payment: f64,
}

impl CostInputs {
    /// Merge catalog entries, project assumptions and explicit overrides.
    pub fn assemble(
        printer: &PrinterSpec,
        material: &MaterialSpec,
        assumptions: &ProjectAssumptions,
        overrides: &CostOverrides,
    ) -> Self {
        let a = assumptions;
        let o = overrides;

        let mut inputs = CostInputs {
            floor_area_sqft: o.floor_area_sqft.unwrap_or(a.floor_area_sqft),
            wall_density: o.wall_density.unwrap_or(a.wall_density),
            wall_height_ft: o.wall_height_ft.unwrap_or(a.wall_height_ft),
            passes_per_layer: o.passes_per_layer.unwrap_or(a.passes_per_layer),

            layer_height_mm: o.layer_height_mm.unwrap_or(printer.layer_height_mm),
            bead_width_mm: o.bead_width_mm.unwrap_or(printer.bead_width_mm),

            print_speed_mm_s: o.print_speed_mm_s.unwrap_or(printer.speed_mm_s),
            efficiency: o.efficiency.unwrap_or(printer.efficiency),
            complexity_penalty: o.complexity_penalty.unwrap_or(a.complexity_penalty),

            num_homes: o.num_homes.unwrap_or(a.num_homes),
            printer_moves: 0,

            setup_days: o.setup_days.unwrap_or(printer.setup_days),
            teardown_days: o.teardown_days.unwrap_or(printer.teardown_days),
            crew_size: o.crew_size.unwrap_or(printer.crew_size),

            material_price_per_ton: o.material_price_per_ton.unwrap_or(material.price_per_ton),
            waste_fraction: o.waste_fraction.unwrap_or(material.waste_fraction),
            density_pcf: o.density_pcf.unwrap_or(material.density_pcf),
            labor_rate_per_hr: o.labor_rate_per_hr.unwrap_or(a.labor_rate_per_hr),
            crane_rate_per_day: o.crane_rate_per_day.unwrap_or(a.crane_rate_per_day),
            rebar_cost_per_ft: o.rebar_cost_per_ft.unwrap_or(a.rebar_cost_per_ft),
            misc_cost_per_wall_sqft: o.misc_cost_per_wall_sqft.unwrap_or(a.misc_cost_per_wall_sqft),
            overhead_per_home: o.overhead_per_home.unwrap_or(a.overhead_per_home),

            printer_price_usd: o.printer_price_usd.unwrap_or(printer.price_usd),
            depreciation_years: o.depreciation_years.unwrap_or(a.depreciation_years),
            residual_fraction: o.residual_fraction.unwrap_or(a.residual_fraction),
            homes_per_year: o.homes_per_year.unwrap_or(a.homes_per_year),
            upfront_fraction: o.upfront_fraction.unwrap_or(a.upfront_fraction),
            acquisition_mode: o.acquisition_mode.unwrap_or(a.acquisition_mode),
            monthly_payment: 0.0,
        };

        inputs.printer_moves = o
            .printer_moves
            .unwrap_or_else(|| a.default_moves(inputs.num_homes));
        inputs.monthly_payment = o
            .monthly_payment
            .unwrap_or_else(|| a.suggested_payment(&inputs));
        inputs
    }

    /// Assemble from catalog names, falling back to catalog defaults for
    /// unknown names.
    pub fn from_catalog(
        catalog: &Catalog,
        printer: &str,
        material: &str,
        assumptions: &ProjectAssumptions,
        overrides: &CostOverrides,
    ) -> Self {
        CostInputs::assemble(
            catalog.get_printer(printer),
            catalog.get_material(material),
            assumptions,
            overrides,
        )
    }

    /// Optional strict validation for callers that want to reject input.
    ///
    /// The engine itself never calls this; it clamps instead.
    pub fn validate(&self) -> CalcResult<()> {
        let fractions = [
            ("efficiency", self.efficiency),
            ("waste_fraction", self.waste_fraction),
            ("residual_fraction", self.residual_fraction),
            ("upfront_fraction", self.upfront_fraction),
        ];
        for (field, value) in fractions {
            if !(0.0..=1.0).contains(&value) {
                return Err(CalcError::invalid_input(field, value.to_string(), "Fraction must be within 0..=1"));
            }
        }
        if !(0.0..1.0).contains(&self.complexity_penalty) {
            return Err(CalcError::invalid_input(
                "complexity_penalty",
                self.complexity_penalty.to_string(),
                "Penalty must be within 0..1",
            ));
        }
        if self.num_homes == 0 {
            return Err(CalcError::invalid_input("num_homes", "0", "At least one home is required"));
        }
        if self.passes_per_layer == 0 {
            return Err(CalcError::invalid_input("passes_per_layer", "0", "At least one pass is required"));
        }

        let positive = [
            ("floor_area_sqft", self.floor_area_sqft),
            ("wall_height_ft", self.wall_height_ft),
            ("layer_height_mm", self.layer_height_mm),
            ("bead_width_mm", self.bead_width_mm),
            ("print_speed_mm_s", self.print_speed_mm_s),
            ("depreciation_years", self.depreciation_years),
            ("homes_per_year", self.homes_per_year),
        ];
        for (field, value) in positive {
            if value <= 0.0 {
                return Err(CalcError::invalid_input(field, value.to_string(), "Value must be positive"));
            }
        }

        let non_negative = [
            ("wall_density", self.wall_density),
            ("setup_days", self.setup_days),
            ("teardown_days", self.teardown_days),
            ("material_price_per_ton", self.material_price_per_ton),
            ("density_pcf", self.density_pcf),
            ("labor_rate_per_hr", self.labor_rate_per_hr),
            ("crane_rate_per_day", self.crane_rate_per_day),
            ("rebar_cost_per_ft", self.rebar_cost_per_ft),
            ("misc_cost_per_wall_sqft", self.misc_cost_per_wall_sqft),
            ("overhead_per_home", self.overhead_per_home),
            ("printer_price_usd", self.printer_price_usd),
            ("monthly_payment", self.monthly_payment),
        ];
        for (field, value) in non_negative {
            if value < 0.0 {
                return Err(CalcError::invalid_input(field, value.to_string(), "Value cannot be negative"));
            }
        }
        Ok(())
    }
}

impl Default for CostInputs {
    /// Default printer and material from the built-in catalog with default
    /// project assumptions.
    fn default() -> Self {
        let catalog = Catalog::builtin();
        CostInputs::assemble(
            catalog.default_printer(),
            catalog.default_material(),
            &ProjectAssumptions::default(),
            &CostOverrides::default(),
        )
    }
}

/// Project-wide defaults that do not come from a catalog entry.
///
/// Deserializes with every field optional, so an assumptions file only needs
/// the values it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectAssumptions {
    /// Homes in the project
    pub num_homes: u32,
    /// Floor area per home (ft²)
    pub floor_area_sqft: f64,
    /// Linear wall ft per ft² of floor
    pub wall_density: f64,
    /// Wall height (ft)
    pub wall_height_ft: f64,
    /// Passes per layer
    pub passes_per_layer: u32,
    /// Complexity speed penalty, off by default
    pub complexity_penalty: f64,
    /// Homes printed per printer move; default moves = max(1, homes / this)
    pub homes_per_move: f64,
    /// Crew labor rate (USD/hr)
    pub labor_rate_per_hr: f64,
    /// Crane day rate (USD/day)
    pub crane_rate_per_day: f64,
    /// Rebar cost (USD per linear wall ft)
    pub rebar_cost_per_ft: f64,
    /// Miscellaneous integration (USD per wall ft²)
    pub misc_cost_per_wall_sqft: f64,
    /// Overhead per home (USD)
    pub overhead_per_home: f64,
    /// Depreciation term (years)
    pub depreciation_years: f64,
    /// Residual value fraction
    pub residual_fraction: f64,
    /// Utilization (homes/year)
    pub homes_per_year: f64,
    /// Upfront cash fraction of the printer price
    pub upfront_fraction: f64,
    /// Acquisition mode
    pub acquisition_mode: AcquisitionMode,
    /// Loan or lease APR used to suggest the monthly payment
    pub loan_rate: f64,
    /// Loan or lease term (months) used to suggest the monthly payment
    pub loan_term_months: u32,
}

impl Default for ProjectAssumptions {
    fn default() -> Self {
        ProjectAssumptions {
            num_homes: 10,
            floor_area_sqft: 1500.0,
            wall_density: 0.20,
            wall_height_ft: 9.0,
            passes_per_layer: 2,
            complexity_penalty: 0.0,
            homes_per_move: 2.0,
            labor_rate_per_hr: 40.0,
            crane_rate_per_day: 1500.0,
            rebar_cost_per_ft: 2.50,
            misc_cost_per_wall_sqft: 1.50,
            overhead_per_home: 5000.0,
            depreciation_years: 5.0,
            residual_fraction: 0.20,
            homes_per_year: 12.0,
            upfront_fraction: 1.0,
            acquisition_mode: AcquisitionMode::OwnedCash,
            loan_rate: 0.08,
            loan_term_months: 60,
        }
    }
}

impl ProjectAssumptions {
    /// Default printer moves for a project: one move per `homes_per_move`
    /// homes, at least one.
    pub fn default_moves(&self, num_homes: u32) -> u32 {
        if self.homes_per_move <= 0.0 {
            return num_homes.max(1);
        }
        let moves = (f64::from(num_homes) / self.homes_per_move).floor();
        // Saturating float-to-int cast; moves is finite and non-negative here.
        (moves as u32).max(1)
    }

    /// Monthly payment implied by the loan terms for the acquisition mode.
    ///
    /// Financed: amortize the part of the price not paid up front.
    /// Leased: amortize the full price. Owned-cash: zero.
    pub fn suggested_payment(&self, inputs: &CostInputs) -> f64 {
        match inputs.acquisition_mode {
            AcquisitionMode::OwnedCash => 0.0,
            AcquisitionMode::OwnedFinanced => {
                let financed = inputs.printer_price_usd * (1.0 - inputs.upfront_fraction.clamp(0.0, 1.0));
                monthly_payment(financed, self.loan_rate, self.loan_term_months)
            }
            AcquisitionMode::Leased => {
                monthly_payment(inputs.printer_price_usd, self.loan_rate, self.loan_term_months)
            }
        }
    }
}

/// Sparse user overrides; `Some` always beats catalog and assumption values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CostOverrides {
    pub floor_area_sqft: Option<f64>,
    pub wall_density: Option<f64>,
    pub wall_height_ft: Option<f64>,
    pub passes_per_layer: Option<u32>,
    pub layer_height_mm: Option<f64>,
    pub bead_width_mm: Option<f64>,
    pub print_speed_mm_s: Option<f64>,
    pub efficiency: Option<f64>,
    pub complexity_penalty: Option<f64>,
    pub num_homes: Option<u32>,
    pub printer_moves: Option<u32>,
    pub setup_days: Option<f64>,
    pub teardown_days: Option<f64>,
    pub crew_size: Option<u32>,
    pub material_price_per_ton: Option<f64>,
    pub waste_fraction: Option<f64>,
    pub density_pcf: Option<f64>,
    pub labor_rate_per_hr: Option<f64>,
    pub crane_rate_per_day: Option<f64>,
    pub rebar_cost_per_ft: Option<f64>,
    pub misc_cost_per_wall_sqft: Option<f64>,
    pub overhead_per_home: Option<f64>,
    pub printer_price_usd: Option<f64>,
    pub depreciation_years: Option<f64>,
    pub residual_fraction: Option<f64>,
    pub homes_per_year: Option<f64>,
    pub upfront_fraction: Option<f64>,
    pub acquisition_mode: Option<AcquisitionMode>,
    pub monthly_payment: Option<f64>,
}

macro_rules! layer_fields {
    ($base:expr, $top:expr, $($field:ident),+ $(,)?) => {
        CostOverrides {
            $($field: $top.$field.or($base.$field),)+
        }
    };
}

impl CostOverrides {
    /// Stack `top` over `self`; fields set in `top` win.
    pub fn layered(&self, top: &CostOverrides) -> CostOverrides {
        layer_fields!(
            self,
            top,
            floor_area_sqft,
            wall_density,
            wall_height_ft,
            passes_per_layer,
            layer_height_mm,
            bead_width_mm,
            print_speed_mm_s,
            efficiency,
            complexity_penalty,
            num_homes,
            printer_moves,
            setup_days,
            teardown_days,
            crew_size,
            material_price_per_ton,
            waste_fraction,
            density_pcf,
            labor_rate_per_hr,
            crane_rate_per_day,
            rebar_cost_per_ft,
            misc_cost_per_wall_sqft,
            overhead_per_home,
            printer_price_usd,
            depreciation_years,
            residual_fraction,
            homes_per_year,
            upfront_fraction,
            acquisition_mode,
            monthly_payment,
        )
    }

    /// True when no field is set
    pub fn is_empty(&self) -> bool {
        *self == CostOverrides::default()
    }
}
