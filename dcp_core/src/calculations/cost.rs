//! # Cost Engine
//!
//! Turns a [`CostInputs`] record into a per-home and per-project cost
//! breakdown for a 3D-printed concrete wall package.
//!
//! ## Stages
//!
//! 1. Safety clamps and advisory checks
//! 2. Geometry: wall length, surface area, layers, nozzle path
//! 3. Time: effective speed, print hours, project days and months
//! 4. Material: volume, weight, cost with waste, pump flow rate
//! 5. Labor: mobilization and print labor, amortized per home
//! 6. Logistics: crane days per move, amortized per home
//! 7. Integration (BOS): rebar and miscellaneous scope per home
//! 8. Printer acquisition: depreciation, debt service or lease expense
//! 9. Aggregation: cash COGS, accrual total, peak cash
//! 10. Normalization: cost per floor area in the active unit system
//!
//! The engine is total. Degenerate values (zero efficiency, zero layer
//! height, zero homes) are clamped and every risky denominator goes through
//! [`safe_div`]; risk conditions become [`CostWarning`]s, never errors.
//!
//! ## Example
//!
//! ```rust
//! use dcp_core::calculations::{calculate_costs, CostInputs};
//!
//! let inputs = CostInputs::default();
//! let result = calculate_costs(&inputs, false);
//!
//! assert!(result.accrual_total_per_home >= result.cash_cogs_per_home);
//! println!("{:.2} $/ft²", result.cost_per_area);
//! ```

use serde::{Deserialize, Serialize};

use crate::calculations::CostInputs;
use crate::finance::AcquisitionMode;
use crate::units::{Quantity, UnitSystem, FT_TO_MM, LBS_PER_TON, MM_TO_FT};

/// Shift length used to turn hours into working days
pub const HOURS_PER_SHIFT: f64 = 8.0;
/// Days per billing month for project duration
pub const DAYS_PER_MONTH: f64 = 30.0;
/// Minimum efficiency after clamping
pub const MIN_EFFICIENCY: f64 = 0.01;
/// Efficiency above which the estimate is flagged as aggressive
pub const AGGRESSIVE_EFFICIENCY: f64 = 0.90;
/// Speed (mm/s) above which tall layers risk slumping
pub const SLUMP_SPEED_MM_S: f64 = 300.0;
/// Layer height (mm) above which fast printing risks slumping
pub const SLUMP_LAYER_MM: f64 = 25.0;
/// Minimum layer height after clamping (mm)
pub const MIN_LAYER_HEIGHT_MM: f64 = 0.5;
/// Minimum bead width after clamping (mm)
pub const MIN_BEAD_WIDTH_MM: f64 = 1.0;
/// Typical pump ceiling (liters per minute)
pub const PUMP_CAPACITY_LPM: f64 = 30.0;
/// Largest complexity penalty accepted
pub const MAX_COMPLEXITY_PENALTY: f64 = 0.95;

/// Division that yields 0 instead of inf/NaN for a zero or non-finite divisor.
pub fn safe_div(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 || !denominator.is_finite() {
        0.0
    } else {
        numerator / denominator
    }
}

/// Non-blocking advisory attached to a result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum CostWarning {
    /// Efficiency above [`AGGRESSIVE_EFFICIENCY`]
    AggressiveEfficiency { efficiency: f64 },
    /// Fast travel with tall layers
    SlumpRisk { speed_mm_s: f64, layer_height_mm: f64 },
    /// Deposition rate above the pump ceiling
    PumpCapacity { flow_lpm: f64, capacity_lpm: f64 },
}

impl CostWarning {
    /// Human-readable message
    pub fn message(&self) -> String {
        match self {
            CostWarning::AggressiveEfficiency { efficiency } => format!(
                "Efficiency of {:.0}% is unrealistically aggressive for site printing",
                efficiency * 100.0
            ),
            CostWarning::SlumpRisk {
                speed_mm_s,
                layer_height_mm,
            } => format!(
                "{:.0} mm/s with {:.1} mm layers risks slump or collapse of fresh layers",
                speed_mm_s, layer_height_mm
            ),
            CostWarning::PumpCapacity { flow_lpm, capacity_lpm } => format!(
                "Flow rate of {:.1} L/min exceeds typical pump capacity of {:.0} L/min",
                flow_lpm, capacity_lpm
            ),
        }
    }
}

impl std::fmt::Display for CostWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

/// Human-readable narrative of the intermediate quantities.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuditTrail {
    /// Wall length, layers and path length
    pub geometry: String,
    /// Speed, print hours and project duration
    pub timing: String,
    /// Clamps applied to degenerate input
    pub clamps: Vec<String>,
}

/// Cost categories for charting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CostComponent {
    Material,
    Labor,
    Logistics,
    Integration,
    Lease,
    Depreciation,
}

impl CostComponent {
    /// All components in chart order
    pub const ALL: [CostComponent; 6] = [
        CostComponent::Material,
        CostComponent::Labor,
        CostComponent::Logistics,
        CostComponent::Integration,
        CostComponent::Lease,
        CostComponent::Depreciation,
    ];

    /// Get display name
    pub fn display_name(&self) -> &'static str {
        match self {
            CostComponent::Material => "Material",
            CostComponent::Labor => "Labor",
            CostComponent::Logistics => "Logistics",
            CostComponent::Integration => "Integration (BOS)",
            CostComponent::Lease => "Printer Lease",
            CostComponent::Depreciation => "Printer D&A",
        }
    }
}

impl std::fmt::Display for CostComponent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Results from one cost computation.
///
/// Per-home figures are USD per home; lengths are feet unless suffixed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostResult {
    // --- Geometry ---
    /// Floor area per home (ft²)
    pub floor_area_sqft: f64,
    /// Printed wall length per home (ft)
    pub linear_wall_ft: f64,
    /// Wall surface area per home, one face (ft²)
    pub wall_area_sqft: f64,
    /// Whole layers to reach wall height
    pub layer_count: u32,
    /// Nozzle path per home (ft)
    pub total_path_length_ft: f64,

    // --- Time ---
    /// Speed after the complexity penalty (mm/s)
    pub effective_speed_mm_s: f64,
    /// Path ÷ speed, before efficiency (hours per home)
    pub theoretical_print_hours: f64,
    /// Theoretical hours ÷ efficiency (hours per home)
    pub print_time_hours: f64,
    /// Print hours ÷ shift length
    pub print_days_per_home: f64,
    /// Mobilization plus printing across the project (days)
    pub project_days: f64,
    /// Project days ÷ homes
    pub days_per_home: f64,
    /// ceil(project days ÷ 30), at least 1
    pub project_months: u32,

    // --- Material ---
    /// Deposited volume per home (ft³)
    pub material_volume_cuft: f64,
    /// Deposited weight per home (lb)
    pub material_weight_lbs: f64,
    /// Deposited weight per home (short tons)
    pub material_weight_tons: f64,
    /// Deposition rate (L/min)
    pub flow_rate_lpm: f64,

    // --- Per-home costs ---
    /// Material including waste
    pub material_cost_per_home: f64,
    /// Mobilization plus print labor
    pub labor_cost_per_home: f64,
    /// Crane / logistics
    pub logistics_cost_per_home: f64,
    /// Rebar part of integration
    pub rebar_cost_per_home: f64,
    /// Miscellaneous part of integration
    pub misc_integration_cost_per_home: f64,
    /// Rebar plus miscellaneous
    pub integration_cost_per_home: f64,
    /// Non-cash printer depreciation (owned modes)
    pub depreciation_per_home: f64,
    /// Lease expense in COGS (leased mode)
    pub lease_expense_per_home: f64,
    /// Loan payments; financing cash flow, not COGS (financed mode)
    pub debt_service_per_home: f64,

    // --- Per-move figures ---
    /// Mobilization labor for one move
    pub setup_labor_per_move: f64,
    /// Crane cost for one move
    pub logistics_per_move: f64,
    /// Print labor for one home
    pub print_labor_per_home: f64,

    // --- Totals ---
    /// Cash operating cost per home
    pub cash_cogs_per_home: f64,
    /// Cash COGS plus depreciation
    pub accrual_total_per_home: f64,
    /// Cash COGS × homes
    pub project_cash_total: f64,
    /// Accrual total × homes
    pub project_accrual_total: f64,
    /// Printer cash paid up front
    pub upfront_printer_cash: f64,
    /// Cash needed before the first home can be sold
    pub peak_cash_required: f64,

    // --- Normalization ---
    /// Accrual total per floor area in `unit_system`
    pub cost_per_area: f64,
    /// Cash COGS per floor area in `unit_system`
    pub cash_cost_per_area: f64,
    /// Unit system the per-area figures are in
    pub unit_system: UnitSystem,

    // --- Audit ---
    /// Advisories raised by this computation
    pub warnings: Vec<CostWarning>,
    /// Narrative of intermediate quantities
    pub audit: AuditTrail,
}

impl CostResult {
    /// Per-home cost by component, in chart order.
    pub fn components(&self) -> Vec<(CostComponent, f64)> {
        CostComponent::ALL
            .iter()
            .map(|&c| (c, self.component(c)))
            .collect()
    }

    /// Per-home cost of one component
    pub fn component(&self, component: CostComponent) -> f64 {
        match component {
            CostComponent::Material => self.material_cost_per_home,
            CostComponent::Labor => self.labor_cost_per_home,
            CostComponent::Logistics => self.logistics_cost_per_home,
            CostComponent::Integration => self.integration_cost_per_home,
            CostComponent::Lease => self.lease_expense_per_home,
            CostComponent::Depreciation => self.depreciation_per_home,
        }
    }

    /// Share of the accrual total taken by one component, 0 when the total is 0
    pub fn share_of_total(&self, component: CostComponent) -> f64 {
        safe_div(self.component(component), self.accrual_total_per_home)
    }

    /// Nozzle travel per home in miles (imperial) or kilometers (metric)
    pub fn nozzle_travel(&self, system: UnitSystem) -> f64 {
        Quantity::PathLength.to_display(system, self.total_path_length_ft)
    }

    /// Material weight per home in short tons (imperial) or tonnes (metric)
    pub fn material_weight(&self, system: UnitSystem) -> f64 {
        Quantity::MaterialWeight.to_display(system, self.material_weight_tons)
    }

    /// True when any advisory was raised
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Run the cost engine.
///
/// `is_metric` only selects the unit of `cost_per_area`; every other figure
/// is computed in canonical units.
pub fn calculate_costs(inputs: &CostInputs, is_metric: bool) -> CostResult {
    let unit_system = UnitSystem::from_metric_flag(is_metric);
    let mut warnings = Vec::new();
    let mut clamps = Vec::new();

    // 1. Safety clamps & advisory checks
    if inputs.efficiency > AGGRESSIVE_EFFICIENCY {
        warnings.push(CostWarning::AggressiveEfficiency {
            efficiency: inputs.efficiency,
        });
    }
    if inputs.print_speed_mm_s > SLUMP_SPEED_MM_S && inputs.layer_height_mm > SLUMP_LAYER_MM {
        warnings.push(CostWarning::SlumpRisk {
            speed_mm_s: inputs.print_speed_mm_s,
            layer_height_mm: inputs.layer_height_mm,
        });
    }

    let efficiency = clamp_noted(inputs.efficiency, MIN_EFFICIENCY, 1.0, "efficiency", &mut clamps);
    let layer_height_mm = clamp_noted(inputs.layer_height_mm, MIN_LAYER_HEIGHT_MM, f64::MAX, "layer_height_mm", &mut clamps);
    let bead_width_mm = clamp_noted(inputs.bead_width_mm, MIN_BEAD_WIDTH_MM, f64::MAX, "bead_width_mm", &mut clamps);
    let waste = clamp_noted(inputs.waste_fraction, 0.0, 1.0, "waste_fraction", &mut clamps);
    let residual = clamp_noted(inputs.residual_fraction, 0.0, 1.0, "residual_fraction", &mut clamps);
    let upfront = clamp_noted(inputs.upfront_fraction, 0.0, 1.0, "upfront_fraction", &mut clamps);
    let penalty = clamp_noted(inputs.complexity_penalty, 0.0, MAX_COMPLEXITY_PENALTY, "complexity_penalty", &mut clamps);
    let num_homes = inputs.num_homes.max(1);
    if inputs.num_homes == 0 {
        clamps.push("num_homes raised from 0 to 1".to_string());
    }
    let homes = f64::from(num_homes);
    let moves = f64::from(inputs.printer_moves);
    let crew = f64::from(inputs.crew_size);

    // 2. Geometry
    let linear_wall_ft = inputs.floor_area_sqft * inputs.wall_density;
    let wall_area_sqft = linear_wall_ft * inputs.wall_height_ft;
    let wall_height_mm = inputs.wall_height_ft * FT_TO_MM;
    let layer_count = whole_layers(wall_height_mm, layer_height_mm);
    let total_path_length_ft = linear_wall_ft * f64::from(layer_count) * f64::from(inputs.passes_per_layer);

    tracing::debug!(linear_wall_ft, layer_count, total_path_length_ft, "geometry");

    // 3. Time
    let effective_speed_mm_s = inputs.print_speed_mm_s * (1.0 - penalty);
    let speed_ft_per_hr = effective_speed_mm_s * 3600.0 * MM_TO_FT;
    let theoretical_print_hours = safe_div(total_path_length_ft, speed_ft_per_hr);
    let print_time_hours = theoretical_print_hours / efficiency;
    let print_days_per_home = print_time_hours / HOURS_PER_SHIFT;
    let mobilization_days = inputs.setup_days + inputs.teardown_days;
    let project_days = mobilization_days * moves + print_days_per_home * homes;
    let days_per_home = project_days / homes;
    let project_months = months_for(project_days);
    let months = f64::from(project_months);

    tracing::debug!(print_time_hours, project_days, project_months, "timing");

    // 4. Material
    let material_volume_cuft = total_path_length_ft * (layer_height_mm * MM_TO_FT) * (bead_width_mm * MM_TO_FT);
    let material_weight_lbs = material_volume_cuft * inputs.density_pcf;
    let material_weight_tons = material_weight_lbs / LBS_PER_TON;
    let material_cost_per_home = material_weight_tons * inputs.material_price_per_ton * (1.0 + waste);

    // mm/s · mm · mm = mm³/s; × 60 → mm³/min; ÷ 1e6 → L/min
    let flow_rate_lpm = effective_speed_mm_s * bead_width_mm * layer_height_mm * 60.0 / 1_000_000.0;
    if flow_rate_lpm > PUMP_CAPACITY_LPM {
        warnings.push(CostWarning::PumpCapacity {
            flow_lpm: flow_rate_lpm,
            capacity_lpm: PUMP_CAPACITY_LPM,
        });
    }

    tracing::debug!(material_weight_tons, material_cost_per_home, flow_rate_lpm, "material");

    // 5. Labor
    let mobilization_hours = mobilization_days * HOURS_PER_SHIFT;
    let setup_labor_per_move = mobilization_hours * crew * inputs.labor_rate_per_hr;
    let print_labor_per_home = print_time_hours * crew * inputs.labor_rate_per_hr;
    let total_setup_labor = setup_labor_per_move * moves;
    let total_print_labor = print_labor_per_home * homes;
    let labor_cost_per_home = (total_setup_labor + total_print_labor) / homes;

    // 6. Logistics
    let logistics_per_move = mobilization_days * inputs.crane_rate_per_day;
    let logistics_cost_per_home = logistics_per_move * moves / homes;

    // 7. Integration (BOS)
    let rebar_cost_per_home = linear_wall_ft * inputs.rebar_cost_per_ft;
    let misc_integration_cost_per_home = wall_area_sqft * inputs.misc_cost_per_wall_sqft;
    let integration_cost_per_home = rebar_cost_per_home + misc_integration_cost_per_home;

    // 8. Printer acquisition & financing
    let upfront_printer_cash = inputs.printer_price_usd * upfront;
    let payments_per_home = inputs.monthly_payment * months / homes;
    let (depreciation_per_home, debt_service_per_home, lease_expense_per_home, first_payment) =
        match inputs.acquisition_mode {
            AcquisitionMode::OwnedCash => (owned_depreciation(inputs, residual), 0.0, 0.0, 0.0),
            AcquisitionMode::OwnedFinanced if upfront < 1.0 => (
                owned_depreciation(inputs, residual),
                payments_per_home,
                0.0,
                inputs.monthly_payment,
            ),
            AcquisitionMode::OwnedFinanced => (owned_depreciation(inputs, residual), 0.0, 0.0, 0.0),
            AcquisitionMode::Leased => (0.0, 0.0, payments_per_home, inputs.monthly_payment),
        };

    tracing::debug!(
        mode = %inputs.acquisition_mode,
        depreciation_per_home,
        debt_service_per_home,
        lease_expense_per_home,
        "printer acquisition"
    );

    // 9. Aggregation
    let cash_cogs_per_home = material_cost_per_home
        + labor_cost_per_home
        + logistics_cost_per_home
        + integration_cost_per_home
        + lease_expense_per_home;
    let accrual_total_per_home = cash_cogs_per_home + depreciation_per_home;
    let peak_cash_required = upfront_printer_cash
        + logistics_per_move
        + setup_labor_per_move
        + print_labor_per_home
        + material_cost_per_home
        + first_payment;

    // 10. Normalization
    let per_sqft = safe_div(accrual_total_per_home, inputs.floor_area_sqft);
    let cash_per_sqft = safe_div(cash_cogs_per_home, inputs.floor_area_sqft);
    let cost_per_area = Quantity::CostPerArea.to_display(unit_system, per_sqft);
    let cash_cost_per_area = Quantity::CostPerArea.to_display(unit_system, cash_per_sqft);

    for warning in &warnings {
        tracing::warn!("{}", warning);
    }

    let audit = AuditTrail {
        geometry: format!(
            "{:.0} ft² × {:.2} ft/ft² = {:.1} ft of wall; {:.1} mm ÷ {:.1} mm = {} layers; \
             {:.1} ft × {} layers × {} passes = {:.0} ft of nozzle path",
            inputs.floor_area_sqft,
            inputs.wall_density,
            linear_wall_ft,
            wall_height_mm,
            layer_height_mm,
            layer_count,
            linear_wall_ft,
            layer_count,
            inputs.passes_per_layer,
            total_path_length_ft,
        ),
        timing: format!(
            "{:.0} mm/s = {:.0} ft/hr; {:.1} h theoretical ÷ {:.0}% efficiency = {:.1} h per home \
             ({:.1} shifts); project {:.1} days over {} month(s)",
            effective_speed_mm_s,
            speed_ft_per_hr,
            theoretical_print_hours,
            efficiency * 100.0,
            print_time_hours,
            print_days_per_home,
            project_days,
            project_months,
        ),
        clamps,
    };

    CostResult {
        floor_area_sqft: inputs.floor_area_sqft,
        linear_wall_ft,
        wall_area_sqft,
        layer_count,
        total_path_length_ft,
        effective_speed_mm_s,
        theoretical_print_hours,
        print_time_hours,
        print_days_per_home,
        project_days,
        days_per_home,
        project_months,
        material_volume_cuft,
        material_weight_lbs,
        material_weight_tons,
        flow_rate_lpm,
        material_cost_per_home,
        labor_cost_per_home,
        logistics_cost_per_home,
        rebar_cost_per_home,
        misc_integration_cost_per_home,
        integration_cost_per_home,
        depreciation_per_home,
        lease_expense_per_home,
        debt_service_per_home,
        setup_labor_per_move,
        logistics_per_move,
        print_labor_per_home,
        cash_cogs_per_home,
        accrual_total_per_home,
        project_cash_total: cash_cogs_per_home * homes,
        project_accrual_total: accrual_total_per_home * homes,
        upfront_printer_cash,
        peak_cash_required,
        cost_per_area,
        cash_cost_per_area,
        unit_system,
        warnings,
        audit,
    }
}

/// Clamp into `[min, max]`, recording a note when the value moves.
fn clamp_noted(value: f64, min: f64, max: f64, field: &str, notes: &mut Vec<String>) -> f64 {
    let clamped = if value.is_nan() { min } else { value.clamp(min, max) };
    if clamped != value {
        notes.push(format!("{} clamped from {} to {}", field, value, clamped));
    }
    clamped
}

/// Whole layers in a wall, at least one.
fn whole_layers(wall_height_mm: f64, layer_height_mm: f64) -> u32 {
    // Tolerance keeps exact multiples (e.g. 2743.2 / 13.716) from flooring down.
    let layers = (wall_height_mm / layer_height_mm + 1e-9).floor();
    if layers.is_finite() && layers >= 1.0 {
        layers.min(f64::from(u32::MAX)) as u32
    } else {
        1
    }
}

fn months_for(project_days: f64) -> u32 {
    let months = (project_days / DAYS_PER_MONTH).ceil();
    if months.is_finite() && months >= 1.0 {
        months.min(f64::from(u32::MAX)) as u32
    } else {
        1
    }
}

fn owned_depreciation(inputs: &CostInputs, residual: f64) -> f64 {
    let annual = safe_div(inputs.printer_price_usd * (1.0 - residual), inputs.depreciation_years);
    safe_div(annual, inputs.homes_per_year)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// The worked example: 1500 ft² home, COBOD-class printer, cash purchase.
    fn scenario_a() -> CostInputs {
        CostInputs {
            floor_area_sqft: 1500.0,
            wall_density: 0.20,
            wall_height_ft: 9.0,
            passes_per_layer: 2,
            layer_height_mm: 20.0,
            bead_width_mm: 50.0,
            print_speed_mm_s: 250.0,
            efficiency: 0.65,
            complexity_penalty: 0.0,
            num_homes: 1,
            printer_moves: 1,
            setup_days: 1.0,
            teardown_days: 1.0,
            crew_size: 3,
            material_price_per_ton: 70.0,
            waste_fraction: 0.10,
            density_pcf: 145.0,
            labor_rate_per_hr: 40.0,
            crane_rate_per_day: 1500.0,
            rebar_cost_per_ft: 0.0,
            misc_cost_per_wall_sqft: 0.0,
            overhead_per_home: 0.0,
            printer_price_usd: 580_000.0,
            depreciation_years: 5.0,
            residual_fraction: 0.20,
            homes_per_year: 12.0,
            upfront_fraction: 1.0,
            acquisition_mode: AcquisitionMode::OwnedCash,
            monthly_payment: 0.0,
        }
    }

    #[test]
    fn test_geometry() {
        let r = calculate_costs(&scenario_a(), false);
        assert_relative_eq!(r.linear_wall_ft, 300.0, max_relative = 1e-12);
        assert_relative_eq!(r.wall_area_sqft, 2700.0, max_relative = 1e-12);
        assert_eq!(r.layer_count, 137);
        assert_relative_eq!(r.total_path_length_ft, 82_200.0, max_relative = 1e-12);
    }

    #[test]
    fn test_timing() {
        let r = calculate_costs(&scenario_a(), false);
        // 250 mm/s = 2952.756 ft/hr
        assert_relative_eq!(r.theoretical_print_hours, 27.838399109, max_relative = 1e-9);
        assert_relative_eq!(r.print_time_hours, 42.828306322, max_relative = 1e-9);
        assert_relative_eq!(r.project_days, 7.353538290, max_relative = 1e-9);
        assert_eq!(r.project_months, 1);
    }

    #[test]
    fn test_material() {
        let r = calculate_costs(&scenario_a(), false);
        assert_relative_eq!(r.material_volume_cuft, 884.79349288, max_relative = 1e-9);
        assert_relative_eq!(r.material_weight_tons, 64.147528234, max_relative = 1e-9);
        assert_relative_eq!(r.material_cost_per_home, 4939.359674, max_relative = 1e-9);
        assert_relative_eq!(r.flow_rate_lpm, 15.0, max_relative = 1e-12);
    }

    #[test]
    fn test_labor_logistics_depreciation() {
        let r = calculate_costs(&scenario_a(), false);
        assert_relative_eq!(r.setup_labor_per_move, 1920.0, max_relative = 1e-12);
        assert_relative_eq!(r.labor_cost_per_home, 7059.396758616, max_relative = 1e-9);
        assert_relative_eq!(r.logistics_cost_per_home, 3000.0, max_relative = 1e-12);
        assert_relative_eq!(r.depreciation_per_home, 7733.333333333, max_relative = 1e-9);
        assert_eq!(r.integration_cost_per_home, 0.0);
    }

    #[test]
    fn test_totals() {
        let r = calculate_costs(&scenario_a(), false);
        assert_relative_eq!(r.cash_cogs_per_home, 14_998.756432621, max_relative = 1e-9);
        assert_relative_eq!(r.accrual_total_per_home, 22_732.089765954, max_relative = 1e-9);
        assert_relative_eq!(r.cost_per_area, 15.154726511, max_relative = 1e-9);
        assert_relative_eq!(r.peak_cash_required, 594_998.756432621, max_relative = 1e-9);
        assert!(r.warnings.is_empty());
    }

    #[test]
    fn test_metric_only_changes_per_area_unit() {
        let imperial = calculate_costs(&scenario_a(), false);
        let metric = calculate_costs(&scenario_a(), true);
        assert_eq!(imperial.accrual_total_per_home, metric.accrual_total_per_home);
        assert_eq!(imperial.print_time_hours, metric.print_time_hours);
        assert_relative_eq!(metric.cost_per_area, imperial.cost_per_area * 10.7639104, max_relative = 1e-12);
        assert_eq!(metric.unit_system, UnitSystem::Metric);
    }

    #[test]
    fn test_integration_costs() {
        let inputs = CostInputs {
            rebar_cost_per_ft: 2.0,
            misc_cost_per_wall_sqft: 1.5,
            ..scenario_a()
        };
        let r = calculate_costs(&inputs, false);
        assert_relative_eq!(r.rebar_cost_per_home, 600.0, max_relative = 1e-12);
        assert_relative_eq!(r.misc_integration_cost_per_home, 4050.0, max_relative = 1e-12);
        assert_relative_eq!(r.integration_cost_per_home, 4650.0, max_relative = 1e-12);
    }

    #[test]
    fn test_integration_not_divided_by_moves() {
        let base = CostInputs {
            rebar_cost_per_ft: 2.0,
            ..scenario_a()
        };
        let more_moves = CostInputs {
            printer_moves: 4,
            num_homes: 4,
            ..base.clone()
        };
        let a = calculate_costs(&base, false);
        let b = calculate_costs(&more_moves, false);
        assert_eq!(a.integration_cost_per_home, b.integration_cost_per_home);
    }

    #[test]
    fn test_aggressive_efficiency_warning() {
        let inputs = CostInputs {
            efficiency: 0.95,
            ..scenario_a()
        };
        let r = calculate_costs(&inputs, false);
        assert!(matches!(r.warnings.as_slice(), [CostWarning::AggressiveEfficiency { .. }]));
        assert!(r.warnings[0].message().contains("95%"));
    }

    #[test]
    fn test_slump_warning_needs_both_conditions() {
        let fast_thin = CostInputs {
            print_speed_mm_s: 350.0,
            layer_height_mm: 20.0,
            ..scenario_a()
        };
        assert!(calculate_costs(&fast_thin, false)
            .warnings
            .iter()
            .all(|w| !matches!(w, CostWarning::SlumpRisk { .. })));

        let fast_tall = CostInputs {
            print_speed_mm_s: 350.0,
            layer_height_mm: 30.0,
            ..scenario_a()
        };
        assert!(calculate_costs(&fast_tall, false)
            .warnings
            .iter()
            .any(|w| matches!(w, CostWarning::SlumpRisk { .. })));
    }

    #[test]
    fn test_pump_capacity_warning() {
        // 330 mm/s × 80 mm × 25 mm × 60 / 1e6 = 39.6 L/min
        let inputs = CostInputs {
            print_speed_mm_s: 330.0,
            bead_width_mm: 80.0,
            layer_height_mm: 25.0,
            ..scenario_a()
        };
        let r = calculate_costs(&inputs, false);
        assert_relative_eq!(r.flow_rate_lpm, 39.6, max_relative = 1e-12);
        assert!(r
            .warnings
            .iter()
            .any(|w| matches!(w, CostWarning::PumpCapacity { .. })));
    }

    #[test]
    fn test_zero_layer_height_and_efficiency_are_clamped() {
        let inputs = CostInputs {
            layer_height_mm: 0.0,
            bead_width_mm: 0.0,
            efficiency: 0.0,
            ..scenario_a()
        };
        let r = calculate_costs(&inputs, false);
        assert!(r.print_time_hours.is_finite());
        assert!(r.accrual_total_per_home.is_finite());
        // 2743.2 mm / 0.5 mm
        assert_eq!(r.layer_count, 5486);
        assert_eq!(r.audit.clamps.len(), 3);
    }

    #[test]
    fn test_zero_homes_is_tolerated() {
        let inputs = CostInputs {
            num_homes: 0,
            ..scenario_a()
        };
        let r = calculate_costs(&inputs, false);
        assert_eq!(r.project_cash_total, r.cash_cogs_per_home);
        assert!(r.accrual_total_per_home.is_finite());
    }

    #[test]
    fn test_zero_floor_area_and_speed() {
        let inputs = CostInputs {
            floor_area_sqft: 0.0,
            print_speed_mm_s: 0.0,
            ..scenario_a()
        };
        let r = calculate_costs(&inputs, false);
        assert_eq!(r.cost_per_area, 0.0);
        assert_eq!(r.print_time_hours, 0.0);
    }

    #[test]
    fn test_complexity_penalty_slows_print() {
        let base = calculate_costs(&scenario_a(), false);
        let complex = calculate_costs(
            &CostInputs {
                complexity_penalty: 0.2,
                ..scenario_a()
            },
            false,
        );
        assert_relative_eq!(complex.effective_speed_mm_s, 200.0, max_relative = 1e-12);
        assert_relative_eq!(complex.print_time_hours, base.print_time_hours / 0.8, max_relative = 1e-12);
        // Deposited material does not depend on speed
        assert_eq!(complex.material_cost_per_home, base.material_cost_per_home);
    }

    #[test]
    fn test_cash_purchase_books_only_depreciation() {
        let inputs = CostInputs {
            monthly_payment: 5000.0,
            ..scenario_a()
        };
        let r = calculate_costs(&inputs, false);
        assert!(r.depreciation_per_home > 0.0);
        assert_eq!(r.debt_service_per_home, 0.0);
        assert_eq!(r.lease_expense_per_home, 0.0);
    }

    #[test]
    fn test_financed_books_depreciation_and_debt_service() {
        let inputs = CostInputs {
            acquisition_mode: AcquisitionMode::OwnedFinanced,
            upfront_fraction: 0.2,
            monthly_payment: 9408.25,
            ..scenario_a()
        };
        let r = calculate_costs(&inputs, false);
        assert!(r.depreciation_per_home > 0.0);
        assert_relative_eq!(r.debt_service_per_home, 9408.25, max_relative = 1e-12);
        assert_eq!(r.lease_expense_per_home, 0.0);
        assert_relative_eq!(r.upfront_printer_cash, 116_000.0, max_relative = 1e-12);
        // Debt service is a financing flow, not COGS
        let expected_cogs = r.material_cost_per_home + r.labor_cost_per_home + r.logistics_cost_per_home;
        assert_relative_eq!(r.cash_cogs_per_home, expected_cogs, max_relative = 1e-12);
        // First payment is part of the peak cash need
        let without_payment = r.upfront_printer_cash
            + r.logistics_per_move
            + r.setup_labor_per_move
            + r.print_labor_per_home
            + r.material_cost_per_home;
        assert_relative_eq!(r.peak_cash_required, without_payment + 9408.25, max_relative = 1e-12);
    }

    #[test]
    fn test_financed_fully_upfront_has_no_debt_service() {
        let inputs = CostInputs {
            acquisition_mode: AcquisitionMode::OwnedFinanced,
            upfront_fraction: 1.0,
            monthly_payment: 9408.25,
            ..scenario_a()
        };
        let r = calculate_costs(&inputs, false);
        assert_eq!(r.debt_service_per_home, 0.0);
    }

    #[test]
    fn test_leased_books_lease_expense_only() {
        let inputs = CostInputs {
            acquisition_mode: AcquisitionMode::Leased,
            upfront_fraction: 0.0,
            monthly_payment: 12_000.0,
            ..scenario_a()
        };
        let r = calculate_costs(&inputs, false);
        assert_eq!(r.depreciation_per_home, 0.0);
        assert_eq!(r.debt_service_per_home, 0.0);
        assert_relative_eq!(r.lease_expense_per_home, 12_000.0, max_relative = 1e-12);
        assert_eq!(r.accrual_total_per_home, r.cash_cogs_per_home);
        assert!(r.cash_cogs_per_home > r.material_cost_per_home + r.labor_cost_per_home + 12_000.0);
    }

    #[test]
    fn test_lease_spreads_over_project_months() {
        // 10 homes, 10 moves: long enough to run past one month
        let inputs = CostInputs {
            acquisition_mode: AcquisitionMode::Leased,
            upfront_fraction: 0.0,
            monthly_payment: 10_000.0,
            num_homes: 10,
            printer_moves: 10,
            ..scenario_a()
        };
        let r = calculate_costs(&inputs, false);
        // 10 × 2 mobilization days + 10 × 5.35 print days = 73.5 days → 3 months
        assert_eq!(r.project_months, 3);
        assert_relative_eq!(r.lease_expense_per_home, 3000.0, max_relative = 1e-12);
    }

    #[test]
    fn test_accrual_identity() {
        for mode in AcquisitionMode::ALL {
            let inputs = CostInputs {
                acquisition_mode: mode,
                upfront_fraction: 0.3,
                monthly_payment: 7000.0,
                rebar_cost_per_ft: 1.25,
                ..scenario_a()
            };
            let r = calculate_costs(&inputs, false);
            assert_eq!(r.accrual_total_per_home, r.cash_cogs_per_home + r.depreciation_per_home);
        }
    }

    #[test]
    fn test_components_sum_to_accrual_total() {
        let inputs = CostInputs {
            rebar_cost_per_ft: 1.0,
            misc_cost_per_wall_sqft: 2.0,
            ..scenario_a()
        };
        let r = calculate_costs(&inputs, false);
        let sum: f64 = r.components().iter().map(|(_, cost)| cost).sum();
        assert_relative_eq!(sum, r.accrual_total_per_home, max_relative = 1e-12);
        let shares: f64 = CostComponent::ALL.iter().map(|&c| r.share_of_total(c)).sum();
        assert_relative_eq!(shares, 1.0, max_relative = 1e-12);
    }

    #[test]
    fn test_print_job_statistics() {
        let r = calculate_costs(&scenario_a(), false);
        assert_relative_eq!(r.nozzle_travel(UnitSystem::Imperial), 82_200.0 / 5280.0, max_relative = 1e-12);
        assert_relative_eq!(r.nozzle_travel(UnitSystem::Metric), 82_200.0 * 0.3048 / 1000.0, max_relative = 1e-9);
        assert_relative_eq!(r.material_weight(UnitSystem::Metric), r.material_weight_tons / 1.10231, max_relative = 1e-12);
    }

    #[test]
    fn test_audit_trail() {
        let r = calculate_costs(&scenario_a(), false);
        assert!(r.audit.geometry.contains("137 layers"));
        assert!(r.audit.geometry.contains("82200 ft"));
        assert!(r.audit.timing.contains("250 mm/s"));
        assert!(r.audit.clamps.is_empty());
    }

    #[test]
    fn test_idempotent() {
        let inputs = CostInputs {
            acquisition_mode: AcquisitionMode::OwnedFinanced,
            upfront_fraction: 0.25,
            monthly_payment: 8100.0,
            complexity_penalty: 0.1,
            ..scenario_a()
        };
        assert_eq!(calculate_costs(&inputs, true), calculate_costs(&inputs, true));
    }

    #[test]
    fn test_safe_div() {
        assert_eq!(safe_div(10.0, 0.0), 0.0);
        assert_eq!(safe_div(10.0, f64::INFINITY), 0.0);
        assert_eq!(safe_div(10.0, 4.0), 2.5);
    }

    #[test]
    fn test_result_serialization() {
        let inputs = CostInputs {
            efficiency: 0.95,
            ..scenario_a()
        };
        let r = calculate_costs(&inputs, false);
        let json = serde_json::to_string(&r).unwrap();
        assert!(json.contains("\"kind\":\"AggressiveEfficiency\""));
        let roundtrip: CostResult = serde_json::from_str(&json).unwrap();
        assert_eq!(roundtrip.layer_count, 137);
    }
}
