//! # Scenario Comparison
//!
//! Runs the cost engine once per scenario (a base plus up to three
//! alternates) and lays the results out side by side: one row per metric,
//! one column per scenario, plus a long-format dataset for a stacked cost
//! component chart.
//!
//! Each scenario picks its own printer and material and carries its own
//! sparse overrides on top of the shared project assumptions.
//!
//! ## Example
//!
//! ```rust
//! use dcp_core::calculations::{compare_scenarios, ProjectAssumptions, ScenarioSpec};
//! use dcp_core::catalog::Catalog;
//!
//! let specs = vec![
//!     ScenarioSpec::new("Base"),
//!     ScenarioSpec::new("Fast").with_printer("WASP Crane"),
//! ];
//! let comparison = compare_scenarios(
//!     Catalog::builtin(),
//!     &ProjectAssumptions::default(),
//!     &specs,
//!     false,
//! ).unwrap();
//!
//! assert_eq!(comparison.scenarios.len(), 2);
//! ```

use serde::{Deserialize, Serialize};

use crate::calculations::cost::{calculate_costs, CostComponent, CostResult};
use crate::calculations::inputs::{CostInputs, CostOverrides, ProjectAssumptions};
use crate::catalog::Catalog;
use crate::errors::{CalcError, CalcResult};
use crate::units::{Quantity, UnitSystem};

/// Base scenario plus three alternates
pub const MAX_SCENARIOS: usize = 4;

/// One column of a comparison, before computation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScenarioSpec {
    pub label: String,
    /// Printer name; catalog default when `None`
    #[serde(default)]
    pub printer: Option<String>,
    /// Material name; catalog default when `None`
    #[serde(default)]
    pub material: Option<String>,
    #[serde(default)]
    pub overrides: CostOverrides,
}

impl ScenarioSpec {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Default::default()
        }
    }

    pub fn with_printer(mut self, name: impl Into<String>) -> Self {
        self.printer = Some(name.into());
        self
    }

    pub fn with_material(mut self, name: impl Into<String>) -> Self {
        self.material = Some(name.into());
        self
    }

    pub fn with_overrides(mut self, overrides: CostOverrides) -> Self {
        self.overrides = overrides;
        self
    }
}

/// A computed scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub label: String,
    pub printer: String,
    pub material: String,
    pub inputs: CostInputs,
    pub result: CostResult,
}

/// Rows of the comparison table, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComparisonMetric {
    Printer,
    Material,
    PrintHours,
    MaterialWeight,
    MaterialCost,
    LaborCost,
    LogisticsCost,
    IntegrationCost,
    LeaseExpense,
    Depreciation,
    CashCogs,
    AccrualTotal,
    CostPerArea,
    ProjectDays,
    PeakCash,
}

impl ComparisonMetric {
    pub const ALL: [ComparisonMetric; 15] = [
        ComparisonMetric::Printer,
        ComparisonMetric::Material,
        ComparisonMetric::PrintHours,
        ComparisonMetric::MaterialWeight,
        ComparisonMetric::MaterialCost,
        ComparisonMetric::LaborCost,
        ComparisonMetric::LogisticsCost,
        ComparisonMetric::IntegrationCost,
        ComparisonMetric::LeaseExpense,
        ComparisonMetric::Depreciation,
        ComparisonMetric::CashCogs,
        ComparisonMetric::AccrualTotal,
        ComparisonMetric::CostPerArea,
        ComparisonMetric::ProjectDays,
        ComparisonMetric::PeakCash,
    ];

    /// Row label; weight and per-area rows carry the unit of `system`
    pub fn label(&self, system: UnitSystem) -> String {
        match self {
            ComparisonMetric::Printer => "Printer".to_string(),
            ComparisonMetric::Material => "Material Mix".to_string(),
            ComparisonMetric::PrintHours => "Print Time (hrs/home)".to_string(),
            ComparisonMetric::MaterialWeight => format!(
                "Material Weight ({}/home)",
                Quantity::MaterialWeight.unit_label(system)
            ),
            ComparisonMetric::MaterialCost => "Material ($/home)".to_string(),
            ComparisonMetric::LaborCost => "Labor ($/home)".to_string(),
            ComparisonMetric::LogisticsCost => "Logistics ($/home)".to_string(),
            ComparisonMetric::IntegrationCost => "Integration BOS ($/home)".to_string(),
            ComparisonMetric::LeaseExpense => "Printer Lease ($/home)".to_string(),
            ComparisonMetric::Depreciation => "Printer D&A ($/home)".to_string(),
            ComparisonMetric::CashCogs => "Cash COGS ($/home)".to_string(),
            ComparisonMetric::AccrualTotal => "Accrual Total ($/home)".to_string(),
            ComparisonMetric::CostPerArea => {
                format!("Cost per Area ({})", Quantity::CostPerArea.unit_label(system))
            }
            ComparisonMetric::ProjectDays => "Project Duration (days)".to_string(),
            ComparisonMetric::PeakCash => "Peak Cash Required ($)".to_string(),
        }
    }

    /// Value of this metric for one scenario
    pub fn value(&self, scenario: &Scenario) -> Cell {
        let r = &scenario.result;
        match self {
            ComparisonMetric::Printer => Cell::Text(scenario.printer.clone()),
            ComparisonMetric::Material => Cell::Text(scenario.material.clone()),
            ComparisonMetric::PrintHours => Cell::Number(r.print_time_hours),
            ComparisonMetric::MaterialWeight => Cell::Number(r.material_weight(r.unit_system)),
            ComparisonMetric::MaterialCost => Cell::Number(r.material_cost_per_home),
            ComparisonMetric::LaborCost => Cell::Number(r.labor_cost_per_home),
            ComparisonMetric::LogisticsCost => Cell::Number(r.logistics_cost_per_home),
            ComparisonMetric::IntegrationCost => Cell::Number(r.integration_cost_per_home),
            ComparisonMetric::LeaseExpense => Cell::Number(r.lease_expense_per_home),
            ComparisonMetric::Depreciation => Cell::Number(r.depreciation_per_home),
            ComparisonMetric::CashCogs => Cell::Number(r.cash_cogs_per_home),
            ComparisonMetric::AccrualTotal => Cell::Number(r.accrual_total_per_home),
            ComparisonMetric::CostPerArea => Cell::Number(r.cost_per_area),
            ComparisonMetric::ProjectDays => Cell::Number(r.project_days),
            ComparisonMetric::PeakCash => Cell::Number(r.peak_cash_required),
        }
    }
}

/// A comparison table cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    Number(f64),
    Text(String),
}

impl Cell {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(v) => Some(*v),
            Cell::Text(_) => None,
        }
    }
}

/// One metric across every scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonRow {
    pub metric: ComparisonMetric,
    pub label: String,
    pub values: Vec<Cell>,
}

/// One bar segment of the stacked component chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub scenario: String,
    pub component: CostComponent,
    pub cost: f64,
}

/// Side-by-side results for up to [`MAX_SCENARIOS`] scenarios.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comparison {
    pub scenarios: Vec<Scenario>,
    pub table: Vec<ComparisonRow>,
    pub chart: Vec<ChartPoint>,
    pub unit_system: UnitSystem,
}

impl Comparison {
    pub fn labels(&self) -> Vec<&str> {
        self.scenarios.iter().map(|s| s.label.as_str()).collect()
    }

    pub fn row(&self, metric: ComparisonMetric) -> Option<&ComparisonRow> {
        self.table.iter().find(|r| r.metric == metric)
    }

    /// Scenario with the lowest accrual cost per home
    pub fn cheapest(&self) -> Option<&Scenario> {
        self.scenarios.iter().min_by(|a, b| {
            a.result
                .accrual_total_per_home
                .total_cmp(&b.result.accrual_total_per_home)
        })
    }
}

/// Compute every scenario and assemble the comparison.
///
/// # Errors
///
/// - [`CalcError::TooManyScenarios`] for zero or more than [`MAX_SCENARIOS`] specs
/// - [`CalcError::PrinterNotFound`] / [`CalcError::MaterialNotFound`] for a
///   named printer or material absent from `catalog`
pub fn compare_scenarios(
    catalog: &Catalog,
    assumptions: &ProjectAssumptions,
    specs: &[ScenarioSpec],
    is_metric: bool,
) -> CalcResult<Comparison> {
    if specs.is_empty() || specs.len() > MAX_SCENARIOS {
        return Err(CalcError::TooManyScenarios {
            count: specs.len(),
            max: MAX_SCENARIOS,
        });
    }

    let scenarios = specs
        .iter()
        .map(|spec| run_scenario(catalog, assumptions, spec, is_metric))
        .collect::<CalcResult<Vec<_>>>()?;

    let system = UnitSystem::from_metric_flag(is_metric);
    let table = ComparisonMetric::ALL
        .iter()
        .map(|metric| ComparisonRow {
            metric: *metric,
            label: metric.label(system),
            values: scenarios.iter().map(|s| metric.value(s)).collect(),
        })
        .collect();

    let chart = scenarios
        .iter()
        .flat_map(|s| {
            s.result.components().into_iter().map(move |(component, cost)| ChartPoint {
                scenario: s.label.clone(),
                component,
                cost,
            })
        })
        .collect();

    tracing::debug!(count = scenarios.len(), "compared scenarios");

    Ok(Comparison {
        scenarios,
        table,
        chart,
        unit_system: system,
    })
}

fn run_scenario(
    catalog: &Catalog,
    assumptions: &ProjectAssumptions,
    spec: &ScenarioSpec,
    is_metric: bool,
) -> CalcResult<Scenario> {
    let printer = match &spec.printer {
        Some(name) => catalog.find_printer(name)?,
        None => catalog.default_printer(),
    };
    let material = match &spec.material {
        Some(name) => catalog.find_material(name)?,
        None => catalog.default_material(),
    };

    let inputs = CostInputs::assemble(printer, material, assumptions, &spec.overrides);
    let result = calculate_costs(&inputs, is_metric);

    Ok(Scenario {
        label: spec.label.clone(),
        printer: printer.name.clone(),
        material: material.name.clone(),
        inputs,
        result,
    })
}
