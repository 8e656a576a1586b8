//! # Market Benchmark
//!
//! Compares the printed wall cost against a conventional build cost per
//! floor area entered in the active unit system.

use serde::{Deserialize, Serialize};

use crate::calculations::cost::{safe_div, CostResult};
use crate::units::{Quantity, UnitSystem};

/// Printed cost versus a conventional benchmark, per home.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketComparison {
    /// Conventional cost per home (USD)
    pub traditional_cost_per_home: f64,
    /// Traditional minus printed accrual cost; positive when printing is cheaper
    pub savings_per_home: f64,
    /// Savings as a fraction of the printed cost
    pub savings_fraction: f64,
    /// Printed cost per floor area in `unit_system`
    pub print_cost_per_area: f64,
    /// Benchmark cost per floor area in `unit_system`
    pub traditional_cost_per_area: f64,
    pub unit_system: UnitSystem,
}

impl MarketComparison {
    /// True when printing beats the benchmark
    pub fn is_cheaper(&self) -> bool {
        self.savings_per_home > 0.0
    }
}

/// Benchmark a result against `traditional_cost_per_area`, given in
/// $/ft² (imperial) or $/m² (metric).
pub fn compare_to_market(
    result: &CostResult,
    traditional_cost_per_area: f64,
    system: UnitSystem,
) -> MarketComparison {
    let traditional_per_sqft = Quantity::CostPerArea.from_display(system, traditional_cost_per_area);
    let traditional_cost_per_home = traditional_per_sqft * result.floor_area_sqft;
    let printed = result.accrual_total_per_home;
    let savings_per_home = traditional_cost_per_home - printed;

    MarketComparison {
        traditional_cost_per_home,
        savings_per_home,
        savings_fraction: safe_div(savings_per_home, printed),
        print_cost_per_area: Quantity::CostPerArea
            .to_display(system, safe_div(printed, result.floor_area_sqft)),
        traditional_cost_per_area,
        unit_system: system,
    }
}
