//! Printer hardware specifications.

use serde::{Deserialize, Serialize};

use crate::generated::catalog_data::PrinterRow;

/// One printer system in the hardware catalog.
///
/// Values are operational, not brochure maxima: `speed_mm_s` is the travel
/// speed a crew actually runs for quality, `efficiency` is OEE.
///
/// ## TOML Example
///
/// ```toml
/// [[printer]]
/// name = "COBOD BOD2"
/// price_usd = 580000.0
/// speed_mm_s = 250.0
/// setup_days = 2.0
/// teardown_days = 1.5
/// crew_size = 3
/// efficiency = 0.65
/// bead_width_mm = 50.0
/// layer_height_mm = 20.0
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrinterSpec {
    /// Catalog name (lookup key)
    pub name: String,
    /// Hardware price including pump/batch plant (USD)
    pub price_usd: f64,
    /// Operational nozzle travel speed (mm/s)
    pub speed_mm_s: f64,
    /// Site setup per move (days)
    pub setup_days: f64,
    /// Teardown per move (days)
    pub teardown_days: f64,
    /// Crew on site while printing or mobilizing
    pub crew_size: u32,
    /// Overall equipment effectiveness, 0..=1
    pub efficiency: f64,
    /// Nozzle bead width (mm)
    pub bead_width_mm: f64,
    /// Layer height (mm)
    pub layer_height_mm: f64,
}

impl PrinterSpec {
    /// Setup plus teardown for one move (days)
    pub fn mobilization_days(&self) -> f64 {
        self.setup_days + self.teardown_days
    }
}

impl From<&PrinterRow> for PrinterSpec {
    fn from(row: &PrinterRow) -> Self {
        PrinterSpec {
            name: row.name.to_string(),
            price_usd: row.price_usd,
            speed_mm_s: row.speed_mm_s,
            setup_days: row.setup_days,
            teardown_days: row.teardown_days,
            crew_size: row.crew_size,
            efficiency: row.efficiency,
            bead_width_mm: row.bead_width_mm,
            layer_height_mm: row.layer_height_mm,
        }
    }
}

impl std::fmt::Display for PrinterSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}
