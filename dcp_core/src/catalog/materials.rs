//! Print material (mix) specifications.

use serde::{Deserialize, Serialize};

use crate::generated::catalog_data::MaterialRow;

/// How a mix reaches the nozzle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MaterialCategory {
    /// Factory-bagged dry mortar
    Premix,
    /// Local concrete plus a printing admixture
    Admix,
    /// Low-clinker cement replacement
    #[serde(rename = "Green-Mix")]
    GreenMix,
    /// Two-component mix, accelerator dosed at the nozzle
    #[serde(rename = "Admix-2K")]
    Admix2K,
}

impl MaterialCategory {
    /// Get display name
    pub fn display_name(&self) -> &'static str {
        match self {
            MaterialCategory::Premix => "Premix",
            MaterialCategory::Admix => "Admix",
            MaterialCategory::GreenMix => "Green-Mix",
            MaterialCategory::Admix2K => "Admix-2K",
        }
    }
}

impl std::fmt::Display for MaterialCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// One print material in the material catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialSpec {
    /// Catalog name (lookup key)
    pub name: String,
    /// Supply category
    pub category: MaterialCategory,
    /// Delivered price (USD per US short ton)
    pub price_per_ton: f64,
    /// Dry density (lb/ft³)
    pub density_pcf: f64,
    /// Fraction lost to purge, start/stop and batching, 0..=1
    pub waste_fraction: f64,
    /// Workable open time (minutes)
    #[serde(default)]
    pub open_time_min: f64,
}

impl From<&MaterialRow> for MaterialSpec {
    fn from(row: &MaterialRow) -> Self {
        MaterialSpec {
            name: row.name.to_string(),
            category: row.category,
            price_per_ton: row.price_per_ton,
            density_pcf: row.density_pcf,
            waste_fraction: row.waste_fraction,
            open_time_min: row.open_time_min,
        }
    }
}

impl std::fmt::Display for MaterialSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.category)
    }
}
