//! # Unit Types
//!
//! Conversion constants and type-safe wrappers for the quantities a 3DCP
//! estimate deals in. The wrappers are plain `f64` newtypes so JSON stays
//! clean (just numbers).
//!
//! ## Canonical Units
//!
//! The engine computes only in canonical units, whatever the caller displays:
//! - Length: feet (ft); print resolution in millimeters (mm)
//! - Area: square feet (ft²)
//! - Density: pounds per cubic foot (lb/ft³)
//! - Mass: US short tons (2000 lb)
//! - Currency: USD
//!
//! Metric values are display projections of the canonical value. Keep one
//! authoritative canonical value per quantity and project it with
//! [`Quantity::to_display`]; convert edits back with [`Quantity::from_display`].
//!
//! ## Example
//!
//! ```rust
//! use dcp_core::units::{Feet, Meters, Quantity, UnitSystem};
//!
//! let height = Feet(9.0);
//! let metric: Meters = height.into();
//! assert!((metric.0 - 2.7432).abs() < 1e-3);
//!
//! let shown = Quantity::WallHeight.to_display(UnitSystem::Metric, 9.0);
//! let back = Quantity::WallHeight.from_display(UnitSystem::Metric, shown);
//! assert!((back - 9.0).abs() < 1e-9);
//! ```

use serde::{Deserialize, Serialize};
use std::ops::{Add, Div, Mul, Sub};

// ============================================================================
// Conversion Constants
// ============================================================================

/// Square meters to square feet
pub const SQ_M_TO_SQ_FT: f64 = 10.7639104;
/// Metric tonne to US short ton
pub const TONNE_TO_TON: f64 = 1.10231;
/// kg/m³ to lb/ft³
pub const KG_M3_TO_LBS_FT3: f64 = 0.06242796;
/// Millimeters to feet
pub const MM_TO_FT: f64 = 0.00328084;
/// Millimeters to inches
pub const MM_TO_INCH: f64 = 0.0393701;
/// Meters to feet
pub const M_TO_FT: f64 = 3.28084;
/// Feet to millimeters (exact)
pub const FT_TO_MM: f64 = 304.8;
/// Pounds per US short ton
pub const LBS_PER_TON: f64 = 2000.0;
/// Feet per statute mile
pub const FT_PER_MILE: f64 = 5280.0;

// ============================================================================
// Length Units
// ============================================================================

/// Length in feet
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Feet(pub f64);

/// Length in meters
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Meters(pub f64);

/// Length in millimeters
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Millimeters(pub f64);

/// Length in inches
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Inches(pub f64);

impl From<Feet> for Meters {
    fn from(ft: Feet) -> Self {
        Meters(ft.0 / M_TO_FT)
    }
}

impl From<Meters> for Feet {
    fn from(m: Meters) -> Self {
        Feet(m.0 * M_TO_FT)
    }
}

impl From<Millimeters> for Feet {
    fn from(mm: Millimeters) -> Self {
        Feet(mm.0 * MM_TO_FT)
    }
}

impl From<Feet> for Millimeters {
    fn from(ft: Feet) -> Self {
        Millimeters(ft.0 * FT_TO_MM)
    }
}

impl From<Millimeters> for Inches {
    fn from(mm: Millimeters) -> Self {
        Inches(mm.0 * MM_TO_INCH)
    }
}

impl From<Inches> for Millimeters {
    fn from(inches: Inches) -> Self {
        Millimeters(inches.0 / MM_TO_INCH)
    }
}

// ============================================================================
// Area Units
// ============================================================================

/// Area in square feet
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SqFt(pub f64);

/// Area in square meters
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SqM(pub f64);

impl From<SqM> for SqFt {
    fn from(sqm: SqM) -> Self {
        SqFt(sqm.0 * SQ_M_TO_SQ_FT)
    }
}

impl From<SqFt> for SqM {
    fn from(sqft: SqFt) -> Self {
        SqM(sqft.0 / SQ_M_TO_SQ_FT)
    }
}

// ============================================================================
// Mass Units
// ============================================================================

/// Mass in US short tons (2000 lb)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShortTons(pub f64);

/// Mass in metric tonnes
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tonnes(pub f64);

impl From<Tonnes> for ShortTons {
    fn from(t: Tonnes) -> Self {
        ShortTons(t.0 * TONNE_TO_TON)
    }
}

impl From<ShortTons> for Tonnes {
    fn from(t: ShortTons) -> Self {
        Tonnes(t.0 / TONNE_TO_TON)
    }
}

// ============================================================================
// Density Units
// ============================================================================

/// Density in pounds per cubic foot
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Pcf(pub f64);

/// Density in kilograms per cubic meter
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KgPerM3(pub f64);

impl From<KgPerM3> for Pcf {
    fn from(d: KgPerM3) -> Self {
        Pcf(d.0 * KG_M3_TO_LBS_FT3)
    }
}

impl From<Pcf> for KgPerM3 {
    fn from(d: Pcf) -> Self {
        KgPerM3(d.0 / KG_M3_TO_LBS_FT3)
    }
}

// ============================================================================
// Price Units
// ============================================================================

/// Material price in USD per US short ton
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UsdPerTon(pub f64);

/// Material price in USD per metric tonne
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UsdPerTonne(pub f64);

// A tonne is heavier than a ton, so it costs proportionally more.
impl From<UsdPerTon> for UsdPerTonne {
    fn from(p: UsdPerTon) -> Self {
        UsdPerTonne(p.0 * TONNE_TO_TON)
    }
}

impl From<UsdPerTonne> for UsdPerTon {
    fn from(p: UsdPerTonne) -> Self {
        UsdPerTon(p.0 / TONNE_TO_TON)
    }
}

// ============================================================================
// Arithmetic Implementations (macro to reduce boilerplate)
// ============================================================================

macro_rules! impl_arithmetic {
    ($type:ty) => {
        impl Add for $type {
            type Output = Self;
            fn add(self, rhs: Self) -> Self::Output {
                Self(self.0 + rhs.0)
            }
        }

        impl Sub for $type {
            type Output = Self;
            fn sub(self, rhs: Self) -> Self::Output {
                Self(self.0 - rhs.0)
            }
        }

        impl Mul<f64> for $type {
            type Output = Self;
            fn mul(self, rhs: f64) -> Self::Output {
                Self(self.0 * rhs)
            }
        }

        impl Div<f64> for $type {
            type Output = Self;
            fn div(self, rhs: f64) -> Self::Output {
                Self(self.0 / rhs)
            }
        }

        impl $type {
            /// Get the raw f64 value
            pub fn value(self) -> f64 {
                self.0
            }

            /// Create from raw f64 value
            pub fn new(value: f64) -> Self {
                Self(value)
            }
        }
    };
}

impl_arithmetic!(Feet);
impl_arithmetic!(Meters);
impl_arithmetic!(Millimeters);
impl_arithmetic!(Inches);
impl_arithmetic!(SqFt);
impl_arithmetic!(SqM);
impl_arithmetic!(ShortTons);
impl_arithmetic!(Tonnes);
impl_arithmetic!(Pcf);
impl_arithmetic!(KgPerM3);
impl_arithmetic!(UsdPerTon);
impl_arithmetic!(UsdPerTonne);

// ============================================================================
// Display Projections
// ============================================================================

/// Unit system a caller displays values in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum UnitSystem {
    /// US customary (ft, ft², lb/ft³, short tons)
    #[default]
    Imperial,
    /// Metric (m, m², kg/m³, tonnes)
    Metric,
}

impl UnitSystem {
    /// Build from the `is_metric` flag the engine takes
    pub fn from_metric_flag(is_metric: bool) -> Self {
        if is_metric {
            UnitSystem::Metric
        } else {
            UnitSystem::Imperial
        }
    }

    /// True for [`UnitSystem::Metric`]
    pub fn is_metric(self) -> bool {
        matches!(self, UnitSystem::Metric)
    }
}

impl std::fmt::Display for UnitSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnitSystem::Imperial => write!(f, "Imperial (US)"),
            UnitSystem::Metric => write!(f, "Metric (EU)"),
        }
    }
}

/// A physical quantity with one canonical unit and a display unit per system.
///
/// Imperial display of print resolution is inches; every other imperial
/// display unit is the canonical unit itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Quantity {
    /// Floor area (canonical ft²)
    FloorArea,
    /// Wall height (canonical ft)
    WallHeight,
    /// Layer height or bead width (canonical mm)
    BeadDimension,
    /// Dry density (canonical lb/ft³)
    Density,
    /// Material price (canonical USD/ton)
    MaterialPrice,
    /// Material weight (canonical short tons)
    MaterialWeight,
    /// Cost per floor area (canonical USD/ft²)
    CostPerArea,
    /// Nozzle path length (canonical ft; displayed as miles or km)
    PathLength,
}

impl Quantity {
    /// Multiplier taking a canonical value to the display unit of `system`.
    fn display_factor(self, system: UnitSystem) -> f64 {
        match (self, system) {
            (Quantity::FloorArea, UnitSystem::Imperial) => 1.0,
            (Quantity::FloorArea, UnitSystem::Metric) => 1.0 / SQ_M_TO_SQ_FT,
            (Quantity::WallHeight, UnitSystem::Imperial) => 1.0,
            (Quantity::WallHeight, UnitSystem::Metric) => 1.0 / M_TO_FT,
            (Quantity::BeadDimension, UnitSystem::Imperial) => MM_TO_INCH,
            (Quantity::BeadDimension, UnitSystem::Metric) => 1.0,
            (Quantity::Density, UnitSystem::Imperial) => 1.0,
            (Quantity::Density, UnitSystem::Metric) => 1.0 / KG_M3_TO_LBS_FT3,
            (Quantity::MaterialPrice, UnitSystem::Imperial) => 1.0,
            (Quantity::MaterialPrice, UnitSystem::Metric) => TONNE_TO_TON,
            (Quantity::MaterialWeight, UnitSystem::Imperial) => 1.0,
            (Quantity::MaterialWeight, UnitSystem::Metric) => 1.0 / TONNE_TO_TON,
            (Quantity::CostPerArea, UnitSystem::Imperial) => 1.0,
            (Quantity::CostPerArea, UnitSystem::Metric) => SQ_M_TO_SQ_FT,
            (Quantity::PathLength, UnitSystem::Imperial) => 1.0 / FT_PER_MILE,
            (Quantity::PathLength, UnitSystem::Metric) => FT_TO_MM / 1_000_000.0,
        }
    }

    /// Project a canonical value into the display unit of `system`.
    pub fn to_display(self, system: UnitSystem, canonical: f64) -> f64 {
        canonical * self.display_factor(system)
    }

    /// Convert a value shown in `system` back to the canonical unit.
    pub fn from_display(self, system: UnitSystem, shown: f64) -> f64 {
        shown / self.display_factor(system)
    }

    /// Unit label used when displaying in `system`.
    pub fn unit_label(self, system: UnitSystem) -> &'static str {
        match (self, system) {
            (Quantity::FloorArea, UnitSystem::Imperial) => "ft²",
            (Quantity::FloorArea, UnitSystem::Metric) => "m²",
            (Quantity::WallHeight, UnitSystem::Imperial) => "ft",
            (Quantity::WallHeight, UnitSystem::Metric) => "m",
            (Quantity::BeadDimension, UnitSystem::Imperial) => "in",
            (Quantity::BeadDimension, UnitSystem::Metric) => "mm",
            (Quantity::Density, UnitSystem::Imperial) => "lb/ft³",
            (Quantity::Density, UnitSystem::Metric) => "kg/m³",
            (Quantity::MaterialPrice, UnitSystem::Imperial) => "$/ton",
            (Quantity::MaterialPrice, UnitSystem::Metric) => "$/tonne",
            (Quantity::MaterialWeight, UnitSystem::Imperial) => "tons",
            (Quantity::MaterialWeight, UnitSystem::Metric) => "tonnes",
            (Quantity::CostPerArea, UnitSystem::Imperial) => "$/ft²",
            (Quantity::CostPerArea, UnitSystem::Metric) => "$/m²",
            (Quantity::PathLength, UnitSystem::Imperial) => "mi",
            (Quantity::PathLength, UnitSystem::Metric) => "km",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const ALL_QUANTITIES: [Quantity; 8] = [
        Quantity::FloorArea,
        Quantity::WallHeight,
        Quantity::BeadDimension,
        Quantity::Density,
        Quantity::MaterialPrice,
        Quantity::MaterialWeight,
        Quantity::CostPerArea,
        Quantity::PathLength,
    ];

    #[test]
    fn test_sqm_to_sqft() {
        let area: SqFt = SqM(100.0).into();
        assert_relative_eq!(area.0, 1076.39104, max_relative = 1e-12);
    }

    #[test]
    fn test_feet_to_millimeters_is_exact() {
        let mm: Millimeters = Feet(9.0).into();
        assert_relative_eq!(mm.0, 2743.2, max_relative = 1e-12);
    }

    #[test]
    fn test_tonne_price_is_higher_than_ton_price() {
        let per_tonne: UsdPerTonne = UsdPerTon(100.0).into();
        assert!(per_tonne.0 > 100.0);
        let back: UsdPerTon = per_tonne.into();
        assert_relative_eq!(back.0, 100.0, max_relative = 1e-12);
    }

    #[test]
    fn test_newtype_round_trips() {
        let ft: Feet = Meters::from(Feet(12.345)).into();
        assert_relative_eq!(ft.0, 12.345, max_relative = 1e-9);

        let pcf: Pcf = KgPerM3::from(Pcf(145.0)).into();
        assert_relative_eq!(pcf.0, 145.0, max_relative = 1e-9);

        let tons: ShortTons = Tonnes::from(ShortTons(64.1)).into();
        assert_relative_eq!(tons.0, 64.1, max_relative = 1e-9);

        let mm: Millimeters = Inches::from(Millimeters(20.0)).into();
        assert_relative_eq!(mm.0, 20.0, max_relative = 1e-9);
    }

    #[test]
    fn test_display_projection_round_trip() {
        for quantity in ALL_QUANTITIES {
            for system in [UnitSystem::Imperial, UnitSystem::Metric] {
                for canonical in [0.013, 1.0, 9.0, 145.0, 1500.0, 82_200.0] {
                    let shown = quantity.to_display(system, canonical);
                    let back = quantity.from_display(system, shown);
                    assert_relative_eq!(back, canonical, max_relative = 1e-9);
                }
            }
        }
    }

    #[test]
    fn test_repeated_toggling_does_not_drift() {
        let mut canonical = 1500.0;
        for _ in 0..1000 {
            let shown = Quantity::FloorArea.to_display(UnitSystem::Metric, canonical);
            canonical = Quantity::FloorArea.from_display(UnitSystem::Metric, shown);
        }
        assert_relative_eq!(canonical, 1500.0, max_relative = 1e-9);
    }

    #[test]
    fn test_bead_dimension_display() {
        let inches = Quantity::BeadDimension.to_display(UnitSystem::Imperial, 50.0);
        assert_relative_eq!(inches, 1.968505, max_relative = 1e-9);
        assert_eq!(Quantity::BeadDimension.to_display(UnitSystem::Metric, 50.0), 50.0);
    }

    #[test]
    fn test_unit_labels() {
        assert_eq!(Quantity::CostPerArea.unit_label(UnitSystem::Metric), "$/m²");
        assert_eq!(Quantity::PathLength.unit_label(UnitSystem::Imperial), "mi");
    }

    #[test]
    fn test_arithmetic() {
        let a = Feet(10.0);
        let b = Feet(5.0);
        assert_eq!((a + b).0, 15.0);
        assert_eq!((a - b).0, 5.0);
        assert_eq!((a * 2.0).0, 20.0);
        assert_eq!((a / 2.0).0, 5.0);
    }

    #[test]
    fn test_serialization() {
        let area = SqFt(1500.5);
        let json = serde_json::to_string(&area).unwrap();
        assert_eq!(json, "1500.5");

        let roundtrip: SqFt = serde_json::from_str(&json).unwrap();
        assert_eq!(area, roundtrip);

        let system = serde_json::to_string(&UnitSystem::Metric).unwrap();
        assert_eq!(system, "\"Metric\"");
    }
}
