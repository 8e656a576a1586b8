//! # Reference Catalogs
//!
//! Printer hardware and print material reference data. The built-in catalog
//! is compiled from `data/printers.toml` and `data/materials.toml`; callers
//! may also load their own catalog from TOML of the same shape.
//!
//! Lookups through [`Catalog::get_printer`] and [`Catalog::get_material`]
//! never fail: an unknown name falls back to the catalog default so the
//! engine stays total. Use [`Catalog::find_printer`] and
//! [`Catalog::find_material`] when a missing name should be an error.
//!
//! ## Example
//!
//! ```rust
//! use dcp_core::catalog::{self, Catalog};
//!
//! let printer = catalog::get_printer("COBOD BOD2");
//! assert_eq!(printer.crew_size, 3);
//!
//! // Unknown names fall back to the default entry
//! let fallback = catalog::get_material("No Such Mix");
//! assert_eq!(fallback.name, "Local Concrete + D.fab");
//!
//! assert!(Catalog::builtin().find_printer("No Such Printer").is_err());
//! ```

pub mod materials;
pub mod printers;

pub use materials::{MaterialCategory, MaterialSpec};
pub use printers::PrinterSpec;

use std::fs;
use std::path::Path;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};
use crate::generated::catalog_data;

static BUILTIN: Lazy<Catalog> = Lazy::new(Catalog::from_generated);

/// Printer and material reference data with default entries.
///
/// Entries keep their file order, which is also display order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Catalog {
    printers: Vec<PrinterSpec>,
    materials: Vec<MaterialSpec>,
    default_printer: usize,
    default_material: usize,
}

/// On-disk shape of a catalog file.
///
/// Printers and materials may live in one file or be split; a missing
/// `default_*` picks the first entry.
#[derive(Debug, Clone, Default, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    default_printer: Option<String>,
    #[serde(default)]
    default_material: Option<String>,
    #[serde(default)]
    printer: Vec<PrinterSpec>,
    #[serde(default)]
    material: Vec<MaterialSpec>,
}

impl Catalog {
    /// The catalog compiled into the crate.
    pub fn builtin() -> &'static Catalog {
        &BUILTIN
    }

    fn from_generated() -> Catalog {
        let printers: Vec<PrinterSpec> = catalog_data::PRINTERS.iter().map(PrinterSpec::from).collect();
        let materials: Vec<MaterialSpec> = catalog_data::MATERIALS.iter().map(MaterialSpec::from).collect();

        // build.rs has already checked that both defaults exist.
        let default_printer = position_of(&printers, catalog_data::DEFAULT_PRINTER, |p| &p.name).unwrap_or(0);
        let default_material = position_of(&materials, catalog_data::DEFAULT_MATERIAL, |m| &m.name).unwrap_or(0);

        Catalog {
            printers,
            materials,
            default_printer,
            default_material,
        }
    }

    /// Build a catalog from explicit entries.
    ///
    /// The first entry of each list is the default. Both lists must be non-empty.
    pub fn new(printers: Vec<PrinterSpec>, materials: Vec<MaterialSpec>) -> CalcResult<Self> {
        if printers.is_empty() {
            return Err(CalcError::EmptyCatalog { kind: "printer".to_string() });
        }
        if materials.is_empty() {
            return Err(CalcError::EmptyCatalog { kind: "material".to_string() });
        }
        Ok(Catalog {
            printers,
            materials,
            default_printer: 0,
            default_material: 0,
        })
    }

    /// Parse a catalog from TOML.
    ///
    /// ```toml
    /// default_printer = "Shop Gantry"
    ///
    /// [[printer]]
    /// name = "Shop Gantry"
    /// # ... PrinterSpec fields
    ///
    /// [[material]]
    /// name = "Yard Mix"
    /// category = "Admix"
    /// # ... MaterialSpec fields
    /// ```
    pub fn from_toml_str(text: &str) -> CalcResult<Self> {
        let file: CatalogFile = toml::from_str(text)?;
        let mut catalog = Catalog::new(file.printer, file.material)?;

        if let Some(name) = file.default_printer {
            catalog.default_printer = position_of(&catalog.printers, &name, |p| &p.name)
                .ok_or_else(|| CalcError::printer_not_found(name))?;
        }
        if let Some(name) = file.default_material {
            catalog.default_material = position_of(&catalog.materials, &name, |m| &m.name)
                .ok_or_else(|| CalcError::material_not_found(name))?;
        }
        Ok(catalog)
    }

    /// Read and parse a catalog TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> CalcResult<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| {
            CalcError::file_error("read catalog", path.display().to_string(), e.to_string())
        })?;
        let catalog = Catalog::from_toml_str(&text)?;
        tracing::debug!(
            path = %path.display(),
            printers = catalog.printers.len(),
            materials = catalog.materials.len(),
            "loaded catalog"
        );
        Ok(catalog)
    }

    /// Printer by name, falling back to the default printer.
    pub fn get_printer(&self, name: &str) -> &PrinterSpec {
        self.find_printer(name).unwrap_or_else(|_| {
            tracing::debug!(requested = name, fallback = %self.default_printer().name, "printer not in catalog");
            self.default_printer()
        })
    }

    /// Material by name, falling back to the default material.
    pub fn get_material(&self, name: &str) -> &MaterialSpec {
        self.find_material(name).unwrap_or_else(|_| {
            tracing::debug!(requested = name, fallback = %self.default_material().name, "material not in catalog");
            self.default_material()
        })
    }

    /// Printer by name, or [`CalcError::PrinterNotFound`].
    ///
    /// Exact match first, then case-insensitive.
    pub fn find_printer(&self, name: &str) -> CalcResult<&PrinterSpec> {
        position_of(&self.printers, name, |p| &p.name)
            .map(|i| &self.printers[i])
            .ok_or_else(|| CalcError::printer_not_found(name))
    }

    /// Material by name, or [`CalcError::MaterialNotFound`].
    pub fn find_material(&self, name: &str) -> CalcResult<&MaterialSpec> {
        position_of(&self.materials, name, |m| &m.name)
            .map(|i| &self.materials[i])
            .ok_or_else(|| CalcError::material_not_found(name))
    }

    /// The default printer entry
    pub fn default_printer(&self) -> &PrinterSpec {
        &self.printers[self.default_printer]
    }

    /// The default material entry
    pub fn default_material(&self) -> &MaterialSpec {
        &self.materials[self.default_material]
    }

    /// Printer names in display order
    pub fn printer_names(&self) -> Vec<&str> {
        self.printers.iter().map(|p| p.name.as_str()).collect()
    }

    /// Material names in display order
    pub fn material_names(&self) -> Vec<&str> {
        self.materials.iter().map(|m| m.name.as_str()).collect()
    }

    /// All printers in display order
    pub fn printers(&self) -> &[PrinterSpec] {
        &self.printers
    }

    /// All materials in display order
    pub fn materials(&self) -> &[MaterialSpec] {
        &self.materials
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Catalog::builtin().clone()
    }
}

fn position_of<T>(items: &[T], name: &str, key: impl Fn(&T) -> &String) -> Option<usize> {
    items
        .iter()
        .position(|item| key(item) == name)
        .or_else(|| items.iter().position(|item| key(item).eq_ignore_ascii_case(name)))
}

/// Printer from the built-in catalog, with fallback to the default.
pub fn get_printer(name: &str) -> PrinterSpec {
    Catalog::builtin().get_printer(name).clone()
}

/// Material from the built-in catalog, with fallback to the default.
pub fn get_material(name: &str) -> MaterialSpec {
    Catalog::builtin().get_material(name).clone()
}

/// Names of all built-in printers
pub fn list_printer_names() -> Vec<String> {
    Catalog::builtin().printer_names().into_iter().map(String::from).collect()
}

/// Names of all built-in materials
pub fn list_material_names() -> Vec<String> {
    Catalog::builtin().material_names().into_iter().map(String::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_sizes() {
        let catalog = Catalog::builtin();
        assert_eq!(catalog.printers().len(), 10);
        assert_eq!(catalog.materials().len(), 9);
    }

    #[test]
    fn test_builtin_defaults() {
        let catalog = Catalog::builtin();
        assert_eq!(catalog.default_printer().name, "COBOD BOD2");
        assert_eq!(catalog.default_material().name, "Local Concrete + D.fab");
    }

    #[test]
    fn test_printer_lookup() {
        let p = get_printer("Black Buffalo NEXCON 1G");
        assert_eq!(p.price_usd, 850_000.0);
        assert_eq!(p.speed_mm_s, 200.0);
        assert_eq!(p.crew_size, 3);
        assert_eq!(p.mobilization_days(), 5.0);
    }

    #[test]
    fn test_material_lookup() {
        let m = get_material("Coral 2K Concrete (Local)");
        assert_eq!(m.category, MaterialCategory::Admix2K);
        assert_eq!(m.price_per_ton, 60.0);
        assert_eq!(m.waste_fraction, 0.12);
    }

    #[test]
    fn test_non_ascii_name() {
        let m = get_material("Sika Sikacrete®-751 3D");
        assert_eq!(m.price_per_ton, 450.0);
    }

    #[test]
    fn test_case_insensitive_lookup() {
        let p = Catalog::builtin().find_printer("wasp crane").unwrap();
        assert_eq!(p.name, "WASP Crane");
    }

    #[test]
    fn test_fallback_to_default() {
        assert_eq!(get_printer("Imaginary 9000").name, "COBOD BOD2");
        assert_eq!(get_material("").name, "Local Concrete + D.fab");
    }

    #[test]
    fn test_strict_lookup_errors() {
        let err = Catalog::builtin().find_material("Imaginary Mix").unwrap_err();
        assert_eq!(err, CalcError::material_not_found("Imaginary Mix"));
    }

    #[test]
    fn test_names_in_file_order() {
        let printers = list_printer_names();
        assert_eq!(printers.first().map(String::as_str), Some("COBOD BOD2"));
        assert_eq!(printers.last().map(String::as_str), Some("SQ4D ARCS"));

        let materials = list_material_names();
        assert_eq!(materials[2], "Local Concrete + D.fab");
    }

    #[test]
    fn test_catalog_values_in_range() {
        for p in Catalog::builtin().printers() {
            assert!(p.efficiency > 0.0 && p.efficiency <= 1.0, "{}", p.name);
            assert!(p.bead_width_mm > 0.0 && p.layer_height_mm > 0.0, "{}", p.name);
            assert!(p.crew_size >= 1, "{}", p.name);
        }
        for m in Catalog::builtin().materials() {
            assert!((0.0..=1.0).contains(&m.waste_fraction), "{}", m.name);
            assert!(m.density_pcf > 0.0, "{}", m.name);
        }
    }

    #[test]
    fn test_empty_catalog_rejected() {
        let err = Catalog::new(Vec::new(), Catalog::builtin().materials().to_vec()).unwrap_err();
        assert_eq!(err.error_code(), "EMPTY_CATALOG");
    }

    #[test]
    fn test_from_toml_str() {
        let text = r#"
            default_material = "Yard Mix"

            [[printer]]
            name = "Shop Gantry"
            price_usd = 120000.0
            speed_mm_s = 150.0
            setup_days = 1.0
            teardown_days = 1.0
            crew_size = 2
            efficiency = 0.6
            bead_width_mm = 40.0
            layer_height_mm = 15.0

            [[material]]
            name = "Bagged Mortar"
            category = "Premix"
            price_per_ton = 400.0
            density_pcf = 135.0
            waste_fraction = 0.04

            [[material]]
            name = "Yard Mix"
            category = "Green-Mix"
            price_per_ton = 45.0
            density_pcf = 144.0
            waste_fraction = 0.09
            open_time_min = 20.0
        "#;

        let catalog = Catalog::from_toml_str(text).unwrap();
        assert_eq!(catalog.default_printer().name, "Shop Gantry");
        assert_eq!(catalog.default_material().name, "Yard Mix");
        assert_eq!(catalog.default_material().category, MaterialCategory::GreenMix);
        assert_eq!(catalog.find_material("Bagged Mortar").unwrap().open_time_min, 0.0);
        assert_eq!(catalog.get_printer("missing").name, "Shop Gantry");
    }

    #[test]
    fn test_from_toml_str_unknown_default() {
        let text = r#"
            default_printer = "Ghost"

            [[printer]]
            name = "Shop Gantry"
            price_usd = 120000.0
            speed_mm_s = 150.0
            setup_days = 1.0
            teardown_days = 1.0
            crew_size = 2
            efficiency = 0.6
            bead_width_mm = 40.0
            layer_height_mm = 15.0

            [[material]]
            name = "Yard Mix"
            category = "Admix"
            price_per_ton = 45.0
            density_pcf = 144.0
            waste_fraction = 0.09
        "#;

        let err = Catalog::from_toml_str(text).unwrap_err();
        assert_eq!(err, CalcError::printer_not_found("Ghost"));
    }

    #[test]
    fn test_from_toml_str_empty() {
        let err = Catalog::from_toml_str("").unwrap_err();
        assert_eq!(err.error_code(), "EMPTY_CATALOG");
    }

    #[test]
    fn test_from_toml_file_missing() {
        let err = Catalog::from_toml_file("/no/such/catalog.toml").unwrap_err();
        assert_eq!(err.error_code(), "FILE_ERROR");
        assert!(err.to_string().contains("read catalog"));
    }
}
