//! Compiles the TOML reference catalogs in `data/` into Rust tables.
//!
//! The generated file lands in `OUT_DIR/generated.rs` and is pulled in by
//! `crate::generated`. Malformed catalog data fails the build.

use std::env;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use serde::Deserialize;

#[derive(Deserialize)]
struct PrinterFile {
    default: String,
    printer: Vec<PrinterRow>,
}

#[derive(Deserialize)]
struct PrinterRow {
    name: String,
    price_usd: f64,
    speed_mm_s: f64,
    setup_days: f64,
    teardown_days: f64,
    crew_size: u32,
    efficiency: f64,
    bead_width_mm: f64,
    layer_height_mm: f64,
}

#[derive(Deserialize)]
struct MaterialFile {
    default: String,
    material: Vec<MaterialRow>,
}

#[derive(Deserialize)]
struct MaterialRow {
    name: String,
    category: String,
    price_per_ton: f64,
    density_pcf: f64,
    waste_fraction: f64,
    open_time_min: f64,
}

fn category_variant(code: &str) -> &'static str {
    match code {
        "Premix" => "Premix",
        "Admix" => "Admix",
        "Green-Mix" => "GreenMix",
        "Admix-2K" => "Admix2K",
        other => panic!("unknown material category '{}' in data/materials.toml", other),
    }
}

fn read(path: &str) -> String {
    println!("cargo:rerun-if-changed={}", path);
    fs::read_to_string(path).unwrap_or_else(|e| panic!("failed to read {}: {}", path, e))
}

fn main() {
    let printers: PrinterFile = toml::from_str(&read("data/printers.toml"))
        .unwrap_or_else(|e| panic!("data/printers.toml: {}", e));
    let materials: MaterialFile = toml::from_str(&read("data/materials.toml"))
        .unwrap_or_else(|e| panic!("data/materials.toml: {}", e));

    assert!(!printers.printer.is_empty(), "printer catalog is empty");
    assert!(!materials.material.is_empty(), "material catalog is empty");
    assert!(
        printers.printer.iter().any(|p| p.name == printers.default),
        "default printer '{}' is not in the catalog",
        printers.default
    );
    assert!(
        materials.material.iter().any(|m| m.name == materials.default),
        "default material '{}' is not in the catalog",
        materials.default
    );

    let mut out = String::new();
    out.push_str("// @generated by build.rs from data/*.toml. Do not edit.\n\n");
    out.push_str("pub mod catalog_data {\n");
    out.push_str("    use crate::catalog::MaterialCategory;\n\n");
    out.push_str("    pub struct PrinterRow {\n");
    out.push_str("        pub name: &'static str,\n");
    out.push_str("        pub price_usd: f64,\n");
    out.push_str("        pub speed_mm_s: f64,\n");
    out.push_str("        pub setup_days: f64,\n");
    out.push_str("        pub teardown_days: f64,\n");
    out.push_str("        pub crew_size: u32,\n");
    out.push_str("        pub efficiency: f64,\n");
    out.push_str("        pub bead_width_mm: f64,\n");
    out.push_str("        pub layer_height_mm: f64,\n");
    out.push_str("    }\n\n");
    out.push_str("    pub struct MaterialRow {\n");
    out.push_str("        pub name: &'static str,\n");
    out.push_str("        pub category: MaterialCategory,\n");
    out.push_str("        pub price_per_ton: f64,\n");
    out.push_str("        pub density_pcf: f64,\n");
    out.push_str("        pub waste_fraction: f64,\n");
    out.push_str("        pub open_time_min: f64,\n");
    out.push_str("    }\n\n");

    writeln!(out, "    pub const DEFAULT_PRINTER: &str = {:?};", printers.default).unwrap();
    writeln!(out, "    pub const DEFAULT_MATERIAL: &str = {:?};\n", materials.default).unwrap();

    out.push_str("    pub const PRINTERS: &[PrinterRow] = &[\n");
    for p in &printers.printer {
        writeln!(
            out,
            "        PrinterRow {{ name: {:?}, price_usd: {:?}, speed_mm_s: {:?}, setup_days: {:?}, \
             teardown_days: {:?}, crew_size: {}, efficiency: {:?}, bead_width_mm: {:?}, layer_height_mm: {:?} }},",
            p.name,
            p.price_usd,
            p.speed_mm_s,
            p.setup_days,
            p.teardown_days,
            p.crew_size,
            p.efficiency,
            p.bead_width_mm,
            p.layer_height_mm,
        )
        .unwrap();
    }
    out.push_str("    ];\n\n");

    out.push_str("    pub const MATERIALS: &[MaterialRow] = &[\n");
    for m in &materials.material {
        writeln!(
            out,
            "        MaterialRow {{ name: {:?}, category: MaterialCategory::{}, price_per_ton: {:?}, \
             density_pcf: {:?}, waste_fraction: {:?}, open_time_min: {:?} }},",
            m.name,
            category_variant(&m.category),
            m.price_per_ton,
            m.density_pcf,
            m.waste_fraction,
            m.open_time_min,
        )
        .unwrap();
    }
    out.push_str("    ];\n");
    out.push_str("}\n");

    let out_dir = env::var("OUT_DIR").expect("OUT_DIR is set by cargo");
    let dest = Path::new(&out_dir).join("generated.rs");
    fs::write(&dest, out).unwrap_or_else(|e| panic!("failed to write {}: {}", dest.display(), e));
}
