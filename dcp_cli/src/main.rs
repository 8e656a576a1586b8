//! # Printcast CLI
//!
//! Terminal front end for the 3DCP cost engine. Assembles inputs from the
//! catalog, optional assumption/override JSON files and command-line flags,
//! then prints a text report, a CSV table or raw JSON.
//!
//! Scalar flags are read in the active unit system (`--metric` switches
//! floor area to m², heights to m, bead/layer to mm, density to kg/m³ and
//! material price to $/tonne) and converted to canonical units before the
//! engine runs.
//!
//! Logs go to stderr; set `RUST_LOG` or pass `--verbose` to see engine stages.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::de::DeserializeOwned;
use tracing_subscriber::EnvFilter;

use dcp_core::calculations::{
    build_pnl, calculate_costs, compare_scenarios, compare_to_market, CostInputs, CostOverrides,
    ProjectAssumptions, ScenarioSpec, MAX_SCENARIOS,
};
use dcp_core::catalog::Catalog;
use dcp_core::finance::{monthly_payment, total_interest, AcquisitionMode};
use dcp_core::report::{self, format_usd, Table};
use dcp_core::units::{Quantity, UnitSystem};

#[derive(Parser)]
#[command(name = "printcast")]
#[command(about = "Cost estimates for 3D-printed concrete wall packages")]
#[command(version)]
struct Cli {
    /// Enter and display values in metric units
    #[arg(long, global = true)]
    metric: bool,

    /// Log engine stages to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Load printers and materials from a TOML catalog instead of the built-in one
    #[arg(long, global = true, value_name = "TOML")]
    catalog: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Estimate per-home and project costs
    Estimate {
        #[command(flatten)]
        project: ProjectArgs,

        /// Conventional build cost per floor area ($/ft² or $/m²) to benchmark against
        #[arg(long)]
        benchmark: Option<f64>,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Per-home P&L at a sale price
    Pnl {
        #[command(flatten)]
        project: ProjectArgs,

        /// Sale price per home (USD)
        #[arg(long)]
        sale_price: f64,

        /// Overhead per home (USD); defaults to the project assumption
        #[arg(long)]
        overhead: Option<f64>,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Compare up to four printer/material scenarios side by side
    Compare {
        /// JSON file with an array of scenarios ({label, printer, material, overrides})
        #[arg(long, value_name = "JSON", conflicts_with = "printers")]
        scenarios: Option<PathBuf>,

        /// Quick mode: one scenario per named printer, default material
        #[arg(long = "printer", value_name = "NAME")]
        printers: Vec<String>,

        /// Project assumptions JSON shared by every scenario
        #[arg(long, value_name = "JSON")]
        assumptions: Option<PathBuf>,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// List catalog printers
    Printers {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// List catalog materials
    Materials {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Monthly payment on an amortizing printer loan
    Payment {
        /// Amount financed (USD)
        principal: f64,

        /// Annual interest rate as a fraction (0.08 = 8%)
        #[arg(long, default_value = "0.08")]
        rate: f64,

        /// Term in months
        #[arg(long, default_value = "60")]
        term: u32,
    },
}

#[derive(Args)]
struct OutputArgs {
    /// Print JSON
    #[arg(long, conflicts_with = "csv")]
    json: bool,

    /// Print a CSV table
    #[arg(long)]
    csv: bool,
}

#[derive(Args)]
struct ProjectArgs {
    /// Printer name (catalog default when omitted)
    #[arg(short, long)]
    printer: Option<String>,

    /// Material name (catalog default when omitted)
    #[arg(short = 'm', long)]
    material: Option<String>,

    /// Project assumptions JSON
    #[arg(long, value_name = "JSON")]
    assumptions: Option<PathBuf>,

    /// Sparse overrides JSON (canonical units); flags below win over it
    #[arg(long, value_name = "JSON")]
    overrides: Option<PathBuf>,

    /// Number of homes
    #[arg(long)]
    homes: Option<u32>,

    /// Printer relocations
    #[arg(long)]
    moves: Option<u32>,

    /// Floor area per home (ft² or m²)
    #[arg(long)]
    area: Option<f64>,

    /// Wall height (ft or m)
    #[arg(long)]
    wall_height: Option<f64>,

    /// Layer height (in or mm)
    #[arg(long)]
    layer_height: Option<f64>,

    /// Bead width (in or mm)
    #[arg(long)]
    bead_width: Option<f64>,

    /// Print speed (mm/s)
    #[arg(long)]
    speed: Option<f64>,

    /// Operating efficiency (0-1)
    #[arg(long)]
    efficiency: Option<f64>,

    /// Geometric complexity speed penalty (0-0.95)
    #[arg(long)]
    complexity: Option<f64>,

    /// Material price ($/ton or $/tonne)
    #[arg(long)]
    material_price: Option<f64>,

    /// Material density (lb/ft³ or kg/m³)
    #[arg(long)]
    density: Option<f64>,

    /// Labor rate ($/hr)
    #[arg(long)]
    labor_rate: Option<f64>,

    /// Printer acquisition mode
    #[arg(long, value_enum)]
    acquisition: Option<Acquisition>,

    /// Fraction of the printer price paid up front (0-1)
    #[arg(long)]
    upfront: Option<f64>,

    /// Monthly loan or lease payment (USD); derived from loan terms when omitted
    #[arg(long)]
    monthly_payment: Option<f64>,
}

#[derive(Clone, Copy, ValueEnum)]
enum Acquisition {
    Cash,
    Financed,
    Lease,
}

impl From<Acquisition> for AcquisitionMode {
    fn from(value: Acquisition) -> Self {
        match value {
            Acquisition::Cash => AcquisitionMode::OwnedCash,
            Acquisition::Financed => AcquisitionMode::OwnedFinanced,
            Acquisition::Lease => AcquisitionMode::Leased,
        }
    }
}

impl ProjectArgs {
    /// Flag values as canonical-unit overrides.
    fn flag_overrides(&self, system: UnitSystem) -> CostOverrides {
        let canonical = |q: Quantity, v: Option<f64>| v.map(|shown| q.from_display(system, shown));
        CostOverrides {
            num_homes: self.homes,
            printer_moves: self.moves,
            floor_area_sqft: canonical(Quantity::FloorArea, self.area),
            wall_height_ft: canonical(Quantity::WallHeight, self.wall_height),
            layer_height_mm: canonical(Quantity::BeadDimension, self.layer_height),
            bead_width_mm: canonical(Quantity::BeadDimension, self.bead_width),
            print_speed_mm_s: self.speed,
            efficiency: self.efficiency,
            complexity_penalty: self.complexity,
            material_price_per_ton: canonical(Quantity::MaterialPrice, self.material_price),
            density_pcf: canonical(Quantity::Density, self.density),
            labor_rate_per_hr: self.labor_rate,
            acquisition_mode: self.acquisition.map(AcquisitionMode::from),
            upfront_fraction: self.upfront,
            monthly_payment: self.monthly_payment,
            ..Default::default()
        }
    }

    /// Catalog → assumptions → overrides file → flags.
    fn assemble(&self, catalog: &Catalog, system: UnitSystem) -> Result<(CostInputs, ProjectAssumptions)> {
        let printer = match &self.printer {
            Some(name) => catalog.find_printer(name)?,
            None => catalog.default_printer(),
        };
        let material = match &self.material {
            Some(name) => catalog.find_material(name)?,
            None => catalog.default_material(),
        };
        let assumptions: ProjectAssumptions = read_json_or_default(self.assumptions.as_deref())?;
        let file_overrides: CostOverrides = read_json_or_default(self.overrides.as_deref())?;
        let overrides = file_overrides.layered(&self.flag_overrides(system));

        tracing::debug!(
            printer = %printer.name,
            material = %material.name,
            overridden = !overrides.is_empty(),
            "assembling inputs"
        );
        let inputs = CostInputs::assemble(printer, material, &assumptions, &overrides);
        Ok((inputs, assumptions))
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let system = UnitSystem::from_metric_flag(cli.metric);
    let loaded = match &cli.catalog {
        Some(path) => Some(load_catalog(path)?),
        None => None,
    };
    let catalog = loaded.as_ref().unwrap_or_else(|| Catalog::builtin());

    match cli.command {
        Commands::Estimate {
            project,
            benchmark,
            output,
        } => {
            let (inputs, _) = project.assemble(catalog, system)?;
            let result = calculate_costs(&inputs, system.is_metric());
            let market = benchmark.map(|per_area| compare_to_market(&result, per_area, system));

            if output.json {
                let body = serde_json::json!({
                    "inputs": inputs,
                    "result": result,
                    "market": market,
                });
                println!("{}", serde_json::to_string_pretty(&body)?);
            } else if output.csv {
                print!("{}", report::components_table(&result).to_csv());
            } else {
                print!("{}", report::render_estimate(&inputs, &result, system));
                if let Some(market) = &market {
                    println!();
                    print!("{}", report::render_market(market));
                }
            }
        }

        Commands::Pnl {
            project,
            sale_price,
            overhead,
            output,
        } => {
            let (inputs, _) = project.assemble(catalog, system)?;
            let result = calculate_costs(&inputs, system.is_metric());
            let pnl = build_pnl(&result, sale_price, overhead.unwrap_or(inputs.overhead_per_home));

            if output.json {
                println!("{}", serde_json::to_string_pretty(&pnl)?);
            } else if output.csv {
                print!("{}", report::pnl_table(&pnl).to_csv());
            } else {
                print!("{}", report::render_pnl(&pnl));
            }
        }

        Commands::Compare {
            scenarios,
            printers,
            assumptions,
            output,
        } => {
            let specs: Vec<ScenarioSpec> = match scenarios {
                Some(path) => read_json(&path)?,
                None if printers.is_empty() => bail!("pass --scenarios <JSON> or at least one --printer"),
                None => printers
                    .iter()
                    .map(|name| ScenarioSpec::new(name.clone()).with_printer(name.clone()))
                    .collect(),
            };
            if specs.len() > MAX_SCENARIOS {
                bail!("at most {} scenarios can be compared, got {}", MAX_SCENARIOS, specs.len());
            }
            let assumptions: ProjectAssumptions = read_json_or_default(assumptions.as_deref())?;
            let comparison = compare_scenarios(catalog, &assumptions, &specs, system.is_metric())?;

            if output.json {
                println!("{}", serde_json::to_string_pretty(&comparison)?);
            } else if output.csv {
                print!("{}", report::comparison_table(&comparison).to_csv());
            } else {
                print!("{}", report::comparison_table(&comparison));
                if let Some(best) = comparison.cheapest() {
                    println!();
                    println!(
                        "Lowest accrual cost: {} at {} per home",
                        best.label,
                        format_usd(best.result.accrual_total_per_home)
                    );
                }
            }
        }

        Commands::Printers { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(catalog.printers())?);
            } else {
                print!("{}", printers_table(catalog, system));
            }
        }

        Commands::Materials { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(catalog.materials())?);
            } else {
                print!("{}", materials_table(catalog, system));
            }
        }

        Commands::Payment {
            principal,
            rate,
            term,
        } => {
            let payment = monthly_payment(principal, rate, term);
            println!("Monthly payment: ${:.2}", payment);
            println!("Total interest:  {}", format_usd(total_interest(principal, rate, term)));
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_catalog(path: &Path) -> Result<Catalog> {
    Catalog::from_toml_file(path).with_context(|| format!("invalid catalog {}", path.display()))
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("invalid JSON in {}", path.display()))
}

fn read_json_or_default<T: DeserializeOwned + Default>(path: Option<&Path>) -> Result<T> {
    match path {
        Some(path) => read_json(path),
        None => Ok(T::default()),
    }
}

fn printers_table(catalog: &Catalog, system: UnitSystem) -> Table {
    let dim = Quantity::BeadDimension.unit_label(system);
    let mut table = Table::new(vec![
        "Printer".to_string(),
        "Price".to_string(),
        "Speed (mm/s)".to_string(),
        "Crew".to_string(),
        "Efficiency".to_string(),
        format!("Bead ({})", dim),
        format!("Layer ({})", dim),
        "Setup+Teardown (days)".to_string(),
    ]);
    for p in catalog.printers() {
        table.push_row(vec![
            p.name.clone(),
            format_usd(p.price_usd),
            format!("{:.0}", p.speed_mm_s),
            p.crew_size.to_string(),
            format!("{:.0}%", p.efficiency * 100.0),
            format!("{:.2}", Quantity::BeadDimension.to_display(system, p.bead_width_mm)),
            format!("{:.2}", Quantity::BeadDimension.to_display(system, p.layer_height_mm)),
            format!("{:.1}", p.mobilization_days()),
        ]);
    }
    table
}

fn materials_table(catalog: &Catalog, system: UnitSystem) -> Table {
    let mut table = Table::new(vec![
        "Material".to_string(),
        "Category".to_string(),
        format!("Price ({})", Quantity::MaterialPrice.unit_label(system)),
        format!("Density ({})", Quantity::Density.unit_label(system)),
        "Waste".to_string(),
        "Open Time (min)".to_string(),
    ]);
    for m in catalog.materials() {
        table.push_row(vec![
            m.name.clone(),
            m.category.display_name().to_string(),
            format!("{:.0}", Quantity::MaterialPrice.to_display(system, m.price_per_ton)),
            format!("{:.0}", Quantity::Density.to_display(system, m.density_pcf)),
            format!("{:.0}%", m.waste_fraction * 100.0),
            format!("{:.0}", m.open_time_min),
        ]);
    }
    table
}
