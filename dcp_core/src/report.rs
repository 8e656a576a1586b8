//! # Reports
//!
//! Plain-text summaries for terminals and a two-dimensional [`Table`] for
//! machine-readable export.
//!
//! CSV export contract: header row first, one row per metric or line item,
//! column order matching display order, numbers as plain decimals with no
//! thousands separators.
//!
//! ## Example
//!
//! ```rust
//! use dcp_core::calculations::{build_pnl, calculate_costs, CostInputs};
//! use dcp_core::report::pnl_table;
//!
//! let result = calculate_costs(&CostInputs::default(), false);
//! let csv = pnl_table(&build_pnl(&result, 60_000.0, 5_000.0)).to_csv();
//!
//! assert!(csv.starts_with("Line Item,Cash P&L,Accounting P&L\n"));
//! ```

use std::fmt::{self, Write};

use serde::{Deserialize, Serialize};

use crate::calculations::{
    Cell, Comparison, CostInputs, CostResult, MarketComparison, PnlStatement,
};
use crate::units::{Quantity, UnitSystem};

/// Header row plus data rows, all as strings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    /// Comma-separated export with a trailing newline per row.
    pub fn to_csv(&self) -> String {
        let mut out = String::new();
        for row in std::iter::once(&self.headers).chain(self.rows.iter()) {
            let line: Vec<String> = row.iter().map(|field| csv_field(field)).collect();
            out.push_str(&line.join(","));
            out.push('\n');
        }
        out
    }
}

impl fmt::Display for Table {
    /// Left-aligned first column, right-aligned value columns.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let columns = self.headers.len();
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.chars().count()).collect();
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate().take(columns) {
                widths[i] = widths[i].max(cell.chars().count());
            }
        }

        let write_row = |f: &mut fmt::Formatter<'_>, row: &[String]| -> fmt::Result {
            for (i, cell) in row.iter().enumerate().take(columns) {
                if i > 0 {
                    f.write_str("  ")?;
                }
                if i == 0 {
                    write!(f, "{:<width$}", cell, width = widths[i])?;
                } else {
                    write!(f, "{:>width$}", cell, width = widths[i])?;
                }
            }
            writeln!(f)
        };

        write_row(f, &self.headers)?;
        let rule: usize = widths.iter().sum::<usize>() + 2 * columns.saturating_sub(1);
        writeln!(f, "{}", "-".repeat(rule))?;
        for row in &self.rows {
            write_row(f, row)?;
        }
        Ok(())
    }
}

fn csv_field(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Plain decimal for export
fn plain(value: f64) -> String {
    format!("{:.2}", value)
}

/// Dollar amount with thousands separators, e.g. `$-1,234`
pub fn format_usd(value: f64) -> String {
    let rounded = value.round();
    let digits = format!("{:.0}", rounded.abs());
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if rounded < 0.0 {
        format!("-${}", grouped)
    } else {
        format!("${}", grouped)
    }
}

/// P&L line items as a three-column table.
pub fn pnl_table(pnl: &PnlStatement) -> Table {
    let mut table = Table::new(vec![
        "Line Item".to_string(),
        "Cash P&L".to_string(),
        "Accounting P&L".to_string(),
    ]);
    for line in &pnl.lines {
        table.push_row(vec![
            line.kind.display_name().to_string(),
            plain(line.cash),
            plain(line.accrual),
        ]);
    }
    table
}

/// Comparison rows as a metric-by-scenario table.
pub fn comparison_table(comparison: &Comparison) -> Table {
    let mut headers = vec!["Metric".to_string()];
    headers.extend(comparison.scenarios.iter().map(|s| s.label.clone()));

    let mut table = Table::new(headers);
    for row in &comparison.table {
        let mut cells = vec![row.label.clone()];
        cells.extend(row.values.iter().map(|cell| match cell {
            Cell::Number(v) => plain(*v),
            Cell::Text(s) => s.clone(),
        }));
        table.push_row(cells);
    }
    table
}

/// Per-home cost components with their share of the accrual total.
pub fn components_table(result: &CostResult) -> Table {
    let mut table = Table::new(vec![
        "Category".to_string(),
        "Cost".to_string(),
        "% of Total".to_string(),
    ]);
    for (component, cost) in result.components() {
        table.push_row(vec![
            component.display_name().to_string(),
            plain(cost),
            format!("{:.1}", result.share_of_total(component) * 100.0),
        ]);
    }
    table
}

/// Text summary of one estimate.
pub struct EstimateReport<'a> {
    pub inputs: &'a CostInputs,
    pub result: &'a CostResult,
    pub system: UnitSystem,
}

impl fmt::Display for EstimateReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (i, r, system) = (self.inputs, self.result, self.system);
        let area = Quantity::FloorArea;

        writeln!(
            f,
            "3DCP wall estimate: {} home(s) of {:.0} {}, {} printer move(s), {}",
            i.num_homes,
            area.to_display(system, i.floor_area_sqft),
            area.unit_label(system),
            i.printer_moves,
            i.acquisition_mode
        )?;
        writeln!(f)?;

        writeln!(f, "Per-home cost")?;
        for (component, cost) in r.components() {
            writeln!(f, "  {:<20} {:>12}", component.display_name(), format_usd(cost))?;
        }
        writeln!(f, "  {:<20} {:>12}", "Cash COGS", format_usd(r.cash_cogs_per_home))?;
        writeln!(f, "  {:<20} {:>12}", "Accrual total", format_usd(r.accrual_total_per_home))?;
        if r.debt_service_per_home > 0.0 {
            writeln!(f, "  {:<20} {:>12}", "Debt service", format_usd(r.debt_service_per_home))?;
        }
        writeln!(
            f,
            "  Cost per area: {:.2} {} (cash {:.2})",
            r.cost_per_area,
            Quantity::CostPerArea.unit_label(r.unit_system),
            r.cash_cost_per_area
        )?;
        writeln!(f)?;

        writeln!(f, "Project")?;
        writeln!(f, "  Duration: {:.1} days ({} month(s))", r.project_days, r.project_months)?;
        writeln!(f, "  Project cash total: {}", format_usd(r.project_cash_total))?;
        writeln!(f, "  Peak cash required: {}", format_usd(r.peak_cash_required))?;
        writeln!(f)?;

        writeln!(f, "Print job statistics")?;
        writeln!(f, "  Print time: {:.1} hours", r.print_time_hours)?;
        writeln!(
            f,
            "  Material weight: {:.1} {}",
            r.material_weight(system),
            Quantity::MaterialWeight.unit_label(system)
        )?;
        writeln!(
            f,
            "  Nozzle travel: {:.2} {}",
            r.nozzle_travel(system),
            Quantity::PathLength.unit_label(system)
        )?;
        writeln!(f, "  Print layers: {}", r.layer_count)?;
        writeln!(f, "  Flow rate: {:.1} L/min", r.flow_rate_lpm)?;

        if !r.warnings.is_empty() {
            writeln!(f)?;
            writeln!(f, "Warnings")?;
            for warning in &r.warnings {
                writeln!(f, "  ! {}", warning)?;
            }
        }
        Ok(())
    }
}

/// Render one estimate as text.
pub fn render_estimate(inputs: &CostInputs, result: &CostResult, system: UnitSystem) -> String {
    EstimateReport {
        inputs,
        result,
        system,
    }
    .to_string()
}

/// Render the P&L table followed by its metrics.
pub fn render_pnl(pnl: &PnlStatement) -> String {
    let mut out = pnl_table(pnl).to_string();
    let m = &pnl.metrics;
    // Writing to a String never fails
    let _ = writeln!(out);
    let _ = writeln!(out, "Gross margin:      {:>6.1}%", m.gross_margin * 100.0);
    let _ = writeln!(out, "EBITDA margin:     {:>6.1}%", m.ebitda_margin * 100.0);
    let _ = writeln!(out, "EBIT margin:       {:>6.1}%", m.ebit_margin * 100.0);
    let _ = writeln!(out, "Cash COGS:         {:>6.1}% of revenue", m.cash_cogs_pct * 100.0);
    if m.debt_service_per_home > 0.0 {
        let _ = writeln!(out, "Debt service:      {}", format_usd(m.debt_service_per_home));
    }
    let _ = writeln!(out, "Net cash per home: {}", format_usd(m.net_cash_per_home));
    match m.payback_homes {
        Some(homes) => {
            let _ = writeln!(out, "Printer payback:   {:.1} homes", homes);
        }
        None => out.push_str("Printer payback:   never (negative cash margin)\n"),
    }
    out
}

/// Render a market benchmark line.
pub fn render_market(market: &MarketComparison) -> String {
    let unit = Quantity::CostPerArea.unit_label(market.unit_system);
    let verdict = if market.is_cheaper() {
        format!(
            "saves {} per home ({:.1}% cheaper)",
            format_usd(market.savings_per_home),
            market.savings_fraction * 100.0
        )
    } else {
        format!(
            "costs {} more per home ({:.1}% premium)",
            format_usd(-market.savings_per_home),
            -market.savings_fraction * 100.0
        )
    };
    format!(
        "Market benchmark: print {:.2} {} vs market {:.2} {}; printing {}\n",
        market.print_cost_per_area, unit, market.traditional_cost_per_area, unit, verdict
    )
}
