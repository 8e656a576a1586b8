//! # Per-Home P&L
//!
//! Projects a cost result and a sale price onto a profit-and-loss statement
//! with two columns:
//!
//! - **Cash**: revenue less cash COGS and overhead; no depreciation
//! - **Accounting**: the same, less printer depreciation
//!
//! Costs are carried as negative amounts so every column sums top to bottom.
//! Margins are guarded: a zero sale price yields zero margins rather than
//! an error.
//!
//! ## Example
//!
//! ```rust
//! use dcp_core::calculations::{build_pnl, calculate_costs, CostInputs};
//!
//! let result = calculate_costs(&CostInputs::default(), false);
//! let pnl = build_pnl(&result, 60_000.0, 5_000.0);
//!
//! assert!(pnl.metrics.ebit_margin <= pnl.metrics.ebitda_margin);
//! ```

use serde::{Deserialize, Serialize};

use crate::calculations::cost::{safe_div, CostResult};

/// P&L line identifiers in statement order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PnlLineKind {
    Revenue,
    Material,
    Labor,
    Logistics,
    Integration,
    LeaseExpense,
    CashCogs,
    GrossProfit,
    Overhead,
    Ebitda,
    Depreciation,
    Ebit,
}

impl PnlLineKind {
    /// All lines in statement order
    pub const ALL: [PnlLineKind; 12] = [
        PnlLineKind::Revenue,
        PnlLineKind::Material,
        PnlLineKind::Labor,
        PnlLineKind::Logistics,
        PnlLineKind::Integration,
        PnlLineKind::LeaseExpense,
        PnlLineKind::CashCogs,
        PnlLineKind::GrossProfit,
        PnlLineKind::Overhead,
        PnlLineKind::Ebitda,
        PnlLineKind::Depreciation,
        PnlLineKind::Ebit,
    ];

    /// Get display name
    pub fn display_name(&self) -> &'static str {
        match self {
            PnlLineKind::Revenue => "Revenue (Sale Price)",
            PnlLineKind::Material => "Material",
            PnlLineKind::Labor => "Labor",
            PnlLineKind::Logistics => "Logistics",
            PnlLineKind::Integration => "Integration (BOS)",
            PnlLineKind::LeaseExpense => "Printer Lease",
            PnlLineKind::CashCogs => "Cash COGS",
            PnlLineKind::GrossProfit => "Gross Profit",
            PnlLineKind::Overhead => "Overhead",
            PnlLineKind::Ebitda => "EBITDA",
            PnlLineKind::Depreciation => "Printer D&A",
            PnlLineKind::Ebit => "EBIT",
        }
    }

    /// Subtotal lines (bolded in reports)
    pub fn is_subtotal(&self) -> bool {
        matches!(
            self,
            PnlLineKind::CashCogs | PnlLineKind::GrossProfit | PnlLineKind::Ebitda | PnlLineKind::Ebit
        )
    }
}

impl std::fmt::Display for PnlLineKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// One statement row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PnlLine {
    pub kind: PnlLineKind,
    /// Cash view (USD per home)
    pub cash: f64,
    /// Accounting view (USD per home)
    pub accrual: f64,
}

/// Ratios and cash metrics derived from the statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PnlMetrics {
    /// Gross profit ÷ revenue
    pub gross_margin: f64,
    /// EBITDA ÷ revenue
    pub ebitda_margin: f64,
    /// Accounting EBIT ÷ revenue
    pub ebit_margin: f64,
    /// Cash COGS ÷ revenue
    pub cash_cogs_pct: f64,
    /// Loan payments allocated per home
    pub debt_service_per_home: f64,
    /// EBITDA less debt service
    pub net_cash_per_home: f64,
    /// Homes needed to recover the upfront printer cash; `None` when each
    /// home loses cash
    pub payback_homes: Option<f64>,
}

/// Two-column per-home profit and loss.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PnlStatement {
    /// Sale price per home
    pub sale_price: f64,
    pub lines: Vec<PnlLine>,
    pub metrics: PnlMetrics,
}

impl PnlStatement {
    /// Look up a line by kind
    pub fn line(&self, kind: PnlLineKind) -> Option<&PnlLine> {
        self.lines.iter().find(|l| l.kind == kind)
    }
}

/// Build the per-home P&L for one cost result.
pub fn build_pnl(result: &CostResult, sale_price: f64, overhead_per_home: f64) -> PnlStatement {
    let revenue = sale_price;
    let cash_cogs = result.cash_cogs_per_home;
    let gross_profit = revenue - cash_cogs;
    let ebitda = gross_profit - overhead_per_home;
    let depreciation = result.depreciation_per_home;
    let ebit_accrual = ebitda - depreciation;

    let both = |kind, value: f64| PnlLine {
        kind,
        cash: value,
        accrual: value,
    };

    let lines = vec![
        both(PnlLineKind::Revenue, revenue),
        both(PnlLineKind::Material, -result.material_cost_per_home),
        both(PnlLineKind::Labor, -result.labor_cost_per_home),
        both(PnlLineKind::Logistics, -result.logistics_cost_per_home),
        both(PnlLineKind::Integration, -result.integration_cost_per_home),
        both(PnlLineKind::LeaseExpense, -result.lease_expense_per_home),
        both(PnlLineKind::CashCogs, -cash_cogs),
        both(PnlLineKind::GrossProfit, gross_profit),
        both(PnlLineKind::Overhead, -overhead_per_home),
        both(PnlLineKind::Ebitda, ebitda),
        PnlLine {
            kind: PnlLineKind::Depreciation,
            cash: 0.0,
            accrual: -depreciation,
        },
        PnlLine {
            kind: PnlLineKind::Ebit,
            cash: ebitda,
            accrual: ebit_accrual,
        },
    ];

    let net_cash_per_home = ebitda - result.debt_service_per_home;
    let payback_homes = if net_cash_per_home > 0.0 {
        Some(result.upfront_printer_cash / net_cash_per_home)
    } else {
        None
    };

    let metrics = PnlMetrics {
        gross_margin: safe_div(gross_profit, revenue),
        ebitda_margin: safe_div(ebitda, revenue),
        ebit_margin: safe_div(ebit_accrual, revenue),
        cash_cogs_pct: safe_div(cash_cogs, revenue),
        debt_service_per_home: result.debt_service_per_home,
        net_cash_per_home,
        payback_homes,
    };

    tracing::debug!(
        sale_price,
        ebitda,
        ebit = ebit_accrual,
        payback = ?payback_homes,
        "built P&L"
    );

    PnlStatement {
        sale_price,
        lines,
        metrics,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculations::{calculate_costs, CostInputs};
    use crate::finance::AcquisitionMode;
    use approx::assert_relative_eq;

    fn result_for(mode: AcquisitionMode) -> CostResult {
        let inputs = CostInputs {
            acquisition_mode: mode,
            upfront_fraction: if mode == AcquisitionMode::OwnedCash { 1.0 } else { 0.2 },
            monthly_payment: if mode == AcquisitionMode::OwnedCash { 0.0 } else { 9000.0 },
            ..CostInputs::default()
        };
        calculate_costs(&inputs, false)
    }

    #[test]
    fn test_columns_sum() {
        let result = result_for(AcquisitionMode::OwnedCash);
        let pnl = build_pnl(&result, 80_000.0, 5_000.0);

        let detail: f64 = [
            PnlLineKind::Material,
            PnlLineKind::Labor,
            PnlLineKind::Logistics,
            PnlLineKind::Integration,
            PnlLineKind::LeaseExpense,
        ]
        .iter()
        .filter_map(|k| pnl.line(*k))
        .map(|l| l.cash)
        .sum();
        let cogs = pnl.line(PnlLineKind::CashCogs).unwrap().cash;
        assert_relative_eq!(detail, cogs, max_relative = 1e-12);

        let ebit = pnl.line(PnlLineKind::Ebit).unwrap();
        let ebitda = pnl.line(PnlLineKind::Ebitda).unwrap();
        assert_eq!(ebit.cash, ebitda.cash);
        assert_relative_eq!(
            ebit.accrual,
            ebitda.accrual - result.depreciation_per_home,
            max_relative = 1e-12
        );
    }

    #[test]
    fn test_line_order() {
        let pnl = build_pnl(&result_for(AcquisitionMode::OwnedCash), 50_000.0, 0.0);
        let kinds: Vec<_> = pnl.lines.iter().map(|l| l.kind).collect();
        assert_eq!(kinds, PnlLineKind::ALL.to_vec());
    }

    #[test]
    fn test_margins() {
        let result = result_for(AcquisitionMode::OwnedCash);
        let pnl = build_pnl(&result, 100_000.0, 5_000.0);
        let expected_ebitda = 100_000.0 - result.cash_cogs_per_home - 5_000.0;
        assert_relative_eq!(pnl.metrics.ebitda_margin, expected_ebitda / 100_000.0, max_relative = 1e-12);
        assert_relative_eq!(
            pnl.metrics.cash_cogs_pct,
            result.cash_cogs_per_home / 100_000.0,
            max_relative = 1e-12
        );
        assert!(pnl.metrics.ebit_margin < pnl.metrics.ebitda_margin);
    }

    #[test]
    fn test_zero_sale_price_yields_zero_margins() {
        let pnl = build_pnl(&result_for(AcquisitionMode::OwnedCash), 0.0, 5_000.0);
        assert_eq!(pnl.metrics.gross_margin, 0.0);
        assert_eq!(pnl.metrics.ebitda_margin, 0.0);
        assert_eq!(pnl.metrics.ebit_margin, 0.0);
        assert_eq!(pnl.metrics.cash_cogs_pct, 0.0);
        assert_eq!(pnl.metrics.payback_homes, None);
    }

    #[test]
    fn test_payback_for_cash_purchase() {
        let result = result_for(AcquisitionMode::OwnedCash);
        let pnl = build_pnl(&result, 100_000.0, 5_000.0);
        let net = 100_000.0 - result.cash_cogs_per_home - 5_000.0;
        let payback = pnl.metrics.payback_homes.unwrap();
        assert_relative_eq!(payback, result.upfront_printer_cash / net, max_relative = 1e-12);
    }

    #[test]
    fn test_debt_service_reduces_net_cash() {
        let result = result_for(AcquisitionMode::OwnedFinanced);
        assert!(result.debt_service_per_home > 0.0);
        let pnl = build_pnl(&result, 100_000.0, 5_000.0);
        let ebitda = pnl.line(PnlLineKind::Ebitda).unwrap().cash;
        assert_relative_eq!(
            pnl.metrics.net_cash_per_home,
            ebitda - result.debt_service_per_home,
            max_relative = 1e-12
        );
        // Debt service stays out of the statement lines
        assert!(pnl.lines.iter().all(|l| l.cash != -result.debt_service_per_home));
    }

    #[test]
    fn test_lease_shows_in_cogs() {
        let result = result_for(AcquisitionMode::Leased);
        let pnl = build_pnl(&result, 100_000.0, 0.0);
        let lease = pnl.line(PnlLineKind::LeaseExpense).unwrap();
        assert!(lease.cash < 0.0);
        let dep = pnl.line(PnlLineKind::Depreciation).unwrap();
        assert_eq!(dep.accrual, 0.0);
    }
}
