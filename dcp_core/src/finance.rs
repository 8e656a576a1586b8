//! # Printer Financing
//!
//! Amortized loan payments and the printer acquisition modes the cost engine
//! distinguishes.
//!
//! ## Example
//!
//! ```rust
//! use dcp_core::finance::monthly_payment;
//!
//! // $464k financed over 5 years at 8% APR
//! let payment = monthly_payment(464_000.0, 0.08, 60);
//! assert!((payment - 9408.25).abs() < 0.01);
//!
//! // Interest-free: straight-line
//! assert_eq!(monthly_payment(120_000.0, 0.0, 60), 2000.0);
//! ```

use serde::{Deserialize, Serialize};

/// How the printer is acquired.
///
/// Drives which of depreciation, debt service and lease expense the engine
/// books for the printer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AcquisitionMode {
    /// Bought outright; depreciation only
    #[default]
    OwnedCash,
    /// Bought with a loan; depreciation plus debt service
    OwnedFinanced,
    /// Leased or rented; payments are operating expense, no depreciation
    Leased,
}

impl AcquisitionMode {
    /// All modes for UI selection
    pub const ALL: [AcquisitionMode; 3] = [
        AcquisitionMode::OwnedCash,
        AcquisitionMode::OwnedFinanced,
        AcquisitionMode::Leased,
    ];

    /// True for modes where the printer sits on the balance sheet
    pub fn is_owned(self) -> bool {
        !matches!(self, AcquisitionMode::Leased)
    }

    /// Get display name
    pub fn display_name(self) -> &'static str {
        match self {
            AcquisitionMode::OwnedCash => "Owned (Cash)",
            AcquisitionMode::OwnedFinanced => "Owned (Financed)",
            AcquisitionMode::Leased => "Leased / Rented",
        }
    }
}

impl std::fmt::Display for AcquisitionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Monthly payment on a fully amortizing loan.
///
/// `payment = P·r / (1 − (1+r)^−n)` with `r = annual_rate / 12`. A zero rate
/// degenerates to `P / n`. Negative principal or rate clamp to zero and the
/// term clamps to at least one month.
pub fn monthly_payment(principal: f64, annual_rate: f64, term_months: u32) -> f64 {
    let principal = principal.max(0.0);
    let r = annual_rate.max(0.0) / 12.0;
    let n = term_months.max(1);

    if r == 0.0 {
        return principal / f64::from(n);
    }
    let n = i32::try_from(n).unwrap_or(i32::MAX);
    principal * r / (1.0 - (1.0 + r).powi(-n))
}

/// Total interest paid over the life of the loan.
pub fn total_interest(principal: f64, annual_rate: f64, term_months: u32) -> f64 {
    let n = f64::from(term_months.max(1));
    (monthly_payment(principal, annual_rate, term_months) * n - principal.max(0.0)).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_zero_rate_is_straight_line() {
        assert_eq!(monthly_payment(580_000.0, 0.0, 60), 580_000.0 / 60.0);
        assert_eq!(monthly_payment(1000.0, 0.0, 7), 1000.0 / 7.0);
    }

    #[test]
    fn test_zero_principal() {
        assert_eq!(monthly_payment(0.0, 0.08, 60), 0.0);
        assert_eq!(total_interest(0.0, 0.08, 60), 0.0);
    }

    #[test]
    fn test_amortized_payment() {
        // 100k at 6% over 30 years: textbook 599.55
        let payment = monthly_payment(100_000.0, 0.06, 360);
        assert_relative_eq!(payment, 599.55, epsilon = 0.01);
    }

    #[test]
    fn test_payment_pays_off_balance() {
        let principal = 464_000.0;
        let rate = 0.08 / 12.0;
        let payment = monthly_payment(principal, 0.08, 60);

        let mut balance = principal;
        for _ in 0..60 {
            balance = balance * (1.0 + rate) - payment;
        }
        assert!(balance.abs() < 1e-4);
    }

    #[test]
    fn test_degenerate_inputs_clamp() {
        assert_eq!(monthly_payment(-5000.0, 0.05, 12), 0.0);
        assert_eq!(monthly_payment(1200.0, -0.05, 12), 100.0);
        assert_eq!(monthly_payment(1200.0, 0.0, 0), 1200.0);
    }

    #[test]
    fn test_total_interest() {
        let interest = total_interest(100_000.0, 0.06, 360);
        assert_relative_eq!(interest, 115_838.19, epsilon = 1.0);
        assert_eq!(total_interest(60_000.0, 0.0, 60), 0.0);
    }

    #[test]
    fn test_acquisition_mode() {
        assert!(AcquisitionMode::OwnedCash.is_owned());
        assert!(AcquisitionMode::OwnedFinanced.is_owned());
        assert!(!AcquisitionMode::Leased.is_owned());
        assert_eq!(AcquisitionMode::default(), AcquisitionMode::OwnedCash);

        let json = serde_json::to_string(&AcquisitionMode::Leased).unwrap();
        assert_eq!(json, "\"Leased\"");
    }
}
