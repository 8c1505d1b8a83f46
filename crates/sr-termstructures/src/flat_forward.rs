//! `FlatForward`: a yield term structure with a constant forward rate
//! (translates `ql/termstructures/yield/flatforward.hpp`).

use crate::term_structure::TermStructure;
use crate::yield_term_structure::YieldTermStructure;
use chrono::NaiveDate;
use sr_core::{ensure, errors::Result, DiscountFactor, Rate, Real, Time};

/// A flat (constant) forward-rate yield term structure.
///
/// Discount factors are `P(t) = exp(-r·t)` with `r` the continuously
/// compounded rate.
///
/// Corresponds to `QuantLib::FlatForward`.
#[derive(Debug, Clone)]
pub struct FlatForward {
    reference_date: NaiveDate,
    rate: Rate,
}

impl FlatForward {
    /// Create a flat-forward curve from a continuously-compounded rate.
    pub fn continuous(reference_date: NaiveDate, rate: Rate) -> Self {
        Self {
            reference_date,
            rate,
        }
    }

    /// Create a flat-forward curve from a rate compounded `frequency`
    /// times a year; the rate is converted to its continuous equivalent.
    pub fn compounded(reference_date: NaiveDate, rate: Rate, frequency: u32) -> Result<Self> {
        ensure!(frequency > 0, "compounding frequency must be positive");
        let f = Real::from(frequency);
        ensure!(1.0 + rate / f > 0.0, "rate {rate} below -{frequency}");
        Ok(Self::continuous(reference_date, f * (1.0 + rate / f).ln()))
    }

    /// The continuously-compounded flat rate.
    pub fn rate(&self) -> Rate {
        self.rate
    }
}

impl TermStructure for FlatForward {
    fn reference_date(&self) -> NaiveDate {
        self.reference_date
    }
}

impl YieldTermStructure for FlatForward {
    fn discount_impl(&self, t: Time) -> DiscountFactor {
        (-self.rate * t).exp()
    }

    fn zero_rate_impl(&self, _t: Time) -> Rate {
        self.rate
    }

    fn forward_rate_impl(&self, _t: Time) -> Rate {
        self.rate
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn ref_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 2).unwrap()
    }

    #[test]
    fn flat_forward_discount() {
        let curve = FlatForward::continuous(ref_date(), 0.05);
        assert_abs_diff_eq!(curve.discount(0.0), 1.0, epsilon = 1e-15);
        assert_abs_diff_eq!(curve.discount(1.0), (-0.05_f64).exp(), epsilon = 1e-12);
        assert_abs_diff_eq!(curve.discount(10.0), (-0.5_f64).exp(), epsilon = 1e-12);
    }

    #[test]
    fn flat_forward_rates() {
        let curve = FlatForward::continuous(ref_date(), 0.04);
        assert_abs_diff_eq!(curve.zero_rate(5.0), 0.04, epsilon = 1e-15);
        assert_abs_diff_eq!(curve.instantaneous_forward(0.0), 0.04, epsilon = 1e-15);
        assert_abs_diff_eq!(curve.forward_rate(2.0, 3.0), 0.04, epsilon = 1e-12);
    }

    #[test]
    fn flat_forward_with_annual_compounding() {
        let curve = FlatForward::compounded(ref_date(), 0.05, 1).unwrap();
        assert_abs_diff_eq!(curve.rate(), (1.05_f64).ln(), epsilon = 1e-12);
        assert!(FlatForward::compounded(ref_date(), 0.05, 0).is_err());
    }

    #[test]
    fn flat_forward_discount_date() {
        let curve = FlatForward::continuous(ref_date(), 0.05);
        let d1 = NaiveDate::from_ymd_opt(2026, 1, 2).unwrap();
        let t = curve.time_from_reference(d1);
        assert_abs_diff_eq!(curve.discount(t), (-0.05_f64).exp(), epsilon = 1e-12);
    }
}
