//! `YieldTermStructure`: yield / interest-rate term structures
//! (translates `ql/termstructures/yieldtermstructure.hpp`).
//!
//! Any yield curve provides three related quantities, all continuously
//! compounded:
//!
//! * **discount factor**: `P(0,t)`
//! * **zero rate**: `−ln P(0,t) / t`
//! * **instantaneous forward rate**: `f(0,t) = −∂ ln P(0,t) / ∂t`

use crate::term_structure::TermStructure;
use sr_core::{DiscountFactor, Rate, Real, Time};

/// Small time step used for finite-difference forward rates.
const DT: Real = 1.0e-4;

/// A yield (interest-rate) term structure.
///
/// Implementors must provide **exactly one** of the three low-level methods:
///
/// * [`discount_impl`](YieldTermStructure::discount_impl)
/// * [`zero_rate_impl`](YieldTermStructure::zero_rate_impl)
/// * [`forward_rate_impl`](YieldTermStructure::forward_rate_impl)
///
/// Default implementations of the other two follow from the relationships
/// between them. Curves with a closed-form forward should override
/// `forward_rate_impl` as well; the short-rate models evaluate it on every
/// state-to-short-rate conversion.
///
/// Corresponds to `QuantLib::YieldTermStructure`.
pub trait YieldTermStructure: TermStructure {
    // ── Low-level impl hooks (override at least one) ─────────────────────

    /// Discount factor for time `t`.
    ///
    /// Default: computed from `zero_rate_impl`.
    fn discount_impl(&self, t: Time) -> DiscountFactor {
        if t == 0.0 {
            return 1.0;
        }
        (-self.zero_rate_impl(t) * t).exp()
    }

    /// Continuously-compounded zero rate for time `t`.
    ///
    /// Default: computed from `discount_impl`.
    fn zero_rate_impl(&self, t: Time) -> Rate {
        if t == 0.0 {
            return self.forward_rate_impl(0.0);
        }
        -self.discount_impl(t).ln() / t
    }

    /// Instantaneous forward rate at time `t`.
    ///
    /// Default: central difference of `ln P` (one-sided at `t = 0`).
    fn forward_rate_impl(&self, t: Time) -> Rate {
        let t1 = (t - DT / 2.0).max(0.0);
        let t2 = t1 + DT;
        (self.discount_impl(t1).ln() - self.discount_impl(t2).ln()) / (t2 - t1)
    }

    // ── Public interface ─────────────────────────────────────────────────

    /// Discount factor `P(0,t)`.
    fn discount(&self, t: Time) -> DiscountFactor {
        self.discount_impl(t)
    }

    /// Continuously-compounded zero rate for maturity `t`.
    fn zero_rate(&self, t: Time) -> Rate {
        self.zero_rate_impl(t)
    }

    /// Instantaneous forward rate `f(0,t)`.
    fn instantaneous_forward(&self, t: Time) -> Rate {
        self.forward_rate_impl(t)
    }

    /// Continuously-compounded forward rate between `t1` and `t2`
    /// (instantaneous when the two coincide).
    fn forward_rate(&self, t1: Time, t2: Time) -> Rate {
        if (t2 - t1).abs() < sr_core::TIME_TOLERANCE {
            return self.forward_rate_impl(t1);
        }
        (self.discount_impl(t1) / self.discount_impl(t2)).ln() / (t2 - t1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use chrono::NaiveDate;

    /// A curve defined only through its zero rates: `z(t) = 0.02 + 0.01·t`.
    #[derive(Debug)]
    struct LinearZero;

    impl TermStructure for LinearZero {
        fn reference_date(&self) -> NaiveDate {
            NaiveDate::from_ymd_opt(2025, 1, 2).unwrap_or_default()
        }
    }

    impl YieldTermStructure for LinearZero {
        fn zero_rate_impl(&self, t: Time) -> Rate {
            0.02 + 0.01 * t
        }
    }

    #[test]
    fn defaults_are_consistent() {
        let c = LinearZero;
        assert_abs_diff_eq!(c.discount(0.0), 1.0, epsilon = 1e-15);
        assert_abs_diff_eq!(c.discount(2.0), (-0.08_f64).exp(), epsilon = 1e-14);
        // f(t) = d/dt (z·t) = 0.02 + 0.02·t
        assert_abs_diff_eq!(c.instantaneous_forward(1.5), 0.05, epsilon = 1e-8);
        assert_abs_diff_eq!(c.instantaneous_forward(0.0), 0.02, epsilon = 1e-5);
        // (z2·t2 − z1·t1) / (t2 − t1)
        let expected = (0.04 * 2.0 - 0.03 * 1.0) / 1.0;
        assert_abs_diff_eq!(c.forward_rate(1.0, 2.0), expected, epsilon = 1e-12);
    }

    #[test]
    fn time_from_reference_is_act365() {
        let c = LinearZero;
        let d = NaiveDate::from_ymd_opt(2026, 1, 2).unwrap();
        assert_abs_diff_eq!(c.time_from_reference(d), 1.0, epsilon = 1e-15);
        assert!(c.check_range_time(30.0));
        assert!(!c.check_range_time(-0.1));
    }
}
