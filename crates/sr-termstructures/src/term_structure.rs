//! `TermStructure`: base trait for all term structures
//! (translates `ql/termstructure.hpp`).
//!
//! A term structure has a **reference date**, from which times are
//! measured in Actual/365 (Fixed) year fractions, and a **maximum time**
//! beyond which it refuses to extrapolate.

use chrono::NaiveDate;
use sr_core::Time;

/// Days per year of the Actual/365 (Fixed) convention.
const DAYS_PER_YEAR: Time = 365.0;

/// Base trait for all term structures.
///
/// Corresponds to `QuantLib::TermStructure`.
pub trait TermStructure: std::fmt::Debug + Send + Sync {
    /// The date at which discount = 1.0 and from which time is measured.
    fn reference_date(&self) -> NaiveDate;

    /// The latest time for which the curve can be used.
    fn max_time(&self) -> Time {
        Time::MAX
    }

    /// Convert a date to an Actual/365 (Fixed) year fraction relative to
    /// the reference date.
    fn time_from_reference(&self, date: NaiveDate) -> Time {
        (date - self.reference_date()).num_days() as Time / DAYS_PER_YEAR
    }

    /// Check whether a time is in the valid range of the term structure.
    fn check_range_time(&self, t: Time) -> bool {
        t >= 0.0 && t <= self.max_time()
    }
}
