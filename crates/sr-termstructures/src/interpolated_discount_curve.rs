//! `InterpolatedDiscountCurve`: a yield term structure defined by discount
//! factors (translates
//! `ql/termstructures/yield/interpolateddiscountcurve.hpp`).
//!
//! Discounts are interpolated log-linearly in time, so forwards are
//! piecewise constant between pillars and the instantaneous forward is
//! exact. Beyond the last pillar the last forward is extended flat.

use crate::term_structure::TermStructure;
use crate::yield_term_structure::YieldTermStructure;
use chrono::NaiveDate;
use sr_core::{ensure, errors::Result, DiscountFactor, Rate, Real, Time};
use sr_math::{Interpolation1D, LogLinearInterpolation};

/// A yield curve defined by discount factors at pillar times.
///
/// Corresponds to `QuantLib::InterpolatedDiscountCurve<LogLinear>`.
#[derive(Debug)]
pub struct InterpolatedDiscountCurve {
    reference_date: NaiveDate,
    times: Vec<Time>,
    discounts: Vec<DiscountFactor>,
    interp: LogLinearInterpolation,
}

impl InterpolatedDiscountCurve {
    /// Build a curve from pillar times and discount factors.
    ///
    /// The first pillar must be `t = 0` with a discount of 1; times must be
    /// strictly increasing and discounts positive.
    pub fn new(
        reference_date: NaiveDate,
        times: &[Time],
        discounts: &[DiscountFactor],
    ) -> Result<Self> {
        ensure!(
            times.len() >= 2,
            "need at least 2 pillars (reference + 1), got {}",
            times.len()
        );
        ensure!(
            times.len() == discounts.len(),
            "times ({}) and discounts ({}) must have the same length",
            times.len(),
            discounts.len()
        );
        ensure!(times[0] == 0.0, "first pillar must be at t = 0");
        ensure!(
            (discounts[0] - 1.0).abs() < 1e-12,
            "first discount factor must be 1.0"
        );
        ensure!(
            discounts.iter().all(|&d| d > 0.0),
            "discount factors must be positive"
        );
        let interp = LogLinearInterpolation::new(times, discounts)?;
        Ok(Self {
            reference_date,
            times: times.to_vec(),
            discounts: discounts.to_vec(),
            interp,
        })
    }

    /// Build a curve from pillar dates (the first being the reference date).
    pub fn from_dates(dates: &[NaiveDate], discounts: &[DiscountFactor]) -> Result<Self> {
        ensure!(!dates.is_empty(), "no pillar dates given");
        let reference_date = dates[0];
        let times: Vec<Real> = dates
            .iter()
            .map(|&d| (d - reference_date).num_days() as Real / 365.0)
            .collect();
        Self::new(reference_date, &times, discounts)
    }

    /// Pillar times.
    pub fn times(&self) -> &[Time] {
        &self.times
    }

    /// Pillar discount factors.
    pub fn discounts(&self) -> &[DiscountFactor] {
        &self.discounts
    }
}

impl TermStructure for InterpolatedDiscountCurve {
    fn reference_date(&self) -> NaiveDate {
        self.reference_date
    }
}

impl YieldTermStructure for InterpolatedDiscountCurve {
    fn discount_impl(&self, t: Time) -> DiscountFactor {
        if t == 0.0 {
            return 1.0;
        }
        self.interp.operator(t)
    }

    fn forward_rate_impl(&self, t: Time) -> Rate {
        -self.interp.derivative(t) / self.interp.operator(t)
    }
}
