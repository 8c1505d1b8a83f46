//! One-factor Gaussian model interface
//! (translates `ql/models/shortrate/onefactormodels/gaussian1dmodel.hpp`).
//!
//! Every model of the family is described by a [`GsrProcess`] for the state
//! `x = r − f(0,t)` and a discount curve. Zero bonds are then
//!
//! ```text
//! P(t,T,x) = P(0,T)/P(0,t) · exp(−x·G(t,T) − ½·y(t)·G(t,T)²)
//! ```
//!
//! and the numeraire is the zero bond maturing at the forward-measure time.

use sr_core::{ensure_arg, errors::Result, Real, Time, TIME_TOLERANCE};
use sr_processes::{GsrProcess, StochasticProcess1D, DEFAULT_FORWARD_MEASURE_TIME};
use sr_termstructures::YieldTermStructure;
use std::fmt;
use std::sync::Arc;

/// A one-factor Gaussian short-rate model.
///
/// Corresponds to `QuantLib::Gaussian1dModel`.
pub trait Gaussian1dModel: fmt::Debug + Send + Sync {
    /// The discount curve the model fits.
    fn term_structure(&self) -> &Arc<dyn YieldTermStructure>;

    /// The state process for the current parameters.
    fn process(&self) -> &GsrProcess;

    /// A snapshot of the state process; repeated calls without a parameter
    /// change return equal processes.
    fn state_process(&self) -> GsrProcess {
        self.process().clone()
    }

    /// Maturity of the forward measure the state evolves under.
    fn forward_measure_time(&self) -> Time {
        self.process()
            .forward_measure_time()
            .unwrap_or(DEFAULT_FORWARD_MEASURE_TIME)
    }

    /// Zero bond `P(t, maturity)` in state `x`.
    fn zero_bond(&self, t: Time, maturity: Time, x: Real) -> Result<Real> {
        ensure_arg!(t >= 0.0, "negative time {t}");
        ensure_arg!(
            maturity >= t - TIME_TOLERANCE,
            "zero bond maturity {maturity} before observation time {t}"
        );
        let process = self.process();
        let g = process.G(t, maturity);
        let y = process.y(t);
        let ts = self.term_structure();
        Ok(ts.discount(maturity) / ts.discount(t) * (-x * g - 0.5 * y * g * g).exp())
    }

    /// Numeraire at `t` in state `x`: the forward-measure zero bond.
    fn numeraire(&self, t: Time, x: Real) -> Result<Real> {
        let horizon = self.forward_measure_time();
        ensure_arg!(
            t <= horizon + TIME_TOLERANCE,
            "time {t} beyond the forward measure horizon {horizon}"
        );
        self.zero_bond(t, horizon, x)
    }

    /// Zero bond expressed in units of the numeraire.
    fn deflated_zero_bond(&self, t: Time, maturity: Time, x: Real) -> Result<Real> {
        Ok(self.zero_bond(t, maturity, x)? / self.numeraire(t, x)?)
    }

    /// Short rate `r(t) = f(0,t) + x`.
    fn short_rate(&self, t: Time, x: Real) -> Real {
        self.term_structure().instantaneous_forward(t) + x
    }

    /// Mean and standard deviation of the state at `t` seen from `(0, 0)`
    /// under the model's measure.
    fn state_moments(&self, t: Time) -> Result<(Real, Real)> {
        let process = self.process();
        Ok((
            process.expectation(0.0, 0.0, t)?,
            process.std_deviation(0.0, 0.0, t)?,
        ))
    }
}
