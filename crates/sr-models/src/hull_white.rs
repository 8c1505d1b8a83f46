//! Hull-White (extended Vasicek) model.
//!
//! Translates `ql/models/shortrate/onefactormodels/hullwhite.hpp`.
//!
//! ```text
//! dr = (θ(t) − a·r) dt + σ dW
//! ```
//!
//! `θ(t)` is chosen to fit the initial curve exactly. In short-rate
//! coordinates bonds are affine, `P(t,T) = A(t,T)·exp(−B(t,T)·r(t))`;
//! as a [`Gaussian1dModel`] the model is a single-regime GSR.

use crate::calibrated_model::CalibratedModel;
use crate::gaussian1d_model::Gaussian1dModel;
use crate::parameter::Parameter;
use sr_core::{ensure, ensure_arg, errors::Result, Real, Time};
use sr_math::{Array, Constraint};
use sr_processes::{GsrProcess, HullWhiteForwardProcess, Measure, DEFAULT_FORWARD_MEASURE_TIME};
use sr_termstructures::YieldTermStructure;
use std::fmt;
use std::sync::Arc;

/// Hull-White one-factor model.
///
/// Parameters in calibration order: `a` (unconstrained), `σ` (positive).
///
/// Corresponds to `QuantLib::HullWhite`.
#[derive(Clone)]
pub struct HullWhite {
    term_structure: Arc<dyn YieldTermStructure>,
    arguments: Vec<Parameter>,
    forward_measure_time: Time,
    process: GsrProcess,
}

impl HullWhite {
    /// Create a Hull-White model with reversion `a` and volatility `sigma`.
    pub fn new(term_structure: Arc<dyn YieldTermStructure>, a: Real, sigma: Real) -> Result<Self> {
        let arguments = vec![
            Parameter::new(vec![a], Constraint::None),
            Parameter::new(vec![sigma], Constraint::Positive),
        ];
        let process = Self::build_process(a, sigma, DEFAULT_FORWARD_MEASURE_TIME)?;
        Ok(Self {
            term_structure,
            arguments,
            forward_measure_time: DEFAULT_FORWARD_MEASURE_TIME,
            process,
        })
    }

    /// The same model under the `t`-forward measure.
    pub fn with_forward_measure_time(mut self, t: Time) -> Result<Self> {
        self.process = Self::build_process(self.a(), self.sigma(), t)?;
        self.forward_measure_time = t;
        Ok(self)
    }

    fn build_process(a: Real, sigma: Real, forward_measure_time: Time) -> Result<GsrProcess> {
        GsrProcess::new(
            vec![],
            vec![sigma],
            vec![a],
            Measure::TForward(forward_measure_time),
        )
    }

    /// Mean reversion speed.
    pub fn a(&self) -> Real {
        self.arguments[0].values()[0]
    }

    /// Volatility.
    pub fn sigma(&self) -> Real {
        self.arguments[1].values()[0]
    }

    /// `B(t,T) = (1 − e^{−a(T−t)})/a`.
    #[allow(non_snake_case)]
    pub fn B(&self, t: Time, T: Time) -> Real {
        self.process.G(t, T)
    }

    /// `ln A(t,T) = ln(P(0,T)/P(0,t)) + B(t,T)·f(0,t) − σ²/(4a)·(1 − e^{−2at})·B(t,T)²`.
    #[allow(non_snake_case)]
    fn ln_A(&self, t: Time, T: Time) -> Real {
        let ts = &self.term_structure;
        let b = self.B(t, T);
        // σ²/(4a)·(1 − e^{−2at}) = ½·y(t)
        (ts.discount(T) / ts.discount(t)).ln() + b * ts.instantaneous_forward(t)
            - 0.5 * self.process.y(t) * b * b
    }

    /// Affine discount bond `P(t,T) = A(t,T)·exp(−B(t,T)·r)` given the short
    /// rate `r` at `t`.
    pub fn discount_bond(&self, t: Time, maturity: Time, r: Real) -> Result<Real> {
        ensure_arg!(t >= 0.0, "negative time {t}");
        ensure_arg!(maturity >= t, "maturity {maturity} before time {t}");
        Ok((self.ln_A(t, maturity) - self.B(t, maturity) * r).exp())
    }

    /// The short-rate process under the model's forward measure.
    pub fn hull_white_process(&self) -> Result<HullWhiteForwardProcess> {
        Ok(
            HullWhiteForwardProcess::new(self.term_structure.clone(), self.a(), self.sigma())?
                .with_forward_measure_time(self.forward_measure_time),
        )
    }
}

impl fmt::Debug for HullWhite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HullWhite")
            .field("a", &self.a())
            .field("sigma", &self.sigma())
            .field("forward_measure_time", &self.forward_measure_time)
            .finish()
    }
}

impl CalibratedModel for HullWhite {
    fn arguments(&self) -> &[Parameter] {
        &self.arguments
    }

    fn set_params(&mut self, params: &Array) -> Result<()> {
        ensure!(
            params.size() == 2,
            "Hull-White has 2 parameters, got {}",
            params.size()
        );
        let process = Self::build_process(params[0], params[1], self.forward_measure_time)?;
        self.arguments[0].set_values(&[params[0]])?;
        self.arguments[1].set_values(&[params[1]])?;
        self.process = process;
        Ok(())
    }
}

impl Gaussian1dModel for HullWhite {
    fn term_structure(&self) -> &Arc<dyn YieldTermStructure> {
        &self.term_structure
    }

    fn process(&self) -> &GsrProcess {
        &self.process
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use chrono::NaiveDate;
    use sr_termstructures::FlatForward;

    fn flat(rate: Real) -> Arc<dyn YieldTermStructure> {
        let d = NaiveDate::from_ymd_opt(2025, 1, 2).unwrap();
        Arc::new(FlatForward::continuous(d, rate))
    }

    #[test]
    fn fits_the_initial_curve() {
        let ts = flat(0.04);
        let m = HullWhite::new(ts.clone(), 0.1, 0.01).unwrap();
        let r0 = ts.instantaneous_forward(0.0);
        for t in [0.5, 1.0, 5.0, 20.0] {
            assert_abs_diff_eq!(m.discount_bond(0.0, t, r0).unwrap(), ts.discount(t), epsilon = 1e-14);
            assert_abs_diff_eq!(m.zero_bond(0.0, t, 0.0).unwrap(), ts.discount(t), epsilon = 1e-14);
        }
    }

    #[test]
    fn affine_and_state_bonds_agree() {
        let ts = flat(0.03);
        let m = HullWhite::new(ts.clone(), 0.05, 0.012).unwrap();
        for (t, big_t, x) in [(1.0, 3.0, 0.01), (2.5, 10.0, -0.02), (5.0, 5.5, 0.0)] {
            let r = m.short_rate(t, x);
            assert_abs_diff_eq!(
                m.discount_bond(t, big_t, r).unwrap(),
                m.zero_bond(t, big_t, x).unwrap(),
                epsilon = 1e-13
            );
        }
    }

    #[test]
    fn zero_reversion_is_finite() {
        let m = HullWhite::new(flat(0.03), 0.0, 0.01).unwrap();
        let p = m.discount_bond(1.0, 4.0, 0.03).unwrap();
        assert!(p.is_finite() && p > 0.0);
        assert_abs_diff_eq!(m.B(1.0, 4.0), 3.0, epsilon = 1e-15);
    }

    #[test]
    fn set_params_rebuilds_the_process() {
        let mut m = HullWhite::new(flat(0.03), 0.05, 0.01).unwrap();
        let before = m.state_process();
        assert_eq!(before, m.state_process());
        m.set_params(&Array::from_slice(&[0.1, 0.02])).unwrap();
        assert_eq!(m.a(), 0.1);
        assert_eq!(m.sigma(), 0.02);
        assert_ne!(before, m.state_process());
        assert_eq!(m.process().volatilities(), &[0.02]);
        assert!(m.set_params(&Array::from_slice(&[0.1])).is_err());
    }

    #[test]
    fn numeraire_is_the_forward_bond() {
        let ts = flat(0.03);
        let m = HullWhite::new(ts.clone(), 0.05, 0.01)
            .unwrap()
            .with_forward_measure_time(20.0)
            .unwrap();
        assert_abs_diff_eq!(m.numeraire(0.0, 0.0).unwrap(), ts.discount(20.0), epsilon = 1e-15);
        assert_abs_diff_eq!(m.numeraire(20.0, 0.3).unwrap(), 1.0, epsilon = 1e-15);
        assert!(matches!(m.numeraire(21.0, 0.0), Err(sr_core::errors::Error::InvalidArgument(_))));
        let hw = m.hull_white_process().unwrap();
        assert_eq!(hw.forward_measure_time(), 20.0);
    }
}
