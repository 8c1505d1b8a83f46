//! Hull-White forward-measure process
//! (translates `ql/processes/hullwhiteprocess.hpp`).
//!
//! Under the T-forward measure the Hull-White short rate follows
//!
//! ```text
//! dr = (θ(t) − a·r − σ²·B(t,T)) dt + σ dW^T
//! ```
//!
//! with `B(t,T) = (1 − e^{−a(T−t)})/a`. Transition moments are exact:
//! `r` is an Ornstein-Uhlenbeck process around
//! `α(t) = f(0,t) + σ²/(2a²)·(1 − e^{−at})²`, shifted by the forward
//! drift `M_T`.

use crate::gsr_process::{decay_integral, decay_integral_sq, DEFAULT_FORWARD_MEASURE_TIME};
use crate::stochastic_process::StochasticProcess1D;
use sr_core::{ensure, ensure_arg, errors::Result, Real, Time};
use sr_termstructures::YieldTermStructure;
use std::fmt;
use std::sync::Arc;

/// Step of the finite difference for `∂f(0,t)/∂t` in the drift.
const FORWARD_SHIFT: Time = 1.0e-4;

/// Hull-White short-rate process under the `T`-forward measure.
///
/// Corresponds to `QuantLib::HullWhiteForwardProcess`.
#[derive(Clone)]
pub struct HullWhiteForwardProcess {
    curve: Arc<dyn YieldTermStructure>,
    a: Real,
    sigma: Real,
    forward_measure_time: Time,
}

impl HullWhiteForwardProcess {
    /// Create the process with the default forward measure (60 years).
    pub fn new(curve: Arc<dyn YieldTermStructure>, a: Real, sigma: Real) -> Result<Self> {
        ensure!(a.is_finite(), "mean reversion must be finite");
        ensure!(
            sigma.is_finite() && sigma >= 0.0,
            "volatility must be non-negative, got {sigma}"
        );
        Ok(Self {
            curve,
            a,
            sigma,
            forward_measure_time: DEFAULT_FORWARD_MEASURE_TIME,
        })
    }

    /// Move the forward measure to maturity `t`.
    pub fn with_forward_measure_time(mut self, t: Time) -> Self {
        self.forward_measure_time = t;
        self
    }

    /// Mean reversion speed.
    pub fn a(&self) -> Real {
        self.a
    }

    /// Volatility.
    pub fn sigma(&self) -> Real {
        self.sigma
    }

    /// Maturity of the forward measure.
    pub fn forward_measure_time(&self) -> Time {
        self.forward_measure_time
    }

    /// `B(t,T) = (1 − e^{−a(T−t)})/a`.
    #[allow(non_snake_case)]
    pub fn B(&self, t: Time, T: Time) -> Real {
        decay_integral(self.a, T - t)
    }

    /// `α(t) = f(0,t) + ½·(σ·B(0,t))²`, the risk-neutral mean of `r(t)`.
    pub fn alpha(&self, t: Time) -> Real {
        let half = self.sigma * decay_integral(self.a, t);
        self.curve.instantaneous_forward(t) + 0.5 * half * half
    }

    /// Mean shift between risk-neutral and `T`-forward dynamics over `[s, t]`:
    /// `σ²·(½·B(s,t)² + B₂(s,t)·B(t,T))` with `B₂(s,t) = (1 − e^{−2a(t−s)})/(2a)`.
    #[allow(non_snake_case)]
    pub fn M_T(&self, s: Time, t: Time, T: Time) -> Real {
        let phi1 = decay_integral(self.a, t - s);
        let phi2 = decay_integral_sq(self.a, t - s);
        self.sigma * self.sigma * (0.5 * phi1 * phi1 + phi2 * self.B(t, T))
    }
}

impl fmt::Debug for HullWhiteForwardProcess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HullWhiteForwardProcess")
            .field("a", &self.a)
            .field("sigma", &self.sigma)
            .field("forward_measure_time", &self.forward_measure_time)
            .finish()
    }
}

impl StochasticProcess1D for HullWhiteForwardProcess {
    fn x0(&self) -> Real {
        self.curve.instantaneous_forward(0.0)
    }

    fn drift(&self, t: Time, r: Real) -> Real {
        let f = self.curve.instantaneous_forward(t);
        let f_up = self.curve.instantaneous_forward(t + FORWARD_SHIFT);
        let s2 = self.sigma * self.sigma;
        let alpha_drift = s2 * decay_integral_sq(self.a, t) + self.a * f + (f_up - f) / FORWARD_SHIFT;
        alpha_drift - self.a * r - s2 * self.B(t, self.forward_measure_time)
    }

    fn diffusion(&self, _t: Time, _r: Real) -> Real {
        self.sigma
    }

    fn expectation(&self, t0: Time, r0: Real, dt: Time) -> Result<Real> {
        ensure_arg!(dt >= 0.0, "negative horizon {dt}");
        let e = (-self.a * dt).exp();
        Ok(r0 * e + self.alpha(t0 + dt) - self.alpha(t0) * e
            - self.M_T(t0, t0 + dt, self.forward_measure_time))
    }

    fn variance(&self, _t0: Time, _r0: Real, dt: Time) -> Result<Real> {
        ensure_arg!(dt >= 0.0, "negative horizon {dt}");
        Ok(self.sigma * self.sigma * decay_integral_sq(self.a, dt))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gsr_process::{GsrProcess, Measure};
    use approx::assert_abs_diff_eq;
    use chrono::NaiveDate;
    use proptest::prelude::*;
    use sr_termstructures::{FlatForward, InterpolatedDiscountCurve};

    fn ref_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 2).unwrap()
    }

    fn flat_ts(rate: Real) -> Arc<dyn YieldTermStructure> {
        Arc::new(FlatForward::continuous(ref_date(), rate))
    }

    fn sloped_ts() -> Arc<dyn YieldTermStructure> {
        let times = [0.0, 1.0, 3.0, 10.0, 30.0];
        let lnp: [Real; 5] = [0.0, -0.02, -0.08, -0.36, -1.26];
        let discounts: Vec<Real> = lnp.iter().map(|l| l.exp()).collect();
        Arc::new(InterpolatedDiscountCurve::new(ref_date(), &times, &discounts).unwrap())
    }

    #[test]
    fn hw_forward_basic() {
        let p = HullWhiteForwardProcess::new(flat_ts(0.05), 0.1, 0.01)
            .unwrap()
            .with_forward_measure_time(10.0);
        assert_abs_diff_eq!(p.x0(), 0.05, epsilon = 1e-15);
        assert_eq!(p.forward_measure_time(), 10.0);
        assert_abs_diff_eq!(p.diffusion(1.0, 0.03), 0.01, epsilon = 1e-15);
        assert!(HullWhiteForwardProcess::new(flat_ts(0.05), 0.1, -0.01).is_err());
    }

    #[test]
    fn zero_volatility_is_deterministic() {
        let p = HullWhiteForwardProcess::new(flat_ts(0.03), 0.1, 0.0).unwrap();
        assert_abs_diff_eq!(p.expectation(0.0, 0.03, 5.0).unwrap(), 0.03, epsilon = 1e-15);
        assert_abs_diff_eq!(p.variance(0.0, 0.03, 5.0).unwrap(), 0.0, epsilon = 1e-18);
        assert_abs_diff_eq!(p.drift(2.0, 0.03), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn small_reversion_matches_limit() {
        let ts = flat_ts(0.03);
        let limit = HullWhiteForwardProcess::new(ts.clone(), 0.0, 0.01).unwrap();
        let tiny = HullWhiteForwardProcess::new(ts, 1e-9, 0.01).unwrap();
        for (t, dt) in [(0.0, 1.0), (2.0, 3.0), (7.5, 0.25)] {
            let a = limit.expectation(t, 0.02, dt).unwrap();
            let b = tiny.expectation(t, 0.02, dt).unwrap();
            assert_abs_diff_eq!(a, b, epsilon = 1e-9);
        }
    }

    proptest! {
        /// The single-regime GSR state is the Hull-White short rate minus
        /// the instantaneous forward.
        #[test]
        fn matches_single_regime_gsr(
            w in 0.0f64..15.0,
            dt in 0.0f64..15.0,
            x in -0.05f64..0.05,
            a in prop_oneof![Just(0.0), 0.001f64..0.3],
            sigma in 0.001f64..0.02,
        ) {
            let ts = sloped_ts();
            let hw = HullWhiteForwardProcess::new(ts.clone(), a, sigma).unwrap();
            let gsr = GsrProcess::new(vec![], vec![sigma], vec![a], Measure::default()).unwrap();
            let r = x + ts.instantaneous_forward(w);
            let e_hw = hw.expectation(w, r, dt).unwrap() - ts.instantaneous_forward(w + dt);
            let e_gsr = gsr.expectation(w, x, dt).unwrap();
            prop_assert!((e_hw - e_gsr).abs() < 1e-8);
            let v_hw = hw.variance(w, r, dt).unwrap();
            let v_gsr = gsr.variance(w, x, dt).unwrap();
            prop_assert!((v_hw - v_gsr).abs() < 1e-8);
            prop_assert!(
                (hw.std_deviation(w, r, dt).unwrap() - gsr.std_deviation(w, x, dt).unwrap()).abs()
                    < 1e-8
            );
        }
    }
}
