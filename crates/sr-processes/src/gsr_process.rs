//! Gaussian short-rate (GSR) state process
//! (translates `ql/processes/gsrprocess.hpp`).
//!
//! The state is the deviation of the short rate from today's forward curve,
//! `x(t) = r(t) − f(0,t)`, with dynamics
//!
//! ```text
//! dx = (y(t) − a(t)·x − σ(t)²·G(t,T)) dt + σ(t) dW^T
//! ```
//!
//! where `a(t)` and `σ(t)` are piecewise constant, `y(t) = Var[x(t)]` and
//! `G(t,T) = ∫_t^T e^{−∫_t^s a(u)du} ds`. The `σ²·G(t,T)` term is the
//! change of drift to the `T`-forward measure; it is absent under the
//! risk-neutral measure.
//!
//! Every moment is integrated exactly piece by piece over the regime
//! breakpoints, so a single-regime process reproduces Hull-White.

use crate::stochastic_process::StochasticProcess1D;
use sr_core::{ensure, ensure_arg, errors::Result, Real, Time};

/// Default maturity of the forward measure (60 years).
pub const DEFAULT_FORWARD_MEASURE_TIME: Time = 60.0;

/// Below this `|a|`, integrals use their `a → 0` limits.
const REVERSION_EPSILON: Real = 1.0e-14;

/// Probability measure under which the state evolves.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Measure {
    /// `T`-forward measure; the numeraire is the zero bond maturing at `T`.
    TForward(Time),
    /// Risk-neutral measure; the numeraire is the bank account.
    RiskNeutral,
}

impl Default for Measure {
    fn default() -> Self {
        Measure::TForward(DEFAULT_FORWARD_MEASURE_TIME)
    }
}

/// `∫_0^h e^{−a·s} ds = (1 − e^{−a·h})/a`.
pub(crate) fn decay_integral(a: Real, h: Time) -> Real {
    if a.abs() < REVERSION_EPSILON {
        h
    } else {
        -(-a * h).exp_m1() / a
    }
}

/// `∫_0^h e^{−2a·s} ds = (1 − e^{−2a·h})/(2a)`.
pub(crate) fn decay_integral_sq(a: Real, h: Time) -> Real {
    decay_integral(2.0 * a, h)
}

/// Gaussian short-rate state process with piecewise-constant parameters.
///
/// Regime `i` covers `[times[i−1], times[i])`; the last regime is open
/// ended. Volatilities and reversions have one entry per regime.
///
/// Corresponds to `QuantLib::GsrProcess`.
#[derive(Debug, Clone, PartialEq)]
pub struct GsrProcess {
    times: Vec<Time>,
    vols: Vec<Real>,
    reversions: Vec<Real>,
    measure: Measure,
}

/// A constant-parameter stretch `[start, start + length)`.
#[derive(Debug, Clone, Copy)]
struct Piece {
    start: Time,
    length: Time,
    a: Real,
    sigma: Real,
}

impl GsrProcess {
    /// Create a GSR process.
    ///
    /// `times` must be positive and strictly increasing; `vols` and
    /// `reversions` must have `times.len() + 1` entries.
    pub fn new(
        times: Vec<Time>,
        vols: Vec<Real>,
        reversions: Vec<Real>,
        measure: Measure,
    ) -> Result<Self> {
        ensure!(
            vols.len() == times.len() + 1,
            "number of volatilities ({}) must be number of breakpoints ({}) + 1",
            vols.len(),
            times.len()
        );
        ensure!(
            reversions.len() == times.len() + 1,
            "number of reversions ({}) must be number of breakpoints ({}) + 1",
            reversions.len(),
            times.len()
        );
        ensure!(
            times.windows(2).all(|w| w[1] > w[0]),
            "breakpoints must be strictly increasing"
        );
        ensure!(
            times.first().map_or(true, |&t| t > 0.0),
            "breakpoints must be positive"
        );
        ensure!(
            vols.iter().all(|v| v.is_finite() && *v >= 0.0),
            "volatilities must be finite and non-negative"
        );
        ensure!(
            reversions.iter().all(|a| a.is_finite()),
            "reversions must be finite"
        );
        if let Measure::TForward(t) = measure {
            ensure!(t > 0.0, "forward measure time must be positive, got {t}");
        }
        Ok(Self {
            times,
            vols,
            reversions,
            measure,
        })
    }

    /// The same process under a different measure.
    pub fn with_measure(mut self, measure: Measure) -> Self {
        self.measure = measure;
        self
    }

    /// Regime breakpoints.
    pub fn times(&self) -> &[Time] {
        &self.times
    }

    /// Volatility per regime.
    pub fn volatilities(&self) -> &[Real] {
        &self.vols
    }

    /// Reversion per regime.
    pub fn reversions(&self) -> &[Real] {
        &self.reversions
    }

    /// The measure of the dynamics.
    pub fn measure(&self) -> Measure {
        self.measure
    }

    /// Maturity of the forward measure, if any.
    pub fn forward_measure_time(&self) -> Option<Time> {
        match self.measure {
            Measure::TForward(t) => Some(t),
            Measure::RiskNeutral => None,
        }
    }

    fn regime(&self, t: Time) -> usize {
        self.times.partition_point(|&b| b <= t)
    }

    /// Volatility `σ(t)`.
    pub fn sigma(&self, t: Time) -> Real {
        self.vols[self.regime(t)]
    }

    /// Reversion `a(t)`.
    pub fn reversion(&self, t: Time) -> Real {
        self.reversions[self.regime(t)]
    }

    /// Constant-parameter pieces covering `[s, e]`, `s ≤ e`.
    fn pieces(&self, s: Time, e: Time) -> Vec<Piece> {
        let mut out = Vec::with_capacity(self.times.len() + 1);
        let mut start = s;
        let mut k = self.regime(s);
        while start < e {
            let end = if k < self.times.len() {
                self.times[k].min(e)
            } else {
                e
            };
            out.push(Piece {
                start,
                length: end - start,
                a: self.reversions[k],
                sigma: self.vols[k],
            });
            start = end;
            k += 1;
        }
        out
    }

    /// `∫_s^e a(u) du` (negative when `e < s`).
    pub fn integrated_reversion(&self, s: Time, e: Time) -> Real {
        if e < s {
            return -self.integrated_reversion(e, s);
        }
        self.pieces(s, e).iter().map(|p| p.a * p.length).sum()
    }

    /// `G(t,T) = ∫_t^T e^{−∫_t^s a(u)du} ds`; for `T < t` this is
    /// `−e^{∫_T^t a}·G(T,t)`, so `G(t,s) + e^{−∫_t^s a}·G(s,T) = G(t,T)`
    /// for any ordering.
    #[allow(non_snake_case)]
    pub fn G(&self, t: Time, T: Time) -> Real {
        if T < t {
            return -self.integrated_reversion(T, t).exp() * self.G(T, t);
        }
        let mut decay = 1.0;
        let mut g = 0.0;
        for p in self.pieces(t, T) {
            g += decay * decay_integral(p.a, p.length);
            decay *= (-p.a * p.length).exp();
        }
        g
    }

    /// `y(t) = Var[x(t) | x(0)]`.
    pub fn y(&self, t: Time) -> Real {
        self.conditional_variance(0.0, t.max(0.0))
    }

    fn conditional_variance(&self, w: Time, dt: Time) -> Real {
        self.pieces(w, w + dt).iter().fold(0.0, |v, p| {
            let e = (-p.a * p.length).exp();
            v * e * e + p.sigma * p.sigma * decay_integral_sq(p.a, p.length)
        })
    }
}

impl StochasticProcess1D for GsrProcess {
    fn x0(&self) -> Real {
        0.0
    }

    fn drift(&self, t: Time, x: Real) -> Real {
        let sigma = self.sigma(t);
        let mut mu = self.y(t) - self.reversion(t) * x;
        if let Some(big_t) = self.forward_measure_time() {
            mu -= sigma * sigma * self.G(t, big_t);
        }
        mu
    }

    fn diffusion(&self, t: Time, _x: Real) -> Real {
        self.sigma(t)
    }

    fn expectation(&self, t0: Time, x0: Real, dt: Time) -> Result<Real> {
        ensure_arg!(dt >= 0.0, "negative horizon {dt}");
        let forward = self.forward_measure_time();
        let mut mean = x0;
        let mut y = self.y(t0);
        for p in self.pieces(t0, t0 + dt) {
            let e = (-p.a * p.length).exp();
            let phi1 = decay_integral(p.a, p.length);
            let phi2 = decay_integral_sq(p.a, p.length);
            let s2 = p.sigma * p.sigma;
            mean = mean * e + y * e * phi1;
            match forward {
                Some(big_t) => mean -= s2 * phi2 * self.G(p.start + p.length, big_t),
                None => mean += 0.5 * s2 * phi1 * phi1,
            }
            y = y * e * e + s2 * phi2;
        }
        Ok(mean)
    }

    fn variance(&self, t0: Time, _x0: Real, dt: Time) -> Result<Real> {
        ensure_arg!(dt >= 0.0, "negative horizon {dt}");
        Ok(self.conditional_variance(t0, dt))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use proptest::prelude::*;
    use sr_core::Error;

    fn two_regime() -> GsrProcess {
        GsrProcess::new(
            vec![2.0, 5.0],
            vec![0.01, 0.012, 0.008],
            vec![0.05, 0.02, 0.08],
            Measure::default(),
        )
        .unwrap()
    }

    #[test]
    fn regimes_are_right_continuous() {
        let p = two_regime();
        assert_eq!(p.sigma(0.0), 0.01);
        assert_eq!(p.sigma(1.999), 0.01);
        assert_eq!(p.sigma(2.0), 0.012);
        assert_eq!(p.reversion(5.0), 0.08);
        assert_eq!(p.reversion(100.0), 0.08);
    }

    #[test]
    fn constant_closed_forms() {
        let (a, s) = (0.1, 0.01);
        let p = GsrProcess::new(vec![], vec![s], vec![a], Measure::RiskNeutral).unwrap();
        let expected_var = s * s * (1.0 - (-2.0 * a * 3.0_f64).exp()) / (2.0 * a);
        assert_abs_diff_eq!(p.variance(1.0, 0.0, 3.0).unwrap(), expected_var, epsilon = 1e-16);
        assert_abs_diff_eq!(p.y(3.0), expected_var, epsilon = 1e-16);
        let expected_g = (1.0 - (-a * 4.0_f64).exp()) / a;
        assert_abs_diff_eq!(p.G(1.0, 5.0), expected_g, epsilon = 1e-14);
        assert_abs_diff_eq!(p.G(3.0, 3.0), 0.0, epsilon = 1e-16);
    }

    #[test]
    fn zero_reversion_limits() {
        let p = GsrProcess::new(vec![1.0], vec![0.01, 0.02], vec![0.0, 0.0], Measure::RiskNeutral)
            .unwrap();
        assert_abs_diff_eq!(p.G(0.5, 3.0), 2.5, epsilon = 1e-15);
        let var = p.variance(0.0, 0.0, 3.0).unwrap();
        assert_abs_diff_eq!(var, 0.01 * 0.01 + 0.02 * 0.02 * 2.0, epsilon = 1e-16);
        assert!(p.expectation(0.0, 0.01, 3.0).unwrap().is_finite());
    }

    #[test]
    fn invalid_construction() {
        let m = Measure::default();
        assert!(GsrProcess::new(vec![1.0], vec![0.01], vec![0.1, 0.1], m).is_err());
        assert!(GsrProcess::new(vec![1.0], vec![0.01, 0.01], vec![0.1], m).is_err());
        assert!(GsrProcess::new(vec![2.0, 1.0], vec![0.01; 3], vec![0.1; 3], m).is_err());
        assert!(GsrProcess::new(vec![0.0], vec![0.01; 2], vec![0.1; 2], m).is_err());
        assert!(GsrProcess::new(vec![], vec![0.01], vec![0.1], Measure::TForward(0.0)).is_err());
    }

    #[test]
    fn negative_horizon_is_invalid() {
        let p = two_regime();
        assert!(matches!(p.expectation(1.0, 0.0, -1.0), Err(Error::InvalidArgument(_))));
        assert!(matches!(p.variance(1.0, 0.0, -1.0), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn forward_measure_shifts_the_mean_down() {
        let fwd = two_regime();
        let rn = fwd.clone().with_measure(Measure::RiskNeutral);
        let m_fwd = fwd.expectation(0.0, 0.0, 4.0).unwrap();
        let m_rn = rn.expectation(0.0, 0.0, 4.0).unwrap();
        assert!(m_fwd < m_rn);
        assert_abs_diff_eq!(
            fwd.variance(0.0, 0.0, 4.0).unwrap(),
            rn.variance(0.0, 0.0, 4.0).unwrap(),
            epsilon = 1e-18
        );
    }

    proptest! {
        #[test]
        fn g_is_additive(t in 0.0f64..8.0, s in 0.0f64..8.0, big_t in 0.0f64..8.0) {
            let p = two_regime();
            let lhs = p.G(t, big_t);
            let rhs = p.G(t, s) + (-p.integrated_reversion(t, s)).exp() * p.G(s, big_t);
            prop_assert!((lhs - rhs).abs() < 1e-12);
        }

        #[test]
        fn variance_composes(w in 0.0f64..6.0, d1 in 0.0f64..4.0, d2 in 0.0f64..4.0) {
            let p = two_regime();
            let whole = p.variance(w, 0.0, d1 + d2).unwrap();
            let decay = (-2.0 * p.integrated_reversion(w + d1, w + d1 + d2)).exp();
            let split = p.variance(w, 0.0, d1).unwrap() * decay
                + p.variance(w + d1, 0.0, d2).unwrap();
            prop_assert!((whole - split).abs() < 1e-15);
        }

        #[test]
        fn expectation_has_the_tower_property(
            w in 0.0f64..6.0,
            d1 in 0.0f64..4.0,
            d2 in 0.0f64..4.0,
            x in -0.05f64..0.05,
        ) {
            for p in [two_regime(), two_regime().with_measure(Measure::RiskNeutral)] {
                let direct = p.expectation(w, x, d1 + d2).unwrap();
                let mid = p.expectation(w, x, d1).unwrap();
                let stepped = p.expectation(w + d1, mid, d2).unwrap();
                prop_assert!((direct - stepped).abs() < 1e-14);
            }
        }
    }
}
