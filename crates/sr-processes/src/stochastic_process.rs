//! `StochasticProcess1D`: base trait for 1-D stochastic processes
//! (translates `ql/stochasticprocess.hpp`).
//!
//! A process `dX = μ(t,X) dt + σ(t,X) dW` is described by its drift and
//! diffusion. The transition moments over a horizon `Δt` default to the
//! Euler discretization; Gaussian processes override them with exact
//! closed forms. A negative horizon is a domain error.

use sr_core::{ensure_arg, errors::Result, Real, Time};

/// A 1-dimensional stochastic process.
///
/// Corresponds to `QuantLib::StochasticProcess1D`.
pub trait StochasticProcess1D: std::fmt::Debug + Send + Sync {
    /// Initial value of the process.
    fn x0(&self) -> Real;

    /// Drift `μ(t, x)`.
    fn drift(&self, t: Time, x: Real) -> Real;

    /// Diffusion `σ(t, x)`.
    fn diffusion(&self, t: Time, x: Real) -> Real;

    /// Expected value `E[x(t0+Δt) | x(t0) = x0]`.
    ///
    /// Default: Euler `x0 + μ(t0,x0)·Δt`.
    fn expectation(&self, t0: Time, x0: Real, dt: Time) -> Result<Real> {
        ensure_arg!(dt >= 0.0, "negative horizon {dt}");
        Ok(x0 + self.drift(t0, x0) * dt)
    }

    /// Variance of `x(t0+Δt)` given `x(t0) = x0`.
    ///
    /// Default: Euler `σ(t0,x0)²·Δt`.
    fn variance(&self, t0: Time, x0: Real, dt: Time) -> Result<Real> {
        ensure_arg!(dt >= 0.0, "negative horizon {dt}");
        let s = self.diffusion(t0, x0);
        Ok(s * s * dt)
    }

    /// Standard deviation of `x(t0+Δt)` given `x(t0) = x0`.
    fn std_deviation(&self, t0: Time, x0: Real, dt: Time) -> Result<Real> {
        Ok(self.variance(t0, x0, dt)?.sqrt())
    }

    /// One step: `E + sd·dw` for a standard normal draw `dw`.
    fn evolve(&self, t0: Time, x0: Real, dt: Time, dw: Real) -> Result<Real> {
        Ok(self.expectation(t0, x0, dt)? + self.std_deviation(t0, x0, dt)? * dw)
    }
}
