//! # sr-processes
//!
//! State processes of the one-factor Gaussian short-rate models.
//!
//! - [`StochasticProcess1D`]: base trait with closed-form transition
//!   moments.
//! - [`GsrProcess`]: the GSR state `x = r − f(0,t)` with piecewise-constant
//!   volatility and reversion, under the T-forward or risk-neutral measure.
//! - [`HullWhiteForwardProcess`]: constant-parameter Hull-White short rate
//!   under the T-forward measure.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// ── Modules ───────────────────────────────────────────────────────────────────

/// `StochasticProcess1D`: base trait for 1-D processes.
pub mod stochastic_process;

/// `GsrProcess`: piecewise-constant Gaussian short-rate state process.
pub mod gsr_process;

/// `HullWhiteForwardProcess`: Hull-White under the T-forward measure.
pub mod hull_white_forward_process;

// ── Convenience re-exports ────────────────────────────────────────────────────

pub use gsr_process::{GsrProcess, Measure, DEFAULT_FORWARD_MEASURE_TIME};
pub use hull_white_forward_process::HullWhiteForwardProcess;
pub use stochastic_process::StochasticProcess1D;
