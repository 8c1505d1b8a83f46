//! # sr-math
//!
//! Mathematical building blocks of the short-rate workspace: the `Array`
//! parameter vector (over nalgebra), the standard normal distribution (via
//! statrs), Brent root finding, 1-D interpolation, and the optimization
//! framework used by model calibration.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// ── Modules ───────────────────────────────────────────────────────────────────

/// Parameter vectors.
pub mod array;

/// Probability distributions.
pub mod distributions;

/// 1D interpolation schemes.
pub mod interpolations;

/// Cost functions, constraints, end criteria and optimizers.
pub mod optimization;

/// 1D root-finding solvers.
pub mod solvers1d;

// ── Convenience re-exports ────────────────────────────────────────────────────

pub use array::Array;
pub use distributions::{normal_cdf, normal_pdf};
pub use interpolations::{Interpolation1D, LinearInterpolation, LogLinearInterpolation};
pub use optimization::{
    Constraint, CostFunction, EndCriteria, EndCriteriaType, LevenbergMarquardt,
    OptimizationMethod, Problem, Projection, Simplex,
};
pub use solvers1d::{bracket, brent};
