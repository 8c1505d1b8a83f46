//! Optimization framework (translates `ql/math/optimization/`).
//!
//! A calibration is a least-squares [`Problem`]: a [`CostFunction`]
//! returning a residual vector, a [`Constraint`] on the parameters and a
//! starting point. Any [`OptimizationMethod`] minimizes it under an
//! [`EndCriteria`] and reports *why* it stopped as an [`EndCriteriaType`];
//! running out of iterations is an outcome, not an error.

mod levenberg_marquardt;
mod simplex;

pub use levenberg_marquardt::LevenbergMarquardt;
pub use simplex::Simplex;

use crate::array::Array;
use nalgebra::DMatrix;
use sr_core::{ensure, errors::Result, Real};
use std::fmt;

// ── Cost function ─────────────────────────────────────────────────────────────

/// A least-squares cost function.
///
/// Corresponds to `QuantLib::CostFunction`.
pub trait CostFunction: Send + Sync {
    /// Residual vector at `x`.
    fn values(&self, x: &Array) -> Result<Array>;

    /// Scalar cost: the sum of squared residuals.
    fn value(&self, x: &Array) -> Result<Real> {
        Ok(self.values(x)?.norm_squared())
    }

    /// Jacobian of the residuals (rows = residuals, columns = parameters).
    ///
    /// Default: forward differences with step `relative_step · |x_j|`
    /// (or `relative_step` itself when `x_j = 0`).
    fn jacobian(&self, x: &Array, relative_step: Real) -> Result<DMatrix<Real>> {
        let f0 = self.values(x)?;
        let mut jac = DMatrix::zeros(f0.size(), x.size());
        for j in 0..x.size() {
            let h = if x[j] == 0.0 {
                relative_step
            } else {
                relative_step * x[j].abs()
            };
            let mut xp = x.clone();
            xp[j] += h;
            let fp = self.values(&xp)?;
            for r in 0..f0.size() {
                jac[(r, j)] = (fp[r] - f0[r]) / h;
            }
        }
        Ok(jac)
    }
}

// ── Constraints ───────────────────────────────────────────────────────────────

/// A constraint on the parameter space.
///
/// Every variant acts coordinate by coordinate, so a constraint can be
/// restricted to a subset of the parameters (see [`Projection`]).
///
/// Corresponds to `QuantLib::Constraint` and its usual subclasses.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Constraint {
    /// All parameter values are accepted.
    #[default]
    None,
    /// All parameter values must be strictly positive.
    Positive,
    /// All parameter values must lie in `[lower, upper]`.
    Boundary {
        /// Lower bound (inclusive).
        lower: Real,
        /// Upper bound (inclusive).
        upper: Real,
    },
    /// One constraint per coordinate.
    PerComponent(Vec<Constraint>),
    /// Every listed constraint must hold.
    All(Vec<Constraint>),
}

impl Constraint {
    /// Return `true` if `x` satisfies the constraint.
    pub fn test(&self, x: &[Real]) -> bool {
        match self {
            Constraint::None => true,
            Constraint::Positive => x.iter().all(|&v| v > 0.0),
            Constraint::Boundary { lower, upper } => {
                x.iter().all(|&v| v >= *lower && v <= *upper)
            }
            Constraint::PerComponent(cs) => {
                cs.len() == x.len() && cs.iter().zip(x).all(|(c, v)| c.test(std::slice::from_ref(v)))
            }
            Constraint::All(cs) => cs.iter().all(|c| c.test(x)),
        }
    }

    /// Combine two constraints; both must hold.
    pub fn and(self, other: Constraint) -> Constraint {
        match (self, other) {
            (Constraint::None, c) | (c, Constraint::None) => c,
            (Constraint::All(mut cs), c) => {
                cs.push(c);
                Constraint::All(cs)
            }
            (a, b) => Constraint::All(vec![a, b]),
        }
    }

    /// Restrict the constraint to the coordinates flagged `true` in `free`.
    pub fn restrict(&self, free: &[bool]) -> Constraint {
        match self {
            Constraint::PerComponent(cs) => Constraint::PerComponent(
                cs.iter()
                    .zip(free)
                    .filter(|(_, &f)| f)
                    .map(|(c, _)| c.clone())
                    .collect(),
            ),
            Constraint::All(cs) => Constraint::All(cs.iter().map(|c| c.restrict(free)).collect()),
            other => other.clone(),
        }
    }
}

// ── End criteria ──────────────────────────────────────────────────────────────

/// Criteria to stop an optimization.
///
/// Corresponds to `QuantLib::EndCriteria`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EndCriteria {
    /// Maximum number of iterations.
    pub max_iterations: usize,
    /// Maximum number of consecutive stationary-state iterations.
    pub max_stationary_state_iterations: usize,
    /// Tolerance on the parameter vector (simplex size, step length).
    pub root_epsilon: Real,
    /// Tolerance on the relative change of the cost function.
    pub function_epsilon: Real,
    /// Tolerance on the gradient norm.
    pub gradient_norm_epsilon: Real,
}

impl EndCriteria {
    /// Create new end criteria.
    pub fn new(
        max_iterations: usize,
        max_stationary_state_iterations: usize,
        root_epsilon: Real,
        function_epsilon: Real,
        gradient_norm_epsilon: Real,
    ) -> Self {
        Self {
            max_iterations,
            max_stationary_state_iterations,
            root_epsilon,
            function_epsilon,
            gradient_norm_epsilon,
        }
    }

    /// `MaxIterations` once `iteration` reaches the cap.
    pub fn check_max_iterations(&self, iteration: usize) -> Option<EndCriteriaType> {
        (iteration >= self.max_iterations).then_some(EndCriteriaType::MaxIterations)
    }

    /// `StationaryFunctionValue` once more than
    /// `max_stationary_state_iterations` consecutive iterations changed the
    /// cost by less than `function_epsilon`; `stationary` counts them.
    pub fn check_stationary_function_value(
        &self,
        f_old: Real,
        f_new: Real,
        stationary: &mut usize,
    ) -> Option<EndCriteriaType> {
        let change = (f_new - f_old).abs();
        if change.is_nan() || change >= self.function_epsilon {
            *stationary = 0;
            return None;
        }
        *stationary += 1;
        (*stationary > self.max_stationary_state_iterations)
            .then_some(EndCriteriaType::StationaryFunctionValue)
    }

    /// `ZeroGradientNorm` when the gradient norm is below tolerance.
    pub fn check_zero_gradient_norm(&self, gradient_norm: Real) -> Option<EndCriteriaType> {
        (gradient_norm < self.gradient_norm_epsilon).then_some(EndCriteriaType::ZeroGradientNorm)
    }
}

impl Default for EndCriteria {
    fn default() -> Self {
        Self {
            max_iterations: 1000,
            max_stationary_state_iterations: 100,
            root_epsilon: 1e-8,
            function_epsilon: 1e-8,
            gradient_norm_epsilon: 1e-8,
        }
    }
}

/// The reason an optimization terminated.
///
/// Corresponds to `QuantLib::EndCriteria::Type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EndCriteriaType {
    /// No criterion was evaluated.
    None,
    /// Maximum iterations reached without convergence.
    MaxIterations,
    /// The parameters stopped moving.
    StationaryPoint,
    /// The cost stopped changing.
    StationaryFunctionValue,
    /// The cost reached the requested accuracy.
    StationaryFunctionAccuracy,
    /// The gradient vanished.
    ZeroGradientNorm,
    /// Stopped for a reason the method could not classify.
    Unknown,
}

impl EndCriteriaType {
    /// Return `true` for the criteria that indicate convergence.
    pub fn succeeded(self) -> bool {
        matches!(
            self,
            EndCriteriaType::StationaryPoint
                | EndCriteriaType::StationaryFunctionValue
                | EndCriteriaType::StationaryFunctionAccuracy
                | EndCriteriaType::ZeroGradientNorm
        )
    }
}

impl fmt::Display for EndCriteriaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EndCriteriaType::None => "None",
            EndCriteriaType::MaxIterations => "MaxIterations",
            EndCriteriaType::StationaryPoint => "StationaryPoint",
            EndCriteriaType::StationaryFunctionValue => "StationaryFunctionValue",
            EndCriteriaType::StationaryFunctionAccuracy => "StationaryFunctionAccuracy",
            EndCriteriaType::ZeroGradientNorm => "ZeroGradientNorm",
            EndCriteriaType::Unknown => "Unknown",
        };
        f.write_str(s)
    }
}

// ── Problem ───────────────────────────────────────────────────────────────────

/// A constrained least-squares problem and its optimization state.
///
/// Corresponds to `QuantLib::Problem`.
pub struct Problem<'a> {
    cost_function: &'a dyn CostFunction,
    constraint: &'a Constraint,
    current_value: Array,
    function_value: Real,
    gradient_norm_value: Real,
    function_evaluations: usize,
    gradient_evaluations: usize,
}

impl<'a> Problem<'a> {
    /// Create a problem starting from `initial_value`.
    pub fn new(
        cost_function: &'a dyn CostFunction,
        constraint: &'a Constraint,
        initial_value: Array,
    ) -> Self {
        Self {
            cost_function,
            constraint,
            current_value: initial_value,
            function_value: Real::NAN,
            gradient_norm_value: Real::NAN,
            function_evaluations: 0,
            gradient_evaluations: 0,
        }
    }

    /// Scalar cost at `x`.
    pub fn value(&mut self, x: &Array) -> Result<Real> {
        self.function_evaluations += 1;
        self.cost_function.value(x)
    }

    /// Residuals at `x`.
    pub fn values(&mut self, x: &Array) -> Result<Array> {
        self.function_evaluations += 1;
        self.cost_function.values(x)
    }

    /// Jacobian of the residuals at `x`.
    pub fn jacobian(&mut self, x: &Array, relative_step: Real) -> Result<DMatrix<Real>> {
        self.gradient_evaluations += 1;
        self.cost_function.jacobian(x, relative_step)
    }

    /// The constraint of the problem.
    pub fn constraint(&self) -> &Constraint {
        self.constraint
    }

    /// Current (best) parameter vector.
    pub fn current_value(&self) -> &Array {
        &self.current_value
    }

    /// Replace the current parameter vector.
    pub fn set_current_value(&mut self, x: Array) {
        self.current_value = x;
    }

    /// Cost at the current parameter vector.
    pub fn function_value(&self) -> Real {
        self.function_value
    }

    /// Record the cost at the current parameter vector.
    pub fn set_function_value(&mut self, f: Real) {
        self.function_value = f;
    }

    /// Last gradient norm computed by a gradient-based method.
    pub fn gradient_norm_value(&self) -> Real {
        self.gradient_norm_value
    }

    /// Record the gradient norm.
    pub fn set_gradient_norm_value(&mut self, g: Real) {
        self.gradient_norm_value = g;
    }

    /// Number of cost function evaluations.
    pub fn function_evaluations(&self) -> usize {
        self.function_evaluations
    }

    /// Number of Jacobian evaluations.
    pub fn gradient_evaluations(&self) -> usize {
        self.gradient_evaluations
    }
}

impl fmt::Debug for Problem<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Problem")
            .field("constraint", self.constraint)
            .field("current_value", &self.current_value)
            .field("function_value", &self.function_value)
            .field("function_evaluations", &self.function_evaluations)
            .finish()
    }
}

// ── Optimization method ───────────────────────────────────────────────────────

/// A pluggable minimizer.
///
/// On return the problem's current value holds the best point found.
///
/// Corresponds to `QuantLib::OptimizationMethod`.
pub trait OptimizationMethod: fmt::Debug + Send + Sync {
    /// Minimize `problem`; non-convergence is reported, not raised.
    fn minimize(
        &self,
        problem: &mut Problem<'_>,
        end_criteria: &EndCriteria,
    ) -> Result<EndCriteriaType>;
}

// ── Projection ────────────────────────────────────────────────────────────────

/// Maps a full parameter vector to its free coordinates and back.
///
/// Corresponds to `QuantLib::Projection`.
#[derive(Debug, Clone)]
pub struct Projection {
    actual: Array,
    free: Vec<bool>,
}

impl Projection {
    /// `fix[i] == true` keeps coordinate `i` at its value in `parameters`.
    /// An empty `fix` frees everything.
    pub fn new(parameters: &Array, fix: &[bool]) -> Result<Self> {
        ensure!(
            fix.is_empty() || fix.len() == parameters.size(),
            "fix flags ({}) do not match the number of parameters ({})",
            fix.len(),
            parameters.size()
        );
        let free: Vec<bool> = if fix.is_empty() {
            vec![true; parameters.size()]
        } else {
            fix.iter().map(|&f| !f).collect()
        };
        ensure!(free.iter().any(|&f| f), "all parameters are fixed");
        Ok(Self {
            actual: parameters.clone(),
            free,
        })
    }

    /// Free coordinates of `parameters`.
    pub fn project(&self, parameters: &Array) -> Array {
        Array::from_vec(
            parameters
                .iter()
                .zip(&self.free)
                .filter(|(_, &f)| f)
                .map(|(&v, _)| v)
                .collect(),
        )
    }

    /// Full vector with the free coordinates taken from `projected`.
    pub fn include(&self, projected: &Array) -> Array {
        let mut full = self.actual.clone();
        let mut k = 0;
        for (i, &f) in self.free.iter().enumerate() {
            if f {
                full[i] = projected[k];
                k += 1;
            }
        }
        full
    }

    /// `constraint` restricted to the free coordinates.
    pub fn restrict(&self, constraint: &Constraint) -> Constraint {
        constraint.restrict(&self.free)
    }
}
