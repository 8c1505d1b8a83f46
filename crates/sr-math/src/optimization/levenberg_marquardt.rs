//! Levenberg–Marquardt least squares
//! (translates `ql/math/optimization/levenbergmarquardt.hpp`).

use super::{EndCriteria, EndCriteriaType, OptimizationMethod, Problem};
use crate::array::Array;
use nalgebra::{DMatrix, DVector};
use sr_core::{ensure, errors::Result, Real};
use tracing::{debug, trace};

const MAX_DAMPING: Real = 1.0e20;
const MIN_DIAGONAL: Real = 1.0e-30;

/// Damped Gauss–Newton minimizer for sums of squared residuals.
///
/// Each iteration solves `(JᵀJ + μ·D)·δ = −Jᵀr`, with `D` the diagonal of
/// `JᵀJ`. A step that leaves the feasible region or fails to reduce the
/// cost is rejected and the damping `μ` raised; accepted steps lower it
/// according to the gain ratio. The Jacobian is built by forward
/// differences with relative step `√epsfcn`.
///
/// Stopping follows the [`EndCriteria`]: `gradient_norm_epsilon` bounds the
/// largest entry of `Jᵀr`, `root_epsilon` the step length relative to the
/// parameters and `function_epsilon` the relative cost reduction of an
/// accepted step.
///
/// Corresponds to `QuantLib::LevenbergMarquardt`.
#[derive(Debug, Clone)]
pub struct LevenbergMarquardt {
    epsfcn: Real,
}

impl LevenbergMarquardt {
    /// Create an optimizer whose Jacobian steps are `√epsfcn` relative.
    pub fn new(epsfcn: Real) -> Self {
        Self { epsfcn }
    }

    fn relative_step(&self) -> Real {
        self.epsfcn.max(Real::EPSILON).sqrt()
    }
}

impl Default for LevenbergMarquardt {
    fn default() -> Self {
        Self::new(1.0e-8)
    }
}

impl OptimizationMethod for LevenbergMarquardt {
    fn minimize(
        &self,
        problem: &mut Problem<'_>,
        end_criteria: &EndCriteria,
    ) -> Result<EndCriteriaType> {
        let mut x = problem.current_value().clone();
        let n = x.size();
        ensure!(n > 0, "Levenberg-Marquardt: empty parameter vector");
        ensure!(
            problem.constraint().test(x.as_slice()),
            "Levenberg-Marquardt: initial guess {x} violates the constraint"
        );

        let mut residuals = problem.values(&x)?;
        ensure!(
            residuals.is_finite(),
            "Levenberg-Marquardt: non-finite residuals at the initial guess"
        );
        let mut f = residuals.norm_squared();
        let mut mu: Option<Real> = None;
        let mut nu = 2.0;
        let mut iteration = 0;

        let outcome = 'outer: loop {
            if let Some(ec) = end_criteria.check_max_iterations(iteration) {
                break ec;
            }
            iteration += 1;

            let jac: DMatrix<Real> = problem.jacobian(&x, self.relative_step())?;
            let jt = jac.transpose();
            let jtj = &jt * &jac;
            let grad: DVector<Real> = &jt * residuals.inner();
            let gnorm = grad.amax();
            problem.set_gradient_norm_value(gnorm);
            trace!(iteration, cost = f, gradient = gnorm, "Levenberg-Marquardt iteration");
            if let Some(ec) = end_criteria.check_zero_gradient_norm(gnorm) {
                break ec;
            }

            let diag: DVector<Real> = jtj.diagonal().map(|d| d.max(MIN_DIAGONAL));
            let mut damping = mu.unwrap_or_else(|| 1.0e-3 * diag.max());

            loop {
                let mut lhs = jtj.clone();
                for i in 0..n {
                    lhs[(i, i)] += damping * diag[i];
                }
                let Some(chol) = lhs.cholesky() else {
                    damping *= nu;
                    nu *= 2.0;
                    if damping > MAX_DAMPING {
                        break 'outer EndCriteriaType::StationaryPoint;
                    }
                    continue;
                };
                let delta = chol.solve(&(-&grad));
                let xtol = end_criteria.root_epsilon;
                if delta.norm() <= xtol * (x.norm() + xtol) {
                    break 'outer EndCriteriaType::StationaryPoint;
                }

                let candidate = Array::from(x.inner() + &delta);
                let mut improved = None;
                if problem.constraint().test(candidate.as_slice()) {
                    let r = problem.values(&candidate)?;
                    let f_new = r.norm_squared();
                    if f_new.is_finite() && f_new < f {
                        improved = Some((r, f_new));
                    }
                }

                match improved {
                    Some((r, f_new)) => {
                        let scaled: DVector<Real> = delta.component_mul(&diag) * damping;
                        let predicted = delta.dot(&(scaled - &grad));
                        let rho = if predicted > 0.0 {
                            (f - f_new) / predicted
                        } else {
                            1.0
                        };
                        let f_old = f;
                        x = candidate;
                        residuals = r;
                        f = f_new;
                        damping *= (1.0 - (2.0 * rho - 1.0).powi(3)).max(1.0 / 3.0);
                        nu = 2.0;
                        mu = Some(damping);
                        if f == 0.0 || f_old - f <= end_criteria.function_epsilon * f_old {
                            break 'outer EndCriteriaType::StationaryFunctionValue;
                        }
                        break;
                    }
                    None => {
                        damping *= nu;
                        nu *= 2.0;
                        if damping > MAX_DAMPING {
                            break 'outer EndCriteriaType::StationaryPoint;
                        }
                    }
                }
            }
        };

        debug!(
            iterations = iteration,
            value = f,
            evaluations = problem.function_evaluations(),
            outcome = %outcome,
            "Levenberg-Marquardt finished"
        );
        problem.set_current_value(x);
        problem.set_function_value(f);
        Ok(outcome)
    }
}
