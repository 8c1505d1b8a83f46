//! Calibrated-model infrastructure
//! (translates `ql/models/model.hpp`, `CalibratedModel`).
//!
//! A calibration is a least-squares problem over the model's flattened
//! parameter vector. [`CalibrationFunction`] evaluates the weighted helper
//! errors on a *clone* of the model carrying the candidate parameters, so
//! the model being calibrated is only updated once, with the optimum.

use crate::calibration_helper::CalibrationHelper;
use crate::parameter::Parameter;
use sr_core::{ensure, errors::Result, Real};
use sr_math::{
    Array, Constraint, CostFunction, EndCriteria, EndCriteriaType, OptimizationMethod, Problem,
    Projection,
};
use std::fmt;
use tracing::{info, warn};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// A model whose parameters can be fitted to market instruments.
///
/// Corresponds to `QuantLib::CalibratedModel`.
pub trait CalibratedModel: Clone + fmt::Debug + Send + Sync {
    /// The model's parameters, in calibration order.
    fn arguments(&self) -> &[Parameter];

    /// Replace all parameter values from a flat vector and refresh any
    /// derived state.
    fn set_params(&mut self, params: &Array) -> Result<()>;

    /// All parameter values as a flat vector.
    fn params(&self) -> Array {
        Array::from_vec(
            self.arguments()
                .iter()
                .flat_map(|p| p.values().iter().copied())
                .collect(),
        )
    }

    /// Coordinate-wise constraint of the flat parameter vector.
    fn constraint(&self) -> Constraint {
        Constraint::PerComponent(
            self.arguments()
                .iter()
                .flat_map(|p| std::iter::repeat(p.constraint().clone()).take(p.size()))
                .collect(),
        )
    }

    /// Sum of weighted squared calibration errors at `params`.
    fn calibration_value(
        &self,
        params: &Array,
        helpers: &[Box<dyn CalibrationHelper<Self>>],
        weights: &[Real],
    ) -> Result<Real> {
        let projection = Projection::new(&self.params(), &[])?;
        let f = CalibrationFunction::new(self, helpers, weights, &projection)?;
        f.value(params)
    }

    /// Calibrate the model to `helpers`.
    ///
    /// `weights` (empty = all ones) scale the squared errors; parameters
    /// flagged in `fix_parameters` (empty = none) keep their current value.
    /// On return the model carries the best parameters found; the returned
    /// end criterion tells whether the optimizer converged.
    fn calibrate(
        &mut self,
        helpers: &[Box<dyn CalibrationHelper<Self>>],
        method: &dyn OptimizationMethod,
        end_criteria: &EndCriteria,
        constraint: &Constraint,
        weights: &[Real],
        fix_parameters: &[bool],
    ) -> Result<EndCriteriaType> {
        let start = self.params();
        let projection = Projection::new(&start, fix_parameters)?;
        let restricted = projection.restrict(&self.constraint().and(constraint.clone()));
        let function = CalibrationFunction::new(self, helpers, weights, &projection)?;
        info!(
            helpers = helpers.len(),
            parameters = start.size(),
            method = ?method,
            "starting calibration"
        );

        let mut problem = Problem::new(&function, &restricted, projection.project(&start));
        let outcome = method.minimize(&mut problem, end_criteria)?;
        let best = projection.include(problem.current_value());
        let value = problem.function_value();
        let evaluations = problem.function_evaluations();
        drop(problem);
        drop(function);

        self.set_params(&best)?;
        if outcome.succeeded() {
            info!(%outcome, value, evaluations, params = %best, "calibration finished");
        } else {
            warn!(%outcome, value, evaluations, params = %best, "calibration did not converge");
        }
        Ok(outcome)
    }
}

/// Weighted calibration residuals `√wᵢ·errorᵢ` as a function of the free
/// parameters.
///
/// Corresponds to `QuantLib::CalibratedModel::CalibrationFunction`.
pub struct CalibrationFunction<'a, M: CalibratedModel> {
    model: &'a M,
    helpers: &'a [Box<dyn CalibrationHelper<M>>],
    sqrt_weights: Vec<Real>,
    projection: &'a Projection,
}

impl<'a, M: CalibratedModel> CalibrationFunction<'a, M> {
    /// Bind a model template, its helpers and weights (empty = all ones).
    pub fn new(
        model: &'a M,
        helpers: &'a [Box<dyn CalibrationHelper<M>>],
        weights: &[Real],
        projection: &'a Projection,
    ) -> Result<Self> {
        ensure!(!helpers.is_empty(), "no calibration helpers given");
        ensure!(
            weights.is_empty() || weights.len() == helpers.len(),
            "number of weights ({}) differs from number of helpers ({})",
            weights.len(),
            helpers.len()
        );
        ensure!(
            weights.iter().all(|&w| w >= 0.0),
            "calibration weights must be non-negative"
        );
        let sqrt_weights = if weights.is_empty() {
            vec![1.0; helpers.len()]
        } else {
            weights.iter().map(|w| w.sqrt()).collect()
        };
        Ok(Self {
            model,
            helpers,
            sqrt_weights,
            projection,
        })
    }

    fn candidate(&self, x: &Array) -> Result<M> {
        let mut model = self.model.clone();
        model.set_params(&self.projection.include(x))?;
        Ok(model)
    }
}

impl<M: CalibratedModel> CostFunction for CalibrationFunction<'_, M> {
    #[cfg(not(feature = "parallel"))]
    fn values(&self, x: &Array) -> Result<Array> {
        let model = self.candidate(x)?;
        let residuals = self
            .helpers
            .iter()
            .zip(&self.sqrt_weights)
            .map(|(h, w)| -> Result<Real> { Ok(w * h.calibration_error(&model)?) })
            .collect::<Result<Vec<Real>>>()?;
        Ok(Array::from_vec(residuals))
    }

    #[cfg(feature = "parallel")]
    fn values(&self, x: &Array) -> Result<Array> {
        let model = self.candidate(x)?;
        let residuals = self
            .helpers
            .par_iter()
            .zip(self.sqrt_weights.par_iter())
            .map(|(h, w)| -> Result<Real> { Ok(w * h.calibration_error(&model)?) })
            .collect::<Result<Vec<Real>>>()?;
        Ok(Array::from_vec(residuals))
    }
}

impl<M: CalibratedModel> fmt::Debug for CalibrationFunction<'_, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CalibrationFunction")
            .field("model", self.model)
            .field("helpers", &self.helpers.len())
            .finish()
    }
}
