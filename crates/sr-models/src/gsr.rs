//! Gaussian short-rate (GSR) model
//! (translates `ql/models/shortrate/onefactormodels/gsr.hpp`).
//!
//! A Hull-White model whose volatility and mean reversion are piecewise
//! constant between breakpoints. The reversion is either one value for
//! all regimes or one value per regime.

use crate::calibrated_model::CalibratedModel;
use crate::calibration_helper::CalibrationHelper;
use crate::gaussian1d_model::Gaussian1dModel;
use crate::parameter::Parameter;
use sr_core::{ensure, errors::Result, Real, Time};
use sr_math::{Array, Constraint, EndCriteria, EndCriteriaType, OptimizationMethod};
use sr_processes::{GsrProcess, Measure, DEFAULT_FORWARD_MEASURE_TIME};
use sr_termstructures::YieldTermStructure;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Piecewise-constant one-factor Gaussian model.
///
/// Parameters in calibration order: the volatilities (positive), then the
/// reversions (unconstrained).
///
/// Corresponds to `QuantLib::Gsr`.
#[derive(Clone)]
pub struct Gsr {
    term_structure: Arc<dyn YieldTermStructure>,
    breakpoints: Vec<Time>,
    arguments: Vec<Parameter>,
    forward_measure_time: Time,
    process: GsrProcess,
}

impl Gsr {
    /// Create a GSR model.
    ///
    /// `breakpoints` must be positive and strictly increasing; `vols` needs
    /// `breakpoints.len() + 1` entries and `reversions` either one entry or
    /// `breakpoints.len() + 1`.
    pub fn new(
        term_structure: Arc<dyn YieldTermStructure>,
        breakpoints: Vec<Time>,
        vols: Vec<Real>,
        reversions: Vec<Real>,
    ) -> Result<Self> {
        ensure!(
            vols.len() == breakpoints.len() + 1,
            "number of volatilities ({}) must be number of breakpoints ({}) + 1",
            vols.len(),
            breakpoints.len()
        );
        ensure!(
            reversions.len() == 1 || reversions.len() == breakpoints.len() + 1,
            "number of reversions ({}) must be 1 or number of breakpoints ({}) + 1",
            reversions.len(),
            breakpoints.len()
        );
        let arguments = vec![
            Parameter::new(vols, Constraint::Positive),
            Parameter::new(reversions, Constraint::None),
        ];
        let process = Self::build_process(&breakpoints, &arguments, DEFAULT_FORWARD_MEASURE_TIME)?;
        Ok(Self {
            term_structure,
            breakpoints,
            arguments,
            forward_measure_time: DEFAULT_FORWARD_MEASURE_TIME,
            process,
        })
    }

    /// Create a GSR model with a single reversion for all regimes.
    pub fn with_constant_reversion(
        term_structure: Arc<dyn YieldTermStructure>,
        breakpoints: Vec<Time>,
        vols: Vec<Real>,
        reversion: Real,
    ) -> Result<Self> {
        Self::new(term_structure, breakpoints, vols, vec![reversion])
    }

    /// The same model under the `t`-forward measure.
    pub fn with_forward_measure_time(mut self, t: Time) -> Result<Self> {
        self.process = Self::build_process(&self.breakpoints, &self.arguments, t)?;
        self.forward_measure_time = t;
        Ok(self)
    }

    fn build_process(
        breakpoints: &[Time],
        arguments: &[Parameter],
        forward_measure_time: Time,
    ) -> Result<GsrProcess> {
        let vols = arguments[0].values().to_vec();
        let reversions = match arguments[1].values() {
            [a] => vec![*a; vols.len()],
            many => many.to_vec(),
        };
        GsrProcess::new(
            breakpoints.to_vec(),
            vols,
            reversions,
            Measure::TForward(forward_measure_time),
        )
    }

    /// Regime breakpoints.
    pub fn breakpoints(&self) -> &[Time] {
        &self.breakpoints
    }

    /// Volatility per regime.
    pub fn volatilities(&self) -> &[Real] {
        self.arguments[0].values()
    }

    /// Reversion values (one, or one per regime).
    pub fn reversions(&self) -> &[Real] {
        self.arguments[1].values()
    }

    /// Fix flags that keep every reversion and free every volatility.
    pub fn fixed_reversions(&self) -> Vec<bool> {
        let mut fix = vec![false; self.volatilities().len()];
        fix.extend(std::iter::repeat(true).take(self.reversions().len()));
        fix
    }

    /// Fix flags that free only volatility `i`.
    pub fn move_volatility(&self, i: usize) -> Vec<bool> {
        let mut fix = vec![true; self.volatilities().len() + self.reversions().len()];
        if i < self.volatilities().len() {
            fix[i] = false;
        }
        fix
    }

    /// Bootstrap the volatilities one helper at a time: helper `i` fixes
    /// volatility `i` with everything else held constant. Helpers should be
    /// sorted by expiry, one per regime.
    pub fn calibrate_volatilities_iterative(
        &mut self,
        helpers: &[Box<dyn CalibrationHelper<Self>>],
        method: &dyn OptimizationMethod,
        end_criteria: &EndCriteria,
        constraint: &Constraint,
    ) -> Result<Vec<EndCriteriaType>> {
        ensure!(
            helpers.len() <= self.volatilities().len(),
            "{} helpers for {} volatilities",
            helpers.len(),
            self.volatilities().len()
        );
        let mut outcomes = Vec::with_capacity(helpers.len());
        for (i, helper) in helpers.iter().enumerate() {
            let fix = self.move_volatility(i);
            let outcome = self.calibrate(
                std::slice::from_ref(helper),
                method,
                end_criteria,
                constraint,
                &[],
                &fix,
            )?;
            debug!(regime = i, vol = self.volatilities()[i], %outcome, "volatility bootstrapped");
            outcomes.push(outcome);
        }
        Ok(outcomes)
    }
}

impl fmt::Debug for Gsr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Gsr")
            .field("breakpoints", &self.breakpoints)
            .field("volatilities", &self.volatilities())
            .field("reversions", &self.reversions())
            .field("forward_measure_time", &self.forward_measure_time)
            .finish()
    }
}

impl CalibratedModel for Gsr {
    fn arguments(&self) -> &[Parameter] {
        &self.arguments
    }

    fn set_params(&mut self, params: &Array) -> Result<()> {
        let n_vols = self.arguments[0].size();
        let n_revs = self.arguments[1].size();
        ensure!(
            params.size() == n_vols + n_revs,
            "GSR has {} parameters, got {}",
            n_vols + n_revs,
            params.size()
        );
        let mut arguments = self.arguments.clone();
        arguments[0].set_values(&params.as_slice()[..n_vols])?;
        arguments[1].set_values(&params.as_slice()[n_vols..])?;
        self.process = Self::build_process(&self.breakpoints, &arguments, self.forward_measure_time)?;
        self.arguments = arguments;
        Ok(())
    }
}

impl Gaussian1dModel for Gsr {
    fn term_structure(&self) -> &Arc<dyn YieldTermStructure> {
        &self.term_structure
    }

    fn process(&self) -> &GsrProcess {
        &self.process
    }
}
