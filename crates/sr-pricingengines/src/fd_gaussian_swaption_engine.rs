//! Finite-difference engine (translates
//! `ql/pricingengines/swaption/fdg2swaptionengine.hpp` for one factor).

use sr_core::{errors::Result, Real};
use sr_instruments::PricingResults;
use sr_methods::{FdConfig, FdGaussianSolver};
use sr_models::Gaussian1dModel;

use crate::model_pricing_engine::{live_exercise_times, ExercisableClaim, ModelPricingEngine};

/// Crank–Nicolson rollback of the deflated value on a uniform state mesh;
/// the NPV is read at the mesh point `x = 0`.
#[derive(Debug, Clone, Copy, Default)]
pub struct FdGaussianSwaptionEngine {
    config: FdConfig,
}

impl FdGaussianSwaptionEngine {
    /// Create the engine with the given mesh settings.
    pub fn new(config: FdConfig) -> Self {
        Self { config }
    }
}

impl<I: ExercisableClaim> ModelPricingEngine<I> for FdGaussianSwaptionEngine {
    fn calculate(&self, model: &dyn Gaussian1dModel, claim: &I) -> Result<PricingResults> {
        let times = live_exercise_times(claim)?;
        if times.iter().all(|&t| t == 0.0) {
            return Ok(PricingResults::from_npv(claim.exercise_value(model, 0.0, 0.0)?));
        }
        let solver = FdGaussianSolver::new(model, &times, &self.config)?;
        let npv = solver.rollback(&times, |t, x| claim.exercise_value(model, t, x))?;
        Ok(PricingResults::from_npv(npv)
            .with_result("grid_points", solver.mesher().size() as Real)
            .with_result("time_steps", solver.time_grid().steps() as Real))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{zero_bond_option, JamshidianSwaptionEngine};
    use approx::assert_abs_diff_eq;
    use chrono::NaiveDate;
    use sr_instruments::{BondOption, Exercise, FixedFloatSwap, OptionType, SwapType, Swaption};
    use sr_models::HullWhite;
    use sr_termstructures::{FlatForward, YieldTermStructure};
    use std::sync::Arc;

    fn model() -> HullWhite {
        let date = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
        let curve: Arc<dyn YieldTermStructure> = Arc::new(FlatForward::continuous(date, 0.03));
        HullWhite::new(curve, 0.05, 0.01).unwrap()
    }

    #[test]
    fn european_matches_jamshidian() {
        let model = model();
        let swap = FixedFloatSwap::regular(SwapType::Payer, 1.0, 0.03, 2.0, 1.0, 5).unwrap();
        let option = Swaption::new(swap, Exercise::european(2.0).unwrap()).unwrap();
        let fd = FdGaussianSwaptionEngine::default().calculate(&model, &option).unwrap();
        let analytic = JamshidianSwaptionEngine::new().calculate(&model, &option).unwrap().npv;
        assert_abs_diff_eq!(fd.npv, analytic, epsilon = 1e-4);
        assert_eq!(fd.result("grid_points"), Some(401.0));
        assert_eq!(fd.result("time_steps"), Some(100.0));
    }

    #[test]
    fn prices_bond_options() {
        let model = model();
        let option = BondOption::european(OptionType::Call, 0.86, 1.0, 5.0).unwrap();
        let npv = FdGaussianSwaptionEngine::default().calculate(&model, &option).unwrap().npv;
        let analytic = zero_bond_option(&model, OptionType::Call, 0.86, 1.0, 1.0, 5.0).unwrap();
        assert_abs_diff_eq!(npv, analytic, epsilon = 2e-5);
    }
}
