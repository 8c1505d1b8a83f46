//! Trinomial tree engine (translates
//! `ql/pricingengines/swaption/treeswaptionengine.hpp`).

use sr_core::{errors::Result, Real};
use sr_instruments::PricingResults;
use sr_methods::{backward_induction, Lattice, ShortRateTree, TreeConfig};
use sr_models::Gaussian1dModel;

use crate::model_pricing_engine::{live_exercise_times, ExercisableClaim, ModelPricingEngine};

/// Backward induction on a curve-fitted [`ShortRateTree`].
///
/// Corresponds to `QuantLib::TreeSwaptionEngine`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TreeSwaptionEngine {
    config: TreeConfig,
}

impl TreeSwaptionEngine {
    /// Create the engine with the given tree settings.
    pub fn new(config: TreeConfig) -> Self {
        Self { config }
    }

    /// Create the engine with `time_steps` steps.
    pub fn with_time_steps(time_steps: usize) -> Self {
        Self::new(TreeConfig::default().with_time_steps(time_steps))
    }
}

impl<I: ExercisableClaim> ModelPricingEngine<I> for TreeSwaptionEngine {
    fn calculate(&self, model: &dyn Gaussian1dModel, claim: &I) -> Result<PricingResults> {
        let times = live_exercise_times(claim)?;
        if times.iter().all(|&t| t == 0.0) {
            return Ok(PricingResults::from_npv(claim.exercise_value(model, 0.0, 0.0)?));
        }
        let tree = ShortRateTree::new(model, &times, &self.config)?;
        let npv = backward_induction(&tree, &times, |t, x| claim.exercise_value(model, t, x))?;
        Ok(PricingResults::from_npv(npv).with_result("time_steps", (tree.times().len() - 1) as Real))
    }
}
