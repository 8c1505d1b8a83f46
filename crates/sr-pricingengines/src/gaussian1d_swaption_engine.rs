//! Gaussian lattice engine (translates
//! `ql/pricingengines/swaption/gaussian1dswaptionengine.hpp`).

use sr_core::{errors::Result, Real};
use sr_instruments::PricingResults;
use sr_methods::{backward_induction, GaussianLattice, LatticeConfig};
use sr_models::Gaussian1dModel;
use tracing::debug;

use crate::model_pricing_engine::{live_exercise_times, ExercisableClaim, ModelPricingEngine};

/// Backward induction on a [`GaussianLattice`] through the exercise times.
///
/// Prices European and Bermudan swaptions and bond options; the NPV is read
/// on the single node of the initial slice.
///
/// Corresponds to `QuantLib::Gaussian1dSwaptionEngine`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Gaussian1dSwaptionEngine {
    config: LatticeConfig,
}

impl Gaussian1dSwaptionEngine {
    /// Create the engine with the given lattice settings.
    pub fn new(config: LatticeConfig) -> Self {
        Self { config }
    }

    /// The lattice settings.
    pub fn config(&self) -> &LatticeConfig {
        &self.config
    }
}

impl<I: ExercisableClaim> ModelPricingEngine<I> for Gaussian1dSwaptionEngine {
    fn calculate(&self, model: &dyn Gaussian1dModel, claim: &I) -> Result<PricingResults> {
        let times = live_exercise_times(claim)?;
        let lattice = GaussianLattice::new(model, &times, &self.config)?;
        let npv = backward_induction(&lattice, &times, |t, x| claim.exercise_value(model, t, x))?;
        debug!(npv, slices = lattice.slices(), "lattice rollback done");
        Ok(PricingResults::from_npv(npv)
            .with_result("lattice_slices", lattice.slices() as Real)
            .with_result("grid_points", self.config.nodes as Real))
    }
}
