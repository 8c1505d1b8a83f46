//! Engines priced against a Gaussian short-rate model.
//!
//! A [`ModelPricingEngine`] receives the model on every call, so one engine
//! value serves any number of models (and the candidate models of a
//! calibration). The numerical engines price any [`ExercisableClaim`].

use sr_core::{ensure_arg, errors::Result, Real, Time};
use sr_instruments::{BondOption, Exercise, Instrument, PricingResults, Swaption};
use sr_models::Gaussian1dModel;
use std::fmt;

/// A pricing engine for instruments of type `I` under a short-rate model.
///
/// Corresponds to `QuantLib::GenericModelEngine`.
pub trait ModelPricingEngine<I>: fmt::Debug + Send + Sync {
    /// Price `instrument` under `model`.
    fn calculate(&self, model: &dyn Gaussian1dModel, instrument: &I) -> Result<PricingResults>;
}

/// An instrument paying a state-dependent amount when exercised.
pub trait ExercisableClaim: Instrument {
    /// When the claim can be exercised.
    fn exercise(&self) -> &Exercise;

    /// Currency value received on exercise at `t` in state `x`, never
    /// negative.
    fn exercise_value(&self, model: &dyn Gaussian1dModel, t: Time, x: Real) -> Result<Real>;
}

impl ExercisableClaim for Swaption {
    fn exercise(&self) -> &Exercise {
        Swaption::exercise(self)
    }

    fn exercise_value(&self, model: &dyn Gaussian1dModel, t: Time, x: Real) -> Result<Real> {
        let swap = self.underlying_at(t)?;
        Ok(swap.npv(|s| model.zero_bond(t, s, x))?.max(0.0))
    }
}

impl ExercisableClaim for BondOption {
    fn exercise(&self) -> &Exercise {
        BondOption::exercise(self)
    }

    fn exercise_value(&self, model: &dyn Gaussian1dModel, t: Time, x: Real) -> Result<Real> {
        Ok(self.payoff(model.zero_bond(t, self.bond_maturity(), x)?))
    }
}

/// Exercise times of a claim that are not in the past.
///
/// # Errors
/// `InvalidArgument` if the claim is expired.
pub fn live_exercise_times<I: ExercisableClaim + ?Sized>(claim: &I) -> Result<Vec<Time>> {
    let times = claim.exercise().live_times();
    ensure_arg!(
        !claim.is_expired() && !times.is_empty(),
        "instrument expired at {}",
        claim.exercise().last_time()
    );
    Ok(times)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use chrono::NaiveDate;
    use sr_core::Error;
    use sr_instruments::{FixedFloatSwap, OptionType, SwapType};
    use sr_models::HullWhite;
    use sr_termstructures::{FlatForward, YieldTermStructure};
    use std::sync::Arc;

    fn model() -> HullWhite {
        let date = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
        let curve: Arc<dyn YieldTermStructure> = Arc::new(FlatForward::continuous(date, 0.03));
        HullWhite::new(curve, 0.05, 0.01).unwrap()
    }

    #[test]
    fn swaption_exercise_value_is_the_positive_swap_value() {
        let model = model();
        let swap = FixedFloatSwap::regular(SwapType::Payer, 1.0, 0.01, 1.0, 1.0, 3).unwrap();
        let swaption = Swaption::new(swap.clone(), Exercise::european(1.0).unwrap()).unwrap();
        let value = swaption.exercise_value(&model, 1.0, 0.0).unwrap();
        let expected = swap.npv(|s| model.zero_bond(1.0, s, 0.0)).unwrap();
        assert!(expected > 0.0);
        assert_abs_diff_eq!(value, expected, epsilon = 1e-15);

        let receiver = Swaption::new(swap.with_swap_type(SwapType::Receiver), Exercise::european(1.0).unwrap()).unwrap();
        assert_eq!(receiver.exercise_value(&model, 1.0, 0.0).unwrap(), 0.0);
    }

    #[test]
    fn bond_option_exercise_value() {
        let model = model();
        let option = BondOption::european(OptionType::Put, 0.95, 1.0, 3.0).unwrap();
        let bond = model.zero_bond(1.0, 3.0, 0.01).unwrap();
        assert_abs_diff_eq!(
            option.exercise_value(&model, 1.0, 0.01).unwrap(),
            (0.95 - bond).max(0.0),
            epsilon = 1e-15
        );
    }

    #[test]
    fn expired_claims_are_rejected() {
        let option = BondOption::european(OptionType::Call, 0.9, -0.5, 3.0).unwrap();
        assert!(matches!(live_exercise_times(&option), Err(Error::InvalidArgument(_))));
        let live = BondOption::new(
            OptionType::Call,
            0.9,
            Exercise::bermudan(vec![-0.5, 0.5, 1.0]).unwrap(),
            3.0,
        )
        .unwrap();
        assert_eq!(live_exercise_times(&live).unwrap(), vec![0.5, 1.0]);
    }
}
