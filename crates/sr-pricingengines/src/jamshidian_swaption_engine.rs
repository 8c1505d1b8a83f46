//! Jamshidian swaption engine (translates
//! `ql/pricingengines/swaption/jamshidianswaptionengine.hpp`).
//!
//! At expiry `t` the underlying swap starting at `T_0 ≥ t` is worth, to the
//! receiver,
//!
//! ```text
//! V(x) = P(t,T_0,x) · (Σ a_k·Q_k(x) − N),   Q_k = P(t,T_k,x)/P(t,T_0,x)
//! ```
//!
//! with `a_k` the fixed amounts (plus the notional at maturity). Every
//! `Q_k` falls with `x`, so the bracket has a single root `x*` and the
//! swaption splits into options on the ratios `Q_k` struck at `Q_k(x*)`.

use sr_core::{ensure, errors::Result, Real, Time};
use sr_instruments::{ExerciseType, OptionType, PricingResults, SwapType, Swaption};
use sr_math::{bracket, brent};
use sr_models::Gaussian1dModel;
use tracing::trace;

use crate::analytic_bond_option_engine::zero_bond_option;
use crate::model_pricing_engine::{live_exercise_times, ModelPricingEngine};

const ROOT_ACCURACY: Real = 1e-14;

/// Analytic engine for European swaptions.
///
/// Corresponds to `QuantLib::JamshidianSwaptionEngine`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JamshidianSwaptionEngine;

impl JamshidianSwaptionEngine {
    /// Create the engine.
    pub fn new() -> Self {
        Self
    }
}

impl ModelPricingEngine<Swaption> for JamshidianSwaptionEngine {
    fn calculate(&self, model: &dyn Gaussian1dModel, swaption: &Swaption) -> Result<PricingResults> {
        ensure!(
            swaption.exercise().exercise_type() == ExerciseType::European,
            "Jamshidian engine needs a European exercise"
        );
        let expiry = live_exercise_times(swaption)?[0];
        let swap = swaption.underlying_at(expiry)?;
        let start = swap.start();
        let nominal = swap.nominal();

        let mut flows = swap.fixed_cash_flows();
        if let Some(last) = flows.last_mut() {
            last.1 += nominal;
        }

        let ratio = |t: Time, x: Real| -> Result<Real> {
            Ok(model.zero_bond(expiry, t, x)? / model.zero_bond(expiry, start, x)?)
        };
        let bracket_value = |x: Real| -> Result<Real> {
            let mut v = -nominal;
            for &(t, amount) in &flows {
                v += amount * ratio(t, x)?;
            }
            Ok(v)
        };

        let step = model.process().y(expiry).sqrt().max(1e-4);
        let (lo, hi) = bracket(&bracket_value, 0.0, step)?;
        let x_star = brent(&bracket_value, lo, hi, ROOT_ACCURACY)?;
        trace!(expiry, x_star, "Jamshidian critical state");

        let option_type = match swap.swap_type() {
            SwapType::Receiver => OptionType::Call,
            SwapType::Payer => OptionType::Put,
        };
        let mut npv = 0.0;
        for &(t, amount) in &flows {
            let strike = ratio(t, x_star)?;
            npv += amount * zero_bond_option(model, option_type, strike, expiry, start, t)?;
        }
        Ok(PricingResults::from_npv(npv).with_result("critical_state", x_star))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use chrono::NaiveDate;
    use sr_instruments::{Exercise, FixedFloatSwap};
    use sr_core::{ensure_arg, errors::Error};
    use sr_models::{Gsr, HullWhite};
    use sr_processes::GsrProcess;
    use sr_termstructures::{FlatForward, YieldTermStructure};
    use std::sync::Arc;

    /// Hull-White whose zero bonds are only defined for `|x| <= bound`.
    #[derive(Debug)]
    struct BoundedState {
        inner: HullWhite,
        bound: Real,
    }

    impl Gaussian1dModel for BoundedState {
        fn term_structure(&self) -> &Arc<dyn YieldTermStructure> {
            self.inner.term_structure()
        }

        fn process(&self) -> &GsrProcess {
            self.inner.process()
        }

        fn zero_bond(&self, t: Time, maturity: Time, x: Real) -> Result<Real> {
            ensure_arg!(x.abs() <= self.bound, "state {x} outside [-{0}, {0}]", self.bound);
            self.inner.zero_bond(t, maturity, x)
        }
    }

    fn curve() -> Arc<dyn YieldTermStructure> {
        let date = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
        Arc::new(FlatForward::continuous(date, 0.03))
    }

    fn swaption(swap_type: SwapType, rate: Real, expiry: Time, start: Time) -> Swaption {
        let swap = FixedFloatSwap::regular(swap_type, 1.0, rate, start, 1.0, 5).unwrap();
        Swaption::new(swap, Exercise::european(expiry).unwrap()).unwrap()
    }

    #[test]
    fn payer_receiver_parity() {
        let model = HullWhite::new(curve(), 0.05, 0.01).unwrap();
        let engine = JamshidianSwaptionEngine::new();
        for start in [2.0, 2.5] {
            let payer = engine.calculate(&model, &swaption(SwapType::Payer, 0.035, 2.0, start)).unwrap().npv;
            let receiver = engine.calculate(&model, &swaption(SwapType::Receiver, 0.035, 2.0, start)).unwrap().npv;
            let swap = FixedFloatSwap::regular(SwapType::Payer, 1.0, 0.035, start, 1.0, 5).unwrap();
            let forward = swap.npv(|t| Ok(model.term_structure().discount(t))).unwrap();
            assert_abs_diff_eq!(payer - receiver, forward, epsilon = 1e-12);
        }
    }

    #[test]
    fn one_period_swaption_is_a_bond_option() {
        // receiver on one period = (1 + K) calls on P(t, T_1) struck at 1/(1 + K)
        let model = HullWhite::new(curve(), 0.05, 0.01).unwrap();
        let swap = FixedFloatSwap::regular(SwapType::Receiver, 1.0, 0.03, 1.0, 1.0, 1).unwrap();
        let swaption = Swaption::new(swap, Exercise::european(1.0).unwrap()).unwrap();
        let npv = JamshidianSwaptionEngine::new().calculate(&model, &swaption).unwrap().npv;
        let expected = 1.03 * zero_bond_option(&model, OptionType::Call, 1.0 / 1.03, 1.0, 1.0, 2.0).unwrap();
        assert_abs_diff_eq!(npv, expected, epsilon = 1e-13);
    }

    #[test]
    fn single_regime_gsr_prices_like_hull_white() {
        let hw = HullWhite::new(curve(), 0.05, 0.01).unwrap();
        let gsr = Gsr::with_constant_reversion(curve(), vec![], vec![0.01], 0.05).unwrap();
        let engine = JamshidianSwaptionEngine::new();
        for rate in [0.02, 0.03, 0.04] {
            let swaption = swaption(SwapType::Payer, rate, 1.0, 1.0);
            let a = engine.calculate(&hw, &swaption).unwrap().npv;
            let b = engine.calculate(&gsr, &swaption).unwrap().npv;
            assert!(a > 0.0);
            assert_abs_diff_eq!(a, b, epsilon = 1e-10);
        }
    }

    #[test]
    fn bermudan_exercise_is_rejected() {
        let model = HullWhite::new(curve(), 0.05, 0.01).unwrap();
        let swap = FixedFloatSwap::regular(SwapType::Payer, 1.0, 0.03, 1.0, 1.0, 5).unwrap();
        let swaption = Swaption::new(swap, Exercise::bermudan(vec![1.0, 2.0]).unwrap()).unwrap();
        assert!(JamshidianSwaptionEngine::new().calculate(&model, &swaption).is_err());
    }

    #[test]
    fn model_errors_reach_the_caller() {
        // the critical state of a 15% receiver sits far above the bound
        let model = BoundedState { inner: HullWhite::new(curve(), 0.05, 0.01).unwrap(), bound: 0.02 };
        let engine = JamshidianSwaptionEngine::new();
        let r = engine.calculate(&model, &swaption(SwapType::Receiver, 0.15, 2.0, 2.0));
        assert!(matches!(r, Err(Error::InvalidArgument(_))), "{r:?}");

        let at_the_money = engine.calculate(&model, &swaption(SwapType::Receiver, 0.03, 2.0, 2.0)).unwrap().npv;
        let unbounded = engine
            .calculate(&model.inner, &swaption(SwapType::Receiver, 0.03, 2.0, 2.0))
            .unwrap()
            .npv;
        assert_abs_diff_eq!(at_the_money, unbounded, epsilon = 1e-14);
    }
}
