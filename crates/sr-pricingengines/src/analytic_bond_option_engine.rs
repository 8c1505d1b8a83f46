//! Analytic zero-bond options (translates the `discountBondOption` closed
//! forms of `ql/models/shortrate/onefactormodels/hullwhite.cpp` and
//! `gsr.cpp`).
//!
//! In a Gaussian model `ln P(t,T,x)` is affine in the state, so the ratio
//! `P(t,T)/P(t,S)` seen at expiry `t` is lognormal under the `S`-forward
//! measure with total standard deviation
//!
//! $$\sigma_P = (G(t,T) − G(t,S))·\sqrt{y(t)}$$
//!
//! and the option is a Black formula on that forward ratio.

use sr_core::{ensure, ensure_arg, errors::Result, Real, Time};
use sr_instruments::{BondOption, ExerciseType, OptionType, PricingResults};
use sr_models::Gaussian1dModel;

use crate::black_formula::black_formula;
use crate::model_pricing_engine::{live_exercise_times, ModelPricingEngine};

/// Option expiring at `expiry` to exchange `strike` units of the bond
/// maturing at `bond_start` for one unit of the bond maturing at
/// `bond_maturity`. With `bond_start = expiry` this is a plain zero-bond
/// option with cash strike.
pub fn zero_bond_option(
    model: &dyn Gaussian1dModel,
    option_type: OptionType,
    strike: Real,
    expiry: Time,
    bond_start: Time,
    bond_maturity: Time,
) -> Result<Real> {
    ensure_arg!(expiry >= 0.0, "option expiry {expiry} is in the past");
    ensure!(
        expiry <= bond_start && bond_start <= bond_maturity,
        "bond option needs expiry ({expiry}) <= bond start ({bond_start}) <= maturity ({bond_maturity})"
    );
    let process = model.process();
    let curve = model.term_structure();
    let sd = (process.G(expiry, bond_maturity) - process.G(expiry, bond_start)) * process.y(expiry).sqrt();
    let p_start = curve.discount(bond_start);
    let forward = curve.discount(bond_maturity) / p_start;
    black_formula(option_type, strike, forward, sd, p_start, 0.0)
}

/// Analytic engine for European zero-bond options.
///
/// Corresponds to `QuantLib::AnalyticBondOptionEngine` for short-rate
/// models (`discountBondOption`).
#[derive(Debug, Clone, Copy, Default)]
pub struct AnalyticBondOptionEngine;

impl AnalyticBondOptionEngine {
    /// Create the engine.
    pub fn new() -> Self {
        Self
    }
}

impl ModelPricingEngine<BondOption> for AnalyticBondOptionEngine {
    fn calculate(&self, model: &dyn Gaussian1dModel, option: &BondOption) -> Result<PricingResults> {
        ensure!(
            option.exercise().exercise_type() == ExerciseType::European,
            "analytic bond option engine needs a European exercise"
        );
        let expiry = live_exercise_times(option)?[0];
        let npv = zero_bond_option(
            model,
            option.option_type(),
            option.strike(),
            expiry,
            expiry,
            option.bond_maturity(),
        )?;
        Ok(PricingResults::from_npv(npv))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use chrono::NaiveDate;
    use sr_math::normal_cdf;
    use sr_models::HullWhite;
    use sr_termstructures::{FlatForward, YieldTermStructure};
    use std::sync::Arc;

    fn model() -> HullWhite {
        let date = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
        let curve: Arc<dyn YieldTermStructure> = Arc::new(FlatForward::continuous(date, 0.04));
        HullWhite::new(curve, 0.1, 0.012).unwrap()
    }

    #[test]
    fn matches_the_hull_white_closed_form() {
        let model = model();
        let (a, sigma, s, t, k) = (0.1_f64, 0.012_f64, 2.0_f64, 7.0_f64, 0.8_f64);
        let b = (1.0 - (-a * (t - s)).exp()) / a;
        let sigma_p = sigma * b * ((1.0 - (-2.0 * a * s).exp()) / (2.0 * a)).sqrt();
        let (ps, pt) = ((-0.04 * s).exp(), (-0.04 * t).exp());
        let h = (pt / (k * ps)).ln() / sigma_p + 0.5 * sigma_p;
        let call = pt * normal_cdf(h) - k * ps * normal_cdf(h - sigma_p);

        let option = BondOption::european(OptionType::Call, k, s, t).unwrap();
        let npv = AnalyticBondOptionEngine::new().calculate(&model, &option).unwrap().npv;
        assert_abs_diff_eq!(npv, call, epsilon = 1e-12);
    }

    #[test]
    fn put_call_parity() {
        let model = model();
        let call = zero_bond_option(&model, OptionType::Call, 0.85, 1.0, 1.5, 6.0).unwrap();
        let put = zero_bond_option(&model, OptionType::Put, 0.85, 1.0, 1.5, 6.0).unwrap();
        let curve = model.term_structure();
        assert_abs_diff_eq!(call - put, curve.discount(6.0) - 0.85 * curve.discount(1.5), epsilon = 1e-14);
    }

    #[test]
    fn bermudan_and_expired_options_are_rejected() {
        let model = model();
        let bermudan = BondOption::new(
            OptionType::Call,
            0.9,
            sr_instruments::Exercise::bermudan(vec![1.0, 2.0]).unwrap(),
            5.0,
        )
        .unwrap();
        assert!(AnalyticBondOptionEngine::new().calculate(&model, &bermudan).is_err());
        let expired = BondOption::european(OptionType::Call, 0.9, -1.0, 5.0).unwrap();
        assert!(AnalyticBondOptionEngine::new().calculate(&model, &expired).is_err());
    }
}
