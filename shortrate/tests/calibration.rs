use std::sync::Arc;

use approx::assert_abs_diff_eq;
use chrono::NaiveDate;
use shortrate::math::{Constraint, EndCriteria, LevenbergMarquardt, OptimizationMethod, Simplex};
use shortrate::models::{
    CalibratedModel, CalibrationErrorType, CalibrationHelper, Gsr, HullWhite, ShortRateModel,
};
use shortrate::pricingengines::{SwaptionHelper, VolatilityType};
use shortrate::termstructures::{FlatForward, YieldTermStructure};
use proptest::prelude::*;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn curve() -> Arc<dyn YieldTermStructure> {
    let date = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
    Arc::new(FlatForward::continuous(date, 0.03))
}

fn helpers<M>(curve: &Arc<dyn YieldTermStructure>, vol: f64) -> Vec<Box<dyn CalibrationHelper<M>>>
where
    M: shortrate::models::Gaussian1dModel + 'static,
{
    [1.0, 2.0, 3.0, 4.0]
        .iter()
        .map(|&expiry| {
            let h = SwaptionHelper::new(curve, expiry, 5.0, 1.0, vol, VolatilityType::default()).unwrap();
            Box::new(h) as Box<dyn CalibrationHelper<M>>
        })
        .collect()
}

#[test]
fn levenberg_marquardt_and_simplex_agree() {
    init_tracing();
    let curve = curve();
    let helpers = helpers::<Gsr>(&curve, 0.2);
    let start = Gsr::new(curve.clone(), vec![2.0], vec![0.005, 0.005], vec![0.03]).unwrap();
    let fix = start.fixed_reversions();

    let mut fitted = Vec::new();
    for method in [
        &LevenbergMarquardt::default() as &dyn OptimizationMethod,
        &Simplex::new(0.002),
    ] {
        let mut model = start.clone();
        let outcome = model
            .calibrate(&helpers, method, &EndCriteria::default(), &Constraint::None, &[], &fix)
            .unwrap();
        assert!(outcome.succeeded(), "{outcome}");
        assert_eq!(model.reversions(), &[0.03]);
        let sse = model.calibration_value(&model.params(), &helpers, &[]).unwrap();
        info!(%outcome, sse, volatilities = ?model.volatilities(), "calibrated");
        fitted.push((model.volatilities().to_vec(), sse));
    }

    let (lm, simplex) = (&fitted[0], &fitted[1]);
    assert_abs_diff_eq!(lm.1, simplex.1, epsilon = 1e-5);
    for (a, b) in lm.0.iter().zip(&simplex.0) {
        assert_abs_diff_eq!(*a, *b, epsilon = 1e-4);
    }
}

/// Helpers quoted at the normal volatilities implied by `target`.
fn requoted_helpers(curve: &Arc<dyn YieldTermStructure>, target: &HullWhite) -> Vec<Box<dyn CalibrationHelper<HullWhite>>> {
    [1.0, 2.0, 5.0]
        .iter()
        .map(|&expiry| {
            let quote = SwaptionHelper::new(curve, expiry, 5.0, 1.0, 0.2, VolatilityType::Normal).unwrap();
            let price = quote.model_value(target).unwrap();
            let vol = CalibrationHelper::<HullWhite>::implied_volatility(&quote, price).unwrap();
            let h = SwaptionHelper::new(curve, expiry, 5.0, 1.0, vol, VolatilityType::Normal).unwrap();
            Box::new(h) as Box<dyn CalibrationHelper<HullWhite>>
        })
        .collect()
}

fn calibrated_sigma(curve: &Arc<dyn YieldTermStructure>, helpers: &[Box<dyn CalibrationHelper<HullWhite>>], start: f64) -> f64 {
    let mut model = HullWhite::new(curve.clone(), 0.05, start).unwrap();
    let outcome = model
        .calibrate(
            helpers,
            &LevenbergMarquardt::default(),
            &EndCriteria::default(),
            &Constraint::None,
            &[],
            &[true, false],
        )
        .unwrap();
    info!(%outcome, start, sigma = model.sigma(), "Hull-White volatility calibrated");
    assert!(outcome.succeeded(), "{outcome}");
    assert_eq!(model.a(), 0.05);
    model.sigma()
}

#[test]
fn recovers_the_volatility_behind_the_quotes() {
    init_tracing();
    let curve = curve();
    let target = HullWhite::new(curve.clone(), 0.05, 0.008).unwrap();
    let helpers = requoted_helpers(&curve, &target);
    assert_abs_diff_eq!(calibrated_sigma(&curve, &helpers, 0.012), 0.008, epsilon = 1e-7);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(8))]

    #[test]
    fn recovery_does_not_depend_on_the_starting_point(start in 0.004f64..0.02) {
        init_tracing();
        let curve = curve();
        let target = HullWhite::new(curve.clone(), 0.05, 0.008).unwrap();
        let helpers = requoted_helpers(&curve, &target);
        let sigma = calibrated_sigma(&curve, &helpers, start);
        prop_assert!((sigma - 0.008).abs() < 1e-6, "start {} ended at {}", start, sigma);
    }
}

#[test]
fn calibration_is_reproducible() {
    let curve = curve();
    let helpers = helpers::<ShortRateModel>(&curve, 0.25);
    let run = || {
        let mut model: ShortRateModel = HullWhite::new(curve.clone(), 0.03, 0.01).unwrap().into();
        model
            .calibrate(
                &helpers,
                &LevenbergMarquardt::default(),
                &EndCriteria::default(),
                &Constraint::None,
                &[],
                &[true, false],
            )
            .unwrap();
        model.params()
    };
    assert_eq!(run().as_slice(), run().as_slice());
}

#[test]
fn implied_volatility_errors_fit_the_quotes() {
    let curve = curve();
    let helpers: Vec<Box<dyn CalibrationHelper<Gsr>>> = [1.0, 2.0, 3.0]
        .iter()
        .map(|&expiry| {
            let h = SwaptionHelper::new(&curve, expiry, 4.0, 1.0, 0.006, VolatilityType::Normal)
                .unwrap()
                .with_error_type(CalibrationErrorType::ImpliedVol);
            Box::new(h) as Box<dyn CalibrationHelper<Gsr>>
        })
        .collect();
    let mut model = Gsr::new(curve, vec![1.0, 2.0], vec![0.01; 3], vec![0.02]).unwrap();
    let outcomes = model
        .calibrate_volatilities_iterative(
            &helpers,
            &LevenbergMarquardt::default(),
            &EndCriteria::default(),
            &Constraint::None,
        )
        .unwrap();
    assert!(outcomes.iter().all(|o| o.succeeded()));
    for helper in &helpers {
        assert_abs_diff_eq!(helper.calibration_error(&model).unwrap(), 0.0, epsilon = 1e-6);
    }
}
