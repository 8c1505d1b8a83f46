//! The one-factor Gaussian model family as a closed sum type.
//!
//! Engines and helpers are written against [`Gaussian1dModel`]; the enum
//! lets callers hold "some short-rate model" by value, calibrate it and
//! hand it to any engine without trait objects.

use crate::calibrated_model::CalibratedModel;
use crate::gaussian1d_model::Gaussian1dModel;
use crate::gsr::Gsr;
use crate::hull_white::HullWhite;
use crate::parameter::Parameter;
use sr_core::errors::Result;
use sr_math::Array;
use sr_processes::GsrProcess;
use sr_termstructures::YieldTermStructure;
use std::sync::Arc;

/// A one-factor Gaussian short-rate model.
#[derive(Debug, Clone)]
pub enum ShortRateModel {
    /// Constant-parameter Hull-White.
    HullWhite(HullWhite),
    /// Piecewise-constant GSR.
    Gsr(Gsr),
}

impl From<HullWhite> for ShortRateModel {
    fn from(m: HullWhite) -> Self {
        ShortRateModel::HullWhite(m)
    }
}

impl From<Gsr> for ShortRateModel {
    fn from(m: Gsr) -> Self {
        ShortRateModel::Gsr(m)
    }
}

impl CalibratedModel for ShortRateModel {
    fn arguments(&self) -> &[Parameter] {
        match self {
            ShortRateModel::HullWhite(m) => m.arguments(),
            ShortRateModel::Gsr(m) => m.arguments(),
        }
    }

    fn set_params(&mut self, params: &Array) -> Result<()> {
        match self {
            ShortRateModel::HullWhite(m) => m.set_params(params),
            ShortRateModel::Gsr(m) => m.set_params(params),
        }
    }
}

impl Gaussian1dModel for ShortRateModel {
    fn term_structure(&self) -> &Arc<dyn YieldTermStructure> {
        match self {
            ShortRateModel::HullWhite(m) => m.term_structure(),
            ShortRateModel::Gsr(m) => m.term_structure(),
        }
    }

    fn process(&self) -> &GsrProcess {
        match self {
            ShortRateModel::HullWhite(m) => m.process(),
            ShortRateModel::Gsr(m) => m.process(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use sr_termstructures::FlatForward;

    #[test]
    fn dispatches_to_the_variant() {
        let d = NaiveDate::from_ymd_opt(2025, 1, 2).unwrap();
        let ts: Arc<dyn YieldTermStructure> = Arc::new(FlatForward::continuous(d, 0.03));
        let hw: ShortRateModel = HullWhite::new(ts.clone(), 0.05, 0.01).unwrap().into();
        let gsr: ShortRateModel =
            Gsr::with_constant_reversion(ts, vec![2.0], vec![0.01, 0.01], 0.05).unwrap().into();
        assert_eq!(hw.params().as_slice(), &[0.05, 0.01]);
        assert_eq!(gsr.params().as_slice(), &[0.01, 0.01, 0.05]);
        let p_hw = hw.zero_bond(1.0, 5.0, 0.01).unwrap();
        let p_gsr = gsr.zero_bond(1.0, 5.0, 0.01).unwrap();
        assert!((p_hw - p_gsr).abs() < 1e-14);

        let mut m = hw;
        m.set_params(&Array::from_slice(&[0.07, 0.02])).unwrap();
        assert_eq!(m.process().sigma(0.0), 0.02);
        assert_eq!(m.state_process(), m.state_process());
    }
}
