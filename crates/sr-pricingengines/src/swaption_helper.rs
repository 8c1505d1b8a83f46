//! Swaption calibration helper (translates
//! `ql/models/shortrate/calibrationhelpers/swaptionhelper.hpp`).

use std::sync::Arc;

use sr_core::{ensure, ensure_arg, errors::Result, Rate, Real, Time, Volatility};
use sr_instruments::{Exercise, FixedFloatSwap, OptionType, SwapType, Swaption};
use sr_models::{CalibrationErrorType, CalibrationHelper, Gaussian1dModel};
use sr_termstructures::YieldTermStructure;
use tracing::trace;

use crate::black_formula::{implied_std_dev, option_price, VolatilityType};
use crate::jamshidian_swaption_engine::JamshidianSwaptionEngine;
use crate::model_pricing_engine::ModelPricingEngine;

/// An at-the-money European receiver swaption quoted in volatility.
///
/// The strike is the forward swap rate from the curve; the market value is
/// the Black (or Bachelier) price on unit notional. Model values come from
/// a configurable engine, the Jamshidian engine by default.
///
/// Corresponds to `QuantLib::SwaptionHelper`.
#[derive(Debug, Clone)]
pub struct SwaptionHelper {
    swaption: Swaption,
    volatility: Volatility,
    volatility_type: VolatilityType,
    annuity: Real,
    market_value: Real,
    error_type: CalibrationErrorType,
    engine: Arc<dyn ModelPricingEngine<Swaption>>,
}

impl SwaptionHelper {
    /// A swaption expiring at `expiry` into a swap of length `tenor` paying
    /// fixed every `fixed_period`.
    ///
    /// # Errors
    /// `InvalidArgument` for a non-positive expiry or a tenor that is not a
    /// whole number of fixed periods; `Precondition` for a negative
    /// volatility or a forward the quoting convention cannot price.
    pub fn new(
        curve: &Arc<dyn YieldTermStructure>,
        expiry: Time,
        tenor: Time,
        fixed_period: Time,
        volatility: Volatility,
        volatility_type: VolatilityType,
    ) -> Result<Self> {
        ensure_arg!(expiry > 0.0, "swaption expiry must be positive, got {expiry}");
        ensure_arg!(fixed_period > 0.0, "fixed period must be positive, got {fixed_period}");
        let periods = (tenor / fixed_period).round();
        ensure_arg!(
            periods >= 1.0 && (periods * fixed_period - tenor).abs() < 1e-8,
            "tenor {tenor} is not a whole number of {fixed_period} periods"
        );
        ensure!(volatility >= 0.0, "volatility must be non-negative, got {volatility}");

        let discount = |t: Time| -> Result<Real> { Ok(curve.discount(t)) };
        let swap = FixedFloatSwap::regular(
            SwapType::Receiver,
            1.0,
            0.0,
            expiry,
            fixed_period,
            periods as usize,
        )?;
        let fair_rate = swap.fair_rate(discount)?;
        let swap = swap.with_fixed_rate(fair_rate);
        let annuity = swap.annuity(discount)?;
        let market_value = option_price(
            volatility_type,
            OptionType::Put,
            fair_rate,
            fair_rate,
            volatility * expiry.sqrt(),
            annuity,
        )?;
        trace!(expiry, tenor, fair_rate, annuity, market_value, "swaption helper quoted");

        Ok(Self {
            swaption: Swaption::new(swap, Exercise::european(expiry)?)?,
            volatility,
            volatility_type,
            annuity,
            market_value,
            error_type: CalibrationErrorType::default(),
            engine: Arc::new(JamshidianSwaptionEngine::new()),
        })
    }

    /// Use `error_type` to measure calibration errors.
    pub fn with_error_type(mut self, error_type: CalibrationErrorType) -> Self {
        self.error_type = error_type;
        self
    }

    /// Price the swaption with `engine` instead of the Jamshidian engine.
    pub fn with_engine(mut self, engine: Arc<dyn ModelPricingEngine<Swaption>>) -> Self {
        self.engine = engine;
        self
    }

    /// The underlying swaption.
    pub fn swaption(&self) -> &Swaption {
        &self.swaption
    }

    /// Option expiry.
    pub fn expiry(&self) -> Time {
        self.swaption.exercise().last_time()
    }

    /// The ATM strike.
    pub fn strike(&self) -> Rate {
        self.swaption.swap().fixed_rate()
    }

    /// Annuity of the underlying swap on the curve.
    pub fn annuity(&self) -> Real {
        self.annuity
    }

    /// Quoting convention of the market volatility.
    pub fn volatility_type(&self) -> VolatilityType {
        self.volatility_type
    }
}

impl<M: Gaussian1dModel> CalibrationHelper<M> for SwaptionHelper {
    fn market_value(&self) -> Real {
        self.market_value
    }

    fn model_value(&self, model: &M) -> Result<Real> {
        Ok(self.engine.calculate(model, &self.swaption)?.npv)
    }

    fn error_type(&self) -> CalibrationErrorType {
        self.error_type
    }

    fn market_volatility(&self) -> Result<Volatility> {
        Ok(self.volatility)
    }

    fn implied_volatility(&self, price: Real) -> Result<Volatility> {
        let strike = self.strike();
        let std_dev = implied_std_dev(
            self.volatility_type,
            OptionType::Put,
            strike,
            strike,
            price,
            self.annuity,
        )?;
        Ok(std_dev / self.expiry().sqrt())
    }
}
