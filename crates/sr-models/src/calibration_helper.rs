//! Calibration instruments (translates `ql/models/calibrationhelper.hpp`).
//!
//! A helper pairs a market quote with a way of pricing the same instrument
//! under a candidate model. The model is passed in on every call; helpers
//! never hold on to it.

use sr_core::{errors::Error, errors::Result, Real, Volatility};
use std::fmt;

/// How a helper measures the distance between model and market.
///
/// Corresponds to `QuantLib::BlackCalibrationHelper::CalibrationErrorType`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CalibrationErrorType {
    /// `(model − market) / market`.
    #[default]
    RelativePrice,
    /// `model − market`.
    Price,
    /// Implied volatility of the model price minus the market volatility.
    ImpliedVol,
}

/// A market instrument the model is calibrated to.
///
/// `M` is the model type the helper can price.
///
/// Corresponds to `QuantLib::CalibrationHelper`.
pub trait CalibrationHelper<M>: fmt::Debug + Send + Sync {
    /// Market price of the instrument.
    fn market_value(&self) -> Real;

    /// Price of the instrument under `model`.
    fn model_value(&self, model: &M) -> Result<Real>;

    /// Error measure used by [`calibration_error`](Self::calibration_error).
    fn error_type(&self) -> CalibrationErrorType {
        CalibrationErrorType::RelativePrice
    }

    /// Quoted market volatility, for helpers quoted in volatility.
    fn market_volatility(&self) -> Result<Volatility> {
        Err(Error::NotImplemented(
            "market volatility for this helper".into(),
        ))
    }

    /// Volatility implied by `price`, for helpers quoted in volatility.
    fn implied_volatility(&self, _price: Real) -> Result<Volatility> {
        Err(Error::NotImplemented(
            "implied volatility for this helper".into(),
        ))
    }

    /// Signed calibration error under `model`.
    fn calibration_error(&self, model: &M) -> Result<Real> {
        let model_value = self.model_value(model)?;
        match self.error_type() {
            CalibrationErrorType::RelativePrice => {
                let market = self.market_value();
                sr_core::ensure!(market != 0.0, "relative error against a zero market value");
                Ok((model_value - market) / market)
            }
            CalibrationErrorType::Price => Ok(model_value - self.market_value()),
            CalibrationErrorType::ImpliedVol => {
                Ok(self.implied_volatility(model_value)? - self.market_volatility()?)
            }
        }
    }
}
