//! # sr-models
//!
//! Calibratable one-factor Gaussian short-rate models.
//!
//! ## Trait layout
//!
//! ```text
//! CalibratedModel   (parameters, set_params, calibrate)
//! Gaussian1dModel   (zero bonds, numeraire, state process)
//! ├── HullWhite     constant a, σ
//! ├── Gsr           piecewise-constant σ(t), a(t)
//! └── ShortRateModel  sum type dispatching to the above
//! ```
//!
//! Calibration instruments implement [`CalibrationHelper`] for the model
//! type they price; the model is passed explicitly to every evaluation.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// ── Infrastructure ───────────────────────────────────────────────────────
pub mod calibrated_model;
pub mod calibration_helper;
pub mod gaussian1d_model;
pub mod parameter;

// ── Models ───────────────────────────────────────────────────────────────
pub mod gsr;
pub mod hull_white;
pub mod short_rate_model;

// ── Re-exports ───────────────────────────────────────────────────────────
pub use calibrated_model::{CalibratedModel, CalibrationFunction};
pub use calibration_helper::{CalibrationErrorType, CalibrationHelper};
pub use gaussian1d_model::Gaussian1dModel;
pub use gsr::Gsr;
pub use hull_white::HullWhite;
pub use parameter::Parameter;
pub use short_rate_model::ShortRateModel;
