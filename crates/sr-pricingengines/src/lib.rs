//! # sr-pricingengines
//!
//! Pricing engines for the Gaussian short-rate models and the swaption
//! calibration helper.
//!
//! ## Engines
//!
//! - [`AnalyticBondOptionEngine`]: closed-form zero-bond option
//! - [`JamshidianSwaptionEngine`]: European swaption by Jamshidian's decomposition
//! - [`Gaussian1dSwaptionEngine`]: backward induction on the Gaussian lattice
//! - [`TreeSwaptionEngine`]: backward induction on a fitted trinomial tree
//! - [`FdGaussianSwaptionEngine`]: Crank–Nicolson finite differences
//! - [`DiscountingSwapEngine`]: swap legs, annuity and fair rate off the curve
//!
//! The model engines implement [`ModelPricingEngine`] and receive the model
//! on every call.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod analytic_bond_option_engine;
pub mod black_formula;
pub mod discounting_swap_engine;
pub mod fd_gaussian_swaption_engine;
pub mod gaussian1d_swaption_engine;
pub mod jamshidian_swaption_engine;
pub mod model_pricing_engine;
pub mod swaption_helper;
pub mod tree_swaption_engine;

pub use analytic_bond_option_engine::{zero_bond_option, AnalyticBondOptionEngine};
pub use black_formula::{
    bachelier_black_formula, black_formula, implied_std_dev, option_price, VolatilityType,
};
pub use discounting_swap_engine::DiscountingSwapEngine;
pub use fd_gaussian_swaption_engine::FdGaussianSwaptionEngine;
pub use gaussian1d_swaption_engine::Gaussian1dSwaptionEngine;
pub use jamshidian_swaption_engine::JamshidianSwaptionEngine;
pub use model_pricing_engine::{live_exercise_times, ExercisableClaim, ModelPricingEngine};
pub use swaption_helper::SwaptionHelper;
pub use tree_swaption_engine::TreeSwaptionEngine;
