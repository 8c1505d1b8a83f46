//! # shortrate
//!
//! One-factor Gaussian short-rate models (Hull–White and the piecewise
//! GSR model) with lattice, tree, finite-difference and analytic pricing of
//! swaptions and bond options, and calibration to swaption volatilities.
//!
//! This crate is a **façade** that re-exports the workspace crates.
//! Application code should depend on it rather than on the individual
//! `sr-*` crates.
//!
//! ## Quick start
//!
//! ```rust
//! use std::sync::Arc;
//! use chrono::NaiveDate;
//! use shortrate::instruments::{Exercise, FixedFloatSwap, SwapType, Swaption};
//! use shortrate::models::HullWhite;
//! use shortrate::pricingengines::{JamshidianSwaptionEngine, ModelPricingEngine};
//! use shortrate::termstructures::{FlatForward, YieldTermStructure};
//!
//! let date = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
//! let curve: Arc<dyn YieldTermStructure> = Arc::new(FlatForward::continuous(date, 0.03));
//! let model = HullWhite::new(curve, 0.05, 0.01).unwrap();
//!
//! let swap = FixedFloatSwap::regular(SwapType::Payer, 1.0, 0.03, 2.0, 1.0, 5).unwrap();
//! let swaption = Swaption::new(swap, Exercise::european(2.0).unwrap()).unwrap();
//! let npv = JamshidianSwaptionEngine::new().calculate(&model, &swaption).unwrap().npv;
//! assert!(npv > 0.0);
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

/// Core types, aliases, and error definitions.
pub use sr_core as core;

/// Arrays, interpolation, root finding and optimisation.
pub use sr_math as math;

/// Yield term structures.
pub use sr_termstructures as termstructures;

/// The GSR state process and its Hull–White counterpart.
pub use sr_processes as processes;

/// Calibratable short-rate models and calibration helpers.
pub use sr_models as models;

/// Time grids, lattices, trees and finite differences.
pub use sr_methods as methods;

/// Swaps, swaptions and bond options.
pub use sr_instruments as instruments;

/// Pricing engines and the swaption calibration helper.
pub use sr_pricingengines as pricingengines;
