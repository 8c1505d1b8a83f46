//! # sr-instruments
//!
//! Instruments priced by the short-rate engines. Schedules are given
//! directly as year fractions from the curve's reference date.
//!
//! ## Instruments
//!
//! - [`FixedFloatSwap`]: single-curve fixed-for-floating swap
//! - [`Swaption`]: European or Bermudan option to enter a swap
//! - [`BondOption`]: option on a zero-coupon bond

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// ── Modules ───────────────────────────────────────────────────────────────────

/// Exercise schedules.
pub mod exercise;

/// `Instrument` trait, pricing results and the curve engine trait.
pub mod instrument;

/// Option types.
pub mod option;

/// Fixed-for-floating swaps.
pub mod swap;

/// Swaptions.
pub mod swaption;

/// Zero-bond options.
pub mod bond_option;

// ── Convenience re-exports ────────────────────────────────────────────────────

pub use bond_option::BondOption;
pub use exercise::{Exercise, ExerciseType};
pub use instrument::{Instrument, PricingEngine, PricingResults};
pub use option::OptionType;
pub use swap::{FixedFloatSwap, SwapType};
pub use swaption::Swaption;
