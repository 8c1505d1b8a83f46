//! # sr-termstructures
//!
//! Yield curves consumed by the short-rate models: the [`TermStructure`]
//! base trait, the [`YieldTermStructure`] trait with its
//! discount / zero-rate / forward-rate trio, a constant-rate
//! [`FlatForward`] curve and a log-linear [`InterpolatedDiscountCurve`].

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// ── Modules ───────────────────────────────────────────────────────────────────

/// `TermStructure`: base trait for all term structures.
pub mod term_structure;

/// `YieldTermStructure`: yield / interest-rate term structures.
pub mod yield_term_structure;

/// `FlatForward`: constant forward-rate yield curve.
pub mod flat_forward;

/// `InterpolatedDiscountCurve`: discount-factor interpolated yield curve.
pub mod interpolated_discount_curve;

// ── Convenience re-exports ────────────────────────────────────────────────────

pub use flat_forward::FlatForward;
pub use interpolated_discount_curve::InterpolatedDiscountCurve;
pub use term_structure::TermStructure;
pub use yield_term_structure::YieldTermStructure;
