//! # sr-core
//!
//! Core types and error definitions shared by every crate of the short-rate
//! workspace: the primitive type aliases, the error enum, and the
//! `ensure!` / `ensure_arg!` / `ensure_post!` / `fail!` macros.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// ── Public modules ───────────────────────────────────────────────────────────

/// Error types and the `ensure!` / `fail!` family of macros.
pub mod errors;

// ── Primitive type aliases ────────────────────────────────────────────────────

/// Floating-point type used throughout the workspace.
pub type Real = f64;

/// Alias used for array sizes / indices.
pub type Size = usize;

/// A rate expressed as a decimal (e.g. 0.05 = 5 %).
pub type Rate = Real;

/// A discount factor in (0, 1].
pub type DiscountFactor = Real;

/// A probability in [0, 1].
pub type Probability = Real;

/// A volatility level expressed as a decimal.
pub type Volatility = Real;

/// A time measurement in years from the curve reference date.
pub type Time = Real;

/// Two times closer than this are treated as the same point on a grid.
pub const TIME_TOLERANCE: Time = 1.0e-10;

// ── Re-exports for convenience ────────────────────────────────────────────────

pub use errors::{Error, Result};
