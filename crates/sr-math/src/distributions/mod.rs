//! Probability distributions.
//!
//! Only the standard normal is needed by the Gaussian short-rate core; it
//! delegates to the error functions of the `statrs` crate.

pub mod normal;

pub use normal::{normal_cdf, normal_pdf};
