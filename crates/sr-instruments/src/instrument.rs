//! `Instrument` base trait and pricing results (translates
//! `ql/instrument.hpp` and `ql/pricingengine.hpp`).
//!
//! Instruments are plain values; engines receive them together with the
//! market objects they need and return [`PricingResults`].

use sr_core::{errors::Result, Real, Time};
use std::collections::HashMap;

/// Results of pricing an instrument.
///
/// The NPV plus named diagnostics such as `"annuity"` or `"time_steps"`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PricingResults {
    /// Net present value.
    pub npv: Real,
    /// Additional named results.
    pub additional_results: HashMap<String, Real>,
}

impl PricingResults {
    /// Create pricing results with just an NPV.
    pub fn from_npv(npv: Real) -> Self {
        Self {
            npv,
            additional_results: HashMap::new(),
        }
    }

    /// Add a named result.
    pub fn with_result(mut self, key: impl Into<String>, value: Real) -> Self {
        self.additional_results.insert(key.into(), value);
        self
    }

    /// A named result, if present.
    pub fn result(&self, key: &str) -> Option<Real> {
        self.additional_results.get(key).copied()
    }
}

/// A pricing engine that needs nothing but its own market data.
///
/// Corresponds to `QuantLib::PricingEngine`.
pub trait PricingEngine<Args>: std::fmt::Debug + Send + Sync {
    /// Price the instrument described by `args`.
    fn calculate(&self, args: &Args) -> Result<PricingResults>;
}

/// Base trait for all financial instruments.
///
/// Corresponds to `QuantLib::Instrument`.
pub trait Instrument: std::fmt::Debug + Send + Sync {
    /// The last relevant time of the instrument.
    fn maturity_time(&self) -> Time;

    /// Whether the instrument lies entirely in the past.
    fn is_expired(&self) -> bool {
        self.maturity_time() < -sr_core::TIME_TOLERANCE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pricing_results_builder() {
        let r = PricingResults::from_npv(42.0)
            .with_result("annuity", 4.1)
            .with_result("time_steps", 100.0);
        assert!((r.npv - 42.0).abs() < 1e-15);
        assert_eq!(r.result("annuity"), Some(4.1));
        assert_eq!(r.result("time_steps"), Some(100.0));
        assert_eq!(r.result("missing"), None);
    }
}
