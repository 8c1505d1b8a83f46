//! Discounting swap pricing engine (translates
//! `ql/pricingengines/swap/discountingswapengine.hpp`).

use std::sync::Arc;

use sr_core::{errors::Result, Real, Time};
use sr_instruments::{FixedFloatSwap, PricingEngine, PricingResults};
use sr_termstructures::YieldTermStructure;

/// Discounting swap pricing engine.
///
/// $$\text{NPV} = \phi \left(N(P(T_0) − P(T_n)) − N K \sum_i \tau_i P(T_i)\right)$$
///
/// where $\phi = +1$ for a payer swap and $-1$ for a receiver.
///
/// Corresponds to `QuantLib::DiscountingSwapEngine`.
#[derive(Debug, Clone)]
pub struct DiscountingSwapEngine {
    discount_curve: Arc<dyn YieldTermStructure>,
}

impl DiscountingSwapEngine {
    /// Create a new engine with the given discount curve.
    pub fn new(discount_curve: Arc<dyn YieldTermStructure>) -> Self {
        Self { discount_curve }
    }
}

impl PricingEngine<FixedFloatSwap> for DiscountingSwapEngine {
    fn calculate(&self, swap: &FixedFloatSwap) -> Result<PricingResults> {
        let discount = |t: Time| -> Result<Real> { Ok(self.discount_curve.discount(t)) };
        let fixed = swap.fixed_leg_npv(discount)?;
        let floating = swap.floating_leg_npv(discount)?;
        Ok(PricingResults::from_npv(swap.swap_type().sign() * (floating - fixed))
            .with_result("fixed_leg_npv", fixed)
            .with_result("floating_leg_npv", floating)
            .with_result("annuity", swap.annuity(discount)?)
            .with_result("fair_rate", swap.fair_rate(discount)?))
    }
}
