//! Black and Bachelier formulas (translates `ql/pricingengines/blackformula.hpp`).
//!
//! All formulas take the total standard deviation `σ·√T` and a discount
//! (or annuity) multiplier, and return the undiscounted payoff expectation
//! times that multiplier.

use sr_core::{ensure, errors::Result, Real};
use sr_instruments::OptionType;
use sr_math::{brent, normal_cdf, normal_pdf};

const IMPLIED_ACCURACY: Real = 1e-12;
const MAX_DOUBLINGS: usize = 60;

/// Quoting convention of a volatility.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum VolatilityType {
    /// Lognormal volatility of the rate plus a displacement.
    ShiftedLognormal(Real),
    /// Normal (Bachelier) volatility.
    Normal,
}

impl Default for VolatilityType {
    fn default() -> Self {
        Self::ShiftedLognormal(0.0)
    }
}

/// Black formula with displacement.
///
/// Corresponds to `QuantLib::blackFormula`.
pub fn black_formula(
    option_type: OptionType,
    strike: Real,
    forward: Real,
    std_dev: Real,
    discount: Real,
    displacement: Real,
) -> Result<Real> {
    ensure!(std_dev >= 0.0, "standard deviation ({std_dev}) must be non-negative");
    ensure!(discount > 0.0, "discount ({discount}) must be positive");
    let (f, k) = (forward + displacement, strike + displacement);
    ensure!(f > 0.0, "displaced forward ({f}) must be positive");
    ensure!(k >= 0.0, "displaced strike ({k}) must be non-negative");

    let w = option_type.sign();
    if std_dev == 0.0 || k == 0.0 {
        return Ok(discount * (w * (f - k)).max(0.0));
    }
    let d1 = (f / k).ln() / std_dev + 0.5 * std_dev;
    let d2 = d1 - std_dev;
    let value = w * (f * normal_cdf(w * d1) - k * normal_cdf(w * d2));
    Ok(discount * value.max(0.0))
}

/// Bachelier (normal) formula.
///
/// Corresponds to `QuantLib::bachelierBlackFormula`.
pub fn bachelier_black_formula(
    option_type: OptionType,
    strike: Real,
    forward: Real,
    std_dev: Real,
    discount: Real,
) -> Result<Real> {
    ensure!(std_dev >= 0.0, "standard deviation ({std_dev}) must be non-negative");
    ensure!(discount > 0.0, "discount ({discount}) must be positive");
    let w = option_type.sign();
    let d = (forward - strike) * w;
    if std_dev == 0.0 {
        return Ok(discount * d.max(0.0));
    }
    let h = d / std_dev;
    Ok(discount * (d * normal_cdf(h) + std_dev * normal_pdf(h)).max(0.0))
}

/// Price under either quoting convention.
pub fn option_price(
    volatility_type: VolatilityType,
    option_type: OptionType,
    strike: Real,
    forward: Real,
    std_dev: Real,
    discount: Real,
) -> Result<Real> {
    match volatility_type {
        VolatilityType::ShiftedLognormal(shift) => {
            black_formula(option_type, strike, forward, std_dev, discount, shift)
        }
        VolatilityType::Normal => bachelier_black_formula(option_type, strike, forward, std_dev, discount),
    }
}

/// Total standard deviation reproducing `price`.
///
/// Solved with Brent on `[0, s]`, doubling `s` until the price is
/// bracketed.
///
/// Corresponds to `QuantLib::blackFormulaImpliedStdDev` and
/// `QuantLib::bachelierBlackFormulaImpliedVol`.
pub fn implied_std_dev(
    volatility_type: VolatilityType,
    option_type: OptionType,
    strike: Real,
    forward: Real,
    price: Real,
    discount: Real,
) -> Result<Real> {
    let value = |s: Real| option_price(volatility_type, option_type, strike, forward, s, discount);
    let intrinsic = value(0.0)?;
    ensure!(
        price >= intrinsic - IMPLIED_ACCURACY,
        "option price {price} below intrinsic value {intrinsic}"
    );
    if price <= intrinsic {
        return Ok(0.0);
    }

    let mut hi = match volatility_type {
        VolatilityType::ShiftedLognormal(_) => 0.5,
        VolatilityType::Normal => 0.01,
    };
    let mut doublings = 0;
    while value(hi)? < price {
        ensure!(
            doublings < MAX_DOUBLINGS,
            "no standard deviation reproduces option price {price}"
        );
        hi *= 2.0;
        doublings += 1;
    }
    brent(|s| Ok(value(s)? - price), 0.0, hi, IMPLIED_ACCURACY)
}
