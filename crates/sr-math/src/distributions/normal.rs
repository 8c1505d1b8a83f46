//! Standard normal distribution (translates
//! `ql/math/distributions/normaldistribution.hpp`).
//!
//! The cumulative function is computed from the complementary error function
//! of `statrs`, which keeps full relative accuracy deep in the left tail.
//! Lattice transition weights rely on that accuracy.

use sr_core::Real;
use statrs::function::erf::erfc;
use std::f64::consts::FRAC_1_SQRT_2;

const INV_SQRT_2PI: Real = 0.398_942_280_401_432_7;

/// The standard normal probability density `φ(x) = exp(-x²/2) / √(2π)`.
#[inline]
pub fn normal_pdf(x: Real) -> Real {
    INV_SQRT_2PI * (-0.5 * x * x).exp()
}

/// The standard normal cumulative distribution function `Φ(x)`.
#[inline]
pub fn normal_cdf(x: Real) -> Real {
    0.5 * erfc(-x * FRAC_1_SQRT_2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn cdf_reference_values() {
        assert_abs_diff_eq!(normal_cdf(0.0), 0.5, epsilon = 1e-15);
        assert_abs_diff_eq!(normal_cdf(1.0), 0.841_344_746_068_542_9, epsilon = 1e-14);
        assert_abs_diff_eq!(normal_cdf(-1.96), 0.024_997_895_148_220_4, epsilon = 1e-14);
        // left tail keeps relative accuracy
        let tail = normal_cdf(-10.0);
        assert!((tail / 7.619_853_024_160_527e-24 - 1.0).abs() < 1e-10);
    }

    #[test]
    fn pdf_reference_values() {
        assert_abs_diff_eq!(normal_pdf(0.0), INV_SQRT_2PI, epsilon = 1e-16);
        assert_abs_diff_eq!(normal_pdf(1.0), 0.241_970_724_519_143_37, epsilon = 1e-15);
    }

    #[test]
    fn cdf_symmetry() {
        for &x in &[0.1, 0.7, 2.5, 6.0] {
            assert_abs_diff_eq!(normal_cdf(x) + normal_cdf(-x), 1.0, epsilon = 1e-15);
        }
    }
}
