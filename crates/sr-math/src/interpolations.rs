//! 1D interpolation (translates `ql/math/interpolation.hpp`,
//! `ql/math/interpolations/linearinterpolation.hpp` and
//! `loginterpolation.hpp`).
//!
//! Both schemes extrapolate with their first / last segment.

use sr_core::{ensure, errors::Result, Real};

/// A 1D interpolation function `f: R → R` defined by a set of known points.
///
/// Corresponds to `QuantLib::Interpolation`.
pub trait Interpolation1D: std::fmt::Debug + Send + Sync {
    /// Evaluate the interpolation at `x`.
    fn operator(&self, x: Real) -> Real;

    /// First derivative at `x` (right derivative on a node).
    fn derivative(&self, x: Real) -> Real;

    /// Lower bound of the interpolation domain.
    fn x_min(&self) -> Real;

    /// Upper bound of the interpolation domain.
    fn x_max(&self) -> Real;

    /// Return `true` if `x` is within the interpolation range.
    fn is_in_range(&self, x: Real) -> bool {
        x >= self.x_min() && x <= self.x_max()
    }
}

// ── Linear ────────────────────────────────────────────────────────────────────

/// Linear interpolation.
#[derive(Debug, Clone)]
pub struct LinearInterpolation {
    xs: Vec<Real>,
    ys: Vec<Real>,
}

impl LinearInterpolation {
    /// Construct from strictly increasing `xs` and the matching `ys`.
    ///
    /// # Errors
    /// Fails on mismatched lengths, fewer than two points or unsorted `xs`.
    pub fn new(xs: &[Real], ys: &[Real]) -> Result<Self> {
        ensure!(xs.len() >= 2, "need at least 2 points for interpolation");
        ensure!(
            xs.len() == ys.len(),
            "xs ({}) and ys ({}) must have the same length",
            xs.len(),
            ys.len()
        );
        ensure!(
            xs.windows(2).all(|w| w[1] > w[0]),
            "interpolation abscissae must be strictly increasing"
        );
        Ok(Self {
            xs: xs.to_vec(),
            ys: ys.to_vec(),
        })
    }

    /// Index `i` of the segment `[x_i, x_{i+1}]` used for `x`.
    fn locate(&self, x: Real) -> usize {
        let n = self.xs.len();
        if x <= self.xs[0] {
            0
        } else if x >= self.xs[n - 1] {
            n - 2
        } else {
            // first index with xs[i] > x, minus one
            self.xs.partition_point(|&xi| xi <= x) - 1
        }
    }
}

impl Interpolation1D for LinearInterpolation {
    fn operator(&self, x: Real) -> Real {
        let i = self.locate(x);
        self.ys[i] + (x - self.xs[i]) * self.derivative(x)
    }

    fn derivative(&self, x: Real) -> Real {
        let i = self.locate(x);
        (self.ys[i + 1] - self.ys[i]) / (self.xs[i + 1] - self.xs[i])
    }

    fn x_min(&self) -> Real {
        self.xs[0]
    }

    fn x_max(&self) -> Real {
        self.xs[self.xs.len() - 1]
    }
}

// ── Log-linear ────────────────────────────────────────────────────────────────

/// Log-linear interpolation: `log(y)` is interpolated linearly.
///
/// On discount factors this gives piecewise-constant forward rates.
#[derive(Debug, Clone)]
pub struct LogLinearInterpolation {
    inner: LinearInterpolation,
}

impl LogLinearInterpolation {
    /// Construct a log-linear interpolation; all `ys` must be positive.
    pub fn new(xs: &[Real], ys: &[Real]) -> Result<Self> {
        ensure!(
            ys.iter().all(|&y| y > 0.0),
            "all y values must be positive for log-linear interpolation"
        );
        let log_ys: Vec<Real> = ys.iter().map(|&y| y.ln()).collect();
        Ok(Self {
            inner: LinearInterpolation::new(xs, &log_ys)?,
        })
    }
}

impl Interpolation1D for LogLinearInterpolation {
    fn operator(&self, x: Real) -> Real {
        self.inner.operator(x).exp()
    }

    fn derivative(&self, x: Real) -> Real {
        self.operator(x) * self.inner.derivative(x)
    }

    fn x_min(&self) -> Real {
        self.inner.x_min()
    }

    fn x_max(&self) -> Real {
        self.inner.x_max()
    }
}
