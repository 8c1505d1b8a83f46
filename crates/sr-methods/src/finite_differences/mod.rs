//! Finite difference methods (translates the core of
//! `ql/methods/finitedifferences/`).
//!
//! * [`TridiagonalOperator`]: tridiagonal matrix with a Thomas-algorithm
//!   solver
//! * [`Fdm1dMesher`]: uniform state mesh centred on zero
//! * [`FdGaussianSolver`]: Crank–Nicolson rollback of the deflated pricing
//!   PDE of a Gaussian short-rate model

use sr_core::{ensure, errors::Result, fail, Real};

/// Uniform one-dimensional mesher.
pub mod mesher;

/// Backward PDE solver for Gaussian short-rate models.
pub mod fd_gaussian_solver;

pub use fd_gaussian_solver::{FdConfig, FdGaussianSolver};
pub use mesher::Fdm1dMesher;

// ─── Tridiagonal operator ─────────────────────────────────────────────────────

/// A tridiagonal matrix operator.
///
/// Stores the lower, diagonal, and upper bands. Used for 1-D finite difference
/// discretisations of second-order PDEs.
///
/// Corresponds to the core of `QuantLib::TridiagonalOperator`.
#[derive(Debug, Clone, PartialEq)]
pub struct TridiagonalOperator {
    /// Lower diagonal (index 0 unused: starts from row 1).
    pub lower: Vec<Real>,
    /// Main diagonal.
    pub diag: Vec<Real>,
    /// Upper diagonal (last index unused: ends at row n−2).
    pub upper: Vec<Real>,
}

impl TridiagonalOperator {
    /// Create a zero tridiagonal operator of size `n`.
    pub fn new(n: usize) -> Self {
        Self {
            lower: vec![0.0; n],
            diag: vec![0.0; n],
            upper: vec![0.0; n],
        }
    }

    /// Size (number of rows/columns).
    pub fn size(&self) -> usize {
        self.diag.len()
    }

    /// Apply the operator: `y = A · x`.
    pub fn apply(&self, x: &[Real]) -> Result<Vec<Real>> {
        let n = self.size();
        ensure!(x.len() == n, "operator of size {n} applied to {} values", x.len());
        if n == 1 {
            return Ok(vec![self.diag[0] * x[0]]);
        }
        let mut y = vec![0.0; n];
        y[0] = self.diag[0] * x[0] + self.upper[0] * x[1];
        for i in 1..n - 1 {
            y[i] = self.lower[i] * x[i - 1] + self.diag[i] * x[i] + self.upper[i] * x[i + 1];
        }
        y[n - 1] = self.lower[n - 1] * x[n - 2] + self.diag[n - 1] * x[n - 1];
        Ok(y)
    }

    /// Solve `A · x = rhs` using the Thomas algorithm (LU decomposition
    /// for tridiagonal systems).
    ///
    /// # Errors
    /// Fails on a size mismatch or a vanishing pivot.
    pub fn solve(&self, rhs: &[Real]) -> Result<Vec<Real>> {
        let n = self.size();
        ensure!(rhs.len() == n, "system of size {n} solved for {} values", rhs.len());

        let mut c_prime = vec![0.0; n];
        let mut d_prime = vec![0.0; n];

        let mut pivot = self.diag[0];
        for i in 0..n {
            if i > 0 {
                pivot = self.diag[i] - self.lower[i] * c_prime[i - 1];
            }
            if pivot == 0.0 || !pivot.is_finite() {
                fail!("tridiagonal system is singular at row {i}");
            }
            if i + 1 < n {
                c_prime[i] = self.upper[i] / pivot;
            }
            let carried = if i > 0 { self.lower[i] * d_prime[i - 1] } else { 0.0 };
            d_prime[i] = (rhs[i] - carried) / pivot;
        }

        let mut x = d_prime;
        for i in (0..n - 1).rev() {
            x[i] -= c_prime[i] * x[i + 1];
        }
        Ok(x)
    }

    /// Scale all entries by a scalar.
    pub fn scale(&mut self, factor: Real) {
        for v in self
            .lower
            .iter_mut()
            .chain(self.diag.iter_mut())
            .chain(self.upper.iter_mut())
        {
            *v *= factor;
        }
    }

    /// Add the identity matrix scaled by `factor`: `A ← A + factor · I`.
    pub fn add_identity(&mut self, factor: Real) {
        for d in &mut self.diag {
            *d += factor;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn second_difference(n: usize) -> TridiagonalOperator {
        let mut op = TridiagonalOperator::new(n);
        for i in 0..n {
            op.lower[i] = 1.0;
            op.diag[i] = -2.0;
            op.upper[i] = 1.0;
        }
        op
    }

    #[test]
    fn solve_inverts_apply() {
        let mut op = second_difference(6);
        op.scale(-0.5);
        op.add_identity(1.0);
        let x = [0.3, -1.0, 2.0, 0.5, 0.0, 4.0];
        let y = op.apply(&x).unwrap();
        let back = op.solve(&y).unwrap();
        for (a, b) in back.iter().zip(&x) {
            assert_abs_diff_eq!(a, b, epsilon = 1e-13);
        }
    }

    #[test]
    fn size_mismatch_and_singular_systems_fail() {
        let op = TridiagonalOperator::new(3);
        assert!(op.apply(&[1.0, 2.0]).is_err());
        assert!(op.solve(&[1.0, 2.0, 3.0]).is_err());
    }
}
