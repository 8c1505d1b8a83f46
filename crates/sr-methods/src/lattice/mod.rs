//! Lattice methods (translates `ql/methods/lattices/`).
//!
//! A [`Lattice`] is a sequence of slices, each a finite set of states of the
//! model variable `x`, together with a one-step rollback operator. Values on
//! a slice are expressed in units of the lattice's numeraire at each node:
//! the model numeraire for the [`GaussianLattice`], plain currency for the
//! [`ShortRateTree`] which discounts inside its rollback.

use sr_core::{
    ensure, ensure_arg,
    errors::{Error, Result},
    Real, Time,
};
use tracing::trace;

use crate::time_grid::find_time;

/// Gaussian integration lattice.
pub mod gaussian_lattice;

/// Recombining trinomial tree.
pub mod trinomial_tree;

/// Short-rate trinomial tree fitted to the curve.
pub mod short_rate_tree;

pub use gaussian_lattice::{GaussianLattice, LatticeConfig};
pub use short_rate_tree::{ShortRateTree, TreeConfig};
pub use trinomial_tree::TrinomialTree;

/// A discretization of the model state supporting backward induction.
///
/// Corresponds to `QuantLib::Lattice`.
pub trait Lattice: std::fmt::Debug + Send + Sync {
    /// Slice times, starting at 0.
    fn times(&self) -> &[Time];

    /// Number of states on slice `i`.
    fn size(&self, i: usize) -> usize;

    /// Model state `x` at node `j` of slice `i`.
    fn state(&self, i: usize, j: usize) -> Real;

    /// Numeraire of the values held at node `j` of slice `i`.
    fn numeraire(&self, i: usize, j: usize) -> Result<Real>;

    /// Roll `values` on slice `i + 1` back to slice `i`.
    fn rollback_step(&self, i: usize, values: &[Real]) -> Result<Vec<Real>>;

    /// Slice index of time `t`; fails if `t` is not a slice time.
    fn index(&self, t: Time) -> Result<usize> {
        find_time(self.times(), t)
    }

    /// Roll `values` from slice `from` back to slice `to`.
    fn rollback(&self, values: &[Real], from: usize, to: usize) -> Result<Vec<Real>> {
        let slices = self.times().len();
        if from >= slices {
            return Err(Error::IndexOutOfRange { index: from, size: slices });
        }
        ensure_arg!(to <= from, "cannot roll back from slice {from} to later slice {to}");
        ensure_arg!(
            values.len() == self.size(from),
            "{} values for a slice of {} states",
            values.len(),
            self.size(from)
        );
        let mut v = values.to_vec();
        for i in (to..from).rev() {
            v = self.rollback_step(i, &v)?;
        }
        Ok(v)
    }
}

/// Present value of a claim exercisable at `exercise_times`.
///
/// `exercise_value(t, x)` is the currency value received on exercise at `t`
/// in state `x`. The claim is worth its exercise value at the last exercise
/// time; at earlier ones the holder takes the larger of continuation and
/// exercise. A single exercise time prices a European claim.
pub fn backward_induction<L, F>(lattice: &L, exercise_times: &[Time], exercise_value: F) -> Result<Real>
where
    L: Lattice + ?Sized,
    F: Fn(Time, Real) -> Result<Real>,
{
    ensure!(!exercise_times.is_empty(), "no exercise times");
    let mut indices = exercise_times
        .iter()
        .map(|&t| lattice.index(t))
        .collect::<Result<Vec<_>>>()?;
    indices.sort_unstable();
    indices.dedup();

    let times = lattice.times();
    let exercise_slice = |i: usize, continuation: Option<&[Real]>| -> Result<Vec<Real>> {
        let t = times[i];
        (0..lattice.size(i))
            .map(|j| -> Result<Real> {
                let payoff = exercise_value(t, lattice.state(i, j))? / lattice.numeraire(i, j)?;
                Ok(match continuation {
                    Some(c) => c[j].max(payoff),
                    None => payoff,
                })
            })
            .collect()
    };

    let mut remaining = indices.iter().rev();
    let Some(&last) = remaining.next() else {
        return Ok(0.0);
    };
    let mut values = exercise_slice(last, None)?;
    let mut current = last;
    for &i in remaining {
        values = lattice.rollback(&values, current, i)?;
        values = exercise_slice(i, Some(&values))?;
        current = i;
        trace!(slice = i, time = times[i], "exercise applied");
    }
    let values = lattice.rollback(&values, current, 0)?;
    Ok(values[0] * lattice.numeraire(0, 0)?)
}
