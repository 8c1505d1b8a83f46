//! Short-rate trinomial tree fitted to the discount curve (translates the
//! fitted lattice of `ql/models/shortrate/onefactormodels/hullwhite.cpp`).
//!
//! The tree is built on the centred state `z = x − E[x(t)]` under the
//! risk-neutral measure, which follows `dz = −a(t)·z·dt + σ(t)·dW`. The
//! short rate on layer `i` is `r = z + φ_i`, with `φ_i` fitted by forward
//! induction on Arrow–Debreu prices so that the tree reprices the curve's
//! discount factors at every grid time.

use sr_core::{ensure, ensure_arg, errors::Result, Real, Time};
use sr_models::Gaussian1dModel;
use sr_processes::{GsrProcess, Measure, StochasticProcess1D};
use tracing::debug;

use super::{Lattice, TrinomialTree};
use crate::time_grid::TimeGrid;

/// Discretization settings of the [`ShortRateTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TreeConfig {
    /// Approximate number of time steps up to the last mandatory time.
    pub time_steps: usize,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self { time_steps: 100 }
    }
}

impl TreeConfig {
    /// Set the number of time steps.
    pub fn with_time_steps(mut self, time_steps: usize) -> Self {
        self.time_steps = time_steps;
        self
    }
}

/// The risk-neutral state with its mean removed.
#[derive(Debug)]
struct CenteredState<'a> {
    process: &'a GsrProcess,
}

impl StochasticProcess1D for CenteredState<'_> {
    fn x0(&self) -> Real {
        0.0
    }

    fn drift(&self, t: Time, z: Real) -> Real {
        -self.process.reversion(t) * z
    }

    fn diffusion(&self, t: Time, _z: Real) -> Real {
        self.process.sigma(t)
    }

    fn expectation(&self, t0: Time, z0: Real, dt: Time) -> Result<Real> {
        ensure_arg!(dt >= 0.0, "negative horizon {dt}");
        Ok(z0 * (-self.process.integrated_reversion(t0, t0 + dt)).exp())
    }

    fn variance(&self, t0: Time, z0: Real, dt: Time) -> Result<Real> {
        self.process.variance(t0, z0, dt)
    }
}

/// A trinomial short-rate tree fitted to the model's curve.
///
/// Values on the tree are in currency; rollback discounts with the node
/// short rate over each step.
#[derive(Debug, Clone)]
pub struct ShortRateTree {
    tree: TrinomialTree,
    phi: Vec<Real>,
    means: Vec<Real>,
}

impl ShortRateTree {
    /// Build and fit the tree for `model` on a grid through the mandatory
    /// times.
    ///
    /// # Errors
    /// `InvalidArgument` for negative times, `Precondition` for zero
    /// volatility over a step or no time steps.
    pub fn new(model: &dyn Gaussian1dModel, mandatory_times: &[Time], config: &TreeConfig) -> Result<Self> {
        let grid = TimeGrid::new(mandatory_times, config.time_steps)?;
        Self::with_grid(model, &grid)
    }

    /// Build and fit the tree for `model` on `grid`.
    pub fn with_grid(model: &dyn Gaussian1dModel, grid: &TimeGrid) -> Result<Self> {
        let risk_neutral = model.process().clone().with_measure(Measure::RiskNeutral);
        let tree = TrinomialTree::new(&CenteredState { process: &risk_neutral }, grid)?;
        let curve = model.term_structure();

        let means = grid
            .times()
            .iter()
            .map(|&t| risk_neutral.expectation(0.0, 0.0, t))
            .collect::<Result<Vec<Real>>>()?;

        let steps = grid.steps();
        let mut phi = Vec::with_capacity(steps);
        let mut prices = vec![1.0];
        for i in 0..steps {
            let dt = grid.dt(i);
            let value: Real = prices
                .iter()
                .enumerate()
                .map(|(j, q)| q * (-tree.underlying(i, j) * dt).exp())
                .sum();
            let discount = curve.discount(grid.time(i + 1));
            ensure!(
                value > 0.0 && discount > 0.0,
                "cannot fit the tree to discount {discount} at step {i}"
            );
            let phi_i = (value / discount).ln() / dt;
            phi.push(phi_i);

            let mut next = vec![0.0; tree.size(i + 1)];
            for (j, q) in prices.iter().enumerate() {
                let df = (-(tree.underlying(i, j) + phi_i) * dt).exp();
                for b in 0..3 {
                    next[tree.descendant(i, j, b)] += q * tree.probability(i, j, b) * df;
                }
            }
            prices = next;
        }

        debug!(
            steps,
            end = grid.end(),
            nodes = tree.size(steps),
            "short-rate tree fitted"
        );
        Ok(Self { tree, phi, means })
    }

    /// The time grid of the tree.
    pub fn time_grid(&self) -> &TimeGrid {
        self.tree.time_grid()
    }

    /// Short rate at node `j` of layer `i < steps`.
    pub fn short_rate(&self, i: usize, j: usize) -> Real {
        self.tree.underlying(i, j) + self.phi[i]
    }

    fn discount(&self, i: usize, j: usize) -> Real {
        (-self.short_rate(i, j) * self.tree.time_grid().dt(i)).exp()
    }
}

impl Lattice for ShortRateTree {
    fn times(&self) -> &[Time] {
        self.tree.time_grid().times()
    }

    fn size(&self, i: usize) -> usize {
        self.tree.size(i)
    }

    fn state(&self, i: usize, j: usize) -> Real {
        self.tree.underlying(i, j) + self.means[i]
    }

    fn numeraire(&self, _i: usize, _j: usize) -> Result<Real> {
        Ok(1.0)
    }

    fn rollback_step(&self, i: usize, values: &[Real]) -> Result<Vec<Real>> {
        ensure!(
            values.len() == self.size(i + 1),
            "{} values for a layer of {} nodes",
            values.len(),
            self.size(i + 1)
        );
        Ok((0..self.size(i))
            .map(|j| {
                let expected: Real = (0..3)
                    .map(|b| self.tree.probability(i, j, b) * values[self.tree.descendant(i, j, b)])
                    .sum();
                expected * self.discount(i, j)
            })
            .collect())
    }
}
