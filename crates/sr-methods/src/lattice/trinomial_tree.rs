//! Recombining trinomial tree (translates
//! `ql/methods/lattices/trinomialtree.hpp`).
//!
//! The process must have additive noise: its variance over a step may not
//! depend on the state. Layer `i + 1` is spaced `dx = v·√3` where `v²` is
//! the step variance, and each node branches to the three nodes around its
//! conditional mean.

use sr_core::{ensure, errors::Result, Real};
use sr_processes::StochasticProcess1D;

use crate::time_grid::TimeGrid;

/// Branching data for a single time step of the trinomial tree.
#[derive(Debug, Clone)]
struct Branching {
    /// Central descendant of each node, as an offset on the next layer.
    k: Vec<i64>,
    /// Probabilities for each branch (0=down, 1=mid, 2=up) for each node.
    probs: [Vec<Real>; 3],
    j_min: i64,
    j_max: i64,
}

impl Branching {
    fn new() -> Self {
        Self {
            k: Vec::new(),
            probs: [Vec::new(), Vec::new(), Vec::new()],
            j_min: i64::MAX,
            j_max: i64::MIN,
        }
    }

    fn add(&mut self, k: i64, p_down: Real, p_mid: Real, p_up: Real) {
        self.k.push(k);
        self.probs[0].push(p_down);
        self.probs[1].push(p_mid);
        self.probs[2].push(p_up);
        self.j_min = self.j_min.min(k - 1);
        self.j_max = self.j_max.max(k + 1);
    }

    /// Number of nodes on the next layer.
    fn size(&self) -> usize {
        (self.j_max - self.j_min + 1) as usize
    }

    fn descendant(&self, index: usize, branch: usize) -> usize {
        (self.k[index] - self.j_min - 1 + branch as i64) as usize
    }

    fn probability(&self, index: usize, branch: usize) -> Real {
        self.probs[branch][index]
    }
}

/// A recombining trinomial tree approximating an additive-noise process.
///
/// Node `j` of layer `i` sits at `x0 + (j_min_i + j)·dx_i`.
///
/// Corresponds to `QuantLib::TrinomialTree`.
#[derive(Debug, Clone)]
pub struct TrinomialTree {
    x0: Real,
    /// Spacing of each layer (`dx[0] = 0` for the root).
    dx: Vec<Real>,
    branchings: Vec<Branching>,
    time_grid: TimeGrid,
}

impl TrinomialTree {
    /// Build the tree of `process` on `grid`.
    ///
    /// # Errors
    /// `Precondition` if a step has zero variance.
    pub fn new(process: &dyn StochasticProcess1D, grid: &TimeGrid) -> Result<Self> {
        let x0 = process.x0();
        let n = grid.steps();
        let sqrt3 = 3.0_f64.sqrt();

        let mut dx = vec![0.0];
        let mut branchings = Vec::with_capacity(n);
        let (mut j_min, mut j_max) = (0i64, 0i64);

        for i in 0..n {
            let t = grid.time(i);
            let dt = grid.dt(i);

            let v2 = process.variance(t, 0.0, dt)?;
            ensure!(
                v2 > 0.0,
                "trinomial tree needs a positive step variance, got {v2} on [{t}, {}]",
                t + dt
            );
            let v = v2.sqrt();
            let dx_next = v * sqrt3;

            let mut branching = Branching::new();
            for j in j_min..=j_max {
                let x = x0 + j as Real * dx[i];
                let m = process.expectation(t, x, dt)?;
                let k = ((m - x0) / dx_next + 0.5).floor() as i64;

                let e = m - (x0 + k as Real * dx_next);
                let e2 = e * e;
                let e3 = e * sqrt3;

                let p_down = (1.0 + e2 / v2 - e3 / v) / 6.0;
                let p_mid = (2.0 - e2 / v2) / 3.0;
                let p_up = (1.0 + e2 / v2 + e3 / v) / 6.0;
                branching.add(k, p_down, p_mid, p_up);
            }
            j_min = branching.j_min;
            j_max = branching.j_max;
            dx.push(dx_next);
            branchings.push(branching);
        }

        Ok(Self {
            x0,
            dx,
            branchings,
            time_grid: grid.clone(),
        })
    }

    /// The time grid of the tree.
    pub fn time_grid(&self) -> &TimeGrid {
        &self.time_grid
    }

    /// Number of time steps.
    pub fn steps(&self) -> usize {
        self.time_grid.steps()
    }

    /// Number of nodes on layer `i`.
    pub fn size(&self, i: usize) -> usize {
        if i == 0 {
            1
        } else {
            self.branchings[i - 1].size()
        }
    }

    /// Node spacing on layer `i`.
    pub fn dx(&self, i: usize) -> Real {
        self.dx[i]
    }

    /// Process value at node `(i, index)`.
    pub fn underlying(&self, i: usize, index: usize) -> Real {
        if i == 0 {
            self.x0
        } else {
            let j_min = self.branchings[i - 1].j_min;
            self.x0 + (j_min + index as i64) as Real * self.dx[i]
        }
    }

    /// Descendant on layer `i + 1` of node `index` of layer `i` along
    /// `branch` (0 = down, 1 = middle, 2 = up).
    pub fn descendant(&self, i: usize, index: usize, branch: usize) -> usize {
        self.branchings[i].descendant(index, branch)
    }

    /// Probability of `branch` from node `index` of layer `i`.
    pub fn probability(&self, i: usize, index: usize, branch: usize) -> Real {
        self.branchings[i].probability(index, branch)
    }
}
