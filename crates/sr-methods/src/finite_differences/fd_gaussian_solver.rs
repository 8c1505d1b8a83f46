//! Crank–Nicolson rollback of the deflated pricing PDE.
//!
//! Under the T-forward measure the state follows
//!
//! ```text
//! dx = (y(t) − a(t)·x − σ(t)²·G(t,T)) dt + σ(t) dW
//! ```
//!
//! and a value expressed in units of the numeraire solves
//! `u_t + μ·u_x + ½σ²·u_xx = 0`. Interior rows use central differences;
//! the two boundary rows keep only the drift, differenced inwards. After
//! the terminal condition and after every exercise the first steps are
//! taken as pairs of implicit half-steps (Rannacher smoothing).

use sr_core::{ensure, errors::Result, Real, Time};
use sr_models::Gaussian1dModel;
use sr_processes::StochasticProcess1D;
use tracing::debug;

use super::{Fdm1dMesher, TridiagonalOperator};
use crate::time_grid::{slice_times, TimeGrid};

/// Discretization settings of the [`FdGaussianSolver`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FdConfig {
    /// Number of mesh points (rounded up to an odd number).
    pub grid_points: usize,
    /// Mesh half-width in standard deviations of the state.
    pub std_devs: Real,
    /// Time steps per year.
    pub steps_per_year: usize,
    /// Implicit half-step pairs after each payoff discontinuity.
    pub damping_steps: usize,
}

impl Default for FdConfig {
    fn default() -> Self {
        Self {
            grid_points: 401,
            std_devs: 7.0,
            steps_per_year: 50,
            damping_steps: 2,
        }
    }
}

impl FdConfig {
    /// Set the number of mesh points.
    pub fn with_grid_points(mut self, grid_points: usize) -> Self {
        self.grid_points = grid_points;
        self
    }

    /// Set the mesh half-width in standard deviations.
    pub fn with_std_devs(mut self, std_devs: Real) -> Self {
        self.std_devs = std_devs;
        self
    }

    /// Set the number of time steps per year.
    pub fn with_steps_per_year(mut self, steps_per_year: usize) -> Self {
        self.steps_per_year = steps_per_year;
        self
    }

    /// Set the number of damping steps.
    pub fn with_damping_steps(mut self, damping_steps: usize) -> Self {
        self.damping_steps = damping_steps;
        self
    }
}

/// Backward PDE solver for one model and a fixed set of exercise times.
#[derive(Debug)]
pub struct FdGaussianSolver<'a> {
    model: &'a dyn Gaussian1dModel,
    mesher: Fdm1dMesher,
    grid: TimeGrid,
    damping_steps: usize,
}

impl<'a> FdGaussianSolver<'a> {
    /// Set up mesh and time grid for rollbacks from `mandatory_times`.
    ///
    /// The mesh covers `±std_devs` standard deviations around the state
    /// mean at every mandatory time. Regime breakpoints of the model are
    /// added to the time grid.
    ///
    /// # Errors
    /// `InvalidArgument` for negative times, `Precondition` for an invalid
    /// configuration, a zero horizon or a state with no variance.
    pub fn new(
        model: &'a dyn Gaussian1dModel,
        mandatory_times: &[Time],
        config: &FdConfig,
    ) -> Result<Self> {
        ensure!(config.steps_per_year > 0, "FD solver needs at least one step per year");
        ensure!(
            config.std_devs.is_finite() && config.std_devs > 0.0,
            "FD mesh width must be a positive number of standard deviations, got {}",
            config.std_devs
        );
        let times = slice_times(mandatory_times)?;
        let end = times[times.len() - 1];
        ensure!(end > 0.0, "FD rollback needs a positive horizon");

        let process = model.process();
        let mut half_width: Real = 0.0;
        for &t in &times {
            let mean = process.expectation(0.0, 0.0, t)?;
            let sd = process.std_deviation(0.0, 0.0, t)?;
            half_width = half_width.max(mean.abs() + config.std_devs * sd);
        }
        let mesher = Fdm1dMesher::new(half_width, config.grid_points)?;

        let mut grid_times = times;
        grid_times.extend(process.times().iter().copied().filter(|&b| b < end));
        let steps = ((end * config.steps_per_year as Real).ceil() as usize).max(1);
        let grid = TimeGrid::new(&grid_times, steps)?;

        debug!(
            points = mesher.size(),
            half_width,
            steps = grid.steps(),
            "FD mesh built"
        );
        Ok(Self {
            model,
            mesher,
            grid,
            damping_steps: config.damping_steps,
        })
    }

    /// The state mesh.
    pub fn mesher(&self) -> &Fdm1dMesher {
        &self.mesher
    }

    /// The time grid.
    pub fn time_grid(&self) -> &TimeGrid {
        &self.grid
    }

    /// Present value at `(0, x = 0)` of a claim exercisable at
    /// `exercise_times`, paying `exercise_value(t, x)` in currency.
    ///
    /// # Errors
    /// `InvalidArgument` if an exercise time is not a mandatory time.
    pub fn rollback<F>(&self, exercise_times: &[Time], exercise_value: F) -> Result<Real>
    where
        F: Fn(Time, Real) -> Result<Real>,
    {
        ensure!(!exercise_times.is_empty(), "no exercise times");
        let mut indices = exercise_times
            .iter()
            .map(|&t| self.grid.index(t))
            .collect::<Result<Vec<_>>>()?;
        indices.sort_unstable();
        indices.dedup();

        let payoff = |i: usize| -> Result<Vec<Real>> {
            let t = self.grid.time(i);
            self.mesher
                .locations()
                .iter()
                .map(|&x| -> Result<Real> {
                    Ok(exercise_value(t, x)? / self.model.numeraire(t, x)?)
                })
                .collect()
        };

        let last = indices[indices.len() - 1];
        let mut u = payoff(last)?;
        let mut damping = self.damping_steps;
        for i in (0..last).rev() {
            let (t0, dt) = (self.grid.time(i), self.grid.dt(i));
            u = if damping > 0 {
                damping -= 1;
                let op = self.operator(t0 + 0.25 * dt);
                let u = self.implicit_step(&op, 0.5 * dt, &u)?;
                let op = self.operator(t0 + 0.75 * dt);
                self.implicit_step(&op, 0.5 * dt, &u)?
            } else {
                self.crank_nicolson_step(&self.operator(t0 + 0.5 * dt), dt, &u)?
            };
            if indices.binary_search(&i).is_ok() {
                let exercise = payoff(i)?;
                for (v, e) in u.iter_mut().zip(exercise) {
                    *v = v.max(e);
                }
                damping = self.damping_steps;
            }
        }
        Ok(u[self.mesher.centre()] * self.model.numeraire(0.0, 0.0)?)
    }

    /// Spatial operator `L = μ·∂x + ½σ²·∂xx` with coefficients at `t`.
    fn operator(&self, t: Time) -> TridiagonalOperator {
        let process = self.model.process();
        let sigma = process.sigma(t);
        let s2 = sigma * sigma;
        let a = process.reversion(t);
        let shift = process.y(t) - s2 * process.G(t, self.model.forward_measure_time());
        let drift = |x: Real| shift - a * x;

        let xs = self.mesher.locations();
        let dx = self.mesher.dx();
        let n = xs.len();
        let mut op = TridiagonalOperator::new(n);
        let diffusion = 0.5 * s2 / (dx * dx);
        for k in 1..n - 1 {
            let convection = drift(xs[k]) / (2.0 * dx);
            op.lower[k] = diffusion - convection;
            op.diag[k] = -2.0 * diffusion;
            op.upper[k] = diffusion + convection;
        }
        let mu_lo = drift(xs[0]) / dx;
        op.diag[0] = -mu_lo;
        op.upper[0] = mu_lo;
        let mu_hi = drift(xs[n - 1]) / dx;
        op.lower[n - 1] = -mu_hi;
        op.diag[n - 1] = mu_hi;
        op
    }

    /// `(I − dt·L) u_new = u`.
    fn implicit_step(&self, op: &TridiagonalOperator, dt: Time, u: &[Real]) -> Result<Vec<Real>> {
        let mut lhs = op.clone();
        lhs.scale(-dt);
        lhs.add_identity(1.0);
        lhs.solve(u)
    }

    /// `(I − ½dt·L) u_new = (I + ½dt·L) u`.
    fn crank_nicolson_step(
        &self,
        op: &TridiagonalOperator,
        dt: Time,
        u: &[Real],
    ) -> Result<Vec<Real>> {
        let lu = op.apply(u)?;
        let rhs: Vec<Real> = u.iter().zip(&lu).map(|(v, l)| v + 0.5 * dt * l).collect();
        let mut lhs = op.clone();
        lhs.scale(-0.5 * dt);
        lhs.add_identity(1.0);
        lhs.solve(&rhs)
    }
}
