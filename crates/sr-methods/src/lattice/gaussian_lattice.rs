//! Gaussian integration lattice.
//!
//! Each slice holds equally spaced states covering `±N` standard
//! deviations of the state distribution at the slice time. Values between
//! states are interpolated by a natural cubic spline and extended flat
//! beyond the slice. The conditional expectation of a slice function is
//! the integral of the spline pieces against the Gaussian transition
//! density, which is linear in the slice values. On cell `k` with
//! `u = x − x_k` the spline is
//!
//! ```text
//! S(x) = v_k + b_k·u + ½M_k·u² + (M_k+1 − M_k)/(6h)·u³
//! b_k  = (v_k+1 − v_k)/h − h·(2M_k + M_k+1)/6
//! M_k−1 + 4M_k + M_k+1 = 6/h²·(v_k−1 − 2v_k + v_k+1),   M_0 = M_n−1 = 0
//! ```
//!
//! so each row of weights needs the truncated moments
//! `E[(X − x_k)^p; x_k ≤ X < x_k+1]`, `p ≤ 3`, and one tridiagonal solve
//! for the adjoint of the second derivatives. Weights sum to one exactly
//! and reproduce linear functions; they may dip slightly below zero when
//! the conditional deviation is small against the node spacing.
//!
//! Values on the lattice are deflated by the model numeraire, so rollback
//! is a plain conditional expectation under the T-forward measure.

use sr_core::{
    ensure, ensure_post,
    errors::{Error, Result},
    Real, Time,
};
use sr_math::{normal_cdf, normal_pdf};
use sr_models::Gaussian1dModel;
use sr_processes::StochasticProcess1D;
use tracing::debug;

use super::Lattice;
use crate::finite_differences::TridiagonalOperator;
use crate::time_grid::slice_times;

/// Cells further than this many conditional standard deviations from the
/// mean carry no weight.
const INTEGRATION_BAND: Real = 12.0;

/// Tolerance on the row sums of the transition weights.
const ROW_SUM_TOLERANCE: Real = 1e-10;

/// Discretization settings of the [`GaussianLattice`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LatticeConfig {
    /// States per slice.
    pub nodes: usize,
    /// Half-width of each slice in standard deviations.
    pub std_devs: Real,
}

impl Default for LatticeConfig {
    fn default() -> Self {
        Self {
            nodes: 64,
            std_devs: 7.0,
        }
    }
}

impl LatticeConfig {
    /// Set the number of states per slice.
    pub fn with_nodes(mut self, nodes: usize) -> Self {
        self.nodes = nodes;
        self
    }

    /// Set the slice half-width in standard deviations.
    pub fn with_std_devs(mut self, std_devs: Real) -> Self {
        self.std_devs = std_devs;
        self
    }

    fn validate(&self) -> Result<()> {
        ensure!(self.nodes >= 2, "lattice needs at least 2 nodes per slice, got {}", self.nodes);
        ensure!(
            self.std_devs.is_finite() && self.std_devs > 0.0,
            "lattice width must be a positive number of standard deviations, got {}",
            self.std_devs
        );
        Ok(())
    }
}

/// Transition weights from one node to a contiguous run of next-slice nodes.
#[derive(Debug, Clone, PartialEq)]
struct Row {
    first: usize,
    weights: Vec<Real>,
}

impl Row {
    fn expectation(&self, values: &[Real]) -> Real {
        self.weights
            .iter()
            .zip(&values[self.first..])
            .map(|(w, v)| w * v)
            .sum()
    }
}

/// A lattice of the Gaussian state on `{0} ∪ mandatory times`.
///
/// A slice whose state has zero standard deviation collapses to a single
/// node at the mean; in particular slice 0 is the single state `x = 0`.
#[derive(Debug, Clone)]
pub struct GaussianLattice {
    times: Vec<Time>,
    states: Vec<Vec<Real>>,
    numeraires: Vec<Vec<Real>>,
    rows: Vec<Vec<Row>>,
}

impl GaussianLattice {
    /// Build the lattice for `model` through the given slice times.
    ///
    /// # Errors
    /// `InvalidArgument` for negative times, `Precondition` for an invalid
    /// configuration or a model without a T-forward state, `Postcondition`
    /// if transition weights fail to sum to one.
    pub fn new(
        model: &dyn Gaussian1dModel,
        mandatory_times: &[Time],
        config: &LatticeConfig,
    ) -> Result<Self> {
        config.validate()?;
        let process = model.process();
        ensure!(
            process.forward_measure_time().is_some(),
            "the Gaussian lattice needs a state process under a T-forward measure"
        );
        let times = slice_times(mandatory_times)?;

        let mut states = Vec::with_capacity(times.len());
        for &t in &times {
            let mean = process.expectation(0.0, 0.0, t)?;
            let sd = process.std_deviation(0.0, 0.0, t)?;
            states.push(slice_states(mean, sd, config));
        }

        let numeraires = times
            .iter()
            .zip(&states)
            .map(|(&t, xs)| {
                xs.iter()
                    .map(|&x| model.numeraire(t, x))
                    .collect::<Result<Vec<Real>>>()
            })
            .collect::<Result<Vec<Vec<Real>>>>()?;

        let mut rows = Vec::with_capacity(times.len().saturating_sub(1));
        for i in 0..times.len() - 1 {
            let dt = times[i + 1] - times[i];
            let sd = process.std_deviation(times[i], 0.0, dt)?;
            let next = &states[i + 1];
            let system = spline_system(next.len());
            let slice = states[i]
                .iter()
                .map(|&x| -> Result<Row> {
                    let mean = process.expectation(times[i], x, dt)?;
                    transition_row(mean, sd, next, system.as_ref())
                })
                .collect::<Result<Vec<Row>>>()?;
            rows.push(slice);
        }

        debug!(
            slices = times.len(),
            nodes = config.nodes,
            std_devs = config.std_devs,
            "Gaussian lattice built"
        );
        Ok(Self {
            times,
            states,
            numeraires,
            rows,
        })
    }

    /// Number of slices.
    pub fn slices(&self) -> usize {
        self.times.len()
    }

    /// States of slice `i`.
    pub fn states(&self, i: usize) -> Result<&[Real]> {
        self.states
            .get(i)
            .map(Vec::as_slice)
            .ok_or(Error::IndexOutOfRange { index: i, size: self.states.len() })
    }

    /// Transition weights from node `j` of slice `i`: the index of the first
    /// reachable node on slice `i + 1` and the weights from there on.
    pub fn transition(&self, i: usize, j: usize) -> Result<(usize, &[Real])> {
        let rows = self
            .rows
            .get(i)
            .ok_or(Error::IndexOutOfRange { index: i, size: self.rows.len() })?;
        let row = rows
            .get(j)
            .ok_or(Error::IndexOutOfRange { index: j, size: rows.len() })?;
        Ok((row.first, &row.weights))
    }
}

impl Lattice for GaussianLattice {
    fn times(&self) -> &[Time] {
        &self.times
    }

    fn size(&self, i: usize) -> usize {
        self.states[i].len()
    }

    fn state(&self, i: usize, j: usize) -> Real {
        self.states[i][j]
    }

    fn numeraire(&self, i: usize, j: usize) -> Result<Real> {
        Ok(self.numeraires[i][j])
    }

    fn rollback_step(&self, i: usize, values: &[Real]) -> Result<Vec<Real>> {
        ensure!(
            values.len() == self.size(i + 1),
            "{} values for a slice of {} states",
            values.len(),
            self.size(i + 1)
        );
        Ok(self.rows[i].iter().map(|row| row.expectation(values)).collect())
    }
}

fn slice_states(mean: Real, sd: Real, config: &LatticeConfig) -> Vec<Real> {
    if sd <= Real::EPSILON {
        return vec![mean];
    }
    let n = config.nodes;
    let width = config.std_devs * sd;
    let h = 2.0 * width / (n - 1) as Real;
    (0..n).map(|k| mean - width + k as Real * h).collect()
}

/// `tridiag(1, 4, 1)` acting on the interior second derivatives of a
/// natural spline through `n` nodes.
fn spline_system(n: usize) -> Option<TridiagonalOperator> {
    (n > 2).then(|| {
        let mut op = TridiagonalOperator::new(n - 2);
        op.lower.fill(1.0);
        op.diag.fill(4.0);
        op.upper.fill(1.0);
        op
    })
}

/// `E[(X − a)^p; a ≤ X < b]` for `p = 0..=3` and `X ~ N(mean, sd²)`.
fn cell_moments(mean: Real, sd: Real, a: Real, b: Real) -> [Real; 4] {
    let (za, zb) = ((a - mean) / sd, (b - mean) / sd);
    if zb < -INTEGRATION_BAND || za > INTEGRATION_BAND {
        return [0.0; 4];
    }
    let (fa, fb) = (normal_pdf(za), normal_pdf(zb));
    // ∫ z^q φ(z) dz over [za, zb]
    let j0 = normal_cdf(zb) - normal_cdf(za);
    let j1 = fa - fb;
    let j2 = j0 + za * fa - zb * fb;
    let j3 = 2.0 * j1 + za * za * fa - zb * zb * fb;
    let c = mean - a;
    [
        j0,
        c * j0 + sd * j1,
        c * c * j0 + 2.0 * c * sd * j1 + sd * sd * j2,
        c * c * c * j0 + 3.0 * c * c * sd * j1 + 3.0 * c * sd * sd * j2 + sd * sd * sd * j3,
    ]
}

/// Weights of the slice values under `N(mean, sd²)` for the spline
/// interpolant on `nodes`; `system` is the spline system of the slice.
fn transition_row(
    mean: Real,
    sd: Real,
    nodes: &[Real],
    system: Option<&TridiagonalOperator>,
) -> Result<Row> {
    let n = nodes.len();
    if n == 1 {
        return Ok(Row {
            first: 0,
            weights: vec![1.0],
        });
    }
    let h = nodes[1] - nodes[0];

    if sd <= Real::EPSILON {
        return Ok(if mean <= nodes[0] {
            Row { first: 0, weights: vec![1.0] }
        } else if mean >= nodes[n - 1] {
            Row { first: n - 1, weights: vec![1.0] }
        } else {
            let k = (nodes.partition_point(|&b| b <= mean) - 1).min(n - 2);
            let lambda = (mean - nodes[k]) / h;
            Row {
                first: k,
                weights: vec![1.0 - lambda, lambda],
            }
        });
    }

    let moments: Vec<[Real; 4]> = nodes
        .windows(2)
        .map(|cell| cell_moments(mean, sd, cell[0], cell[1]))
        .collect();

    let mut w = vec![0.0; n];
    for (k, p) in moments.iter().enumerate() {
        w[k] += p[0] - p[1] / h;
        w[k + 1] += p[1] / h;
    }
    w[0] += normal_cdf((nodes[0] - mean) / sd);
    w[n - 1] += normal_cdf((mean - nodes[n - 1]) / sd);

    if let Some(system) = system {
        // coefficient of each interior second derivative in the expectation
        let alpha: Vec<Real> = (1..n - 1)
            .map(|j| {
                let (own, prev) = (&moments[j], &moments[j - 1]);
                own[2] / 2.0 - own[3] / (6.0 * h) - h * own[1] / 3.0 + prev[3] / (6.0 * h)
                    - h * prev[1] / 6.0
            })
            .collect();
        let beta = system.solve(&alpha)?;
        let scale = 6.0 / (h * h);
        let beta_at = |k: usize| if (1..n - 1).contains(&k) { beta[k - 1] } else { 0.0 };
        for (j, wj) in w.iter_mut().enumerate() {
            let below = if j > 0 { beta_at(j - 1) } else { 0.0 };
            *wj += scale * (below - 2.0 * beta_at(j) + beta_at(j + 1));
        }
    }

    let sum: Real = w.iter().sum();
    ensure_post!(
        (sum - 1.0).abs() <= ROW_SUM_TOLERANCE,
        "transition weights sum to {sum} for mean {mean} and deviation {sd}"
    );

    let first = w.iter().position(|&wk| wk != 0.0).unwrap_or(0);
    let last = w.iter().rposition(|&wk| wk != 0.0).unwrap_or(n - 1);
    Ok(Row {
        first,
        weights: w[first..=last].to_vec(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lattice::backward_induction;
    use approx::assert_abs_diff_eq;
    use chrono::NaiveDate;
    use proptest::prelude::*;
    use sr_core::Error;
    use sr_models::{Gsr, HullWhite};
    use sr_termstructures::{FlatForward, YieldTermStructure};
    use std::sync::Arc;

    fn curve() -> Arc<dyn YieldTermStructure> {
        let date = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
        Arc::new(FlatForward::continuous(date, 0.03))
    }

    fn hull_white() -> HullWhite {
        HullWhite::new(curve(), 0.05, 0.01).unwrap()
    }

    #[test]
    fn slices_follow_the_state_distribution() {
        let model = hull_white();
        let lattice = GaussianLattice::new(&model, &[2.0, 1.0], &LatticeConfig::default()).unwrap();
        assert_eq!(lattice.times(), &[0.0, 1.0, 2.0]);
        assert_eq!(lattice.size(0), 1);
        assert_eq!(lattice.state(0, 0), 0.0);
        assert_eq!(lattice.size(2), 64);

        let (mean, sd) = model.state_moments(2.0).unwrap();
        let xs = lattice.states(2).unwrap();
        assert_abs_diff_eq!(xs[0], mean - 7.0 * sd, epsilon = 1e-14);
        assert_abs_diff_eq!(xs[63], mean + 7.0 * sd, epsilon = 1e-14);
    }

    #[test]
    fn slice_lookups_are_range_checked() {
        let lattice = GaussianLattice::new(&hull_white(), &[1.0], &LatticeConfig::default()).unwrap();
        assert_eq!(lattice.slices(), 2);
        assert_eq!(lattice.states(2), Err(Error::IndexOutOfRange { index: 2, size: 2 }));
        assert_eq!(lattice.transition(1, 0), Err(Error::IndexOutOfRange { index: 1, size: 1 }));
        assert_eq!(lattice.transition(0, 1), Err(Error::IndexOutOfRange { index: 1, size: 1 }));
        let values = vec![1.0; 64];
        assert_eq!(lattice.rollback(&values, 2, 0), Err(Error::IndexOutOfRange { index: 2, size: 2 }));
        assert_abs_diff_eq!(lattice.rollback(&values, 1, 0).unwrap()[0], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn rows_sum_to_one_and_keep_the_conditional_mean() {
        let model = hull_white();
        let config = LatticeConfig::default().with_nodes(101);
        let lattice = GaussianLattice::new(&model, &[1.0, 3.0], &config).unwrap();
        let process = model.process();
        let next = lattice.states(2).unwrap();
        for j in [0, 40, 50, 60, 100] {
            let x = lattice.state(1, j);
            let (first, w) = lattice.transition(1, j).unwrap();
            assert!(w.iter().all(|&wk| wk > -1e-9));
            assert_abs_diff_eq!(w.iter().sum::<Real>(), 1.0, epsilon = 1e-12);
            // the spline reproduces linear functions inside the slice
            if (40..=60).contains(&j) {
                let m: Real = w.iter().zip(&next[first..]).map(|(w, x)| w * x).sum();
                let expected = process.expectation(1.0, x, 2.0).unwrap();
                assert_abs_diff_eq!(m, expected, epsilon = 1e-10);
            }
        }
    }

    #[test]
    fn quadratics_are_integrated_exactly_away_from_the_edges() {
        // the natural end conditions only disturb the spline near the edges
        let nodes: Vec<Real> = (0..201).map(|k| -1.0 + 0.01 * k as Real).collect();
        let system = spline_system(nodes.len());
        let (mean, sd) = (0.1, 0.05);
        let row = transition_row(mean, sd, &nodes, system.as_ref()).unwrap();
        let second: Real = row
            .weights
            .iter()
            .zip(&nodes[row.first..])
            .map(|(w, x)| w * x * x)
            .sum();
        assert_abs_diff_eq!(second, mean * mean + sd * sd, epsilon = 1e-12);
    }

    #[test]
    fn single_slice_pays_the_deterministic_value() {
        let model = hull_white();
        let lattice = GaussianLattice::new(&model, &[], &LatticeConfig::default()).unwrap();
        assert_eq!(lattice.slices(), 1);
        let npv = backward_induction(&lattice, &[0.0], |_, _| Ok(0.25)).unwrap();
        assert_abs_diff_eq!(npv, 0.25, epsilon = 1e-15);
    }

    #[test]
    fn reprices_zero_bonds() {
        let model = hull_white();
        let lattice = GaussianLattice::new(&model, &[1.0, 5.0], &LatticeConfig::default()).unwrap();
        let npv = backward_induction(&lattice, &[5.0], |_, _| Ok(1.0)).unwrap();
        let expected = model.term_structure().discount(5.0);
        assert!(((npv - expected) / expected).abs() < 1e-6);
    }

    #[test]
    fn zero_volatility_collapses_slices() {
        let model = Gsr::with_constant_reversion(curve(), vec![], vec![0.0], 0.05).unwrap();
        let lattice = GaussianLattice::new(&model, &[1.0, 2.0], &LatticeConfig::default()).unwrap();
        assert!((0..lattice.slices()).all(|i| lattice.size(i) == 1));
        let npv = backward_induction(&lattice, &[2.0], |_, _| Ok(1.0)).unwrap();
        assert_abs_diff_eq!(npv, (-0.06_f64).exp(), epsilon = 1e-14);
    }

    #[test]
    fn unknown_times_and_bad_configs_are_rejected() {
        let model = hull_white();
        let lattice = GaussianLattice::new(&model, &[1.0], &LatticeConfig::default()).unwrap();
        assert!(matches!(lattice.index(0.5), Err(Error::InvalidArgument(_))));
        assert!(matches!(
            backward_induction(&lattice, &[0.5], |_, _| Ok(1.0)),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            GaussianLattice::new(&model, &[-1.0], &LatticeConfig::default()),
            Err(Error::InvalidArgument(_))
        ));
        let config = LatticeConfig::default().with_nodes(1);
        assert!(matches!(
            GaussianLattice::new(&model, &[1.0], &config),
            Err(Error::Precondition(_))
        ));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn transition_rows_sum_to_one(
            mean in -0.1f64..0.1,
            sd in 1e-4f64..0.05,
            width in 0.01f64..0.2,
            nodes in 2usize..200,
        ) {
            let h = 2.0 * width / (nodes - 1) as Real;
            let grid: Vec<Real> = (0..nodes).map(|k| -width + k as Real * h).collect();
            let system = spline_system(nodes);
            let row = transition_row(mean, sd, &grid, system.as_ref()).unwrap();
            prop_assert!((row.weights.iter().sum::<Real>() - 1.0).abs() < 1e-12);
            prop_assert!(row.weights.iter().map(|w| w.abs()).sum::<Real>() < 1.6);
            prop_assert!(row.first + row.weights.len() <= nodes);
            if nodes > 2 && mean.abs() < width - 12.0 * sd {
                let m: Real = row.weights.iter().zip(&grid[row.first..]).map(|(w, x)| w * x).sum();
                prop_assert!((m - mean).abs() < 1e-12);
            }
        }
    }
}
