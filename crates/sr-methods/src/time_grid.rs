//! `TimeGrid` (translates `ql/timegrid.hpp`).

use sr_core::{ensure, ensure_arg, errors::Result, Time, TIME_TOLERANCE};

/// A grid of time points starting at 0.
///
/// Mandatory times are grid points exactly; the intervals between them are
/// split into equal steps no longer than `end / steps` (at least one step
/// per interval).
///
/// Corresponds to `QuantLib::TimeGrid`.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeGrid {
    times: Vec<Time>,
    dts: Vec<Time>,
    mandatory: Vec<Time>,
}

/// Sort, deduplicate within tolerance and prepend 0.
pub(crate) fn slice_times(mandatory: &[Time]) -> Result<Vec<Time>> {
    for &t in mandatory {
        ensure_arg!(t.is_finite() && t >= 0.0, "negative or non-finite time {t}");
    }
    let mut times = Vec::with_capacity(mandatory.len() + 1);
    times.push(0.0);
    times.extend_from_slice(mandatory);
    times.sort_by(|a, b| a.total_cmp(b));
    times.dedup_by(|a, b| (*a - *b).abs() < TIME_TOLERANCE);
    Ok(times)
}

impl TimeGrid {
    /// A uniform grid from 0 to `end` with `steps` intervals.
    pub fn uniform(end: Time, steps: usize) -> Result<Self> {
        ensure!(steps > 0, "time grid needs at least one step");
        ensure!(end > 0.0, "time grid end must be positive, got {end}");
        Self::new(&[end], steps)
    }

    /// A grid through 0 and `mandatory`, with about `steps` steps in total.
    pub fn new(mandatory: &[Time], steps: usize) -> Result<Self> {
        ensure!(steps > 0, "time grid needs at least one step");
        let mandatory = slice_times(mandatory)?;
        let end = mandatory[mandatory.len() - 1];
        ensure!(end > 0.0, "time grid needs a positive end time");
        let dt_max = end / steps as Time;

        let mut times = vec![0.0];
        for w in mandatory.windows(2) {
            let (start, stop) = (w[0], w[1]);
            let n = (((stop - start) / dt_max).round() as usize).max(1);
            let dt = (stop - start) / n as Time;
            times.extend((1..n).map(|k| start + k as Time * dt));
            times.push(stop);
        }
        let dts = times.windows(2).map(|w| w[1] - w[0]).collect();
        Ok(Self {
            times,
            dts,
            mandatory,
        })
    }

    /// Number of time points (= steps + 1).
    pub fn size(&self) -> usize {
        self.times.len()
    }

    /// Number of steps.
    pub fn steps(&self) -> usize {
        self.dts.len()
    }

    /// Time at index `i`.
    pub fn time(&self, i: usize) -> Time {
        self.times[i]
    }

    /// Step between index `i` and `i + 1`.
    pub fn dt(&self, i: usize) -> Time {
        self.dts[i]
    }

    /// Final time.
    pub fn end(&self) -> Time {
        self.times[self.times.len() - 1]
    }

    /// All time points.
    pub fn times(&self) -> &[Time] {
        &self.times
    }

    /// The mandatory times, including 0.
    pub fn mandatory_times(&self) -> &[Time] {
        &self.mandatory
    }

    /// Index of grid time `t`; fails if `t` is not on the grid.
    pub fn index(&self, t: Time) -> Result<usize> {
        find_time(&self.times, t)
    }
}

/// Index of `t` in the sorted `times`, within [`TIME_TOLERANCE`].
pub(crate) fn find_time(times: &[Time], t: Time) -> Result<usize> {
    let i = times.partition_point(|&s| s < t - TIME_TOLERANCE);
    ensure_arg!(
        i < times.len() && (times[i] - t).abs() < TIME_TOLERANCE,
        "time {t} is not a grid time"
    );
    Ok(i)
}
