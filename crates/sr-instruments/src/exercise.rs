//! Option exercise schedules (translates `ql/exercise.hpp`).
//!
//! An `Exercise` defines *when* an option can be exercised, as times from
//! the reference date.

use sr_core::{ensure, errors::Result, Time};
use std::fmt;

/// Type of exercise right.
///
/// Corresponds to `QuantLib::Exercise::Type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ExerciseType {
    /// Can only be exercised at expiry.
    European,
    /// Can be exercised at a finite set of times.
    Bermudan,
}

/// Exercise specification for an option.
///
/// Corresponds to `QuantLib::EuropeanExercise` / `QuantLib::BermudanExercise`.
#[derive(Debug, Clone, PartialEq)]
pub struct Exercise {
    exercise_type: ExerciseType,
    times: Vec<Time>,
}

impl Exercise {
    /// A European exercise at `expiry`.
    pub fn european(expiry: Time) -> Result<Self> {
        ensure!(expiry.is_finite(), "exercise time must be finite, got {expiry}");
        Ok(Self {
            exercise_type: ExerciseType::European,
            times: vec![expiry],
        })
    }

    /// A Bermudan exercise on `times`, which are sorted and deduplicated.
    pub fn bermudan(mut times: Vec<Time>) -> Result<Self> {
        ensure!(!times.is_empty(), "Bermudan exercise needs at least one time");
        ensure!(
            times.iter().all(|t| t.is_finite()),
            "exercise times must be finite"
        );
        times.sort_by(|a, b| a.total_cmp(b));
        times.dedup_by(|a, b| (*a - *b).abs() < sr_core::TIME_TOLERANCE);
        Ok(Self {
            exercise_type: ExerciseType::Bermudan,
            times,
        })
    }

    /// The type of exercise.
    pub fn exercise_type(&self) -> ExerciseType {
        self.exercise_type
    }

    /// All exercise times, increasing.
    pub fn times(&self) -> &[Time] {
        &self.times
    }

    /// The last possible exercise time.
    pub fn last_time(&self) -> Time {
        self.times[self.times.len() - 1]
    }

    /// Exercise times not in the past, tiny negative times clamped to 0.
    pub fn live_times(&self) -> Vec<Time> {
        self.times
            .iter()
            .filter(|&&t| t > -sr_core::TIME_TOLERANCE)
            .map(|&t| t.max(0.0))
            .collect()
    }
}

impl fmt::Display for Exercise {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.exercise_type {
            ExerciseType::European => write!(f, "European({})", self.times[0]),
            ExerciseType::Bermudan => write!(f, "Bermudan({} times)", self.times.len()),
        }
    }
}
