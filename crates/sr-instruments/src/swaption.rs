//! Swaptions (translates `ql/instruments/swaption.hpp`).

use crate::exercise::Exercise;
use crate::instrument::Instrument;
use crate::swap::FixedFloatSwap;
use sr_core::{ensure, errors::Result, Time, TIME_TOLERANCE};

/// Option to enter the underlying swap.
///
/// Exercising at `t` enters the periods of the swap starting at or after
/// `t`, so every exercise time must leave at least one period.
///
/// Corresponds to `QuantLib::Swaption` with physical settlement.
#[derive(Debug, Clone, PartialEq)]
pub struct Swaption {
    swap: FixedFloatSwap,
    exercise: Exercise,
}

impl Swaption {
    /// Create a swaption on `swap`.
    pub fn new(swap: FixedFloatSwap, exercise: Exercise) -> Result<Self> {
        let last_start = swap.schedule()[swap.schedule().len() - 2];
        ensure!(
            exercise.last_time() <= last_start + TIME_TOLERANCE,
            "exercise at {} after the last accrual start {last_start}",
            exercise.last_time()
        );
        Ok(Self { swap, exercise })
    }

    /// The underlying swap.
    pub fn swap(&self) -> &FixedFloatSwap {
        &self.swap
    }

    /// The exercise schedule.
    pub fn exercise(&self) -> &Exercise {
        &self.exercise
    }

    /// The swap entered on exercise at `t`.
    pub fn underlying_at(&self, t: Time) -> Result<FixedFloatSwap> {
        self.swap.remaining_from(t).ok_or_else(|| {
            sr_core::Error::InvalidArgument(format!("no swap period left after time {t}"))
        })
    }
}

impl Instrument for Swaption {
    fn maturity_time(&self) -> Time {
        self.exercise.last_time()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::swap::SwapType;

    #[test]
    fn bermudan_swaption_enters_the_remaining_swap() {
        let swap = FixedFloatSwap::regular(SwapType::Receiver, 1.0, 0.03, 1.0, 1.0, 4).unwrap();
        let exercise = Exercise::bermudan(vec![1.0, 2.0, 3.0]).unwrap();
        let swaption = Swaption::new(swap, exercise).unwrap();
        assert_eq!(swaption.underlying_at(2.0).unwrap().schedule(), &[2.0, 3.0, 4.0, 5.0]);
        assert_eq!(swaption.underlying_at(3.0).unwrap().schedule(), &[3.0, 4.0, 5.0]);
        assert!(!swaption.is_expired());
    }

    #[test]
    fn exercise_after_the_last_period_is_rejected() {
        let swap = FixedFloatSwap::regular(SwapType::Payer, 1.0, 0.03, 1.0, 1.0, 2).unwrap();
        assert!(Swaption::new(swap.clone(), Exercise::european(2.5).unwrap()).is_err());
        let expired = Swaption::new(swap, Exercise::european(-0.5).unwrap()).unwrap();
        assert!(expired.is_expired());
    }
}
