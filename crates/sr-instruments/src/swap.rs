//! Fixed-for-floating swaps (translates the valuation core of
//! `ql/instruments/vanillaswap.hpp`).
//!
//! The swap is described by its fixed schedule `T_0 < T_1 < … < T_n`: the
//! fixed leg pays `N·K·(T_i − T_{i−1})` at `T_i`, the floating leg is
//! valued single-curve as `N·(P(T_0) − P(T_n))`.

use crate::instrument::Instrument;
use sr_core::{ensure, errors::Result, Rate, Real, Time, TIME_TOLERANCE};

/// Swap type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SwapType {
    /// Payer (pay fixed, receive floating).
    Payer,
    /// Receiver (receive fixed, pay floating).
    Receiver,
}

impl SwapType {
    /// +1 for Payer, −1 for Receiver.
    pub fn sign(self) -> Real {
        match self {
            SwapType::Payer => 1.0,
            SwapType::Receiver => -1.0,
        }
    }
}

/// A fixed-for-floating interest rate swap.
///
/// Valuation methods take a discount function `t ↦ P(t)` seen from the
/// valuation point: the curve for today's value, or a model's zero bonds
/// in a given state for a value at a future time.
///
/// Corresponds to `QuantLib::VanillaSwap`.
#[derive(Debug, Clone, PartialEq)]
pub struct FixedFloatSwap {
    swap_type: SwapType,
    nominal: Real,
    fixed_rate: Rate,
    schedule: Vec<Time>,
}

impl FixedFloatSwap {
    /// Create a swap on `schedule` (start time followed by payment times).
    pub fn new(swap_type: SwapType, nominal: Real, fixed_rate: Rate, schedule: Vec<Time>) -> Result<Self> {
        ensure!(
            schedule.len() >= 2,
            "swap schedule needs a start and at least one payment time"
        );
        ensure!(
            schedule.windows(2).all(|w| w[1] > w[0]),
            "swap schedule must be strictly increasing"
        );
        ensure!(
            nominal.is_finite() && nominal > 0.0,
            "swap nominal must be positive, got {nominal}"
        );
        ensure!(fixed_rate.is_finite(), "fixed rate must be finite");
        Ok(Self {
            swap_type,
            nominal,
            fixed_rate,
            schedule,
        })
    }

    /// A swap starting at `start` with `periods` equal fixed periods of
    /// length `period`.
    pub fn regular(
        swap_type: SwapType,
        nominal: Real,
        fixed_rate: Rate,
        start: Time,
        period: Time,
        periods: usize,
    ) -> Result<Self> {
        ensure!(periods > 0, "swap needs at least one period");
        ensure!(period > 0.0, "swap period must be positive, got {period}");
        let schedule = (0..=periods).map(|i| start + i as Time * period).collect();
        Self::new(swap_type, nominal, fixed_rate, schedule)
    }

    /// Payer or receiver.
    pub fn swap_type(&self) -> SwapType {
        self.swap_type
    }

    /// Notional.
    pub fn nominal(&self) -> Real {
        self.nominal
    }

    /// Fixed coupon rate.
    pub fn fixed_rate(&self) -> Rate {
        self.fixed_rate
    }

    /// The fixed schedule.
    pub fn schedule(&self) -> &[Time] {
        &self.schedule
    }

    /// Start of the first accrual period.
    pub fn start(&self) -> Time {
        self.schedule[0]
    }

    /// Last payment time.
    pub fn maturity(&self) -> Time {
        self.schedule[self.schedule.len() - 1]
    }

    /// Fixed payment times.
    pub fn payment_times(&self) -> &[Time] {
        &self.schedule[1..]
    }

    /// The same swap with another fixed rate.
    pub fn with_fixed_rate(&self, fixed_rate: Rate) -> Self {
        Self {
            fixed_rate,
            ..self.clone()
        }
    }

    /// The same swap with another direction.
    pub fn with_swap_type(&self, swap_type: SwapType) -> Self {
        Self {
            swap_type,
            ..self.clone()
        }
    }

    /// The part of the swap whose accrual periods start at or after `t`,
    /// or `None` if no period is left.
    pub fn remaining_from(&self, t: Time) -> Option<Self> {
        let first = self.schedule.partition_point(|&s| s < t - TIME_TOLERANCE);
        if first + 1 >= self.schedule.len() {
            return None;
        }
        Some(Self {
            schedule: self.schedule[first..].to_vec(),
            ..self.clone()
        })
    }

    /// Fixed cash flows `(payment time, amount)`.
    pub fn fixed_cash_flows(&self) -> Vec<(Time, Real)> {
        self.schedule
            .windows(2)
            .map(|w| (w[1], self.nominal * self.fixed_rate * (w[1] - w[0])))
            .collect()
    }

    /// `N·Σ τ_i·P(T_i)`.
    pub fn annuity<F>(&self, discount: F) -> Result<Real>
    where
        F: Fn(Time) -> Result<Real>,
    {
        let mut sum = 0.0;
        for w in self.schedule.windows(2) {
            sum += (w[1] - w[0]) * discount(w[1])?;
        }
        Ok(self.nominal * sum)
    }

    /// Value of the fixed leg.
    pub fn fixed_leg_npv<F>(&self, discount: F) -> Result<Real>
    where
        F: Fn(Time) -> Result<Real>,
    {
        Ok(self.fixed_rate * self.annuity(discount)?)
    }

    /// Value of the floating leg.
    pub fn floating_leg_npv<F>(&self, discount: F) -> Result<Real>
    where
        F: Fn(Time) -> Result<Real>,
    {
        Ok(self.nominal * (discount(self.start())? - discount(self.maturity())?))
    }

    /// Value to the holder: floating minus fixed for a payer.
    pub fn npv<F>(&self, discount: F) -> Result<Real>
    where
        F: Fn(Time) -> Result<Real>,
    {
        let floating = self.floating_leg_npv(&discount)?;
        let fixed = self.fixed_leg_npv(&discount)?;
        Ok(self.swap_type.sign() * (floating - fixed))
    }

    /// The fixed rate giving a zero value.
    pub fn fair_rate<F>(&self, discount: F) -> Result<Rate>
    where
        F: Fn(Time) -> Result<Real>,
    {
        let annuity = self.annuity(&discount)?;
        ensure!(annuity > 0.0, "swap annuity must be positive, got {annuity}");
        Ok(self.floating_leg_npv(&discount)? / annuity)
    }
}

impl Instrument for FixedFloatSwap {
    fn maturity_time(&self) -> Time {
        self.maturity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn flat(t: Time) -> Result<Real> {
        Ok((-0.03 * t).exp())
    }

    #[test]
    fn legs_and_fair_rate() {
        let swap = FixedFloatSwap::regular(SwapType::Payer, 100.0, 0.04, 1.0, 1.0, 5).unwrap();
        assert_eq!(swap.schedule(), &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let annuity = swap.annuity(flat).unwrap();
        let expected: Real = (2..=6).map(|i| (-0.03 * i as Real).exp()).sum::<Real>() * 100.0;
        assert_abs_diff_eq!(annuity, expected, epsilon = 1e-12);

        let fair = swap.fair_rate(flat).unwrap();
        let at_par = swap.with_fixed_rate(fair);
        assert_abs_diff_eq!(at_par.npv(flat).unwrap(), 0.0, epsilon = 1e-12);

        let payer = swap.npv(flat).unwrap();
        let receiver = swap.with_swap_type(SwapType::Receiver).npv(flat).unwrap();
        assert_abs_diff_eq!(payer, -receiver, epsilon = 1e-14);
        assert!(payer < 0.0);
    }

    #[test]
    fn remaining_periods() {
        let swap = FixedFloatSwap::regular(SwapType::Payer, 1.0, 0.03, 1.0, 0.5, 4).unwrap();
        let rest = swap.remaining_from(1.7).unwrap();
        assert_eq!(rest.schedule(), &[2.0, 2.5, 3.0]);
        assert_eq!(swap.remaining_from(0.3).unwrap(), swap);
        assert!(swap.remaining_from(2.6).is_none());
        assert_eq!(swap.fixed_cash_flows().len(), 4);
    }

    #[test]
    fn invalid_swaps_are_rejected() {
        assert!(FixedFloatSwap::new(SwapType::Payer, 1.0, 0.03, vec![1.0]).is_err());
        assert!(FixedFloatSwap::new(SwapType::Payer, 1.0, 0.03, vec![1.0, 1.0]).is_err());
        assert!(FixedFloatSwap::new(SwapType::Payer, -1.0, 0.03, vec![1.0, 2.0]).is_err());
    }
}
