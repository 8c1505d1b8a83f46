//! Options on zero-coupon bonds.

use crate::exercise::Exercise;
use crate::instrument::Instrument;
use crate::option::OptionType;
use sr_core::{ensure, errors::Result, Real, Time};

/// Option on a unit zero-coupon bond maturing at `bond_maturity`, paying
/// `max(ω·(P − K), 0)` on exercise.
#[derive(Debug, Clone, PartialEq)]
pub struct BondOption {
    option_type: OptionType,
    strike: Real,
    exercise: Exercise,
    bond_maturity: Time,
}

impl BondOption {
    /// Create an option with the given exercise schedule.
    pub fn new(
        option_type: OptionType,
        strike: Real,
        exercise: Exercise,
        bond_maturity: Time,
    ) -> Result<Self> {
        ensure!(strike.is_finite() && strike > 0.0, "bond option strike must be positive, got {strike}");
        ensure!(
            exercise.last_time() <= bond_maturity,
            "exercise at {} after the bond maturity {bond_maturity}",
            exercise.last_time()
        );
        Ok(Self {
            option_type,
            strike,
            exercise,
            bond_maturity,
        })
    }

    /// A European option expiring at `expiry`.
    pub fn european(option_type: OptionType, strike: Real, expiry: Time, bond_maturity: Time) -> Result<Self> {
        Self::new(option_type, strike, Exercise::european(expiry)?, bond_maturity)
    }

    /// Call or put.
    pub fn option_type(&self) -> OptionType {
        self.option_type
    }

    /// Strike price per unit face.
    pub fn strike(&self) -> Real {
        self.strike
    }

    /// The exercise schedule.
    pub fn exercise(&self) -> &Exercise {
        &self.exercise
    }

    /// Maturity of the underlying bond.
    pub fn bond_maturity(&self) -> Time {
        self.bond_maturity
    }

    /// Exercise payoff for a bond price.
    pub fn payoff(&self, bond_price: Real) -> Real {
        self.option_type.intrinsic(bond_price, self.strike)
    }
}

impl Instrument for BondOption {
    fn maturity_time(&self) -> Time {
        self.exercise.last_time()
    }
}
