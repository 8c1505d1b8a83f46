//! Option types (translates `ql/option.hpp`).

use sr_core::Real;
use std::fmt;

/// Call or put, on a bond price or a swap rate.
///
/// Corresponds to `QuantLib::Option::Type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OptionType {
    /// Pays `max(S − K, 0)`.
    Call,
    /// Pays `max(K − S, 0)`.
    Put,
}

impl OptionType {
    /// `+1` for a call, `−1` for a put.
    pub fn sign(self) -> Real {
        if self == OptionType::Call {
            1.0
        } else {
            -1.0
        }
    }

    /// `max(±(underlying − strike), 0)`.
    pub fn intrinsic(self, underlying: Real, strike: Real) -> Real {
        (self.sign() * (underlying - strike)).max(0.0)
    }
}

impl fmt::Display for OptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(if *self == OptionType::Call { "call" } else { "put" })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intrinsic_values() {
        assert_eq!(OptionType::Call.intrinsic(1.2, 1.0), 1.2 - 1.0);
        assert_eq!(OptionType::Call.intrinsic(0.8, 1.0), 0.0);
        assert_eq!(OptionType::Put.intrinsic(0.8, 1.0), 1.0 - 0.8);
        assert_eq!(OptionType::Put.to_string(), "put");
    }
}
