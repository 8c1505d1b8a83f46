//! Model parameters (translates `ql/models/parameter.hpp`).

use sr_core::{ensure, errors::Result, Real};
use sr_math::Constraint;

/// A (possibly vector-valued) model parameter and the constraint each of
/// its values must satisfy.
///
/// Corresponds to `QuantLib::Parameter`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Parameter {
    values: Vec<Real>,
    constraint: Constraint,
}

impl Parameter {
    /// Create a parameter with initial values and a constraint.
    pub fn new(values: Vec<Real>, constraint: Constraint) -> Self {
        Self { values, constraint }
    }

    /// Create an unconstrained scalar parameter.
    pub fn constant(value: Real) -> Self {
        Self::new(vec![value], Constraint::None)
    }

    /// Number of values.
    pub fn size(&self) -> usize {
        self.values.len()
    }

    /// All values.
    pub fn values(&self) -> &[Real] {
        &self.values
    }

    /// Replace the values; the size cannot change.
    pub fn set_values(&mut self, values: &[Real]) -> Result<()> {
        ensure!(
            values.len() == self.values.len(),
            "parameter has {} values, got {}",
            self.values.len(),
            values.len()
        );
        self.values.copy_from_slice(values);
        Ok(())
    }

    /// Whether the current values satisfy the constraint.
    pub fn is_valid(&self) -> bool {
        self.constraint.test(&self.values)
    }

    /// The constraint on each value.
    pub fn constraint(&self) -> &Constraint {
        &self.constraint
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parameter_constant() {
        let p = Parameter::constant(0.05);
        assert_eq!(p.values(), &[0.05]);
        assert!(p.is_valid());
    }

    #[test]
    fn parameter_constraints() {
        let mut p = Parameter::new(vec![0.01, 0.02], Constraint::Positive);
        assert!(p.is_valid());
        p.set_values(&[0.01, -0.02]).unwrap();
        assert!(!p.is_valid());
        assert!(p.set_values(&[0.01]).is_err());
        let b = Parameter::new(vec![0.5], Constraint::Boundary { lower: 0.0, upper: 1.0 });
        assert!(b.is_valid());
    }
}
