//! Uniform state mesh (translates `ql/methods/finitedifferences/meshers/
//! uniform1dmesher.hpp`).

use sr_core::{ensure, errors::Result, Real};

/// An odd number of equally spaced points on `[−half_width, half_width]`.
///
/// The centre point is exactly zero.
///
/// Corresponds to `QuantLib::Uniform1dMesher`.
#[derive(Debug, Clone, PartialEq)]
pub struct Fdm1dMesher {
    locations: Vec<Real>,
    dx: Real,
}

impl Fdm1dMesher {
    /// Build a mesh of `points` locations, rounded up to an odd count.
    pub fn new(half_width: Real, points: usize) -> Result<Self> {
        ensure!(
            half_width.is_finite() && half_width > 0.0,
            "mesh half-width must be positive, got {half_width}"
        );
        ensure!(points >= 3, "mesh needs at least 3 points, got {points}");
        let n = points | 1;
        let centre = (n - 1) / 2;
        let dx = half_width / centre as Real;
        let locations = (0..n)
            .map(|k| (k as Real - centre as Real) * dx)
            .collect();
        Ok(Self { locations, dx })
    }

    /// Number of points.
    pub fn size(&self) -> usize {
        self.locations.len()
    }

    /// Spacing.
    pub fn dx(&self) -> Real {
        self.dx
    }

    /// Index of the zero point.
    pub fn centre(&self) -> usize {
        (self.locations.len() - 1) / 2
    }

    /// The mesh points.
    pub fn locations(&self) -> &[Real] {
        &self.locations
    }
}
