//! # sr-methods
//!
//! Discretizations of the Gaussian short-rate state used by the numerical
//! pricing engines.
//!
//! # Modules
//!
//! * [`time_grid`]: time grids keeping mandatory times exactly
//! * [`lattice`]: the [`Lattice`] rollback interface, the Gaussian
//!   integration lattice and the Hull-White trinomial tree
//! * [`finite_differences`]: tridiagonal operators and the Crank–Nicolson
//!   solver of the deflated pricing PDE

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// ── Modules ───────────────────────────────────────────────────────────────────

/// Time grids.
pub mod time_grid;

/// Lattices and backward induction.
pub mod lattice;

/// Finite difference methods.
pub mod finite_differences;

// ── Convenience re-exports ────────────────────────────────────────────────────

pub use finite_differences::{FdConfig, FdGaussianSolver, Fdm1dMesher, TridiagonalOperator};
pub use lattice::{
    backward_induction, GaussianLattice, Lattice, LatticeConfig, ShortRateTree, TreeConfig,
    TrinomialTree,
};
pub use time_grid::TimeGrid;
