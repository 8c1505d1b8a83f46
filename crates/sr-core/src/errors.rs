//! Error types for the short-rate workspace.
//!
//! One `thiserror`-derived enum covers the three failure classes of the
//! pricing core: configuration errors (`Precondition`), domain errors
//! (`InvalidArgument`, `Postcondition`) and plain runtime failures.
//! Optimizer non-convergence is *not* an error; it is reported through
//! `EndCriteriaType`.

use thiserror::Error;

/// The top-level error type used throughout the workspace.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    /// General runtime error.
    #[error("{0}")]
    Runtime(String),

    /// Precondition violated, typically a configuration error.
    #[error("precondition not satisfied: {0}")]
    Precondition(String),

    /// Postcondition violated: a computed quantity broke an invariant.
    #[error("postcondition not satisfied: {0}")]
    Postcondition(String),

    /// Index out of range.
    #[error("index ({index}) out of range [0, {size})")]
    IndexOutOfRange {
        /// The index that was out of range.
        index: usize,
        /// The size of the container.
        size: usize,
    },

    /// Invalid argument (negative horizon, unknown lattice time, ...).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Not implemented.
    #[error("not implemented: {0}")]
    NotImplemented(String),
}

/// Shorthand `Result` type used throughout the workspace.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Returns `Err(Error::Precondition(...))` if `$cond` is false.
///
/// # Example
/// ```
/// use sr_core::{ensure, errors::Error};
/// fn positive(x: f64) -> sr_core::errors::Result<f64> {
///     ensure!(x > 0.0, "x must be positive, got {x}");
///     Ok(x)
/// }
/// assert!(positive(1.0).is_ok());
/// assert!(positive(-1.0).is_err());
/// ```
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $($msg:tt)*) => {
        if !$cond {
            return Err($crate::errors::Error::Precondition(
                format!($($msg)*)
            ));
        }
    };
}

/// Returns `Err(Error::InvalidArgument(...))` if `$cond` is false.
///
/// # Example
/// ```
/// use sr_core::{ensure_arg, errors::Error};
/// fn horizon(dt: f64) -> sr_core::errors::Result<f64> {
///     ensure_arg!(dt >= 0.0, "negative horizon {dt}");
///     Ok(dt)
/// }
/// assert!(matches!(horizon(-1.0), Err(Error::InvalidArgument(_))));
/// ```
#[macro_export]
macro_rules! ensure_arg {
    ($cond:expr, $($msg:tt)*) => {
        if !$cond {
            return Err($crate::errors::Error::InvalidArgument(
                format!($($msg)*)
            ));
        }
    };
}

/// Returns `Err(Error::Postcondition(...))` if `$cond` is false.
///
/// # Example
/// ```
/// use sr_core::{ensure_post, errors::Error};
/// fn compute(x: f64) -> sr_core::errors::Result<f64> {
///     let result = x * 2.0;
///     ensure_post!(result > 0.0, "result must be positive, got {result}");
///     Ok(result)
/// }
/// assert!(compute(1.0).is_ok());
/// assert!(compute(-1.0).is_err());
/// ```
#[macro_export]
macro_rules! ensure_post {
    ($cond:expr, $($msg:tt)*) => {
        if !$cond {
            return Err($crate::errors::Error::Postcondition(
                format!($($msg)*)
            ));
        }
    };
}

/// Returns `Err(Error::Runtime(...))` immediately.
///
/// # Example
/// ```
/// use sr_core::{fail, errors::Error};
/// fn always_err() -> sr_core::errors::Result<()> {
///     fail!("something went wrong");
/// }
/// assert!(always_err().is_err());
/// ```
#[macro_export]
macro_rules! fail {
    ($($msg:tt)*) => {
        return Err($crate::errors::Error::Runtime(format!($($msg)*)))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check_sign(x: f64) -> Result<f64> {
        crate::ensure!(x.is_finite(), "not finite");
        crate::ensure_arg!(x >= 0.0, "negative value {x}");
        Ok(x)
    }

    #[test]
    fn macros_map_to_variants() {
        assert_eq!(check_sign(2.0), Ok(2.0));
        assert!(matches!(check_sign(-1.0), Err(Error::InvalidArgument(_))));
        assert!(matches!(check_sign(f64::NAN), Err(Error::Precondition(_))));
    }

    #[test]
    fn display_messages() {
        let e = Error::IndexOutOfRange { index: 5, size: 3 };
        assert_eq!(e.to_string(), "index (5) out of range [0, 3)");
        let e = Error::InvalidArgument("t = -1".into());
        assert_eq!(e.to_string(), "invalid argument: t = -1");
    }
}
