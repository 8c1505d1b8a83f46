//! 1D root finding (translates `ql/math/solvers1d/brent.hpp`).
//!
//! [`brent`] solves on a given bracket; [`bracket`] widens a starting
//! interval geometrically until it encloses a sign change, mirroring the
//! guess/step overload of QuantLib's `Solver1D::solve`.

use sr_core::{
    errors::{Error, Result},
    Real,
};

const MAX_EVALUATIONS: usize = 100;
const GROWTH_FACTOR: Real = 1.6;
const DEFAULT_ACCURACY: Real = 1.0e-11;

// ── Brent ─────────────────────────────────────────────────────────────────────

/// Brent's method for a root of `f` in `[x_min, x_max]`.
///
/// Combines bisection, secant and inverse quadratic interpolation. The
/// bracket must contain a sign change. The first error returned by `f`
/// ends the search and is passed on.
pub fn brent<F>(f: F, x_min: Real, x_max: Real, accuracy: Real) -> Result<Real>
where
    F: Fn(Real) -> Result<Real>,
{
    let acc = if accuracy > 0.0 {
        accuracy
    } else {
        DEFAULT_ACCURACY
    };
    let mut a = x_min;
    let mut b = x_max;
    let mut fa = f(a)?;
    let mut fb = f(b)?;

    if !(fa.is_finite() && fb.is_finite()) {
        return Err(Error::Runtime(format!(
            "Brent: non-finite function value at bracket [{a}, {b}]"
        )));
    }
    if fa == 0.0 {
        return Ok(a);
    }
    if fb == 0.0 {
        return Ok(b);
    }
    if fa * fb > 0.0 {
        return Err(Error::Precondition(format!(
            "Brent: root not bracketed, f({a}) = {fa}, f({b}) = {fb}"
        )));
    }

    let mut c = b;
    let mut fc = fb;
    let mut d = b - a;
    let mut e = d;

    for _ in 0..MAX_EVALUATIONS {
        if fb * fc > 0.0 {
            c = a;
            fc = fa;
            d = b - a;
            e = d;
        }
        if fc.abs() < fb.abs() {
            a = b;
            b = c;
            c = a;
            fa = fb;
            fb = fc;
            fc = fa;
        }
        let tol = 2.0 * f64::EPSILON * b.abs() + 0.5 * acc;
        let xm = 0.5 * (c - b);
        if xm.abs() <= tol || fb == 0.0 {
            return Ok(b);
        }
        if e.abs() >= tol && fa.abs() > fb.abs() {
            let s = fb / fa;
            let (p, q) = if a == c {
                (2.0 * xm * s, 1.0 - s)
            } else {
                let q = fa / fc;
                let r = fb / fc;
                (
                    s * (2.0 * xm * q * (q - r) - (b - a) * (r - 1.0)),
                    (q - 1.0) * (r - 1.0) * (s - 1.0),
                )
            };
            let (p, q) = if p > 0.0 { (p, -q) } else { (-p, q) };
            if 2.0 * p < (3.0 * xm * q - (tol * q).abs()).min((e * q).abs()) {
                e = d;
                d = p / q;
            } else {
                d = xm;
                e = d;
            }
        } else {
            d = xm;
            e = d;
        }
        a = b;
        fa = fb;
        b += if d.abs() > tol { d } else { tol.copysign(xm) };
        fb = f(b)?;
    }
    Err(Error::Runtime(format!(
        "Brent: maximum number of function evaluations ({MAX_EVALUATIONS}) exceeded"
    )))
}

// ── Bracketing ───────────────────────────────────────────────────────────────

/// Widen `[guess - step, guess + step]` until `f` changes sign on it.
///
/// Returns the bracket; fails after `MAX_EVALUATIONS` expansions or with
/// the first error returned by `f`.
pub fn bracket<F>(f: &F, guess: Real, step: Real) -> Result<(Real, Real)>
where
    F: Fn(Real) -> Result<Real>,
{
    sr_core::ensure!(step > 0.0, "bracketing step ({step}) must be positive");
    let mut lo = guess - step;
    let mut hi = guess + step;
    let mut f_lo = f(lo)?;
    let mut f_hi = f(hi)?;
    for _ in 0..MAX_EVALUATIONS {
        if f_lo * f_hi <= 0.0 {
            return Ok((lo, hi));
        }
        if f_lo.abs() < f_hi.abs() {
            lo += GROWTH_FACTOR * (lo - hi);
            f_lo = f(lo)?;
        } else {
            hi += GROWTH_FACTOR * (hi - lo);
            f_hi = f(hi)?;
        }
    }
    Err(Error::Runtime(format!(
        "unable to bracket a root around {guess} (last interval [{lo}, {hi}])"
    )))
}
