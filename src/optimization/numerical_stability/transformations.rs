//! Numerical stability utilities.
//!
//! Guarded versions of the logistic family of transforms. Each one keeps
//! `f64` arithmetic away from overflow by switching formula on the sign of
//! the argument (the usual trick for `1 / (1 + e^{-x})`), or by clamping
//! probabilities strictly inside `(0, 1)` before taking logs.
//!
//! # Provided items
//! - [`LOGIT_EPS`], [`EIGEN_EPS`], [`GENERAL_TOL`]: shared tolerances.
//! - [`safe_logistic`] / [`safe_logit`]: ℝ ↔ (0, 1).
//! - [`logistic_deriv`]: `σ(x)(1 − σ(x))` without recomputing `σ` twice.
//! - [`to_bounded`] / [`from_bounded`] / [`to_bounded_deriv`]: ℝ ↔ (lo, hi)
//!   via the scaled logistic, used to turn a box-constrained problem into
//!   an unconstrained one.

/// Relative distance kept from either end of a box before taking a logit.
///
/// A start point sitting exactly on a bound would map to ±∞ in logit
/// space; it is pulled in by `LOGIT_EPS × (hi − lo)` first.
pub const LOGIT_EPS: f64 = 1e-6;

/// Eigenvalues of an information matrix at or below this are treated as
/// zero when forming a pseudo-inverse.
pub const EIGEN_EPS: f64 = 1e-10;

/// Generic absolute tolerance for floating-point comparisons.
pub const GENERAL_TOL: f64 = 1e-12;

/// Numerically stable logistic `σ(x) = 1 / (1 + e^{-x})`.
///
/// Never evaluates `e^{x}` for large positive `x` or `e^{-x}` for large
/// negative `x`; the result lies in `[0, 1]` for every finite input.
pub fn safe_logistic(x: f64) -> f64 {
    if x >= 0.0 {
        1.0 / (1.0 + (-x).exp())
    } else {
        let e = x.exp();
        e / (1.0 + e)
    }
}

/// Derivative of the logistic, `σ(x)(1 − σ(x))`.
pub fn logistic_deriv(x: f64) -> f64 {
    let s = safe_logistic(x);
    s * (1.0 - s)
}

/// Logit `ln(p / (1 − p))`, with `p` clamped into `[LOGIT_EPS, 1 − LOGIT_EPS]`.
pub fn safe_logit(p: f64) -> f64 {
    let p = p.clamp(LOGIT_EPS, 1.0 - LOGIT_EPS);
    (p / (1.0 - p)).ln()
}

/// Map an unconstrained `theta` into the open box `(lo, hi)`.
pub fn to_bounded(theta: f64, lo: f64, hi: f64) -> f64 {
    lo + (hi - lo) * safe_logistic(theta)
}

/// `d to_bounded / d theta = (hi − lo) σ(θ)(1 − σ(θ))`.
pub fn to_bounded_deriv(theta: f64, lo: f64, hi: f64) -> f64 {
    (hi - lo) * logistic_deriv(theta)
}

/// Inverse of [`to_bounded`].
///
/// `x` is first clamped into `[lo + LOGIT_EPS·w, hi − LOGIT_EPS·w]` with
/// `w = hi − lo`, so values on or outside the box still produce a finite
/// logit.
pub fn from_bounded(x: f64, lo: f64, hi: f64) -> f64 {
    let w = hi - lo;
    safe_logit((x - lo) / w)
}

#[cfg(test)]
mod tests {
    use super::*;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Tail behavior and symmetry of the logistic helpers.
    // - Round trips and clamping for the bounded transform.
    // - The bounded-transform derivative against a central difference.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // `safe_logistic` is finite and symmetric in the far tails.
    //
    // Given
    // -----
    // - x = ±800 (where `exp(x)` overflows) and x = ±1.3.
    //
    // Expect
    // ------
    // - σ(800) = 1, σ(−800) = 0, σ(x) + σ(−x) = 1.
    fn safe_logistic_is_stable_in_tails_and_symmetric() {
        assert_eq!(safe_logistic(800.0), 1.0);
        assert_eq!(safe_logistic(-800.0), 0.0);
        assert!((safe_logistic(1.3) + safe_logistic(-1.3) - 1.0).abs() < GENERAL_TOL);
        assert_eq!(safe_logistic(0.0), 0.5);
    }

    #[test]
    // Purpose
    // -------
    // The bounded transform inverts cleanly inside the box.
    //
    // Given
    // -----
    // - Box (−5, 2) and interior points −4.2, 0, 1.9.
    //
    // Expect
    // ------
    // - `to_bounded(from_bounded(x)) ≈ x` to 1e-9.
    fn bounded_transform_round_trips_interior_points() {
        for x in [-4.2, 0.0, 1.9] {
            let back = to_bounded(from_bounded(x, -5.0, 2.0), -5.0, 2.0);
            assert!((back - x).abs() < 1e-9, "x = {x}, back = {back}");
        }
    }

    #[test]
    // Purpose
    // -------
    // Points on or beyond a bound are pulled inside instead of producing ±∞.
    //
    // Given
    // -----
    // - Box (0, 1) and x ∈ {0, 1, 3}.
    //
    // Expect
    // ------
    // - Finite logits; x = 1 and x = 3 give the same value.
    fn from_bounded_clamps_boundary_values() {
        let at_lo = from_bounded(0.0, 0.0, 1.0);
        let at_hi = from_bounded(1.0, 0.0, 1.0);
        let beyond = from_bounded(3.0, 0.0, 1.0);
        assert!(at_lo.is_finite() && at_hi.is_finite());
        assert_eq!(at_hi, beyond);
        assert!(at_lo < 0.0 && at_hi > 0.0);
    }

    #[test]
    // Purpose
    // -------
    // `to_bounded_deriv` matches a central difference of `to_bounded`.
    //
    // Given
    // -----
    // - Box (0.1, 10), θ = 0.7, h = 1e-6.
    //
    // Expect
    // ------
    // - Agreement to 1e-6.
    fn to_bounded_deriv_matches_central_difference() {
        let (lo, hi, theta, h) = (0.1, 10.0, 0.7, 1e-6);
        let fd = (to_bounded(theta + h, lo, hi) - to_bounded(theta - h, lo, hi)) / (2.0 * h);
        assert!((to_bounded_deriv(theta, lo, hi) - fd).abs() < 1e-6);
    }
}
