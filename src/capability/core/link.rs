//! Logistic observation link `h(c) = 1 / (1 + e^{-g·c})`.
//!
//! Maps latent capability to an expected score in (0, 1). All evaluations
//! go through [`safe_logistic`], so large `|g·c|` saturates instead of
//! overflowing.
use crate::optimization::numerical_stability::safe_logistic;

/// Expected score at capability `c` with steepness `g`.
pub fn observe(c: f64, g: f64) -> f64 {
    safe_logistic(g * c)
}

/// `dh/dc = g·h(c)·(1 − h(c))`.
pub fn observe_derivative(c: f64, g: f64) -> f64 {
    let h = observe(c, g);
    g * h * (1.0 - h)
}

/// Link evaluated at one point together with the partials the analytic EKF
/// gradient needs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinkPartials {
    /// `h(c)`.
    pub h: f64,
    /// `H = dh/dc`.
    pub slope: f64,
    /// `∂h/∂g = c·h(1 − h)`.
    pub dh_dg: f64,
    /// `∂H/∂c = g²·h(1 − h)(1 − 2h)`.
    pub dslope_dc: f64,
    /// `∂H/∂g = h(1 − h)·(1 + g·c·(1 − 2h))`.
    pub dslope_dg: f64,
}

/// Logistic link with fixed steepness.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogisticLink {
    pub g: f64,
}

impl LogisticLink {
    pub fn new(g: f64) -> Self {
        Self { g }
    }

    pub fn observe(&self, c: f64) -> f64 {
        observe(c, self.g)
    }

    pub fn derivative(&self, c: f64) -> f64 {
        observe_derivative(c, self.g)
    }

    /// `(h(c), H(c))` in one logistic evaluation.
    pub fn linearize(&self, c: f64) -> (f64, f64) {
        let h = self.observe(c);
        (h, self.g * h * (1.0 - h))
    }

    pub fn partials(&self, c: f64) -> LinkPartials {
        let g = self.g;
        let h = self.observe(c);
        let s1 = h * (1.0 - h);
        let tilt = 1.0 - 2.0 * h;
        LinkPartials {
            h,
            slope: g * s1,
            dh_dg: c * s1,
            dslope_dc: g * g * s1 * tilt,
            dslope_dg: s1 * (1.0 + g * c * tilt),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Range, monotonicity and saturation of the link.
    // - The g → 0⁺ limit.
    // - Link partials against central differences.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // The link is strictly increasing and saturates without overflow.
    //
    // Given
    // -----
    // - g = 10 and c ∈ {−500, −0.1, 0, 0.1, 500}.
    //
    // Expect
    // ------
    // - Non-decreasing values in [0, 1], h(0) = 0.5, derivative finite.
    fn observe_is_monotone_bounded_and_overflow_free() {
        let cs = [-500.0, -0.1, 0.0, 0.1, 500.0];
        let hs: Vec<f64> = cs.iter().map(|&c| observe(c, 10.0)).collect();
        assert!(hs.windows(2).all(|w| w[0] <= w[1]));
        assert!(hs.iter().all(|h| (0.0..=1.0).contains(h)));
        assert!(hs[1] < hs[2] && hs[2] < hs[3]);
        assert_eq!(hs[2], 0.5);
        assert!(cs.iter().all(|&c| observe_derivative(c, 10.0).is_finite()));
    }

    #[test]
    // Purpose
    // -------
    // As g → 0⁺ the link flattens to 0.5 with zero slope.
    //
    // Given
    // -----
    // - g = 1e-9 and c = 3.
    //
    // Expect
    // ------
    // - |h − 0.5| < 1e-8 and |H| < 1e-8.
    fn observe_flattens_as_steepness_vanishes() {
        let g = 1e-9;
        assert!((observe(3.0, g) - 0.5).abs() < 1e-8);
        assert!(observe_derivative(3.0, g).abs() < 1e-8);
    }

    #[test]
    // Purpose
    // -------
    // Analytic partials agree with central differences.
    //
    // Given
    // -----
    // - g = 1.7, c = 0.4, step 1e-6.
    //
    // Expect
    // ------
    // - slope, ∂h/∂g, ∂H/∂c, ∂H/∂g within 1e-6 of their FD counterparts.
    fn partials_match_central_differences() {
        let (g, c, eps) = (1.7, 0.4, 1e-6);
        let p = LogisticLink::new(g).partials(c);

        let fd_slope = (observe(c + eps, g) - observe(c - eps, g)) / (2.0 * eps);
        let fd_dh_dg = (observe(c, g + eps) - observe(c, g - eps)) / (2.0 * eps);
        let fd_dslope_dc =
            (observe_derivative(c + eps, g) - observe_derivative(c - eps, g)) / (2.0 * eps);
        let fd_dslope_dg =
            (observe_derivative(c, g + eps) - observe_derivative(c, g - eps)) / (2.0 * eps);

        assert!((p.slope - fd_slope).abs() < 1e-6);
        assert!((p.dh_dg - fd_dh_dg).abs() < 1e-6);
        assert!((p.dslope_dc - fd_dslope_dc).abs() < 1e-6);
        assert!((p.dslope_dg - fd_dslope_dg).abs() < 1e-6);
        assert_eq!(LogisticLink::new(g).linearize(c), (p.h, p.slope));
    }
}
