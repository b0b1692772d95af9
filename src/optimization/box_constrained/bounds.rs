//! Per-coordinate box `[lower_i, upper_i]` and its logit reparameterization.
use ndarray::Array1;

use crate::optimization::{
    errors::{OptError, OptResult},
    loglik_optimizer::{Grad, Theta},
    numerical_stability::{LOGIT_EPS, from_bounded, to_bounded, to_bounded_deriv},
};

/// Validated box constraints.
///
/// Invariants: equal lengths, every bound finite, `lower_i < upper_i`.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxBounds {
    lower: Array1<f64>,
    upper: Array1<f64>,
}

impl BoxBounds {
    /// # Errors
    /// - [`OptError::BoundsDimMismatch`] for unequal lengths.
    /// - [`OptError::InvalidBounds`] for a non-finite or inverted pair.
    pub fn new(lower: Array1<f64>, upper: Array1<f64>) -> OptResult<Self> {
        if lower.len() != upper.len() {
            return Err(OptError::BoundsDimMismatch { lower: lower.len(), upper: upper.len() });
        }
        for (index, (&lo, &hi)) in lower.iter().zip(upper.iter()).enumerate() {
            if !lo.is_finite() || !hi.is_finite() {
                return Err(OptError::InvalidBounds {
                    index,
                    lower: lo,
                    upper: hi,
                    reason: "Bounds must be finite.",
                });
            }
            if lo >= hi {
                return Err(OptError::InvalidBounds {
                    index,
                    lower: lo,
                    upper: hi,
                    reason: "Lower bound must be strictly below upper bound.",
                });
            }
        }
        Ok(Self { lower, upper })
    }

    pub fn dim(&self) -> usize {
        self.lower.len()
    }

    pub fn lower(&self) -> &Array1<f64> {
        &self.lower
    }

    pub fn upper(&self) -> &Array1<f64> {
        &self.upper
    }

    /// `true` when every coordinate of `x` lies in its closed interval.
    pub fn contains(&self, x: &Theta) -> bool {
        x.len() == self.dim()
            && x.iter().zip(self.pairs()).all(|(&v, (lo, hi))| v >= lo && v <= hi)
    }

    /// Pull `x` into `[lo + LOGIT_EPS·w, hi − LOGIT_EPS·w]` coordinate-wise.
    ///
    /// Non-finite entries are replaced by the interval midpoint.
    pub fn clamp_interior(&self, x: &Theta) -> Theta {
        Array1::from_iter(x.iter().zip(self.pairs()).map(|(&v, (lo, hi))| {
            let margin = LOGIT_EPS * (hi - lo);
            if v.is_finite() { v.clamp(lo + margin, hi - margin) } else { 0.5 * (lo + hi) }
        }))
    }

    /// Box point → unconstrained logit coordinates (clamping first).
    pub fn to_unconstrained(&self, x: &Theta) -> Theta {
        Array1::from_iter(x.iter().zip(self.pairs()).map(|(&v, (lo, hi))| from_bounded(v, lo, hi)))
    }

    /// Unconstrained logit coordinates → box point.
    pub fn to_bounded(&self, theta: &Theta) -> Theta {
        Array1::from_iter(
            theta.iter().zip(self.pairs()).map(|(&t, (lo, hi))| to_bounded(t, lo, hi)),
        )
    }

    /// Diagonal of `dx/dθ`, used to chain a box-space gradient into logit
    /// space.
    pub fn jacobian_diag(&self, theta: &Theta) -> Grad {
        Array1::from_iter(
            theta.iter().zip(self.pairs()).map(|(&t, (lo, hi))| to_bounded_deriv(t, lo, hi)),
        )
    }

    fn pairs(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.lower.iter().copied().zip(self.upper.iter().copied())
    }
}
