//! numerical_stability — guarded transforms and shared tolerances.
//!
//! Purpose
//! -------
//! Keep the small pieces of floating-point care in one place: the
//! logistic/logit pair used both by the capability observation link and by
//! the box-to-unconstrained reparameterization, plus the tolerances the
//! optimizer and inference layers agree on.
//!
//! Conventions
//! -----------
//! - Inputs are assumed finite; domain checks live in the callers.
//! - Pure functions only: no logging, no allocation, no global state.
//!
//! Testing notes
//! -------------
//! - [`transformations`] tests tails, symmetry, clamping and derivatives.

pub mod transformations;

pub use self::transformations::{
    EIGEN_EPS, GENERAL_TOL, LOGIT_EPS, from_bounded, logistic_deriv, safe_logistic, safe_logit,
    to_bounded, to_bounded_deriv,
};

pub mod prelude {
    pub use super::transformations::{
        EIGEN_EPS, LOGIT_EPS, from_bounded, safe_logistic, safe_logit, to_bounded,
    };
}
