//! box_constrained — minimize a scalar function over a box.
//!
//! Purpose
//! -------
//! The capability estimator needs "minimize this over
//! `[lo_1, hi_1] × … × [lo_n, hi_n]`" and nothing more. [`BoxMinimizer`]
//! names that capability so the estimator does not depend on how it is
//! solved; [`LogitLbfgs`] is the implementation shipped here.
//!
//! Key behaviors
//! -------------
//! - [`BoxObjective`]: scalar cost plus an optional analytic gradient, both
//!   in box coordinates. Implementors are `Sync` so independent starts can
//!   run on a thread pool.
//! - [`BoxBounds`]: validated bounds with the logit mapping helpers.
//! - [`BoxOutcome`]: best point in box coordinates, its cost, and the raw
//!   solver diagnostics.
//!
//! Invariants
//! ----------
//! - `BoxOutcome::x_hat` lies inside the bounds.
//! - Starting points are clamped inside the box, never rejected for being
//!   on or past a bound.

pub mod bounds;
pub mod logit_lbfgs;

pub use self::bounds::BoxBounds;
pub use self::logit_lbfgs::LogitLbfgs;

use crate::optimization::{
    errors::{OptError, OptResult},
    loglik_optimizer::{Grad, OptimOutcome, Theta},
};

/// Scalar objective over a box.
pub trait BoxObjective: Sync {
    fn cost(&self, x: &Theta) -> OptResult<f64>;

    /// Analytic gradient of `cost` in box coordinates. The default defers to
    /// finite differences.
    fn gradient(&self, _x: &Theta) -> OptResult<Grad> {
        Err(OptError::GradientNotImplemented)
    }
}

/// Result of a box-constrained minimization.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxOutcome {
    /// Minimizer in box coordinates.
    pub x_hat: Theta,
    /// `cost(x_hat)`.
    pub cost: f64,
    /// Raw solver outcome in the solver's own coordinates; `converged`,
    /// `status` and counters are read from here.
    pub optim: OptimOutcome,
}

impl BoxOutcome {
    pub fn converged(&self) -> bool {
        self.optim.converged
    }
}

/// "Minimize a scalar function over a box."
pub trait BoxMinimizer: Send + Sync {
    fn minimize<O: BoxObjective>(
        &self, objective: &O, x0: &Theta, bounds: &BoxBounds,
    ) -> OptResult<BoxOutcome>;
}
