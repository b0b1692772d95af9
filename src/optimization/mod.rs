//! optimization — MLE stack, box constraints, numerical helpers, and the
//! unified optimizer error surface.
//!
//! Purpose
//! -------
//! Everything needed to turn "here is a log-likelihood over six bounded
//! hyperparameters" into fitted values and diagnostics, without the model
//! layer touching Argmin directly.
//!
//! Key behaviors
//! -------------
//! - [`loglik_optimizer`]: Argmin L-BFGS maximization of `ℓ(θ)` with
//!   selectable line search, tolerances, timeout and finite-difference
//!   fallbacks.
//! - [`box_constrained`]: "minimize over a box" abstraction with a
//!   logit-reparameterized L-BFGS implementation.
//! - [`numerical_stability`]: guarded logistic/logit transforms and shared
//!   tolerances.
//! - [`errors`]: [`errors::OptError`] / [`errors::OptResult`], including
//!   normalization of Argmin errors and of capability-layer failures raised
//!   inside an objective.
//!
//! Invariants & assumptions
//! ------------------------
//! - Solvers maximize `ℓ(θ)` by minimizing `c(θ) = -ℓ(θ)`; outcomes are
//!   always reported in terms of `ℓ` (or of the box cost, for
//!   [`box_constrained`]).
//! - Invalid trial points surface as `OptError`, never as panics.
//!
//! Conventions
//! -----------
//! - Nothing here logs, except the optional `obs_slog` observer wired in
//!   [`loglik_optimizer::run`].
//!
//! Testing notes
//! -------------
//! - Each submodule tests its own concern on toy objectives. The capability
//!   estimator and the integration tests exercise the full stack on filter
//!   log-likelihoods.

pub mod box_constrained;
pub mod errors;
pub mod loglik_optimizer;
pub mod numerical_stability;

pub mod prelude {
    pub use super::box_constrained::{BoxBounds, BoxMinimizer, BoxObjective, BoxOutcome, LogitLbfgs};
    pub use super::errors::{OptError, OptResult};
    pub use super::loglik_optimizer::prelude::*;
    pub use super::numerical_stability::prelude::*;
}
