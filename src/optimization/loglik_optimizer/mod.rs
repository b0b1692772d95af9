//! loglik_optimizer — Argmin-backed log-likelihood maximization.
//!
//! Purpose
//! -------
//! Give model code a single trait, [`LogLikelihood`], and a single entry
//! point, [`maximize`], that runs L-BFGS with a configurable line search,
//! tolerances, wall-clock budget and finite-difference fallbacks.
//!
//! Key behaviors
//! -------------
//! - [`adapter::ArgMinAdapter`] turns `ℓ(θ)` into the Argmin cost
//!   `c(θ) = -ℓ(θ)`.
//! - [`maximize`] validates the start with [`LogLikelihood::check`], picks a
//!   solver from [`builders`], runs it through [`run::run_lbfgs`] and
//!   returns an [`OptimOutcome`].
//! - [`finite_diff`] supplies gradients when the model has none, and the
//!   Hessians used for standard errors.
//!
//! Invariants & assumptions
//! ------------------------
//! - Models implement `ℓ(θ)` and optionally `∇ℓ(θ)`, never the cost.
//! - Invalid trial points are reported as [`OptError`] values and never
//!   panic; the solver backend sees them as failed evaluations.
//! - `OptimOutcome::converged` is `true` only for tolerance-based stops.
//!
//! Conventions
//! -----------
//! - Parameters live in an unconstrained space as [`Theta`]. Box
//!   constraints are handled one layer up in
//!   [`crate::optimization::box_constrained`].
//! - Errors are [`OptResult<T>`]; raw `argmin::core::Error` never leaves
//!   this module tree.
//!
//! Testing notes
//! -------------
//! - Submodule tests cover sign conventions ([`adapter`]), solver wiring
//!   ([`builders`]), derivative helpers ([`finite_diff`]), option and
//!   outcome rules ([`traits`], [`validation`]) and full toy solves
//!   ([`api`]).
//!
//! [`OptError`]: crate::optimization::errors::OptError
//! [`OptResult<T>`]: crate::optimization::errors::OptResult

pub mod adapter;
pub mod api;
pub mod builders;
pub mod finite_diff;
pub mod run;
pub mod traits;
pub mod types;
pub mod validation;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::api::maximize;
pub use self::traits::{LineSearcher, LogLikelihood, MLEOptions, OptimOutcome, Tolerances};
pub use self::types::{Cost, DEFAULT_LBFGS_MEM, FnEvalMap, Grad, Theta};

pub mod prelude {
    pub use super::api::maximize;
    pub use super::traits::{LineSearcher, LogLikelihood, MLEOptions, OptimOutcome, Tolerances};
    pub use super::types::{Cost, Grad, Theta};
}
