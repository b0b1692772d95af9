//! capability — latent capability filtering, estimation and forecasting.
//!
//! Purpose
//! -------
//! Track an unobserved capability `c(t)` that follows a random walk with
//! drift, observed at irregular times through noisy scores
//! `y = 1/(1 + e^{-g·c}) + noise` in [0, 1]. This module is the main entry
//! point of the crate and the surface the Python bindings wrap.
//!
//! Key behaviors
//! -------------
//! - [`core`]: validated observations, link, transition, parameters,
//!   options, filter states and forecasts.
//! - [`filters`]: the extended Kalman filter (with analytic gradient) and a
//!   seeded ensemble Kalman filter behind one [`CapabilityFilter`] contract.
//! - [`models`]: fixed and maximum-likelihood fits, standard errors, and the
//!   fit-then-forecast [`CapabilityModel::analyze`] wrapper.
//! - [`errors`]: [`CapabilityError`] with its [`ErrorKind`] taxonomy.
//!
//! Invariants & assumptions
//! ------------------------
//! - Inputs and configuration are validated before any recursion runs.
//! - Every filter run is a pure function of `(observations, parameters)`;
//!   nothing is cached between runs.
//! - Non-convergence of the optimizer is reported through
//!   `FilterResult::converged`, never as an error.
//!
//! Downstream usage
//! ----------------
//! 1. Build [`Observations`] from `(time, score)` pairs.
//! 2. Pick a filter ([`FilterKind`]) and [`FitOptions`]; build a
//!    [`CapabilityModel`].
//! 3. Call `fit(.., FitStrategy::MaximumLikelihood)` or `analyze(..)`.
//! 4. Read states through the `FilterResult` column accessors and forecast
//!    with `FilterResult::forecast`.

pub mod core;
pub mod errors;
pub mod filters;
pub mod models;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::core::{
    FilterResult, FilterState, FitOptions, FitStrategy, ForecastPoint, ForecastResult,
    LogisticLink, ModelParameters, Observation, Observations, ParamBounds, RandomWalkDrift,
};
pub use self::errors::{CapResult, CapabilityError, ErrorKind};
pub use self::filters::{CapabilityFilter, EnsembleKalmanFilter, ExtendedKalmanFilter, FilterKind};
pub use self::models::{CapabilityModel, CapabilityReport, fit};

// ---- Optional convenience prelude for downstream crates -------------------
//
// Downstream crates can write
//
//     use latent_capability::capability::prelude::*;
//
// to import the main capability surface in a single line.

pub mod prelude {
    pub use super::{
        CapResult, CapabilityError, CapabilityFilter, CapabilityModel, CapabilityReport,
        EnsembleKalmanFilter, ErrorKind, ExtendedKalmanFilter, FilterKind, FilterResult,
        FilterState, FitOptions, FitStrategy, ForecastResult, ModelParameters, Observations,
        ParamBounds,
    };
}
