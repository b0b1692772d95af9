//! models — fitting entry points for the latent capability model.
//!
//! [`CapabilityModel`] binds a [`crate::capability::filters::CapabilityFilter`]
//! to [`crate::capability::core::FitOptions`] and provides `fit`,
//! `fit_fixed`, `fit_optimized`, `standard_errors`, `covariance` and
//! `analyze`. The free function [`fit`] runs the default model (EKF, default
//! options).

pub mod estimator;

pub use self::estimator::{CapabilityModel, CapabilityReport, MIN_OBS_FOR_FIT, fit};
