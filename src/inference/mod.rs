//! inference — post-estimation uncertainty for fitted hyperparameters.
//!
//! Classical (observed-information) standard errors and covariance, computed
//! in whatever coordinates the caller differentiates in. The capability
//! estimator uses the bounded model-parameter space, so the numbers read
//! directly as uncertainty on `(mu, sigma_omega, g, sigma_nu, c0, P0)`.

pub mod hessian;

pub use self::hessian::{calc_covariance, calc_standard_errors};
