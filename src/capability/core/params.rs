//! Model hyperparameters and their fixed vector layout.
//!
//! ## What this module defines
//! - [`ModelParameters`]: the six hyperparameters of the capability model,
//!   `(mu, sigma_omega, g, sigma_nu, initial_c, initial_variance)`.
//! - A fixed optimizer-space layout used by the estimator, the analytic
//!   EKF gradient and the standard-error routine:
//!
//!   | index | field              |
//!   |-------|--------------------|
//!   | 0     | `mu`               |
//!   | 1     | `sigma_omega`      |
//!   | 2     | `g`                |
//!   | 3     | `sigma_nu`         |
//!   | 4     | `initial_c`        |
//!   | 5     | `initial_variance` |
//!
//! ## Invariants validated by constructors
//! - every field finite
//! - `g > 0`, `sigma_nu > 0`, `initial_variance > 0`
//! - `sigma_omega ≥ 0` (zero is a degenerate, deterministic-drift walk)
//!
//! Fields are public for read access and struct-literal construction in
//! tests; every filter re-runs [`ModelParameters::validate`] before its
//! recursion, so a hand-built invalid value is still rejected.
use ndarray::Array1;

use crate::capability::{
    core::validation::{validate_finite, validate_non_negative, validate_positive},
    errors::{CapResult, CapabilityError},
};

/// Number of model hyperparameters.
pub const N_PARAMS: usize = 6;

/// Parameter names in vector order.
pub const PARAM_NAMES: [&str; N_PARAMS] =
    ["mu", "sigma_omega", "g", "sigma_nu", "initial_c", "initial_variance"];

/// Hyperparameters of the latent capability model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelParameters {
    /// Drift per unit time.
    pub mu: f64,
    /// Process-noise standard deviation per √unit-time.
    pub sigma_omega: f64,
    /// Logistic steepness.
    pub g: f64,
    /// Measurement-noise standard deviation.
    pub sigma_nu: f64,
    /// Prior mean of the capability at the first observation.
    pub initial_c: f64,
    /// Prior variance of the capability at the first observation.
    pub initial_variance: f64,
}

impl ModelParameters {
    /// Build and validate a parameter set.
    ///
    /// # Errors
    /// [`CapabilityError::InvalidParameter`] naming the first offending field.
    pub fn new(
        mu: f64, sigma_omega: f64, g: f64, sigma_nu: f64, initial_c: f64, initial_variance: f64,
    ) -> CapResult<Self> {
        let params = Self { mu, sigma_omega, g, sigma_nu, initial_c, initial_variance };
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> CapResult<()> {
        validate_finite("mu", self.mu)?;
        validate_non_negative("sigma_omega", self.sigma_omega)?;
        validate_positive("g", self.g)?;
        validate_positive("sigma_nu", self.sigma_nu)?;
        validate_finite("initial_c", self.initial_c)?;
        validate_positive("initial_variance", self.initial_variance)?;
        Ok(())
    }

    /// Parameters in the fixed vector layout.
    pub fn to_vec(&self) -> Array1<f64> {
        Array1::from(vec![
            self.mu,
            self.sigma_omega,
            self.g,
            self.sigma_nu,
            self.initial_c,
            self.initial_variance,
        ])
    }

    /// Inverse of [`ModelParameters::to_vec`], with validation.
    ///
    /// # Errors
    /// - `InvalidParameter { name: "theta", .. }` if the length is not 6.
    /// - Any field error from [`ModelParameters::new`].
    pub fn from_vec(theta: &Array1<f64>) -> CapResult<Self> {
        if theta.len() != N_PARAMS {
            return Err(CapabilityError::InvalidParameter {
                name: "theta",
                value: theta.len() as f64,
                reason: "Parameter vector must have exactly 6 entries.",
            });
        }
        Self::new(theta[0], theta[1], theta[2], theta[3], theta[4], theta[5])
    }
}

impl Default for ModelParameters {
    /// `(mu, sigma_omega, g, sigma_nu, initial_c, initial_variance)
    /// = (0.1, 0.05, 2.0, 0.05, 0.0, 0.1)`.
    fn default() -> Self {
        Self {
            mu: 0.1,
            sigma_omega: 0.05,
            g: 2.0,
            sigma_nu: 0.05,
            initial_c: 0.0,
            initial_variance: 0.1,
        }
    }
}
