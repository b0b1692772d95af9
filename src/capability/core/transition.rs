//! Random walk with drift, discretized exactly over an arbitrary `dt > 0`.
//!
//! `c(t + dt) = c(t) + mu·dt + sigma_omega·W(dt)`, so the Gaussian moments
//! propagate as
//! - `mean' = mean + mu·dt`
//! - `variance' = variance + sigma_omega²·dt`
use crate::capability::{
    core::params::ModelParameters,
    errors::{CapResult, CapabilityError},
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RandomWalkDrift {
    pub mu: f64,
    pub sigma_omega: f64,
}

impl RandomWalkDrift {
    pub fn new(mu: f64, sigma_omega: f64) -> Self {
        Self { mu, sigma_omega }
    }

    /// Propagate `(mean, variance)` forward by `dt`.
    ///
    /// # Errors
    /// [`CapabilityError::NonPositiveStep`] if `dt` is not finite and > 0.
    pub fn predict(&self, mean: f64, variance: f64, dt: f64) -> CapResult<(f64, f64)> {
        if !dt.is_finite() || dt <= 0.0 {
            return Err(CapabilityError::NonPositiveStep { dt });
        }
        Ok((mean + self.mu * dt, variance + self.sigma_omega * self.sigma_omega * dt))
    }
}

impl From<&ModelParameters> for RandomWalkDrift {
    fn from(params: &ModelParameters) -> Self {
        Self::new(params.mu, params.sigma_omega)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Moment propagation over one and two steps.
    // - Rejection of zero, negative and non-finite steps.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Two steps of dt₁, dt₂ equal one step of dt₁ + dt₂.
    //
    // Given
    // -----
    // - mu = 0.3, sigma_omega = 0.2, start (1, 0.05), dt₁ = 0.5, dt₂ = 1.5.
    //
    // Expect
    // ------
    // - Same mean and variance to 1e-12; variance grew by 0.04·2.
    fn predict_composes_over_irregular_steps() {
        let rw = RandomWalkDrift::new(0.3, 0.2);
        let (m1, v1) = rw.predict(1.0, 0.05, 0.5).unwrap();
        let (m2, v2) = rw.predict(m1, v1, 1.5).unwrap();
        let (m, v) = rw.predict(1.0, 0.05, 2.0).unwrap();

        assert!((m2 - m).abs() < 1e-12);
        assert!((v2 - v).abs() < 1e-12);
        assert!((v - 0.05 - 0.08).abs() < 1e-12);
    }

    #[test]
    // Purpose
    // -------
    // A step must move forward in time.
    //
    // Given
    // -----
    // - dt ∈ {0, −1, NaN}.
    //
    // Expect
    // ------
    // - `NonPositiveStep` for each.
    fn predict_rejects_non_positive_steps() {
        let rw = RandomWalkDrift::new(0.0, 0.1);
        for dt in [0.0, -1.0, f64::NAN] {
            assert!(matches!(rw.predict(0.0, 1.0, dt), Err(CapabilityError::NonPositiveStep { .. })));
        }
    }
}
