//! Open-loop capability forecasts with score-space confidence bands.
//!
//! Purpose
//! -------
//! Extrapolate the final posterior `(c_est, P_est)` to future times using
//! only the random-walk transition, then map each forecast into score
//! space.
//!
//! Key behaviors
//! -------------
//! - No measurement updates: each horizon is one more transition step from
//!   the previous horizon, so variance is non-decreasing in horizon and
//!   constant when `sigma_omega = 0`.
//! - `score = observe(mean)` and
//!   `half_width = z·√(observe_derivative(mean)²·variance + sigma_nu²)`.
//! - `lower`/`upper` are `score ∓ half_width` clipped to [0, 1].
//! - `z` is the two-sided standard normal quantile for `confidence`.
//!
//! Invariants & assumptions
//! ------------------------
//! - Forecast times are finite, strictly increasing and strictly after the
//!   final state's time; otherwise `InvalidForecastTime`.
//! - `confidence ∈ (0, 1)`; otherwise `InvalidConfidence`.
use statrs::distribution::{ContinuousCDF, Normal};

use crate::capability::{
    core::{
        link::LogisticLink,
        params::ModelParameters,
        state::FilterState,
        transition::RandomWalkDrift,
        validation::{validate_confidence, validate_forecast_times},
    },
    errors::{CapResult, CapabilityError},
};

/// Forecast at one future time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForecastPoint {
    pub time: f64,
    /// Capability mean.
    pub mean: f64,
    /// Capability variance.
    pub variance: f64,
    /// Expected score `observe(mean)`.
    pub score: f64,
    pub half_width: f64,
    pub lower: f64,
    pub upper: f64,
}

/// Forecasts at the requested times, with the band parameters used.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastResult {
    pub points: Vec<ForecastPoint>,
    pub confidence: f64,
    pub z: f64,
}

impl ForecastResult {
    pub fn means(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.mean).collect()
    }

    pub fn variances(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.variance).collect()
    }

    pub fn scores(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.score).collect()
    }
}

/// Two-sided standard normal quantile, `Φ⁻¹(1 − (1 − confidence)/2)`.
pub fn two_sided_z(confidence: f64) -> CapResult<f64> {
    validate_confidence(confidence)?;
    let std_normal =
        Normal::new(0.0, 1.0).map_err(|_| CapabilityError::InvalidConfidence { value: confidence })?;
    Ok(std_normal.inverse_cdf(1.0 - (1.0 - confidence) / 2.0))
}

/// Forecast from `final_state` under `params` at each of `future_times`.
///
/// # Errors
/// `InvalidConfidence`, `InvalidForecastTime`, or a parameter error if
/// `params` fails validation.
pub fn forecast(
    final_state: &FilterState, params: &ModelParameters, future_times: &[f64], confidence: f64,
) -> CapResult<ForecastResult> {
    params.validate()?;
    let z = two_sided_z(confidence)?;
    validate_forecast_times(final_state.time, future_times)?;

    let transition = RandomWalkDrift::from(params);
    let link = LogisticLink::new(params.g);
    let noise_var = params.sigma_nu * params.sigma_nu;

    let mut points = Vec::with_capacity(future_times.len());
    let (mut t_prev, mut mean, mut variance) =
        (final_state.time, final_state.c_est, final_state.p_est);
    for &time in future_times {
        (mean, variance) = transition.predict(mean, variance, time - t_prev)?;
        t_prev = time;

        let (score, slope) = link.linearize(mean);
        let half_width = z * (slope * slope * variance + noise_var).sqrt();
        points.push(ForecastPoint {
            time,
            mean,
            variance,
            score,
            half_width,
            lower: (score - half_width).clamp(0.0, 1.0),
            upper: (score + half_width).clamp(0.0, 1.0),
        });
    }
    Ok(ForecastResult { points, confidence, z })
}
