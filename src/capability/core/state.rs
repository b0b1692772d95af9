//! Per-index filter states and the result of one filter pass.
//!
//! A [`FilterState`] is written exactly once, in time order, by a single
//! forward pass. The posterior at index `t` is the starting point of the
//! prediction at `t + 1` and is never revisited.
//!
//! [`FilterResult`] bundles the state sequence with the accumulated
//! log-likelihood, the parameters it was computed under and, for fitted
//! runs, the optimizer diagnostics.
use ndarray::Array1;

use crate::{
    capability::{
        core::{
            forecasts::{ForecastResult, forecast},
            params::ModelParameters,
        },
        errors::{CapResult, CapabilityError},
    },
    optimization::loglik_optimizer::OptimOutcome,
};

/// Filter moments at one observation index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterState {
    /// Observation time.
    pub time: f64,
    /// Prior (one-step-ahead) capability mean.
    pub c_pred: f64,
    /// Prior capability variance.
    pub p_pred: f64,
    /// Posterior capability mean.
    pub c_est: f64,
    /// Posterior capability variance.
    pub p_est: f64,
    /// Predictive measurement variance `S`.
    pub s_pred: f64,
    /// One-step-ahead expected score.
    pub h_pred: f64,
}

/// Output of a filter run or a fit.
///
/// `converged` is `true` for fixed-parameter runs and mirrors the optimizer
/// flag for fitted runs. `status` carries the optimizer's termination text,
/// or `"Fixed parameters"`.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterResult {
    pub states: Vec<FilterState>,
    pub log_likelihood: f64,
    pub converged: bool,
    pub status: String,
    pub params: ModelParameters,
    pub optim: Option<OptimOutcome>,
}

impl FilterResult {
    /// Result of a fixed-parameter run.
    pub fn fixed(states: Vec<FilterState>, log_likelihood: f64, params: ModelParameters) -> Self {
        Self {
            states,
            log_likelihood,
            converged: true,
            status: "Fixed parameters".to_string(),
            params,
            optim: None,
        }
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn final_state(&self) -> Option<&FilterState> {
        self.states.last()
    }

    pub fn times(&self) -> Array1<f64> {
        self.column(|s| s.time)
    }

    pub fn prior_means(&self) -> Array1<f64> {
        self.column(|s| s.c_pred)
    }

    pub fn prior_variances(&self) -> Array1<f64> {
        self.column(|s| s.p_pred)
    }

    pub fn posterior_means(&self) -> Array1<f64> {
        self.column(|s| s.c_est)
    }

    pub fn posterior_variances(&self) -> Array1<f64> {
        self.column(|s| s.p_est)
    }

    pub fn innovation_variances(&self) -> Array1<f64> {
        self.column(|s| s.s_pred)
    }

    pub fn predicted_scores(&self) -> Array1<f64> {
        self.column(|s| s.h_pred)
    }

    /// Open-loop forecast from the final posterior under `self.params`.
    ///
    /// # Errors
    /// - `EmptySeries` if the result holds no states.
    /// - Forecast-time and confidence errors from [`forecast`].
    pub fn forecast(&self, future_times: &[f64], confidence: f64) -> CapResult<ForecastResult> {
        let last = self.final_state().ok_or(CapabilityError::EmptySeries)?;
        forecast(last, &self.params, future_times, confidence)
    }

    fn column<F: Fn(&FilterState) -> f64>(&self, f: F) -> Array1<f64> {
        self.states.iter().map(f).collect()
    }
}
