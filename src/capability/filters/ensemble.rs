//! Stochastic ensemble Kalman filter with perturbed observations.
//!
//! Each run draws from `StdRng::seed_from_u64(seed)`, so the filter is a
//! deterministic function of `(observations, parameters)` and successive
//! optimizer trials see common random numbers.
//!
//! Step at index `t` (moments use the `N − 1` sample denominator):
//! - `t = 0`: `N` standard normals are standardized to sample mean 0 and
//!   variance 1, then mapped to `initial_c + √initial_variance·z`. The
//!   recorded index-0 state is `(initial_c, initial_variance)` exactly.
//! - `t ≥ 1`: `x_i += mu·dt + sigma_omega·√dt·ε_i`.
//! - `h_i = observe(x_i)`, `S = var(h) + sigma_nu²`,
//!   `ℓ += ln N(y_t; mean(h), √S)`.
//! - `t ≥ 1` only: `K = cov(x, h)/S`,
//!   `x_i += K·(y_t + sigma_nu·η_i − h_i)`.
use rand::{Rng, SeedableRng, rngs::StdRng};
use rand_distr::StandardNormal;

use crate::capability::{
    core::{
        data::Observations,
        link::LogisticLink,
        params::ModelParameters,
        state::{FilterResult, FilterState},
        validation::{check_finite, check_positive},
    },
    errors::{CapResult, CapabilityError},
    filters::{CapabilityFilter, log_density},
};

/// Default ensemble size.
pub const DEFAULT_MEMBERS: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnsembleKalmanFilter {
    pub members: usize,
    pub seed: u64,
}

impl EnsembleKalmanFilter {
    /// # Errors
    /// [`CapabilityError::InvalidEnsembleSize`] if `members < 2`.
    pub fn new(members: usize, seed: u64) -> CapResult<Self> {
        let filter = Self { members, seed };
        filter.validate()?;
        Ok(filter)
    }

    fn validate(&self) -> CapResult<()> {
        if self.members < 2 {
            return Err(CapabilityError::InvalidEnsembleSize { members: self.members });
        }
        Ok(())
    }
}

impl Default for EnsembleKalmanFilter {
    fn default() -> Self {
        Self { members: DEFAULT_MEMBERS, seed: 0 }
    }
}

impl CapabilityFilter for EnsembleKalmanFilter {
    fn run_filter(&self, obs: &Observations, params: &ModelParameters) -> CapResult<FilterResult> {
        self.validate()?;
        params.validate()?;
        let mut rng = StdRng::seed_from_u64(self.seed);
        let link = LogisticLink::new(params.g);
        let noise_var = params.sigma_nu * params.sigma_nu;

        let mut ensemble = initial_ensemble(&mut rng, self.members, params)?;
        let mut h = vec![0.0; self.members];
        let mut states: Vec<FilterState> = Vec::with_capacity(obs.len());
        let mut log_likelihood = 0.0;

        for (t, o) in obs.iter().enumerate() {
            if let Some(prev) = states.last() {
                let dt = o.time - prev.time;
                if !dt.is_finite() || dt <= 0.0 {
                    return Err(CapabilityError::NonPositiveStep { dt });
                }
                let drift = params.mu * dt;
                let spread = params.sigma_omega * dt.sqrt();
                for x in ensemble.iter_mut() {
                    let eps: f64 = rng.sample(StandardNormal);
                    *x += drift + spread * eps;
                }
            }
            // The standardized ensemble matches the prior up to rounding; index 0
            // reports the prior itself.
            let (c_pred, p_pred) = if t == 0 {
                (params.initial_c, params.initial_variance)
            } else {
                sample_moments(&ensemble)
            };
            check_finite(t, "c_pred", c_pred)?;
            check_positive(t, "P_pred", p_pred)?;

            for (hi, &xi) in h.iter_mut().zip(ensemble.iter()) {
                *hi = link.observe(xi);
            }
            let (h_bar, h_var) = sample_moments(&h);
            let s = check_positive(t, "S", h_var + noise_var)?;
            log_likelihood += log_density(t, o.score, h_bar, s)?;

            let (c_est, p_est) = if t == 0 {
                (c_pred, p_pred)
            } else {
                let gain = sample_covariance(&ensemble, c_pred, &h, h_bar) / s;
                check_finite(t, "K", gain)?;
                for (x, &hi) in ensemble.iter_mut().zip(h.iter()) {
                    let eta: f64 = rng.sample(StandardNormal);
                    *x += gain * (o.score + params.sigma_nu * eta - hi);
                }
                sample_moments(&ensemble)
            };
            check_finite(t, "c_est", c_est)?;
            check_positive(t, "P_est", p_est)?;

            states.push(FilterState {
                time: o.time,
                c_pred,
                p_pred,
                c_est,
                p_est,
                s_pred: s,
                h_pred: h_bar,
            });
        }

        Ok(FilterResult::fixed(states, log_likelihood, *params))
    }
}

/// Ensemble whose sample mean and variance equal the prior exactly.
fn initial_ensemble(
    rng: &mut StdRng, members: usize, params: &ModelParameters,
) -> CapResult<Vec<f64>> {
    let z: Vec<f64> = (0..members).map(|_| rng.sample::<f64, _>(StandardNormal)).collect();
    let (mean, var) = sample_moments(&z);
    let sd = check_positive(0, "ensemble_spread", var)?.sqrt();
    let scale = params.initial_variance.sqrt();
    Ok(z.iter().map(|&zi| params.initial_c + scale * (zi - mean) / sd).collect())
}

/// Sample mean and `N − 1` variance.
fn sample_moments(xs: &[f64]) -> (f64, f64) {
    let n = xs.len() as f64;
    let mean = xs.iter().sum::<f64>() / n;
    let ss: f64 = xs.iter().map(|x| (x - mean) * (x - mean)).sum();
    (mean, ss / (n - 1.0))
}

fn sample_covariance(xs: &[f64], x_bar: f64, ys: &[f64], y_bar: f64) -> f64 {
    let n = xs.len() as f64;
    let cross: f64 = xs.iter().zip(ys.iter()).map(|(x, y)| (x - x_bar) * (y - y_bar)).sum();
    cross / (n - 1.0)
}
