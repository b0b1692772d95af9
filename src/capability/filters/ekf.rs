//! Extended Kalman filter for the capability model.
//!
//! Recursion
//! ---------
//! Index 0 uses the prior `(initial_c, initial_variance)` directly, scores
//! it, and applies no update. For `t ≥ 1`:
//!
//! 1. `c⁻ = c + mu·dt`, `P⁻ = P + sigma_omega²·dt`
//! 2. `h = observe(c⁻)`, `H = observe_derivative(c⁻)`
//! 3. `S = H²·P⁻ + sigma_nu²`
//! 4. `ℓ += ln N(y_t; h, √S)`
//! 5. `K = P⁻·H / S`
//! 6. `c = c⁻ + K·(y_t − h)`, `P = (1 − K·H)·P⁻`
//!
//! Step 6 evaluates `P` as `P⁻·sigma_nu²/S`, which is the same quantity
//! without the cancellation in `1 − K·H` when `H²·P⁻ ≫ sigma_nu²`.
//!
//! Gradient
//! --------
//! [`ExtendedKalmanFilter::log_likelihood_gradient`] carries the
//! derivatives of `(c, P)` with respect to all six parameters alongside the
//! recursion (forward sensitivities), giving `∂ℓ/∂θ` exactly in one pass.
use ndarray::Array1;

use crate::capability::{
    core::{
        data::Observations,
        link::LogisticLink,
        params::{ModelParameters, N_PARAMS},
        state::{FilterResult, FilterState},
        transition::RandomWalkDrift,
        validation::{check_finite, check_positive},
    },
    errors::CapResult,
    filters::{CapabilityFilter, log_density},
};

// Vector-layout indices.
const MU: usize = 0;
const SIGMA_OMEGA: usize = 1;
const G: usize = 2;
const SIGMA_NU: usize = 3;
const INITIAL_C: usize = 4;
const INITIAL_VARIANCE: usize = 5;

type Sens = [f64; N_PARAMS];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtendedKalmanFilter;

impl ExtendedKalmanFilter {
    /// Analytic `∂ℓ/∂θ` in the [`ModelParameters::to_vec`] layout.
    ///
    /// # Errors
    /// Same failure modes as [`CapabilityFilter::run_filter`].
    pub fn log_likelihood_gradient(
        &self, obs: &Observations, params: &ModelParameters,
    ) -> CapResult<Array1<f64>> {
        params.validate()?;
        let link = LogisticLink::new(params.g);
        let transition = RandomWalkDrift::from(params);
        let noise_var = params.sigma_nu * params.sigma_nu;

        let mut grad: Sens = [0.0; N_PARAMS];
        let mut prev: Option<(f64, f64, f64)> = None;
        let mut dc: Sens = [0.0; N_PARAMS];
        let mut dp: Sens = [0.0; N_PARAMS];

        for (t, o) in obs.iter().enumerate() {
            let (c_pred, p_pred) = match prev {
                None => {
                    dc = unit(INITIAL_C);
                    dp = unit(INITIAL_VARIANCE);
                    (params.initial_c, params.initial_variance)
                }
                Some((t_prev, c, p)) => {
                    let dt = o.time - t_prev;
                    dc[MU] += dt;
                    dp[SIGMA_OMEGA] += 2.0 * params.sigma_omega * dt;
                    transition.predict(c, p, dt)?
                }
            };
            check_finite(t, "c_pred", c_pred)?;
            check_positive(t, "P_pred", p_pred)?;

            let lp = link.partials(c_pred);
            let s = check_positive(t, "S", lp.slope * lp.slope * p_pred + noise_var)?;
            let r = o.score - lp.h;

            let mut dh: Sens = [0.0; N_PARAMS];
            let mut dslope: Sens = [0.0; N_PARAMS];
            let mut ds: Sens = [0.0; N_PARAMS];
            for k in 0..N_PARAMS {
                dh[k] = lp.slope * dc[k];
                dslope[k] = lp.dslope_dc * dc[k];
            }
            dh[G] += lp.dh_dg;
            dslope[G] += lp.dslope_dg;
            for k in 0..N_PARAMS {
                ds[k] = 2.0 * lp.slope * p_pred * dslope[k] + lp.slope * lp.slope * dp[k];
            }
            ds[SIGMA_NU] += 2.0 * params.sigma_nu;

            for k in 0..N_PARAMS {
                grad[k] += -0.5 * ds[k] / s + r * dh[k] / s + 0.5 * r * r * ds[k] / (s * s);
            }

            if t == 0 {
                prev = Some((o.time, c_pred, p_pred));
                continue;
            }

            let gain = p_pred * lp.slope / s;
            let mut dgain: Sens = [0.0; N_PARAMS];
            for k in 0..N_PARAMS {
                dgain[k] = (dp[k] * lp.slope + p_pred * dslope[k]) / s
                    - p_pred * lp.slope * ds[k] / (s * s);
            }
            let c_est = check_finite(t, "c_est", c_pred + gain * r)?;
            let p_est = check_positive(t, "P_est", p_pred * noise_var / s)?;
            for k in 0..N_PARAMS {
                let dc_est = dc[k] + dgain[k] * r - gain * dh[k];
                let dp_est = -(dgain[k] * lp.slope + gain * dslope[k]) * p_pred
                    + (1.0 - gain * lp.slope) * dp[k];
                dc[k] = dc_est;
                dp[k] = dp_est;
            }
            prev = Some((o.time, c_est, p_est));
        }

        let out = Array1::from(grad.to_vec());
        for g in out.iter() {
            check_finite(obs.len() - 1, "gradient", *g)?;
        }
        Ok(out)
    }
}

impl CapabilityFilter for ExtendedKalmanFilter {
    fn run_filter(&self, obs: &Observations, params: &ModelParameters) -> CapResult<FilterResult> {
        params.validate()?;
        let link = LogisticLink::new(params.g);
        let transition = RandomWalkDrift::from(params);
        let noise_var = params.sigma_nu * params.sigma_nu;

        let mut states: Vec<FilterState> = Vec::with_capacity(obs.len());
        let mut log_likelihood = 0.0;

        for (t, o) in obs.iter().enumerate() {
            let (c_pred, p_pred) = match states.last() {
                None => (params.initial_c, params.initial_variance),
                Some(prev) => transition.predict(prev.c_est, prev.p_est, o.time - prev.time)?,
            };
            check_finite(t, "c_pred", c_pred)?;
            check_positive(t, "P_pred", p_pred)?;

            let (h, slope) = link.linearize(c_pred);
            let s = check_positive(t, "S", slope * slope * p_pred + noise_var)?;
            log_likelihood += log_density(t, o.score, h, s)?;

            let (c_est, p_est) = if t == 0 {
                (c_pred, p_pred)
            } else {
                let gain = p_pred * slope / s;
                (c_pred + gain * (o.score - h), p_pred * noise_var / s)
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
                h_pred: h,
            });
        }

        Ok(FilterResult::fixed(states, log_likelihood, *params))
    }

    fn gradient(&self, obs: &Observations, params: &ModelParameters) -> CapResult<Array1<f64>> {
        self.log_likelihood_gradient(obs, params)
    }
}

fn unit(k: usize) -> Sens {
    let mut e = [0.0; N_PARAMS];
    e[k] = 1.0;
    e
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::errors::CapabilityError;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - The index-0 boundary (no update) and single-point log-likelihood.
    // - Variance ordering between prior and posterior.
    // - The flat-score scenario where the posterior mean stays put.
    // - Analytic gradient against central differences.
    // - Instability reporting.
    // -------------------------------------------------------------------------

    fn sample_obs() -> Observations {
        Observations::from_pairs(&[
            (0.0, 0.35),
            (0.5, 0.42),
            (1.7, 0.40),
            (2.0, 0.55),
            (3.5, 0.61),
            (4.0, 0.58),
            (6.0, 0.72),
        ])
        .unwrap()
    }

    #[test]
    // Purpose
    // -------
    // Index 0 is scored but not updated.
    //
    // Given
    // -----
    // - A single observation y = 0.8 under default parameters.
    //
    // Expect
    // ------
    // - Posterior equals `(initial_c, initial_variance)` bit-for-bit.
    // - ℓ = ln N(0.8; h(c0), √(H²P0 + σν²)).
    fn index_zero_posterior_equals_prior() {
        let params = ModelParameters::default();
        let obs = Observations::from_pairs(&[(0.0, 0.8)]).unwrap();
        let res = ExtendedKalmanFilter.run_filter(&obs, &params).unwrap();
        let s0 = res.states[0];
        assert_eq!(s0.c_est, params.initial_c);
        assert_eq!(s0.p_est, params.initial_variance);

        let (h, slope) = LogisticLink::new(params.g).linearize(params.initial_c);
        let s = slope * slope * params.initial_variance + params.sigma_nu * params.sigma_nu;
        let expected = -0.5 * (2.0 * std::f64::consts::PI * s).ln() - 0.5 * (0.8 - h).powi(2) / s;
        assert!((res.log_likelihood - expected).abs() < 1e-12);
    }

    #[test]
    // Purpose
    // -------
    // Prediction inflates and updates shrink the variance.
    //
    // Given
    // -----
    // - Seven irregular observations, sigma_omega = 0.2.
    //
    // Expect
    // ------
    // - `P_pred[t] > P_est[t−1]` and `P_est[t] ≤ P_pred[t]` for t ≥ 1.
    fn variance_ordering_holds() {
        let params = ModelParameters { sigma_omega: 0.2, ..ModelParameters::default() };
        let res = ExtendedKalmanFilter.run_filter(&sample_obs(), &params).unwrap();
        for t in 1..res.len() {
            assert!(res.states[t].p_pred > res.states[t - 1].p_est);
            assert!(res.states[t].p_est <= res.states[t].p_pred);
        }
    }

    #[test]
    // Purpose
    // -------
    // Scores at the link midpoint leave a zero-drift capability at zero.
    //
    // Given
    // -----
    // - times [0, 1, 2, 3], scores 0.5; mu = 0, sigma_omega = 0.01, g = 2,
    //   sigma_nu = 0.1, c0 = 0, P0 = 0.1.
    //
    // Expect
    // ------
    // - Every posterior mean is 0; posterior variance never increases.
    fn flat_midpoint_scores_keep_mean_at_zero() {
        let params = ModelParameters::new(0.0, 0.01, 2.0, 0.1, 0.0, 0.1).unwrap();
        let obs = Observations::from_pairs(&[(0.0, 0.5), (1.0, 0.5), (2.0, 0.5), (3.0, 0.5)])
            .unwrap();
        let res = ExtendedKalmanFilter.run_filter(&obs, &params).unwrap();
        assert!(res.posterior_means().iter().all(|&c| c == 0.0));
        let p = res.posterior_variances();
        assert!(p.to_vec().windows(2).all(|w| w[1] <= w[0]));
    }

    #[test]
    // Purpose
    // -------
    // The sensitivity recursion matches central differences of ℓ.
    //
    // Given
    // -----
    // - Seven irregular observations, an interior parameter point.
    //
    // Expect
    // ------
    // - Each component within 1e-4·max(1, |fd|) of the FD estimate.
    fn analytic_gradient_matches_finite_differences() {
        let obs = sample_obs();
        let params = ModelParameters::new(0.15, 0.12, 1.6, 0.08, -0.2, 0.3).unwrap();
        let grad = ExtendedKalmanFilter.log_likelihood_gradient(&obs, &params).unwrap();

        let base = params.to_vec();
        let eps = 1e-6;
        for k in 0..N_PARAMS {
            let mut up = base.clone();
            let mut dn = base.clone();
            up[k] += eps;
            dn[k] -= eps;
            let ll_up = ExtendedKalmanFilter
                .run_filter(&obs, &ModelParameters::from_vec(&up).unwrap())
                .unwrap()
                .log_likelihood;
            let ll_dn = ExtendedKalmanFilter
                .run_filter(&obs, &ModelParameters::from_vec(&dn).unwrap())
                .unwrap()
                .log_likelihood;
            let fd = (ll_up - ll_dn) / (2.0 * eps);
            assert!(
                (grad[k] - fd).abs() < 1e-4 * fd.abs().max(1.0),
                "component {k}: analytic {} vs fd {fd}",
                grad[k]
            );
        }
    }

    #[test]
    // Purpose
    // -------
    // Overflowing moments are reported at the index where they appear.
    //
    // Given
    // -----
    // - mu = 1e308 and a step of dt = 2 at index 1.
    //
    // Expect
    // ------
    // - `NumericalInstability { index: 1, quantity: "c_pred" }`.
    fn overflow_reports_index_and_quantity() {
        let params = ModelParameters { mu: 1e308, ..ModelParameters::default() };
        let obs = Observations::from_pairs(&[(0.0, 0.5), (2.0, 0.5)]).unwrap();
        let err = ExtendedKalmanFilter.run_filter(&obs, &params).unwrap_err();
        assert!(matches!(
            err,
            CapabilityError::NumericalInstability { index: 1, quantity: "c_pred", .. }
        ));
    }

    #[test]
    // Purpose
    // -------
    // A precise observation relative to the prior spread keeps a strictly
    // positive posterior variance.
    //
    // Given
    // -----
    // - g = 10, sigma_nu = 1e-9, P0 = 1, so `H²·P⁻` exceeds `sigma_nu²` by
    //   about 19 orders of magnitude and `K·H` rounds to 1.
    //
    // Expect
    // ------
    // - The run succeeds; every `P_est` is positive, at most `P_pred`, and
    //   equal to `P_pred·sigma_nu²/S` to 1e-12 relative.
    fn sharp_observations_keep_positive_posterior_variance() {
        let params = ModelParameters::new(0.0, 0.05, 10.0, 1e-9, 0.0, 1.0).unwrap();
        let obs = Observations::from_pairs(&[(0.0, 0.5), (1.0, 0.6), (2.0, 0.55)]).unwrap();
        let res = ExtendedKalmanFilter.run_filter(&obs, &params).unwrap();
        let noise_var = params.sigma_nu * params.sigma_nu;
        for st in &res.states[1..] {
            assert!(st.p_est > 0.0 && st.p_est <= st.p_pred);
            let expected = st.p_pred * noise_var / st.s_pred;
            assert!(((st.p_est - expected) / expected).abs() < 1e-12);
        }
        assert!(ExtendedKalmanFilter.log_likelihood_gradient(&obs, &params).is_ok());
    }
}
