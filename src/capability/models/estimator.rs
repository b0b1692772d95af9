//! Capability estimator: fixed-parameter runs, maximum likelihood, standard
//! errors and forecasts.
//!
//! [`CapabilityModel`] pairs a filter with [`FitOptions`] and exposes the
//! two fit operations:
//!
//! - [`CapabilityModel::fit_fixed`]: one filter run under the supplied
//!   parameters, reported as converged.
//! - [`CapabilityModel::fit_optimized`]: minimize `−ℓ` over the parameter
//!   box with a [`BoxMinimizer`] ([`LogitLbfgs`]), optionally from several
//!   starting points in parallel, then re-run the filter at the winner so
//!   the returned states and log-likelihood belong to the returned
//!   parameters.
//!
//! ## Multi-start policy
//! - Start 0 is the caller's guess clamped into the box; starts `1..=r` are
//!   drawn uniformly inside the box from `StdRng::seed_from_u64(seed)`.
//! - Starts run on the rayon pool; each is an independent, pure trial.
//! - The lowest cost (highest ℓ) wins; ties keep the earliest start.
//! - Backend failures (line-search violations, instability at a trial
//!   point) are recorded and skipped. Configuration errors propagate.
//! - If every start fails, the filter is run at start 0 and returned with
//!   `converged = false` and the first failure in `status`.
use ndarray::{Array1, Array2};
use rand::{Rng, SeedableRng, rngs::StdRng};
use rand_distr::Uniform;
use rayon::prelude::*;

use crate::{
    capability::{
        core::{
            data::Observations,
            forecasts::ForecastResult,
            options::{FitOptions, FitStrategy},
            params::ModelParameters,
            state::FilterResult,
            validation::{validate_confidence, validate_forecast_times},
        },
        errors::{CapResult, CapabilityError},
        filters::{CapabilityFilter, FilterKind},
    },
    inference::{calc_covariance, calc_standard_errors},
    optimization::{
        box_constrained::{BoxBounds, BoxMinimizer, BoxObjective, BoxOutcome, LogitLbfgs},
        errors::{OptError, OptResult},
        loglik_optimizer::{Grad, Theta, finite_diff::fd_gradient},
    },
};

/// Minimum series length for maximum-likelihood fitting.
pub const MIN_OBS_FOR_FIT: usize = 2;

/// Fit plus optional forecast, as returned by [`CapabilityModel::analyze`].
#[derive(Debug, Clone, PartialEq)]
pub struct CapabilityReport {
    pub result: FilterResult,
    pub forecast: Option<ForecastResult>,
}

/// Filter + estimation options.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CapabilityModel<F: CapabilityFilter = FilterKind> {
    pub filter: F,
    pub options: FitOptions,
}

impl<F: CapabilityFilter> CapabilityModel<F> {
    pub fn new(filter: F, options: FitOptions) -> Self {
        Self { filter, options }
    }

    /// Dispatch on `strategy`.
    pub fn fit(
        &self, obs: &Observations, initial: &ModelParameters, strategy: FitStrategy,
    ) -> CapResult<FilterResult> {
        match strategy {
            FitStrategy::Fixed => self.fit_fixed(obs, initial),
            FitStrategy::MaximumLikelihood => self.fit_optimized(obs, initial),
        }
    }

    /// One filter run under `params`.
    pub fn fit_fixed(&self, obs: &Observations, params: &ModelParameters) -> CapResult<FilterResult> {
        self.filter.run_filter(obs, params)
    }

    /// Maximum-likelihood fit over `self.options.bounds`.
    ///
    /// # Errors
    /// - `InsufficientObservations` for fewer than two observations.
    /// - Parameter or option errors before any filter run.
    /// - `OptimizationFailed` if even the fallback run at start 0 fails.
    pub fn fit_optimized(
        &self, obs: &Observations, initial: &ModelParameters,
    ) -> CapResult<FilterResult> {
        obs.require_at_least(MIN_OBS_FOR_FIT)?;
        initial.validate()?;
        let bounds = self.options.bounds.to_box()?;
        let starts = self.start_points(initial, &bounds);
        let minimizer = LogitLbfgs::new(self.options.mle_opts.clone());
        let objective = FilterObjective { filter: &self.filter, obs };

        let outcomes = run_starts(&minimizer, &objective, &starts, &bounds);
        let selection = select_best(outcomes)?;
        self.resolve(obs, &starts, selection)
    }

    /// Turn a [`Selection`] into the returned result: re-run at the winner,
    /// or fall back to start 0 with `converged = false` when nothing won.
    fn resolve(
        &self, obs: &Observations, starts: &[Theta], selection: Selection,
    ) -> CapResult<FilterResult> {
        match selection.best {
            Some((_, outcome)) => {
                let params = ModelParameters::from_vec(&outcome.x_hat)?;
                let mut result = self.filter.run_filter(obs, &params)?;
                result.converged = outcome.converged();
                result.status = outcome.optim.status.clone();
                result.optim = Some(outcome.optim);
                Ok(result)
            }
            None => {
                let status = match selection.failures.first() {
                    Some((start, err)) => format!(
                        "All {} starts failed; start {start}: {err}",
                        selection.failures.len()
                    ),
                    None => "No starting points were evaluated".to_string(),
                };
                let first = starts.first().ok_or_else(|| CapabilityError::OptimizationFailed {
                    status: status.clone(),
                })?;
                let fallback = ModelParameters::from_vec(first)?;
                let mut result = self.filter.run_filter(obs, &fallback).map_err(|e| {
                    CapabilityError::OptimizationFailed { status: format!("{status}; fallback: {e}") }
                })?;
                result.converged = false;
                result.status = status;
                Ok(result)
            }
        }
    }

    /// Classical standard errors of `params` from the observed information,
    /// in the [`ModelParameters::to_vec`] layout.
    ///
    /// The observed information assumes an interior optimum. For a
    /// coordinate sitting on a face of the fitting box (common for
    /// `initial_c` and `initial_variance` on short series) the reported
    /// standard error is not meaningful.
    pub fn standard_errors(
        &self, obs: &Observations, params: &ModelParameters,
    ) -> CapResult<Array1<f64>> {
        params.validate()?;
        let objective = FilterObjective { filter: &self.filter, obs };
        Ok(calc_standard_errors(|theta: &Theta| objective.grad_or_fd(theta), &params.to_vec())?)
    }

    /// Pseudo-inverse of the observed information at `params`.
    pub fn covariance(&self, obs: &Observations, params: &ModelParameters) -> CapResult<Array2<f64>> {
        params.validate()?;
        let objective = FilterObjective { filter: &self.filter, obs };
        Ok(calc_covariance(|theta: &Theta| objective.grad_or_fd(theta), &params.to_vec())?)
    }

    /// Fit, then forecast from the fitted state when `future_times` is
    /// non-empty. Forecast inputs are validated before fitting.
    pub fn analyze(
        &self, obs: &Observations, params: &ModelParameters, strategy: FitStrategy,
        future_times: &[f64], confidence: f64,
    ) -> CapResult<CapabilityReport> {
        if !future_times.is_empty() {
            validate_confidence(confidence)?;
            validate_forecast_times(obs.last_time(), future_times)?;
        }
        let result = self.fit(obs, params, strategy)?;
        let forecast = if future_times.is_empty() {
            None
        } else {
            Some(result.forecast(future_times, confidence)?)
        };
        Ok(CapabilityReport { result, forecast })
    }

    /// Start 0 is `initial` clamped into the box; the rest are uniform draws.
    pub fn start_points(&self, initial: &ModelParameters, bounds: &BoxBounds) -> Vec<Theta> {
        let mut starts = Vec::with_capacity(1 + self.options.restarts);
        starts.push(bounds.clamp_interior(&initial.to_vec()));
        let mut rng = StdRng::seed_from_u64(self.options.seed);
        for _ in 0..self.options.restarts {
            let draw: Theta = bounds
                .lower()
                .iter()
                .zip(bounds.upper().iter())
                .map(|(&lo, &hi)| rng.sample(Uniform::new(lo, hi)))
                .collect();
            starts.push(draw);
        }
        starts
    }
}

/// Convenience wrapper over `CapabilityModel::default().fit(..)`.
pub fn fit(
    obs: &Observations, initial: &ModelParameters, strategy: FitStrategy,
) -> CapResult<FilterResult> {
    CapabilityModel::<FilterKind>::default().fit(obs, initial, strategy)
}

/// `−ℓ` of a filter run, as a box objective over the parameter vector.
struct FilterObjective<'a, F: CapabilityFilter> {
    filter: &'a F,
    obs: &'a Observations,
}

impl<'a, F: CapabilityFilter> FilterObjective<'a, F> {
    /// Analytic gradient of `−ℓ` when the filter has one, otherwise finite
    /// differences of `cost`.
    fn grad_or_fd(&self, theta: &Theta) -> OptResult<Grad> {
        match self.gradient(theta) {
            Err(OptError::GradientNotImplemented) => {
                fd_gradient(theta, |x| self.cost(x).map_err(argmin::core::Error::from))
            }
            other => other,
        }
    }
}

impl<'a, F: CapabilityFilter> BoxObjective for FilterObjective<'a, F> {
    fn cost(&self, x: &Theta) -> OptResult<f64> {
        let params = ModelParameters::from_vec(x)?;
        Ok(-self.filter.run_filter(self.obs, &params)?.log_likelihood)
    }

    fn gradient(&self, x: &Theta) -> OptResult<Grad> {
        let params = ModelParameters::from_vec(x)?;
        Ok(-self.filter.gradient(self.obs, &params)?)
    }
}

fn run_starts<M: BoxMinimizer, O: BoxObjective>(
    minimizer: &M, objective: &O, starts: &[Theta], bounds: &BoxBounds,
) -> Vec<OptResult<BoxOutcome>> {
    starts.par_iter().map(|x0| minimizer.minimize(objective, x0, bounds)).collect()
}

/// Winner and recorded failures across all starts.
struct Selection {
    best: Option<(usize, BoxOutcome)>,
    failures: Vec<(usize, OptError)>,
}

/// Lowest finite cost wins; ties keep the earliest start.
fn select_best(outcomes: Vec<OptResult<BoxOutcome>>) -> CapResult<Selection> {
    let mut best: Option<(usize, BoxOutcome)> = None;
    let mut failures = Vec::new();
    for (start, outcome) in outcomes.into_iter().enumerate() {
        match outcome {
            Ok(out) if out.cost.is_finite() => {
                let better = best.as_ref().map_or(true, |(_, b)| out.cost < b.cost);
                if better {
                    best = Some((start, out));
                }
            }
            Ok(out) => failures.push((start, OptError::NonFiniteCost { value: out.cost })),
            Err(err) if err.is_backend_failure() => failures.push((start, err)),
            Err(err) => return Err(err.into()),
        }
    }
    Ok(Selection { best, failures })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        capability::{
            core::options::ParamBounds,
            filters::{EnsembleKalmanFilter, ExtendedKalmanFilter},
        },
        optimization::loglik_optimizer::{MLEOptions, OptimOutcome, Tolerances},
    };
    use argmin::core::{TerminationReason, TerminationStatus};
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Fixed runs and strategy dispatch.
    // - Maximum likelihood: bounds, determinism of the re-run, restarts.
    // - Start-point generation and winner selection.
    // - Standard errors and the analyze wrapper.
    // -------------------------------------------------------------------------

    fn rising_obs() -> Observations {
        Observations::from_pairs(&[
            (0.0, 0.30),
            (1.0, 0.36),
            (2.0, 0.41),
            (3.5, 0.50),
            (4.0, 0.49),
            (5.0, 0.58),
            (6.5, 0.63),
            (7.0, 0.70),
            (8.0, 0.71),
            (9.5, 0.80),
        ])
        .unwrap()
    }

    fn ekf_model(restarts: usize) -> CapabilityModel<ExtendedKalmanFilter> {
        let mle = MLEOptions::new(
            Tolerances::new(Some(1e-6), Some(1e-10), Some(200)).unwrap(),
            Default::default(),
            None,
        )
        .unwrap();
        let options = FitOptions::new(mle, ParamBounds::default(), restarts, 17).unwrap();
        CapabilityModel::new(ExtendedKalmanFilter, options)
    }

    fn capped_model(max_iter: usize) -> CapabilityModel<ExtendedKalmanFilter> {
        let mle = MLEOptions::new(
            Tolerances::new(Some(1e-6), Some(1e-10), Some(max_iter)).unwrap(),
            Default::default(),
            None,
        )
        .unwrap();
        let options = FitOptions::new(mle, ParamBounds::default(), 0, 0).unwrap();
        CapabilityModel::new(ExtendedKalmanFilter, options)
    }

    fn outcome(cost: f64) -> BoxOutcome {
        let optim = OptimOutcome::new(
            Some(array![0.0]),
            -cost,
            TerminationStatus::Terminated(TerminationReason::SolverConverged),
            3,
            Default::default(),
            None,
        )
        .unwrap();
        BoxOutcome { x_hat: array![cost], cost, optim }
    }

    #[test]
    // Purpose
    // -------
    // Fixed runs are a single filter pass reported as converged.
    //
    // Given
    // -----
    // - Default parameters, `FitStrategy::Fixed`.
    //
    // Expect
    // ------
    // - Same states as a direct EKF run; converged; no optimizer output.
    fn fixed_strategy_matches_direct_filter_run() {
        let obs = rising_obs();
        let params = ModelParameters::default();
        let direct = ExtendedKalmanFilter.run_filter(&obs, &params).unwrap();
        let fitted = ekf_model(0).fit(&obs, &params, FitStrategy::Fixed).unwrap();
        assert_eq!(fitted, direct);
        assert!(fitted.converged && fitted.optim.is_none());
    }

    #[test]
    // Purpose
    // -------
    // The optimized fit stays in the box, improves on the start, and a fixed
    // re-run at the fitted parameters reproduces the log-likelihood exactly.
    //
    // Given
    // -----
    // - Ten rising scores, default start, no restarts.
    //
    // Expect
    // ------
    // - Fitted parameters inside the default box.
    // - ℓ(fit) ≥ ℓ(start).
    // - `fit_fixed(fitted).log_likelihood == fit.log_likelihood`.
    fn optimized_fit_is_bounded_and_reproducible() {
        let obs = rising_obs();
        let model = ekf_model(0);
        let start = ModelParameters::default();
        let fitted = model.fit_optimized(&obs, &start).unwrap();
        let baseline = model.fit_fixed(&obs, &start).unwrap();

        assert!(ParamBounds::default().contains(&fitted.params));
        assert!(fitted.log_likelihood >= baseline.log_likelihood);
        assert!(fitted.optim.is_some());
        let rerun = model.fit_fixed(&obs, &fitted.params).unwrap();
        assert_eq!(rerun.log_likelihood, fitted.log_likelihood);
    }

    #[test]
    // Purpose
    // -------
    // A guess outside the box is clamped rather than rejected.
    //
    // Given
    // -----
    // - g = 50 (above the upper bound 10), sigma_nu = 5 (above 1).
    //
    // Expect
    // ------
    // - Start 0 lies strictly inside the box; the fit succeeds.
    fn out_of_box_guess_is_clamped() {
        let obs = rising_obs();
        let model = ekf_model(0);
        let guess = ModelParameters { g: 50.0, sigma_nu: 5.0, ..ModelParameters::default() };
        let bounds = model.options.bounds.to_box().unwrap();
        let starts = model.start_points(&guess, &bounds);
        assert!(starts[0][2] < 10.0 && starts[0][3] < 1.0);
        assert!(bounds.contains(&starts[0]));
        assert!(model.fit_optimized(&obs, &guess).is_ok());
    }

    #[test]
    // Purpose
    // -------
    // Restart points are seeded, inside the box, and the multi-start fit is
    // at least as good as every single-start fit from those points.
    //
    // Given
    // -----
    // - restarts = 3, seed 17.
    //
    // Expect
    // ------
    // - Four start points, identical across calls, all inside the box.
    // - ℓ(multi) ≥ ℓ(single from each start) − 1e-9.
    fn restarts_pick_best_log_likelihood() {
        let obs = rising_obs();
        let model = ekf_model(3);
        let bounds = model.options.bounds.to_box().unwrap();
        let start = ModelParameters::default();
        let starts = model.start_points(&start, &bounds);
        assert_eq!(starts.len(), 4);
        assert_eq!(starts, model.start_points(&start, &bounds));
        assert!(starts.iter().all(|s| bounds.contains(s)));

        let multi = model.fit_optimized(&obs, &start).unwrap();
        let single = ekf_model(0);
        for s in &starts {
            let p = ModelParameters::from_vec(s).unwrap();
            let one = single.fit_optimized(&obs, &p).unwrap();
            assert!(multi.log_likelihood >= one.log_likelihood - 1e-9);
        }
    }

    #[test]
    // Purpose
    // -------
    // Winner selection keeps the earliest of equal costs and records
    // backend failures without aborting.
    //
    // Given
    // -----
    // - Outcomes: failure, cost 2, cost 1, cost 1.
    //
    // Expect
    // ------
    // - Winner is start 2; one failure recorded at start 0.
    fn select_best_prefers_earliest_minimum() {
        let outcomes = vec![
            Err(OptError::ConditionViolated { text: "wolfe".into() }),
            Ok(outcome(2.0)),
            Ok(outcome(1.0)),
            Ok(outcome(1.0)),
        ];
        let sel = select_best(outcomes).unwrap();
        assert_eq!(sel.best.map(|(i, _)| i), Some(2));
        assert_eq!(sel.failures.len(), 1);
        assert_eq!(sel.failures[0].0, 0);

        let config_err = vec![Err(OptError::NoTolerancesProvided)];
        assert!(select_best(config_err).is_err());
    }


    #[test]
    // Purpose
    // -------
    // Hitting the iteration cap is not an error: the best point found is
    // returned with `converged = false`.
    //
    // Given
    // -----
    // - Ten rising scores, default start, `max_iter = 1`.
    //
    // Expect
    // ------
    // - `converged == false`; status names the iteration cap.
    // - Optimizer diagnostics are attached and agree on non-convergence.
    // - A fixed re-run at the returned parameters reproduces ℓ exactly.
    fn iteration_cap_returns_unconverged_best_point() {
        let obs = rising_obs();
        let model = capped_model(1);
        let fitted = model.fit_optimized(&obs, &ModelParameters::default()).unwrap();

        assert!(!fitted.converged);
        assert!(fitted.status.contains("iterations"), "status = {}", fitted.status);
        let optim = fitted.optim.as_ref().unwrap();
        assert!(!optim.converged);
        assert_eq!(optim.status, fitted.status);

        let rerun = model.fit_fixed(&obs, &fitted.params).unwrap();
        assert_eq!(rerun.log_likelihood, fitted.log_likelihood);
    }

    #[test]
    // Purpose
    // -------
    // When every start aborts, the filter is run at start 0 and returned as
    // unconverged with the failure recorded in the status.
    //
    // Given
    // -----
    // - A single start at the default parameters whose trial failed with a
    //   line-search condition violation.
    //
    // Expect
    // ------
    // - `converged == false`, no optimizer diagnostics.
    // - Status begins "All 1 starts failed; start 0:".
    // - States and ℓ equal a fixed run at start 0.
    fn all_failed_starts_fall_back_to_first_start() {
        let obs = rising_obs();
        let model = ekf_model(0);
        let params = ModelParameters::default();
        let failed = vec![Err(OptError::ConditionViolated { text: "wolfe".into() })];
        let selection = select_best(failed).unwrap();
        assert!(selection.best.is_none());

        let res = model.resolve(&obs, &[params.to_vec()], selection).unwrap();
        assert!(!res.converged);
        assert!(res.optim.is_none());
        assert!(res.status.starts_with("All 1 starts failed; start 0:"), "status = {}", res.status);

        let fixed = model.fit_fixed(&obs, &params).unwrap();
        assert_eq!(res.states, fixed.states);
        assert_eq!(res.log_likelihood, fixed.log_likelihood);
    }

    #[test]
    // Purpose
    // -------
    // If the fallback run itself fails, the estimator reports
    // `OptimizationFailed` carrying both messages.
    //
    // Given
    // -----
    // - All starts failed; start 0 has mu = 1e308, so the prior mean
    //   overflows by index 2.
    //
    // Expect
    // ------
    // - `OptimizationFailed` whose status names the start failure and the
    //   fallback error; kind is `Optimization`.
    fn failing_fallback_is_optimization_failure() {
        let obs = rising_obs();
        let model = ekf_model(0);
        let runaway = ModelParameters { mu: 1e308, ..ModelParameters::default() };
        let failed = vec![Err(OptError::ConditionViolated { text: "wolfe".into() })];
        let selection = select_best(failed).unwrap();

        let err = model.resolve(&obs, &[runaway.to_vec()], selection).unwrap_err();
        assert_eq!(err.kind(), crate::capability::errors::ErrorKind::Optimization);
        match err {
            CapabilityError::OptimizationFailed { status } => {
                assert!(status.starts_with("All 1 starts failed"), "status = {status}");
                assert!(status.contains("fallback:"), "status = {status}");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
    #[test]
    // Purpose
    // -------
    // Fitting needs at least two observations.
    //
    // Given
    // -----
    // - One observation.
    //
    // Expect
    // ------
    // - `InsufficientObservations { required: 2, found: 1 }`.
    fn optimized_fit_requires_two_observations() {
        let obs = Observations::from_pairs(&[(0.0, 0.5)]).unwrap();
        assert_eq!(
            ekf_model(0).fit_optimized(&obs, &ModelParameters::default()).unwrap_err(),
            CapabilityError::InsufficientObservations { required: 2, found: 1 }
        );
    }

    #[test]
    // Purpose
    // -------
    // Standard errors are finite and non-negative for both filters.
    //
    // Given
    // -----
    // - Ten rising scores at an interior parameter point; EKF (analytic
    //   gradient) and EnKF (finite differences).
    //
    // Expect
    // ------
    // - Six finite, non-negative entries each.
    fn standard_errors_are_finite_and_non_negative() {
        let obs = rising_obs();
        let params = ModelParameters::new(0.1, 0.1, 2.0, 0.05, -0.5, 0.2).unwrap();
        let se = ekf_model(0).standard_errors(&obs, &params).unwrap();
        assert_eq!(se.len(), 6);
        assert!(se.iter().all(|v| v.is_finite() && *v >= 0.0));

        let enkf = CapabilityModel::new(
            EnsembleKalmanFilter::new(200, 5).unwrap(),
            FitOptions::default(),
        );
        let se = enkf.standard_errors(&obs, &params).unwrap();
        assert!(se.iter().all(|v| v.is_finite() && *v >= 0.0));
    }

    #[test]
    // Purpose
    // -------
    // `analyze` validates forecast inputs up front and forecasts from the
    // fitted state.
    //
    // Given
    // -----
    // - A fixed fit with horizons [10, 12], then a horizon before the data
    //   ends.
    //
    // Expect
    // ------
    // - Two forecast points; then `InvalidForecastTime`.
    fn analyze_fits_then_forecasts() {
        let obs = rising_obs();
        let model = ekf_model(0);
        let params = ModelParameters::default();
        let report =
            model.analyze(&obs, &params, FitStrategy::Fixed, &[10.0, 12.0], 0.9).unwrap();
        let fc = report.forecast.unwrap();
        assert_eq!(fc.points.len(), 2);
        assert_eq!(report.result.len(), obs.len());

        let none = model.analyze(&obs, &params, FitStrategy::Fixed, &[], 0.9).unwrap();
        assert!(none.forecast.is_none());

        assert!(matches!(
            model.analyze(&obs, &params, FitStrategy::Fixed, &[5.0], 0.9),
            Err(CapabilityError::InvalidForecastTime { .. })
        ));
    }
}
