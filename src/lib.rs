//! latent_capability — filtering, fitting and forecasting a latent capability
//! trajectory observed through noisy scores, with optional Python bindings.
//!
//! Purpose
//! -------
//! Serve as the crate root for Rust callers and, with the `python-bindings`
//! feature, as the PyO3 bridge that exposes the capability model to Python
//! through the `_latent_capability` extension module.
//!
//! Key behaviors
//! -------------
//! - Re-export the domain layer ([`capability`]) together with the
//!   optimizer ([`optimization`]) and standard-error ([`inference`])
//!   layers it is built on.
//! - Define `#[pyclass]` wrappers (`CapabilityModel`, `FilterOutcome`,
//!   `CapabilityForecast`) and the `#[pymodule]` initializer, registering a
//!   `latent_capability.capability` submodule so dot-notation imports work.
//!
//! Invariants & assumptions
//! ------------------------
//! - All numerical work lives in the inner modules; this file performs only
//!   FFI glue, input conversion and error mapping.
//! - Errors from the core are converted to `ValueError` at the boundary.
//!
//! Downstream usage
//! ----------------
//! ```rust
//! use latent_capability::capability::prelude::*;
//!
//! let obs = Observations::from_pairs(&[(0.0, 0.3), (1.0, 0.4), (2.5, 0.55)])?;
//! let model = CapabilityModel::<FilterKind>::default();
//! let fitted = model.fit(&obs, &ModelParameters::default(), FitStrategy::Fixed)?;
//! let fc = fitted.forecast(&[3.0, 4.0], 0.9)?;
//! assert_eq!(fc.points.len(), 2);
//! # Ok::<(), latent_capability::capability::CapabilityError>(())
//! ```

pub mod capability;
pub mod inference;
pub mod optimization;
pub mod utils;

#[cfg(feature = "python-bindings")]
use pyo3::{prelude::*, types::PyAny};

#[cfg(feature = "python-bindings")]
use crate::{
    capability::{
        core::{forecasts::ForecastResult, options::FitStrategy, state::FilterResult},
        models::estimator::CapabilityModel,
    },
    utils::{build_filter, build_fit_options, extract_observations, extract_params, extract_vec},
};

/// CapabilityModel — Python-facing filter + estimator.
///
/// Constructed from Python as
/// `CapabilityModel(filter='ekf', members=None, seed=None, tol_grad=None,
/// tol_cost=None, max_iter=None, line_searcher=None, lbfgs_mem=None,
/// timeout_secs=None, restarts=None, restart_seed=None)`.
///
/// - `filter`: `'ekf'` or `'enkf'`; `members`/`seed` configure the EnKF.
/// - Optimizer settings default to `MLEOptions::default()` values.
/// - `restarts`/`restart_seed` add seeded uniform starting points.
#[cfg(feature = "python-bindings")]
#[pyclass(name = "CapabilityModel", module = "latent_capability.capability")]
pub struct PyCapabilityModel {
    inner: CapabilityModel,
}

#[cfg(feature = "python-bindings")]
#[pymethods]
impl PyCapabilityModel {
    #[new]
    #[pyo3(
        signature = (
            filter = None,
            members = None,
            seed = None,
            tol_grad = None,
            tol_cost = None,
            max_iter = None,
            line_searcher = None,
            lbfgs_mem = None,
            timeout_secs = None,
            restarts = None,
            restart_seed = None,
        ),
        text_signature = "(filter='ekf', members=None, seed=None, tol_grad=None, tol_cost=None, \
                          max_iter=None, line_searcher=None, lbfgs_mem=None, timeout_secs=None, \
                          restarts=None, restart_seed=None)"
    )]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        filter: Option<&str>, members: Option<usize>, seed: Option<u64>, tol_grad: Option<f64>,
        tol_cost: Option<f64>, max_iter: Option<usize>, line_searcher: Option<&str>,
        lbfgs_mem: Option<usize>, timeout_secs: Option<f64>, restarts: Option<usize>,
        restart_seed: Option<u64>,
    ) -> PyResult<Self> {
        let filter = build_filter(filter, members, seed)?;
        let options = build_fit_options(
            tol_grad,
            tol_cost,
            max_iter,
            line_searcher,
            lbfgs_mem,
            timeout_secs,
            restarts,
            restart_seed,
        )?;
        Ok(PyCapabilityModel { inner: CapabilityModel::new(filter, options) })
    }

    /// Fit to `(times, scores)`. `params` is the initial (or fixed) 6-vector;
    /// `optimize=False` runs the filter once.
    #[pyo3(
        signature = (times, scores, params = None, optimize = true),
        text_signature = "(self, times, scores, /, params=None, optimize=True)"
    )]
    pub fn fit<'py>(
        &self, py: Python<'py>, times: &Bound<'py, PyAny>, scores: &Bound<'py, PyAny>,
        params: Option<&Bound<'py, PyAny>>, optimize: bool,
    ) -> PyResult<FilterOutcome> {
        let obs = extract_observations(py, times, scores)?;
        let initial = extract_params(py, params)?;
        let strategy = if optimize { FitStrategy::MaximumLikelihood } else { FitStrategy::Fixed };
        let inner = py.allow_threads(|| self.inner.fit(&obs, &initial, strategy))?;
        Ok(FilterOutcome { inner })
    }

    /// Standard errors of `params` in the 6-vector layout.
    #[pyo3(
        signature = (times, scores, params),
        text_signature = "(self, times, scores, params, /)"
    )]
    pub fn standard_errors<'py>(
        &self, py: Python<'py>, times: &Bound<'py, PyAny>, scores: &Bound<'py, PyAny>,
        params: &Bound<'py, PyAny>,
    ) -> PyResult<Vec<f64>> {
        let obs = extract_observations(py, times, scores)?;
        let p = extract_params(py, Some(params))?;
        Ok(self.inner.standard_errors(&obs, &p)?.to_vec())
    }
}

/// FilterOutcome — per-index filter states and fit diagnostics.
#[cfg(feature = "python-bindings")]
#[pyclass(module = "latent_capability.capability")]
pub struct FilterOutcome {
    inner: FilterResult,
}

#[cfg(feature = "python-bindings")]
#[pymethods]
impl FilterOutcome {
    #[getter]
    pub fn times(&self) -> Vec<f64> {
        self.inner.times().to_vec()
    }

    #[getter]
    pub fn prior_means(&self) -> Vec<f64> {
        self.inner.prior_means().to_vec()
    }

    #[getter]
    pub fn prior_variances(&self) -> Vec<f64> {
        self.inner.prior_variances().to_vec()
    }

    #[getter]
    pub fn posterior_means(&self) -> Vec<f64> {
        self.inner.posterior_means().to_vec()
    }

    #[getter]
    pub fn posterior_variances(&self) -> Vec<f64> {
        self.inner.posterior_variances().to_vec()
    }

    #[getter]
    pub fn innovation_variances(&self) -> Vec<f64> {
        self.inner.innovation_variances().to_vec()
    }

    #[getter]
    pub fn predicted_scores(&self) -> Vec<f64> {
        self.inner.predicted_scores().to_vec()
    }

    #[getter]
    pub fn log_likelihood(&self) -> f64 {
        self.inner.log_likelihood
    }

    #[getter]
    pub fn converged(&self) -> bool {
        self.inner.converged
    }

    #[getter]
    pub fn status(&self) -> String {
        self.inner.status.clone()
    }

    /// Fitted parameters as `[mu, sigma_omega, g, sigma_nu, initial_c,
    /// initial_variance]`.
    #[getter]
    pub fn params(&self) -> Vec<f64> {
        self.inner.params.to_vec().to_vec()
    }

    #[getter]
    pub fn iterations(&self) -> Option<usize> {
        self.inner.optim.as_ref().map(|o| o.iterations)
    }

    #[pyo3(
        signature = (future_times, confidence = 0.95),
        text_signature = "(self, future_times, /, confidence=0.95)"
    )]
    pub fn forecast<'py>(
        &self, py: Python<'py>, future_times: &Bound<'py, PyAny>, confidence: f64,
    ) -> PyResult<CapabilityForecast> {
        let times = extract_vec(py, future_times, "future_times")?;
        Ok(CapabilityForecast { inner: self.inner.forecast(&times, confidence)? })
    }
}

/// CapabilityForecast — open-loop forecasts with score-space bands.
#[cfg(feature = "python-bindings")]
#[pyclass(module = "latent_capability.capability")]
pub struct CapabilityForecast {
    inner: ForecastResult,
}

#[cfg(feature = "python-bindings")]
#[pymethods]
impl CapabilityForecast {
    #[getter]
    pub fn times(&self) -> Vec<f64> {
        self.inner.points.iter().map(|p| p.time).collect()
    }

    #[getter]
    pub fn means(&self) -> Vec<f64> {
        self.inner.means()
    }

    #[getter]
    pub fn variances(&self) -> Vec<f64> {
        self.inner.variances()
    }

    #[getter]
    pub fn scores(&self) -> Vec<f64> {
        self.inner.scores()
    }

    #[getter]
    pub fn half_widths(&self) -> Vec<f64> {
        self.inner.points.iter().map(|p| p.half_width).collect()
    }

    #[getter]
    pub fn lower(&self) -> Vec<f64> {
        self.inner.points.iter().map(|p| p.lower).collect()
    }

    #[getter]
    pub fn upper(&self) -> Vec<f64> {
        self.inner.points.iter().map(|p| p.upper).collect()
    }

    #[getter]
    pub fn confidence(&self) -> f64 {
        self.inner.confidence
    }

    #[getter]
    pub fn z(&self) -> f64 {
        self.inner.z
    }
}

#[cfg(feature = "python-bindings")]
#[pymodule]
fn _latent_capability<'py>(_py: Python<'py>, m: &Bound<'py, PyModule>) -> PyResult<()> {
    let capability_mod = PyModule::new(_py, "capability")?;
    capability_module(_py, m, &capability_mod)?;

    // Manually add the submodule into sys.modules to allow for dot notation.
    _py.import("sys")?
        .getattr("modules")?
        .set_item("latent_capability.capability", capability_mod)?;
    Ok(())
}

#[cfg(feature = "python-bindings")]
fn capability_module<'py>(
    _py: Python, latent_capability: &Bound<'py, PyModule>, m: &Bound<'py, PyModule>,
) -> PyResult<()> {
    m.add_class::<PyCapabilityModel>()?;
    m.add_class::<FilterOutcome>()?;
    m.add_class::<CapabilityForecast>()?;
    latent_capability.add_submodule(m)?;
    Ok(())
}
