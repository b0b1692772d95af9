//! PyO3 extraction helpers: Python objects → validated capability types.
//!
//! Everything here is compiled only with the `python-bindings` feature. Each
//! helper converts loosely typed Python input (numpy arrays, pandas Series,
//! plain sequences, strings) into the crate's validated Rust types and maps
//! failures to `ValueError` / `TypeError`.
#[cfg(feature = "python-bindings")]
use ndarray::Array1;

#[cfg(feature = "python-bindings")]
use pyo3::{exceptions::PyValueError, prelude::*, types::PyAny};

#[cfg(feature = "python-bindings")]
use crate::{
    capability::{
        core::{
            data::Observations,
            options::{FitOptions, ParamBounds},
            params::ModelParameters,
        },
        errors::CapabilityError,
        filters::{EnsembleKalmanFilter, ExtendedKalmanFilter, FilterKind, ensemble::DEFAULT_MEMBERS},
    },
    optimization::loglik_optimizer::traits::{LineSearcher, MLEOptions, Tolerances},
};

#[cfg(feature = "python-bindings")]
use numpy::{
    IntoPyArray,    // Vec → PyArray
    PyArrayMethods, // .readonly()
    PyReadonlyArray1,
};

/// Accept a contiguous float64 ndarray, anything with `.to_numpy()`, or a
/// plain sequence of floats.
#[cfg(feature = "python-bindings")]
#[inline]
pub fn extract_f64_array<'py>(
    py: Python<'py>, raw_data: &Bound<'py, PyAny>,
) -> PyResult<PyReadonlyArray1<'py, f64>> {
    if let Ok(arr_ro) = raw_data.extract::<PyReadonlyArray1<f64>>() {
        if arr_ro.as_slice().is_ok() {
            return Ok(arr_ro);
        }
    }

    if let Ok(obj) = raw_data.call_method("to_numpy", (false,), None) {
        if let Ok(series_ro) = obj.extract::<PyReadonlyArray1<f64>>() {
            if series_ro.as_slice().is_ok() {
                return Ok(series_ro);
            }
        }
    }

    let vec: Vec<f64> = raw_data.extract().map_err(|_| {
        pyo3::exceptions::PyTypeError::new_err(
            "expected a 1-D numpy.ndarray, pandas.Series, or sequence of float64",
        )
    })?;
    Ok(vec.into_pyarray(py).readonly())
}

#[cfg(feature = "python-bindings")]
pub fn extract_vec<'py>(
    py: Python<'py>, raw: &Bound<'py, PyAny>, name: &str,
) -> PyResult<Vec<f64>> {
    let arr = extract_f64_array(py, raw)?;
    let slice = arr.as_slice().map_err(|_| {
        PyValueError::new_err(format!("{name} must be a 1-D contiguous float64 array or sequence"))
    })?;
    Ok(slice.to_vec())
}

#[cfg(feature = "python-bindings")]
pub fn extract_observations<'py>(
    py: Python<'py>, times: &Bound<'py, PyAny>, scores: &Bound<'py, PyAny>,
) -> PyResult<Observations> {
    let t = Array1::from(extract_vec(py, times, "times")?);
    let y = Array1::from(extract_vec(py, scores, "scores")?);
    Ok(Observations::new(t, y)?)
}

/// `None` → `ModelParameters::default()`; otherwise a length-6 vector in the
/// `[mu, sigma_omega, g, sigma_nu, initial_c, initial_variance]` layout.
#[cfg(feature = "python-bindings")]
pub fn extract_params<'py>(
    py: Python<'py>, params: Option<&Bound<'py, PyAny>>,
) -> PyResult<ModelParameters> {
    match params {
        None => Ok(ModelParameters::default()),
        Some(raw) => {
            let v = Array1::from(extract_vec(py, raw, "params")?);
            Ok(ModelParameters::from_vec(&v)?)
        }
    }
}

#[cfg(feature = "python-bindings")]
pub fn build_filter(
    filter: Option<&str>, members: Option<usize>, seed: Option<u64>,
) -> PyResult<FilterKind> {
    let name = filter.unwrap_or("ekf").to_lowercase();
    match name.as_str() {
        "ekf" | "extended" => Ok(FilterKind::Extended(ExtendedKalmanFilter)),
        "enkf" | "ensemble" => Ok(FilterKind::Ensemble(EnsembleKalmanFilter::new(
            members.unwrap_or(DEFAULT_MEMBERS),
            seed.unwrap_or(0),
        )?)),
        other => Err(PyValueError::new_err(format!(
            "invalid filter {:?} (expected 'ekf' or 'enkf')",
            other
        ))),
    }
}

#[cfg(feature = "python-bindings")]
#[allow(clippy::too_many_arguments)]
pub fn build_fit_options(
    tol_grad: Option<f64>, tol_cost: Option<f64>, max_iter: Option<usize>,
    line_searcher: Option<&str>, lbfgs_mem: Option<usize>, timeout_secs: Option<f64>,
    restarts: Option<usize>, restart_seed: Option<u64>,
) -> PyResult<FitOptions> {
    let mle_opts =
        extract_mle_opts(tol_grad, tol_cost, max_iter, line_searcher, lbfgs_mem, timeout_secs)?;
    Ok(FitOptions::new(
        mle_opts,
        ParamBounds::default(),
        restarts.unwrap_or(0),
        restart_seed.unwrap_or(0),
    )?)
}

#[cfg(feature = "python-bindings")]
fn extract_mle_opts(
    tol_grad: Option<f64>, tol_cost: Option<f64>, max_iter: Option<usize>,
    line_searcher: Option<&str>, lbfgs_mem: Option<usize>, timeout_secs: Option<f64>,
) -> PyResult<MLEOptions> {
    use std::{str::FromStr, time::Duration};

    // Omitted tolerances fall back to the documented defaults.
    let defaults = MLEOptions::default().tols;
    let tols = Tolerances::new(
        tol_grad.or(defaults.tol_grad),
        tol_cost.or(defaults.tol_cost),
        max_iter.or(defaults.max_iter),
    )
    .map_err(CapabilityError::from)?;

    let ls = match line_searcher {
        Some(name) => LineSearcher::from_str(name).map_err(CapabilityError::from)?,
        None => LineSearcher::MoreThuente,
    };

    let timeout = match timeout_secs {
        None => None,
        Some(s) if s.is_finite() && s > 0.0 => Some(Duration::from_secs_f64(s)),
        Some(s) => {
            return Err(PyValueError::new_err(format!(
                "timeout_secs must be finite and > 0; got {s}"
            )));
        }
    };

    let opts = MLEOptions::new(tols, ls, lbfgs_mem)
        .and_then(|o| o.with_timeout(timeout))
        .map_err(CapabilityError::from)?;
    Ok(opts)
}
