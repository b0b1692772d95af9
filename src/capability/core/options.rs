//! Estimation options: parameter bounds, fitting strategy, restart policy.
//!
//! Purpose
//! -------
//! Collect every knob of a capability fit in one validated place so the
//! estimator receives explicit options instead of ad-hoc flags.
//!
//! Key behaviors
//! -------------
//! - [`ParamBounds`]: per-parameter box used by the maximum-likelihood fit.
//!   The default box is
//!   `mu∈[-1,2]`, `sigma_omega∈[1e-3,1]`, `g∈[0.1,10]`, `sigma_nu∈[1e-3,1]`,
//!   `initial_c∈[-5,2]`, `initial_variance∈[1e-3,1]`.
//! - [`FitStrategy`]: `Fixed` runs the filter once; `MaximumLikelihood`
//!   optimizes the six hyperparameters first.
//! - [`FitOptions`]: optimizer options, bounds, extra restarts and the seed
//!   that draws restart points.
//!
//! Invariants & assumptions
//! ------------------------
//! - Every lower bound is finite and strictly below its upper bound.
//! - Lower bounds for `g`, `sigma_nu` and `initial_variance` are > 0 and the
//!   lower bound for `sigma_omega` is ≥ 0, so every point in the box is a
//!   valid [`ModelParameters`].
//! - `restarts ≤ MAX_RESTARTS`.
use ndarray::Array1;

use crate::{
    capability::{
        core::params::{ModelParameters, N_PARAMS, PARAM_NAMES},
        errors::{CapResult, CapabilityError},
    },
    optimization::{box_constrained::BoxBounds, loglik_optimizer::MLEOptions},
};

/// Upper limit on extra random starts.
pub const MAX_RESTARTS: usize = 256;

/// How [`crate::capability::models::CapabilityModel::fit`] obtains its
/// parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FitStrategy {
    /// Run the filter once with the supplied parameters.
    Fixed,
    /// Maximize the filter log-likelihood over the bounded box, starting from
    /// the supplied parameters.
    #[default]
    MaximumLikelihood,
}

/// Per-parameter box for maximum-likelihood estimation, in the vector order
/// of [`ModelParameters::to_vec`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamBounds {
    lower: [f64; N_PARAMS],
    upper: [f64; N_PARAMS],
}

impl ParamBounds {
    /// # Errors
    /// [`CapabilityError::InvalidBounds`] naming the first offending
    /// parameter.
    pub fn new(lower: [f64; N_PARAMS], upper: [f64; N_PARAMS]) -> CapResult<Self> {
        for (i, name) in PARAM_NAMES.iter().enumerate() {
            let (lo, hi) = (lower[i], upper[i]);
            if !lo.is_finite() || !hi.is_finite() {
                return Err(CapabilityError::InvalidBounds {
                    name,
                    lower: lo,
                    upper: hi,
                    reason: "Bounds must be finite.",
                });
            }
            if lo >= hi {
                return Err(CapabilityError::InvalidBounds {
                    name,
                    lower: lo,
                    upper: hi,
                    reason: "Lower bound must be strictly below the upper bound.",
                });
            }
            let admissible = match i {
                1 => lo >= 0.0,
                2 | 3 | 5 => lo > 0.0,
                _ => true,
            };
            if !admissible {
                return Err(CapabilityError::InvalidBounds {
                    name,
                    lower: lo,
                    upper: hi,
                    reason: "Lower bound admits invalid parameter values.",
                });
            }
        }
        Ok(Self { lower, upper })
    }

    pub fn lower(&self) -> &[f64; N_PARAMS] {
        &self.lower
    }

    pub fn upper(&self) -> &[f64; N_PARAMS] {
        &self.upper
    }

    pub fn contains(&self, params: &ModelParameters) -> bool {
        let v = params.to_vec();
        v.iter().enumerate().all(|(i, &x)| x >= self.lower[i] && x <= self.upper[i])
    }

    /// Same box as an optimizer-layer [`BoxBounds`].
    pub fn to_box(&self) -> CapResult<BoxBounds> {
        Ok(BoxBounds::new(
            Array1::from(self.lower.to_vec()),
            Array1::from(self.upper.to_vec()),
        )?)
    }
}

impl Default for ParamBounds {
    fn default() -> Self {
        Self {
            lower: [-1.0, 1e-3, 0.1, 1e-3, -5.0, 1e-3],
            upper: [2.0, 1.0, 10.0, 1.0, 2.0, 1.0],
        }
    }
}

/// Options for a maximum-likelihood fit.
///
/// - `mle_opts`: L-BFGS tolerances, line search, memory, verbosity, timeout.
/// - `bounds`: parameter box.
/// - `restarts`: extra starting points drawn uniformly inside `bounds`; the
///   supplied initial parameters are always start 0.
/// - `seed`: RNG seed for restart points.
///
/// Default: `MLEOptions::default()`, `ParamBounds::default()`, no restarts,
/// seed 0.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FitOptions {
    pub mle_opts: MLEOptions,
    pub bounds: ParamBounds,
    pub restarts: usize,
    pub seed: u64,
}

impl FitOptions {
    /// # Errors
    /// [`CapabilityError::InvalidRestarts`] if `restarts > MAX_RESTARTS`.
    pub fn new(
        mle_opts: MLEOptions, bounds: ParamBounds, restarts: usize, seed: u64,
    ) -> CapResult<Self> {
        if restarts > MAX_RESTARTS {
            return Err(CapabilityError::InvalidRestarts {
                restarts,
                reason: "Restart count exceeds the supported maximum of 256.",
            });
        }
        Ok(Self { mle_opts, bounds, restarts, seed })
    }
}
