//! Numeric aliases and pre-wired L-BFGS solver types for the optimizer.
//!
//! Everything downstream (adapter, builders, runner, box-constrained
//! wrapper, inference) speaks in terms of these aliases rather than raw
//! `ndarray`/Argmin generics, so swapping the backend only touches this
//! file and [`super::builders`].
//!
//! - [`Theta`] / [`Grad`]: optimizer-space vectors, one entry per free
//!   parameter (six for the capability model).
//! - [`Hessian`]: dense `dim × dim` matrix used by finite-difference
//!   curvature and standard errors.
//! - [`Cost`]: scalar cost `c(θ) = -ℓ(θ)`; sign flips live in the adapter.
use argmin::solver::{
    linesearch::{HagerZhangLineSearch, MoreThuenteLineSearch},
    quasinewton::LBFGS,
};
use ndarray::{Array1, Array2};
use std::collections::HashMap;

/// Parameter vector `θ` in unconstrained optimizer space.
pub type Theta = Array1<f64>;

/// Gradient vector, same shape as [`Theta`].
pub type Grad = Array1<f64>;

/// Dense Hessian matrix (`n × n` for `n = Theta.len()`).
pub type Hessian = Array2<f64>;

/// Scalar objective handed to Argmin: the negative log-likelihood.
pub type Cost = f64;

/// Function-evaluation counters as reported by Argmin (`"cost_count"`,
/// `"gradient_count"`, ...).
pub type FnEvalMap = HashMap<String, u64>;

/// Default L-BFGS history size. Six hyperparameters rarely benefit from a
/// longer memory.
pub const DEFAULT_LBFGS_MEM: usize = 7;

pub type HagerZhangLS = HagerZhangLineSearch<Theta, Grad, Cost>;

pub type MoreThuenteLS = MoreThuenteLineSearch<Theta, Grad, Cost>;

pub type LbfgsHagerZhang = LBFGS<HagerZhangLS, Theta, Grad, Cost>;

pub type LbfgsMoreThuente = LBFGS<MoreThuenteLS, Theta, Grad, Cost>;
