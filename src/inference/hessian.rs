//! inference::hessian — observed-information standard errors.
//!
//! Purpose
//! -------
//! Turn a gradient of the negative log-likelihood into classical standard
//! errors: finite-difference the gradient to get the observed information
//! `J(θ̂)`, decompose it with `nalgebra`'s symmetric eigensolver, and read
//! the diagonal of the pseudo-inverse.
//!
//! Invariants & assumptions
//! ------------------------
//! - The gradient passed in is `∇(−ℓ)` on the **total** log-likelihood
//!   scale, so `J(θ̂)` is the observed information and no `1/n` rescaling
//!   is applied.
//! - [`compute_hessian_fallible`] returns a finite, symmetric `n × n`
//!   matrix; it is not re-symmetrized here.
//! - Eigenvalues `λ_k ≤ EIGEN_EPS` are dropped from the pseudo-inverse, so
//!   directions the data do not identify contribute nothing rather than
//!   blowing up.
//!
//! Conventions
//! -----------
//! - No explicit inverse is formed.
//! - Errors are [`OptResult<T>`].
use crate::optimization::{
    errors::OptResult,
    loglik_optimizer::{Grad, Theta, finite_diff::compute_hessian_fallible, types::Hessian},
    numerical_stability::EIGEN_EPS,
};
use nalgebra::DMatrix;
use ndarray::{Array1, Array2};

/// calc_standard_errors — classical SEs from observed information.
///
/// Parameters
/// ----------
/// - `f`: gradient map `θ ↦ ∇(−ℓ)(θ)`; must be C¹ near `theta_hat`.
/// - `theta_hat`: evaluation point; its length fixes the output length.
///
/// Returns
/// -------
/// Length-`n` vector of non-negative, finite standard errors.
///
/// Errors
/// ------
/// - Any gradient error raised at a perturbed point.
/// - Hessian validation errors from the finite-difference sweep.
///
/// Examples
/// --------
/// ```rust
/// # use ndarray::{array, Array1};
/// # use latent_capability::inference::hessian::calc_standard_errors;
/// // g(θ) = A θ with A = diag(4, 1): SEs are (1/2, 1).
/// let a = array![[4.0, 0.0], [0.0, 1.0]];
/// let se = calc_standard_errors(|t: &Array1<f64>| Ok(a.dot(t)), &array![1.0, -1.0]).unwrap();
/// assert!((se[0] - 0.5).abs() < 1e-6);
/// assert!((se[1] - 1.0).abs() < 1e-6);
/// ```
pub fn calc_standard_errors<F>(f: F, theta_hat: &Theta) -> OptResult<Array1<f64>>
where
    F: Fn(&Theta) -> OptResult<Grad>,
{
    let obs_info = compute_hessian_fallible(f, theta_hat)?;
    Ok(pseudo_inverse(&obs_info).diag().mapv(|v| v.max(0.0).sqrt()))
}

/// calc_covariance — full pseudo-inverse of the observed information.
///
/// Same inputs and errors as [`calc_standard_errors`]; returns the `n × n`
/// covariance whose diagonal square roots are the standard errors.
pub fn calc_covariance<F>(f: F, theta_hat: &Theta) -> OptResult<Array2<f64>>
where
    F: Fn(&Theta) -> OptResult<Grad>,
{
    let obs_info = compute_hessian_fallible(f, theta_hat)?;
    Ok(pseudo_inverse(&obs_info))
}

// ---- Helper methods ----

/// `J⁺ = Σ_{k: λ_k > EIGEN_EPS} q_k q_kᵀ / λ_k` for symmetric `J = Q Λ Qᵀ`.
fn pseudo_inverse(obs_info: &Hessian) -> Array2<f64> {
    let n = obs_info.nrows();
    let nalg = DMatrix::<f64>::from_fn(n, n, |i, j| obs_info[[i, j]]);
    let eigen = nalg.symmetric_eigen();
    let q = eigen.eigenvectors;
    let mut cov = Array2::<f64>::zeros((n, n));
    for (k, &lambda) in eigen.eigenvalues.iter().enumerate() {
        if lambda <= EIGEN_EPS {
            continue;
        }
        for i in 0..n {
            for j in 0..n {
                cov[[i, j]] += q[(i, k)] * q[(j, k)] / lambda;
            }
        }
    }
    cov
}
