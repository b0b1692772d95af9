//! loglik_optimizer::finite_diff — finite-difference gradient and Hessian helpers.
//!
//! Purpose
//! -------
//! Numerical derivatives for objectives that do not ship an analytic
//! gradient, plus the curvature matrix used for standard errors. Nothing
//! outside this module touches the `finitediff` API directly.
//!
//! Key behaviors
//! -------------
//! - [`fd_gradient`]: central differences first; if any evaluation failed
//!   or the result is non-finite, one retry with forward differences.
//! - [`run_fd_diff`]: forward-difference gradient with error capture.
//! - [`compute_hessian`]: central-difference Jacobian of a gradient, with a
//!   forward fallback, symmetrized before it is returned.
//!
//! Conventions
//! -----------
//! - Objectives evaluated through these helpers cannot return `Result`
//!   from inside the FD closure. The first error is parked in a shared
//!   `RefCell<Option<Error>>` and the closure returns `NaN`; the helper
//!   turns the parked error back into an [`OptError`] afterwards.
//! - Differences are taken in whatever coordinates the caller hands in.
//!   The capability estimator differentiates in the bounded parameter
//!   space, not the logit space the solver walks in.
use crate::optimization::{
    errors::{OptError, OptResult},
    loglik_optimizer::{
        Grad, Theta,
        types::Hessian,
        validation::{validate_grad, validate_hessian},
    },
};
use argmin::core::Error;
use finitediff::FiniteDiff;
use std::cell::RefCell;

/// Finite-difference gradient of a fallible scalar function.
///
/// Tries central differences; on a captured evaluation error or a
/// non-finite entry, retries once with forward differences.
///
/// # Errors
/// - The error raised by `func` on the forward pass, if any.
/// - [`OptError::InvalidGradient`] if the forward gradient is non-finite.
pub fn fd_gradient<G>(theta: &Theta, func: G) -> OptResult<Grad>
where
    G: Fn(&Theta) -> Result<f64, Error>,
{
    let closure_err: RefCell<Option<Error>> = RefCell::new(None);
    let wrapped = |x: &Theta| -> f64 {
        match func(x) {
            Ok(v) => v,
            Err(e) => {
                let mut slot = closure_err.borrow_mut();
                if slot.is_none() {
                    *slot = Some(e);
                }
                f64::NAN
            }
        }
    };
    let central = theta.central_diff(&wrapped);
    if closure_err.borrow().is_none() && validate_grad(&central, theta.len()).is_ok() {
        return Ok(central);
    }
    run_fd_diff(theta, &wrapped, &closure_err)
}

/// Forward-difference gradient with error capture and validation.
///
/// `func` is expected to park any evaluation error in `closure_err` and
/// return `NaN`. The cell is cleared on entry.
///
/// # Errors
/// - The parked error, converted into [`OptError`].
/// - [`OptError::GradientDimMismatch`] / [`OptError::InvalidGradient`]
///   from [`validate_grad`].
pub fn run_fd_diff<G: Fn(&Theta) -> f64>(
    theta: &Theta, func: &G, closure_err: &RefCell<Option<Error>>,
) -> OptResult<Grad> {
    closure_err.replace(None);
    let fd_grad = theta.forward_diff(func);
    if let Some(err) = closure_err.take() {
        return Err(err.into());
    }
    validate_grad(&fd_grad, theta.len())?;
    Ok(fd_grad)
}

/// compute_hessian — finite-difference Hessian with validation and symmetry.
///
/// Parameters
/// ----------
/// - `f`: gradient function `θ ↦ ∇f(θ)`, differentiated column by column.
/// - `theta`: evaluation point; its length fixes the `dim × dim` shape.
///
/// Returns
/// -------
/// A finite, symmetric `dim × dim` matrix.
///
/// Errors
/// ------
/// - [`OptError::HessianDimMismatch`] / [`OptError::InvalidHessian`] when
///   the forward fallback also fails validation. The central-difference
///   diagnostic is discarded.
pub fn compute_hessian<F: Fn(&Theta) -> Grad>(f: &F, theta: &Theta) -> OptResult<Hessian> {
    let dim = theta.len();
    let mut cent_hess = theta.central_hessian(f);
    match validate_hessian(&cent_hess, dim) {
        Ok(_) => {
            symmetrize_hess(&mut cent_hess);
            Ok(cent_hess)
        }
        Err(_) => {
            let mut forward_hess = theta.forward_hessian(f);
            validate_hessian(&forward_hess, dim)?;
            symmetrize_hess(&mut forward_hess);
            Ok(forward_hess)
        }
    }
}

/// Hessian of a fallible gradient function.
///
/// Gradient failures at perturbed points are parked and surfaced after the
/// sweep instead of being differentiated as `NaN`.
///
/// # Errors
/// - The first gradient error raised during the sweep.
/// - Validation errors from [`compute_hessian`].
pub fn compute_hessian_fallible<F>(f: F, theta: &Theta) -> OptResult<Hessian>
where
    F: Fn(&Theta) -> OptResult<Grad>,
{
    let first_err: RefCell<Option<OptError>> = RefCell::new(None);
    let dim = theta.len();
    let wrapped = |x: &Theta| -> Grad {
        match f(x) {
            Ok(g) => g,
            Err(e) => {
                let mut slot = first_err.borrow_mut();
                if slot.is_none() {
                    *slot = Some(e);
                }
                Grad::from_elem(dim, f64::NAN)
            }
        }
    };
    let hess = compute_hessian(&wrapped, theta);
    if let Some(err) = first_err.take() {
        return Err(err);
    }
    hess
}

// ---- Helper methods ----

/// Average each off-diagonal pair in place; the diagonal is untouched.
fn symmetrize_hess(hess: &mut Hessian) {
    for i in 0..hess.nrows() {
        for j in 0..i {
            let avg = 0.5 * (hess[[i, j]] + hess[[j, i]]);
            hess[[i, j]] = avg;
            hess[[j, i]] = avg;
        }
    }
}
