//! loglik_optimizer::builders — L-BFGS solver construction.
//!
//! Purpose
//! -------
//! Hide Argmin's generic wiring behind two small constructors, one per
//! supported line search, so callers only ever pick a [`LineSearcher`]
//! value in [`MLEOptions`].
//!
//! Conventions
//! -----------
//! - History size comes from `opts.lbfgs_mem`, falling back to
//!   [`DEFAULT_LBFGS_MEM`].
//! - Gradient and cost tolerances are applied by [`configure_lbfgs`] only
//!   when present; otherwise Argmin's defaults stay in effect.
//! - Starting point, iteration cap and timeout are executor concerns and
//!   are set in [`super::run::run_lbfgs`].
//!
//! [`LineSearcher`]: super::traits::LineSearcher
use argmin::solver::quasinewton::LBFGS;

use crate::optimization::{
    errors::OptResult,
    loglik_optimizer::{
        traits::MLEOptions,
        types::{
            Cost, DEFAULT_LBFGS_MEM, Grad, HagerZhangLS, LbfgsHagerZhang, LbfgsMoreThuente,
            MoreThuenteLS, Theta,
        },
    },
};

/// L-BFGS with a Hager–Zhang line search.
///
/// # Errors
/// Argmin rejections of the configured tolerances, as [`OptError`].
///
/// [`OptError`]: crate::optimization::errors::OptError
pub fn build_optimizer_hager_zhang(opts: &MLEOptions) -> OptResult<LbfgsHagerZhang> {
    let mem = opts.lbfgs_mem.unwrap_or(DEFAULT_LBFGS_MEM);
    configure_lbfgs(LbfgsHagerZhang::new(HagerZhangLS::new(), mem), opts)
}

/// L-BFGS with a More–Thuente line search.
///
/// # Errors
/// Argmin rejections of the configured tolerances, as [`OptError`].
///
/// [`OptError`]: crate::optimization::errors::OptError
pub fn build_optimizer_more_thuente(opts: &MLEOptions) -> OptResult<LbfgsMoreThuente> {
    let mem = opts.lbfgs_mem.unwrap_or(DEFAULT_LBFGS_MEM);
    configure_lbfgs(LbfgsMoreThuente::new(MoreThuenteLS::new(), mem), opts)
}

/// Apply the optional gradient and cost tolerances to any L-BFGS variant.
pub fn configure_lbfgs<L>(
    mut solver: LBFGS<L, Theta, Grad, Cost>, opts: &MLEOptions,
) -> OptResult<LBFGS<L, Theta, Grad, Cost>> {
    if let Some(g) = opts.tols.tol_grad {
        solver = solver.with_tolerance_grad(g)?;
    }
    if let Some(c) = opts.tols.tol_cost {
        solver = solver.with_tolerance_cost(c)?;
    }
    Ok(solver)
}
