//! [`LogitLbfgs`]: box-constrained minimization by logit reparameterization
//! on top of the unconstrained L-BFGS maximizer.
//!
//! Each coordinate is written as `x_i = lo_i + (hi_i − lo_i)·σ(θ_i)`, so
//! every point the solver visits is strictly inside the box. The objective
//! is wrapped as a [`LogLikelihood`] with `ℓ(θ) = −cost(x(θ))`; an analytic
//! box-space gradient is chained through `dx/dθ`, and without one the
//! adapter finite-differences in θ.
use crate::optimization::{
    box_constrained::{BoxBounds, BoxMinimizer, BoxObjective, BoxOutcome},
    errors::{OptError, OptResult},
    loglik_optimizer::{Grad, LogLikelihood, MLEOptions, Theta, maximize},
};

/// L-BFGS in logit space.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LogitLbfgs {
    pub opts: MLEOptions,
}

impl LogitLbfgs {
    pub fn new(opts: MLEOptions) -> Self {
        Self { opts }
    }
}

struct LogitProblem<'a, O: BoxObjective> {
    objective: &'a O,
    bounds: &'a BoxBounds,
}

impl<'a, O: BoxObjective> LogLikelihood for LogitProblem<'a, O> {
    type Data = ();

    fn value(&self, theta: &Theta, _: &()) -> OptResult<f64> {
        let x = self.bounds.to_bounded(theta);
        Ok(-self.objective.cost(&x)?)
    }

    fn check(&self, theta: &Theta, _: &()) -> OptResult<()> {
        if theta.len() != self.bounds.dim() {
            return Err(OptError::StartDimMismatch {
                expected: self.bounds.dim(),
                found: theta.len(),
            });
        }
        Ok(())
    }

    fn grad(&self, theta: &Theta, _: &()) -> OptResult<Grad> {
        let x = self.bounds.to_bounded(theta);
        let g = self.objective.gradient(&x)?;
        Ok(-(g * self.bounds.jacobian_diag(theta)))
    }
}

impl BoxMinimizer for LogitLbfgs {
    /// # Errors
    /// - [`OptError::StartDimMismatch`] if `x0` does not match the box.
    /// - Objective errors at the start point (via `check`/first evaluation).
    /// - Backend failures from the L-BFGS run; callers decide whether
    ///   these are recoverable (see [`OptError::is_backend_failure`]).
    fn minimize<O: BoxObjective>(
        &self, objective: &O, x0: &Theta, bounds: &BoxBounds,
    ) -> OptResult<BoxOutcome> {
        if x0.len() != bounds.dim() {
            return Err(OptError::StartDimMismatch { expected: bounds.dim(), found: x0.len() });
        }
        let start = bounds.clamp_interior(x0);
        let theta0 = bounds.to_unconstrained(&start);
        let problem = LogitProblem { objective, bounds };
        let optim = maximize(&problem, theta0, &(), &self.opts)?;
        Ok(BoxOutcome { x_hat: bounds.to_bounded(&optim.theta_hat), cost: -optim.value, optim })
    }
}
