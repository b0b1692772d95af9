//! Adapter that exposes a [`LogLikelihood`] as an `argmin` problem.
//!
//! Maximizing `ℓ(θ)` becomes minimizing `c(θ) = -ℓ(θ)`. Analytic gradients
//! are negated accordingly. Without one, the **cost** closure is finite
//! differenced, so that branch needs no sign flip.
use crate::optimization::{
    errors::OptError,
    loglik_optimizer::{
        finite_diff::fd_gradient,
        traits::LogLikelihood,
        types::{Cost, Grad, Theta},
        validation::validate_grad,
    },
};
use argmin::core::{CostFunction, Error, Gradient};

/// Bridges a [`LogLikelihood`] to `argmin`'s `CostFunction` and `Gradient`.
#[derive(Debug)]
pub struct ArgMinAdapter<'a, F: LogLikelihood> {
    pub f: &'a F,
    pub data: &'a F::Data,
}

impl<'a, F: LogLikelihood> CostFunction for ArgMinAdapter<'a, F> {
    type Param = Theta;
    type Output = Cost;

    /// Evaluate `c(θ) = -ℓ(θ)`, rejecting non-finite values with
    /// [`OptError::NonFiniteCost`].
    fn cost(&self, theta: &Self::Param) -> Result<Self::Output, Error> {
        let output = self.f.value(theta, self.data)?;
        if !output.is_finite() {
            return Err((OptError::NonFiniteCost { value: output }).into());
        }
        Ok(-output)
    }
}

impl<'a, F: LogLikelihood> Gradient for ArgMinAdapter<'a, F> {
    type Param = Theta;
    type Gradient = Grad;

    /// Gradient of the cost at `θ`.
    ///
    /// - Analytic `∇ℓ` available: validate it and return `-∇ℓ`.
    /// - [`OptError::GradientNotImplemented`]: finite-difference the cost
    ///   via [`fd_gradient`].
    /// - Any other model error is propagated.
    fn gradient(&self, theta: &Self::Param) -> Result<Self::Gradient, Error> {
        match self.f.grad(theta, self.data) {
            Ok(g) => {
                validate_grad(&g, theta.len())?;
                Ok(-g)
            }
            Err(OptError::GradientNotImplemented) => {
                Ok(fd_gradient(theta, |x: &Theta| self.cost(x))?)
            }
            Err(e) => Err(e.into()),
        }
    }
}

impl<'a, F: LogLikelihood> ArgMinAdapter<'a, F> {
    pub fn new(f: &'a F, data: &'a F::Data) -> Self {
        Self { f, data }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimization::errors::OptResult;
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Sign conventions for cost and analytic gradient.
    // - Finite-difference fallback when no gradient is implemented.
    // - Rejection of non-finite log-likelihood values.
    // -------------------------------------------------------------------------

    /// ℓ(θ) = -(θ - 1)ᵀ(θ - 1), optionally with analytic gradient.
    struct Bowl {
        analytic: bool,
    }

    impl LogLikelihood for Bowl {
        type Data = ();

        fn value(&self, theta: &Theta, _: &()) -> OptResult<f64> {
            Ok(-theta.mapv(|t| (t - 1.0).powi(2)).sum())
        }

        fn check(&self, _: &Theta, _: &()) -> OptResult<()> {
            Ok(())
        }

        fn grad(&self, theta: &Theta, _: &()) -> OptResult<Grad> {
            if self.analytic {
                Ok(theta.mapv(|t| -2.0 * (t - 1.0)))
            } else {
                Err(OptError::GradientNotImplemented)
            }
        }
    }

    #[test]
    // Purpose
    // -------
    // Cost is the negated log-likelihood; the gradient is the negated ∇ℓ.
    //
    // Given
    // -----
    // - `Bowl { analytic: true }` at θ = (0, 3).
    //
    // Expect
    // ------
    // - cost = 1 + 4 = 5; gradient = (-2, 4).
    fn adapter_negates_value_and_analytic_gradient() {
        let model = Bowl { analytic: true };
        let adapter = ArgMinAdapter::new(&model, &());
        let theta = array![0.0, 3.0];

        assert_eq!(adapter.cost(&theta).unwrap(), 5.0);
        assert_eq!(adapter.gradient(&theta).unwrap(), array![-2.0, 4.0]);
    }

    #[test]
    // Purpose
    // -------
    // Without an analytic gradient the adapter finite-differences the cost.
    //
    // Given
    // -----
    // - `Bowl { analytic: false }` at θ = (0, 3).
    //
    // Expect
    // ------
    // - gradient ≈ (-2, 4) to 1e-5.
    fn adapter_falls_back_to_finite_differences() {
        let model = Bowl { analytic: false };
        let adapter = ArgMinAdapter::new(&model, &());
        let g = adapter.gradient(&array![0.0, 3.0]).unwrap();

        assert!((g[0] + 2.0).abs() < 1e-5);
        assert!((g[1] - 4.0).abs() < 1e-5);
    }

    #[test]
    // Purpose
    // -------
    // A non-finite log-likelihood is an error, not a cost of ±∞.
    //
    // Given
    // -----
    // - A model whose value is always NaN.
    //
    // Expect
    // ------
    // - `cost` fails and converts back into `OptError::NonFiniteCost`.
    fn adapter_rejects_non_finite_values() {
        struct Broken;
        impl LogLikelihood for Broken {
            type Data = ();
            fn value(&self, _: &Theta, _: &()) -> OptResult<f64> {
                Ok(f64::NAN)
            }
            fn check(&self, _: &Theta, _: &()) -> OptResult<()> {
                Ok(())
            }
        }

        let adapter = ArgMinAdapter::new(&Broken, &());
        let err = OptError::from(adapter.cost(&array![0.0]).unwrap_err());

        assert!(matches!(err, OptError::NonFiniteCost { .. }));
    }
}
