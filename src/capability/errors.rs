//! Errors for the capability model (input validation, configuration checks,
//! filter recursion failures, and optimizer outcomes).
//!
//! [`CapabilityError`] is the single error type of the domain layer. Each
//! variant belongs to one of four families reported by
//! [`CapabilityError::kind`]:
//!
//! - [`ErrorKind::InvalidInput`]: the observation series or requested
//!   forecast times are unusable.
//! - [`ErrorKind::InvalidConfiguration`]: parameters, bounds or options are
//!   out of range.
//! - [`ErrorKind::NumericalInstability`]: a filter run hit a non-positive or
//!   non-finite quantity at a known time index.
//! - [`ErrorKind::Optimization`]: the estimator could not produce any usable
//!   point. Non-convergence alone is never an error.
//!
//! ## Conventions
//! - **Indices are 0-based** and refer to positions in the observation
//!   series.
//! - Input and configuration errors are raised before any recursion starts.
use crate::optimization::errors::OptError;
#[cfg(feature = "python-bindings")]
use pyo3::{PyErr, exceptions::PyValueError};

/// Result alias for capability-model operations.
pub type CapResult<T> = Result<T, CapabilityError>;

/// Coarse classification of [`CapabilityError`] variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidInput,
    InvalidConfiguration,
    NumericalInstability,
    Optimization,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CapabilityError {
    // ---- Input/data validation ----
    /// Observation series is empty.
    EmptySeries,

    /// Operation needs more observations than were supplied.
    InsufficientObservations { required: usize, found: usize },

    /// `times` and `scores` have different lengths.
    LengthMismatch { times: usize, scores: usize },

    /// A time stamp is NaN/±inf.
    NonFiniteTime { index: usize, value: f64 },

    /// A time stamp is negative.
    NegativeTime { index: usize, value: f64 },

    /// Time stamps must be strictly increasing.
    NonIncreasingTime { index: usize, previous: f64, current: f64 },

    /// A score is NaN/±inf.
    NonFiniteScore { index: usize, value: f64 },

    /// A score lies outside [0, 1].
    ScoreOutOfRange { index: usize, value: f64 },

    /// Forecast times must be finite, strictly increasing, and after the last
    /// observed time.
    InvalidForecastTime { index: usize, value: f64, reason: &'static str },

    /// A transition step was asked to move by a non-positive or non-finite dt.
    NonPositiveStep { dt: f64 },

    // ---- Configuration ----
    /// A model parameter is outside its admissible range.
    InvalidParameter { name: &'static str, value: f64, reason: &'static str },

    /// Parameter bounds are malformed.
    InvalidBounds { name: &'static str, lower: f64, upper: f64, reason: &'static str },

    /// Confidence level must lie strictly inside (0, 1).
    InvalidConfidence { value: f64 },

    /// Ensemble filter needs at least two members.
    InvalidEnsembleSize { members: usize },

    /// Restart count is unusable.
    InvalidRestarts { restarts: usize, reason: &'static str },

    // ---- Filter recursion ----
    /// A filter quantity became non-positive or non-finite.
    NumericalInstability { index: usize, quantity: &'static str, value: f64 },

    // ---- Estimation / optimizer ----
    /// The filter has no analytic gradient; finite differences apply.
    GradientNotImplemented,

    /// Error raised inside the optimizer layer.
    Optimizer(OptError),

    /// The estimator could not produce any usable point.
    OptimizationFailed { status: String },
}

impl CapabilityError {
    /// Family this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        use CapabilityError::*;
        match self {
            EmptySeries
            | InsufficientObservations { .. }
            | LengthMismatch { .. }
            | NonFiniteTime { .. }
            | NegativeTime { .. }
            | NonIncreasingTime { .. }
            | NonFiniteScore { .. }
            | ScoreOutOfRange { .. }
            | InvalidForecastTime { .. }
            | NonPositiveStep { .. } => ErrorKind::InvalidInput,
            InvalidParameter { .. }
            | InvalidBounds { .. }
            | InvalidConfidence { .. }
            | InvalidEnsembleSize { .. }
            | InvalidRestarts { .. } => ErrorKind::InvalidConfiguration,
            NumericalInstability { .. } => ErrorKind::NumericalInstability,
            Optimizer(inner) => match inner {
                OptError::NumericalInstability { .. } => ErrorKind::NumericalInstability,
                OptError::InvalidModelParameter { .. } => ErrorKind::InvalidConfiguration,
                e if e.is_backend_failure() => ErrorKind::Optimization,
                _ => ErrorKind::InvalidConfiguration,
            },
            GradientNotImplemented | OptimizationFailed { .. } => ErrorKind::Optimization,
        }
    }
}

impl std::error::Error for CapabilityError {}

impl std::fmt::Display for CapabilityError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Input/data validation ----
            CapabilityError::EmptySeries => write!(f, "Observation series is empty."),
            CapabilityError::InsufficientObservations { required, found } => {
                write!(f, "At least {required} observations are required; got {found}.")
            }
            CapabilityError::LengthMismatch { times, scores } => {
                write!(f, "Times ({times}) and scores ({scores}) must have equal length.")
            }
            CapabilityError::NonFiniteTime { index, value } => {
                write!(f, "Time at index {index} is non-finite: {value}")
            }
            CapabilityError::NegativeTime { index, value } => {
                write!(f, "Time at index {index} is negative: {value}")
            }
            CapabilityError::NonIncreasingTime { index, previous, current } => {
                write!(
                    f,
                    "Times must be strictly increasing; index {index} has {current} after {previous}"
                )
            }
            CapabilityError::NonFiniteScore { index, value } => {
                write!(f, "Score at index {index} is non-finite: {value}")
            }
            CapabilityError::ScoreOutOfRange { index, value } => {
                write!(f, "Score at index {index} must lie in [0, 1]; got {value}")
            }
            CapabilityError::InvalidForecastTime { index, value, reason } => {
                write!(f, "Invalid forecast time at index {index} ({value}): {reason}")
            }
            CapabilityError::NonPositiveStep { dt } => {
                write!(f, "Transition step must be finite and > 0; got {dt}")
            }

            // ---- Configuration ----
            CapabilityError::InvalidParameter { name, value, reason } => {
                write!(f, "Invalid parameter {name} = {value}: {reason}")
            }
            CapabilityError::InvalidBounds { name, lower, upper, reason } => {
                write!(f, "Invalid bounds for {name}: [{lower}, {upper}]: {reason}")
            }
            CapabilityError::InvalidConfidence { value } => {
                write!(f, "Confidence level must lie in (0, 1); got {value}")
            }
            CapabilityError::InvalidEnsembleSize { members } => {
                write!(f, "Ensemble filter needs at least 2 members; got {members}")
            }
            CapabilityError::InvalidRestarts { restarts, reason } => {
                write!(f, "Invalid restart count {restarts}: {reason}")
            }

            // ---- Filter recursion ----
            CapabilityError::NumericalInstability { index, quantity, value } => {
                write!(f, "Numerical instability at index {index}: {quantity} = {value}")
            }

            // ---- Estimation / optimizer ----
            CapabilityError::GradientNotImplemented => {
                write!(f, "Analytic gradient not implemented for this filter")
            }
            CapabilityError::Optimizer(err) => write!(f, "Optimizer error: {err}"),
            CapabilityError::OptimizationFailed { status } => {
                write!(f, "Optimizer failed with status: {status}")
            }
        }
    }
}

impl From<OptError> for CapabilityError {
    fn from(err: OptError) -> Self {
        match err {
            OptError::NumericalInstability { index, quantity, value } => {
                CapabilityError::NumericalInstability { index, quantity, value }
            }
            OptError::InvalidModelParameter { name, value, reason } => {
                CapabilityError::InvalidParameter { name, value, reason }
            }
            OptError::GradientNotImplemented => CapabilityError::GradientNotImplemented,
            other => CapabilityError::Optimizer(other),
        }
    }
}

/// Convert a [`CapabilityError`] into a Python `ValueError`.
#[cfg(feature = "python-bindings")]
impl From<CapabilityError> for PyErr {
    fn from(err: CapabilityError) -> PyErr {
        PyValueError::new_err(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - The `kind()` classification for each variant family.
    // - Round-tripping errors between the capability and optimizer layers.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Each family maps to its `ErrorKind`.
    //
    // Given
    // -----
    // - One representative per family, including wrapped optimizer errors.
    //
    // Expect
    // ------
    // - InvalidInput, InvalidConfiguration, NumericalInstability,
    //   Optimization respectively.
    fn kind_classifies_representative_variants() {
        let input = CapabilityError::NonIncreasingTime { index: 1, previous: 0.0, current: 0.0 };
        let config = CapabilityError::InvalidConfidence { value: 1.0 };
        let numeric = CapabilityError::NumericalInstability { index: 3, quantity: "S", value: 0.0 };
        let optim = CapabilityError::OptimizationFailed { status: "line search".into() };

        assert_eq!(input.kind(), ErrorKind::InvalidInput);
        assert_eq!(config.kind(), ErrorKind::InvalidConfiguration);
        assert_eq!(numeric.kind(), ErrorKind::NumericalInstability);
        assert_eq!(optim.kind(), ErrorKind::Optimization);
        assert_eq!(
            CapabilityError::Optimizer(OptError::NoTolerancesProvided).kind(),
            ErrorKind::InvalidConfiguration
        );
        assert_eq!(
            CapabilityError::Optimizer(OptError::ConditionViolated { text: "wolfe".into() })
                .kind(),
            ErrorKind::Optimization
        );
    }

    #[test]
    // Purpose
    // -------
    // Instability raised by a filter inside an objective returns to the
    // capability layer with its payload intact.
    //
    // Given
    // -----
    // - `CapabilityError::NumericalInstability` sent through `OptError` and back.
    //
    // Expect
    // ------
    // - The original variant.
    fn instability_round_trips_through_optimizer_layer() {
        let original = CapabilityError::NumericalInstability { index: 7, quantity: "P_est", value: -1e-3 };
        let back = CapabilityError::from(OptError::from(original.clone()));
        assert_eq!(back, original);
    }
}
