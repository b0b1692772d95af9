//! Validation helpers for capability inputs, parameters and options.
//!
//! Every check returns the first offending entry as a [`CapabilityError`]
//! carrying its index or name. None of these helpers panic, and all of them
//! run before a filter recursion starts.
use ndarray::Array1;

use crate::capability::errors::{CapResult, CapabilityError};

/// Validate an observation series.
///
/// Rules, checked in order:
/// - non-empty, equal lengths,
/// - each time finite and ≥ 0,
/// - times strictly increasing,
/// - each score finite and in [0, 1].
///
/// # Errors
/// `EmptySeries`, `LengthMismatch`, `NonFiniteTime`, `NegativeTime`,
/// `NonIncreasingTime`, `NonFiniteScore` or `ScoreOutOfRange`.
pub fn validate_series(times: &Array1<f64>, scores: &Array1<f64>) -> CapResult<()> {
    if times.len() != scores.len() {
        return Err(CapabilityError::LengthMismatch { times: times.len(), scores: scores.len() });
    }
    if times.is_empty() {
        return Err(CapabilityError::EmptySeries);
    }
    let mut previous: Option<f64> = None;
    for (index, &t) in times.iter().enumerate() {
        if !t.is_finite() {
            return Err(CapabilityError::NonFiniteTime { index, value: t });
        }
        if t < 0.0 {
            return Err(CapabilityError::NegativeTime { index, value: t });
        }
        if let Some(prev) = previous {
            if t <= prev {
                return Err(CapabilityError::NonIncreasingTime {
                    index,
                    previous: prev,
                    current: t,
                });
            }
        }
        previous = Some(t);
    }
    for (index, &y) in scores.iter().enumerate() {
        if !y.is_finite() {
            return Err(CapabilityError::NonFiniteScore { index, value: y });
        }
        if !(0.0..=1.0).contains(&y) {
            return Err(CapabilityError::ScoreOutOfRange { index, value: y });
        }
    }
    Ok(())
}

/// Parameter must be finite.
pub fn validate_finite(name: &'static str, value: f64) -> CapResult<()> {
    if !value.is_finite() {
        return Err(CapabilityError::InvalidParameter {
            name,
            value,
            reason: "Parameter must be finite.",
        });
    }
    Ok(())
}

/// Parameter must be finite and strictly positive.
pub fn validate_positive(name: &'static str, value: f64) -> CapResult<()> {
    validate_finite(name, value)?;
    if value <= 0.0 {
        return Err(CapabilityError::InvalidParameter {
            name,
            value,
            reason: "Parameter must be strictly positive.",
        });
    }
    Ok(())
}

/// Parameter must be finite and non-negative.
pub fn validate_non_negative(name: &'static str, value: f64) -> CapResult<()> {
    validate_finite(name, value)?;
    if value < 0.0 {
        return Err(CapabilityError::InvalidParameter {
            name,
            value,
            reason: "Parameter must be non-negative.",
        });
    }
    Ok(())
}

/// Confidence level must lie strictly inside (0, 1).
pub fn validate_confidence(confidence: f64) -> CapResult<()> {
    if !confidence.is_finite() || confidence <= 0.0 || confidence >= 1.0 {
        return Err(CapabilityError::InvalidConfidence { value: confidence });
    }
    Ok(())
}

/// Forecast times must be finite, strictly increasing, and strictly after
/// `last_time`.
///
/// # Errors
/// `InvalidForecastTime` naming the first offending index.
pub fn validate_forecast_times(last_time: f64, future_times: &[f64]) -> CapResult<()> {
    let mut previous = last_time;
    for (index, &t) in future_times.iter().enumerate() {
        if !t.is_finite() {
            return Err(CapabilityError::InvalidForecastTime {
                index,
                value: t,
                reason: "Forecast time must be finite.",
            });
        }
        if t <= last_time {
            return Err(CapabilityError::InvalidForecastTime {
                index,
                value: t,
                reason: "Forecast time must be after the last observed time.",
            });
        }
        if t <= previous {
            return Err(CapabilityError::InvalidForecastTime {
                index,
                value: t,
                reason: "Forecast times must be strictly increasing.",
            });
        }
        previous = t;
    }
    Ok(())
}

/// A filter quantity must be finite.
pub fn check_finite(index: usize, quantity: &'static str, value: f64) -> CapResult<f64> {
    if !value.is_finite() {
        return Err(CapabilityError::NumericalInstability { index, quantity, value });
    }
    Ok(value)
}

/// A filter variance must be finite and strictly positive.
pub fn check_positive(index: usize, quantity: &'static str, value: f64) -> CapResult<f64> {
    if !value.is_finite() || value <= 0.0 {
        return Err(CapabilityError::NumericalInstability { index, quantity, value });
    }
    Ok(value)
}
