//! Observation containers for the capability model.
//!
//! Purpose
//! -------
//! Hold a validated, time-ordered series of `(time, score)` pairs so the
//! filters can run their recursion without re-checking inputs.
//!
//! Invariants & assumptions
//! ------------------------
//! - At least one observation.
//! - Times are finite, ≥ 0, and strictly increasing. Spacing may be
//!   irregular; every consecutive `dt` is therefore > 0.
//! - Scores are finite and in [0, 1].
//!
//! Downstream usage
//! ----------------
//! - Build once at the boundary with [`Observations::new`] or
//!   [`Observations::from_pairs`], then share by reference across filter
//!   runs and optimizer trials.
use ndarray::Array1;

use crate::capability::{
    core::validation::validate_series,
    errors::{CapResult, CapabilityError},
};

/// One `(time, score)` pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    pub time: f64,
    pub score: f64,
}

/// Validated observation series.
#[derive(Debug, Clone, PartialEq)]
pub struct Observations {
    times: Array1<f64>,
    scores: Array1<f64>,
}

impl Observations {
    /// Build from parallel time and score arrays.
    ///
    /// # Errors
    /// Any input error from [`validate_series`].
    pub fn new(times: Array1<f64>, scores: Array1<f64>) -> CapResult<Self> {
        validate_series(&times, &scores)?;
        Ok(Self { times, scores })
    }

    /// Build from `(time, score)` pairs.
    pub fn from_pairs(pairs: &[(f64, f64)]) -> CapResult<Self> {
        let times = pairs.iter().map(|&(t, _)| t).collect();
        let scores = pairs.iter().map(|&(_, y)| y).collect();
        Self::new(times, scores)
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    /// Always `false`; kept for API symmetry with collections.
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    pub fn times(&self) -> &Array1<f64> {
        &self.times
    }

    pub fn scores(&self) -> &Array1<f64> {
        &self.scores
    }

    pub fn first_time(&self) -> f64 {
        self.times[0]
    }

    pub fn last_time(&self) -> f64 {
        self.times[self.times.len() - 1]
    }

    pub fn get(&self, index: usize) -> Option<Observation> {
        Some(Observation { time: *self.times.get(index)?, score: *self.scores.get(index)? })
    }

    pub fn iter(&self) -> impl Iterator<Item = Observation> + '_ {
        self.times.iter().zip(self.scores.iter()).map(|(&time, &score)| Observation { time, score })
    }

    /// # Errors
    /// [`CapabilityError::InsufficientObservations`] when `len() < required`.
    pub fn require_at_least(&self, required: usize) -> CapResult<()> {
        if self.len() < required {
            return Err(CapabilityError::InsufficientObservations {
                required,
                found: self.len(),
            });
        }
        Ok(())
    }
}
