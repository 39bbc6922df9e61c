//! Simulation parameters

use crate::error::SimulationError;
use serde::{Deserialize, Serialize};

/// Per-task stochastic model
///
/// `override_days` is carried for downstream override-threshold reporting.
/// The duration and rework computation does not read it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationParams {
    /// Inclusive `(min, max)` days for one task attempt
    pub task_duration_range: (u64, u64),
    /// Probability that an attempt fails, in `[0, 1]`
    pub failure_rate: f64,
    /// Upper bound on rework loops per module per run
    pub max_feedback_loops: u32,
    /// Override threshold in days
    pub override_days: u32,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            task_duration_range: (5, 20),
            failure_rate: 0.10,
            max_feedback_loops: 2,
            override_days: 45,
        }
    }
}

impl SimulationParams {
    /// With duration range
    #[inline]
    #[must_use]
    pub fn with_duration_range(mut self, min: u64, max: u64) -> Self {
        self.task_duration_range = (min, max);
        self
    }

    /// With failure rate
    #[inline]
    #[must_use]
    pub fn with_failure_rate(mut self, failure_rate: f64) -> Self {
        self.failure_rate = failure_rate;
        self
    }

    /// With rework loop bound
    #[inline]
    #[must_use]
    pub fn with_max_feedback_loops(mut self, max_feedback_loops: u32) -> Self {
        self.max_feedback_loops = max_feedback_loops;
        self
    }

    /// With override threshold
    #[inline]
    #[must_use]
    pub fn with_override_days(mut self, override_days: u32) -> Self {
        self.override_days = override_days;
        self
    }

    /// Check ranges
    ///
    /// # Errors
    /// Returns [`SimulationError::InvalidParams`] if `min > max` or the
    /// failure rate is not a probability
    pub fn validate(&self) -> Result<(), SimulationError> {
        let (min, max) = self.task_duration_range;
        if min > max {
            return Err(SimulationError::invalid_params(format!(
                "task_duration_range min {min} exceeds max {max}"
            )));
        }
        if !(0.0..=1.0).contains(&self.failure_rate) {
            return Err(SimulationError::invalid_params(format!(
                "failure_rate {} is outside [0, 1]",
                self.failure_rate
            )));
        }
        Ok(())
    }

    /// Check that a run over `modules` modules cannot overflow its total
    ///
    /// The worst case is every module taking `max` days on each of its
    /// `max_feedback_loops + 1` attempts.
    ///
    /// # Errors
    /// Returns [`SimulationError::InvalidParams`] if that total exceeds `u64`
    pub fn check_total_bound(&self, modules: usize) -> Result<(), SimulationError> {
        let (_, max) = self.task_duration_range;
        let attempts = u64::from(self.max_feedback_loops) + 1;
        let worst = u64::try_from(modules)
            .ok()
            .and_then(|modules| max.checked_mul(attempts)?.checked_mul(modules));
        if worst.is_none() {
            return Err(SimulationError::invalid_params(format!(
                "task_duration_range max {max} over {modules} modules and {attempts} attempts overflows a run total"
            )));
        }
        Ok(())
    }
}
