// Per-axis slew-rate limiter

use crate::config::ConfigError;

/// Limits how fast one axis may change between cycles
///
/// Holds the previous output and the maximum change per second. Consecutive
/// outputs never differ by more than `bound * dt`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateLimiterState {
    last_output: f64,
    bound: f64,
}

impl RateLimiterState {
    /// Create a limiter at rest with `bound` units per second
    ///
    /// A zero bound is allowed and freezes the output at its initial value.
    pub fn new(bound: f64) -> Result<Self, ConfigError> {
        if !bound.is_finite() || bound < 0.0 {
            return Err(ConfigError::InvalidRateLimit(bound));
        }
        Ok(Self {
            last_output: 0.0,
            bound,
        })
    }

    /// Move toward `target` by at most `bound * dt` and return the new output
    pub fn advance(&mut self, target: f64, dt: f64) -> f64 {
        let max_step = self.bound * dt.max(0.0);
        let change = (target - self.last_output).clamp(-max_step, max_step);
        self.last_output += change;
        self.last_output
    }

    pub fn last_output(&self) -> f64 {
        self.last_output
    }
}
