// Dead-zones applied before and after slew limiting

use serde::Deserialize;

use crate::config::ConfigError;

/// Ratio above which the rescale is numerically a plain shift
const SHIFT_ONLY_RATIO: f64 = 1.0e12;

/// Force `value` to exactly zero when `|value| <= threshold`, pass it through otherwise
pub fn hard_deadband(value: f64, threshold: f64) -> f64 {
    if value.abs() > threshold { value } else { 0.0 }
}

/// Deadband that rescales outside the band so the output has no jump at the edge
///
/// Output is zero for `|x| <= threshold` and reaches `±max` at `|x| == max`.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct ContinuousDeadband {
    pub threshold: f64,
    pub max: f64,
}

impl ContinuousDeadband {
    pub fn new(threshold: f64, max: f64) -> Result<Self, ConfigError> {
        let band = Self { threshold, max };
        band.validate()?;
        Ok(band)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let ok = self.threshold.is_finite()
            && self.max.is_finite()
            && self.threshold >= 0.0
            && self.threshold < self.max;
        if ok {
            Ok(())
        } else {
            Err(ConfigError::InvalidDeadband {
                threshold: self.threshold,
                max: self.max,
            })
        }
    }

    pub fn apply(&self, value: f64) -> f64 {
        let (d, max) = (self.threshold, self.max);
        if value.abs() <= d {
            return 0.0;
        }
        if max / d > SHIFT_ONLY_RATIO {
            return if value > 0.0 { value - d } else { value + d };
        }
        if value > 0.0 {
            max * (value - d) / (max - d)
        } else {
            max * (value + d) / (max - d)
        }
    }
}
