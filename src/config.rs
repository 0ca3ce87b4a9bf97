// Loop timing, topics, shaping constants
use std::f64::consts::TAU;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;
use serde::Deserialize;

use crate::shaping::ContinuousDeadband;

// Runtime loop frequency
pub const LOOP_HZ: u64 = 50;

// Input watchdog: fall back to neutral sticks after this long without a frame
pub const INPUT_TIMEOUT: Duration = Duration::from_millis(250);

// Zenoh topics
pub const TOPIC_INPUT_RAW: &str = "teleop/input/raw"; // joystick frames
pub const TOPIC_INPUT_FIELD_RELATIVE: &str = "teleop/input/field_relative"; // framing toggle
pub const TOPIC_CMD_BASE: &str = "teleop/cmd/base"; // velocity commands
pub const TOPIC_HEALTH: &str = "teleop/state/health"; // health status

// Hard dead-zones on the raw (negated) stick values
pub const FORWARD_DEADBAND: f64 = 0.25;
pub const STRAFE_DEADBAND: f64 = 0.35;
pub const ROTATION_DEADBAND: f64 = 0.40;

// Physical limits at full stick
pub const MAX_LINEAR_SPEED: f64 = 4.0; // m/s
pub const MAX_ANGULAR_SPEED: f64 = TAU; // rad/s

// Slew limits on the normalized stick signal, units per second
pub const MAX_LINEAR_ACCEL: f64 = 3.0;
pub const MAX_ANGULAR_ACCEL: f64 = 3.0;

// Throttle slider never scales below this
pub const SLIDER_FLOOR: f64 = 0.15;

// Final continuous deadbands as (threshold, max)
pub const FINAL_DEADBAND_LINEAR: (f64, f64) = (0.1, 1.0);
pub const FINAL_DEADBAND_ROTATION: (f64, f64) = (0.3, 0.75);

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Rate limit must be finite and non-negative, got {0}")]
    InvalidRateLimit(f64),

    #[error("{name} = {value} is out of range (expected {expected})")]
    OutOfRange {
        name: &'static str,
        value: f64,
        expected: &'static str,
    },

    #[error("Deadband threshold {threshold} must be in [0, max) with max = {max}")]
    InvalidDeadband { threshold: f64, max: f64 },

    #[error("Loop rate {0} Hz has no usable cycle period")]
    InvalidLoopRate(u64),
}

/// Fixed numeric configuration for the command shaper
///
/// Every field falls back to the compiled default when missing from a config file.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct ShapingConstants {
    pub forward_deadband: f64,
    pub strafe_deadband: f64,
    pub rotation_deadband: f64,
    pub max_linear_speed: f64,
    pub max_angular_speed: f64,
    pub max_linear_accel: f64,
    pub max_angular_accel: f64,
    pub slider_floor: f64,
    pub final_deadband_linear: ContinuousDeadband,
    pub final_deadband_rotation: ContinuousDeadband,
}

impl Default for ShapingConstants {
    fn default() -> Self {
        Self {
            forward_deadband: FORWARD_DEADBAND,
            strafe_deadband: STRAFE_DEADBAND,
            rotation_deadband: ROTATION_DEADBAND,
            max_linear_speed: MAX_LINEAR_SPEED,
            max_angular_speed: MAX_ANGULAR_SPEED,
            max_linear_accel: MAX_LINEAR_ACCEL,
            max_angular_accel: MAX_ANGULAR_ACCEL,
            slider_floor: SLIDER_FLOOR,
            final_deadband_linear: ContinuousDeadband {
                threshold: FINAL_DEADBAND_LINEAR.0,
                max: FINAL_DEADBAND_LINEAR.1,
            },
            final_deadband_rotation: ContinuousDeadband {
                threshold: FINAL_DEADBAND_ROTATION.0,
                max: FINAL_DEADBAND_ROTATION.1,
            },
        }
    }
}

impl ShapingConstants {
    /// Load overrides from a JSON file and validate the result
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let constants: Self = serde_json::from_str(text)?;
        constants.validate()?;
        Ok(constants)
    }

    /// Reject values that would make the per-cycle arithmetic meaningless
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("forward_deadband", self.forward_deadband),
            ("strafe_deadband", self.strafe_deadband),
            ("rotation_deadband", self.rotation_deadband),
        ] {
            if !(0.0..1.0).contains(&value) {
                return Err(ConfigError::OutOfRange {
                    name,
                    value,
                    expected: "[0, 1)",
                });
            }
        }

        for (name, value) in [
            ("max_linear_speed", self.max_linear_speed),
            ("max_angular_speed", self.max_angular_speed),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::OutOfRange {
                    name,
                    value,
                    expected: "finite and >= 0",
                });
            }
        }

        for value in [self.max_linear_accel, self.max_angular_accel] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidRateLimit(value));
            }
        }

        if !(0.0..=1.0).contains(&self.slider_floor) {
            return Err(ConfigError::OutOfRange {
                name: "slider_floor",
                value: self.slider_floor,
                expected: "[0, 1]",
            });
        }

        self.final_deadband_linear.validate()?;
        self.final_deadband_rotation.validate()?;
        Ok(())
    }
}

/// Command line options for the runtime binary
#[derive(Debug, Parser)]
#[command(version, about = "Shapes joystick input into chassis velocity commands")]
pub struct RuntimeArgs {
    /// JSON file overriding the default shaping constants
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Control loop frequency in Hz
    #[arg(long, default_value_t = LOOP_HZ)]
    pub loop_hz: u64,

    /// Start in field-relative framing
    #[arg(long)]
    pub field_relative: bool,
}

impl RuntimeArgs {
    pub fn shaping_constants(&self) -> Result<ShapingConstants, ConfigError> {
        match &self.config {
            Some(path) => ShapingConstants::from_json_file(path),
            None => Ok(ShapingConstants::default()),
        }
    }

    /// Cycle period; `dt` for the rate limiters
    pub fn period(&self) -> Result<Duration, ConfigError> {
        if self.loop_hz == 0 {
            return Err(ConfigError::InvalidLoopRate(self.loop_hz));
        }
        // Rates above 1 GHz round to a zero period
        let period = Duration::from_secs_f64(1.0 / self.loop_hz as f64);
        if period.is_zero() {
            return Err(ConfigError::InvalidLoopRate(self.loop_hz));
        }
        Ok(period)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let constants = ShapingConstants::default();
        assert!(constants.validate().is_ok());
        assert_eq!(constants.forward_deadband, 0.25);
        assert_eq!(constants.strafe_deadband, 0.35);
        assert_eq!(constants.rotation_deadband, 0.40);
        assert_eq!(constants.slider_floor, 0.15);
        assert_eq!(constants.final_deadband_rotation.max, 0.75);
    }

    #[test]
    fn test_partial_override_keeps_defaults() {
        let constants =
            ShapingConstants::from_json_str(r#"{"max_linear_speed": 2.5}"#).unwrap();
        assert_eq!(constants.max_linear_speed, 2.5);
        assert_eq!(constants.max_angular_speed, MAX_ANGULAR_SPEED);
        assert_eq!(constants.final_deadband_linear.threshold, 0.1);
    }

    #[test]
    fn test_negative_acceleration_rejected() {
        let err = ShapingConstants::from_json_str(r#"{"max_angular_accel": -1.0}"#).unwrap_err();
        assert!(
            matches!(err, ConfigError::InvalidRateLimit(v) if v == -1.0),
            "unexpected error: {err}"
        );
    }

    #[test]
    fn test_zero_acceleration_accepted() {
        let constants = ShapingConstants::from_json_str(r#"{"max_linear_accel": 0.0}"#).unwrap();
        assert_eq!(constants.max_linear_accel, 0.0);
    }

    #[test]
    fn test_bad_final_deadband_rejected() {
        let json = r#"{"final_deadband_rotation": {"threshold": 0.8, "max": 0.75}}"#;
        let err = ShapingConstants::from_json_str(json).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidDeadband { .. }));
    }

    #[test]
    fn test_deadband_out_of_range_rejected() {
        let err = ShapingConstants::from_json_str(r#"{"strafe_deadband": 1.5}"#).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::OutOfRange {
                name: "strafe_deadband",
                ..
            }
        ));
    }

    #[test]
    fn test_missing_file_reports_path() {
        let err = ShapingConstants::from_json_file(Path::new("/nonexistent/shaping.json"))
            .unwrap_err();
        assert!(err.to_string().contains("/nonexistent/shaping.json"));
    }

    #[test]
    fn test_period_from_loop_rate() {
        let args = RuntimeArgs::parse_from(["teleop-drive-shaper", "--loop-hz", "100"]);
        assert_eq!(args.period().unwrap(), Duration::from_millis(10));
        assert!(!args.field_relative);

        let args = RuntimeArgs::parse_from(["teleop-drive-shaper", "--loop-hz", "0"]);
        assert!(matches!(args.period(), Err(ConfigError::InvalidLoopRate(0))));
    }

    #[test]
    fn test_loop_rate_too_high_for_period() {
        let args = RuntimeArgs::parse_from(["teleop-drive-shaper", "--loop-hz", "10000000000"]);
        assert!(matches!(
            args.period(),
            Err(ConfigError::InvalidLoopRate(10_000_000_000))
        ));

        // 1 GHz is still a 1 ns period
        let args = RuntimeArgs::parse_from(["teleop-drive-shaper", "--loop-hz", "1000000000"]);
        assert_eq!(args.period().unwrap(), Duration::from_nanos(1));
    }
}
