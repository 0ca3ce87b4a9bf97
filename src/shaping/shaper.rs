// Raw joystick sample -> bounded chassis velocity command

use std::time::Duration;

use super::deadband::hard_deadband;
use super::slew::RateLimiterState;
use super::throttle::throttle_scale;
use crate::config::{ConfigError, ShapingConstants};
use crate::input::FieldRelativeSource;
use crate::messages::{ModeFlags, RawInputSample, VelocityCommand};

/// Stateful per-cycle transform from stick values to a velocity command
///
/// Owns one rate limiter per controlled axis. Calling `step` twice with the
/// same sample gives different results because the limiters remember their
/// last output.
pub struct DriveCommandShaper<F> {
    constants: ShapingConstants,
    field_relative: F,
    dt: f64,
    x_limiter: RateLimiterState,
    y_limiter: RateLimiterState,
    rot_limiter: RateLimiterState,
}

impl<F: FieldRelativeSource> DriveCommandShaper<F> {
    /// Build a shaper that is stepped once every `period`
    pub fn new(
        constants: ShapingConstants,
        field_relative: F,
        period: Duration,
    ) -> Result<Self, ConfigError> {
        constants.validate()?;
        Ok(Self {
            x_limiter: RateLimiterState::new(constants.max_linear_accel)?,
            y_limiter: RateLimiterState::new(constants.max_linear_accel)?,
            rot_limiter: RateLimiterState::new(constants.max_angular_accel)?,
            constants,
            field_relative,
            dt: period.as_secs_f64(),
        })
    }

    /// Run one control cycle
    ///
    /// Stage order matters: limiting happens on the normalized signal,
    /// physical scaling after it.
    pub fn step(&mut self, sample: &RawInputSample, flags: ModeFlags) -> VelocityCommand {
        let c = &self.constants;

        // Controller "up"/"right" reads negative
        let x = -sample.forward;
        let y = -sample.strafe;
        let rot = -sample.rotation;

        let x = hard_deadband(x, c.forward_deadband);
        let y = hard_deadband(y, c.strafe_deadband);
        let rot = hard_deadband(rot, c.rotation_deadband);

        let x = self.x_limiter.advance(x, self.dt) * c.max_linear_speed;
        let y = self.y_limiter.advance(y, self.dt) * c.max_linear_speed;
        let rot = self.rot_limiter.advance(rot, self.dt) * c.max_angular_speed;

        let scale = throttle_scale(sample.slider, c.slider_floor);
        let (x, y, rot) = (x * scale, y * scale, rot * scale);

        let x_speed = -c.final_deadband_linear.apply(x);
        let y_speed = -c.final_deadband_linear.apply(y);
        let rot = -c.final_deadband_rotation.apply(rot);

        // Inverted wins over strafe-only; y is never flipped
        if flags.inverted {
            VelocityCommand::new(-x_speed, y_speed, -rot, self.field_relative.field_relative())
        } else if flags.strafe_only {
            VelocityCommand::new(0.0, y_speed, 0.0, false)
        } else {
            VelocityCommand::new(x_speed, y_speed, rot, self.field_relative.field_relative())
        }
    }

    pub fn constants(&self) -> &ShapingConstants {
        &self.constants
    }

    /// Cycle period in seconds
    pub fn dt(&self) -> f64 {
        self.dt
    }

    /// Limiter outputs as (x, y, rotation), in normalized stick units
    pub fn limiter_outputs(&self) -> (f64, f64, f64) {
        (
            self.x_limiter.last_output(),
            self.y_limiter.last_output(),
            self.rot_limiter.last_output(),
        )
    }
}
