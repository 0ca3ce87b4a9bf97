// Scheduler-facing teleop drive command
//
// The scheduler calls `on_start` once, `on_cycle` every control tick, and
// `on_end` when the command is superseded. Teleop never finishes on its own.

use tracing::debug;

use crate::input::{FieldRelativeSource, InputSource};
use crate::messages::{AxisId, ModeFlag, ModeFlags, RawInputSample, VelocityCommand};
use crate::shaping::DriveCommandShaper;

/// Lifecycle hooks driven by an external scheduler
pub trait Command {
    fn on_start(&mut self) {}

    fn on_cycle(&mut self);

    fn on_end(&mut self, _interrupted: bool) {}

    fn is_done(&self) -> bool;
}

/// Drive collaborator that actuates each velocity command
pub trait DriveSink {
    fn drive(&mut self, command: VelocityCommand);
}

/// Keeps the most recent command for someone else to publish
#[derive(Debug, Default)]
pub struct LatchedDrive {
    latest: Option<VelocityCommand>,
}

impl LatchedDrive {
    pub fn latest(&self) -> Option<VelocityCommand> {
        self.latest
    }

    /// Latest command, or a stop if nothing has been commanded yet
    pub fn latest_or_stop(&self) -> VelocityCommand {
        self.latest.unwrap_or_default()
    }
}

impl DriveSink for LatchedDrive {
    fn drive(&mut self, command: VelocityCommand) {
        self.latest = Some(command);
    }
}

/// Persistent teleop command: stick input in, shaped velocity out
pub struct TeleopDrive<I, D, F> {
    input: I,
    drive: D,
    shaper: DriveCommandShaper<F>,
}

impl<I, D, F> TeleopDrive<I, D, F>
where
    I: InputSource,
    D: DriveSink,
    F: FieldRelativeSource,
{
    pub fn new(input: I, drive: D, shaper: DriveCommandShaper<F>) -> Self {
        Self {
            input,
            drive,
            shaper,
        }
    }

    pub fn input(&self) -> &I {
        &self.input
    }

    pub fn input_mut(&mut self) -> &mut I {
        &mut self.input
    }

    pub fn drive(&self) -> &D {
        &self.drive
    }

    pub fn shaper(&self) -> &DriveCommandShaper<F> {
        &self.shaper
    }

    fn read_inputs(&self) -> (RawInputSample, ModeFlags) {
        let sample = RawInputSample::new(
            self.input.read_axis(AxisId::Forward),
            self.input.read_axis(AxisId::Strafe),
            self.input.read_axis(AxisId::Rotation),
            self.input.read_axis(AxisId::Slider),
        );
        let flags = ModeFlags {
            strafe_only: self.input.read_flag(ModeFlag::StrafeOnly),
            inverted: self.input.read_flag(ModeFlag::Inverted),
        };
        (sample, flags)
    }
}

impl<I, D, F> Command for TeleopDrive<I, D, F>
where
    I: InputSource,
    D: DriveSink,
    F: FieldRelativeSource,
{
    fn on_start(&mut self) {
        debug!("Teleop drive started");
    }

    fn on_cycle(&mut self) {
        self.input.begin_cycle();
        let (sample, flags) = self.read_inputs();
        let command = self.shaper.step(&sample, flags);
        debug!("Shaped {:?} {:?} -> {:?}", sample, flags, command);
        self.drive.drive(command);
    }

    fn on_end(&mut self, interrupted: bool) {
        debug!("Teleop drive ended (interrupted: {})", interrupted);
    }

    fn is_done(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::config::ShapingConstants;
    use crate::input::{FixedInput, ScriptedInput};
    use crate::messages::InputFrame;

    const PERIOD: Duration = Duration::from_millis(20);

    fn teleop<I: InputSource>(input: I) -> TeleopDrive<I, LatchedDrive, bool> {
        let shaper = DriveCommandShaper::new(ShapingConstants::default(), true, PERIOD).unwrap();
        TeleopDrive::new(input, LatchedDrive::default(), shaper)
    }

    fn frame(forward: f64, strafe: f64, strafe_only: bool, inverted: bool) -> InputFrame {
        InputFrame {
            sample: RawInputSample::new(forward, strafe, 0.0, -1.0),
            flags: ModeFlags {
                strafe_only,
                inverted,
            },
        }
    }

    #[test]
    fn test_never_done() {
        let inputs = [
            frame(0.0, 0.0, false, false),
            frame(1.0, -1.0, true, false),
            frame(-1.0, 1.0, false, true),
            frame(0.5, 0.5, true, true),
        ];
        let mut cmd = teleop(ScriptedInput::new(inputs));
        assert!(!cmd.is_done());
        cmd.on_start();
        for _ in 0..inputs.len() * 3 {
            cmd.on_cycle();
            assert!(!cmd.is_done());
        }
        cmd.on_end(true);
        assert!(!cmd.is_done());
    }

    #[test]
    fn test_cycle_forwards_command_to_drive() {
        let input = FixedInput::new(RawInputSample::new(0.0, 0.0, 0.0, -1.0), ModeFlags::default());
        let mut cmd = teleop(input);
        assert!(cmd.drive().latest().is_none());
        assert!(cmd.drive().latest_or_stop().is_stopped());

        cmd.on_start();
        cmd.on_cycle();
        let out = cmd.drive().latest().unwrap();
        assert!(out.is_stopped());
        assert!(out.field_relative);
    }

    #[test]
    fn test_cycle_reads_fresh_input() {
        let mut cmd = teleop(FixedInput::default());
        cmd.on_start();
        cmd.input_mut().sample = RawInputSample::new(1.0, 0.0, 0.0, -1.0);
        cmd.on_cycle();
        assert!(cmd.drive().latest().unwrap().vx > 0.0);

        cmd.input_mut().flags.strafe_only = true;
        cmd.on_cycle();
        let out = cmd.drive().latest().unwrap();
        assert_eq!(out.vx, 0.0);
        assert!(!out.field_relative);
    }

    #[test]
    fn test_limiters_survive_reschedule() {
        let input = FixedInput::new(RawInputSample::new(1.0, 0.0, 0.0, -1.0), ModeFlags::default());
        let mut cmd = teleop(input);
        cmd.on_start();
        for _ in 0..100 {
            cmd.on_cycle();
        }
        let before = cmd.shaper().limiter_outputs();
        let last = cmd.drive().latest().unwrap();

        cmd.on_end(true);
        cmd.on_start();
        assert_eq!(cmd.shaper().limiter_outputs(), before);

        // Still at speed on the first cycle after re-scheduling
        cmd.on_cycle();
        let next = cmd.drive().latest().unwrap();
        assert!((next.vx - last.vx).abs() < 1e-9, "vx dropped from {} to {}", last.vx, next.vx);
    }

    #[test]
    fn test_scripted_mode_switch() {
        let mut cmd = teleop(ScriptedInput::new([
            frame(1.0, 1.0, false, false),
            frame(1.0, 1.0, false, true),
        ]));
        cmd.on_start();
        cmd.on_cycle();
        let normal = cmd.drive().latest().unwrap();
        cmd.on_cycle();
        let inverted = cmd.drive().latest().unwrap();
        assert!(normal.vx > 0.0);
        assert!(inverted.vx < 0.0);
        assert!(inverted.vy > 0.0);
    }
}
