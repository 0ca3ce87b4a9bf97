// Input capabilities consumed by the teleop command
//
// Axis and flag values are read fresh every cycle through `InputSource`.
// The ambient field-relative flag is read through `FieldRelativeSource`.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use tracing::{info, warn};

use crate::messages::{AxisId, InputFrame, ModeFlag, ModeFlags, RawInputSample, RuntimeHealth};

/// Source of raw joystick axes and mode switches
pub trait InputSource {
    /// Called once at the start of every cycle, before any reads
    fn begin_cycle(&mut self) {}

    fn read_axis(&self, id: AxisId) -> f64;

    fn read_flag(&self, flag: ModeFlag) -> bool;
}

/// Read-only view of the drive's field-relative flag
pub trait FieldRelativeSource {
    fn field_relative(&self) -> bool;
}

impl FieldRelativeSource for bool {
    fn field_relative(&self) -> bool {
        *self
    }
}

/// Field-relative flag shared between the operator toggle and the shaper
#[derive(Debug, Clone, Default)]
pub struct SharedFieldRelative(Arc<AtomicBool>);

impl SharedFieldRelative {
    pub fn new(initial: bool) -> Self {
        Self(Arc::new(AtomicBool::new(initial)))
    }

    pub fn set(&self, field_relative: bool) {
        let previous = self.0.swap(field_relative, Ordering::Relaxed);
        if previous != field_relative {
            info!(
                "Drive framing: {}",
                if field_relative { "field-relative" } else { "robot-relative" }
            );
        }
    }

    pub fn toggle(&self) -> bool {
        let next = !self.0.load(Ordering::Relaxed);
        self.set(next);
        next
    }
}

impl FieldRelativeSource for SharedFieldRelative {
    fn field_relative(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Constant input, for tests and bench runs
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedInput {
    pub sample: RawInputSample,
    pub flags: ModeFlags,
}

impl FixedInput {
    pub fn new(sample: RawInputSample, flags: ModeFlags) -> Self {
        Self { sample, flags }
    }
}

impl InputSource for FixedInput {
    fn read_axis(&self, id: AxisId) -> f64 {
        self.sample.axis(id)
    }

    fn read_flag(&self, flag: ModeFlag) -> bool {
        self.flags.flag(flag)
    }
}

/// Plays back a fixed sequence of frames, one per cycle
///
/// The last frame repeats once the script runs out.
#[derive(Debug, Clone, Default)]
pub struct ScriptedInput {
    pending: VecDeque<InputFrame>,
    current: InputFrame,
}

impl ScriptedInput {
    pub fn new(frames: impl IntoIterator<Item = InputFrame>) -> Self {
        Self {
            pending: frames.into_iter().collect(),
            current: InputFrame::default(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.pending.len()
    }
}

impl InputSource for ScriptedInput {
    fn begin_cycle(&mut self) {
        if let Some(frame) = self.pending.pop_front() {
            self.current = frame;
        }
    }

    fn read_axis(&self, id: AxisId) -> f64 {
        self.current.sample.axis(id)
    }

    fn read_flag(&self, flag: ModeFlag) -> bool {
        self.current.flags.flag(flag)
    }
}

/// Latest frame from the operator station, with a staleness watchdog
///
/// Once no frame has arrived for `timeout`, reads return a neutral frame so
/// the rate limiters bring the base to rest.
#[derive(Debug)]
pub struct LatestInput {
    latest: Option<InputFrame>,
    received_at: Instant,
    timeout: Duration,
    current: InputFrame,
    health: RuntimeHealth,
}

impl LatestInput {
    pub fn new(timeout: Duration) -> Self {
        Self {
            latest: None,
            received_at: Instant::now(),
            timeout,
            current: Self::neutral(),
            health: RuntimeHealth::InputStale, // Start stale until first frame
        }
    }

    fn neutral() -> InputFrame {
        InputFrame {
            sample: RawInputSample::neutral(),
            flags: ModeFlags::default(),
        }
    }

    /// Record a frame received at `now`
    pub fn push_at(&mut self, frame: InputFrame, now: Instant) {
        self.latest = Some(frame);
        self.received_at = now;
    }

    pub fn push(&mut self, frame: InputFrame) {
        self.push_at(frame, Instant::now());
    }

    /// Select the frame to use this cycle based on its age at `now`
    pub fn refresh(&mut self, now: Instant) {
        let age = now.saturating_duration_since(self.received_at);

        match self.latest {
            Some(frame) if age <= self.timeout => {
                self.health = RuntimeHealth::Ok;
                self.current = frame;
            }
            Some(_) => {
                // Watchdog triggered - neutral sticks
                if self.health != RuntimeHealth::InputStale {
                    warn!("Input stale ({:?} old), releasing sticks", age);
                }
                self.health = RuntimeHealth::InputStale;
                self.current = Self::neutral();
            }
            None => {
                // No frame ever received
                self.health = RuntimeHealth::InputStale;
                self.current = Self::neutral();
            }
        }
    }

    pub fn health(&self) -> RuntimeHealth {
        self.health
    }
}

impl InputSource for LatestInput {
    fn begin_cycle(&mut self) {
        self.refresh(Instant::now());
    }

    fn read_axis(&self, id: AxisId) -> f64 {
        self.current.sample.axis(id)
    }

    fn read_flag(&self, flag: ModeFlag) -> bool {
        self.current.flags.flag(flag)
    }
}
