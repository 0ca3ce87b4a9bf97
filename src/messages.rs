// Define message types for the shaper and runtime

use serde::{Deserialize, Serialize};

/// Raw controller axes consumed each cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AxisId {
    Forward,
    Strafe,
    Rotation,
    Slider,
}

/// Operator mode switches consumed each cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModeFlag {
    StrafeOnly,
    Inverted,
}

// One reading of every joystick axis, each nominally in [-1, 1]
// Slider convention: -1 = full speed, +1 = minimum speed
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RawInputSample {
    pub forward: f64,
    pub strafe: f64,
    pub rotation: f64,
    pub slider: f64,
}

impl RawInputSample {
    pub fn new(forward: f64, strafe: f64, rotation: f64, slider: f64) -> Self {
        Self {
            forward,
            strafe,
            rotation,
            slider,
        }
    }

    /// Sticks centered, slider at full speed
    pub fn neutral() -> Self {
        Self::new(0.0, 0.0, 0.0, -1.0)
    }

    pub fn axis(&self, id: AxisId) -> f64 {
        match id {
            AxisId::Forward => self.forward,
            AxisId::Strafe => self.strafe,
            AxisId::Rotation => self.rotation,
            AxisId::Slider => self.slider,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ModeFlags {
    pub strafe_only: bool,
    pub inverted: bool,
}

impl ModeFlags {
    pub fn flag(&self, flag: ModeFlag) -> bool {
        match flag {
            ModeFlag::StrafeOnly => self.strafe_only,
            ModeFlag::Inverted => self.inverted,
        }
    }
}

// Operator station -> runtime
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct InputFrame {
    pub sample: RawInputSample,
    #[serde(default)]
    pub flags: ModeFlags,
}

// Operator station -> runtime, writes the ambient framing flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldRelativeToggle {
    pub field_relative: bool,
}

/// Chassis velocity handed to the drive controller
///
/// `vx`/`vy` in m/s, `omega` in rad/s. Default is a robot-relative stop.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct VelocityCommand {
    pub vx: f64,
    pub vy: f64,
    pub omega: f64,
    pub field_relative: bool,
}

impl VelocityCommand {
    pub fn new(vx: f64, vy: f64, omega: f64, field_relative: bool) -> Self {
        Self {
            vx,
            vy,
            omega,
            field_relative,
        }
    }

    pub fn is_stopped(&self) -> bool {
        self.vx == 0.0 && self.vy == 0.0 && self.omega == 0.0
    }
}

/// Health status published by runtime
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum RuntimeHealth {
    Ok,
    InputStale,
}
