// Signal conditioning for teleop drive commands
//
// Provides:
// - Hard dead-zone and continuous deadband
// - Per-axis slew-rate limiting
// - Throttle slider scaling
// - The per-cycle DriveCommandShaper that composes them

pub mod deadband;
mod shaper;
pub mod slew;
pub mod throttle;

pub use deadband::{hard_deadband, ContinuousDeadband};
pub use shaper::DriveCommandShaper;
pub use slew::RateLimiterState;
pub use throttle::throttle_scale;
