// Fixed-rate teleop loop with input watchdog
// Each tick drains joystick frames, runs one shaping cycle, and publishes the
// resulting velocity command. If the operator station goes quiet the sticks
// are released and the rate limiters ramp the base down.

use tokio::time::interval;
use tracing::{info, warn};

use crate::command::{Command, LatchedDrive, TeleopDrive};
use crate::config::{
    INPUT_TIMEOUT, RuntimeArgs, TOPIC_CMD_BASE, TOPIC_HEALTH, TOPIC_INPUT_FIELD_RELATIVE,
    TOPIC_INPUT_RAW,
};
use crate::input::{LatestInput, SharedFieldRelative};
use crate::messages::{FieldRelativeToggle, InputFrame};
use crate::shaping::DriveCommandShaper;

pub async fn run(args: RuntimeArgs) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let constants = args.shaping_constants()?;
    let period = args.period()?;
    info!("Shaping constants: {:?}", constants);

    let field_relative = SharedFieldRelative::new(args.field_relative);
    let shaper = DriveCommandShaper::new(constants, field_relative.clone(), period)?;
    let mut teleop = TeleopDrive::new(
        LatestInput::new(INPUT_TIMEOUT),
        LatchedDrive::default(),
        shaper,
    );

    info!("Opening Zenoh session...");
    let session = zenoh::open(zenoh::Config::default()).await?;

    info!("Setting up publishers and subscribers...");
    let sub_input = session.declare_subscriber(TOPIC_INPUT_RAW).await?;
    let sub_framing = session.declare_subscriber(TOPIC_INPUT_FIELD_RELATIVE).await?;
    let pub_cmd = session.declare_publisher(TOPIC_CMD_BASE).await?;
    let pub_health = session.declare_publisher(TOPIC_HEALTH).await?;

    let mut tick = interval(period);

    info!(
        "Runtime started: {}Hz loop, {}ms input timeout",
        args.loop_hz,
        INPUT_TIMEOUT.as_millis()
    );
    info!("Subscribed to: {}, {}", TOPIC_INPUT_RAW, TOPIC_INPUT_FIELD_RELATIVE);
    info!("Publishing to: {}, {}", TOPIC_CMD_BASE, TOPIC_HEALTH);

    teleop.on_start();

    loop {
        tick.tick().await;

        // 1. Drain all pending frames (non-blocking), keep latest
        while let Ok(Some(sample)) = sub_input.try_recv() {
            let payload = sample.payload().to_bytes();
            match serde_json::from_slice::<InputFrame>(&payload) {
                Ok(frame) => teleop.input_mut().push(frame),
                Err(e) => warn!("Failed to parse input frame: {}", e),
            }
        }

        // 2. Apply framing toggles before the cycle reads the flag
        while let Ok(Some(sample)) = sub_framing.try_recv() {
            let payload = sample.payload().to_bytes();
            match serde_json::from_slice::<FieldRelativeToggle>(&payload) {
                Ok(toggle) => field_relative.set(toggle.field_relative),
                Err(e) => warn!("Failed to parse framing toggle: {}", e),
            }
        }

        // 3. Shape (includes watchdog logic)
        teleop.on_cycle();

        // 4. Publish command
        let cmd_json = serde_json::to_string(&teleop.drive().latest_or_stop())?;
        pub_cmd.put(cmd_json).await?;

        // 5. Publish health
        let health_json = serde_json::to_string(&teleop.input().health())?;
        pub_health.put(health_json).await?;
    }
}

