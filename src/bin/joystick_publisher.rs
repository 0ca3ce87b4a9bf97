// Keyboard joystick: WASD sticks, Z/X rotate, R/F throttle, T strafe-only, I invert,
// G field-relative, Q quit
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode},
};
use std::time::{Duration, Instant};
use tracing::info;

use teleop_drive_shaper::config::{TOPIC_INPUT_FIELD_RELATIVE, TOPIC_INPUT_RAW};
use teleop_drive_shaper::messages::{FieldRelativeToggle, InputFrame, ModeFlags, RawInputSample};

// Slider positions, -1 = full speed
const SLIDER_STEPS: [f64; 3] = [1.0, 0.0, -1.0];
const SLIDER_LABELS: [&str; 3] = ["LOW", "MED", "HIGH"];
const INPUT_TIMEOUT_MS: u64 = 100; // Center sticks after this much time with no input

#[derive(Debug, Parser)]
#[command(about = "Keyboard joystick for the teleop runtime")]
struct Args {
    /// Runtime was started with --field-relative
    #[arg(long)]
    field_relative: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt().with_env_filter("info").init();
    let args = Args::parse();

    info!("Opening Zenoh session...");
    let session = zenoh::open(zenoh::Config::default()).await?;
    let pub_input = session.declare_publisher(TOPIC_INPUT_RAW).await?;
    let pub_framing = session.declare_publisher(TOPIC_INPUT_FIELD_RELATIVE).await?;

    info!("Controls: WASD=sticks, Z/X=rotate, R/F=throttle, Q=quit");
    info!("Modes: T=strafe-only, I=invert, G=field-relative");
    info!("Throttle: {}", SLIDER_LABELS[0]);

    enable_raw_mode()?;
    let result = run_joystick(&pub_input, &pub_framing, args.field_relative).await;
    disable_raw_mode()?;

    result
}

async fn run_joystick(
    pub_input: &zenoh::pubsub::Publisher<'_>,
    pub_framing: &zenoh::pubsub::Publisher<'_>,
    mut field_relative: bool,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let mut slider_idx: usize = 0;
    let mut flags = ModeFlags::default();

    // Persistent stick state
    let mut sample = RawInputSample::new(0.0, 0.0, 0.0, SLIDER_STEPS[slider_idx]);
    let mut last_stick_input = Instant::now();

    loop {
        // Poll for key with 20ms timeout (50Hz effective rate)
        if event::poll(Duration::from_millis(20))? {
            if let Event::Key(KeyEvent { code, kind, .. }) = event::read()? {
                let pressed = kind == KeyEventKind::Press || kind == KeyEventKind::Repeat;

                match code {
                    // Sticks read negative when pushed up or left
                    KeyCode::Char('w') if pressed => {
                        sample.forward = -1.0;
                        last_stick_input = Instant::now();
                    }
                    KeyCode::Char('s') if pressed => {
                        sample.forward = 1.0;
                        last_stick_input = Instant::now();
                    }
                    KeyCode::Char('a') if pressed => {
                        sample.strafe = -1.0;
                        last_stick_input = Instant::now();
                    }
                    KeyCode::Char('d') if pressed => {
                        sample.strafe = 1.0;
                        last_stick_input = Instant::now();
                    }

                    // Rotation
                    KeyCode::Char('z') if pressed => {
                        sample.rotation = -1.0;
                        last_stick_input = Instant::now();
                    }
                    KeyCode::Char('x') if pressed => {
                        sample.rotation = 1.0;
                        last_stick_input = Instant::now();
                    }

                    // Throttle slider
                    KeyCode::Char('r') if pressed => {
                        slider_idx = (slider_idx + 1).min(SLIDER_STEPS.len() - 1);
                        sample.slider = SLIDER_STEPS[slider_idx];
                        info!("Throttle: {}", SLIDER_LABELS[slider_idx]);
                    }
                    KeyCode::Char('f') if pressed => {
                        slider_idx = slider_idx.saturating_sub(1);
                        sample.slider = SLIDER_STEPS[slider_idx];
                        info!("Throttle: {}", SLIDER_LABELS[slider_idx]);
                    }

                    // Mode switches
                    KeyCode::Char('t') if pressed => {
                        flags.strafe_only = !flags.strafe_only;
                        info!("Strafe-only: {}", flags.strafe_only);
                    }
                    KeyCode::Char('i') if pressed => {
                        flags.inverted = !flags.inverted;
                        info!("Inverted: {}", flags.inverted);
                    }
                    KeyCode::Char('g') if pressed => {
                        let toggle = toggle_framing(&mut field_relative);
                        pub_framing.put(serde_json::to_string(&toggle)?).await?;
                        info!("Field-relative: {}", field_relative);
                    }

                    // Quit
                    KeyCode::Char('q') | KeyCode::Esc if pressed => break,

                    _ => {}
                }
            }
        }

        // Center sticks if no stick input for INPUT_TIMEOUT_MS
        if last_stick_input.elapsed() > Duration::from_millis(INPUT_TIMEOUT_MS) {
            sample.forward = 0.0;
            sample.strafe = 0.0;
            sample.rotation = 0.0;
        }

        // Always publish at ~50Hz
        let frame = InputFrame { sample, flags };
        pub_input.put(serde_json::to_string(&frame)?).await?;
    }

    Ok(())
}

/// Flip the local framing state and build the message announcing it
fn toggle_framing(field_relative: &mut bool) -> FieldRelativeToggle {
    *field_relative = !*field_relative;
    FieldRelativeToggle {
        field_relative: *field_relative,
    }
}
