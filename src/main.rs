use clap::Parser;
use tracing_subscriber::EnvFilter;

use teleop_drive_shaper::config::RuntimeArgs;

#[tokio::main]
async fn main() {
    // Setup logging (set RUST_LOG=info or debug)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init(); // installs the subscriber globally

    let args = RuntimeArgs::parse();

    if let Err(e) = teleop_drive_shaper::runtime::run(args).await {
        eprintln!("Runtime error: {}", e);
        std::process::exit(1);
    }
}
