//! Proton pack controller binary
//!
//! Wires the controller against the simulator backends (console LEDs and
//! clips, REPL-driven buttons). A real pack swaps the backend
//! construction below for GPIO/mixer implementations of the same traits;
//! nothing in the core changes.

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use proton_pack::cli::{self, SimInputs};
use proton_pack::config::{self, ControllerConfig};
use proton_pack::hal::{ClipSet, ConsoleClip, ConsoleOutput, DigitalInput, Hardware};
use proton_pack::router::Controller;

/// Proton pack controller - LED sequencers and sound cues from three buttons
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Log level (error, warn, info, debug, trace)
    #[arg(short, long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Run without the REPL, idling until ctrl-c (hardware harness mode)
    #[arg(long)]
    headless: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let args = Args::parse();
    init_logging(&args.log_level)?;

    info!("Starting proton pack controller...");

    let inputs = SimInputs::new();
    let hardware = sim_hardware(&inputs);

    let controller = Controller::wire(&ControllerConfig::default(), hardware)?;
    info!(
        "Controller ready: {} power cell LEDs, {} cyclotron LEDs",
        config::POWER_CELL_PINS.len(),
        config::CYCLOTRON_PINS.len()
    );

    if args.headless {
        shutdown_signal().await;
    } else {
        tokio::select! {
            result = cli::run_repl(&controller, &inputs) => result?,
            _ = shutdown_signal() => {}
        }
    }

    info!("Proton pack controller shutdown complete");
    Ok(())
}

/// Console LEDs and clips labelled with the real pin numbers and clip
/// paths, plus the REPL-driven buttons.
fn sim_hardware(inputs: &SimInputs) -> Hardware {
    Hardware {
        power_switch: Arc::clone(&inputs.power) as Arc<dyn DigitalInput>,
        fire_button: Arc::clone(&inputs.fire) as Arc<dyn DigitalInput>,
        theme_button: Arc::clone(&inputs.theme) as Arc<dyn DigitalInput>,
        power_cell_leds: config::POWER_CELL_PINS
            .iter()
            .map(|&pin| Arc::new(ConsoleOutput::new("power_cell", pin)) as _)
            .collect(),
        cyclotron_leds: config::CYCLOTRON_PINS
            .iter()
            .map(|&pin| Arc::new(ConsoleOutput::new("cyclotron", pin)) as _)
            .collect(),
        clips: ClipSet {
            power_up: Arc::new(ConsoleClip::new(config::POWER_UP_CLIP)),
            power_down: Arc::new(ConsoleClip::new(config::POWER_DOWN_CLIP)),
            firing: Arc::new(ConsoleClip::new(config::FIRING_CLIP)),
            firing_release: Arc::new(ConsoleClip::new(config::FIRING_RELEASE_CLIP)),
            theme: Arc::new(ConsoleClip::new(config::THEME_CLIP)),
        },
    }
}

fn init_logging(level: &str) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_thread_names(false),
        )
        .init();

    Ok(())
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install CTRL+C signal handler");
    info!("Shutdown signal received");
}
