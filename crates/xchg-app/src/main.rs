use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use xchg_config::Config;
use xchg_ocr::ScreenGrabber;
use xchg_types::{CaptureRegion, RegionSlot};

pub mod controller;
pub mod events;
pub mod io;
pub mod logging;
pub mod profile;
pub mod sampler;
pub mod state;
pub mod ui;

#[cfg(test)]
mod tests;

use self::controller::AppController;
use self::state::AppState;

#[derive(Parser, Debug)]
#[command(
    name = "xchg",
    version,
    about = "Reads an in-game exchange ratio off the screen and recommends the matching amount"
)]
struct Cli {
    /// Config file; defaults to $XCHG_CONFIG, then ./config.json
    #[arg(long, short)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<CliCommand>,
}

#[derive(Subcommand, Debug)]
enum CliCommand {
    /// Sample the screen and print recommendations until quit (default)
    Run,
    /// Store a capture region: ratio, left ("I have") or right ("I want")
    #[command(allow_negative_numbers = true)]
    SetRegion {
        slot: RegionSlot,
        x: i32,
        y: i32,
        width: u32,
        height: u32,
    },
    /// Print the effective configuration
    ShowConfig,
    /// Probe the configured OCR engine
    CheckOcr,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config_path = profile::resolve_config_path(cli.config);
    let config = profile::load_config(&config_path)?;

    match cli.command.unwrap_or(CliCommand::Run) {
        CliCommand::Run => {
            let _guard = logging::init_logging(&config.log)?;
            if !config_path.exists() {
                tracing::info!("No config at {}, using defaults", config_path.display());
            }
            run(config, config_path).await
        }
        CliCommand::SetRegion {
            slot,
            x,
            y,
            width,
            height,
        } => set_region(&config_path, slot, CaptureRegion::new(x, y, width, height)),
        CliCommand::ShowConfig => {
            println!("# {}", config_path.display());
            println!("{}", serde_json::to_string_pretty(&config)?);
            Ok(())
        }
        CliCommand::CheckOcr => {
            let engine = state::build_engine(&config.ocr);
            let version = engine.check().await?;
            println!("{}: {version}", engine.name());
            Ok(())
        }
    }
}

async fn run(config: Config, config_path: PathBuf) -> anyhow::Result<()> {
    let engine = state::build_engine(&config.ocr);
    let engine_error = match engine.check().await {
        Ok(version) => {
            tracing::info!("OCR engine {} ready: {version}", engine.name());
            None
        }
        Err(e) => {
            tracing::error!("OCR engine {} unavailable: {e}", engine.name());
            ui::alert("xchg: OCR unavailable", &e.to_string());
            Some(e.to_string())
        }
    };

    let state = Arc::new(
        AppState::new(config, config_path, engine, Arc::new(ScreenGrabber::new()))
            .with_engine_error(engine_error),
    );

    let controller = AppController::new(state);
    let mut tasks = controller.spawn_tasks();
    let cancel = controller.cancel_token();

    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            if let Err(e) = result {
                tracing::error!("Failed to listen for Ctrl+C: {e}");
            }
            tracing::info!("Shutdown requested");
        }
        _ = cancel.cancelled() => {}
    }

    controller.shutdown();
    while let Some(result) = tasks.join_next().await {
        match result {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::error!("Task failed: {e:#}"),
            Err(e) => tracing::error!("Task panicked: {e}"),
        }
    }

    tracing::info!("Bye");
    Ok(())
}

fn set_region(config_path: &Path, slot: RegionSlot, region: CaptureRegion) -> anyhow::Result<()> {
    let config = profile::store_region(config_path, slot, region)?;

    println!("Saved {slot} region: {region}");
    println!("{}", config.regions.describe());
    Ok(())
}
