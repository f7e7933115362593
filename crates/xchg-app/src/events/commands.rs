use std::sync::atomic::Ordering;

use xchg_core::Session;
use xchg_types::{CaptureRegion, Command, RegionSlot};

use super::EventContext;

pub async fn handle_command(
    ctx: &EventContext,
    session: &mut Session,
    command: Command,
) -> anyhow::Result<()> {
    tracing::info!(?command, "Command");

    match command {
        Command::Pause => {
            ctx.state.paused.store(true, Ordering::SeqCst);
            ctx.status("OCR paused.").await;
        }
        Command::Resume => {
            ctx.state.paused.store(false, Ordering::SeqCst);
            ctx.status("OCR resumed.").await;
            ctx.request_tick();
        }
        Command::Lock | Command::Unlock => {
            let locked = command == Command::Lock;
            ctx.state.config.write().await.regions.locked = locked;
            persist(ctx).await;
            ctx.status(if locked { "Regions locked." } else { "Regions unlocked." })
                .await;
        }
        Command::Swap => {
            let swapped = {
                let mut config = ctx.state.config.write().await;
                config.calc.swap_sides = !config.calc.swap_sides;
                invalidate(ctx, session);
                config.calc.swap_sides
            };
            persist(ctx).await;
            ctx.status(if swapped {
                "Swapped left/right inputs."
            } else {
                "Using left/right inputs."
            })
            .await;
            ctx.request_tick();
        }
        Command::SetMode(mode) => {
            ctx.state.config.write().await.calc.mode = mode;
            session.set_mode(mode);
            persist(ctx).await;
            ctx.status(format!("Mode set to {}.", mode.label())).await;
            ctx.request_tick();
        }
        Command::SetRegion { slot, region } => {
            set_region(ctx, session, slot, region).await;
        }
        Command::Status => {
            ctx.status(describe(ctx).await).await;
        }
        Command::Quit => {
            tracing::info!("Quit requested");
            ctx.cancel.cancel();
        }
    }

    Ok(())
}

async fn set_region(
    ctx: &EventContext,
    session: &mut Session,
    slot: RegionSlot,
    region: CaptureRegion,
) {
    let complete = {
        let mut config = ctx.state.config.write().await;
        if config.regions.locked {
            drop(config);
            ctx.status("Regions are locked. Unlock to reselect.").await;
            return;
        }
        if !region.is_selectable() {
            drop(config);
            ctx.status(format!(
                "Region too small: {region}. Select at least {min}x{min} pixels.",
                min = CaptureRegion::MIN_SELECTION
            ))
            .await;
            return;
        }
        config.regions.set(slot, region);
        invalidate(ctx, session);
        config.regions.is_complete()
    };

    persist(ctx).await;

    if complete {
        ctx.status("Regions selected. Running OCR...").await;
        ctx.request_tick();
    } else {
        let name = match slot {
            RegionSlot::Ratio => "Ratio region",
            RegionSlot::Left => "Left box region",
            RegionSlot::Right => "Right box region",
        };
        ctx.status(format!("{name} set.")).await;
    }
}

/// Readings taken with the old setup no longer apply. Call with the config
/// write guard held so a tick never pairs old settings with the new generation.
fn invalidate(ctx: &EventContext, session: &mut Session) {
    session.reset();
    ctx.state.bump_generation();
}

async fn persist(ctx: &EventContext) {
    if let Err(e) = ctx.state.save_config().await {
        tracing::error!("Failed to save config: {e:#}");
    }
}

async fn describe(ctx: &EventContext) -> String {
    let config = ctx.state.config.read().await;
    let on_off = |flag: bool| if flag { "on" } else { "off" };

    format!(
        "Paused: {} | Locked: {} | Swap: {} | Mode: {}\n{}",
        on_off(ctx.state.is_paused()),
        on_off(config.regions.locked),
        on_off(config.calc.swap_sides),
        config.calc.mode.label(),
        config.regions.describe()
    )
}
