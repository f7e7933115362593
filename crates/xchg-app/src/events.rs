use std::sync::Arc;

use kanal::{AsyncReceiver, AsyncSender};
use tokio_util::sync::CancellationToken;
use xchg_core::Session;
use xchg_types::{AppEvent, Snapshot};

use crate::state::AppState;

pub mod commands;
pub mod samples;

use commands::handle_command;
use samples::{handle_failure, handle_sample};

/// Shared handles for the event handlers
pub struct EventContext {
    pub state: Arc<AppState>,
    pub ui_tx: AsyncSender<AppEvent>,
    pub tick_tx: AsyncSender<AppEvent>,
    pub cancel: CancellationToken,
}

impl EventContext {
    pub async fn status(&self, message: impl Into<String>) {
        let status = message.into();
        tracing::debug!("Status: {status}");
        let _ = self
            .ui_tx
            .send(AppEvent::StatusUpdate {
                status,
                paused: self.state.is_paused(),
            })
            .await;
    }

    pub async fn show(&self, snapshot: Snapshot) {
        let _ = self.ui_tx.send(AppEvent::ShowSnapshot(snapshot)).await;
    }

    /// Ask the sampler for an immediate tick; a pending request already covers it
    pub fn request_tick(&self) {
        if let Err(e) = self.tick_tx.try_send(AppEvent::RequestTick) {
            tracing::debug!("Tick request not delivered: {e}");
        }
    }

    async fn announce_startup(&self) {
        let _ = self.ui_tx.send(AppEvent::BackendReady).await;

        if let Some(error) = &self.state.engine_error {
            self.status(error.clone()).await;
            return;
        }

        let missing = self.state.config.read().await.regions.missing();
        if missing.is_empty() {
            self.status("Regions loaded. Running OCR...").await;
        } else {
            let names: Vec<_> = missing.iter().map(|slot| slot.name()).collect();
            self.status(format!("Set regions: {}.", names.join(", "))).await;
        }
    }
}

/// App's main loop. Owns the session; nothing else touches it.
pub async fn event_loop(
    state: Arc<AppState>,
    to_app_rx: AsyncReceiver<AppEvent>,
    ui_tx: AsyncSender<AppEvent>,
    tick_tx: AsyncSender<AppEvent>,
    cancel: CancellationToken,
) -> anyhow::Result<()> {
    let mode = state.config.read().await.calc.mode;
    let mut session = Session::new(mode);
    let ctx = EventContext {
        state,
        ui_tx,
        tick_tx,
        cancel,
    };

    ctx.announce_startup().await;

    tracing::info!("Event loop started");
    loop {
        let event = tokio::select! {
            _ = ctx.cancel.cancelled() => break,
            event = to_app_rx.recv() => event,
        };
        let Ok(event) = event else {
            break;
        };

        handle_event(&ctx, &mut session, event).await?;
    }

    tracing::info!("Event loop stopping");
    Ok(())
}

async fn handle_event(
    ctx: &EventContext,
    session: &mut Session,
    event: AppEvent,
) -> anyhow::Result<()> {
    match event {
        AppEvent::SampleReady { generation, sample } => {
            if generation == ctx.state.generation() {
                handle_sample(ctx, session, sample).await;
            } else {
                tracing::debug!("Dropping sample from generation {generation}");
            }
        }
        AppEvent::SampleFailed { generation, message } => {
            if generation == ctx.state.generation() {
                handle_failure(ctx, session, message).await;
            }
        }
        AppEvent::Command(command) => {
            handle_command(ctx, session, command).await?;
        }
        AppEvent::StatusUpdate { status, .. } => {
            // Sampler-side notices
            ctx.status(status).await;
        }
        AppEvent::ShowSnapshot(_) | AppEvent::RequestTick | AppEvent::BackendReady => {
            // UI / sampler events, nothing to do here
        }
    }

    Ok(())
}
