use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;

use kanal::{AsyncReceiver, AsyncSender};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use xchg_ocr::{OcrError, RegionImages, read_sample};
use xchg_types::{AppEvent, CaptureRegion, Sample};

use crate::state::AppState;

const MIN_INTERVAL_MS: u64 = 100;

/// Why a tick did or did not start a capture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Started,
    Paused,
    Busy,
    MissingRegions,
}

/// Clears the busy flag when the in-flight tick ends, however it ends
struct BusyGuard(Arc<AppState>);

impl BusyGuard {
    fn acquire(state: &Arc<AppState>) -> Option<Self> {
        if state.ocr_busy.swap(true, Ordering::SeqCst) {
            return None;
        }
        Some(Self(state.clone()))
    }
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.0.ocr_busy.store(false, Ordering::SeqCst);
    }
}

/// Periodic capture loop. Also ticks on demand when a `RequestTick` arrives.
pub async fn sampler_loop(
    state: Arc<AppState>,
    requests: AsyncReceiver<AppEvent>,
    app_tx: AsyncSender<AppEvent>,
    cancel: CancellationToken,
) -> anyhow::Result<()> {
    if let Some(error) = &state.engine_error {
        tracing::warn!("Sampling disabled: {error}");
        cancel.cancelled().await;
        return Ok(());
    }

    let interval_ms = {
        let config = state.config.read().await;
        config.sampler.interval_ms.max(MIN_INTERVAL_MS)
    };
    let mut interval = tokio::time::interval(Duration::from_millis(interval_ms));
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    tracing::info!("Sampler started, interval {interval_ms} ms");
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = interval.tick() => {}
            request = requests.recv() => {
                if request.is_err() {
                    break;
                }
            }
        }

        let outcome = tick(&state, &app_tx).await;
        tracing::trace!(?outcome, "tick");
    }

    tracing::info!("Sampler stopping");
    Ok(())
}

/// Start one capture + OCR pass in the background unless paused, busy, or
/// not fully configured
pub async fn tick(state: &Arc<AppState>, app_tx: &AsyncSender<AppEvent>) -> TickOutcome {
    if state.is_paused() {
        return TickOutcome::Paused;
    }

    // Generation is read under the same lock as the settings it stamps
    let (regions, swap_sides, full_scan_fallback, generation) = {
        let config = state.config.read().await;
        let regions = config.regions.all();
        match regions {
            Some(regions) => (
                regions,
                config.calc.swap_sides,
                config.sampler.full_scan_fallback,
                state.generation(),
            ),
            None => {
                let missing = config
                    .regions
                    .missing()
                    .iter()
                    .map(|slot| slot.name())
                    .collect::<Vec<_>>()
                    .join(", ");
                drop(config);
                let _ = app_tx
                    .send(AppEvent::StatusUpdate {
                        status: format!("Set regions: {missing}."),
                        paused: false,
                    })
                    .await;
                return TickOutcome::MissingRegions;
            }
        }
    };

    let Some(guard) = BusyGuard::acquire(state) else {
        return TickOutcome::Busy;
    };

    let state = state.clone();
    let app_tx = app_tx.clone();
    tokio::spawn(async move {
        let _guard = guard;
        let event = match capture_and_read(&state, regions, full_scan_fallback).await {
            Ok(sample) => AppEvent::SampleReady {
                generation,
                sample: if swap_sides { sample.swapped() } else { sample },
            },
            Err(message) => AppEvent::SampleFailed {
                generation,
                message,
            },
        };
        if let Err(e) = app_tx.send(event).await {
            tracing::debug!("Dropping sample, event loop gone: {e}");
        }
    });

    TickOutcome::Started
}

async fn capture_and_read(
    state: &AppState,
    regions: [CaptureRegion; 3],
    full_scan_fallback: bool,
) -> Result<Sample, String> {
    let grabber = state.grabber.clone();
    let images = tokio::task::spawn_blocking(move || {
        let [ratio, left, right] = regions;
        Ok::<_, OcrError>(RegionImages::from_captures(
            &grabber.grab(ratio)?,
            &grabber.grab(left)?,
            &grabber.grab(right)?,
        ))
    })
    .await
    .map_err(|e| format!("Capture task failed: {e}"))?
    .map_err(describe_error)?;

    read_sample(state.engine.as_ref(), &images, full_scan_fallback)
        .await
        .map_err(describe_error)
}

fn describe_error(error: OcrError) -> String {
    match error {
        OcrError::EngineMissing(message) => message,
        other => format!("OCR error: {other}"),
    }
}
