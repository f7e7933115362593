//! Sampler ticks against fake capture and OCR

use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;

use kanal::AsyncReceiver;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use xchg_config::Config;
use xchg_types::{AppEvent, CaptureRegion, RatioReading, RegionSlot};

use super::support::{FailingGrabber, configured, state, state_with};
use crate::sampler::{TickOutcome, sampler_loop, tick};

async fn next_event(rx: &AsyncReceiver<AppEvent>) -> AppEvent {
    timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("no event within timeout")
        .expect("channel closed")
}

#[tokio::test]
async fn tick_reads_all_three_regions() {
    let state = state(configured(), "sampler-reads");
    let (tx, rx) = kanal::bounded_async(8);

    assert_eq!(tick(&state, &tx).await, TickOutcome::Started);

    match next_event(&rx).await {
        AppEvent::SampleReady { generation, sample } => {
            assert_eq!(generation, 0);
            assert_eq!(sample.ratio, Some(RatioReading::new(2.0, 1.0)));
            assert_eq!(sample.left, Some(50));
            assert_eq!(sample.right, Some(10));
            assert!(sample.raw_text.starts_with("RATIO: 2:1"), "{}", sample.raw_text);
        }
        other => panic!("unexpected event: {other:?}"),
    }
}

#[tokio::test]
async fn swap_exchanges_box_readings() {
    let mut config = configured();
    config.calc.swap_sides = true;
    let state = state(config, "sampler-swap");
    let (tx, rx) = kanal::bounded_async(8);

    tick(&state, &tx).await;
    match next_event(&rx).await {
        AppEvent::SampleReady { sample, .. } => {
            assert_eq!(sample.left, Some(10));
            assert_eq!(sample.right, Some(50));
        }
        other => panic!("unexpected event: {other:?}"),
    }
}

#[tokio::test]
async fn paused_tick_does_nothing() {
    let state = state(configured(), "sampler-paused");
    state.paused.store(true, Ordering::SeqCst);
    let (tx, rx) = kanal::bounded_async(8);

    assert_eq!(tick(&state, &tx).await, TickOutcome::Paused);
    assert!(rx.is_empty());
}

#[tokio::test]
async fn ticks_never_overlap() {
    let state = state(configured(), "sampler-busy");
    state.ocr_busy.store(true, Ordering::SeqCst);
    let (tx, _rx) = kanal::bounded_async(8);

    assert_eq!(tick(&state, &tx).await, TickOutcome::Busy);
}

#[tokio::test]
async fn busy_flag_clears_after_the_tick() {
    let state = state(configured(), "sampler-clear");
    let (tx, rx) = kanal::bounded_async(8);

    tick(&state, &tx).await;
    next_event(&rx).await;

    timeout(Duration::from_secs(5), async {
        while state.ocr_busy.load(Ordering::SeqCst) {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("busy flag stuck");
    assert_eq!(tick(&state, &tx).await, TickOutcome::Started);
}

#[tokio::test]
async fn missing_regions_are_reported() {
    let mut config = Config::default();
    config
        .regions
        .set(RegionSlot::Ratio, CaptureRegion::new(10, 0, 40, 12));
    let state = state(config, "sampler-missing");
    let (tx, rx) = kanal::bounded_async(8);

    assert_eq!(tick(&state, &tx).await, TickOutcome::MissingRegions);
    match next_event(&rx).await {
        AppEvent::StatusUpdate { status, .. } => assert_eq!(status, "Set regions: left, right."),
        other => panic!("unexpected event: {other:?}"),
    }
}

#[tokio::test]
async fn capture_failure_becomes_a_failed_sample() {
    let state = state_with(configured(), "sampler-fail", Arc::new(FailingGrabber));
    let (tx, rx) = kanal::bounded_async(8);

    tick(&state, &tx).await;
    match next_event(&rx).await {
        AppEvent::SampleFailed { message, .. } => {
            assert_eq!(message, "OCR error: Screen capture failed: no monitor");
        }
        other => panic!("unexpected event: {other:?}"),
    }
}

#[tokio::test]
async fn degraded_sampler_waits_for_shutdown() {
    let state = Arc::new(
        Arc::into_inner(state(configured(), "sampler-degraded"))
            .unwrap()
            .with_engine_error(Some("tesseract missing".to_string())),
    );
    let (_req_tx, req_rx) = kanal::bounded_async(1);
    let (tx, rx) = kanal::bounded_async(8);
    let cancel = CancellationToken::new();

    let handle = tokio::spawn(sampler_loop(state, req_rx, tx, cancel.clone()));
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(rx.is_empty());

    cancel.cancel();
    timeout(Duration::from_secs(5), handle)
        .await
        .expect("sampler did not stop")
        .unwrap()
        .unwrap();
}

#[tokio::test]
async fn requested_tick_runs_immediately() {
    let mut config = configured();
    config.sampler.interval_ms = 60_000;
    let state = state(config, "sampler-request");
    let (req_tx, req_rx) = kanal::bounded_async(1);
    let (tx, rx) = kanal::bounded_async(8);
    let cancel = CancellationToken::new();

    let handle = tokio::spawn(sampler_loop(state, req_rx, tx, cancel.clone()));

    // First interval tick fires at once
    assert!(matches!(next_event(&rx).await, AppEvent::SampleReady { .. }));

    tokio::time::sleep(Duration::from_millis(50)).await;
    req_tx.send(AppEvent::RequestTick).await.unwrap();
    assert!(matches!(next_event(&rx).await, AppEvent::SampleReady { .. }));

    cancel.cancel();
    timeout(Duration::from_secs(5), handle).await.unwrap().unwrap().unwrap();
}

#[tokio::test]
async fn tick_stamps_the_generation_of_the_settings_it_read() {
    let state = state(configured(), "sampler-generation");
    let (tx, rx) = kanal::bounded_async(8);

    let guard = state.config.write().await;
    let pending = tokio::spawn({
        let state = state.clone();
        let tx = tx.clone();
        async move { tick(&state, &tx).await }
    });
    tokio::time::sleep(Duration::from_millis(20)).await;

    let mut config = guard;
    config.calc.swap_sides = true;
    state.bump_generation();
    drop(config);

    assert_eq!(
        timeout(Duration::from_secs(5), pending).await.unwrap().unwrap(),
        TickOutcome::Started
    );
    match next_event(&rx).await {
        AppEvent::SampleReady { generation, sample } => {
            assert_eq!(generation, 1);
            assert_eq!(sample.left, Some(10));
            assert_eq!(sample.right, Some(50));
        }
        other => panic!("unexpected event: {other:?}"),
    }
}
