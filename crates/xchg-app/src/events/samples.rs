use xchg_core::Session;
use xchg_types::Sample;

use super::EventContext;

pub async fn handle_sample(ctx: &EventContext, session: &mut Session, sample: Sample) {
    tracing::debug!(raw = %sample.raw_text, "Sample received");

    let snapshot = session.ingest(sample);
    ctx.show(snapshot).await;
}

/// A tick that produced no sample at all
pub async fn handle_failure(ctx: &EventContext, session: &mut Session, message: String) {
    tracing::error!("{message}");

    let snapshot = session.ingest_failure(&message);
    ctx.show(snapshot).await;
}
