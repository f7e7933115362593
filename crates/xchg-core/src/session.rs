use xchg_types::{Mode, Recommendation, Sample, Side, Snapshot};

use crate::direction::AutoResolver;
use crate::parse::format_ratio;
use crate::ratio::{expected_pair, recommend, round_for_display};
use crate::stability::Stabilizer;

/// Consecutive bad ticks during which the last good values are still presented as "holding"
const UNSTABLE_GRACE: u32 = 3;

/// Turns raw samples into display snapshots.
///
/// Owned by exactly one task; every tick goes through [`Session::ingest`] or
/// [`Session::ingest_failure`].
#[derive(Debug, Clone, Default)]
pub struct Session {
    mode: Mode,
    stabilizer: Stabilizer,
    resolver: AutoResolver,
    sequence: u64,
}

impl Session {
    pub fn new(mode: Mode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    pub fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
        self.resolver.forget();
    }

    /// Regions or the side mapping changed: old readings mean nothing now
    pub fn reset(&mut self) {
        self.stabilizer.reset();
        self.resolver.forget();
    }

    pub fn last_good(&self) -> Option<&Sample> {
        self.stabilizer.last_good()
    }

    pub fn ingest(&mut self, sample: Sample) -> Snapshot {
        let valid = self.stabilizer.observe(&sample);

        let display = if valid {
            sample
        } else {
            match self.stabilizer.last_good() {
                Some(good) => Sample {
                    raw_text: sample.raw_text,
                    ..good.clone()
                },
                None => sample,
            }
        };

        let status = if !valid
            && self.stabilizer.last_good().is_some()
            && self.stabilizer.bad_streak() <= UNSTABLE_GRACE
        {
            "OCR unstable; holding last good values.".to_string()
        } else {
            build_status(&display)
        };

        let snapshot = self.build(&display, !valid, status);

        if valid && let (Some(left), Some(right)) = (display.left, display.right) {
            self.resolver.remember(left, right);
        }

        snapshot
    }

    /// The whole tick failed (capture error, OCR crash)
    pub fn ingest_failure(&mut self, message: &str) -> Snapshot {
        self.stabilizer.record_failure();
        let display = self.stabilizer.last_good().cloned().unwrap_or_default();
        self.build(&display, true, message.to_string())
    }

    fn build(&mut self, display: &Sample, stale: bool, status: String) -> Snapshot {
        self.sequence += 1;

        let direction = self
            .resolver
            .resolve(self.mode, display.left, display.right, display.ratio);
        let (expected_left, expected_right) =
            expected_pair(display.ratio, display.left, display.right);

        let input = display.value(direction.input_side());
        let recommendation = match recommend(direction, display.ratio, input) {
            Ok(value) => round_for_display(value)
                .map(Recommendation::Value)
                .unwrap_or(Recommendation::InputNotReady),
            Err(reason) => reason.into_recommendation(),
        };

        let snapshot = Snapshot {
            sequence: self.sequence,
            ratio_text: format_ratio(display.ratio),
            left: display.left,
            right: display.right,
            expected_left: expected_left.and_then(round_for_display),
            expected_right: expected_right.and_then(round_for_display),
            direction,
            recommendation,
            confidence: confidence(display),
            status,
            stale,
            raw_text: display.raw_text.clone(),
        };

        tracing::info!(
            ratio = %snapshot.ratio_text,
            left = ?snapshot.left,
            right = ?snapshot.right,
            expected_left = ?snapshot.expected_left,
            expected_right = ?snapshot.expected_right,
            direction = ?snapshot.direction,
            stale = snapshot.stale,
            "OCR updated"
        );

        snapshot
    }
}

fn confidence(sample: &Sample) -> u8 {
    let mut score = 0;
    if sample.ratio.is_some_and(|r| r.is_usable()) {
        score += 50;
    }
    if sample.left.is_some() {
        score += 25;
    }
    if sample.right.is_some() {
        score += 25;
    }
    score
}

fn build_status(sample: &Sample) -> String {
    if !sample.ratio.is_some_and(|r| r.is_usable()) {
        return "Looking for market ratio...".to_string();
    }
    for side in [Side::Left, Side::Right] {
        if sample.value(side).is_none() {
            return format!("Looking for {}...", side.label());
        }
    }
    "OCR updated.".to_string()
}
