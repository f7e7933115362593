use xchg_types::Sample;

/// Identity of a sample for the "seen twice in a row" check
type SampleKey = (Option<(i64, i64)>, Option<u64>, Option<u64>);

fn sample_key(sample: &Sample) -> SampleKey {
    let ratio = sample.ratio.map(|r| {
        (
            (r.numerator * 100.0).round() as i64,
            (r.denominator * 100.0).round() as i64,
        )
    });
    (ratio, sample.left, sample.right)
}

/// A usable ratio, at least one box read and no box read as zero
pub fn is_valid(sample: &Sample) -> bool {
    if !sample.ratio.is_some_and(|r| r.is_usable()) {
        return false;
    }
    if sample.left.is_none() && sample.right.is_none() {
        return false;
    }
    !matches!(sample.left, Some(0)) && !matches!(sample.right, Some(0))
}

/// Holds the last confirmed reading while OCR flickers.
///
/// A valid sample only becomes the fallback after the identical reading has
/// been seen on two consecutive ticks.
#[derive(Debug, Clone, Default)]
pub struct Stabilizer {
    pending_key: Option<SampleKey>,
    pending_count: u32,
    last_good: Option<Sample>,
    bad_streak: u32,
}

impl Stabilizer {
    pub const CONFIRMATIONS: u32 = 2;

    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one tick's sample; returns whether it was valid
    pub fn observe(&mut self, sample: &Sample) -> bool {
        if !is_valid(sample) {
            self.record_failure();
            return false;
        }

        let key = sample_key(sample);
        if self.pending_key.as_ref() == Some(&key) {
            self.pending_count += 1;
        } else {
            self.pending_key = Some(key);
            self.pending_count = 1;
        }

        if self.pending_count >= Self::CONFIRMATIONS {
            tracing::trace!(
                ratio = ?sample.ratio,
                left = ?sample.left,
                right = ?sample.right,
                "sample confirmed"
            );
            self.last_good = Some(sample.clone());
            self.bad_streak = 0;
        }
        true
    }

    /// A tick that produced nothing usable
    pub fn record_failure(&mut self) {
        self.pending_key = None;
        self.pending_count = 0;
        self.bad_streak += 1;
    }

    pub fn last_good(&self) -> Option<&Sample> {
        self.last_good.as_ref()
    }

    pub fn bad_streak(&self) -> u32 {
        self.bad_streak
    }

    pub fn reset(&mut self) {
        self.pending_key = None;
        self.pending_count = 0;
        self.last_good = None;
    }
}
