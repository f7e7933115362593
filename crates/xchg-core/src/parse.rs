//! Turning recognized text into numbers.

use std::sync::LazyLock;

use regex::Regex;
use xchg_types::RatioReading;

/// `N:D` or `N/D`, each side up to six digits with an optional two-digit fraction
pub static RATIO_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d{1,6}(?:[.,]\d{1,2})?)\s*[:/]\s*(\d{1,6}(?:[.,]\d{1,2})?)")
        .expect("ratio pattern is valid")
});

static RATIO_TOKEN_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{1,6}(?:[.,]\d{1,2})?").expect("token pattern is valid"));

static NUMBER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{1,8}").expect("number pattern is valid"));

/// Score bonus for candidates read from per-glyph boxes
pub const BOXES_BONUS: i32 = 2;
/// Score bonus for candidates read from the two halves of a gap split
pub const SPLIT_BONUS: i32 = 3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatioToken {
    pub value: f64,
    /// The token carried its own decimal separator
    pub explicit_decimal: bool,
    /// The decimal point was assumed to have been lost by OCR
    pub inferred_decimal: bool,
}

/// Parse one side of a ratio; `,` counts as a decimal separator.
///
/// Whole numbers of four or more digits that are not a multiple of 100 are
/// taken as a dropped decimal point: `1250` reads as `12.5`.
pub fn parse_ratio_token(token: &str) -> Option<RatioToken> {
    let normalized = token.trim().replace(',', ".");

    if normalized.contains('.') {
        let value = normalized.parse::<f64>().ok()?;
        return Some(RatioToken {
            value,
            explicit_decimal: true,
            inferred_decimal: false,
        });
    }

    let value = normalized.parse::<u64>().ok()?;
    if value >= 1000 && value % 100 != 0 {
        return Some(RatioToken {
            value: value as f64 / 100.0,
            explicit_decimal: false,
            inferred_decimal: true,
        });
    }

    Some(RatioToken {
        value: value as f64,
        explicit_decimal: false,
        inferred_decimal: false,
    })
}

/// Plausibility score of a ratio reading; higher is more believable.
pub fn score_ratio(
    numerator: f64,
    denominator: f64,
    explicit_decimal: bool,
    inferred_decimal: bool,
) -> i32 {
    let mut score = 0;
    if numerator > 0.0 && denominator > 0.0 {
        score += 10;
    }
    if (numerator - 1.0).abs() < 1e-6 || (denominator - 1.0).abs() < 1e-6 {
        score += 4;
    }
    if numerator <= 10_000.0 && denominator <= 10_000.0 {
        score += 4;
    }
    if numerator <= 1_000.0 && denominator <= 1_000.0 {
        score += 2;
    }
    if explicit_decimal {
        score += 3;
    }
    if inferred_decimal {
        score += 1;
    }
    if (numerator - denominator).abs() > 1e-6 {
        score += 1;
    }
    score
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatioCandidate {
    pub reading: RatioReading,
    pub score: i32,
}

/// Every positive ratio in `text`, scored
pub fn ratio_candidates(text: &str) -> Vec<RatioCandidate> {
    RATIO_REGEX
        .captures_iter(text)
        .filter_map(|caps| {
            let num = parse_ratio_token(caps.get(1)?.as_str())?;
            let den = parse_ratio_token(caps.get(2)?.as_str())?;
            if num.value <= 0.0 || den.value <= 0.0 {
                return None;
            }
            let explicit = num.explicit_decimal || den.explicit_decimal;
            let inferred = num.inferred_decimal || den.inferred_decimal;
            Some(RatioCandidate {
                reading: RatioReading::new(num.value, den.value),
                score: score_ratio(num.value, den.value, explicit, inferred),
            })
        })
        .collect()
}

/// Ratios in `text` read literally, without decimal inference
pub fn collect_ratios(text: &str) -> Vec<RatioReading> {
    RATIO_REGEX
        .captures_iter(text)
        .filter_map(|caps| {
            let num = caps.get(1)?.as_str().replace(',', ".").parse::<f64>().ok()?;
            let den = caps.get(2)?.as_str().replace(',', ".").parse::<f64>().ok()?;
            Some(RatioReading::new(num, den))
        })
        .collect()
}

/// Last resort when no candidate survived: the ratio with the largest
/// denominator (then numerator) in the raw text
pub fn fallback_ratio(text: &str) -> Option<RatioReading> {
    collect_ratios(text).into_iter().reduce(|best, next| {
        let next_key = (next.denominator, next.numerator);
        let best_key = (best.denominator, best.numerator);
        if next_key > best_key { next } else { best }
    })
}

/// First number-looking token of a single ratio side
pub fn first_ratio_token(text: &str) -> Option<f64> {
    let token = RATIO_TOKEN_REGEX.find(text)?;
    parse_ratio_token(token.as_str()).map(|t| t.value)
}

/// Largest run of digits in an input box's text
pub fn extract_best_int(text: &str) -> Option<u64> {
    NUMBER_REGEX
        .find_iter(text)
        .filter_map(|m| m.as_str().parse::<u64>().ok())
        .max()
}

/// `2` for whole numbers, `2.5` / `0.07` otherwise, `--` when absent
pub fn format_ratio_value(value: Option<f64>) -> String {
    let Some(value) = value else {
        return "--".to_string();
    };
    if (value - value.round()).abs() < 1e-6 {
        return format!("{}", value.round() as i64);
    }
    let text = format!("{value:.2}");
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}

pub fn format_ratio(ratio: Option<RatioReading>) -> String {
    match ratio.filter(RatioReading::is_usable) {
        Some(r) => format!(
            "{} : {}",
            format_ratio_value(Some(r.numerator)),
            format_ratio_value(Some(r.denominator))
        ),
        None => "--".to_string(),
    }
}

fn cents(value: f64) -> i64 {
    (value * 100.0).round() as i64
}

#[derive(Debug, Clone)]
struct TallyEntry {
    key: (i64, i64),
    count: u32,
    score: i32,
}

/// Votes for ratio readings across preprocessing variants and OCR profiles.
///
/// Readings are bucketed to two decimals. The winner is the most frequently
/// seen bucket, then the best score; earlier buckets win exact ties.
#[derive(Debug, Clone, Default)]
pub struct CandidateTally {
    entries: Vec<TallyEntry>,
}

impl CandidateTally {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, reading: RatioReading, score: i32) {
        let key = (cents(reading.numerator), cents(reading.denominator));
        match self.entries.iter_mut().find(|e| e.key == key) {
            Some(entry) => {
                entry.count += 1;
                entry.score = entry.score.max(score);
            }
            None => self.entries.push(TallyEntry {
                key,
                count: 1,
                score,
            }),
        }
    }

    pub fn add_all(&mut self, candidates: &[RatioCandidate], bonus: i32) {
        for candidate in candidates {
            self.add(candidate.reading, candidate.score + bonus);
        }
    }

    pub fn best(&self) -> Option<RatioReading> {
        let mut best: Option<&TallyEntry> = None;
        for entry in &self.entries {
            let better = match best {
                None => true,
                Some(b) => (entry.count, entry.score) > (b.count, b.score),
            };
            if better {
                best = Some(entry);
            }
        }
        best.map(|e| RatioReading::new(e.key.0 as f64 / 100.0, e.key.1 as f64 / 100.0))
    }
}
