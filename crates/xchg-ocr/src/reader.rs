use image::{GrayImage, RgbaImage};
use xchg_core::parse::{
    BOXES_BONUS, CandidateTally, SPLIT_BONUS, extract_best_int, fallback_ratio, first_ratio_token,
    format_ratio_value, ratio_candidates, score_ratio,
};
use xchg_types::{RatioReading, Sample};

use crate::engine::{OcrEngine, PageProfile};
use crate::error::OcrError;
use crate::preprocess::{
    ScanMode, auto_crop_ratio, classify_one_or_seven, crop_glyph, is_binary, split_by_gap, to_gray,
    variants,
};

const RATIO_FAST_THRESHOLDS: &[u8] = &[170];
const RATIO_FULL_THRESHOLDS: &[u8] = &[170, 150, 130, 110];
const BOX_FAST_THRESHOLDS: &[u8] = &[150];
const BOX_FULL_THRESHOLDS: &[u8] = &[150, 120];
const BOX_SCALE: u32 = 3;

/// Grayscale crops of the three regions for one tick
#[derive(Debug, Clone)]
pub struct RegionImages {
    pub ratio: GrayImage,
    pub left: GrayImage,
    pub right: GrayImage,
}

impl RegionImages {
    pub fn from_captures(ratio: &RgbaImage, left: &RgbaImage, right: &RgbaImage) -> Self {
        Self {
            ratio: to_gray(ratio),
            left: to_gray(left),
            right: to_gray(right),
        }
    }
}

fn ratio_profiles(mode: ScanMode) -> &'static [PageProfile] {
    match mode {
        ScanMode::Fast => &PageProfile::RATIO[..1],
        ScanMode::Full => &PageProfile::RATIO,
    }
}

fn box_profiles(mode: ScanMode) -> &'static [PageProfile] {
    match mode {
        ScanMode::Fast => &PageProfile::BOX[..1],
        ScanMode::Full => &PageProfile::BOX,
    }
}

/// Read the market ratio label.
///
/// Every variant and profile votes into a tally; the first binary variant
/// additionally gets a glyph-box pass and a gap-split pass. Returns the
/// winning ratio and the text shown in the raw dump.
pub async fn read_ratio(
    engine: &dyn OcrEngine,
    image: &GrayImage,
    mode: ScanMode,
) -> Result<(Option<RatioReading>, String), OcrError> {
    let (thresholds, scale) = match mode {
        ScanMode::Fast => (RATIO_FAST_THRESHOLDS, 3),
        ScanMode::Full => (RATIO_FULL_THRESHOLDS, 4),
    };
    let profiles = ratio_profiles(mode);
    let cropped = auto_crop_ratio(image);

    let mut tally = CandidateTally::new();
    let mut best_text = String::new();
    let mut boxes_checked = false;
    let mut split_checked = false;

    for &level in thresholds {
        for processed in variants(&cropped, scale, level, mode) {
            for profile in profiles {
                let text = engine.recognize(&processed, profile).await?;
                let text = text.trim();
                if !text.is_empty() {
                    best_text = text.to_string();
                }
                tally.add_all(&ratio_candidates(text), 0);
            }

            if !boxes_checked && is_binary(&processed) {
                boxes_checked = true;
                let box_text = ratio_text_from_glyphs(engine, &processed, &profiles[0]).await;
                if !box_text.is_empty() && box_text != best_text {
                    tally.add_all(&ratio_candidates(&box_text), BOXES_BONUS);
                }
            }

            if !split_checked && is_binary(&processed) {
                split_checked = true;
                if let Some((left, right)) = split_by_gap(&processed) {
                    let numerator = read_ratio_side(engine, &left).await?;
                    let denominator = read_ratio_side(engine, &right).await?;
                    if let (Some(n), Some(d)) = (numerator, denominator)
                        && n > 0.0
                        && d > 0.0
                    {
                        let score = score_ratio(n, d, false, false) + SPLIT_BONUS;
                        tally.add(RatioReading::new(n, d), score);
                    }
                }
            }
        }
    }

    let winner = tally.best().or_else(|| fallback_ratio(&best_text));
    match winner {
        Some(ratio) => {
            let text = format!(
                "{}:{}",
                format_ratio_value(Some(ratio.numerator)),
                format_ratio_value(Some(ratio.denominator))
            );
            tracing::debug!(?mode, %text, "ratio read");
            Ok((Some(ratio), text))
        }
        None => Ok((None, best_text)),
    }
}

/// One side of a split ratio label: first profile that yields a number
async fn read_ratio_side(
    engine: &dyn OcrEngine,
    image: &GrayImage,
) -> Result<Option<f64>, OcrError> {
    for profile in &PageProfile::RATIO_DIGITS {
        let text = engine.recognize(image, profile).await?;
        if let Some(value) = first_ratio_token(text.trim()) {
            return Ok(Some(value));
        }
    }
    Ok(None)
}

/// Rebuild the label from per-character boxes, fixing 1/7 confusions.
///
/// Box output is best effort; an engine failure yields no text.
async fn ratio_text_from_glyphs(
    engine: &dyn OcrEngine,
    image: &GrayImage,
    profile: &PageProfile,
) -> String {
    let glyphs = match engine.recognize_glyphs(image, profile).await {
        Ok(glyphs) => glyphs,
        Err(e) => {
            tracing::debug!("Glyph box pass failed: {e}");
            return String::new();
        }
    };

    let mut items: Vec<(u32, char)> = glyphs
        .into_iter()
        .filter(|g| profile.allows(g.ch))
        .map(|g| {
            let ch = match g.ch {
                '1' | '7' => correct_one_or_seven(image, g.ch, g.x1, g.y1, g.x2, g.y2),
                other => other,
            };
            (g.x1, ch)
        })
        .collect();

    items.sort_by_key(|(x, _)| *x);
    items.into_iter().map(|(_, ch)| ch).collect()
}

fn correct_one_or_seven(image: &GrayImage, ch: char, x1: u32, y1: u32, x2: u32, y2: u32) -> char {
    if let Some(corrected) =
        crop_glyph(image, x1, y1, x2, y2).and_then(|g| classify_one_or_seven(&g))
    {
        return corrected;
    }

    let width = x2.saturating_sub(x1).max(1) as f64;
    let height = y2.saturating_sub(y1).max(1) as f64;
    let aspect = width / height;
    match ch {
        '7' if aspect < 0.35 => '1',
        '1' if aspect > 0.6 => '7',
        other => other,
    }
}

/// Read an integer input box; the first text containing digits wins
pub async fn read_box(
    engine: &dyn OcrEngine,
    image: &GrayImage,
    mode: ScanMode,
) -> Result<(Option<u64>, String), OcrError> {
    let thresholds = match mode {
        ScanMode::Fast => BOX_FAST_THRESHOLDS,
        ScanMode::Full => BOX_FULL_THRESHOLDS,
    };

    let mut best_text = String::new();
    for &level in thresholds {
        for processed in variants(image, BOX_SCALE, level, mode) {
            for profile in box_profiles(mode) {
                let text = engine.recognize(&processed, profile).await?;
                let text = text.trim();
                if !text.is_empty() {
                    best_text = text.to_string();
                }
                if let Some(value) = extract_best_int(text) {
                    return Ok((Some(value), text.to_string()));
                }
            }
        }
    }
    Ok((None, best_text))
}

/// Read all three regions: a fast pass everywhere, then a full pass for the
/// regions that came back empty when `full_scan_fallback` is set.
pub async fn read_sample(
    engine: &dyn OcrEngine,
    images: &RegionImages,
    full_scan_fallback: bool,
) -> Result<Sample, OcrError> {
    let (mut ratio, mut ratio_text) = read_ratio(engine, &images.ratio, ScanMode::Fast).await?;
    let (mut left, mut left_text) = read_box(engine, &images.left, ScanMode::Fast).await?;
    let (mut right, mut right_text) = read_box(engine, &images.right, ScanMode::Fast).await?;

    if full_scan_fallback {
        if ratio.is_none() {
            (ratio, ratio_text) = read_ratio(engine, &images.ratio, ScanMode::Full).await?;
        }
        if left.is_none() {
            (left, left_text) = read_box(engine, &images.left, ScanMode::Full).await?;
        }
        if right.is_none() {
            (right, right_text) = read_box(engine, &images.right, ScanMode::Full).await?;
        }
    }

    let raw_text = format!("RATIO: {ratio_text}\nLEFT: {left_text}\nRIGHT: {right_text}")
        .trim()
        .to_string();

    Ok(Sample {
        ratio,
        left,
        right,
        raw_text,
    })
}
