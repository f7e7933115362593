//! Image cleanup before OCR.
//!
//! Game UI text is small, anti-aliased and drawn over textured backgrounds,
//! so every crop is upscaled and thresholded into a handful of variants and
//! each variant is tried.

use image::imageops::{self, FilterType};
use image::{GrayImage, RgbaImage};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanMode {
    /// Binary variants only, one profile
    Fast,
    /// Every variant, every profile, several thresholds
    Full,
}

pub fn to_gray(image: &RgbaImage) -> GrayImage {
    imageops::grayscale(image)
}

/// Stretch the darkest pixel to 0 and the brightest to 255
pub fn autocontrast(image: &GrayImage) -> GrayImage {
    let (lo, hi) = image
        .pixels()
        .fold((u8::MAX, u8::MIN), |(lo, hi), p| (lo.min(p[0]), hi.max(p[0])));
    if lo >= hi {
        return image.clone();
    }

    let span = (hi - lo) as u32;
    let mut out = image.clone();
    for p in out.pixels_mut() {
        p[0] = (((p[0] - lo) as u32 * 255 + span / 2) / span) as u8;
    }
    out
}

/// Pixels strictly brighter than `level` become white, the rest black
pub fn threshold(image: &GrayImage, level: u8) -> GrayImage {
    let mut out = image.clone();
    for p in out.pixels_mut() {
        p[0] = if p[0] > level { 255 } else { 0 };
    }
    out
}

pub fn inverted(image: &GrayImage) -> GrayImage {
    let mut out = image.clone();
    imageops::invert(&mut out);
    out
}

/// Add `amount` times the difference from a gaussian blur, skipping
/// differences smaller than `threshold`
pub fn unsharp_mask(image: &GrayImage, sigma: f32, amount: f32, threshold: u8) -> GrayImage {
    let blurred = imageproc::filter::gaussian_blur_f32(image, sigma);
    let mut out = image.clone();
    for (p, b) in out.pixels_mut().zip(blurred.pixels()) {
        let diff = p[0] as i32 - b[0] as i32;
        if diff.unsigned_abs() >= threshold as u32 {
            p[0] = (p[0] as f32 + diff as f32 * amount).round().clamp(0.0, 255.0) as u8;
        }
    }
    out
}

/// Candidate images for one OCR attempt, in the order they should be tried
pub fn variants(image: &GrayImage, scale: u32, level: u8, mode: ScanMode) -> Vec<GrayImage> {
    let base = autocontrast(image);
    let (width, height) = base.dimensions();
    let scaled = imageops::resize(
        &base,
        (width * scale).max(1),
        (height * scale).max(1),
        FilterType::Lanczos3,
    );
    let sharpened = unsharp_mask(&scaled, 1.0, 1.8, 3);
    let median = imageproc::filter::median_filter(&sharpened, 1, 1);
    let binary = threshold(&median, level);
    let binary_inverted = inverted(&binary);

    match mode {
        ScanMode::Fast => vec![binary, binary_inverted],
        ScanMode::Full => vec![sharpened, median, binary, binary_inverted],
    }
}

/// Only pure black and white (or 0/1) present
pub fn is_binary(image: &GrayImage) -> bool {
    let (lo, hi) = image
        .pixels()
        .fold((u8::MAX, u8::MIN), |(lo, hi), p| (lo.min(p[0]), hi.max(p[0])));
    (lo, hi) == (0, 255) || (lo, hi) == (0, 1)
}

/// Light text on dark background, thresholded at mid-grey
pub fn binarize_for_ratio(image: &GrayImage) -> GrayImage {
    let count = image.pixels().len() as u64;
    if count == 0 {
        return image.clone();
    }
    let sum: u64 = image.pixels().map(|p| p[0] as u64).sum();
    let mean = sum as f64 / count as f64;

    let source = if mean > 127.0 {
        inverted(image)
    } else {
        image.clone()
    };
    threshold(&source, 128)
}

/// Trim the ratio crop to its bright content plus a small margin
pub fn auto_crop_ratio(image: &GrayImage) -> GrayImage {
    const LEVEL: u8 = 150;
    const PAD: u32 = 2;

    let mut bounds: Option<(u32, u32, u32, u32)> = None;
    for (x, y, p) in image.enumerate_pixels() {
        if p[0] > LEVEL {
            bounds = Some(match bounds {
                None => (x, y, x + 1, y + 1),
                Some((l, t, r, b)) => (l.min(x), t.min(y), r.max(x + 1), b.max(y + 1)),
            });
        }
    }

    let Some((left, top, right, bottom)) = bounds else {
        return image.clone();
    };
    let left = left.saturating_sub(PAD);
    let top = top.saturating_sub(PAD);
    let right = (right + PAD).min(image.width());
    let bottom = (bottom + PAD).min(image.height());
    if right - left < 2 || bottom - top < 2 {
        return image.clone();
    }
    imageops::crop_imm(image, left, top, right - left, bottom - top).to_image()
}

fn lit_columns(binary: &GrayImage) -> Vec<u32> {
    (0..binary.width())
        .map(|x| (0..binary.height()).filter(|&y| binary.get_pixel(x, y)[0] > 0).count() as u32)
        .collect()
}

/// Split a ratio label at the emptiest column of its middle half.
///
/// Returns `None` when no column is close enough to empty or one of the
/// halves would be thinner than two pixels.
pub fn split_by_gap(image: &GrayImage) -> Option<(GrayImage, GrayImage)> {
    let binary = binarize_for_ratio(image);
    let (width, height) = binary.dimensions();
    if width < 6 || height < 4 {
        return None;
    }

    let counts = lit_columns(&binary);
    let start = (width as f64 * 0.25) as u32;
    let end = (width as f64 * 0.75) as u32;

    let mut gap: Option<(u32, u32)> = None;
    for x in start..end {
        let count = counts[x as usize];
        if gap.is_none_or(|(_, best)| count < best) {
            gap = Some((x, count));
        }
    }
    let (gap_x, gap_count) = gap?;

    let tolerance = 2u32.max((height as f64 * 0.15) as u32);
    if gap_count > tolerance {
        return None;
    }

    let left_width = gap_x;
    let right_width = width - gap_x - 1;
    if left_width < 2 || right_width < 2 {
        return None;
    }

    let left = imageops::crop_imm(image, 0, 0, left_width, height).to_image();
    let right = imageops::crop_imm(image, gap_x + 1, 0, right_width, height).to_image();
    Some((left, right))
}

fn lit_fraction(
    binary: &GrayImage,
    xs: std::ops::Range<u32>,
    ys: std::ops::Range<u32>,
    area: u32,
) -> f64 {
    let mut lit = 0u32;
    for y in ys {
        for x in xs.clone() {
            if binary.get_pixel(x, y)[0] > 0 {
                lit += 1;
            }
        }
    }
    lit as f64 / area.max(1) as f64
}

/// Tell a `1` from a `7` by where the ink is.
///
/// A `7` has a dense top bar and ink in the upper right; a `1` is mostly a
/// centred vertical stroke.
pub fn classify_one_or_seven(glyph: &GrayImage) -> Option<char> {
    let binary = binarize_for_ratio(glyph);
    let (width, height) = binary.dimensions();
    if width < 2 || height < 2 {
        return None;
    }

    let top_rows = 1u32.max((height as f64 * 0.25) as u32);
    let top = lit_fraction(&binary, 0..width, 0..top_rows, top_rows * width);

    let col_start = (width / 2).saturating_sub(1);
    let col_end = width.min(col_start + 3);
    let vertical = lit_fraction(
        &binary,
        col_start..col_end,
        0..height,
        height * 1u32.max(col_end - col_start),
    );

    let upper_right_area = 1u32.max((width - width / 2) * (height / 2));
    let upper_right = lit_fraction(&binary, width / 2..width, 0..height / 2, upper_right_area);

    if top >= 0.5 && vertical < 0.7 {
        return Some('7');
    }
    if top <= 0.35 && vertical >= 0.65 {
        return Some('1');
    }
    if upper_right > 0.35 && top > 0.4 {
        return Some('7');
    }
    if vertical > upper_right + 0.2 {
        return Some('1');
    }
    None
}

/// Crop a glyph given in bottom-left-origin box coordinates
pub fn crop_glyph(image: &GrayImage, x1: u32, y1: u32, x2: u32, y2: u32) -> Option<GrayImage> {
    let (width, height) = image.dimensions();
    let left = x1.min(width);
    let right = x2.min(width);
    let top = height.saturating_sub(y2);
    let bottom = height.saturating_sub(y1);
    if right <= left || bottom <= top {
        return None;
    }
    Some(imageops::crop_imm(image, left, top, right - left, bottom - top).to_image())
}
