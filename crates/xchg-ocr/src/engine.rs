use std::io::Cursor;

use image::{DynamicImage, GrayImage, ImageFormat};

use crate::error::OcrError;

/// Recognition settings for one OCR call.
///
/// Maps onto tesseract's `--oem`/`--psm` and `-c` variables; other engines
/// only honour the whitelist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageProfile {
    pub oem: u8,
    pub psm: u8,
    pub whitelist: &'static str,
    /// Numeric classifier mode, no dictionaries
    pub numeric: bool,
}

const RATIO_CHARS: &str = "0123456789:.,/";
const RATIO_DIGIT_CHARS: &str = "0123456789.,";
const BOX_CHARS: &str = "0123456789";

impl PageProfile {
    /// Whole ratio label, separator included
    pub const RATIO: [PageProfile; 3] = [
        PageProfile::numeric(3, 7, RATIO_CHARS),
        PageProfile::numeric(3, 6, RATIO_CHARS),
        PageProfile::numeric(1, 7, RATIO_CHARS),
    ];

    /// One half of a ratio label after a gap split
    pub const RATIO_DIGITS: [PageProfile; 3] = [
        PageProfile::numeric(3, 7, RATIO_DIGIT_CHARS),
        PageProfile::numeric(3, 6, RATIO_DIGIT_CHARS),
        PageProfile::numeric(1, 7, RATIO_DIGIT_CHARS),
    ];

    /// Integer input boxes
    pub const BOX: [PageProfile; 3] = [
        PageProfile::digits(3, 7, BOX_CHARS),
        PageProfile::digits(3, 6, BOX_CHARS),
        PageProfile::digits(3, 10, BOX_CHARS),
    ];

    const fn numeric(oem: u8, psm: u8, whitelist: &'static str) -> Self {
        Self {
            oem,
            psm,
            whitelist,
            numeric: true,
        }
    }

    const fn digits(oem: u8, psm: u8, whitelist: &'static str) -> Self {
        Self {
            oem,
            psm,
            whitelist,
            numeric: false,
        }
    }

    pub fn allows(&self, c: char) -> bool {
        self.whitelist.contains(c)
    }

    /// Command line arguments for the tesseract executable
    pub fn tesseract_args(&self) -> Vec<String> {
        let mut args = vec![
            "--oem".to_string(),
            self.oem.to_string(),
            "--psm".to_string(),
            self.psm.to_string(),
            "-c".to_string(),
            format!("tessedit_char_whitelist={}", self.whitelist),
        ];
        if self.numeric {
            for var in [
                "classify_bln_numeric_mode=1",
                "load_system_dawg=0",
                "load_freq_dawg=0",
            ] {
                args.push("-c".to_string());
                args.push(var.to_string());
            }
        }
        args
    }
}

/// One recognized character with its box, tesseract style: origin at the
/// bottom-left corner of the image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlyphBox {
    pub ch: char,
    pub x1: u32,
    pub y1: u32,
    pub x2: u32,
    pub y2: u32,
}

/// Text recognition backend
#[async_trait::async_trait]
pub trait OcrEngine: Send + Sync {
    fn name(&self) -> &str;

    /// Probe the engine; returns a version or language description
    async fn check(&self) -> Result<String, OcrError>;

    async fn recognize(&self, image: &GrayImage, profile: &PageProfile) -> Result<String, OcrError>;

    /// Per-character boxes; engines without box output return nothing
    async fn recognize_glyphs(
        &self,
        _image: &GrayImage,
        _profile: &PageProfile,
    ) -> Result<Vec<GlyphBox>, OcrError> {
        Ok(Vec::new())
    }
}

pub(crate) fn encode_png(image: &GrayImage) -> Result<Vec<u8>, OcrError> {
    let mut buffer = Cursor::new(Vec::new());
    DynamicImage::ImageLuma8(image.clone()).write_to(&mut buffer, ImageFormat::Png)?;
    Ok(buffer.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ratio_profile_arguments() {
        let args = PageProfile::RATIO[0].tesseract_args();
        assert_eq!(
            args,
            vec![
                "--oem",
                "3",
                "--psm",
                "7",
                "-c",
                "tessedit_char_whitelist=0123456789:.,/",
                "-c",
                "classify_bln_numeric_mode=1",
                "-c",
                "load_system_dawg=0",
                "-c",
                "load_freq_dawg=0",
            ]
        );
    }

    #[test]
    fn box_profile_is_plain_digits() {
        let args = PageProfile::BOX[2].tesseract_args();
        assert_eq!(args.len(), 6);
        assert_eq!(args[3], "10");
        assert!(PageProfile::BOX[0].allows('7'));
        assert!(!PageProfile::BOX[0].allows(':'));
    }

    #[test]
    fn png_encoding_has_signature() {
        let png = encode_png(&GrayImage::new(3, 2)).unwrap();
        assert_eq!(&png[..4], &[0x89, b'P', b'N', b'G']);
    }
}
