//! Fakes shared by the app tests

use std::path::PathBuf;
use std::sync::Arc;

use image::{GrayImage, Rgba, RgbaImage};
use xchg_config::Config;
use xchg_ocr::{OcrEngine, OcrError, PageProfile, RegionGrabber};
use xchg_types::{CaptureRegion, RegionSlot};

use crate::state::AppState;

/// Ratio profiles read `ratio_text`; box reads report 50 for dark crops and
/// 10 for bright ones
pub struct FakeEngine {
    pub ratio_text: String,
}

#[async_trait::async_trait]
impl OcrEngine for FakeEngine {
    fn name(&self) -> &str {
        "fake"
    }

    async fn check(&self) -> Result<String, OcrError> {
        Ok("fake 1.0".to_string())
    }

    async fn recognize(
        &self,
        image: &GrayImage,
        profile: &PageProfile,
    ) -> Result<String, OcrError> {
        if profile.allows(':') {
            return Ok(self.ratio_text.clone());
        }
        let dark = image.get_pixel(0, 0)[0] == 0;
        Ok(if dark { "50" } else { "10" }.to_string())
    }
}

/// Flat crops whose brightness is the region's x coordinate
pub struct FlatGrabber;

impl RegionGrabber for FlatGrabber {
    fn grab(&self, region: CaptureRegion) -> Result<RgbaImage, OcrError> {
        let level = region.x.clamp(0, 255) as u8;
        Ok(RgbaImage::from_pixel(
            region.width,
            region.height,
            Rgba([level, level, level, 255]),
        ))
    }
}

pub struct FailingGrabber;

impl RegionGrabber for FailingGrabber {
    fn grab(&self, _region: CaptureRegion) -> Result<RgbaImage, OcrError> {
        Err(OcrError::Capture("no monitor".to_string()))
    }
}

pub fn temp_config_path(name: &str) -> PathBuf {
    std::env::temp_dir()
        .join(format!("xchg-app-tests-{}", std::process::id()))
        .join(format!("{name}.json"))
}

/// Ratio region dark, left box mid-grey (reads 50), right box bright (reads 10)
pub fn configured() -> Config {
    let mut config = Config::default();
    config
        .regions
        .set(RegionSlot::Ratio, CaptureRegion::new(10, 0, 40, 12));
    config
        .regions
        .set(RegionSlot::Left, CaptureRegion::new(100, 0, 40, 12));
    config
        .regions
        .set(RegionSlot::Right, CaptureRegion::new(200, 0, 40, 12));
    config
}

pub fn state_with(config: Config, name: &str, grabber: Arc<dyn RegionGrabber>) -> Arc<AppState> {
    let engine = Arc::new(FakeEngine {
        ratio_text: "2:1".to_string(),
    });
    Arc::new(AppState::new(config, temp_config_path(name), engine, grabber))
}

pub fn state(config: Config, name: &str) -> Arc<AppState> {
    state_with(config, name, Arc::new(FlatGrabber))
}
