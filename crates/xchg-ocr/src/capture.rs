use image::RgbaImage;
use xchg_types::CaptureRegion;

use crate::error::OcrError;

/// Source of screen pixels. Blocking; call from `spawn_blocking`.
pub trait RegionGrabber: Send + Sync {
    fn grab(&self, region: CaptureRegion) -> Result<RgbaImage, OcrError>;
}

/// Intersect `region` with `bounds`, keeping at least a 1x1 area
pub fn clamp_to_bounds(region: CaptureRegion, bounds: CaptureRegion) -> CaptureRegion {
    let left = region.x.max(bounds.x);
    let top = region.y.max(bounds.y);
    let right = region.right().min(bounds.right());
    let bottom = region.bottom().min(bounds.bottom());

    let left = left.min(bounds.right().saturating_sub(1));
    let top = top.min(bounds.bottom().saturating_sub(1));

    CaptureRegion {
        x: left,
        y: top,
        width: (right - left).max(1) as u32,
        height: (bottom - top).max(1) as u32,
    }
}

/// Grabs from the physical monitors
#[derive(Debug, Default, Clone, Copy)]
pub struct ScreenGrabber;

impl ScreenGrabber {
    pub fn new() -> Self {
        Self
    }
}

#[cfg(windows)]
impl RegionGrabber for ScreenGrabber {
    fn grab(&self, region: CaptureRegion) -> Result<RgbaImage, OcrError> {
        use xcap::Monitor;

        let monitors = Monitor::all()
            .map_err(|e| OcrError::Capture(format!("Failed to get monitors: {e}")))?;

        let contains = |m: &Monitor| {
            region.x >= m.x()
                && region.y >= m.y()
                && region.x < m.x() + m.width() as i32
                && region.y < m.y() + m.height() as i32
        };
        let monitor = monitors
            .iter()
            .find(|m| contains(m))
            .or(monitors.first())
            .ok_or_else(|| OcrError::Capture("No monitor found".to_string()))?;

        let bounds =
            CaptureRegion::new(monitor.x(), monitor.y(), monitor.width(), monitor.height());
        let clamped = clamp_to_bounds(region, bounds);

        let shot = monitor
            .capture_image()
            .map_err(|e| OcrError::Capture(format!("Failed to capture screen: {e}")))?;
        let (width, height) = (shot.width(), shot.height());
        let frame = RgbaImage::from_raw(width, height, shot.into_raw())
            .ok_or_else(|| OcrError::Capture("Unexpected frame layout".to_string()))?;

        let cropped = image::imageops::crop_imm(
            &frame,
            (clamped.x - bounds.x) as u32,
            (clamped.y - bounds.y) as u32,
            clamped.width,
            clamped.height,
        )
        .to_image();

        tracing::trace!(%region, %clamped, "captured region");
        Ok(cropped)
    }
}

#[cfg(not(windows))]
impl RegionGrabber for ScreenGrabber {
    fn grab(&self, _region: CaptureRegion) -> Result<RgbaImage, OcrError> {
        Err(OcrError::Unsupported("screen capture is only available on Windows"))
    }
}
