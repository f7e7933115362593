mod capture;
#[cfg(windows)]
mod com;
mod engine;
mod error;
pub mod preprocess;
mod reader;
mod tesseract;
#[cfg(windows)]
mod winrt;

pub use capture::{RegionGrabber, ScreenGrabber, clamp_to_bounds};
#[cfg(windows)]
pub use com::ComGuard;
pub use engine::{GlyphBox, OcrEngine, PageProfile};
pub use error::OcrError;
pub use preprocess::ScanMode;
pub use reader::{RegionImages, read_box, read_ratio, read_sample};
pub use tesseract::{TesseractEngine, parse_box_output};
#[cfg(windows)]
pub use winrt::WindowsOcrEngine;
