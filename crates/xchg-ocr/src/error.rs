#[derive(Debug, thiserror::Error)]
pub enum OcrError {
    #[error("OCR engine not available: {0}")]
    EngineMissing(String),

    #[error("OCR engine failed: {0}")]
    Engine(String),

    #[error("Screen capture failed: {0}")]
    Capture(String),

    #[error("Not supported on this platform: {0}")]
    Unsupported(&'static str),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
