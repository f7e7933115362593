use image::GrayImage;
use windows::{
    Globalization::Language,
    Graphics::Imaging::BitmapDecoder,
    Media::Ocr::OcrEngine as WinOcrEngine,
    Storage::Streams::{DataWriter, InMemoryRandomAccessStream},
    core::HSTRING,
};

use crate::com::ComGuard;
use crate::engine::{OcrEngine, PageProfile, encode_png};
use crate::error::OcrError;

/// The built-in `Windows.Media.Ocr` recognizer.
///
/// It has no page modes; only the profile whitelist is applied, to its output.
pub struct WindowsOcrEngine {
    language: String,
}

impl WindowsOcrEngine {
    /// `language` accepts BCP-47 tags (`en`, `en-US`) and the `eng` code
    pub fn new(language: &str) -> Self {
        let language = match language {
            "eng" => "en",
            other => other,
        };
        Self {
            language: language.to_string(),
        }
    }
}

fn engine_error(what: &str) -> impl FnOnce(windows::core::Error) -> OcrError + '_ {
    move |e| OcrError::Engine(format!("{what}: {e}"))
}

fn create_engine(language_code: &str) -> Result<WinOcrEngine, OcrError> {
    let language = Language::CreateLanguage(&HSTRING::from(language_code))
        .map_err(engine_error("Failed to create language"))?;

    WinOcrEngine::TryCreateFromLanguage(&language).map_err(|e| {
        OcrError::EngineMissing(format!(
            "No Windows OCR language pack for '{language_code}': {e}"
        ))
    })
}

fn recognize_png(language_code: &str, png: &[u8]) -> Result<String, OcrError> {
    let _com = ComGuard::initialize()?;
    let engine = create_engine(language_code)?;

    let stream =
        InMemoryRandomAccessStream::new().map_err(engine_error("Failed to create stream"))?;
    let writer =
        DataWriter::CreateDataWriter(&stream).map_err(engine_error("Failed to create writer"))?;
    writer
        .WriteBytes(png)
        .map_err(engine_error("Failed to write image bytes"))?;
    writer
        .StoreAsync()
        .and_then(|op| op.get())
        .map_err(engine_error("Failed to store data"))?;
    writer
        .FlushAsync()
        .and_then(|op| op.get())
        .map_err(engine_error("Failed to flush"))?;
    stream.Seek(0).map_err(engine_error("Failed to seek"))?;

    let decoder = BitmapDecoder::CreateAsync(&stream)
        .and_then(|op| op.get())
        .map_err(engine_error("Failed to create decoder"))?;
    let bitmap = decoder
        .GetSoftwareBitmapAsync()
        .and_then(|op| op.get())
        .map_err(engine_error("Failed to get software bitmap"))?;

    let result = engine
        .RecognizeAsync(&bitmap)
        .and_then(|op| op.get())
        .map_err(engine_error("Failed to recognize"))?;

    Ok(result.Text().map_err(engine_error("Failed to get text"))?.to_string())
}

#[async_trait::async_trait]
impl OcrEngine for WindowsOcrEngine {
    fn name(&self) -> &str {
        "windows"
    }

    async fn check(&self) -> Result<String, OcrError> {
        let language = self.language.clone();
        tokio::task::spawn_blocking(move || {
            let _com = ComGuard::initialize()?;
            let engine = create_engine(&language)?;
            engine
                .RecognizerLanguage()
                .and_then(|l| l.LanguageTag())
                .map(|tag| format!("Windows OCR ({tag})"))
                .map_err(engine_error("Failed to get recognizer language"))
        })
        .await
        .map_err(|e| OcrError::Engine(format!("OCR task failed: {e}")))?
    }

    async fn recognize(
        &self,
        image: &GrayImage,
        profile: &PageProfile,
    ) -> Result<String, OcrError> {
        let png = encode_png(image)?;
        let language = self.language.clone();
        let profile = *profile;

        let text = tokio::task::spawn_blocking(move || recognize_png(&language, &png))
            .await
            .map_err(|e| OcrError::Engine(format!("OCR task failed: {e}")))??;

        Ok(text
            .chars()
            .filter(|&c| c.is_whitespace() || profile.allows(c))
            .collect())
    }
}
