use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OcrBackend {
    /// External `tesseract` executable
    #[default]
    Tesseract,
    /// Built-in Windows.Media.Ocr engine
    Windows,
}

fn default_language() -> String {
    "eng".to_string()
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct OcrConfig {
    pub backend: OcrBackend,
    /// Explicit path to tesseract; falls back to the usual install locations and PATH
    pub tesseract_path: Option<String>,
    #[serde(default = "default_language")]
    pub language: String,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            backend: OcrBackend::default(),
            tesseract_path: None,
            language: default_language(),
        }
    }
}
