use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use tokio::sync::RwLock;
use xchg_config::Config;
use xchg_config::ocr::{OcrBackend, OcrConfig};
use xchg_ocr::{OcrEngine, RegionGrabber, TesseractEngine};

use crate::profile;

pub struct AppState {
    pub config: Arc<RwLock<Config>>,
    pub config_path: PathBuf,
    pub engine: Arc<dyn OcrEngine>,
    pub grabber: Arc<dyn RegionGrabber>,
    /// Startup engine check failure; no sampling while set
    pub engine_error: Option<String>,
    pub ocr_busy: AtomicBool,
    pub paused: AtomicBool,
    /// Bumped whenever regions or the side mapping change
    generation: AtomicU64,
}

impl AppState {
    pub fn new(
        config: Config,
        config_path: PathBuf,
        engine: Arc<dyn OcrEngine>,
        grabber: Arc<dyn RegionGrabber>,
    ) -> Self {
        let paused = config.sampler.start_paused;
        Self {
            config: Arc::new(RwLock::new(config)),
            config_path,
            engine,
            grabber,
            engine_error: None,
            ocr_busy: AtomicBool::new(false),
            paused: AtomicBool::new(paused),
            generation: AtomicU64::new(0),
        }
    }

    pub fn with_engine_error(mut self, error: Option<String>) -> Self {
        self.engine_error = error;
        self
    }

    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::SeqCst)
    }

    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Samples taken before this call will be discarded
    pub fn bump_generation(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Persist regions and calc settings to the config file
    pub async fn save_config(&self) -> anyhow::Result<()> {
        let config = self.config.read().await.clone();
        profile::save_user_settings(&self.config_path, &config)
    }
}

/// Backend selected in the config. The Windows engine falls back to
/// tesseract on other platforms.
pub fn build_engine(config: &OcrConfig) -> Arc<dyn OcrEngine> {
    match config.backend {
        OcrBackend::Tesseract => Arc::new(TesseractEngine::locate(
            config.tesseract_path.as_deref(),
            &config.language,
        )),
        #[cfg(windows)]
        OcrBackend::Windows => Arc::new(xchg_ocr::WindowsOcrEngine::new(&config.language)),
        #[cfg(not(windows))]
        OcrBackend::Windows => {
            tracing::warn!("Windows OCR is not available on this platform, using tesseract");
            Arc::new(TesseractEngine::locate(
                config.tesseract_path.as_deref(),
                &config.language,
            ))
        }
    }
}
