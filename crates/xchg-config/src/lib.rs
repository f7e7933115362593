use std::env;

use serde::{Deserialize, Serialize};

use self::calc::CalcConfig;
use self::log::LogConfig;
use self::ocr::OcrConfig;
use self::regions::RegionsConfig;
use self::sampler::SamplerConfig;

pub mod calc;
pub mod log;
pub mod ocr;
pub mod regions;
pub mod sampler;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub sampler: SamplerConfig,
    pub ocr: OcrConfig,
    pub regions: RegionsConfig,
    pub calc: CalcConfig,
    pub log: LogConfig,
}

impl Config {
    /// Environment wins over whatever was read from disk
    pub fn apply_env_overrides(&mut self) {
        if let Some(interval_ms) = env::var("XCHG_INTERVAL_MS")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            self.sampler.interval_ms = interval_ms;
        }

        if let Ok(path) = env::var("TESSERACT_PATH")
            && !path.trim().is_empty()
        {
            self.ocr.tesseract_path = Some(path);
        }

        if let Ok(level) = env::var("XCHG_LOG_LEVEL")
            && !level.trim().is_empty()
        {
            self.log.level = level;
        }
    }
}

#[cfg(test)]
mod tests {
    use xchg_types::{CaptureRegion, Mode, RegionSlot};

    use super::*;
    use crate::ocr::OcrBackend;

    #[test]
    fn empty_json_gives_defaults() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config.sampler.interval_ms, 1200);
        assert!(config.sampler.full_scan_fallback);
        assert_eq!(config.ocr.backend, OcrBackend::Tesseract);
        assert_eq!(config.ocr.language, "eng");
        assert_eq!(config.calc.mode, Mode::Auto);
        assert!(!config.calc.swap_sides);
        assert_eq!(config.log.file_name, "app.log");
        assert!(!config.regions.is_complete());
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let json = r#"{
            "calc": { "mode": "want_to_have" },
            "regions": { "ratio": { "x": 10, "y": 20, "width": 120, "height": 30 } }
        }"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.calc.mode, Mode::WantToHave);
        assert!(!config.calc.swap_sides);
        assert_eq!(
            config.regions.get(RegionSlot::Ratio),
            Some(CaptureRegion::new(10, 20, 120, 30))
        );
        assert_eq!(
            config.regions.missing(),
            vec![RegionSlot::Left, RegionSlot::Right]
        );
    }

    #[test]
    fn serialized_config_reads_back() {
        let mut config = Config::default();
        config
            .regions
            .set(RegionSlot::Left, CaptureRegion::new(-1920, 400, 90, 24));
        config.calc.swap_sides = true;

        let text = serde_json::to_string_pretty(&config).unwrap();
        let back: Config = serde_json::from_str(&text).unwrap();
        assert_eq!(
            back.regions.get(RegionSlot::Left),
            Some(CaptureRegion::new(-1920, 400, 90, 24))
        );
        assert!(back.calc.swap_sides);
    }
}
