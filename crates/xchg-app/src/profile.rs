use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use xchg_config::Config;
use xchg_types::{CaptureRegion, RegionSlot};

const DEFAULT_CONFIG_FILE: &str = "config.json";

/// `--config`, then `XCHG_CONFIG`, then `config.json` in the working directory
pub fn resolve_config_path(explicit: Option<PathBuf>) -> PathBuf {
    explicit
        .or_else(|| std::env::var_os("XCHG_CONFIG").map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
}

/// Config exactly as stored on disk; defaults when the file does not exist
pub fn read_config(path: &Path) -> anyhow::Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let reader = BufReader::new(file);
    serde_json::from_reader(reader).with_context(|| format!("Failed to parse {}", path.display()))
}

/// Stored config with environment overrides applied
pub fn load_config(path: &Path) -> anyhow::Result<Config> {
    let mut config = read_config(path)?;
    config.apply_env_overrides();
    Ok(config)
}

/// Write back the sections commands change (regions and calc). Everything else
/// keeps its stored value, so environment overrides never reach the file.
pub fn save_user_settings(path: &Path, current: &Config) -> anyhow::Result<()> {
    let mut stored = read_config(path)?;
    stored.regions = current.regions.clone();
    stored.calc = current.calc.clone();
    save_config(path, &stored)
}

/// Store one capture region, refusing locked regions and tiny selections
pub fn store_region(
    path: &Path,
    slot: RegionSlot,
    region: CaptureRegion,
) -> anyhow::Result<Config> {
    let mut config = read_config(path)?;
    if config.regions.locked {
        bail!("Regions are locked. Unlock to reselect.");
    }
    if !region.is_selectable() {
        bail!(
            "Region too small: {region}. Select at least {min}x{min} pixels.",
            min = CaptureRegion::MIN_SELECTION
        );
    }

    config.regions.set(slot, region);
    save_config(path, &config)?;
    Ok(config)
}

/// Rewrite the whole config file
pub fn save_config(path: &Path, config: &Config) -> anyhow::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, serde_json::to_string_pretty(config)?)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    tracing::debug!("Saved config to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use xchg_types::Mode;

    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("xchg-profile-{}-{name}", std::process::id()))
    }

    #[test]
    fn missing_file_gives_defaults() {
        let config = load_config(&temp_path("missing.json")).unwrap();
        assert_eq!(config.calc.mode, Mode::Auto);
        assert!(config.regions.ratio.is_none());
    }

    #[test]
    fn saved_config_loads_back() {
        let path = temp_path("saved/config.json");
        let mut config = Config::default();
        config
            .regions
            .set(RegionSlot::Ratio, CaptureRegion::new(100, 200, 80, 20));
        config.calc.mode = Mode::HaveToWant;

        save_config(&path, &config).unwrap();
        let loaded = load_config(&path).unwrap();
        assert_eq!(
            loaded.regions.get(RegionSlot::Ratio),
            Some(CaptureRegion::new(100, 200, 80, 20))
        );
        assert_eq!(loaded.calc.mode, Mode::HaveToWant);

        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn malformed_file_is_an_error() {
        let path = temp_path("broken.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(load_config(&path).is_err());
        let _ = fs::remove_file(path);
    }

    #[test]
    fn user_settings_leave_other_sections_as_stored() {
        let path = temp_path("user-settings.json");
        let mut stored = Config::default();
        stored.sampler.interval_ms = 5000;
        save_config(&path, &stored).unwrap();

        let mut current = read_config(&path).unwrap();
        current.sampler.interval_ms = 300;
        current.ocr.tesseract_path = Some("/opt/tesseract".to_string());
        current.calc.swap_sides = true;
        current
            .regions
            .set(RegionSlot::Left, CaptureRegion::new(5, 5, 40, 20));
        save_user_settings(&path, &current).unwrap();

        let saved = read_config(&path).unwrap();
        assert_eq!(saved.sampler.interval_ms, 5000);
        assert_eq!(saved.ocr.tesseract_path, None);
        assert!(saved.calc.swap_sides);
        assert_eq!(saved.regions.left, Some(CaptureRegion::new(5, 5, 40, 20)));
        let _ = fs::remove_file(path);
    }

    #[test]
    fn store_region_saves_only_what_is_on_disk() {
        let path = temp_path("store-region.json");
        let mut stored = Config::default();
        stored.sampler.interval_ms = 4000;
        save_config(&path, &stored).unwrap();

        let region = CaptureRegion::new(-100, 50, 60, 20);
        store_region(&path, RegionSlot::Ratio, region).unwrap();

        let saved = read_config(&path).unwrap();
        assert_eq!(saved.regions.ratio, Some(region));
        assert_eq!(saved.sampler.interval_ms, 4000);
        let _ = fs::remove_file(path);
    }

    #[test]
    fn store_region_refuses_locked_and_tiny_regions() {
        let path = temp_path("store-region-refused.json");
        let err = store_region(&path, RegionSlot::Left, CaptureRegion::new(0, 0, 9, 9))
            .unwrap_err();
        assert!(err.to_string().starts_with("Region too small"), "{err}");

        let mut locked = Config::default();
        locked.regions.locked = true;
        save_config(&path, &locked).unwrap();
        let err = store_region(&path, RegionSlot::Left, CaptureRegion::new(0, 0, 90, 20))
            .unwrap_err();
        assert_eq!(err.to_string(), "Regions are locked. Unlock to reselect.");
        assert!(read_config(&path).unwrap().regions.left.is_none());
        let _ = fs::remove_file(path);
    }

    #[test]
    fn explicit_path_wins() {
        let path = resolve_config_path(Some(PathBuf::from("custom.json")));
        assert_eq!(path, PathBuf::from("custom.json"));
    }
}
