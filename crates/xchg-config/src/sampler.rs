use serde::{Deserialize, Serialize};

fn default_interval_ms() -> u64 {
    1200
}

fn default_full_scan_fallback() -> bool {
    true
}

fn default_start_paused() -> bool {
    false
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct SamplerConfig {
    /// Delay between capture ticks
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
    /// Retry a region with the slow multi-pass scan when the fast pass reads nothing
    #[serde(default = "default_full_scan_fallback")]
    pub full_scan_fallback: bool,
    #[serde(default = "default_start_paused")]
    pub start_paused: bool,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            full_scan_fallback: default_full_scan_fallback(),
            start_paused: default_start_paused(),
        }
    }
}
