//! Host settings (JSON file, path overridable via `CONSILIUM_SETTINGS`).

use std::fs;
use std::path::{Path, PathBuf};

use consilium_core::EngineConfig;
use serde::{Deserialize, Serialize};
use tracing::warn;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(default)]
pub struct AppSettings {
    /// Fixed delay between sampler ticks, in milliseconds.
    pub tick_interval_ms: u64,
    /// Action history ring capacity.
    pub history_capacity: usize,
    /// Case-sensitive voice trigger substring.
    pub trigger_phrase: String,
    /// Path to an ONNX strategy classifier. `None` selects the stub model.
    pub model_path: Option<PathBuf>,
    /// Default tracing filter when `RUST_LOG` is unset.
    pub log_filter: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            tick_interval_ms: 1_000,
            history_capacity: 1_000,
            trigger_phrase: "commander".into(),
            model_path: None,
            log_filter: "info".into(),
        }
    }
}

impl AppSettings {
    pub fn normalize(&mut self) {
        self.tick_interval_ms = self.tick_interval_ms.clamp(100, 60_000);
        self.history_capacity = self.history_capacity.clamp(10, 100_000);
        self.trigger_phrase = self.trigger_phrase.trim().to_string();
        if self.trigger_phrase.is_empty() {
            self.trigger_phrase = AppSettings::default().trigger_phrase;
        }
        if self.log_filter.trim().is_empty() {
            self.log_filter = AppSettings::default().log_filter;
        }
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            tick_interval: std::time::Duration::from_millis(self.tick_interval_ms),
            history_capacity: self.history_capacity,
            trigger_phrase: self.trigger_phrase.clone(),
        }
    }
}

pub fn default_settings_path() -> PathBuf {
    std::env::var_os("CONSILIUM_SETTINGS")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("consilium.json"))
}

/// Load settings, falling back to defaults when the file is missing or
/// unreadable. A parse error is not fatal to the host.
pub fn load_settings(path: &Path) -> AppSettings {
    let mut settings = match fs::read_to_string(path) {
        Ok(raw) => match serde_json::from_str::<AppSettings>(&raw) {
            Ok(settings) => settings,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "settings file unparsable — using defaults");
                AppSettings::default()
            }
        },
        Err(_) => AppSettings::default(),
    };
    settings.normalize();
    settings
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_clamps_out_of_range_values() {
        let mut settings = AppSettings {
            tick_interval_ms: 1,
            history_capacity: 0,
            trigger_phrase: "   ".into(),
            model_path: None,
            log_filter: "".into(),
        };
        settings.normalize();
        assert_eq!(settings.tick_interval_ms, 100);
        assert_eq!(settings.history_capacity, 10);
        assert_eq!(settings.trigger_phrase, "commander");
        assert_eq!(settings.log_filter, "info");
    }

    #[test]
    fn settings_parse_with_camel_case_fields_and_defaults() {
        let settings: AppSettings =
            serde_json::from_str(r#"{"tickIntervalMs": 500, "triggerPhrase": "sergeant"}"#)
                .expect("parse settings");
        assert_eq!(settings.tick_interval_ms, 500);
        assert_eq!(settings.trigger_phrase, "sergeant");
        assert_eq!(settings.history_capacity, 1_000);
        assert!(settings.model_path.is_none());
    }

    #[test]
    fn engine_config_carries_the_normalized_values() {
        let mut settings = AppSettings::default();
        settings.tick_interval_ms = 250;
        settings.normalize();
        let config = settings.engine_config();
        assert_eq!(config.tick_interval, std::time::Duration::from_millis(250));
        assert_eq!(config.history_capacity, 1_000);
        assert_eq!(config.trigger_phrase, "commander");
    }
}
