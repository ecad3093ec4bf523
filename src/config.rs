//! Application configuration.
//!
//! Every field has a default, so a missing or partial configuration is fine.
//! Native builds read a JSON file named by `WORLD_PICKER_CONFIG`; web builds
//! read the same JSON from localStorage.

use crate::state::{MAX_ZOOM, MIN_ZOOM};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Where the selection is persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BackendConfig {
    /// In-memory store seeded with demo data
    #[default]
    Memory,
    /// REST service exposing `/me/countries`
    Http { base_url: String },
}

/// Errors that can occur while loading the configuration.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// The configuration source could not be read.
    Unreadable(String),
    /// The configuration is not valid JSON for [`AppConfig`].
    Parse(String),
    /// The values are out of range.
    Invalid(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Unreadable(msg) => write!(f, "Config unreadable: {}", msg),
            ConfigError::Parse(msg) => write!(f, "Config parse error: {}", msg),
            ConfigError::Invalid(msg) => write!(f, "Invalid config: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Lower zoom bound (multiplier on the fitted scale)
    pub min_zoom: f32,
    /// Upper zoom bound
    pub max_zoom: f32,
    /// Quiet period before a changed selection is saved, in milliseconds
    pub save_debounce_ms: u64,
    /// Selection persistence
    pub backend: BackendConfig,
    /// Topology file to load instead of the bundled one (native only)
    pub topology_path: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            min_zoom: MIN_ZOOM,
            max_zoom: MAX_ZOOM,
            save_debounce_ms: 400,
            backend: BackendConfig::default(),
            topology_path: None,
        }
    }
}

impl AppConfig {
    /// Environment variable naming the native config file.
    pub const ENV_VAR: &'static str = "WORLD_PICKER_CONFIG";

    /// localStorage key holding the web config.
    #[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
    const STORAGE_KEY: &'static str = "world_picker_config";

    pub fn save_debounce(&self) -> Duration {
        Duration::from_millis(self.save_debounce_ms)
    }

    /// Parses and validates a JSON configuration.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that the zoom bounds are usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.min_zoom.is_finite() && self.max_zoom.is_finite()) {
            return Err(ConfigError::Invalid("zoom bounds must be finite".to_string()));
        }
        if self.min_zoom <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "min_zoom must be positive, got {}",
                self.min_zoom
            )));
        }
        if self.min_zoom > self.max_zoom {
            return Err(ConfigError::Invalid(format!(
                "min_zoom {} exceeds max_zoom {}",
                self.min_zoom, self.max_zoom
            )));
        }
        Ok(())
    }

    /// Loads the configuration, falling back to defaults on any error.
    pub fn load() -> Self {
        match Self::read() {
            Ok(Some(config)) => {
                log::info!("Loaded configuration: {:?}", config);
                config
            }
            Ok(None) => Self::default(),
            Err(e) => {
                log::warn!("{}, using defaults", e);
                Self::default()
            }
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn read() -> Result<Option<Self>, ConfigError> {
        let Ok(path) = std::env::var(Self::ENV_VAR) else {
            return Ok(None);
        };
        let json = std::fs::read_to_string(&path)
            .map_err(|e| ConfigError::Unreadable(format!("{}: {}", path, e)))?;
        Self::from_json(&json).map(Some)
    }

    #[cfg(target_arch = "wasm32")]
    fn read() -> Result<Option<Self>, ConfigError> {
        let storage = match web_sys::window().map(|w| w.local_storage()) {
            Some(Ok(Some(storage))) => storage,
            _ => return Ok(None),
        };

        match storage.get_item(Self::STORAGE_KEY) {
            Ok(Some(json)) => Self::from_json(&json).map(Some),
            Ok(None) => Ok(None),
            Err(e) => Err(ConfigError::Unreadable(format!("{:?}", e))),
        }
    }
}
