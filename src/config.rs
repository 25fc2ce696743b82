//! Configuration file support.
//!
//! Settings live in a small versioned JSON file in the user's config
//! directory. The session itself only sees [`SessionSettings`], the runtime
//! projection of the file.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_REGION_NAME, HIGHLIGHT_DURATION, MIN_REGION_SIZE, RESIZE_DEBOUNCE,
};

/// Log level setting for the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Show only errors
    Error,
    /// Show errors and warnings
    Warn,
    /// Show errors, warnings, and info messages
    #[default]
    Info,
    /// Show debug-level logging
    Debug,
    /// Show all log messages including trace
    Trace,
}

impl LogLevel {
    /// Convert to log crate's LevelFilter.
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Current configuration file format version.
/// Increment this when making breaking changes to the config format.
pub const CONFIG_VERSION: u32 = 1;

/// Application configuration as stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Version of the configuration file format
    pub version: u32,

    /// Application name (for identification)
    #[serde(default = "default_app_name")]
    pub app_name: String,

    /// User preferences
    #[serde(default)]
    pub preferences: UserPreferences,
}

fn default_app_name() -> String {
    "hyperslide".to_string()
}

/// User preferences section of the config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserPreferences {
    /// Log verbosity level
    #[serde(default)]
    pub log_level: LogLevel,

    /// Database file used when none is given on the command line
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,

    /// Smallest drawn region, in pixels, per side
    #[serde(default = "default_min_region_size")]
    pub min_region_size: f64,

    /// Quiet period before regions are repositioned after a resize
    #[serde(default = "default_resize_debounce_ms")]
    pub resize_debounce_ms: u64,

    /// Name given to freshly drawn regions
    #[serde(default = "default_region_name")]
    pub default_region_name: String,

    /// Whether editing starts locked
    #[serde(default = "default_start_locked")]
    pub start_locked: bool,

    /// How long a link target region stays highlighted
    #[serde(default = "default_highlight_duration_ms")]
    pub highlight_duration_ms: u64,
}

fn default_database_path() -> PathBuf {
    PathBuf::from("data").join("database.json")
}

fn default_min_region_size() -> f64 {
    MIN_REGION_SIZE
}

fn default_resize_debounce_ms() -> u64 {
    RESIZE_DEBOUNCE.as_millis() as u64
}

fn default_region_name() -> String {
    DEFAULT_REGION_NAME.to_string()
}

fn default_start_locked() -> bool {
    true
}

fn default_highlight_duration_ms() -> u64 {
    HIGHLIGHT_DURATION.as_millis() as u64
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            log_level: LogLevel::default(),
            database_path: default_database_path(),
            min_region_size: default_min_region_size(),
            resize_debounce_ms: default_resize_debounce_ms(),
            default_region_name: default_region_name(),
            start_locked: default_start_locked(),
            highlight_duration_ms: default_highlight_duration_ms(),
        }
    }
}

/// Runtime knobs handed to the session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSettings {
    pub min_region_size: f64,
    pub resize_debounce: Duration,
    pub default_region_name: String,
    pub start_locked: bool,
    pub highlight_duration: Duration,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self::from(&UserPreferences::default())
    }
}

impl From<&UserPreferences> for SessionSettings {
    fn from(prefs: &UserPreferences) -> Self {
        Self {
            min_region_size: prefs.min_region_size,
            resize_debounce: Duration::from_millis(prefs.resize_debounce_ms),
            default_region_name: prefs.default_region_name.clone(),
            start_locked: prefs.start_locked,
            highlight_duration: Duration::from_millis(prefs.highlight_duration_ms),
        }
    }
}

impl AppConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self {
            version: CONFIG_VERSION,
            app_name: default_app_name(),
            preferences: UserPreferences::default(),
        }
    }

    /// Session settings derived from the preferences.
    pub fn session_settings(&self) -> SessionSettings {
        SessionSettings::from(&self.preferences)
    }

    /// Serialize the configuration to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;

        if config.version > CONFIG_VERSION {
            return Err(ConfigError::VersionTooNew {
                file_version: config.version,
                supported_version: CONFIG_VERSION,
            });
        }

        if !(config.preferences.min_region_size.is_finite()
            && config.preferences.min_region_size >= 0.0)
        {
            return Err(ConfigError::InvalidValue {
                field: "min_region_size",
                value: config.preferences.min_region_size.to_string(),
            });
        }

        Ok(config)
    }

    /// Get the default config filename.
    pub fn default_filename() -> &'static str {
        "hyperslide-config.json"
    }

    /// Get the default config file path.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn default_path() -> Option<PathBuf> {
        // Try to use XDG config directory, fall back to home directory
        if let Some(config_dir) = dirs::config_dir() {
            Some(config_dir.join("hyperslide").join(Self::default_filename()))
        } else {
            dirs::home_dir().map(|home_dir| {
                home_dir
                    .join(".config")
                    .join("hyperslide")
                    .join(Self::default_filename())
            })
        }
    }

    /// Load configuration from the default path, falling back to defaults.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_from_default_path() -> Self {
        let Some(path) = Self::default_path() else {
            log::warn!("Could not determine config directory, using defaults");
            return Self::default();
        };
        if !path.exists() {
            log::debug!("No config file found at {:?}", path);
            return Self::default();
        }

        match std::fs::read_to_string(&path) {
            Ok(json) => match Self::from_json(&json) {
                Ok(config) => {
                    log::info!("Loaded configuration from {:?}", path);
                    config
                }
                Err(e) => {
                    log::warn!("Failed to parse config file {:?}: {}", path, e);
                    Self::default()
                }
            },
            Err(e) => {
                log::warn!("Failed to read config file {:?}: {}", path, e);
                Self::default()
            }
        }
    }

    /// Save configuration to the default path, returning where it went.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn save_to_default_path(&self) -> Result<PathBuf, ConfigError> {
        let path = Self::default_path().ok_or_else(|| {
            ConfigError::IoError(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "Could not determine config directory",
            ))
        })?;
        self.save_to(&path)?;
        Ok(path)
    }

    /// Save configuration to `path`, creating missing parent directories.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn save_to(&self, path: &std::path::Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = self.to_json()?;
        std::fs::write(path, json)?;
        log::info!("Saved configuration to {:?}", path);
        Ok(())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// JSON parsing error
    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] serde_json::Error),

    /// Configuration version is newer than supported
    #[error(
        "Configuration file version {file_version} is newer than supported version {supported_version}"
    )]
    VersionTooNew {
        file_version: u32,
        supported_version: u32,
    },

    /// A preference holds a value the session cannot use
    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: &'static str, value: String },

    /// I/O error when reading/writing config
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = AppConfig::new().session_settings();
        assert_eq!(settings.min_region_size, 20.0);
        assert_eq!(settings.resize_debounce, Duration::from_millis(100));
        assert_eq!(settings.highlight_duration, Duration::from_millis(3000));
        assert_eq!(settings.default_region_name, "New Region");
        assert!(settings.start_locked);
    }

    #[test]
    fn test_json_roundtrip() {
        let mut config = AppConfig::new();
        config.preferences.log_level = LogLevel::Debug;
        config.preferences.start_locked = false;
        let parsed = AppConfig::from_json(&config.to_json().unwrap()).unwrap();
        assert_eq!(parsed.preferences.log_level, LogLevel::Debug);
        assert!(!parsed.preferences.start_locked);
    }

    #[test]
    fn test_missing_preferences_use_defaults() {
        let config =
            AppConfig::from_json(r#"{ "version": 1, "preferences": { "log_level": "trace" } }"#)
                .unwrap();
        assert_eq!(config.preferences.log_level.to_level_filter(), log::LevelFilter::Trace);
        assert_eq!(config.preferences.resize_debounce_ms, 100);
        assert_eq!(config.app_name, "hyperslide");
    }

    #[test]
    fn test_newer_version_rejected() {
        let result = AppConfig::from_json(r#"{ "version": 99 }"#);
        assert!(matches!(result, Err(ConfigError::VersionTooNew { .. })));
    }

    #[test]
    fn test_negative_min_size_rejected() {
        let result = AppConfig::from_json(
            r#"{ "version": 1, "preferences": { "min_region_size": -5.0 } }"#,
        );
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn test_save_to_writes_readable_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("hyperslide").join("config.json");

        let mut config = AppConfig::new();
        config.preferences.highlight_duration_ms = 1500;
        config.save_to(&path).unwrap();

        let loaded = AppConfig::from_json(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(loaded.session_settings().highlight_duration, Duration::from_millis(1500));
    }
}
