//! Application configuration.
//!
//! Loaded from `config.toml` in the platform data directory. A missing file
//! yields the defaults.

use chrono::FixedOffset;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Storage backend selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Single JSON document (`db.json`)
    #[default]
    Json,
    /// SQLite database (`logitrack.db`)
    Sqlite,
}

impl std::fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageBackend::Json => write!(f, "JSON file"),
            StorageBackend::Sqlite => write!(f, "SQLite"),
        }
    }
}

impl StorageBackend {
    /// Default file name inside the data directory.
    pub fn default_file_name(&self) -> &'static str {
        match self {
            StorageBackend::Json => "db.json",
            StorageBackend::Sqlite => "logitrack.db",
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application version
    pub version: String,
    /// Data directory path
    #[serde(skip)]
    pub data_dir: PathBuf,
    /// Storage settings
    #[serde(default)]
    pub storage: StorageSettings,
    /// Scoring settings
    #[serde(default)]
    pub scoring: ScoringSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            data_dir: PathBuf::new(),
            storage: StorageSettings::default(),
            scoring: ScoringSettings::default(),
        }
    }
}

impl AppConfig {
    /// Resolved path of the store file.
    pub fn store_path(&self) -> PathBuf {
        self.storage
            .path
            .clone()
            .unwrap_or_else(|| self.data_dir.join(self.storage.backend.default_file_name()))
    }
}

/// Storage-related settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageSettings {
    /// Which backend to use
    #[serde(default)]
    pub backend: StorageBackend,
    /// Explicit store path (defaults to the data directory)
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// Scoring-related settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringSettings {
    /// Rating applied to routes closed without a rating (1-5)
    pub default_rating: u8,
    /// Offset from UTC, in minutes, used to group routes into calendar days
    pub utc_offset_minutes: i32,
}

impl Default for ScoringSettings {
    fn default() -> Self {
        Self {
            default_rating: 3,
            utc_offset_minutes: 0,
        }
    }
}

impl ScoringSettings {
    /// Validate settings values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=5).contains(&self.default_rating) {
            return Err(ConfigError::InvalidValue(format!(
                "scoring.default_rating must be between 1 and 5, got {}",
                self.default_rating
            )));
        }
        // chrono::FixedOffset accepts strictly less than one day.
        if self.utc_offset_minutes.abs() >= 24 * 60 {
            return Err(ConfigError::InvalidValue(format!(
                "scoring.utc_offset_minutes out of range: {}",
                self.utc_offset_minutes
            )));
        }
        Ok(())
    }

    /// Zone used to group routes into calendar days.
    pub fn utc_offset(&self) -> Result<FixedOffset, ConfigError> {
        FixedOffset::east_opt(self.utc_offset_minutes * 60).ok_or_else(|| {
            ConfigError::InvalidValue(format!(
                "scoring.utc_offset_minutes out of range: {}",
                self.utc_offset_minutes
            ))
        })
    }
}

/// Get the application data directory.
pub fn get_data_dir() -> PathBuf {
    directories::ProjectDirs::from("com", "logitrack", "LogiTrack")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Get the configuration file path.
pub fn get_config_path() -> PathBuf {
    get_data_dir().join("config.toml")
}

/// Load application configuration from the default location.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from(&get_config_path())
}

/// Load application configuration from a specific file.
pub fn load_config_from(path: &Path) -> Result<AppConfig, ConfigError> {
    let data_dir = path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(get_data_dir);

    if !path.exists() {
        let config = AppConfig {
            data_dir,
            ..Default::default()
        };
        return Ok(config);
    }

    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;

    let mut config: AppConfig =
        toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))?;

    config.data_dir = data_dir;
    config.scoring.validate()?;

    Ok(config)
}

/// Save application configuration to a file.
pub fn save_config_to(config: &AppConfig, path: &Path) -> Result<(), ConfigError> {
    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| ConfigError::IoError(e.to_string()))?;
    }

    let content =
        toml::to_string_pretty(config).map_err(|e| ConfigError::SerializeError(e.to_string()))?;

    std::fs::write(path, content).map_err(|e| ConfigError::IoError(e.to_string()))?;

    Ok(())
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Serialize error: {0}")]
    SerializeError(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),
}
