//! Application configuration

use crate::AppError;
use app_fs::{ArchiveFormat, EncodingHint};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub viewer: ViewerConfig,
    pub archive: ArchiveConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Images decoded ahead on each side of the current one
    pub preload_count: usize,
    /// Background decode threads
    pub prefetch_workers: usize,
    /// Decoded images larger than this on either axis are downscaled
    pub max_decode_dimension: Option<u32>,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            preload_count: 3,
            prefetch_workers: 2,
            max_decode_dimension: None,
        }
    }
}

impl ViewerConfig {
    /// Prefetch cache capacity: the current image plus the window on both sides
    pub fn cache_capacity(&self) -> usize {
        self.preload_count.saturating_mul(2).saturating_add(1)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchiveConfig {
    /// Legacy encoding assumed for non-UTF-8 member names
    pub filename_encoding: EncodingHint,
    /// Enabled container formats, in probing order
    pub formats: Vec<ArchiveFormat>,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            filename_encoding: EncodingHint::Auto,
            formats: ArchiveFormat::available(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter when RUST_LOG is unset
    pub level: String,
    /// Log files older than this are removed at startup
    pub keep_days: u64,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            keep_days: 7,
        }
    }
}

impl AppConfig {
    /// Load configuration from the default location
    pub fn load() -> Result<Self, AppError> {
        Self::load_from(Self::config_path())
    }

    /// Load configuration from a file; defaults when it does not exist
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, AppError> {
        let config_path = path.as_ref();

        if config_path.exists() {
            let content = std::fs::read_to_string(config_path)
                .map_err(|e| AppError::Config(format!("{}: {}", config_path.display(), e)))?;
            let config: Self = toml::from_str(&content)
                .map_err(|e| AppError::Config(format!("{}: {}", config_path.display(), e)))?;
            tracing::info!("Configuration loaded from {:?}", config_path);
            Ok(config)
        } else {
            tracing::info!("Using default configuration");
            Ok(Self::default())
        }
    }

    /// Save configuration to the default location
    pub fn save(&self) -> anyhow::Result<()> {
        self.save_to(Self::config_path())
    }

    pub fn save_to(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let config_path = path.as_ref();

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;

        tracing::info!("Configuration saved to {:?}", config_path);
        Ok(())
    }

    /// Get the configuration file path
    pub fn config_path() -> PathBuf {
        ProjectDirs::from("com", "Honeycomb", "Honeycomb")
            .map(|dirs| dirs.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("./config.toml"))
    }
}
