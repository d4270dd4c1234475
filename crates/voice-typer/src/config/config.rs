//! Configuration management for voice-typer.
//!
//! Handles loading and saving TOML configuration files with cross-platform
//! paths, lazy validation, and atomic write operations.

use crate::{
    AppError, AppResult,
    config::{AudioConfig, BehaviourConfig, HotkeyConfig, WhisperConfig, default_language,
        default_use_gpu, project_dirs},
    storage,
};

use std::{
    fs,
    panic::Location,
    path::{Path, PathBuf},
};

use error_location::ErrorLocation;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

/// Main configuration struct.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Push-to-talk hotkey.
    #[serde(default)]
    pub hotkey: HotkeyConfig,
    /// Whisper model configuration.
    pub whisper: WhisperConfig,
    /// Audio device configuration.
    #[serde(default)]
    pub audio: AudioConfig,
    /// Application behavior settings.
    #[serde(default)]
    pub behavior: BehaviourConfig,
}

impl Config {
    /// Load configuration from the platform config directory, creating a
    /// default file if none exists.
    ///
    /// Note: This does NOT validate the model path exists. Call
    /// `validate_model_path()` before building the transcriber, so a hotkey
    /// can still be recorded before the model has been downloaded.
    #[track_caller]
    #[instrument]
    pub fn load() -> AppResult<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            info!("No config found, creating default");
            let config = Self::with_data_dir(project_dirs()?.data_dir());
            config.save_to(&config_path)?;

            warn!(
                model_path = ?config.whisper.model_path,
                "Default config created. Whisper model must be downloaded before recording."
            );

            Ok(config)
        }
    }

    /// Parse the configuration file at `path`.
    #[track_caller]
    #[instrument]
    pub fn load_from(path: &Path) -> AppResult<Self> {
        let contents = fs::read_to_string(path).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to read config: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        let config: Config = toml::from_str(&contents).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to parse config: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        info!(config_path = ?path, hotkey = %config.hotkey.spec(), "Configuration loaded");

        Ok(config)
    }

    /// Defaults, with the model expected under `data_dir/models`.
    pub fn with_data_dir(data_dir: &Path) -> Self {
        Config {
            hotkey: HotkeyConfig::default(),
            whisper: WhisperConfig {
                model_path: data_dir.join("models").join("ggml-base.en.bin"),
                use_gpu: default_use_gpu(),
                language: default_language(),
            },
            audio: AudioConfig::default(),
            behavior: BehaviourConfig::default(),
        }
    }

    /// Validate that the Whisper model file exists at the configured path.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn validate_model_path(&self) -> AppResult<()> {
        if !self.whisper.model_path.is_file() {
            return Err(AppError::ConfigError {
                reason: format!(
                    "Whisper model not found at: {:?}. Download a model or set [whisper].model_path.",
                    self.whisper.model_path
                ),
                location: ErrorLocation::from(Location::caller()),
            });
        }
        Ok(())
    }

    /// Save configuration to the platform config directory.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn save(&self) -> AppResult<()> {
        self.save_to(&Self::config_path()?)
    }

    /// Save configuration to `path` using the atomic write pattern.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn save_to(&self, path: &Path) -> AppResult<()> {
        let contents = toml::to_string_pretty(self).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to serialize config: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        storage::write_atomic(path, contents.as_bytes()).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to write config: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        info!(config_path = ?path, "Configuration saved (atomic write)");

        Ok(())
    }

    #[track_caller]
    fn config_path() -> AppResult<PathBuf> {
        Ok(project_dirs()?.config_dir().join("config.toml"))
    }
}
