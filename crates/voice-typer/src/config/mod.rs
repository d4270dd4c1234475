mod audio_config;
mod behaviour_config;
#[allow(clippy::module_inception)]
mod config;
mod hotkey_config;
mod whisper_config;

pub(crate) use {
    audio_config::AudioConfig, behaviour_config::BehaviourConfig, config::Config,
    hotkey_config::HotkeyConfig, whisper_config::WhisperConfig,
};

use crate::{AppError, AppResult};

use std::panic::Location;

use directories::ProjectDirs;
use error_location::ErrorLocation;

pub(crate) const DEFAULT_AUTO_PASTE: bool = true;
pub(crate) const DEFAULT_RESTORE_CLIPBOARD: bool = true;
pub(crate) const DEFAULT_USE_GPU: bool = true;
pub(crate) const DEFAULT_LANGUAGE: &str = "en";

pub(crate) fn default_auto_paste() -> bool {
    DEFAULT_AUTO_PASTE
}

pub(crate) fn default_restore_clipboard() -> bool {
    DEFAULT_RESTORE_CLIPBOARD
}

pub(crate) fn default_use_gpu() -> bool {
    DEFAULT_USE_GPU
}

pub(crate) fn default_language() -> String {
    DEFAULT_LANGUAGE.to_string()
}

/// Platform config/data directories for the application.
#[track_caller]
pub(crate) fn project_dirs() -> AppResult<ProjectDirs> {
    ProjectDirs::from("com", "voice-typer", "Voice-Typer").ok_or_else(|| AppError::ConfigError {
        reason: "Failed to get project directories".to_string(),
        location: ErrorLocation::from(Location::caller()),
    })
}
