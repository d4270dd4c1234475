//! Atomic JSON persistence for stats and history.

use crate::{AppError, AppResult};

use std::{
    fs,
    io::Write,
    panic::Location,
    path::{Path, PathBuf},
};

use error_location::ErrorLocation;
use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, instrument};

/// Write `contents` to `path` via a synced temp file and a rename.
#[track_caller]
pub(crate) fn write_atomic(path: &Path, contents: &[u8]) -> AppResult<()> {
    let storage_error = |action: &str, e: std::io::Error| AppError::StorageError {
        reason: format!("Failed to {} {:?}: {}", action, path, e),
        location: ErrorLocation::from(Location::caller()),
    };

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| storage_error("create directory for", e))?;
    }

    let temp_path = temp_path_for(path);

    let mut temp_file =
        fs::File::create(&temp_path).map_err(|e| storage_error("create temp file for", e))?;
    temp_file
        .write_all(contents)
        .map_err(|e| storage_error("write temp file for", e))?;
    temp_file
        .sync_all()
        .map_err(|e| storage_error("sync temp file for", e))?;
    fs::rename(&temp_path, path).map_err(|e| storage_error("replace", e))?;

    Ok(())
}

/// Serialize `value` as pretty JSON and write it atomically.
#[track_caller]
#[instrument(skip(value))]
pub(crate) fn save_json<T: Serialize>(path: &Path, value: &T) -> AppResult<()> {
    let contents = serde_json::to_vec_pretty(value).map_err(|e| AppError::StorageError {
        reason: format!("Failed to serialize {:?}: {}", path, e),
        location: ErrorLocation::from(Location::caller()),
    })?;

    write_atomic(path, &contents)?;
    debug!(path = ?path, bytes = contents.len(), "Saved");

    Ok(())
}

/// Read JSON from `path`. A missing file is `Ok(None)`.
#[track_caller]
#[instrument]
pub(crate) fn load_json<T: DeserializeOwned>(path: &Path) -> AppResult<Option<T>> {
    if !path.exists() {
        return Ok(None);
    }

    let contents = fs::read(path).map_err(|e| AppError::StorageError {
        reason: format!("Failed to read {:?}: {}", path, e),
        location: ErrorLocation::from(Location::caller()),
    })?;

    let value = serde_json::from_slice(&contents).map_err(|e| AppError::StorageError {
        reason: format!("Failed to parse {:?}: {}", path, e),
        location: ErrorLocation::from(Location::caller()),
    })?;

    Ok(Some(value))
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
