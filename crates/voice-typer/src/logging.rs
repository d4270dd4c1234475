//! Tracing setup: stderr plus a daily-rolling file in the data directory.

use crate::{AppError, AppResult};

use std::{fs, panic::Location, path::Path};

use error_location::ErrorLocation;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used when `RUST_LOG` is not set.
pub(crate) const DEFAULT_FILTER: &str = "voice_typer=debug,voice_typer_core=debug";

/// File name prefix of the rolling log.
const LOG_FILE_PREFIX: &str = "voice-typer.log";

/// Install the global subscriber.
///
/// The returned guard flushes the file writer; hold it for the life of the
/// process.
#[track_caller]
pub(crate) fn init(log_dir: &Path) -> AppResult<WorkerGuard> {
    fs::create_dir_all(log_dir)?;

    let file_appender = tracing_appender::rolling::daily(log_dir, LOG_FILE_PREFIX);
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(env_filter())
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(fmt::layer().with_ansi(false).with_writer(file_writer))
        .try_init()
        .map_err(|e| AppError::LoggingError {
            reason: format!("Failed to install subscriber: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

    Ok(guard)
}

/// `RUST_LOG` if set and valid, otherwise [`DEFAULT_FILTER`].
pub(crate) fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}
