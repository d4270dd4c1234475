use error_location::ErrorLocation;
use thiserror::Error;

/// Core pipeline errors with source location tracking.
#[derive(Error, Debug)]
pub enum CoreError {
    /// No audio input device found.
    #[error("No microphone found {location}")]
    NoMicrophoneFound {
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Audio device could not be opened, started or queried.
    #[error("Audio device error: {reason} {location}")]
    DeviceError {
        /// Description of the device error.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Device delivers audio the pipeline cannot convert to 16 kHz mono.
    #[error("Unsupported audio format: {reason} {location}")]
    UnsupportedFormat {
        /// Description of the offending configuration.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Audio resampling failed.
    #[error("Resampling error: {reason} {location}")]
    ResamplingError {
        /// Description of the resampling error.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Whisper model file not found at specified path.
    #[error("Model not found at path: {path:?} {location}")]
    ModelNotFound {
        /// Path to the missing model file.
        path: std::path::PathBuf,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Transcription process failed.
    #[error("Transcription failed: {source} {location}")]
    TranscriptionFailed {
        /// Underlying error from the speech engine.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// No audio data captured or provided.
    #[error("No audio captured {location}")]
    NoAudioCaptured {
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// A hotkey must name at least one role or key.
    #[error("Hotkey has no keys {location}")]
    EmptyHotkey {
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// A chord recording window is already open.
    #[error("Hotkey recording already in progress {location}")]
    ChordRecordingInProgress {
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// `finish_recording` called without a matching `begin_recording`.
    #[error("No hotkey recording in progress {location}")]
    ChordRecordingNotActive {
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The recording window closed without any modifier being pressed.
    #[error("No modifier keys pressed during hotkey recording {location}")]
    ChordRecordingEmpty {
        /// Source location where error occurred.
        location: ErrorLocation,
    },
}

/// Result type alias using [`CoreError`].
pub type Result<T> = std::result::Result<T, CoreError>;
