//! Collaborator interfaces the pipeline drives.
//!
//! All ports are called from the background pipeline thread, never while the
//! session's transition lock is held, so implementations may block.

use crate::{CoreResult, audio::AudioBuffer, session::TranscriptResult};

use std::sync::Arc;

/// Speech-to-text service.
pub trait TranscriptionPort: Send + Sync {
    /// Transcribe 16 kHz mono audio. An empty string means no speech was found.
    ///
    /// # Errors
    ///
    /// Implementation specific; the pipeline treats any error like "no speech".
    fn transcribe(&self, audio: AudioBuffer) -> CoreResult<String>;
}

/// Paste-at-cursor service.
pub trait InjectionPort: Send + Sync {
    /// Deliver `text` to the focused application. Returns `false` on failure.
    fn paste(&self, text: &str) -> bool;
}

/// Usage statistics sink.
pub trait StatsCollaborator: Send + Sync {
    /// Account for one delivered transcript.
    fn record(&self, transcript: &TranscriptResult);
}

/// Recent transcript history sink.
pub trait HistoryCollaborator: Send + Sync {
    /// Remember `text` as the most recent entry.
    fn add(&self, text: &str);
}

/// The set of collaborators a [`CaptureSession`](crate::session::CaptureSession) drives.
#[derive(Clone)]
pub struct Collaborators {
    /// Speech-to-text.
    pub transcriber: Arc<dyn TranscriptionPort>,
    /// Text delivery.
    pub injector: Arc<dyn InjectionPort>,
    /// Statistics.
    pub stats: Arc<dyn StatsCollaborator>,
    /// History.
    pub history: Arc<dyn HistoryCollaborator>,
}
