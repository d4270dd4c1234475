//! voice-typer core library
//!
//! Push-to-talk voice capture: a side-tolerant hotkey chord recognizer, a
//! microphone capture component with a live level signal, and the
//! `Idle -> Recording -> Processing -> Idle` session that turns a held
//! hotkey into pasted text.
//!
//! # Example
//!
//! ```no_run
//! use voice_typer_core::{
//!     AudioCapture, CaptureSession, ChordEdge, ChordMatcher, Collaborators, CpalBackend,
//!     CoreResult, HotkeyPreset, KeyEvent,
//! };
//!
//! fn drive(
//!     collaborators: Collaborators,
//!     events: impl Iterator<Item = KeyEvent>,
//! ) -> CoreResult<()> {
//!     let capture = AudioCapture::new(Box::new(CpalBackend::new(None)));
//!     let session = CaptureSession::new(capture, collaborators);
//!     let mut matcher = ChordMatcher::new(HotkeyPreset::default().spec());
//!
//!     for event in events {
//!         match matcher.apply(event) {
//!             Some(ChordEdge::Activated) => {
//!                 session.on_chord_active()?;
//!             }
//!             Some(ChordEdge::Deactivated) => {
//!                 session.on_chord_inactive();
//!             }
//!             None => {}
//!         }
//!     }
//!     Ok(())
//! }
//! ```

mod audio;
mod error;
mod hotkey;
mod session;
mod transcription;

pub use {
    audio::{
        AudioBuffer, AudioCapture, BlockCallback, CaptureBackend, CpalBackend, LEVEL_GAIN,
        MIN_CAPTURE_DURATION, StreamFormat, TARGET_SAMPLE_RATE, block_level, rms,
    },
    error::{CoreError, Result as CoreResult},
    hotkey::{
        ChordEdge, ChordMatcher, HotkeyPreset, HotkeySpec, KeyEvent, ModifierRole, PhysicalKey,
        RECORDING_WINDOW, Side, record_chord,
    },
    session::{
        CaptureSession, CaptureState, Collaborators, HistoryCollaborator, InjectionPort,
        PipelineOutcome, SessionStatus, StatsCollaborator, TranscriptResult, TranscriptionPort,
        text_preview,
    },
    transcription::WhisperTranscriber,
};
