mod capture_session;
mod pipeline;
mod ports;
mod state;
mod status;
mod transcript;

pub use {
    capture_session::CaptureSession,
    pipeline::PipelineOutcome,
    ports::{Collaborators, HistoryCollaborator, InjectionPort, StatsCollaborator, TranscriptionPort},
    state::CaptureState,
    status::SessionStatus,
    transcript::{TranscriptResult, text_preview},
};
