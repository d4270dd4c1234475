use crate::{
    audio::{AudioBuffer, Resampler, TARGET_SAMPLE_RATE},
    session::{Collaborators, SessionStatus, TranscriptResult},
};

use std::time::Instant;

use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

/// How one background pipeline run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineOutcome {
    /// No usable buffer reached the pipeline.
    NoAudio,
    /// Transcription was empty or failed.
    NoSpeech,
    /// Stats and history updated, text pasted.
    Delivered(TranscriptResult),
    /// Stats and history updated, paste reported failure.
    PasteFailed(TranscriptResult),
}

impl PipelineOutcome {
    /// Status line describing this outcome.
    pub fn status(&self) -> SessionStatus {
        match self {
            Self::NoAudio => SessionStatus::NoAudio,
            Self::NoSpeech => SessionStatus::NoSpeech,
            Self::Delivered(transcript) => SessionStatus::Done {
                word_count: transcript.word_count(),
            },
            Self::PasteFailed(_) => SessionStatus::PasteFailed,
        }
    }

    /// The transcript, if one was produced.
    pub fn transcript(&self) -> Option<&TranscriptResult> {
        match self {
            Self::Delivered(transcript) | Self::PasteFailed(transcript) => Some(transcript),
            Self::NoAudio | Self::NoSpeech => None,
        }
    }
}

/// Convert, transcribe, record and deliver one capture.
///
/// Blocking; runs on the pipeline worker, never under the transition lock.
/// A capture that cannot be converted to 16 kHz counts as no audio.
/// Stats and history are committed before pasting, so a paste failure keeps
/// them.
#[instrument(skip(buffer, collaborators), fields(session_id = %session_id))]
pub(crate) fn run(
    session_id: Uuid,
    buffer: Option<AudioBuffer>,
    collaborators: &Collaborators,
) -> PipelineOutcome {
    let Some(buffer) = buffer else {
        info!("No audio to process");
        return PipelineOutcome::NoAudio;
    };

    let Some(buffer) = to_target_rate(buffer) else {
        return PipelineOutcome::NoAudio;
    };

    let sample_count = buffer.len();
    let started = Instant::now();

    let text = match collaborators.transcriber.transcribe(buffer) {
        Ok(text) => text,
        Err(e) => {
            warn!(error = ?e, "Transcription failed, treating as no speech");
            return PipelineOutcome::NoSpeech;
        }
    };

    let transcript = TranscriptResult::new(text);

    info!(
        sample_count,
        duration_ms = started.elapsed().as_millis(),
        text_len = transcript.char_count(),
        "Transcription finished"
    );

    if transcript.is_empty() {
        info!("No speech detected");
        return PipelineOutcome::NoSpeech;
    }

    collaborators.stats.record(&transcript);
    collaborators.history.add(transcript.text());

    if collaborators.injector.paste(transcript.text()) {
        info!(
            word_count = transcript.word_count(),
            preview = %transcript.preview(),
            "Text delivered"
        );
        PipelineOutcome::Delivered(transcript)
    } else {
        warn!(word_count = transcript.word_count(), "Paste failed");
        PipelineOutcome::PasteFailed(transcript)
    }
}

fn to_target_rate(buffer: AudioBuffer) -> Option<AudioBuffer> {
    let source_rate = buffer.sample_rate();
    if source_rate == TARGET_SAMPLE_RATE {
        return Some(buffer);
    }

    let started = Instant::now();
    match Resampler::new(source_rate, TARGET_SAMPLE_RATE)
        .and_then(|mut resampler| resampler.resample(&buffer))
    {
        Ok(resampled) => {
            debug!(
                source_rate,
                sample_count = resampled.len(),
                duration_ms = started.elapsed().as_millis(),
                "Capture resampled"
            );
            Some(resampled)
        }
        Err(e) => {
            error!(error = ?e, source_rate, "Failed to convert capture to 16 kHz, discarding");
            None
        }
    }
}
