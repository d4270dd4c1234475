use crate::{CoreError, CoreResult, audio::AudioBuffer, session::TranscriptionPort};

use std::{
    panic::Location,
    path::{Path, PathBuf},
};

use error_location::ErrorLocation;
use tracing::{debug, info, instrument};
use whisper_rs::{FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters};

/// [`TranscriptionPort`] backed by a local Whisper GGML model.
pub struct WhisperTranscriber {
    ctx: WhisperContext,
    model_path: PathBuf,
    language: String,
}

impl WhisperTranscriber {
    /// Load the model at `model_path`.
    ///
    /// `language` is a Whisper language code such as `"en"`, or `"auto"` to
    /// let the model detect it.
    ///
    /// # Errors
    ///
    /// [`CoreError::ModelNotFound`] if the file is missing or the path is not
    /// valid UTF-8; [`CoreError::TranscriptionFailed`] if Whisper rejects it.
    #[track_caller]
    #[instrument(skip(model_path))]
    pub fn new<P: AsRef<Path>>(model_path: P, use_gpu: bool, language: &str) -> CoreResult<Self> {
        let path = model_path.as_ref();

        let not_found = || CoreError::ModelNotFound {
            path: path.to_path_buf(),
            location: ErrorLocation::from(Location::caller()),
        };

        if !path.is_file() {
            return Err(not_found());
        }
        let path_str = path.to_str().ok_or_else(not_found)?;

        let mut ctx_params = WhisperContextParameters::default();
        ctx_params.use_gpu(use_gpu);

        let ctx = WhisperContext::new_with_params(path_str, ctx_params).map_err(|e| {
            CoreError::TranscriptionFailed {
                source: Box::new(e),
                location: ErrorLocation::from(Location::caller()),
            }
        })?;

        info!(model_path = ?path, use_gpu, language, "Whisper model loaded");

        Ok(Self {
            ctx,
            model_path: path.to_path_buf(),
            language: language.to_string(),
        })
    }

    /// Path the model was loaded from.
    pub fn model_path(&self) -> &Path {
        &self.model_path
    }

    #[track_caller]
    fn run(&self, samples: &[f32]) -> CoreResult<String> {
        let failed = |e: Box<dyn std::error::Error + Send + Sync>| CoreError::TranscriptionFailed {
            source: e,
            location: ErrorLocation::from(Location::caller()),
        };

        let mut params = FullParams::new(SamplingStrategy::Greedy { best_of: 1 });
        let language = (self.language != "auto").then_some(self.language.as_str());
        params.set_language(language);
        params.set_print_progress(false);
        params.set_print_special(false);
        params.set_print_realtime(false);
        params.set_print_timestamps(false);
        params.set_suppress_blank(true);
        params.set_suppress_nst(true);

        let mut state = self.ctx.create_state().map_err(|e| failed(Box::new(e)))?;
        state.full(params, samples).map_err(|e| failed(Box::new(e)))?;

        let segment_count = state.full_n_segments();
        let mut text = String::new();

        for i in 0..segment_count {
            let segment = state
                .get_segment(i)
                .ok_or_else(|| failed(format!("segment {i} missing").into()))?;
            text.push_str(segment.to_string().trim());
            text.push(' ');
        }

        debug!(segment_count, "Whisper decode complete");

        Ok(text.trim().to_string())
    }
}

impl TranscriptionPort for WhisperTranscriber {
    #[instrument(skip(self, audio), fields(sample_count = audio.len()))]
    fn transcribe(&self, audio: AudioBuffer) -> CoreResult<String> {
        if audio.is_empty() {
            return Err(CoreError::NoAudioCaptured {
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let samples = audio.into_samples();
        let text = self.run(&samples)?;

        debug!(text_len = text.len(), "Transcription complete");

        Ok(text)
    }
}
