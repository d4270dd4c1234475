use crate::{CoreError, CoreResult, audio::AudioBuffer};

use std::panic::Location;

use audioadapter_buffers::direct::InterleavedSlice;
use error_location::ErrorLocation;
use rubato::{Fft, FixedSync, Resampler as RubatoResampler};
use tracing::{debug, instrument};

/// Input frames handed to the FFT resampler per call.
const CHUNK_SIZE: usize = 1024;
const SUB_CHUNKS: usize = 2;

/// Mono FFT resampler that converts a finished capture to the pipeline rate.
pub struct Resampler {
    inner: Fft<f32>,
    input_rate: u32,
    output_rate: u32,
    scratch: Vec<f32>,
}

impl Resampler {
    /// Resampler from `input_rate` to `output_rate`, mono.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ResamplingError`] if rubato rejects the ratio.
    #[track_caller]
    #[instrument]
    pub fn new(input_rate: u32, output_rate: u32) -> CoreResult<Self> {
        let inner = Fft::<f32>::new(
            input_rate as usize,
            output_rate as usize,
            CHUNK_SIZE,
            SUB_CHUNKS,
            1,
            FixedSync::Input,
        )
        .map_err(|e| CoreError::ResamplingError {
            reason: format!("Failed to create resampler: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        let scratch = vec![0.0; inner.output_frames_max()];

        debug!(input_rate, output_rate, "Resampler initialized");

        Ok(Self {
            inner,
            input_rate,
            output_rate,
            scratch,
        })
    }

    /// Resample a whole buffer, walking its blocks without flattening them first.
    ///
    /// The tail is zero-padded to a full chunk and the result trimmed to the
    /// expected length, so output duration matches input duration.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ResamplingError`] if a chunk fails to process.
    #[track_caller]
    #[instrument(skip(self, input), fields(input_len = input.len()))]
    pub fn resample(&mut self, input: &AudioBuffer) -> CoreResult<AudioBuffer> {
        if input.is_empty() {
            return Ok(AudioBuffer::new(self.output_rate));
        }

        let expected_len = (input.len() as f64 * f64::from(self.output_rate)
            / f64::from(self.input_rate)) as usize;
        let mut output = Vec::with_capacity(expected_len + CHUNK_SIZE);
        let mut chunk = Vec::with_capacity(CHUNK_SIZE);

        for sample in input.samples() {
            chunk.push(sample);
            if chunk.len() == CHUNK_SIZE {
                self.process_chunk(&chunk, &mut output)?;
                chunk.clear();
            }
        }

        if !chunk.is_empty() {
            chunk.resize(CHUNK_SIZE, 0.0);
            self.process_chunk(&chunk, &mut output)?;
        }

        output.truncate(expected_len);

        debug!(
            output_len = output.len(),
            input_rate = self.input_rate,
            output_rate = self.output_rate,
            "Resampled capture"
        );

        Ok(AudioBuffer::from_samples(output, self.output_rate))
    }

    #[track_caller]
    fn process_chunk(&mut self, chunk: &[f32], output: &mut Vec<f32>) -> CoreResult<()> {
        let input_adapter = InterleavedSlice::new(chunk, 1, CHUNK_SIZE).map_err(|e| {
            CoreError::ResamplingError {
                reason: format!("Failed to create input adapter: {}", e),
                location: ErrorLocation::from(Location::caller()),
            }
        })?;

        let frames = self.scratch.len();
        let mut output_adapter = InterleavedSlice::new_mut(&mut self.scratch, 1, frames)
            .map_err(|e| CoreError::ResamplingError {
                reason: format!("Failed to create output adapter: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        let (_, written) = self
            .inner
            .process_into_buffer(&input_adapter, &mut output_adapter, None)
            .map_err(|e| CoreError::ResamplingError {
                reason: format!("Resampling failed: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        output.extend_from_slice(&self.scratch[..written]);

        Ok(())
    }
}
