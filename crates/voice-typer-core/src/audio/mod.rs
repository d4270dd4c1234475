mod backend;
mod buffer;
pub(crate) mod capture;
mod meter;
mod resampler;

pub(crate) use resampler::Resampler;

pub use {
    backend::{BlockCallback, CaptureBackend, CpalBackend, StreamFormat},
    buffer::AudioBuffer,
    capture::{AudioCapture, MIN_CAPTURE_DURATION, TARGET_SAMPLE_RATE},
    meter::{LEVEL_GAIN, block_level, rms},
};
