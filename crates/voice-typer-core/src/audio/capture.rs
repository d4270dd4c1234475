use crate::{
    CoreError, CoreResult,
    audio::{AudioBuffer, CaptureBackend, StreamFormat, block_level},
};

use std::{
    mem,
    panic::Location,
    sync::{Arc, Mutex, MutexGuard},
    time::Duration,
};

use error_location::ErrorLocation;
use tokio::sync::watch;
use tracing::{debug, error, info, instrument, warn};

/// Sample rate the transcription service expects. Captures at other rates are
/// converted by the pipeline worker.
pub const TARGET_SAMPLE_RATE: u32 = 16_000;

/// Captures shorter than this are discarded as "no audio".
pub const MIN_CAPTURE_DURATION: Duration = Duration::from_millis(500);

/// Maximum samples to buffer (5 minutes at 48kHz mono).
///
/// Blocks arriving after the cap are dropped; the start of the utterance is kept.
pub(crate) const MAX_BUFFER_SAMPLES: usize = 48_000 * 60 * 5;

/// State shared with the driver callback.
struct Recorder {
    buffer: AudioBuffer,
    /// Cleared before the buffer is taken; the callback writes nothing afterwards.
    attached: bool,
    overflowed: bool,
}

impl Recorder {
    fn append(&mut self, block: &[f32]) {
        if self.buffer.len() + block.len() > MAX_BUFFER_SAMPLES {
            if !self.overflowed {
                warn!(max_samples = MAX_BUFFER_SAMPLES, "Capture buffer full, dropping audio");
                self.overflowed = true;
            }
            return;
        }
        self.buffer.push_block(block.to_vec());
    }
}

/// Microphone capture for one push-to-talk recording at a time.
///
/// Owns the in-progress [`AudioBuffer`] and publishes a live `[0, 1]` level
/// for every hardware block.
pub struct AudioCapture {
    backend: Box<dyn CaptureBackend>,
    recorder: Arc<Mutex<Recorder>>,
    level_tx: watch::Sender<f32>,
    /// `Some` while a stream is open.
    format: Option<StreamFormat>,
}

impl AudioCapture {
    /// Wrap a backend. Nothing is opened until [`start`](Self::start).
    pub fn new(backend: Box<dyn CaptureBackend>) -> Self {
        let (level_tx, _) = watch::channel(0.0);

        Self {
            backend,
            recorder: Arc::new(Mutex::new(Recorder {
                buffer: AudioBuffer::new(TARGET_SAMPLE_RATE),
                attached: false,
                overflowed: false,
            })),
            level_tx,
            format: None,
        }
    }

    /// Subscribe to the live level. Only the latest value is kept, so a slow
    /// observer simply misses intermediate levels.
    pub fn level_receiver(&self) -> watch::Receiver<f32> {
        self.level_tx.subscribe()
    }

    /// Whether a stream is currently open.
    pub fn is_recording(&self) -> bool {
        self.format.is_some()
    }

    /// Open the microphone and start accumulating samples.
    ///
    /// Calling `start` while already recording is a no-op.
    ///
    /// # Errors
    ///
    /// Returns the backend's device error, or [`CoreError::UnsupportedFormat`]
    /// when the device reports a zero sample rate. The device is released
    /// before returning.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn start(&mut self) -> CoreResult<()> {
        if self.format.is_some() {
            debug!("start called while already recording");
            return Ok(());
        }

        {
            let mut recorder = lock_recorder(&self.recorder);
            recorder.buffer = AudioBuffer::new(TARGET_SAMPLE_RATE);
            recorder.overflowed = false;
            recorder.attached = true;
        }

        let recorder = Arc::clone(&self.recorder);
        let level_tx = self.level_tx.clone();

        let on_block = Box::new(move |block: &[f32]| {
            let level = block_level(block);
            {
                let mut recorder = lock_recorder(&recorder);
                if !recorder.attached {
                    return;
                }
                recorder.append(block);
            }
            // Never fails; with no observers the value is simply replaced.
            level_tx.send_replace(level);
        });

        let format = match self.backend.open(on_block) {
            Ok(format) if format.sample_rate == 0 => {
                self.release();
                return Err(CoreError::UnsupportedFormat {
                    reason: "device reported a 0 Hz sample rate".to_string(),
                    location: ErrorLocation::from(Location::caller()),
                });
            }
            Ok(format) => format,
            Err(e) => {
                self.release();
                return Err(e);
            }
        };

        self.format = Some(format);

        info!(
            sample_rate = format.sample_rate,
            device_channels = format.device_channels,
            "Audio capture started"
        );

        Ok(())
    }

    /// Stop capturing and hand over the finished buffer, mono at the device
    /// rate.
    ///
    /// Returns `None` if capture was not running, nothing was captured, or the
    /// capture is shorter than [`MIN_CAPTURE_DURATION`]. The device is always
    /// released. Conversion to 16 kHz is left to the pipeline worker.
    #[instrument(skip(self))]
    pub fn stop(&mut self) -> Option<AudioBuffer> {
        let Some(format) = self.format.take() else {
            debug!("stop called while not recording");
            return None;
        };

        // Detach and take under one lock: no callback can touch the buffer
        // once it leaves this block.
        let captured = {
            let mut recorder = lock_recorder(&self.recorder);
            recorder.attached = false;
            mem::replace(&mut recorder.buffer, AudioBuffer::new(TARGET_SAMPLE_RATE))
        }
        .with_sample_rate(format.sample_rate);

        self.backend.close();
        self.level_tx.send_replace(0.0);

        let duration = captured.duration();
        info!(
            sample_count = captured.len(),
            block_count = captured.block_count(),
            sample_rate = format.sample_rate,
            duration_ms = duration.as_millis(),
            "Audio capture stopped"
        );

        if captured.is_empty() {
            info!("No samples captured");
            return None;
        }

        if duration < MIN_CAPTURE_DURATION {
            info!(duration_ms = duration.as_millis(), "Capture too short, discarding");
            return None;
        }

        Some(captured)
    }

    /// Release the device and drop any partial capture. Safe to call any
    /// number of times, including after a failed start or stop.
    #[instrument(skip(self))]
    pub fn cleanup(&mut self) {
        if self.format.take().is_some() {
            debug!("Discarding in-progress capture");
        }
        self.release();
    }

    fn release(&mut self) {
        {
            let mut recorder = lock_recorder(&self.recorder);
            recorder.attached = false;
            recorder.buffer = AudioBuffer::new(TARGET_SAMPLE_RATE);
        }
        self.backend.close();
        self.level_tx.send_replace(0.0);
    }
}

impl Drop for AudioCapture {
    fn drop(&mut self) {
        self.cleanup();
    }
}

// A poisoned lock only means a callback panicked mid-append; the buffer is
// still usable.
fn lock_recorder(recorder: &Mutex<Recorder>) -> MutexGuard<'_, Recorder> {
    recorder.lock().unwrap_or_else(|e| {
        error!("Capture buffer lock poisoned, recovering: {}", e);
        e.into_inner()
    })
}
