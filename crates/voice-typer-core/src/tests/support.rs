//! Hand-written fakes for the capture device and the pipeline ports.

#![allow(clippy::unwrap_used)]

use crate::{
    AudioBuffer, BlockCallback, CaptureBackend, Collaborators, CoreError, CoreResult,
    HistoryCollaborator, InjectionPort, StatsCollaborator, StreamFormat, TranscriptResult,
    TranscriptionPort,
};

use std::{
    panic::Location,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
        mpsc,
    },
};

use error_location::ErrorLocation;

/// Samples per fake hardware block.
pub(crate) const BLOCK_FRAMES: usize = 1600;

#[derive(Default)]
struct DeviceState {
    callback: Option<BlockCallback>,
    sample_rate: u32,
    fail_open: bool,
    opens: usize,
    closes: usize,
}

/// Test-side handle to a fake microphone. Clone it before boxing the backend
/// so the test can keep feeding blocks.
#[derive(Clone, Default)]
pub(crate) struct FakeDevice {
    state: Arc<Mutex<DeviceState>>,
}

impl FakeDevice {
    pub(crate) fn new(sample_rate: u32) -> Self {
        let device = Self::default();
        device.state.lock().unwrap().sample_rate = sample_rate;
        device
    }

    pub(crate) fn failing() -> Self {
        let device = Self::new(16_000);
        device.state.lock().unwrap().fail_open = true;
        device
    }

    pub(crate) fn backend(&self) -> Box<dyn CaptureBackend> {
        Box::new(FakeBackend {
            device: self.clone(),
        })
    }

    /// Deliver one block as the driver would. Returns false if no stream is open.
    pub(crate) fn feed(&self, block: &[f32]) -> bool {
        let mut state = self.state.lock().unwrap();
        match state.callback.as_mut() {
            Some(callback) => {
                callback(block);
                true
            }
            None => false,
        }
    }

    /// Deliver `seconds` of constant-amplitude audio in [`BLOCK_FRAMES`] blocks.
    pub(crate) fn feed_seconds(&self, seconds: f32, amplitude: f32) {
        let sample_rate = self.state.lock().unwrap().sample_rate;
        let mut remaining = (seconds * sample_rate as f32) as usize;
        while remaining > 0 {
            let frames = remaining.min(BLOCK_FRAMES);
            self.feed(&vec![amplitude; frames]);
            remaining -= frames;
        }
    }

    pub(crate) fn is_open(&self) -> bool {
        self.state.lock().unwrap().callback.is_some()
    }

    pub(crate) fn opens(&self) -> usize {
        self.state.lock().unwrap().opens
    }

    pub(crate) fn closes(&self) -> usize {
        self.state.lock().unwrap().closes
    }
}

struct FakeBackend {
    device: FakeDevice,
}

impl CaptureBackend for FakeBackend {
    #[track_caller]
    fn open(&mut self, on_block: BlockCallback) -> CoreResult<StreamFormat> {
        let mut state = self.device.state.lock().unwrap();
        state.opens += 1;

        if state.fail_open {
            return Err(CoreError::DeviceError {
                reason: "device busy".to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        state.callback = Some(on_block);
        Ok(StreamFormat {
            sample_rate: state.sample_rate,
            device_channels: 1,
        })
    }

    fn close(&mut self) {
        let mut state = self.device.state.lock().unwrap();
        state.closes += 1;
        state.callback = None;
    }
}

/// Transcriber returning a fixed reply, optionally waiting for a gate first.
pub(crate) struct StubTranscriber {
    reply: Option<String>,
    gate: Mutex<Option<mpsc::Receiver<()>>>,
    pub(crate) calls: AtomicUsize,
    pub(crate) last_len: AtomicUsize,
    pub(crate) last_rate: AtomicUsize,
}

impl StubTranscriber {
    pub(crate) fn replying(text: &str) -> Self {
        Self {
            reply: Some(text.to_string()),
            gate: Mutex::new(None),
            calls: AtomicUsize::new(0),
            last_len: AtomicUsize::new(0),
            last_rate: AtomicUsize::new(0),
        }
    }

    pub(crate) fn failing() -> Self {
        Self {
            reply: None,
            ..Self::replying("")
        }
    }

    /// Block inside `transcribe` until the returned sender fires (or drops).
    pub(crate) fn gated(text: &str) -> (Self, mpsc::Sender<()>) {
        let (tx, rx) = mpsc::channel();
        let stub = Self::replying(text);
        *stub.gate.lock().unwrap() = Some(rx);
        (stub, tx)
    }
}

impl TranscriptionPort for StubTranscriber {
    #[track_caller]
    fn transcribe(&self, audio: AudioBuffer) -> CoreResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.last_len.store(audio.len(), Ordering::SeqCst);
        self.last_rate
            .store(audio.sample_rate() as usize, Ordering::SeqCst);

        if let Some(gate) = self.gate.lock().unwrap().take() {
            let _ = gate.recv();
        }

        self.reply
            .clone()
            .ok_or_else(|| CoreError::TranscriptionFailed {
                source: "model exploded".into(),
                location: ErrorLocation::from(Location::caller()),
            })
    }
}

/// Injector remembering every pasted text.
pub(crate) struct RecordingInjector {
    succeed: bool,
    pub(crate) pasted: Mutex<Vec<String>>,
}

impl RecordingInjector {
    pub(crate) fn new(succeed: bool) -> Self {
        Self {
            succeed,
            pasted: Mutex::new(Vec::new()),
        }
    }
}

impl InjectionPort for RecordingInjector {
    fn paste(&self, text: &str) -> bool {
        self.pasted.lock().unwrap().push(text.to_string());
        self.succeed
    }
}

/// Stats sink counting words; optionally panics to exercise pipeline faults.
#[derive(Default)]
pub(crate) struct CountingStats {
    pub(crate) words: AtomicUsize,
    pub(crate) records: AtomicUsize,
    pub(crate) panic_on_record: bool,
}

impl StatsCollaborator for CountingStats {
    #[allow(clippy::panic)]
    fn record(&self, transcript: &TranscriptResult) {
        if self.panic_on_record {
            panic!("stats store unavailable");
        }
        self.records.fetch_add(1, Ordering::SeqCst);
        self.words
            .fetch_add(transcript.word_count(), Ordering::SeqCst);
    }
}

/// History sink keeping entries most-recent-first.
#[derive(Default)]
pub(crate) struct VecHistory {
    pub(crate) entries: Mutex<Vec<String>>,
}

impl HistoryCollaborator for VecHistory {
    fn add(&self, text: &str) {
        self.entries.lock().unwrap().insert(0, text.to_string());
    }
}

/// Concrete handles to every stub, plus the bundle a session needs.
pub(crate) struct Stubs {
    pub(crate) transcriber: Arc<StubTranscriber>,
    pub(crate) injector: Arc<RecordingInjector>,
    pub(crate) stats: Arc<CountingStats>,
    pub(crate) history: Arc<VecHistory>,
}

impl Stubs {
    pub(crate) fn new(transcriber: StubTranscriber) -> Self {
        Self {
            transcriber: Arc::new(transcriber),
            injector: Arc::new(RecordingInjector::new(true)),
            stats: Arc::new(CountingStats::default()),
            history: Arc::new(VecHistory::default()),
        }
    }

    pub(crate) fn collaborators(&self) -> Collaborators {
        Collaborators {
            transcriber: self.transcriber.clone(),
            injector: self.injector.clone(),
            stats: self.stats.clone(),
            history: self.history.clone(),
        }
    }
}
