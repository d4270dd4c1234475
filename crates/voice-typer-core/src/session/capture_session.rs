use crate::{
    CoreResult,
    audio::AudioCapture,
    session::{CaptureState, Collaborators, PipelineOutcome, SessionStatus, pipeline},
};

use std::{
    sync::{Arc, Mutex, MutexGuard},
    thread,
    time::Instant,
};

use tokio::{
    sync::{broadcast, watch},
    task::JoinHandle,
};
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

/// Capacity of the status broadcast; lagging subscribers lose the oldest lines.
const STATUS_CAPACITY: usize = 16;

/// Bookkeeping for the recording currently open.
#[derive(Debug, Clone, Copy)]
struct ActiveCapture {
    session_id: Uuid,
    started_at: Instant,
}

/// Everything a transition decision touches. Only ever held briefly.
struct Transition {
    state: CaptureState,
    capture: AudioCapture,
    active: Option<ActiveCapture>,
}

struct Shared {
    transition: Mutex<Transition>,
    state_tx: watch::Sender<CaptureState>,
    status_tx: broadcast::Sender<SessionStatus>,
    level_rx: watch::Receiver<f32>,
    collaborators: Collaborators,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Transition> {
        self.transition.lock().unwrap_or_else(|e| {
            error!("Session lock poisoned, recovering: {}", e);
            e.into_inner()
        })
    }

    fn set_state(&self, transition: &mut Transition, state: CaptureState) {
        transition.state = state;
        self.state_tx.send_replace(state);
    }

    fn publish(&self, status: SessionStatus) {
        debug!(%status, "Status");
        // No subscribers is fine.
        let _ = self.status_tx.send(status);
    }
}

/// The push-to-talk state machine: `Idle -> Recording -> Processing -> Idle`.
///
/// A cheap handle over shared state; clone it into whichever task feeds
/// hotkey edges. Transitions are serialized by an internal lock that is
/// never held across transcription.
#[derive(Clone)]
pub struct CaptureSession {
    shared: Arc<Shared>,
}

impl CaptureSession {
    /// Build a session in [`CaptureState::Idle`] around `capture`.
    pub fn new(capture: AudioCapture, collaborators: Collaborators) -> Self {
        let level_rx = capture.level_receiver();
        let (state_tx, _) = watch::channel(CaptureState::Idle);
        let (status_tx, _) = broadcast::channel(STATUS_CAPACITY);

        Self {
            shared: Arc::new(Shared {
                transition: Mutex::new(Transition {
                    state: CaptureState::Idle,
                    capture,
                    active: None,
                }),
                state_tx,
                status_tx,
                level_rx,
                collaborators,
            }),
        }
    }

    /// Current state.
    pub fn state(&self) -> CaptureState {
        *self.shared.state_tx.borrow()
    }

    /// Observe state changes.
    pub fn subscribe_state(&self) -> watch::Receiver<CaptureState> {
        self.shared.state_tx.subscribe()
    }

    /// Observe one-line status messages. Best effort.
    pub fn subscribe_status(&self) -> broadcast::Receiver<SessionStatus> {
        self.shared.status_tx.subscribe()
    }

    /// Observe the live microphone level in `[0, 1]`.
    pub fn level_receiver(&self) -> watch::Receiver<f32> {
        self.shared.level_rx.clone()
    }

    /// Hotkey pressed. From `Idle`, opens the microphone and enters `Recording`.
    ///
    /// Returns `Ok(false)` when ignored because a cycle is already running.
    ///
    /// # Errors
    ///
    /// Returns the device error if the microphone cannot be opened; the
    /// session stays `Idle`.
    #[instrument(skip(self))]
    pub fn on_chord_active(&self) -> CoreResult<bool> {
        let mut transition = self.shared.lock();

        if transition.state != CaptureState::Idle {
            debug!(state = %transition.state, "Hotkey active ignored");
            return Ok(false);
        }

        let session_id = Uuid::new_v4();

        if let Err(e) = transition.capture.start() {
            error!(session_id = %session_id, error = ?e, "Failed to start recording");
            transition.capture.cleanup();
            drop(transition);
            self.shared.publish(SessionStatus::Error(e.to_string()));
            return Err(e);
        }

        transition.active = Some(ActiveCapture {
            session_id,
            started_at: Instant::now(),
        });
        self.shared
            .set_state(&mut transition, CaptureState::Recording);
        drop(transition);

        info!(session_id = %session_id, "Recording started");
        self.shared.publish(SessionStatus::Recording);

        Ok(true)
    }

    /// Hotkey released. From `Recording`, stops the microphone, enters
    /// `Processing` and hands the capture to a blocking worker.
    ///
    /// Returns the worker's handle, or `None` when ignored. The session is
    /// back in `Idle` once the worker finishes, even if it panics.
    ///
    /// Must be called from within a Tokio runtime.
    #[instrument(skip(self))]
    pub fn on_chord_inactive(&self) -> Option<JoinHandle<PipelineOutcome>> {
        let mut transition = self.shared.lock();

        if transition.state != CaptureState::Recording {
            debug!(state = %transition.state, "Hotkey inactive ignored");
            return None;
        }

        let buffer = transition.capture.stop();
        let active = transition.active.take();
        self.shared
            .set_state(&mut transition, CaptureState::Processing);
        drop(transition);

        let session_id = active.map_or_else(Uuid::new_v4, |a| a.session_id);
        info!(
            session_id = %session_id,
            duration_ms = active.map(|a| a.started_at.elapsed().as_millis()),
            has_audio = buffer.is_some(),
            "Recording stopped"
        );
        self.shared.publish(SessionStatus::Processing);

        let guard = IdleGuard {
            shared: Arc::clone(&self.shared),
            session_id,
            status: None,
        };

        Some(tokio::task::spawn_blocking(move || {
            let mut guard = guard;
            let outcome = pipeline::run(session_id, buffer, &guard.shared.collaborators);
            guard.status = Some(outcome.status());
            outcome
        }))
    }

    /// Release the microphone. An open recording is discarded and the session
    /// returns to `Idle`; a running pipeline is left to finish.
    #[instrument(skip(self))]
    pub fn shutdown(&self) {
        let mut transition = self.shared.lock();
        transition.capture.cleanup();

        if transition.state == CaptureState::Recording {
            if let Some(active) = transition.active.take() {
                info!(session_id = %active.session_id, "Discarding recording on shutdown");
            }
            self.shared.set_state(&mut transition, CaptureState::Idle);
        }
    }
}

/// Returns the session to `Idle` when the pipeline worker ends, however it ends.
struct IdleGuard {
    shared: Arc<Shared>,
    session_id: Uuid,
    status: Option<SessionStatus>,
}

impl Drop for IdleGuard {
    fn drop(&mut self) {
        let status = match self.status.take() {
            Some(status) => status,
            None => {
                let reason = if thread::panicking() {
                    "processing panicked"
                } else {
                    "processing aborted"
                };
                warn!(session_id = %self.session_id, reason, "Pipeline did not complete");
                SessionStatus::Error(reason.to_string())
            }
        };

        self.shared.publish(status);

        let mut transition = self.shared.lock();
        if transition.state == CaptureState::Processing {
            self.shared.set_state(&mut transition, CaptureState::Idle);
        }
        debug!(session_id = %self.session_id, "Session idle");
    }
}
