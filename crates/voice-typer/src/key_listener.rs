//! Process-wide keyboard hook.
//!
//! `rdev::listen` blocks its thread forever, so the hook runs on a dedicated
//! thread and forwards events through a bounded channel. The hook callback
//! never blocks: when the channel is full a press is dropped and logged, but
//! a release is parked in a small overflow queue and retried on every later
//! hook event (mouse moves included), so a held chord is never left latched.

use crate::{AppError, AppResult};

use voice_typer_core::{KeyEvent, ModifierRole, PhysicalKey, Side};

use std::{collections::VecDeque, panic::Location, thread};

use error_location::ErrorLocation;
use rdev::{Event, EventType, Key};
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, error, info, instrument, warn};

/// Capacity of the hook-to-app channel.
pub(crate) const KEY_EVENT_CAPACITY: usize = 64;

/// Releases kept while the channel is full; the oldest goes first past this.
pub(crate) const RELEASE_OVERFLOW_CAPACITY: usize = 32;

/// Platform key code rdev reports as `Unknown` for F13.
#[cfg(target_os = "macos")]
const F13_CODE: u32 = 105;
#[cfg(target_os = "windows")]
const F13_CODE: u32 = 124;
#[cfg(not(any(target_os = "macos", target_os = "windows")))]
const F13_CODE: u32 = 191;

/// Keyboard hook feeding [`KeyEvent`]s to the application loop.
pub struct KeyEventListener;

impl KeyEventListener {
    /// Install the hook on its own thread and return the event stream.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::KeyboardHookFailed`] if the hook thread cannot be
    /// spawned. A hook that fails after starting (missing accessibility
    /// permission, no display) is logged and closes the channel.
    #[track_caller]
    #[instrument]
    pub fn spawn() -> AppResult<mpsc::Receiver<KeyEvent>> {
        let (tx, rx) = mpsc::channel(KEY_EVENT_CAPACITY);

        thread::Builder::new()
            .name("keyboard-hook".to_string())
            .spawn(move || {
                let mut forwarder = Forwarder::new(tx);
                let callback = move |event: Event| forwarder.on_event(&event.event_type);

                if let Err(e) = rdev::listen(callback) {
                    error!(error = ?e, "Keyboard hook stopped");
                }
            })
            .map_err(|e| AppError::KeyboardHookFailed {
                reason: format!("Failed to spawn hook thread: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        info!("Keyboard hook installed");

        Ok(rx)
    }
}

/// Hook-side end of the key event channel.
pub(crate) struct Forwarder {
    tx: mpsc::Sender<KeyEvent>,
    overflow: VecDeque<KeyEvent>,
}

impl Forwarder {
    pub(crate) fn new(tx: mpsc::Sender<KeyEvent>) -> Self {
        Self {
            tx,
            overflow: VecDeque::new(),
        }
    }

    /// Retry parked releases, then forward the event if the matcher can use it.
    pub(crate) fn on_event(&mut self, event_type: &EventType) {
        self.flush();
        if let Some(event) = map_event(event_type) {
            self.forward(event);
        }
    }

    fn flush(&mut self) {
        while let Some(event) = self.overflow.pop_front() {
            match self.tx.try_send(event) {
                Ok(()) => debug!(?event, "Parked release delivered"),
                Err(TrySendError::Full(event)) => {
                    self.overflow.push_front(event);
                    return;
                }
                Err(TrySendError::Closed(_)) => {
                    self.overflow.clear();
                    return;
                }
            }
        }
    }

    fn forward(&mut self, event: KeyEvent) {
        // Parked releases go out first; nothing may overtake them.
        let sent = if self.overflow.is_empty() {
            self.tx.try_send(event)
        } else {
            Err(TrySendError::Full(event))
        };

        match sent {
            Ok(()) => {}
            Err(TrySendError::Full(KeyEvent::Release(key))) => {
                if self.overflow.len() >= RELEASE_OVERFLOW_CAPACITY {
                    let dropped = self.overflow.pop_front();
                    warn!(?dropped, "Release overflow full, dropping oldest");
                }
                self.overflow.push_back(KeyEvent::Release(key));
                debug!(
                    ?key,
                    parked = self.overflow.len(),
                    "Key event channel full, release parked"
                );
            }
            Err(TrySendError::Full(event)) => {
                warn!(?event, "Key event channel full, dropping press");
            }
            Err(TrySendError::Closed(_)) => {
                debug!("Key event channel closed");
            }
        }
    }
}

/// Translate an rdev event into a press/release, or `None` for mouse events
/// and keys the matcher cannot use.
pub(crate) fn map_event(event_type: &EventType) -> Option<KeyEvent> {
    match event_type {
        EventType::KeyPress(key) => map_key(*key).map(KeyEvent::Press),
        EventType::KeyRelease(key) => map_key(*key).map(KeyEvent::Release),
        _ => None,
    }
}

/// Map an rdev key to a [`PhysicalKey`]. Only modifiers, function keys and
/// unnamed platform codes are tracked.
pub(crate) fn map_key(key: Key) -> Option<PhysicalKey> {
    let modifier = |role, side| Some(PhysicalKey::modifier(role, side));

    match key {
        Key::ControlLeft => modifier(ModifierRole::Control, Side::Left),
        Key::ControlRight => modifier(ModifierRole::Control, Side::Right),
        Key::MetaLeft => modifier(ModifierRole::Command, Side::Left),
        Key::MetaRight => modifier(ModifierRole::Command, Side::Right),
        Key::Alt => modifier(ModifierRole::Option, Side::Left),
        Key::AltGr => modifier(ModifierRole::Option, Side::Right),
        Key::ShiftLeft => modifier(ModifierRole::Shift, Side::Left),
        Key::ShiftRight => modifier(ModifierRole::Shift, Side::Right),
        Key::F1 => Some(PhysicalKey::Function(1)),
        Key::F2 => Some(PhysicalKey::Function(2)),
        Key::F3 => Some(PhysicalKey::Function(3)),
        Key::F4 => Some(PhysicalKey::Function(4)),
        Key::F5 => Some(PhysicalKey::Function(5)),
        Key::F6 => Some(PhysicalKey::Function(6)),
        Key::F7 => Some(PhysicalKey::Function(7)),
        Key::F8 => Some(PhysicalKey::Function(8)),
        Key::F9 => Some(PhysicalKey::Function(9)),
        Key::F10 => Some(PhysicalKey::Function(10)),
        Key::F11 => Some(PhysicalKey::Function(11)),
        Key::F12 => Some(PhysicalKey::Function(12)),
        Key::Unknown(code) if code == F13_CODE => Some(PhysicalKey::Function(13)),
        Key::Unknown(code) => Some(PhysicalKey::Other(code)),
        _ => None,
    }
}
