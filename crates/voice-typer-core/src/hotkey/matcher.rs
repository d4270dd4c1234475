//! Held-key tracking and hotkey activation edges.
//!
//! The matcher only ever reports *edges*: `Activated` when the target hotkey
//! goes from unsatisfied to satisfied and `Deactivated` on the way back. Key
//! auto-repeat and unrelated keys produce nothing.

use crate::{
    CoreError, CoreResult,
    hotkey::{HotkeySpec, KeyEvent, ModifierRole, PhysicalKey},
};

use std::{
    collections::{BTreeSet, HashSet},
    panic::Location,
};

use error_location::ErrorLocation;
use tracing::{debug, info, instrument};

/// Change in the target hotkey's satisfaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChordEdge {
    /// The hotkey just became held.
    Activated,
    /// A contributing key was released.
    Deactivated,
}

/// Tracks held keys and evaluates the configured hotkey against them.
#[derive(Debug)]
pub struct ChordMatcher {
    held: HashSet<PhysicalKey>,
    target: HotkeySpec,
    active: bool,
    /// Roles seen while a custom hotkey is being recorded.
    recording: Option<BTreeSet<ModifierRole>>,
}

impl ChordMatcher {
    /// Create a matcher for `target` with no keys held.
    pub fn new(target: HotkeySpec) -> Self {
        Self {
            held: HashSet::new(),
            target,
            active: false,
            recording: None,
        }
    }

    /// The hotkey currently being matched.
    pub fn target(&self) -> &HotkeySpec {
        &self.target
    }

    /// Replace the target hotkey without emitting an edge.
    pub fn set_target(&mut self, target: HotkeySpec) {
        self.active = target.is_satisfied_by(self.held.iter());
        self.target = target;
    }

    /// Whether `spec` is satisfied by the keys held right now.
    pub fn is_active(&self, spec: &HotkeySpec) -> bool {
        spec.is_satisfied_by(self.held.iter())
    }

    /// Whether a custom hotkey recording window is open.
    pub fn is_recording(&self) -> bool {
        self.recording.is_some()
    }

    /// Record a key press.
    pub fn press(&mut self, key: PhysicalKey) -> Option<ChordEdge> {
        self.held.insert(key);

        if let Some(roles) = self.recording.as_mut() {
            // Only modifiers are recordable; letters and function keys are ignored.
            if let Some(role) = key.role() {
                roles.insert(role);
            }
            return None;
        }

        self.evaluate()
    }

    /// Record a key release.
    ///
    /// Releasing any key that contributes to an active hotkey deactivates it
    /// on this very event, even while a recording window is open.
    pub fn release(&mut self, key: PhysicalKey) -> Option<ChordEdge> {
        // Drop every equivalent entry: a side-less release must clear a sided press.
        if let PhysicalKey::Modifier { side: None, .. } = key {
            self.held.retain(|held| !held.is_equivalent(&key));
        } else {
            self.held.remove(&key);
            if let Some(role) = key.role() {
                self.held
                    .remove(&PhysicalKey::Modifier { role, side: None });
            }
        }

        self.evaluate_release()
    }

    /// Dispatch a hook event to [`press`](Self::press) or [`release`](Self::release).
    pub fn apply(&mut self, event: KeyEvent) -> Option<ChordEdge> {
        match event {
            KeyEvent::Press(key) => self.press(key),
            KeyEvent::Release(key) => self.release(key),
        }
    }

    /// Open a recording window for a new custom hotkey.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ChordRecordingInProgress`] if a window is already open.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn begin_recording(&mut self) -> CoreResult<()> {
        if self.recording.is_some() {
            return Err(CoreError::ChordRecordingInProgress {
                location: ErrorLocation::from(Location::caller()),
            });
        }

        self.recording = Some(BTreeSet::new());
        info!("Hotkey recording started");

        Ok(())
    }

    /// Close the recording window and adopt the recorded chord.
    ///
    /// On failure the previous target stays in place. Never emits an edge.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ChordRecordingEmpty`] if no modifier was pressed,
    /// or [`CoreError::ChordRecordingNotActive`] if no window was open.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn finish_recording(&mut self) -> CoreResult<HotkeySpec> {
        let roles = self
            .recording
            .take()
            .ok_or_else(|| CoreError::ChordRecordingNotActive {
                location: ErrorLocation::from(Location::caller()),
            })?;

        if roles.is_empty() {
            // Keys may have been released during the window.
            self.active = self.target.is_satisfied_by(self.held.iter());
            info!(hotkey = %self.target, "Hotkey recording captured nothing, keeping previous hotkey");
            return Err(CoreError::ChordRecordingEmpty {
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let spec = HotkeySpec::Chord(roles);
        self.set_target(spec.clone());

        info!(hotkey = %spec, "Hotkey recorded");

        Ok(spec)
    }

    fn evaluate(&mut self) -> Option<ChordEdge> {
        let now_active = self.target.is_satisfied_by(self.held.iter());

        match (self.active, now_active) {
            (false, true) => {
                self.active = true;
                debug!(hotkey = %self.target, "Hotkey activated");
                Some(ChordEdge::Activated)
            }
            (true, false) => {
                self.active = false;
                debug!(hotkey = %self.target, "Hotkey deactivated");
                Some(ChordEdge::Deactivated)
            }
            _ => None,
        }
    }

    fn evaluate_release(&mut self) -> Option<ChordEdge> {
        // While recording only deactivation may pass; activation is suppressed.
        if self.recording.is_some() && !self.active {
            return None;
        }
        self.evaluate()
    }
}
