//! Paste-at-cursor delivery through the system clipboard.
//!
//! The transcript is put on the clipboard, the platform paste shortcut is
//! simulated, and the previous clipboard text is put back shortly after on
//! a detached thread.

use crate::{AppError, AppResult, PasteKeyGuard, config::BehaviourConfig};

use voice_typer_core::{InjectionPort, text_preview};

use std::{panic::Location, thread, time::Duration};

use arboard::Clipboard;
use error_location::ErrorLocation;
use tracing::{debug, info, instrument, warn};

/// Time for the clipboard owner to publish the new text before pasting.
const CLIPBOARD_SETTLE_DELAY: Duration = Duration::from_millis(150);

/// Time for the target application to read the clipboard after the shortcut.
const PASTE_COMPLETE_DELAY: Duration = Duration::from_millis(100);

/// Delay before the previous clipboard text is restored.
const CLIPBOARD_RESTORE_DELAY: Duration = Duration::from_millis(500);

/// [`InjectionPort`] that pastes via clipboard and a simulated shortcut.
///
/// Runs on the pipeline's blocking worker; every call opens its own
/// clipboard handle because `Clipboard` is not shareable across threads on
/// every platform.
#[derive(Debug, Clone)]
pub struct ClipboardInjector {
    auto_paste: bool,
    restore_clipboard: bool,
}

impl ClipboardInjector {
    /// Injector following the `[behavior]` settings.
    pub fn new(behavior: &BehaviourConfig) -> Self {
        Self {
            auto_paste: behavior.auto_paste,
            restore_clipboard: behavior.restore_clipboard,
        }
    }

    /// Copy `text` and, if enabled, paste it into the focused window.
    ///
    /// With auto-paste disabled the text is only copied and the previous
    /// clipboard is not restored.
    #[instrument(skip(self, text), fields(text_len = text.len()))]
    pub fn deliver(&self, text: &str) -> AppResult<()> {
        let mut clipboard = open_clipboard()?;

        let previous = if self.restore_clipboard && self.auto_paste {
            clipboard.get_text().ok()
        } else {
            None
        };

        clipboard
            .set_text(text)
            .map_err(|e| AppError::ClipboardError {
                reason: format!("Failed to set clipboard: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        debug!("Text copied to clipboard");

        if !self.auto_paste {
            info!("Auto-paste disabled, text left on clipboard");
            return Ok(());
        }

        thread::sleep(CLIPBOARD_SETTLE_DELAY);

        {
            let mut guard = PasteKeyGuard::press()?;
            guard.click_v()?;
        }

        thread::sleep(PASTE_COMPLETE_DELAY);

        if let Some(previous) = previous {
            restore_later(previous);
        }

        Ok(())
    }
}

impl InjectionPort for ClipboardInjector {
    fn paste(&self, text: &str) -> bool {
        match self.deliver(text) {
            Ok(()) => {
                info!(preview = %text_preview(text), "Text pasted");
                true
            }
            Err(e) => {
                warn!(error = ?e, "Paste failed");
                false
            }
        }
    }
}

/// Put `text` on the clipboard without pasting it anywhere.
#[track_caller]
#[instrument(skip(text), fields(text_len = text.len()))]
pub(crate) fn copy_to_clipboard(text: &str) -> AppResult<()> {
    open_clipboard()?
        .set_text(text)
        .map_err(|e| AppError::ClipboardError {
            reason: format!("Failed to set clipboard: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })
}

#[track_caller]
fn open_clipboard() -> AppResult<Clipboard> {
    Clipboard::new().map_err(|e| AppError::ClipboardError {
        reason: format!("Failed to open clipboard: {}", e),
        location: ErrorLocation::from(Location::caller()),
    })
}

fn restore_later(previous: String) {
    let spawned = thread::Builder::new()
        .name("clipboard-restore".to_string())
        .spawn(move || {
            thread::sleep(CLIPBOARD_RESTORE_DELAY);
            match open_clipboard().and_then(|mut clipboard| {
                clipboard
                    .set_text(previous)
                    .map_err(|e| AppError::ClipboardError {
                        reason: format!("Failed to restore clipboard: {}", e),
                        location: ErrorLocation::from(Location::caller()),
                    })
            }) {
                Ok(()) => debug!("Previous clipboard restored"),
                Err(e) => warn!(error = ?e, "Failed to restore clipboard"),
            }
        });

    if let Err(e) = spawned {
        warn!(error = ?e, "Failed to spawn clipboard restore thread");
    }
}
