use crate::{AppError, AppResult};

use std::{panic::Location, thread, time::Duration};

use enigo::{Direction, Enigo, Key, Keyboard, Settings};
use error_location::ErrorLocation;

/// Gap between synthetic key events; some apps drop events sent back to back.
const KEY_EVENT_DELAY: Duration = Duration::from_millis(10);

/// The platform paste modifier: Command on macOS, Control elsewhere.
fn paste_modifier() -> Key {
    #[cfg(target_os = "macos")]
    {
        Key::Meta
    }
    #[cfg(not(target_os = "macos"))]
    {
        Key::Control
    }
}

/// Holds the paste modifier down and releases it on drop, so a failed or
/// panicking key click never leaves the modifier stuck.
pub struct PasteKeyGuard {
    enigo: Enigo,
    modifier: Key,
}

impl PasteKeyGuard {
    /// Press the paste modifier.
    #[track_caller]
    pub(crate) fn press() -> AppResult<Self> {
        let modifier = paste_modifier();

        let mut enigo =
            Enigo::new(&Settings::default()).map_err(|e| AppError::AutoPasteFailed {
                reason: format!("Failed to create Enigo: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        enigo
            .key(modifier, Direction::Press)
            .map_err(|e| AppError::AutoPasteFailed {
                reason: format!("Failed to press paste modifier: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        Ok(Self { enigo, modifier })
    }

    /// Click `V` while the modifier is held.
    #[track_caller]
    pub(crate) fn click_v(&mut self) -> AppResult<()> {
        thread::sleep(KEY_EVENT_DELAY);

        self.enigo
            .key(Key::Unicode('v'), Direction::Click)
            .map_err(|e| AppError::AutoPasteFailed {
                reason: format!("Failed to press V: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        thread::sleep(KEY_EVENT_DELAY);
        Ok(())
    }
}

impl Drop for PasteKeyGuard {
    fn drop(&mut self) {
        let _ = self.enigo.key(self.modifier, Direction::Release);
    }
}
