use crate::{
    CoreResult,
    hotkey::{ChordMatcher, HotkeySpec, KeyEvent},
};

use std::time::Duration;

use tokio::{sync::mpsc, time::Instant};
use tracing::{debug, info, instrument};

/// How long the user has to press the new hotkey.
pub const RECORDING_WINDOW: Duration = Duration::from_secs(5);

/// Run one custom-hotkey recording window.
///
/// Feeds every key event arriving on `events` into `matcher` until `window`
/// elapses (or the channel closes), then adopts the recorded chord. Call this
/// only while no capture is running: edges produced during the window are
/// consumed here and never reach the capture session.
///
/// # Errors
///
/// Returns [`CoreError::ChordRecordingInProgress`](crate::CoreError::ChordRecordingInProgress)
/// if the matcher is already recording, or
/// [`CoreError::ChordRecordingEmpty`](crate::CoreError::ChordRecordingEmpty) if
/// no modifier was pressed; the previous hotkey is kept in both cases.
#[instrument(skip(matcher, events))]
pub async fn record_chord(
    matcher: &mut ChordMatcher,
    events: &mut mpsc::Receiver<KeyEvent>,
    window: Duration,
) -> CoreResult<HotkeySpec> {
    matcher.begin_recording()?;

    let deadline = Instant::now() + window;

    loop {
        tokio::select! {
            _ = tokio::time::sleep_until(deadline) => break,
            event = events.recv() => match event {
                Some(event) => {
                    if let Some(edge) = matcher.apply(event) {
                        debug!(?edge, "Edge consumed by hotkey recording");
                    }
                }
                None => {
                    info!("Key event channel closed during hotkey recording");
                    break;
                }
            }
        }
    }

    matcher.finish_recording()
}
