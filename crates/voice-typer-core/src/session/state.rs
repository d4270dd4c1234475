use std::fmt;

/// Phase of the push-to-talk cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CaptureState {
    /// Waiting for the hotkey.
    #[default]
    Idle,
    /// Microphone open, hotkey held.
    Recording,
    /// Hotkey released; transcription and delivery running in the background.
    Processing,
}

impl fmt::Display for CaptureState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Recording => "recording",
            Self::Processing => "processing",
        };
        f.write_str(name)
    }
}
