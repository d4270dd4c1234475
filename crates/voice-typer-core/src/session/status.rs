use std::fmt;

/// One-line, user-facing status published by a [`CaptureSession`](crate::session::CaptureSession).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionStatus {
    /// Microphone opened.
    Recording,
    /// Capture handed to the pipeline.
    Processing,
    /// Nothing (or too little) was captured.
    NoAudio,
    /// Transcription was empty or failed.
    NoSpeech,
    /// Text delivered.
    Done {
        /// Words in the delivered transcript.
        word_count: usize,
    },
    /// Text transcribed and recorded, but pasting failed.
    PasteFailed,
    /// A start attempt or the pipeline failed.
    Error(String),
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Recording => f.write_str("Recording..."),
            Self::Processing => f.write_str("Processing..."),
            Self::NoAudio => f.write_str("No audio detected"),
            Self::NoSpeech => f.write_str("No speech detected"),
            Self::Done { word_count } => write!(f, "Done! ({word_count} words)"),
            Self::PasteFailed => f.write_str("Paste failed"),
            Self::Error(reason) => write!(f, "Error: {reason}"),
        }
    }
}
