/// Text produced by one capture, with derived counts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptResult {
    text: String,
    word_count: usize,
    char_count: usize,
}

impl TranscriptResult {
    /// Wrap transcribed text, trimming surrounding whitespace.
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let text = text.trim().to_string();
        let word_count = text.split_whitespace().count();
        let char_count = text.chars().count();

        Self {
            text,
            word_count,
            char_count,
        }
    }

    /// The transcript text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Whitespace-separated word count.
    pub fn word_count(&self) -> usize {
        self.word_count
    }

    /// Character count (Unicode scalar values).
    pub fn char_count(&self) -> usize {
        self.char_count
    }

    /// True when the transcript holds no text.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Log-safe preview: at most 50 bytes, cut on a char boundary.
    pub fn preview(&self) -> String {
        text_preview(&self.text)
    }
}

/// Truncate `text` for logs and menus: longer than 50 bytes becomes the
/// first 47 (or fewer, on a char boundary) plus `...`.
pub fn text_preview(text: &str) -> String {
    if text.len() <= 50 {
        return text.to_string();
    }
    let mut end = 47;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &text[..end])
}
