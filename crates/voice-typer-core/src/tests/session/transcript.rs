use crate::{TranscriptResult, text_preview};

/// WHAT: Counts are derived from trimmed text
/// WHY: Stats rely on accurate word counts
#[test]
fn given_padded_text_when_wrapping_then_trimmed_and_counted() {
    // Given / When
    let transcript = TranscriptResult::new("  hello   brave world \n");

    // Then
    assert_eq!(transcript.text(), "hello   brave world");
    assert_eq!(transcript.word_count(), 3);
    assert_eq!(transcript.char_count(), 19);
}

/// WHAT: Previews cut long text and keep short text
/// WHY: Transcripts are only ever logged as a short preview
#[test]
fn given_long_text_when_previewing_then_truncated_with_ellipsis() {
    // Given
    let short = "short";
    let long = "x".repeat(80);

    // When / Then
    assert_eq!(text_preview(short), "short");
    assert_eq!(text_preview(&long), format!("{}...", "x".repeat(47)));
}

/// WHAT: Truncation respects character boundaries
/// WHY: Slicing mid-codepoint would panic
#[test]
fn given_multibyte_text_when_previewing_then_no_split_codepoint() {
    // Given: 30 two-byte characters (60 bytes)
    let text = "é".repeat(30);

    // When
    let preview = text_preview(&text);

    // Then
    assert!(preview.ends_with("..."));
    assert_eq!(preview.trim_end_matches("...").chars().count(), 23);
}
