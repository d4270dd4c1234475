#![allow(clippy::unwrap_used)]

use crate::{ChordEdge, ChordMatcher, CoreError, HotkeyPreset, HotkeySpec, ModifierRole, PhysicalKey};

use std::collections::BTreeSet;

fn control_option() -> HotkeySpec {
    HotkeySpec::chord([ModifierRole::Control, ModifierRole::Option]).unwrap()
}

/// WHAT: A chord activates only once every role is held
/// WHY: Partial chords must never start a recording
#[test]
fn given_chord_target_when_pressing_all_roles_then_activated_on_last() {
    // Given: Control+Option target
    let mut matcher = ChordMatcher::new(control_option());

    // When / Then: First key does nothing, second activates
    assert_eq!(matcher.press(PhysicalKey::LEFT_CONTROL), None);
    assert_eq!(matcher.press(PhysicalKey::LEFT_OPTION), Some(ChordEdge::Activated));
    assert!(matcher.is_active(&control_option()));
}

/// WHAT: Releasing a contributing key deactivates on that event
/// WHY: Push-to-talk must stop the moment the chord breaks, with no latching
#[test]
fn given_active_chord_when_releasing_one_key_then_deactivated_immediately() {
    // Given: Active Control+Option
    let mut matcher = ChordMatcher::new(control_option());
    matcher.press(PhysicalKey::LEFT_CONTROL);
    matcher.press(PhysicalKey::LEFT_OPTION);

    // When: Option released
    let edge = matcher.release(PhysicalKey::LEFT_OPTION);

    // Then: Deactivated now, and pressing it again re-activates
    assert_eq!(edge, Some(ChordEdge::Deactivated));
    assert!(!matcher.is_active(&control_option()));
    assert_eq!(matcher.press(PhysicalKey::LEFT_OPTION), Some(ChordEdge::Activated));
}

/// WHAT: A chord recorded from right-hand keys matches left-hand keys
/// WHY: Users should not care which side of the keyboard they reach for
#[test]
fn given_chord_recorded_from_right_keys_when_pressing_left_keys_then_activated() {
    // Given: A chord recorded with RightControl+RightOption
    let mut matcher = ChordMatcher::new(HotkeyPreset::default().spec());
    matcher.begin_recording().unwrap();
    matcher.press(PhysicalKey::RIGHT_CONTROL);
    matcher.press(PhysicalKey::RIGHT_OPTION);
    matcher.release(PhysicalKey::RIGHT_OPTION);
    matcher.release(PhysicalKey::RIGHT_CONTROL);
    let spec = matcher.finish_recording().unwrap();

    // When: The left-hand pair is pressed
    matcher.press(PhysicalKey::LEFT_CONTROL);
    let edge = matcher.press(PhysicalKey::LEFT_OPTION);

    // Then: The chord is satisfied
    assert_eq!(edge, Some(ChordEdge::Activated));
    assert!(matcher.is_active(&spec));
}

/// WHAT: Mixed sides satisfy a chord
/// WHY: Role equivalence is per key, not per chord
#[test]
fn given_chord_when_pressing_mixed_sides_then_active() {
    // Given
    let mut matcher = ChordMatcher::new(control_option());

    // When
    matcher.press(PhysicalKey::RIGHT_CONTROL);
    let edge = matcher.press(PhysicalKey::LEFT_OPTION);

    // Then
    assert_eq!(edge, Some(ChordEdge::Activated));
}

/// WHAT: Single-key presets are side exact
/// WHY: Right Command and Left Command are distinct presets
#[test]
fn given_right_command_preset_when_pressing_left_command_then_not_active() {
    // Given: Default preset (Right Command)
    let mut matcher = ChordMatcher::new(HotkeyPreset::RightCommand.spec());

    // When / Then: Left does nothing, right activates
    assert_eq!(matcher.press(PhysicalKey::LEFT_COMMAND), None);
    assert_eq!(matcher.press(PhysicalKey::RIGHT_COMMAND), Some(ChordEdge::Activated));
    assert_eq!(matcher.release(PhysicalKey::LEFT_COMMAND), None);
    assert_eq!(matcher.release(PhysicalKey::RIGHT_COMMAND), Some(ChordEdge::Deactivated));
}

/// WHAT: Auto-repeat presses produce no further edges
/// WHY: A held key must not restart the recording
#[test]
fn given_active_hotkey_when_key_repeats_then_no_edge() {
    // Given: F13 held
    let mut matcher = ChordMatcher::new(HotkeyPreset::F13.spec());
    assert_eq!(matcher.press(PhysicalKey::Function(13)), Some(ChordEdge::Activated));

    // When: Repeat presses
    let edges: Vec<_> = (0..5).map(|_| matcher.press(PhysicalKey::Function(13))).collect();

    // Then
    assert!(edges.iter().all(Option::is_none));
}

/// WHAT: A side-less release clears a sided press of the same role
/// WHY: Some platforms cannot report which side went up
#[test]
fn given_sided_press_when_sideless_release_then_deactivated() {
    // Given: Control+Option held via left keys
    let mut matcher = ChordMatcher::new(control_option());
    matcher.press(PhysicalKey::LEFT_CONTROL);
    matcher.press(PhysicalKey::LEFT_OPTION);

    // When: Platform reports a Control release without side
    let edge = matcher.release(PhysicalKey::Modifier {
        role: ModifierRole::Control,
        side: None,
    });

    // Then
    assert_eq!(edge, Some(ChordEdge::Deactivated));
}

/// WHAT: Recording collects modifier roles only, with no activation
/// WHY: Recording must not start a capture, and letters are not hotkeys
#[test]
fn given_recording_when_pressing_control_option_and_letter_then_chord_of_two_roles() {
    // Given: Target is Control+Option so presses would normally activate
    let mut matcher = ChordMatcher::new(control_option());
    matcher.begin_recording().unwrap();

    // When
    let edges = [
        matcher.press(PhysicalKey::LEFT_CONTROL),
        matcher.press(PhysicalKey::Other(0x00)),
        matcher.press(PhysicalKey::RIGHT_OPTION),
        matcher.press(PhysicalKey::LEFT_OPTION),
    ];
    let spec = matcher.finish_recording().unwrap();

    // Then: No edges, duplicates collapsed, letter ignored
    assert!(edges.iter().all(Option::is_none));
    let expected: BTreeSet<_> = [ModifierRole::Control, ModifierRole::Option].into();
    assert_eq!(spec, HotkeySpec::Chord(expected));
    assert_eq!(matcher.target(), &spec);
    assert!(!matcher.is_recording());
}

/// WHAT: An empty recording window keeps the previous hotkey
/// WHY: Failing to press anything must not leave the user without a hotkey
#[test]
fn given_recording_when_no_keys_pressed_then_error_and_previous_kept() {
    // Given
    let mut matcher = ChordMatcher::new(HotkeyPreset::LeftOption.spec());
    matcher.begin_recording().unwrap();

    // When
    let result = matcher.finish_recording();

    // Then
    assert!(matches!(result, Err(CoreError::ChordRecordingEmpty { .. })));
    assert_eq!(matcher.target(), &HotkeyPreset::LeftOption.spec());
    assert!(!matcher.is_recording());
}

/// WHAT: Recording is not reentrant
/// WHY: Two windows would race for the same key stream
#[test]
fn given_recording_when_beginning_again_then_error() {
    // Given
    let mut matcher = ChordMatcher::new(HotkeyPreset::default().spec());
    matcher.begin_recording().unwrap();

    // When
    let result = matcher.begin_recording();

    // Then: Rejected, first window still open
    assert!(matches!(result, Err(CoreError::ChordRecordingInProgress { .. })));
    assert!(matcher.is_recording());
}

/// WHAT: Finishing without beginning is an error
/// WHY: Callers must not adopt a chord that was never recorded
#[test]
fn given_no_recording_when_finishing_then_error() {
    // Given
    let mut matcher = ChordMatcher::new(HotkeyPreset::default().spec());

    // When / Then
    assert!(matches!(
        matcher.finish_recording(),
        Err(CoreError::ChordRecordingNotActive { .. })
    ));
}

/// WHAT: Deactivation still fires while a recording window is open
/// WHY: A session that is already recording must always be able to stop
#[test]
fn given_active_hotkey_when_recording_starts_and_key_released_then_deactivated() {
    // Given: Right Command held and active
    let mut matcher = ChordMatcher::new(HotkeyPreset::RightCommand.spec());
    matcher.press(PhysicalKey::RIGHT_COMMAND);
    matcher.begin_recording().unwrap();

    // When
    let edge = matcher.release(PhysicalKey::RIGHT_COMMAND);

    // Then
    assert_eq!(edge, Some(ChordEdge::Deactivated));
}

/// WHAT: Finishing with the new chord still held emits nothing
/// WHY: Adopting a hotkey must never start a capture by itself
#[test]
fn given_recorded_keys_still_held_when_finishing_then_no_edge_until_release() {
    // Given: Control+Shift pressed during recording and still held
    let mut matcher = ChordMatcher::new(HotkeyPreset::default().spec());
    matcher.begin_recording().unwrap();
    matcher.press(PhysicalKey::LEFT_CONTROL);
    matcher.press(PhysicalKey::LEFT_SHIFT);

    // When
    let spec = matcher.finish_recording().unwrap();

    // Then: Silently active; a further unrelated press emits nothing
    assert!(matcher.is_active(&spec));
    assert_eq!(matcher.press(PhysicalKey::Other(0x31)), None);
    assert_eq!(matcher.release(PhysicalKey::LEFT_SHIFT), Some(ChordEdge::Deactivated));
}
