#![allow(clippy::unwrap_used)]

use crate::{
    AudioCapture, CoreError, MIN_CAPTURE_DURATION, TARGET_SAMPLE_RATE,
    tests::support::{BLOCK_FRAMES, FakeDevice},
};

const SPEECH_AMPLITUDE: f32 = 0.05;
const LEVEL_TOLERANCE: f32 = 1e-4;

/// WHAT: A full second at 16 kHz comes back untouched
/// WHY: The pipeline must receive every sample captured while the key was held
#[test]
fn given_one_second_at_16khz_when_stopping_then_buffer_holds_every_sample() {
    // Given: A running capture on a 16 kHz device
    let device = FakeDevice::new(TARGET_SAMPLE_RATE);
    let mut capture = AudioCapture::new(device.backend());
    capture.start().unwrap();

    // When: One second of audio arrives and capture stops
    device.feed_seconds(1.0, SPEECH_AMPLITUDE);
    let buffer = capture.stop().unwrap();

    // Then: All samples are present at the pipeline rate
    assert_eq!(buffer.sample_rate(), TARGET_SAMPLE_RATE);
    assert_eq!(buffer.len(), TARGET_SAMPLE_RATE as usize);
    assert_eq!(buffer.block_count(), TARGET_SAMPLE_RATE as usize / BLOCK_FRAMES);
}

/// WHAT: Blocks are kept in arrival order
/// WHY: Reordering hardware buffers would scramble speech
#[test]
fn given_distinct_blocks_when_stopping_then_order_preserved() {
    // Given: A running capture
    let device = FakeDevice::new(TARGET_SAMPLE_RATE);
    let mut capture = AudioCapture::new(device.backend());
    capture.start().unwrap();

    // When: Five blocks with increasing values arrive (0.5 s total)
    for i in 0..5u8 {
        device.feed(&vec![f32::from(i) / 10.0; BLOCK_FRAMES]);
    }
    let buffer = capture.stop().unwrap();

    // Then: Samples appear block by block in the same order
    let firsts: Vec<f32> = buffer.samples().step_by(BLOCK_FRAMES).collect();
    assert_eq!(firsts, vec![0.0, 0.1, 0.2, 0.3, 0.4]);
}

/// WHAT: Captures under the minimum duration are discarded
/// WHY: A tap of the hotkey must report "no audio" instead of transcribing noise
#[test]
fn given_quarter_second_capture_when_stopping_then_none() {
    // Given: A running capture
    let device = FakeDevice::new(TARGET_SAMPLE_RATE);
    let mut capture = AudioCapture::new(device.backend());
    capture.start().unwrap();

    // When: Only 0.25 s arrives
    device.feed_seconds(0.25, SPEECH_AMPLITUDE);
    let buffer = capture.stop();

    // Then: Nothing is handed over and the device is released
    assert!(buffer.is_none());
    assert!(MIN_CAPTURE_DURATION.as_secs_f32() > 0.25);
    assert!(!device.is_open());
}

/// WHAT: Stopping with no samples yields nothing
/// WHY: A device that never delivered must not produce an empty transcription request
#[test]
fn given_no_blocks_when_stopping_then_none() {
    // Given: A started capture that receives nothing
    let device = FakeDevice::new(TARGET_SAMPLE_RATE);
    let mut capture = AudioCapture::new(device.backend());
    capture.start().unwrap();

    // When: Stopping
    let buffer = capture.stop();

    // Then: None
    assert!(buffer.is_none());
}

/// WHAT: Non-16 kHz captures are handed over at the device rate
/// WHY: stop() runs on the release path; conversion belongs to the pipeline worker
#[test]
fn given_48khz_device_when_stopping_then_buffer_kept_at_device_rate() {
    // Given: A running capture on a 48 kHz device
    let device = FakeDevice::new(48_000);
    let mut capture = AudioCapture::new(device.backend());
    capture.start().unwrap();

    // When: One second arrives
    device.feed_seconds(1.0, SPEECH_AMPLITUDE);
    let buffer = capture.stop().unwrap();

    // Then: Every device sample comes back, labelled with the device rate
    assert_eq!(buffer.sample_rate(), 48_000);
    assert_eq!(buffer.len(), 48_000);
    assert!(!device.is_open());
}

/// WHAT: The minimum duration is measured at the device rate
/// WHY: 0.4 s at 48 kHz has more samples than 0.5 s at 16 kHz but is still a tap
#[test]
fn given_48khz_device_when_stopping_after_short_tap_then_none() {
    // Given: A running capture on a 48 kHz device
    let device = FakeDevice::new(48_000);
    let mut capture = AudioCapture::new(device.backend());
    capture.start().unwrap();

    // When: 0.4 s arrives
    device.feed_seconds(0.4, SPEECH_AMPLITUDE);
    let buffer = capture.stop();

    // Then: Discarded
    assert!(buffer.is_none());
}

/// WHAT: Each block publishes clamp(RMS x 10) and stop resets to zero
/// WHY: The level meter must track the voice and go quiet when recording ends
#[test]
fn given_running_capture_when_block_arrives_then_level_published() {
    // Given: A running capture with a level observer
    let device = FakeDevice::new(TARGET_SAMPLE_RATE);
    let mut capture = AudioCapture::new(device.backend());
    let level = capture.level_receiver();
    capture.start().unwrap();

    // When: A constant 0.05 block arrives
    device.feed(&vec![SPEECH_AMPLITUDE; BLOCK_FRAMES]);

    // Then: Level is 0.5
    assert!((*level.borrow() - 0.5).abs() < LEVEL_TOLERANCE);

    // When: A loud block arrives
    device.feed(&vec![0.9; BLOCK_FRAMES]);

    // Then: Level saturates at 1.0
    assert!((*level.borrow() - 1.0).abs() < LEVEL_TOLERANCE);

    // When: Capture stops
    let _ = capture.stop();

    // Then: Level drops to zero
    assert!(level.borrow().abs() < LEVEL_TOLERANCE);
}

/// WHAT: Capture keeps running with no level observers
/// WHY: A closed meter must never interrupt recording
#[test]
fn given_no_level_observer_when_blocks_arrive_then_capture_continues() {
    // Given: A running capture whose only level receiver was dropped
    let device = FakeDevice::new(TARGET_SAMPLE_RATE);
    let mut capture = AudioCapture::new(device.backend());
    drop(capture.level_receiver());
    capture.start().unwrap();

    // When: Audio arrives
    device.feed_seconds(0.6, SPEECH_AMPLITUDE);

    // Then: The buffer still fills
    assert!(capture.stop().is_some());
}

/// WHAT: A device that refuses to open surfaces an error and holds nothing
/// WHY: A busy microphone must leave no half-open stream behind
#[test]
fn given_busy_device_when_starting_then_device_error_and_released() {
    // Given: A device that fails to open
    let device = FakeDevice::failing();
    let mut capture = AudioCapture::new(device.backend());

    // When: Starting
    let result = capture.start();

    // Then: DeviceError, not recording, nothing open
    assert!(matches!(result, Err(CoreError::DeviceError { .. })));
    assert!(!capture.is_recording());
    assert!(!device.is_open());
}

/// WHAT: Zero-rate devices are rejected
/// WHY: Duration and resampling are undefined at 0 Hz
#[test]
fn given_zero_rate_device_when_starting_then_unsupported_format() {
    // Given: A device reporting 0 Hz
    let device = FakeDevice::new(0);
    let mut capture = AudioCapture::new(device.backend());

    // When: Starting
    let result = capture.start();

    // Then: Rejected and released
    assert!(matches!(result, Err(CoreError::UnsupportedFormat { .. })));
    assert!(!device.is_open());
}

/// WHAT: Starting twice opens the device once
/// WHY: At most one capture stream may exist
#[test]
fn given_running_capture_when_starting_again_then_noop() {
    // Given: A running capture
    let device = FakeDevice::new(TARGET_SAMPLE_RATE);
    let mut capture = AudioCapture::new(device.backend());
    capture.start().unwrap();

    // When: Starting again
    capture.start().unwrap();

    // Then: Only one open happened
    assert_eq!(device.opens(), 1);
    assert!(capture.is_recording());
}

/// WHAT: cleanup() is idempotent and stop after cleanup is a no-op
/// WHY: Teardown paths may overlap (shutdown, drop, failed start)
#[test]
fn given_running_capture_when_cleanup_twice_then_safe() {
    // Given: A running capture with audio
    let device = FakeDevice::new(TARGET_SAMPLE_RATE);
    let mut capture = AudioCapture::new(device.backend());
    capture.start().unwrap();
    device.feed_seconds(1.0, SPEECH_AMPLITUDE);

    // When: Cleaning up twice, then stopping
    capture.cleanup();
    capture.cleanup();
    let buffer = capture.stop();

    // Then: Device released, partial capture discarded
    assert!(!device.is_open());
    assert!(!capture.is_recording());
    assert!(buffer.is_none());
}

/// WHAT: Double stop returns nothing the second time
/// WHY: The buffer is moved out exactly once
#[test]
fn given_stopped_capture_when_stopping_again_then_none() {
    // Given: A capture that has been stopped with audio
    let device = FakeDevice::new(TARGET_SAMPLE_RATE);
    let mut capture = AudioCapture::new(device.backend());
    capture.start().unwrap();
    device.feed_seconds(1.0, SPEECH_AMPLITUDE);
    assert!(capture.stop().is_some());

    // When: Stopping again
    let second = capture.stop();

    // Then: None
    assert!(second.is_none());
}

/// WHAT: Blocks arriving after stop are ignored
/// WHY: A late driver callback must not leak into the next recording
#[test]
fn given_stopped_capture_when_restarting_then_buffer_starts_empty() {
    // Given: A first recording that was stopped
    let device = FakeDevice::new(TARGET_SAMPLE_RATE);
    let mut capture = AudioCapture::new(device.backend());
    capture.start().unwrap();
    device.feed_seconds(1.0, SPEECH_AMPLITUDE);
    let _ = capture.stop();

    // When: A second recording captures 0.6 s
    capture.start().unwrap();
    device.feed_seconds(0.6, SPEECH_AMPLITUDE);
    let buffer = capture.stop().unwrap();

    // Then: Only the second recording's samples are present
    assert_eq!(buffer.len(), (0.6 * TARGET_SAMPLE_RATE as f32) as usize);
}

/// WHAT: Dropping a running capture releases the device
/// WHY: No orphaned streams when the owner goes away
#[test]
fn given_running_capture_when_dropped_then_device_released() {
    // Given: A running capture
    let device = FakeDevice::new(TARGET_SAMPLE_RATE);
    let mut capture = AudioCapture::new(device.backend());
    capture.start().unwrap();

    // When: Dropped
    drop(capture);

    // Then: Device closed
    assert!(!device.is_open());
    assert!(device.closes() >= 1);
}
