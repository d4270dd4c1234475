/// Gain applied to block RMS so ordinary speech fills most of the meter.
pub const LEVEL_GAIN: f32 = 10.0;

/// Root-mean-square of a block. Zero for an empty block.
pub fn rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let energy: f32 = samples.iter().map(|s| s * s).sum::<f32>() / samples.len() as f32;
    energy.sqrt()
}

/// Normalized live level in `[0, 1]` for one hardware block.
pub fn block_level(samples: &[f32]) -> f32 {
    let level = rms(samples) * LEVEL_GAIN;
    if level.is_nan() {
        0.0
    } else {
        level.clamp(0.0, 1.0)
    }
}
