use std::{fmt, time::Duration};

/// Captured audio as the ordered blocks the driver delivered.
///
/// Append-only while recording; handed to the pipeline by value so the
/// capture side can never touch it again.
#[derive(PartialEq)]
pub struct AudioBuffer {
    blocks: Vec<Vec<f32>>,
    sample_rate: u32,
    len: usize,
}

impl AudioBuffer {
    /// Empty buffer at `sample_rate`.
    pub fn new(sample_rate: u32) -> Self {
        Self {
            blocks: Vec::new(),
            sample_rate,
            len: 0,
        }
    }

    /// Single-block buffer wrapping `samples`.
    pub fn from_samples(samples: Vec<f32>, sample_rate: u32) -> Self {
        let mut buffer = Self::new(sample_rate);
        buffer.push_block(samples);
        buffer
    }

    /// Append one block. Empty blocks are skipped.
    pub fn push_block(&mut self, block: Vec<f32>) {
        if block.is_empty() {
            return;
        }
        self.len += block.len();
        self.blocks.push(block);
    }

    /// Relabel the sample rate once the device format is known.
    pub(crate) fn with_sample_rate(mut self, sample_rate: u32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    /// Sample rate in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Total number of samples across all blocks.
    pub fn len(&self) -> usize {
        self.len
    }

    /// True when no samples have been appended.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of blocks appended so far.
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Playback duration of the buffer.
    pub fn duration(&self) -> Duration {
        if self.sample_rate == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(self.len as f64 / f64::from(self.sample_rate))
    }

    /// Iterate over all samples in capture order.
    pub fn samples(&self) -> impl Iterator<Item = f32> + '_ {
        self.blocks.iter().flat_map(|block| block.iter().copied())
    }

    /// Flatten into one contiguous vector.
    pub fn into_samples(self) -> Vec<f32> {
        if self.blocks.len() == 1 {
            return self.blocks.into_iter().next().unwrap_or_default();
        }
        let mut samples = Vec::with_capacity(self.len);
        for block in self.blocks {
            samples.extend_from_slice(&block);
        }
        samples
    }
}

impl fmt::Debug for AudioBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AudioBuffer")
            .field("sample_rate", &self.sample_rate)
            .field("blocks", &self.blocks.len())
            .field("samples", &self.len)
            .finish()
    }
}
