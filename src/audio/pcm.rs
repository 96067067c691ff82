//! Owned PCM sample buffer.

use std::time::Duration;

/// Interleaved 16-bit PCM audio plus the format it was recorded in.
///
/// The buffer is never modified once built; the pipeline only borrows it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PcmBuffer {
    samples: Vec<i16>,
    sample_rate: u32,
    channels: u16,
    bits_per_sample: u16,
}

impl PcmBuffer {
    /// Creates a buffer from interleaved samples.
    ///
    /// Format fields are not validated here; [`ChunkSegmenter::new`] rejects
    /// a zero sample rate or channel count before any work is done.
    ///
    /// [`ChunkSegmenter::new`]: crate::audio::ChunkSegmenter::new
    pub fn new(samples: Vec<i16>, sample_rate: u32, channels: u16, bits_per_sample: u16) -> Self {
        Self {
            samples,
            sample_rate,
            channels,
            bits_per_sample,
        }
    }

    /// Creates a 16-bit mono buffer.
    pub fn mono(samples: Vec<i16>, sample_rate: u32) -> Self {
        Self::new(samples, sample_rate, 1, 16)
    }

    /// Interleaved samples.
    pub fn samples(&self) -> &[i16] {
        &self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    pub fn bits_per_sample(&self) -> u16 {
        self.bits_per_sample
    }

    /// Total interleaved sample count.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Playback length of the buffer. Zero for an invalid format.
    pub fn duration(&self) -> Duration {
        if self.sample_rate == 0 || self.channels == 0 {
            return Duration::ZERO;
        }
        let frames = self.samples.len() as f64 / f64::from(self.channels);
        Duration::from_secs_f64(frames / f64::from(self.sample_rate))
    }
}
