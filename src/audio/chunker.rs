//! Splits a PCM buffer into fixed 10 ms chunks for inference.
//!
//! Chunks never overlap and are aligned to the buffer's channel count. The
//! trailing partial chunk is dropped rather than padded.

use crate::audio::pcm::PcmBuffer;
use crate::defaults::FRAME_RATE_HZ;
use crate::error::{LipcookError, Result};

/// A read-only 10 ms window over a [`PcmBuffer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioChunk<'a> {
    /// Ordinal of this chunk; also the index of the frame it will produce.
    pub index: usize,
    /// Interleaved samples for every channel.
    pub samples: &'a [i16],
    /// Samples per channel in this chunk.
    pub frames: usize,
    /// Channel count of the source buffer.
    pub channels: u16,
}

impl AudioChunk<'_> {
    /// Whether the samples are interleaved from more than one channel.
    pub fn is_multichannel(&self) -> bool {
        self.channels > 1
    }
}

/// Validated chunk geometry for one buffer.
#[derive(Debug, Clone, Copy)]
pub struct ChunkSegmenter<'a> {
    buffer: &'a PcmBuffer,
    frames_per_chunk: usize,
    chunk_len: usize,
}

impl<'a> ChunkSegmenter<'a> {
    /// Validates the buffer format and computes the chunk length.
    ///
    /// Fails with `InvalidAudioFormat` on a zero sample rate or channel
    /// count, or when the rate is too low to fill a single 10 ms chunk.
    pub fn new(buffer: &'a PcmBuffer) -> Result<Self> {
        if buffer.sample_rate() == 0 || buffer.channels() == 0 {
            return Err(LipcookError::InvalidAudioFormat {
                message: format!(
                    "sample rate {} Hz / {} channel(s) is not a usable format",
                    buffer.sample_rate(),
                    buffer.channels()
                ),
            });
        }

        // round(sample_rate / frame_rate)
        let frames_per_chunk =
            ((buffer.sample_rate() + FRAME_RATE_HZ / 2) / FRAME_RATE_HZ) as usize;
        if frames_per_chunk == 0 {
            return Err(LipcookError::InvalidAudioFormat {
                message: format!(
                    "sample rate {} Hz is below one sample per frame",
                    buffer.sample_rate()
                ),
            });
        }

        Ok(Self {
            buffer,
            frames_per_chunk,
            chunk_len: frames_per_chunk * usize::from(buffer.channels()),
        })
    }

    /// Samples per channel in each chunk.
    pub fn frames_per_chunk(&self) -> usize {
        self.frames_per_chunk
    }

    /// Interleaved samples in each chunk.
    pub fn chunk_len(&self) -> usize {
        self.chunk_len
    }

    /// Number of complete chunks in the buffer.
    pub fn chunk_count(&self) -> usize {
        self.buffer.len() / self.chunk_len
    }

    /// Lazy iterator over all complete chunks.
    ///
    /// Each call starts again from the beginning of the buffer.
    pub fn chunks(&self) -> Chunks<'a> {
        Chunks {
            samples: self.buffer.samples(),
            frames: self.frames_per_chunk,
            chunk_len: self.chunk_len,
            channels: self.buffer.channels(),
            next: 0,
        }
    }
}

/// Iterator returned by [`ChunkSegmenter::chunks`].
#[derive(Debug, Clone)]
pub struct Chunks<'a> {
    samples: &'a [i16],
    frames: usize,
    chunk_len: usize,
    channels: u16,
    next: usize,
}

impl<'a> Iterator for Chunks<'a> {
    type Item = AudioChunk<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let start = self.next * self.chunk_len;
        let end = start + self.chunk_len;
        if end > self.samples.len() {
            return None;
        }

        let chunk = AudioChunk {
            index: self.next,
            samples: &self.samples[start..end],
            frames: self.frames,
            channels: self.channels,
        };
        self.next += 1;
        Some(chunk)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.samples.len() / self.chunk_len).saturating_sub(self.next);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Chunks<'_> {}
