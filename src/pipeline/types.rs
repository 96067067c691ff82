//! Data types that flow between cook stages.

use crate::defaults::{FRAME_DURATION_MS, FRAME_RATE_HZ};
use serde::{Deserialize, Serialize};

/// Viseme weights for one 10 ms slice of audio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisemeFrame {
    /// Ordinal of the chunk this frame was inferred from.
    pub index: usize,
    /// One weight per viseme channel, each in `[0, 1]`.
    pub weights: Vec<f32>,
    /// Laughter score in `[0, 1]`. Carried through untouched.
    pub laughter: f32,
}

impl VisemeFrame {
    /// Creates a new frame.
    pub fn new(index: usize, weights: Vec<f32>, laughter: f32) -> Self {
        Self {
            index,
            weights,
            laughter,
        }
    }

    /// Start time of this frame in milliseconds.
    pub fn time_ms(&self) -> u64 {
        self.index as u64 * u64::from(FRAME_DURATION_MS)
    }

    /// Weight of `channel`, or 0 for a channel the frame doesn't have.
    pub fn weight(&self, channel: usize) -> f32 {
        self.weights.get(channel).copied().unwrap_or(0.0)
    }

    /// Number of viseme channels.
    pub fn channels(&self) -> usize {
        self.weights.len()
    }

    /// Channel with the highest weight, lowest index on ties.
    ///
    /// `None` for an all-zero frame.
    pub fn strongest(&self) -> Option<usize> {
        let mut best: Option<(usize, f32)> = None;
        for (channel, &w) in self.weights.iter().enumerate() {
            if w > 0.0 && best.is_none_or(|(_, b)| w > b) {
                best = Some((channel, w));
            }
        }
        best.map(|(channel, _)| channel)
    }
}

/// The sealed output of a cook run.
///
/// Frames are in chunk order and are never modified once the sequence is
/// built; playback code only reads from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameSequence {
    frame_rate: u32,
    frames: Vec<VisemeFrame>,
}

impl FrameSequence {
    pub(crate) fn from_frames(frames: Vec<VisemeFrame>) -> Self {
        Self {
            frame_rate: FRAME_RATE_HZ,
            frames,
        }
    }

    /// Frames per second of playback.
    pub fn frame_rate(&self) -> u32 {
        self.frame_rate
    }

    pub fn frames(&self) -> &[VisemeFrame] {
        &self.frames
    }

    pub fn get(&self, index: usize) -> Option<&VisemeFrame> {
        self.frames.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, VisemeFrame> {
        self.frames.iter()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Channel count of the frames (0 for an empty sequence).
    pub fn viseme_count(&self) -> usize {
        self.frames.first().map_or(0, VisemeFrame::channels)
    }

    /// Playback length in milliseconds.
    pub fn duration_ms(&self) -> u64 {
        self.frames.len() as u64 * u64::from(FRAME_DURATION_MS)
    }

    /// Laughter scores in frame order.
    pub fn laughter_scores(&self) -> impl Iterator<Item = f32> + '_ {
        self.frames.iter().map(|f| f.laughter)
    }

    /// Hand the frames over to the caller.
    pub fn into_frames(self) -> Vec<VisemeFrame> {
        self.frames
    }
}

impl<'a> IntoIterator for &'a FrameSequence {
    type Item = &'a VisemeFrame;
    type IntoIter = std::slice::Iter<'a, VisemeFrame>;

    fn into_iter(self) -> Self::IntoIter {
        self.frames.iter()
    }
}
