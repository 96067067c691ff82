//! Speech tempo estimate used to resize the smoothing window.
//!
//! Fast speech keeps each viseme above threshold for only a few frames and
//! wants a tighter window; slow, drawn-out speech tolerates a wider one.

use crate::defaults::{ACTIVATION_THRESHOLD, FAST_TEMPO_ACTIVE_FRAMES, SLOW_TEMPO_ACTIVE_FRAMES};
use crate::pipeline::types::VisemeFrame;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TempoEstimate {
    /// Frames above the activation threshold, averaged over active channels.
    pub mean_active_frames: f32,
    /// Channels with at least one frame above the threshold.
    pub active_channels: usize,
}

/// Estimate tempo from per-channel active frame counts. `None` when nothing
/// activates.
pub fn estimate_tempo(frames: &[VisemeFrame]) -> Option<TempoEstimate> {
    let channels = frames.first().map_or(0, VisemeFrame::channels);

    let counts: Vec<usize> = (0..channels)
        .map(|channel| {
            frames
                .iter()
                .filter(|f| f.weight(channel) > ACTIVATION_THRESHOLD)
                .count()
        })
        .filter(|&count| count > 0)
        .collect();

    if counts.is_empty() {
        return None;
    }

    Some(TempoEstimate {
        mean_active_frames: counts.iter().sum::<usize>() as f32 / counts.len() as f32,
        active_channels: counts.len(),
    })
}

/// Halve the window for fast speech, grow it by half for slow speech.
///
/// The result stays within `1..=ceiling`.
pub fn adapt_window(window: usize, ceiling: usize, tempo: &TempoEstimate) -> usize {
    let adapted = if tempo.mean_active_frames < FAST_TEMPO_ACTIVE_FRAMES {
        window / 2
    } else if tempo.mean_active_frames > SLOW_TEMPO_ACTIVE_FRAMES {
        (window * 3).div_ceil(2)
    } else {
        window
    };
    adapted.clamp(1, ceiling.max(1))
}
