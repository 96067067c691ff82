//! Short-activation filter.
//!
//! Single-frame blips in raw inference output read as flicker on a face.
//! Any activation (value above the threshold) that does not hold for at
//! least `min_hold` consecutive frames is zeroed before clustering, so it
//! cannot win a block.

use crate::defaults::ACTIVATION_THRESHOLD;
use crate::pipeline::types::VisemeFrame;
use std::ops::Range;

/// Maximal runs of frames where `channel` is above the activation threshold.
///
/// A run still open at the end of the sequence ends at `frames.len()`.
pub fn activation_runs(frames: &[VisemeFrame], channel: usize) -> Vec<Range<usize>> {
    let mut runs = Vec::new();
    let mut start: Option<usize> = None;

    for (i, frame) in frames.iter().enumerate() {
        if frame.weight(channel) > ACTIVATION_THRESHOLD {
            start.get_or_insert(i);
        } else if let Some(s) = start.take() {
            runs.push(s..i);
        }
    }
    if let Some(s) = start {
        runs.push(s..frames.len());
    }

    runs
}

/// Zero every activation run shorter than `min_hold` frames, per channel.
///
/// Runs of `min_hold` frames or more are left exactly as they were.
/// Returns the number of runs removed.
pub fn filter_short_activations(frames: &mut [VisemeFrame], min_hold: usize) -> usize {
    let channels = frames.first().map_or(0, VisemeFrame::channels);
    let mut removed = 0;

    for channel in 0..channels {
        let short: Vec<Range<usize>> = activation_runs(frames, channel)
            .into_iter()
            .filter(|run| run.len() < min_hold)
            .collect();

        for run in &short {
            for frame in &mut frames[run.clone()] {
                if let Some(w) = frame.weights.get_mut(channel) {
                    *w = 0.0;
                }
            }
        }
        removed += short.len();
    }

    removed
}
