//! Block normalisation and neighbour blending.
//!
//! Within each block the dominant channel is rescaled so it peaks at 1.0.
//! Everything else is zeroed, except that the first half of a block keeps
//! the previous block's dominant and the second half keeps the next
//! block's. Those carried-over values are left unscaled, giving a short
//! trailing/anticipating blend at each block boundary.

use crate::defaults::MIN_NORMALIZE_PEAK;
use crate::pipeline::cluster::Block;
use crate::pipeline::types::VisemeFrame;

/// Normalise and blend `frames` in place using the clustering result.
///
/// `block_size` is the nominal block length `blocks` were built with; the
/// half-way split is taken from it, not from a shorter final block.
pub fn normalize_blocks(frames: &mut [VisemeFrame], blocks: &[Block], block_size: usize) {
    let half = block_size / 2;

    for (b, block) in blocks.iter().enumerate() {
        let dominant = block.dominant;
        let previous = b.checked_sub(1).and_then(|p| blocks[p].dominant);
        let next = blocks.get(b + 1).and_then(|n| n.dominant);
        let scale = match dominant {
            Some(_) if block.peak > MIN_NORMALIZE_PEAK => Some(1.0 / block.peak),
            _ => None,
        };

        for (local, frame) in frames[block.frames.clone()].iter_mut().enumerate() {
            let carried = if local < half { previous } else { next };

            for (channel, w) in frame.weights.iter_mut().enumerate() {
                if Some(channel) == dominant {
                    if let Some(s) = scale {
                        *w = (*w * s).clamp(0.0, 1.0);
                    }
                } else if Some(channel) != carried {
                    *w = 0.0;
                }
            }
        }
    }
}
