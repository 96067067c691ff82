//! Dominant-viseme clustering.
//!
//! The sequence is cut into fixed-size blocks and each block elects one
//! viseme: the channel with the largest priority-weighted sum of values.
//! One active viseme per short window is what keeps the mouth from
//! flickering between near-equal candidates.

use crate::pipeline::types::VisemeFrame;
use crate::viseme::PriorityTable;
use std::ops::Range;

/// Clustering result for one block of frames.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    /// Frames covered by this block.
    pub frames: Range<usize>,
    /// Winning channel, `None` when no channel has a positive weighted sum.
    pub dominant: Option<usize>,
    /// Largest unweighted value of the winning channel in the block.
    pub peak: f32,
}

impl Block {
    /// Dominant channel as a signed index, `-1` for none.
    pub fn dominant_index(&self) -> i32 {
        self.dominant.map_or(-1, |c| c as i32)
    }
}

/// Partition `frames` into blocks of `block_size` and elect each block's
/// dominant viseme.
///
/// The last block may be shorter. Ties go to the lowest channel index.
pub fn cluster_blocks(
    frames: &[VisemeFrame],
    block_size: usize,
    priorities: &PriorityTable,
) -> Vec<Block> {
    let block_size = block_size.max(1);
    let channels = frames.first().map_or(0, VisemeFrame::channels);

    (0..frames.len())
        .step_by(block_size)
        .map(|start| {
            let end = (start + block_size).min(frames.len());
            let block = &frames[start..end];

            let mut dominant = None;
            let mut best = 0.0f32;
            for channel in 0..channels {
                let sum: f32 = block.iter().map(|f| f.weight(channel)).sum();
                let weighted = sum * priorities.weight(channel);
                if weighted > best {
                    best = weighted;
                    dominant = Some(channel);
                }
            }

            let peak = dominant.map_or(0.0, |channel| {
                block
                    .iter()
                    .map(|f| f.weight(channel))
                    .fold(0.0f32, f32::max)
            });

            Block {
                frames: start..end,
                dominant,
                peak,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frames_from(rows: &[&[f32]]) -> Vec<VisemeFrame> {
        rows.iter()
            .enumerate()
            .map(|(i, row)| VisemeFrame::new(i, row.to_vec(), 0.0))
            .collect()
    }

    #[test]
    fn test_blocks_cover_sequence_with_short_tail() {
        let silent: &[f32] = &[0.0];
        let frames = frames_from(&[silent; 14]);
        let blocks = cluster_blocks(&frames, 6, &PriorityTable::uniform());

        let ranges: Vec<_> = blocks.iter().map(|b| b.frames.clone()).collect();
        assert_eq!(ranges, vec![0..6, 6..12, 12..14]);
    }

    #[test]
    fn test_highest_sum_wins() {
        let frames = frames_from(&[&[0.1, 0.9, 0.3], &[0.1, 0.2, 0.6], &[0.1, 0.2, 0.6]]);
        let blocks = cluster_blocks(&frames, 3, &PriorityTable::uniform());

        // sums: 0.3, 1.3, 1.5
        assert_eq!(blocks[0].dominant, Some(2));
        assert_eq!(blocks[0].peak, 0.6);
    }

    #[test]
    fn test_priority_weights_the_sum() {
        let frames = frames_from(&[&[0.0, 0.6, 0.5], &[0.0, 0.6, 0.5]]);
        let priorities = PriorityTable::uniform().with_weight(1, 0.5);
        let blocks = cluster_blocks(&frames, 2, &priorities);

        // 1.2 * 0.5 = 0.6 < 1.0
        assert_eq!(blocks[0].dominant, Some(2));
    }

    #[test]
    fn test_default_priorities_prefer_aa_over_ih() {
        let mut row = vec![0.0; 15];
        row[10] = 0.6; // aa, priority 1.0
        row[12] = 0.9; // ih, priority 0.5
        let frames = vec![VisemeFrame::new(0, row, 0.0)];

        let blocks = cluster_blocks(&frames, 6, &PriorityTable::default());
        assert_eq!(blocks[0].dominant, Some(10));
    }

    #[test]
    fn test_tie_goes_to_lowest_index() {
        let frames = frames_from(&[&[0.0, 0.4, 0.4], &[0.0, 0.4, 0.4]]);
        let blocks = cluster_blocks(&frames, 2, &PriorityTable::uniform());
        assert_eq!(blocks[0].dominant, Some(1));
    }

    #[test]
    fn test_zero_block_has_no_dominant() {
        let frames = frames_from(&[&[0.0, 0.0], &[0.0, 0.0]]);
        let blocks = cluster_blocks(&frames, 2, &PriorityTable::uniform());

        assert_eq!(blocks[0].dominant, None);
        assert_eq!(blocks[0].dominant_index(), -1);
        assert_eq!(blocks[0].peak, 0.0);
    }

    #[test]
    fn test_zero_priority_channel_cannot_win() {
        let frames = frames_from(&[&[0.9, 0.0]]);
        let priorities = PriorityTable::uniform().with_weight(0, 0.0);
        let blocks = cluster_blocks(&frames, 1, &priorities);
        assert_eq!(blocks[0].dominant, None);
    }

    #[test]
    fn test_peak_is_unweighted_max() {
        let frames = frames_from(&[&[0.2, 0.3], &[0.2, 0.7], &[0.2, 0.5]]);
        let priorities = PriorityTable::uniform().with_weight(1, 0.9);
        let blocks = cluster_blocks(&frames, 3, &priorities);

        assert_eq!(blocks[0].dominant, Some(1));
        assert_eq!(blocks[0].peak, 0.7);
    }

    #[test]
    fn test_empty_sequence_has_no_blocks() {
        let blocks = cluster_blocks(&[], 6, &PriorityTable::default());
        assert!(blocks.is_empty());
    }
}
