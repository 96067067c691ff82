//! Final stage: collects processed frames into an immutable sequence.

use crate::pipeline::types::{FrameSequence, VisemeFrame};

#[derive(Debug, Default)]
pub struct SequenceAssembler {
    frames: Vec<VisemeFrame>,
}

impl SequenceAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            frames: Vec::with_capacity(capacity),
        }
    }

    /// Append the next frame. Frames must arrive in order.
    pub fn push(&mut self, frame: VisemeFrame) {
        debug_assert!(
            self.frames.last().is_none_or(|last| last.index < frame.index),
            "frames pushed out of order"
        );
        self.frames.push(frame);
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Consume the assembler, sealing the sequence.
    pub fn seal(self) -> FrameSequence {
        FrameSequence::from_frames(self.frames)
    }
}

impl Extend<VisemeFrame> for SequenceAssembler {
    fn extend<I: IntoIterator<Item = VisemeFrame>>(&mut self, iter: I) {
        for frame in iter {
            self.push(frame);
        }
    }
}
