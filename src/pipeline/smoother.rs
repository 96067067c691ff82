//! Temporal smoothing over a short history of already-smoothed frames.
//!
//! Each output value is a weighted average of the current frame and the last
//! `window` outputs, with linearly decaying weights. Consonants are
//! optionally protected so plosives and fricatives keep their snap.

use crate::config::ConsonantPolicy;
use crate::defaults::ACTIVATION_THRESHOLD;
use crate::pipeline::types::VisemeFrame;
use crate::viseme::{self, VisemeCategory};
use std::collections::VecDeque;

/// Weight of the history frame `lag` steps back (1-indexed).
pub fn lag_weight(lag: usize, window: usize) -> f32 {
    1.0 - lag as f32 / (window as f32 + 1.0)
}

/// Stateful smoother fed one frame at a time, in order.
#[derive(Debug, Clone)]
pub struct TemporalSmoother {
    window: usize,
    lock: Option<ConsonantPolicy>,
    /// Most recent output first.
    history: VecDeque<Vec<f32>>,
}

impl TemporalSmoother {
    /// `window` is the number of past frames blended in, at least one.
    /// `lock` is `None` when consonants are smoothed like any other channel.
    pub fn new(window: usize, lock: Option<ConsonantPolicy>) -> Self {
        let window = window.max(1);
        Self {
            window,
            lock,
            history: VecDeque::with_capacity(window + 1),
        }
    }

    pub fn window(&self) -> usize {
        self.window
    }

    /// Smooth `frame` against the history and record the result.
    pub fn smooth(&mut self, frame: VisemeFrame) -> VisemeFrame {
        let VisemeFrame {
            index,
            weights: raw,
            laughter,
        } = frame;

        let weights = if self.history.is_empty() {
            raw
        } else {
            raw.iter()
                .enumerate()
                .map(|(channel, &current)| self.smooth_channel(channel, current))
                .collect()
        };

        self.history.push_front(weights.clone());
        self.history.truncate(self.window);

        VisemeFrame::new(index, weights, laughter)
    }

    fn smooth_channel(&self, channel: usize, current: f32) -> f32 {
        let mut total = current;
        let mut weight_sum = 1.0f32;
        for (j, past) in self.history.iter().enumerate() {
            let w = lag_weight(j + 1, self.window);
            total += past.get(channel).copied().unwrap_or(0.0) * w;
            weight_sum += w;
        }
        let smoothed = total / weight_sum;

        match (self.lock, viseme::category(channel)) {
            (Some(ConsonantPolicy::Bypass), VisemeCategory::Consonant) => current,
            (Some(ConsonantPolicy::Rescale), VisemeCategory::Consonant)
                if current > ACTIVATION_THRESHOLD =>
            {
                (smoothed * (1.0 / current)).clamp(0.0, 1.0)
            }
            _ => smoothed,
        }
    }
}

/// Smooth a whole sequence with a fresh smoother.
pub fn smooth_sequence(
    frames: Vec<VisemeFrame>,
    window: usize,
    lock: Option<ConsonantPolicy>,
) -> Vec<VisemeFrame> {
    let mut smoother = TemporalSmoother::new(window, lock);
    frames.into_iter().map(|f| smoother.smooth(f)).collect()
}
