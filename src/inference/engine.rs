//! The inference engine seam and a scripted engine for tests and benches.

use crate::audio::AudioChunk;
use crate::error::{LipcookError, Result};
use crate::viseme::VISEME_COUNT;
use std::collections::BTreeSet;
use std::ops::Range;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Raw engine output for one chunk.
#[derive(Debug, Clone, PartialEq)]
pub struct RawInference {
    /// One probability per viseme channel.
    pub visemes: Vec<f32>,
    /// Laughter probability.
    pub laughter: f32,
}

/// Trait for viseme inference engines.
///
/// The engine is a black box: given a chunk of interleaved PCM it returns
/// one probability vector and a laughter score, or fails. There are no
/// retries; a failure aborts the cook run.
pub trait InferenceEngine: Send + Sync {
    /// Infer viseme probabilities for one chunk.
    fn infer(&self, chunk: &AudioChunk<'_>) -> Result<RawInference>;

    /// Length of the vectors this engine returns.
    fn viseme_count(&self) -> usize {
        VISEME_COUNT
    }

    /// Whether `infer` may be called from several threads at once.
    fn supports_concurrency(&self) -> bool {
        false
    }

    /// Name for logging/diagnostics.
    fn name(&self) -> &str;
}

/// Implement InferenceEngine for Arc<T> so one engine can serve many runs.
impl<T: InferenceEngine + ?Sized> InferenceEngine for Arc<T> {
    fn infer(&self, chunk: &AudioChunk<'_>) -> Result<RawInference> {
        (**self).infer(chunk)
    }

    fn viseme_count(&self) -> usize {
        (**self).viseme_count()
    }

    fn supports_concurrency(&self) -> bool {
        (**self).supports_concurrency()
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Deterministic engine for tests and benchmarks.
///
/// Output depends only on the chunk index, so repeated runs over the same
/// buffer produce identical frames.
#[derive(Debug)]
pub struct ScriptedEngine {
    viseme_count: usize,
    activations: Vec<(Range<usize>, usize, f32)>,
    laughter: Vec<(Range<usize>, f32)>,
    failures: BTreeSet<usize>,
    concurrent: bool,
    calls: AtomicUsize,
}

impl ScriptedEngine {
    /// Engine that returns all-zero frames.
    pub fn new() -> Self {
        Self::with_viseme_count(VISEME_COUNT)
    }

    /// Engine with a non-standard vector length.
    pub fn with_viseme_count(viseme_count: usize) -> Self {
        Self {
            viseme_count,
            activations: Vec::new(),
            laughter: Vec::new(),
            failures: BTreeSet::new(),
            concurrent: false,
            calls: AtomicUsize::new(0),
        }
    }

    /// Set `channel` to `weight` for every chunk in `chunks`.
    ///
    /// Later activations overwrite earlier ones on the same channel.
    pub fn with_activation(mut self, chunks: Range<usize>, channel: usize, weight: f32) -> Self {
        self.activations.push((chunks, channel, weight));
        self
    }

    /// Report `score` laughter for every chunk in `chunks`.
    pub fn with_laughter(mut self, chunks: Range<usize>, score: f32) -> Self {
        self.laughter.push((chunks, score));
        self
    }

    /// Fail when asked for chunk `index`.
    pub fn with_failure_at(mut self, index: usize) -> Self {
        self.failures.insert(index);
        self
    }

    /// Allow the collector to call this engine from several threads.
    pub fn with_concurrency(mut self) -> Self {
        self.concurrent = true;
        self
    }

    /// Number of `infer` calls made so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for ScriptedEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl InferenceEngine for ScriptedEngine {
    fn infer(&self, chunk: &AudioChunk<'_>) -> Result<RawInference> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if self.failures.contains(&chunk.index) {
            return Err(LipcookError::InferenceFailure {
                chunk: chunk.index,
                message: "scripted failure".to_string(),
            });
        }

        let mut visemes = vec![0.0; self.viseme_count];
        for (range, channel, weight) in &self.activations {
            if range.contains(&chunk.index)
                && let Some(slot) = visemes.get_mut(*channel)
            {
                *slot = *weight;
            }
        }

        let laughter = self
            .laughter
            .iter()
            .rev()
            .find(|(range, _)| range.contains(&chunk.index))
            .map_or(0.0, |(_, score)| *score);

        Ok(RawInference { visemes, laughter })
    }

    fn viseme_count(&self) -> usize {
        self.viseme_count
    }

    fn supports_concurrency(&self) -> bool {
        self.concurrent
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(index: usize) -> AudioChunk<'static> {
        AudioChunk {
            index,
            samples: &[],
            frames: 0,
            channels: 1,
        }
    }

    #[test]
    fn test_scripted_engine_defaults_to_silence() {
        let engine = ScriptedEngine::new();
        let out = engine.infer(&chunk(3)).unwrap();
        assert_eq!(out.visemes, vec![0.0; VISEME_COUNT]);
        assert_eq!(out.laughter, 0.0);
        assert_eq!(engine.name(), "scripted");
        assert!(!engine.supports_concurrency());
    }

    #[test]
    fn test_scripted_engine_applies_activation_range() {
        let engine = ScriptedEngine::new().with_activation(10..41, 10, 0.9);

        assert_eq!(engine.infer(&chunk(9)).unwrap().visemes[10], 0.0);
        assert_eq!(engine.infer(&chunk(10)).unwrap().visemes[10], 0.9);
        assert_eq!(engine.infer(&chunk(40)).unwrap().visemes[10], 0.9);
        assert_eq!(engine.infer(&chunk(41)).unwrap().visemes[10], 0.0);
        assert_eq!(engine.calls(), 4);
    }

    #[test]
    fn test_scripted_engine_ignores_out_of_range_channel() {
        let engine = ScriptedEngine::with_viseme_count(3).with_activation(0..5, 7, 1.0);
        assert_eq!(engine.infer(&chunk(0)).unwrap().visemes, vec![0.0; 3]);
    }

    #[test]
    fn test_scripted_engine_laughter() {
        let engine = ScriptedEngine::new().with_laughter(2..4, 0.75);
        assert_eq!(engine.infer(&chunk(1)).unwrap().laughter, 0.0);
        assert_eq!(engine.infer(&chunk(2)).unwrap().laughter, 0.75);
    }

    #[test]
    fn test_scripted_engine_failure() {
        let engine = ScriptedEngine::new().with_failure_at(5);
        match engine.infer(&chunk(5)) {
            Err(LipcookError::InferenceFailure { chunk, .. }) => assert_eq!(chunk, 5),
            other => panic!("Expected InferenceFailure, got {:?}", other),
        }
        assert!(engine.infer(&chunk(6)).is_ok());
    }

    #[test]
    fn test_engine_trait_is_object_safe() {
        let engine: Arc<dyn InferenceEngine> =
            Arc::new(ScriptedEngine::new().with_activation(0..1, 1, 0.5));
        assert_eq!(engine.viseme_count(), VISEME_COUNT);
        assert_eq!(engine.infer(&chunk(0)).unwrap().visemes[1], 0.5);
    }
}
