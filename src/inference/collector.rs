//! Runs the inference engine over every chunk and gathers raw frames.

use crate::audio::{AudioChunk, ChunkSegmenter};
use crate::defaults::INFERENCE_PARALLELISM;
use crate::error::{LipcookError, Result};
use crate::inference::engine::{InferenceEngine, RawInference};
use crate::pipeline::types::VisemeFrame;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

/// Collects one raw [`VisemeFrame`] per chunk, in chunk order.
///
/// No frame is ever dropped. With `parallelism > 1` and an engine that
/// supports concurrent calls, contiguous runs of chunks are inferred on
/// scoped threads and stitched back together in order.
#[derive(Debug, Clone)]
pub struct FrameCollector {
    parallelism: usize,
    cancel: Option<Arc<AtomicBool>>,
}

impl FrameCollector {
    pub fn new() -> Self {
        Self {
            parallelism: INFERENCE_PARALLELISM,
            cancel: None,
        }
    }

    /// Number of worker threads to use when the engine allows it.
    pub fn with_parallelism(mut self, parallelism: usize) -> Self {
        self.parallelism = parallelism.max(1);
        self
    }

    /// Flag checked between chunks; once set the run stops with `Cancelled`.
    pub fn with_cancel_flag(mut self, cancel: Arc<AtomicBool>) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// Infer every chunk of the segmented buffer.
    pub fn collect(
        &self,
        segmenter: &ChunkSegmenter<'_>,
        engine: &dyn InferenceEngine,
    ) -> Result<Vec<VisemeFrame>> {
        let total = segmenter.chunk_count();
        let workers = if engine.supports_concurrency() {
            self.parallelism.min(total).max(1)
        } else {
            1
        };

        tracing::debug!(
            engine = engine.name(),
            chunks = total,
            workers,
            "collecting raw viseme frames"
        );

        if workers == 1 {
            return self.collect_run(segmenter.chunks(), engine);
        }

        let chunks: Vec<AudioChunk<'_>> = segmenter.chunks().collect();
        let run_len = total.div_ceil(workers);

        let runs: Vec<Result<Vec<VisemeFrame>>> = thread::scope(|scope| {
            let handles: Vec<_> = chunks
                .chunks(run_len)
                .map(|run| scope.spawn(move || self.collect_run(run.iter().copied(), engine)))
                .collect();

            handles
                .into_iter()
                .map(|h| {
                    h.join().unwrap_or_else(|_| {
                        Err(LipcookError::WorkerPanicked {
                            message: "inference thread panicked".to_string(),
                        })
                    })
                })
                .collect()
        });

        // Runs are in chunk order, so the first error is the earliest chunk's.
        let mut frames = Vec::with_capacity(total);
        for run in runs {
            frames.extend(run?);
        }
        Ok(frames)
    }

    fn collect_run<'a>(
        &self,
        chunks: impl Iterator<Item = AudioChunk<'a>>,
        engine: &dyn InferenceEngine,
    ) -> Result<Vec<VisemeFrame>> {
        let mut frames = Vec::with_capacity(chunks.size_hint().0);
        for chunk in chunks {
            if self.is_cancelled() {
                return Err(LipcookError::Cancelled);
            }
            let raw = engine.infer(&chunk)?;
            frames.push(to_frame(chunk.index, raw, engine.viseme_count())?);
        }
        Ok(frames)
    }

    fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::SeqCst))
    }
}

impl Default for FrameCollector {
    fn default() -> Self {
        Self::new()
    }
}

/// Validate the vector length and clamp every value into `[0, 1]`.
fn to_frame(index: usize, raw: RawInference, expected: usize) -> Result<VisemeFrame> {
    if raw.visemes.len() != expected {
        return Err(LipcookError::InferenceFailure {
            chunk: index,
            message: format!(
                "engine returned {} viseme(s), expected {}",
                raw.visemes.len(),
                expected
            ),
        });
    }

    let weights = raw.visemes.into_iter().map(unit_clamp).collect();
    Ok(VisemeFrame::new(index, weights, unit_clamp(raw.laughter)))
}

fn unit_clamp(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::PcmBuffer;
    use crate::inference::engine::ScriptedEngine;
    use crate::inference::replay::{RecordedFrame, RecordedInference, ReplayEngine};

    /// 0.5 s of mono 16 kHz audio: 50 chunks.
    fn half_second() -> PcmBuffer {
        PcmBuffer::mono(vec![0; 8000], 16000)
    }

    #[test]
    fn test_one_frame_per_chunk_in_order() {
        let buffer = half_second();
        let segmenter = ChunkSegmenter::new(&buffer).unwrap();
        let engine = ScriptedEngine::new().with_activation(5..10, 3, 0.8);

        let frames = FrameCollector::new().collect(&segmenter, &engine).unwrap();

        assert_eq!(frames.len(), 50);
        assert_eq!(engine.calls(), 50);
        for (i, frame) in frames.iter().enumerate() {
            assert_eq!(frame.index, i);
            let expected = if (5..10).contains(&i) { 0.8 } else { 0.0 };
            assert_eq!(frame.weight(3), expected);
        }
    }

    #[test]
    fn test_parallel_collection_preserves_order() {
        let buffer = half_second();
        let segmenter = ChunkSegmenter::new(&buffer).unwrap();
        let engine = ScriptedEngine::new()
            .with_activation(0..50, 10, 0.2)
            .with_activation(17..33, 10, 0.9)
            .with_concurrency();

        let sequential = FrameCollector::new().collect(&segmenter, &engine).unwrap();
        let parallel = FrameCollector::new()
            .with_parallelism(4)
            .collect(&segmenter, &engine)
            .unwrap();

        assert_eq!(parallel, sequential);
        assert!(parallel.iter().enumerate().all(|(i, f)| f.index == i));
    }

    #[test]
    fn test_engine_without_concurrency_runs_sequentially() {
        let buffer = half_second();
        let segmenter = ChunkSegmenter::new(&buffer).unwrap();
        let engine = ScriptedEngine::new();

        let frames = FrameCollector::new()
            .with_parallelism(8)
            .collect(&segmenter, &engine)
            .unwrap();
        assert_eq!(frames.len(), 50);
    }

    #[test]
    fn test_engine_failure_aborts_collection() {
        let buffer = half_second();
        let segmenter = ChunkSegmenter::new(&buffer).unwrap();
        let engine = ScriptedEngine::new().with_failure_at(12);

        let result = FrameCollector::new().collect(&segmenter, &engine);
        assert!(matches!(
            result,
            Err(LipcookError::InferenceFailure { chunk: 12, .. })
        ));
        // Stops at the failing chunk.
        assert_eq!(engine.calls(), 13);
    }

    #[test]
    fn test_parallel_failure_reports_earliest_chunk() {
        let buffer = half_second();
        let segmenter = ChunkSegmenter::new(&buffer).unwrap();
        let engine = ScriptedEngine::new()
            .with_failure_at(40)
            .with_failure_at(3)
            .with_concurrency();

        let result = FrameCollector::new()
            .with_parallelism(4)
            .collect(&segmenter, &engine);
        assert!(matches!(
            result,
            Err(LipcookError::InferenceFailure { chunk: 3, .. })
        ));
    }

    #[test]
    fn test_wrong_vector_length_is_inference_failure() {
        let buffer = half_second();
        let segmenter = ChunkSegmenter::new(&buffer).unwrap();
        let engine = ReplayEngine::new(RecordedInference {
            viseme_count: 15,
            frames: vec![
                RecordedFrame {
                    visemes: vec![0.0; 14],
                    laughter: 0.0,
                };
                50
            ],
        });

        let result = FrameCollector::new().collect(&segmenter, &engine);
        match result {
            Err(LipcookError::InferenceFailure { chunk, message }) => {
                assert_eq!(chunk, 0);
                assert!(message.contains("expected 15"));
            }
            other => panic!("Expected InferenceFailure, got {:?}", other),
        }
    }

    #[test]
    fn test_values_are_clamped_into_unit_range() {
        let buffer = PcmBuffer::mono(vec![0; 160], 16000);
        let segmenter = ChunkSegmenter::new(&buffer).unwrap();
        let engine = ReplayEngine::new(RecordedInference {
            viseme_count: 3,
            frames: vec![RecordedFrame {
                visemes: vec![-0.5, 1.5, f32::NAN],
                laughter: 2.0,
            }],
        });

        let frames = FrameCollector::new().collect(&segmenter, &engine).unwrap();
        assert_eq!(frames[0].weights, vec![0.0, 1.0, 0.0]);
        assert_eq!(frames[0].laughter, 1.0);
    }

    #[test]
    fn test_cancel_flag_stops_collection() {
        let buffer = half_second();
        let segmenter = ChunkSegmenter::new(&buffer).unwrap();
        let engine = ScriptedEngine::new();
        let cancel = Arc::new(AtomicBool::new(true));

        let result = FrameCollector::new()
            .with_cancel_flag(cancel)
            .collect(&segmenter, &engine);
        assert!(matches!(result, Err(LipcookError::Cancelled)));
        assert_eq!(engine.calls(), 0);
    }

    #[test]
    fn test_empty_buffer_yields_no_frames() {
        let buffer = PcmBuffer::mono(Vec::new(), 16000);
        let segmenter = ChunkSegmenter::new(&buffer).unwrap();
        let engine = ScriptedEngine::new().with_concurrency();

        let frames = FrameCollector::new()
            .with_parallelism(4)
            .collect(&segmenter, &engine)
            .unwrap();
        assert!(frames.is_empty());
    }
}
