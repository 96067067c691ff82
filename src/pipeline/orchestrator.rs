//! Cook pipeline: PcmBuffer → chunks → raw frames → post-processing → FrameSequence.

use crate::audio::{ChunkSegmenter, PcmBuffer};
use crate::config::{Config, InterpolationSettings};
use crate::defaults::INFERENCE_PARALLELISM;
use crate::error::{LipcookError, Result};
use crate::inference::{FrameCollector, InferenceEngine};
use crate::pipeline::assembler::SequenceAssembler;
use crate::pipeline::blend::normalize_blocks;
use crate::pipeline::cluster::cluster_blocks;
use crate::pipeline::hold_filter::filter_short_activations;
use crate::pipeline::smoother::TemporalSmoother;
use crate::pipeline::tempo::{adapt_window, estimate_tempo};
use crate::pipeline::types::{FrameSequence, VisemeFrame};
use crate::viseme::PriorityTable;
use crossbeam_channel::{Receiver, bounded};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Instant;

/// Handle to a cook run on a background thread.
///
/// The result is delivered exactly once: [`CookHandle::wait`] consumes the
/// handle. Dropping the handle without waiting detaches the worker.
pub struct CookHandle {
    /// Cooperative cancellation flag, checked between chunks
    cancel: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
    result_rx: Receiver<Result<FrameSequence>>,
}

impl CookHandle {
    /// Blocks until the run finishes and returns its result.
    ///
    /// A worker that died without reporting is surfaced as
    /// [`LipcookError::WorkerPanicked`].
    pub fn wait(mut self) -> Result<FrameSequence> {
        let received = self.result_rx.recv();
        let joined = self.thread.take().map(JoinHandle::join);

        match (received, joined) {
            (Ok(result), _) => result,
            (Err(_), Some(Err(panic_info))) => {
                let message = panic_info
                    .downcast_ref::<&str>()
                    .copied()
                    .or_else(|| panic_info.downcast_ref::<String>().map(|s| s.as_str()))
                    .unwrap_or("unknown panic")
                    .to_string();
                Err(LipcookError::WorkerPanicked { message })
            }
            (Err(_), _) => Err(LipcookError::WorkerPanicked {
                message: "worker exited without a result".to_string(),
            }),
        }
    }

    /// Waits and reports `(sequence, success)`, logging the failure if any.
    ///
    /// The sequence is present exactly when `success` is true.
    pub fn wait_reported(self) -> (Option<FrameSequence>, bool) {
        match self.wait() {
            Ok(sequence) => (Some(sequence), true),
            Err(e) => {
                tracing::error!(error = %e, "cook run failed");
                (None, false)
            }
        }
    }

    /// Returns true once the worker has produced its result.
    pub fn is_finished(&self) -> bool {
        !self.result_rx.is_empty() || self.thread.as_ref().is_none_or(JoinHandle::is_finished)
    }

    /// Ask the worker to stop before the next chunk.
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::SeqCst);
    }
}

/// Viseme post-processing pipeline.
///
/// Chunk Segmenter → Frame Collector → Hold Filter → Clusterer → Blender
/// → Smoother → Assembler. Clustering (with blending) and smoothing can be
/// switched off independently through [`InterpolationSettings`].
#[derive(Debug, Clone)]
pub struct Pipeline {
    settings: InterpolationSettings,
    priorities: PriorityTable,
    parallelism: usize,
}

impl Pipeline {
    /// Creates a pipeline with the default priority table.
    pub fn new(settings: InterpolationSettings) -> Self {
        Self {
            settings,
            priorities: PriorityTable::default(),
            parallelism: INFERENCE_PARALLELISM,
        }
    }

    /// Sets the dominance priority table.
    pub fn with_priorities(mut self, priorities: PriorityTable) -> Self {
        self.priorities = priorities;
        self
    }

    /// Sets the number of inference workers.
    pub fn with_parallelism(mut self, parallelism: usize) -> Self {
        self.parallelism = parallelism.max(1);
        self
    }

    /// Builds a pipeline from validated configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(config.interpolation.clone())
            .with_priorities(config.priority_table()?)
            .with_parallelism(config.inference.parallelism))
    }

    pub fn settings(&self) -> &InterpolationSettings {
        &self.settings
    }

    /// Cooks `buffer` on the calling thread.
    pub fn run(&self, buffer: &PcmBuffer, engine: &dyn InferenceEngine) -> Result<FrameSequence> {
        self.run_with_cancel(buffer, engine, None)
    }

    fn run_with_cancel(
        &self,
        buffer: &PcmBuffer,
        engine: &dyn InferenceEngine,
        cancel: Option<Arc<AtomicBool>>,
    ) -> Result<FrameSequence> {
        let started = Instant::now();
        let segmenter = ChunkSegmenter::new(buffer)?;

        let mut collector = FrameCollector::new().with_parallelism(self.parallelism);
        if let Some(flag) = cancel {
            collector = collector.with_cancel_flag(flag);
        }
        let raw = collector.collect(&segmenter, engine)?;

        let sequence = self.process(raw);
        tracing::info!(
            engine = engine.name(),
            frames = sequence.len(),
            duration_ms = sequence.duration_ms(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "cook run complete"
        );
        Ok(sequence)
    }

    /// Post-processes raw frames (hold filter through assembly).
    ///
    /// Deterministic: the same input always yields the same sequence.
    pub fn process(&self, mut frames: Vec<VisemeFrame>) -> FrameSequence {
        let removed = filter_short_activations(&mut frames, self.settings.min_hold());
        tracing::debug!(
            min_hold = self.settings.min_hold(),
            removed,
            "short activations filtered"
        );

        let block_size = self.settings.window();
        let window = self.smoothing_window(&frames);

        if self.settings.enable_clustering {
            let blocks = cluster_blocks(&frames, block_size, &self.priorities);
            normalize_blocks(&mut frames, &blocks, block_size);
            tracing::debug!(
                block_size,
                blocks = blocks.len(),
                undecided = blocks.iter().filter(|b| b.dominant.is_none()).count(),
                "blocks clustered and normalised"
            );
        }

        let mut assembler = SequenceAssembler::with_capacity(frames.len());
        if self.settings.enable_interpolation {
            let mut smoother = TemporalSmoother::new(window, self.settings.consonant_lock());
            assembler.extend(frames.into_iter().map(|f| smoother.smooth(f)));
            tracing::debug!(
                window,
                consonant_lock = ?self.settings.consonant_lock(),
                "frames smoothed"
            );
        } else {
            assembler.extend(frames);
        }

        assembler.seal()
    }

    /// Smoothing window for `frames`: the configured window, resized to the
    /// speech tempo when tempo adaptation is on. Never above the configured
    /// window.
    fn smoothing_window(&self, frames: &[VisemeFrame]) -> usize {
        let configured = self.settings.window();
        if !(self.settings.enable_interpolation && self.settings.tempo_adaptive) {
            return configured;
        }
        match estimate_tempo(frames) {
            Some(tempo) => {
                let window = adapt_window(configured, configured, &tempo);
                tracing::debug!(
                    mean_active_frames = tempo.mean_active_frames,
                    active_channels = tempo.active_channels,
                    window,
                    "smoothing window adapted to tempo"
                );
                window
            }
            None => {
                tracing::debug!("no activations, tempo adaptation skipped");
                configured
            }
        }
    }

    /// Cooks `buffer` on a dedicated thread.
    pub fn spawn(self, buffer: Arc<PcmBuffer>, engine: Arc<dyn InferenceEngine>) -> CookHandle {
        let cancel = Arc::new(AtomicBool::new(false));
        let (result_tx, result_rx) = bounded(1);

        let worker_cancel = cancel.clone();
        let thread = thread::spawn(move || {
            let result = self.run_with_cancel(&buffer, engine.as_ref(), Some(worker_cancel));
            if let Err(e) = &result {
                tracing::debug!(error = %e, "cook worker finished with error");
            }
            if result_tx.send(result).is_err() {
                tracing::debug!("cook handle dropped before the result was delivered");
            }
        });

        CookHandle {
            cancel,
            thread: Some(thread),
            result_rx,
        }
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(InterpolationSettings::default())
    }
}
