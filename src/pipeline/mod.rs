//! Viseme post-processing pipeline.
//!
//! Raw per-chunk inference frames pass through a fixed chain of stages:
//! short-activation filter, dominant-viseme clustering, block
//! normalisation/blending and temporal smoothing, before being sealed into
//! a [`FrameSequence`]. Each stage is a plain function or small struct over
//! `&mut [VisemeFrame]`; [`Pipeline`] composes them.

pub mod assembler;
pub mod blend;
pub mod cluster;
pub mod hold_filter;
pub mod orchestrator;
pub mod smoother;
pub mod tempo;
pub mod types;

pub use assembler::SequenceAssembler;
pub use blend::normalize_blocks;
pub use cluster::{Block, cluster_blocks};
pub use hold_filter::{activation_runs, filter_short_activations};
pub use orchestrator::{CookHandle, Pipeline};
pub use smoother::{TemporalSmoother, lag_weight, smooth_sequence};
pub use tempo::{TempoEstimate, adapt_window, estimate_tempo};
pub use types::{FrameSequence, VisemeFrame};
