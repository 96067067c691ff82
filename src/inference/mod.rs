//! Inference collaborators and raw frame collection.
//!
//! The viseme engine is external; this module defines the seam it plugs
//! into and the stage that drives it over a whole recording.

pub mod collector;
pub mod engine;
pub mod replay;

pub use collector::FrameCollector;
pub use engine::{InferenceEngine, RawInference, ScriptedEngine};
pub use replay::{RecordedFrame, RecordedInference, ReplayEngine};
