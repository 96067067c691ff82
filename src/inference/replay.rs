//! Replays inference output recorded from an external engine run.
//!
//! The viseme engine itself lives outside this crate. Its per-chunk output
//! can be captured once as JSON and replayed here, which lets the CLI cook
//! audio without linking the engine:
//!
//! ```json
//! { "viseme_count": 15, "frames": [ { "visemes": [0.0, ...], "laughter": 0.0 } ] }
//! ```

use crate::audio::AudioChunk;
use crate::error::{LipcookError, Result};
use crate::inference::engine::{InferenceEngine, RawInference};
use crate::viseme::VISEME_COUNT;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One recorded engine result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordedFrame {
    pub visemes: Vec<f32>,
    #[serde(default)]
    pub laughter: f32,
}

/// A whole recorded engine run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordedInference {
    #[serde(default = "default_viseme_count")]
    pub viseme_count: usize,
    pub frames: Vec<RecordedFrame>,
}

fn default_viseme_count() -> usize {
    VISEME_COUNT
}

/// Engine that answers chunk `i` with recorded frame `i`.
#[derive(Debug, Clone)]
pub struct ReplayEngine {
    recording: RecordedInference,
    name: String,
}

impl ReplayEngine {
    /// Wrap an in-memory recording.
    pub fn new(recording: RecordedInference) -> Self {
        Self {
            recording,
            name: "replay".to_string(),
        }
    }

    /// Parse a recording from JSON text.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let recording: RecordedInference = serde_json::from_str(json)?;
        Ok(Self::new(recording))
    }

    /// Load a recording from a JSON file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let mut engine = Self::from_json_str(&contents)?;
        if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
            engine.name = format!("replay:{}", stem);
        }
        tracing::debug!(
            path = %path.display(),
            frames = engine.recording.frames.len(),
            "loaded recorded inference"
        );
        Ok(engine)
    }

    /// Number of recorded frames.
    pub fn len(&self) -> usize {
        self.recording.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recording.frames.is_empty()
    }
}

impl InferenceEngine for ReplayEngine {
    fn infer(&self, chunk: &AudioChunk<'_>) -> Result<RawInference> {
        let frame = self.recording.frames.get(chunk.index).ok_or_else(|| {
            LipcookError::InferenceFailure {
                chunk: chunk.index,
                message: format!(
                    "recording holds only {} frame(s)",
                    self.recording.frames.len()
                ),
            }
        })?;

        Ok(RawInference {
            visemes: frame.visemes.clone(),
            laughter: frame.laughter,
        })
    }

    fn viseme_count(&self) -> usize {
        self.recording.viseme_count
    }

    fn supports_concurrency(&self) -> bool {
        true
    }

    fn name(&self) -> &str {
        &self.name
    }
}
