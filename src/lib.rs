//! lipcook - viseme post-processing for lip-sync animation
//!
//! Turns per-10 ms viseme probabilities from an inference engine into a
//! stable, animation-ready frame sequence: short blips are dropped, one
//! dominant viseme is elected per block, blocks are normalised and blended
//! into their neighbours, and the result is smoothed over time.

// Enforce error handling discipline
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::let_underscore_must_use)]

pub mod audio;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod defaults;
pub mod error;
pub mod inference;
pub mod output;
pub mod pipeline;
pub mod viseme;

// Core seam (audio → inference → post-processing)
pub use audio::{PcmBuffer, WavOptions, decode_wav, load_wav_file};
pub use inference::{InferenceEngine, RawInference, ReplayEngine, ScriptedEngine};

// Pipeline
pub use pipeline::{CookHandle, FrameSequence, Pipeline, VisemeFrame};

// Error handling
pub use error::{LipcookError, Result};

// Config
pub use config::{Config, ConsonantPolicy, InterpolationSettings};
pub use viseme::{PriorityTable, VisemeCategory};

/// Build version string with optional git commit hash.
///
/// Returns `"0.1.0+abc1234"` when git hash is available, `"0.1.0"` otherwise.
pub fn version_string() -> String {
    let version = env!("CARGO_PKG_VERSION");
    match option_env!("GIT_HASH") {
        Some(hash) if !hash.is_empty() => format!("{}+{}", version, hash),
        _ => version.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_string_starts_with_cargo_version() {
        let ver = version_string();
        assert!(
            ver.starts_with(env!("CARGO_PKG_VERSION")),
            "version_string should start with CARGO_PKG_VERSION, got: {}",
            ver
        );
    }

    #[test]
    fn version_string_contains_plus_when_git_hash_present() {
        let ver = version_string();
        if option_env!("GIT_HASH").is_some_and(|h| !h.is_empty()) {
            assert!(
                ver.contains('+'),
                "With GIT_HASH set, version should contain '+', got: {}",
                ver
            );
        } else {
            assert_eq!(ver, env!("CARGO_PKG_VERSION"));
        }
    }
}
