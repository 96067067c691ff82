use crate::audio::WavOptions;
use crate::defaults;
use crate::error::{LipcookError, Result};
use crate::viseme::PriorityTable;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub interpolation: InterpolationSettings,
    pub wav: WavOptions,
    pub inference: InferenceConfig,
    /// Dominance priority overrides keyed by viseme name (e.g. `ih = 0.8`).
    pub priorities: BTreeMap<String, f32>,
}

/// How consonant channels are treated while smoothing.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ConsonantPolicy {
    /// Scale the smoothed value by `1 / raw` when the raw activation is above
    /// the threshold, restoring the consonant's full strength.
    #[default]
    Rescale,
    /// Keep the raw value: consonants are never smoothed.
    Bypass,
}

/// Post-processing settings for a cook run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct InterpolationSettings {
    /// Run the temporal smoother.
    pub enable_interpolation: bool,
    /// Block size for clustering and smoothing window, clamped to `[1, 24]`.
    pub max_interpolation_frames: u32,
    /// Protect consonant channels from being blurred by the smoother.
    pub strict_consonant_lock: bool,
    /// Which consonant protection to apply when the lock is on.
    pub consonant_policy: ConsonantPolicy,
    /// Activations shorter than this many frames are discarded.
    pub min_hold_frames: u32,
    /// Run dominant-viseme clustering and block normalisation.
    pub enable_clustering: bool,
    /// Resize the smoothing window from the estimated speech tempo.
    pub tempo_adaptive: bool,
}

impl Default for InterpolationSettings {
    fn default() -> Self {
        Self {
            enable_interpolation: true,
            max_interpolation_frames: defaults::MAX_INTERPOLATION_FRAMES,
            strict_consonant_lock: true,
            consonant_policy: ConsonantPolicy::default(),
            min_hold_frames: defaults::MIN_HOLD_FRAMES,
            enable_clustering: true,
            tempo_adaptive: false,
        }
    }
}

impl InterpolationSettings {
    /// Block size / smoothing window after clamping.
    pub fn window(&self) -> usize {
        self.max_interpolation_frames.clamp(
            defaults::INTERPOLATION_FRAMES_MIN,
            defaults::INTERPOLATION_FRAMES_MAX,
        ) as usize
    }

    /// Minimum hold in frames, never below one.
    pub fn min_hold(&self) -> usize {
        self.min_hold_frames.max(1) as usize
    }

    /// Consonant policy in effect, `None` when the lock is off.
    pub fn consonant_lock(&self) -> Option<ConsonantPolicy> {
        self.strict_consonant_lock.then_some(self.consonant_policy)
    }
}

/// Inference collaborator configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct InferenceConfig {
    /// Worker threads for engines that accept concurrent calls.
    pub parallelism: usize,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            parallelism: defaults::INFERENCE_PARALLELISM,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Invalid TOML is a `Config` error, an unreadable file an `Io` error.
    /// Missing fields will use default values.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from a file or return defaults if file doesn't exist
    ///
    /// Only a missing file falls back to defaults; invalid TOML is an error.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        match Self::load(path) {
            Err(LipcookError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                Ok(Self::default())
            }
            other => other,
        }
    }

    /// Apply environment variable overrides
    ///
    /// Supported environment variables:
    /// - LIPCOOK_MAX_INTERPOLATION_FRAMES → interpolation.max_interpolation_frames
    /// - LIPCOOK_MIN_HOLD_FRAMES → interpolation.min_hold_frames
    /// - LIPCOOK_STRICT_HEADER → wav.strict_header
    ///
    /// Unparseable values are ignored.
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(frames) = env_parse::<u32>("LIPCOOK_MAX_INTERPOLATION_FRAMES") {
            self.interpolation.max_interpolation_frames = frames;
        }

        if let Some(frames) = env_parse::<u32>("LIPCOOK_MIN_HOLD_FRAMES") {
            self.interpolation.min_hold_frames = frames;
        }

        if let Some(strict) = env_parse::<bool>("LIPCOOK_STRICT_HEADER") {
            self.wav.strict_header = strict;
        }

        self
    }

    /// Check values that cannot be clamped into range.
    pub fn validate(&self) -> Result<()> {
        if self.interpolation.min_hold_frames == 0 {
            return Err(LipcookError::ConfigInvalidValue {
                key: "interpolation.min_hold_frames".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if self.inference.parallelism == 0 {
            return Err(LipcookError::ConfigInvalidValue {
                key: "inference.parallelism".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        self.priority_table().map(|_| ())
    }

    /// Default priorities with the configured overrides applied.
    pub fn priority_table(&self) -> Result<PriorityTable> {
        PriorityTable::default().with_overrides(&self.priorities)
    }

    /// Get the default configuration file path
    ///
    /// Returns ~/.config/lipcook/config.toml on Linux, `None` when the
    /// platform has no config directory.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("lipcook").join("config.toml"))
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key)
        .ok()
        .filter(|v| !v.is_empty())
        .and_then(|v| v.trim().parse().ok())
}
