//! Default configuration constants for lipcook.
//!
//! Shared between the settings types, the decoder and the pipeline stages so
//! that the same numbers are used everywhere.

/// Viseme frames produced per second of audio.
///
/// Each frame covers 10 ms, which is the granularity the inference engine
/// is run at.
pub const FRAME_RATE_HZ: u32 = 100;

/// Duration of one viseme frame in milliseconds.
pub const FRAME_DURATION_MS: u32 = 1000 / FRAME_RATE_HZ;

/// Activation threshold shared by the hold filter, the consonant lock and
/// the tempo estimate.
pub const ACTIVATION_THRESHOLD: f32 = 0.5;

/// Default block size / smoothing window in frames.
pub const MAX_INTERPOLATION_FRAMES: u32 = 6;

/// Lower clamp bound for the interpolation window.
pub const INTERPOLATION_FRAMES_MIN: u32 = 1;

/// Upper clamp bound for the interpolation window.
///
/// Also the ceiling the tempo adaptation may grow the window to.
pub const INTERPOLATION_FRAMES_MAX: u32 = 24;

/// Default minimum run length (in frames) an activation must hold.
pub const MIN_HOLD_FRAMES: u32 = 2;

/// Block peaks at or below this are too small to normalise.
pub const MIN_NORMALIZE_PEAK: f32 = 0.0001;

/// Mean active frames per channel below which speech counts as fast.
pub const FAST_TEMPO_ACTIVE_FRAMES: f32 = 8.0;

/// Mean active frames per channel above which speech counts as slow.
pub const SLOW_TEMPO_ACTIVE_FRAMES: f32 = 20.0;

/// Size of the canonical RIFF/WAVE header in bytes.
///
/// Buffers no longer than this cannot hold any sample data.
pub const WAV_HEADER_BYTES: usize = 44;

/// Sample rate assumed when the WAV header cannot be parsed.
pub const FALLBACK_SAMPLE_RATE: u32 = 44100;

/// Channel count assumed when the WAV header cannot be parsed.
pub const FALLBACK_CHANNELS: u16 = 2;

/// Bit depth assumed when the WAV header cannot be parsed.
pub const FALLBACK_BITS_PER_SAMPLE: u16 = 16;

/// Default number of inference workers. One means strictly sequential.
pub const INFERENCE_PARALLELISM: usize = 1;
