//! Error types for lipcook.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LipcookError {
    // Input errors
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("Malformed WAV header: {message}")]
    MalformedHeader { message: String },

    #[error("Invalid audio format: {message}")]
    InvalidAudioFormat { message: String },

    // Inference errors
    #[error("Inference failed on chunk {chunk}: {message}")]
    InferenceFailure { chunk: usize, message: String },

    // Run control
    #[error("Cook run was cancelled")]
    Cancelled,

    #[error("Cook worker panicked: {message}")]
    WorkerPanicked { message: String },

    // Configuration errors
    #[error("Invalid configuration value for {key}: {message}")]
    ConfigInvalidValue { key: String, message: String },

    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    // Serialization
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // General I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl LipcookError {
    /// Whether the pipeline may carry on after this error.
    ///
    /// Only a malformed header is recoverable, and only when the decoder is
    /// allowed to fall back to default parameters.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, LipcookError::MalformedHeader { .. })
    }
}

// Type alias for convenience
pub type Result<T> = std::result::Result<T, LipcookError>;
