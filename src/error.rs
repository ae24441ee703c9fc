//! Error types for soulprint
//!
//! Centralized error handling using thiserror.

use thiserror::Error;

/// Main error type for capture sessions and device access
#[derive(Error, Debug)]
pub enum CaptureError {
    /// Device access denied or no compatible device present
    #[error("Permission denied: {0}")]
    Permission(String),

    /// Stream could not be attached to the analysis node
    #[error("Device error: {0}")]
    Device(String),

    #[error("A capture session is already active")]
    AlreadyCapturing,

    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Audio output error: {0}")]
    Output(String),
}

/// Configuration validation failure
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("{0}")]
    Invalid(String),
}

/// Transient per-tick analyzer failure.
///
/// Never leaves the analyzer: callers receive the neutral fallback instead.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExtractionError {
    #[error("no frame available")]
    NoFrame,

    #[error("empty frame ({width}x{height})")]
    EmptyFrame { width: u32, height: u32 },

    #[error("no frequency data")]
    NoData,
}

/// Result type alias for soulprint
pub type Result<T> = std::result::Result<T, CaptureError>;
