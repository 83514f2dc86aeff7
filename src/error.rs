// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Error types for the detection engine.
//!
//! The decision functions themselves are total: missing keypoints, empty text and
//! degenerate geometry are modeled as absent values. Errors only arise while loading or
//! validating configuration, ingesting raw keypoint arrays, or reading replay input.

use thiserror::Error;

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;

/// Main error type for the engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Invalid configuration provided.
    #[error("Config error: {0}")]
    Config(String),
    /// Keypoint array with an unexpected shape or layout.
    #[error("Invalid keypoints: {0}")]
    InvalidKeypoints(String),
    /// Wrapped `std::io::Error`.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// Malformed YAML configuration.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    /// Malformed JSON input.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    /// The frame worker thread stopped unexpectedly.
    #[error("Worker error: {0}")]
    Worker(String),
}

impl EngineError {
    /// Shorthand for a [`EngineError::Config`] error.
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
