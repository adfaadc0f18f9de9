//! Error types for workout-web.
//!
//! Detectors themselves never fail: noisy frames resolve to "no transition".
//! Errors only come from the edges (configuration, frame decoding, summaries).

use thiserror::Error;

/// Errors raised outside the per-frame detection path.
#[derive(Debug, Error)]
pub enum WorkoutError {
    /// A configuration value is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Configuration text is not valid TOML for [`crate::DetectorConfig`].
    #[error("failed to parse configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Configuration could not be written back out as TOML.
    #[error("failed to serialize configuration: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    /// Configuration file could not be read or written.
    #[error("configuration file error: {0}")]
    Io(#[from] std::io::Error),

    /// Not a canonical activity identifier.
    #[error("unknown activity: {0}")]
    UnknownActivity(String),

    /// Flat landmark data has the wrong number of values.
    #[error("invalid landmark data length: {len} (expected 99 or 132)")]
    FrameLength {
        /// Number of values received.
        len: usize,
    },

    /// Session summary could not be encoded.
    #[error("failed to encode summary: {0}")]
    Summary(#[from] serde_json::Error),
}

impl WorkoutError {
    /// Creates an invalid configuration error.
    #[must_use]
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig(reason.into())
    }
}

/// Result type for workout-web operations.
pub type Result<T> = std::result::Result<T, WorkoutError>;
