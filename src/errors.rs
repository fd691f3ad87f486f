/*!
 * Error types for the cuesync library.
 *
 * Nothing on the signal path returns these errors. Parse errors are collected
 * as diagnostics for skipped blocks, and configuration errors surface only
 * when a host loads or validates its settings.
 */

use thiserror::Error;

/// Reasons a subtitle block is rejected by the parser
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SubtitleError {
    /// The block has no `start --> end` line
    #[error("Missing time range line in block: {0}")]
    MissingTimeRange(String),

    /// A timestamp could not be parsed
    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    /// The end of the interval is not after its start
    #[error("Invalid time range: end {end} <= start {start}")]
    InvalidTimeRange {
        /// Start time in seconds
        start: f64,
        /// End time in seconds
        end: f64,
    },

    /// The block has a time range but no text lines
    #[error("Empty subtitle text for cue {0}")]
    EmptyText(String),
}

/// Errors raised while validating the sync configuration
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// A required string setting is empty
    #[error("Configuration value '{0}' must not be empty")]
    EmptyValue(&'static str),

    /// A setting contains characters that cannot appear in it
    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue {
        /// Name of the offending field
        field: &'static str,
        /// Why the value was rejected
        reason: String,
    },
}

/// Top-level error type wrapping the others
#[derive(Error, Debug)]
pub enum SyncError {
    /// Error from subtitle parsing
    #[error("Subtitle error: {0}")]
    Subtitle(#[from] SubtitleError),

    /// Error from configuration validation
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Error reading a file
    #[error("File error: {0}")]
    File(String),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl From<anyhow::Error> for SyncError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for SyncError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
