//! Configuration error type.

use thiserror::Error;

/// Errors raised while loading or validating a run configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Error reading the configuration file
    #[error("Failed to read configuration file: {0}")]
    Io(#[from] std::io::Error),

    /// Error parsing YAML
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Duration string could not be parsed
    #[error("Invalid duration '{value}': {reason}")]
    InvalidDuration { value: String, reason: String },

    /// The run declares no streams
    #[error("At least one stream must be configured")]
    NoStreams,

    /// Two streams share a name
    #[error("Duplicate stream name: {0}")]
    DuplicateStream(String),

    /// A stream setting is out of range
    #[error("Stream '{stream}': {reason}")]
    InvalidStream { stream: String, reason: String },

    /// A column definition is invalid
    #[error("Column '{column}': {reason}")]
    InvalidColumn { column: String, reason: String },

    /// A run-level setting is out of range
    #[error("Invalid setting '{setting}': {reason}")]
    InvalidSetting { setting: String, reason: String },
}
