//! Error types for sinks.

use thiserror::Error;

/// Errors reported by a sink.
#[derive(Error, Debug)]
pub enum SinkError {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Delimited encoding error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization error.
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// The sink was used after `close`.
    #[error("Sink for '{0}' is closed")]
    Closed(String),

    /// The target refused the operation.
    #[error("{operation} rejected for '{stream}': {reason}")]
    Rejected {
        stream: String,
        operation: &'static str,
        reason: String,
    },
}
