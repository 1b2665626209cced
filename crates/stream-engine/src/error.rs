//! Error types for the engine.

use culvert_core::ConfigError;
use row_generator::GeneratorError;
use thiserror::Error;

/// Errors raised while building or launching streams.
///
/// Sink failures are not here: they end the owning stream and are reported
/// through its [`StreamReport`](crate::StreamReport).
#[derive(Error, Debug)]
pub enum EngineError {
    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Invalid column set.
    #[error("Column error: {0}")]
    Generator(#[from] GeneratorError),

    /// Nothing to run.
    #[error("An orchestration needs at least one stream")]
    NoStreams,

    /// The completion barrier does not hold one slot per stream.
    #[error("Completion barrier holds {slots} slots for {streams} streams")]
    BarrierMismatch { slots: usize, streams: usize },

    /// The pool already runs as many tasks as it has workers.
    #[error("Worker pool is full ({capacity} workers), cannot launch '{task}'")]
    PoolFull { task: String, capacity: usize },

    /// The OS refused to start a worker thread.
    #[error("Failed to spawn worker for '{task}': {source}")]
    Spawn {
        task: String,
        #[source]
        source: std::io::Error,
    },
}
