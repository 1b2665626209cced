//! culvert
//!
//! A concurrent, rate-paced load generator for streaming ingest targets.
//! Each configured stream synthesizes rows from shared lookup tables,
//! writes them to its own sink and commits every `commit_after_rows` rows,
//! paced to `events_per_second`, until its timeout expires.
//!
//! # Crates
//!
//! - `culvert_core` - record model, column types, YAML run configuration
//! - `row_generator` - lookup tables and per-stream row generation
//! - `ingest_sink` - sink traits with file, null and recording sinks
//! - `stream_engine` - stream engine, pacing, completion barrier, orchestrator
//!
//! # CLI Usage
//!
//! ```bash
//! # Built-in four stream run into ./culvert-data
//! culvert run
//!
//! # Run a configuration file for at most 30 seconds per stream
//! culvert run --config run.yaml --timeout 30s
//!
//! # Generate and pace without writing anything
//! culvert run --dry-run --streams 8 --events-per-second 50000
//!
//! # Print the built-in configuration as a starting point
//! culvert default-config > run.yaml
//! ```

pub mod cli;
pub mod run;
pub mod summary;

pub use cli::{OutputFormat, RunArgs};
pub use run::{run_orchestration, sink_factory};
pub use summary::format_summary;
