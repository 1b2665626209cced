//! Core types for culvert.
//!
//! This crate provides the foundational types shared by every other crate in
//! the workspace:
//!
//! - [`Value`], [`Field`] and [`Record`] - the typed row model written to sinks
//! - [`ColumnType`] and [`ColumnDefinition`] - the column vocabulary used in
//!   configuration files
//! - [`RunConfig`] and [`StreamDefinition`] - YAML run configuration
//! - [`parse_duration`] - human friendly duration strings
//!
//! # Architecture
//!
//! ```text
//! culvert-core (this crate)
//!    │
//!    ├─── row-generator   (turns column definitions into values)
//!    ├─── ingest-sink     (writes records into transactional sinks)
//!    └─── stream-engine   (paces, batches and orchestrates streams)
//! ```
//!
//! # Example
//!
//! ```rust
//! use culvert_core::RunConfig;
//!
//! let config = RunConfig::from_yaml(r#"
//! streams:
//!   - name: stream-1
//!     commit_after_rows: 100
//!     events_per_second: 1000
//!     timeout: 10s
//! "#).unwrap();
//!
//! assert_eq!(config.streams.len(), 1);
//! ```

pub mod column;
pub mod config;
pub mod duration;
pub mod error;
pub mod values;

pub use column::{default_columns, ColumnDefinition, ColumnType};
pub use config::{RecordFormat, RunConfig, SinkConfig, StreamDefinition};
pub use duration::parse_duration;
pub use error::ConfigError;
pub use values::{Field, Record, Value};
