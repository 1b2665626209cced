//! Column value model for culvert.
//!
//! This crate turns column definitions into values. All state shared between
//! streams lives in one immutable [`GenerationContext`] that is built once
//! before any stream starts; each stream then owns a [`RowGenerator`] with its
//! own seeded random source.
//!
//! # Architecture
//!
//! ```text
//! ColumnDefinition (YAML)        GenerationContext (built once, Arc-shared)
//!        │                         - uuid / timestamp / ip / year / month tables
//!        ▼                         - StringSource
//!     Column ──────────┐                 │
//!                      ▼                 ▼
//!              ┌───────────────────────────────┐
//!              │ RowGenerator (one per stream) │
//!              │  - columns: Arc<[Column]>     │
//!              │  - rng (StdRng)               │
//!              │  - index                      │
//!              └───────────────┬───────────────┘
//!                              ▼
//!                     Record { index, fields }
//! ```
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use culvert_core::{ColumnDefinition, ColumnType};
//! use row_generator::{Column, GenerationContext, RowGenerator};
//!
//! let context = Arc::new(GenerationContext::build(1000, 42).unwrap());
//! let columns = Column::from_definitions(&[
//!     ColumnDefinition::new("year", ColumnType::IntYear),
//!     ColumnDefinition::with_dictionary("ad_type", ["banner", "modal"]),
//! ]).unwrap();
//!
//! let mut generator = RowGenerator::new(columns, context, 7);
//! let record = generator.next_record();
//! assert_eq!(record.index, 0);
//! assert_eq!(record.get("ad_type").and_then(|v| v.as_str()), Some("banner"));
//! ```
//!
//! # Value sources
//!
//! - `boolean`, `long`, `double` - drawn from the stream's random source
//! - `string_dict` - `dictionary[row % len]`, or a color name when no dictionary is set
//! - `string` - a full name from the [`StringSource`]
//! - `timestamp`, `string_ip_address`, `string_uuid_dict`, `int_year`, `int_month` -
//!   `table[row % table_size]`

pub mod column;
pub mod context;
pub mod error;
pub mod generator;
pub mod generators;

pub use column::Column;
pub use context::GenerationContext;
pub use error::GeneratorError;
pub use generator::{seed_for_stream, RowGenerator};
pub use generators::strings::{FakerStrings, StringSource};
