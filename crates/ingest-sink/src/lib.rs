//! Transactional batch sinks.
//!
//! A stream opens exactly one [`Sink`] through a [`SinkFactory`], writes
//! records into the open transaction, commits batches, and closes the sink
//! when it stops. Every call may block and every call may fail.
//!
//! Provided implementations:
//!
//! - [`FileSink`] - appends each committed batch to a per-stream file
//!   (delimited text or JSON lines); uncommitted rows are dropped on close
//! - [`NullSink`] - accepts everything, for dry runs
//! - [`testing::RecordingSinkFactory`] - records every call and injects faults

pub mod error;
pub mod file;
pub mod null;
pub mod partition;
pub mod sink;
pub mod testing;

pub use error::SinkError;
pub use file::{FileSink, FileSinkFactory};
pub use null::{NullSink, NullSinkFactory};
pub use partition::PartitionDescriptor;
pub use sink::{Sink, SinkFactory};
