//! Sink traits.

use crate::error::SinkError;
use crate::partition::PartitionDescriptor;
use culvert_core::Record;

/// An open, exclusively owned connection to the ingestion target.
///
/// Calls are blocking and are never interrupted midway.
pub trait Sink: Send {
    /// Add a record to the open transaction batch.
    fn write(&mut self, record: &Record) -> Result<(), SinkError>;

    /// Make every record written since the last commit durable.
    fn commit_batch(&mut self) -> Result<(), SinkError>;

    /// Release the connection. Uncommitted records are discarded.
    fn close(&mut self) -> Result<(), SinkError>;
}

/// Opens one sink per stream.
pub trait SinkFactory: Send + Sync {
    fn open(&self, partition: &PartitionDescriptor) -> Result<Box<dyn Sink>, SinkError>;
}
