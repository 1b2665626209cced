//! Sink that discards everything.

use crate::error::SinkError;
use crate::partition::PartitionDescriptor;
use crate::sink::{Sink, SinkFactory};
use culvert_core::Record;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, Default)]
pub struct NullSinkFactory;

impl SinkFactory for NullSinkFactory {
    fn open(&self, partition: &PartitionDescriptor) -> Result<Box<dyn Sink>, SinkError> {
        info!("[DRY-RUN] Opened null sink for {}", partition);
        Ok(Box::new(NullSink::new(&partition.stream)))
    }
}

/// Counts rows and commits without storing anything.
#[derive(Debug, Default)]
pub struct NullSink {
    stream: String,
    pending_rows: u64,
    committed_rows: u64,
    commits: u64,
}

impl NullSink {
    pub fn new(stream: &str) -> Self {
        Self {
            stream: stream.to_string(),
            ..Self::default()
        }
    }

    pub fn committed_rows(&self) -> u64 {
        self.committed_rows
    }

    pub fn commits(&self) -> u64 {
        self.commits
    }
}

impl Sink for NullSink {
    fn write(&mut self, _record: &Record) -> Result<(), SinkError> {
        self.pending_rows += 1;
        Ok(())
    }

    fn commit_batch(&mut self) -> Result<(), SinkError> {
        self.committed_rows += self.pending_rows;
        self.commits += 1;
        debug!(
            "[DRY-RUN] '{}' would commit {} rows",
            self.stream, self.pending_rows
        );
        self.pending_rows = 0;
        Ok(())
    }

    fn close(&mut self) -> Result<(), SinkError> {
        info!(
            "[DRY-RUN] Closed null sink for '{}': {} rows in {} commits",
            self.stream, self.committed_rows, self.commits
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_sink_counts() {
        let mut sink = NullSink::new("s");
        for i in 0..5 {
            sink.write(&Record::new(i, Vec::new())).unwrap();
        }
        sink.commit_batch().unwrap();
        sink.write(&Record::new(5, Vec::new())).unwrap();
        sink.close().unwrap();

        assert_eq!(sink.committed_rows(), 5);
        assert_eq!(sink.commits(), 1);
    }
}
