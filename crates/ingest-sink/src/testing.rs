//! Recording sink for tests.
//!
//! [`RecordingSinkFactory`] keeps an ordered event log per stream and can be
//! told to fail specific calls, which makes batch boundaries and failure
//! paths observable without a real ingestion target.

use crate::error::SinkError;
use crate::partition::PartitionDescriptor;
use crate::sink::{Sink, SinkFactory};
use culvert_core::Record;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// One call observed by a recording sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkEvent {
    Opened,
    /// A record with this row index was written
    Write(u64),
    /// A batch with this many rows was committed
    Commit(u64),
    Closed,
}

/// Calls that should fail for a stream.
#[derive(Debug, Clone, Default)]
pub struct Faults {
    pub fail_open: bool,
    /// Fail the n-th write (1-based)
    pub fail_write_at: Option<u64>,
    /// Fail the n-th commit (1-based)
    pub fail_commit_at: Option<u64>,
    pub fail_close: bool,
    /// Sleep inside every write
    pub write_delay: Option<Duration>,
}

#[derive(Debug, Default)]
struct Log {
    events: HashMap<String, Vec<SinkEvent>>,
    threads: HashMap<String, String>,
}

/// Factory whose sinks log every call into a shared log.
#[derive(Debug, Clone, Default)]
pub struct RecordingSinkFactory {
    log: Arc<Mutex<Log>>,
    faults: HashMap<String, Faults>,
}

impl RecordingSinkFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inject faults for one stream.
    pub fn with_faults(mut self, stream: impl Into<String>, faults: Faults) -> Self {
        self.faults.insert(stream.into(), faults);
        self
    }

    /// Every event recorded for `stream`, in call order.
    pub fn events(&self, stream: &str) -> Vec<SinkEvent> {
        self.log
            .lock()
            .events
            .get(stream)
            .cloned()
            .unwrap_or_default()
    }

    /// Row indices written by `stream`, in call order.
    pub fn writes(&self, stream: &str) -> Vec<u64> {
        self.events(stream)
            .into_iter()
            .filter_map(|event| match event {
                SinkEvent::Write(index) => Some(index),
                _ => None,
            })
            .collect()
    }

    /// Row counts of each committed batch for `stream`.
    pub fn commits(&self, stream: &str) -> Vec<u64> {
        self.events(stream)
            .into_iter()
            .filter_map(|event| match event {
                SinkEvent::Commit(rows) => Some(rows),
                _ => None,
            })
            .collect()
    }

    pub fn closed(&self, stream: &str) -> bool {
        self.events(stream).contains(&SinkEvent::Closed)
    }

    /// Name of the thread that opened the sink for `stream`.
    pub fn opened_on(&self, stream: &str) -> Option<String> {
        self.log.lock().threads.get(stream).cloned()
    }

    /// Streams that opened a sink.
    pub fn streams(&self) -> Vec<String> {
        let mut streams: Vec<_> = self.log.lock().events.keys().cloned().collect();
        streams.sort();
        streams
    }
}

impl SinkFactory for RecordingSinkFactory {
    fn open(&self, partition: &PartitionDescriptor) -> Result<Box<dyn Sink>, SinkError> {
        let stream = partition.stream.clone();
        let faults = self.faults.get(&stream).cloned().unwrap_or_default();

        {
            let mut log = self.log.lock();
            log.events.entry(stream.clone()).or_default();
            let thread_name = thread::current().name().unwrap_or("unnamed").to_string();
            log.threads.insert(stream.clone(), thread_name);
        }

        if faults.fail_open {
            return Err(rejected(&stream, "open"));
        }

        let sink = RecordingSink {
            stream,
            faults,
            log: self.log.clone(),
            writes: 0,
            commits: 0,
            pending_rows: 0,
            closed: false,
        };
        sink.push(SinkEvent::Opened);
        Ok(Box::new(sink))
    }
}

struct RecordingSink {
    stream: String,
    faults: Faults,
    log: Arc<Mutex<Log>>,
    writes: u64,
    commits: u64,
    pending_rows: u64,
    closed: bool,
}

impl RecordingSink {
    fn push(&self, event: SinkEvent) {
        self.log
            .lock()
            .events
            .entry(self.stream.clone())
            .or_default()
            .push(event);
    }
}

impl Sink for RecordingSink {
    fn write(&mut self, record: &Record) -> Result<(), SinkError> {
        if self.closed {
            return Err(SinkError::Closed(self.stream.clone()));
        }
        if let Some(delay) = self.faults.write_delay {
            thread::sleep(delay);
        }
        self.writes += 1;
        if self.faults.fail_write_at == Some(self.writes) {
            return Err(rejected(&self.stream, "write"));
        }
        self.pending_rows += 1;
        self.push(SinkEvent::Write(record.index));
        Ok(())
    }

    fn commit_batch(&mut self) -> Result<(), SinkError> {
        if self.closed {
            return Err(SinkError::Closed(self.stream.clone()));
        }
        self.commits += 1;
        if self.faults.fail_commit_at == Some(self.commits) {
            return Err(rejected(&self.stream, "commit"));
        }
        self.push(SinkEvent::Commit(self.pending_rows));
        self.pending_rows = 0;
        Ok(())
    }

    fn close(&mut self) -> Result<(), SinkError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.push(SinkEvent::Closed);
        if self.faults.fail_close {
            return Err(rejected(&self.stream, "close"));
        }
        Ok(())
    }
}

fn rejected(stream: &str, operation: &'static str) -> SinkError {
    SinkError::Rejected {
        stream: stream.to_string(),
        operation,
        reason: "injected fault".to_string(),
    }
}
