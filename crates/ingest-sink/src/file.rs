//! Transactional file sink.
//!
//! Rows written to a [`FileSink`] are encoded into an in-memory transaction
//! buffer. `commit_batch` appends the buffer to the stream's file and syncs
//! it, so the file only ever contains whole committed batches.

use crate::error::SinkError;
use crate::partition::PartitionDescriptor;
use crate::sink::{Sink, SinkFactory};
use culvert_core::{Record, RecordFormat};
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Initial capacity of the transaction buffer.
pub const DEFAULT_BUFFER_SIZE: usize = 8192;

/// Opens a [`FileSink`] per stream under a common output directory.
#[derive(Debug, Clone)]
pub struct FileSinkFactory {
    output_dir: PathBuf,
    format: RecordFormat,
    delimiter: u8,
}

impl FileSinkFactory {
    /// Create a factory writing delimited text with `,`.
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            format: RecordFormat::Csv,
            delimiter: b',',
        }
    }

    pub fn with_format(mut self, format: RecordFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// File that `partition` commits into.
    pub fn path_for(&self, partition: &PartitionDescriptor) -> PathBuf {
        self.output_dir
            .join(partition.relative_dir())
            .join(format!("{}.{}", partition.stream, self.format.extension()))
    }
}

impl SinkFactory for FileSinkFactory {
    fn open(&self, partition: &PartitionDescriptor) -> Result<Box<dyn Sink>, SinkError> {
        let path = self.path_for(partition);
        let sink = FileSink::open(&path, &partition.stream, self.format, self.delimiter)?;
        Ok(Box::new(sink))
    }
}

/// Append-only file whose contents advance one committed batch at a time.
#[derive(Debug)]
pub struct FileSink {
    stream: String,
    path: PathBuf,
    file: Option<File>,
    format: RecordFormat,
    delimiter: u8,
    pending: Vec<u8>,
    pending_rows: u64,
    committed_rows: u64,
    committed_batches: u64,
}

impl FileSink {
    /// Open (or create) `path` for appending, creating parent directories.
    pub fn open(
        path: &Path,
        stream: &str,
        format: RecordFormat,
        delimiter: u8,
    ) -> Result<Self, SinkError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;

        info!("Opened file sink for '{}' at '{}'", stream, path.display());

        Ok(Self {
            stream: stream.to_string(),
            path: path.to_path_buf(),
            file: Some(file),
            format,
            delimiter,
            pending: Vec::with_capacity(DEFAULT_BUFFER_SIZE),
            pending_rows: 0,
            committed_rows: 0,
            committed_batches: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Rows made durable so far.
    pub fn committed_rows(&self) -> u64 {
        self.committed_rows
    }

    /// Rows waiting in the open transaction.
    pub fn pending_rows(&self) -> u64 {
        self.pending_rows
    }

    fn encode(&mut self, record: &Record) -> Result<(), SinkError> {
        match self.format {
            RecordFormat::Csv => {
                if record.is_empty() {
                    self.pending.push(b'\n');
                    return Ok(());
                }
                let mut writer = csv::WriterBuilder::new()
                    .delimiter(self.delimiter)
                    .has_headers(false)
                    .from_writer(&mut self.pending);
                writer.write_record(record.values().map(|value| value.to_string()))?;
                writer.flush()?;
            }
            RecordFormat::Jsonl => {
                serde_json::to_writer(&mut self.pending, record)?;
                self.pending.push(b'\n');
            }
        }
        Ok(())
    }
}

impl Sink for FileSink {
    fn write(&mut self, record: &Record) -> Result<(), SinkError> {
        if self.file.is_none() {
            return Err(SinkError::Closed(self.stream.clone()));
        }
        self.encode(record)?;
        self.pending_rows += 1;
        Ok(())
    }

    fn commit_batch(&mut self) -> Result<(), SinkError> {
        let file = self
            .file
            .as_mut()
            .ok_or_else(|| SinkError::Closed(self.stream.clone()))?;

        file.write_all(&self.pending)?;
        file.sync_data()?;

        self.committed_rows += self.pending_rows;
        self.committed_batches += 1;
        debug!(
            "Committed batch {} for '{}': {} rows ({} total)",
            self.committed_batches, self.stream, self.pending_rows, self.committed_rows
        );

        self.pending.clear();
        self.pending_rows = 0;
        Ok(())
    }

    fn close(&mut self) -> Result<(), SinkError> {
        let Some(mut file) = self.file.take() else {
            return Ok(());
        };
        if self.pending_rows > 0 {
            warn!(
                "Discarding {} uncommitted rows for '{}'",
                self.pending_rows, self.stream
            );
            self.pending.clear();
            self.pending_rows = 0;
        }
        file.flush()?;
        info!(
            "Closed file sink for '{}': {} rows in {} batches",
            self.stream, self.committed_rows, self.committed_batches
        );
        Ok(())
    }
}
