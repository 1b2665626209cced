//! End-of-stream and end-of-run summaries.

use crate::stream::StreamState;
use std::fmt;
use std::time::Duration;

/// Why a stream left its generation loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The configured timeout elapsed
    Timeout,
    /// `max_rows` rows were generated
    RowLimit,
    /// The shared stop signal was raised
    Stopped,
    /// A sink operation failed, or the stream never started
    Failed,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            StopReason::Timeout => "timeout",
            StopReason::RowLimit => "row limit",
            StopReason::Stopped => "stopped",
            StopReason::Failed => "failed",
        };
        f.write_str(reason)
    }
}

/// Final counters of one stream.
#[derive(Debug, Clone)]
pub struct StreamReport {
    pub name: String,
    pub state: StreamState,
    pub reason: StopReason,
    /// Rows handed to the sink successfully
    pub rows_written: u64,
    /// Rows made durable by successful commits
    pub rows_committed: u64,
    pub commits: u64,
    pub elapsed: Duration,
    pub error: Option<String>,
}

impl StreamReport {
    /// Report for a stream that failed before its loop started.
    pub fn not_started(name: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: StreamState::StoppedError,
            reason: StopReason::Failed,
            rows_written: 0,
            rows_committed: 0,
            commits: 0,
            elapsed: Duration::ZERO,
            error: Some(error.into()),
        }
    }

    pub fn succeeded(&self) -> bool {
        self.state == StreamState::StoppedNormal
    }

    /// Observed write rate over the stream's lifetime.
    pub fn rows_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.rows_written as f64 / secs
        } else {
            0.0
        }
    }
}

/// Reports of every stream in a run, in declaration order.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub name: String,
    pub streams: Vec<StreamReport>,
}

impl RunReport {
    pub fn all_succeeded(&self) -> bool {
        self.streams.iter().all(StreamReport::succeeded)
    }

    pub fn failed(&self) -> impl Iterator<Item = &StreamReport> {
        self.streams.iter().filter(|report| !report.succeeded())
    }

    pub fn total_rows(&self) -> u64 {
        self.streams.iter().map(|report| report.rows_written).sum()
    }

    pub fn total_commits(&self) -> u64 {
        self.streams.iter().map(|report| report.commits).sum()
    }

    pub fn stream(&self, name: &str) -> Option<&StreamReport> {
        self.streams.iter().find(|report| report.name == name)
    }
}
