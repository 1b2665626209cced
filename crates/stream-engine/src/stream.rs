//! A single rate-paced, batch-committing stream.

use crate::barrier::BarrierGuard;
use crate::error::EngineError;
use crate::pacer::Pacer;
use crate::report::{StopReason, StreamReport};
use crate::stop::StopSignal;
use culvert_core::StreamDefinition;
use ingest_sink::{PartitionDescriptor, Sink, SinkError, SinkFactory};
use parking_lot::Mutex;
use row_generator::{seed_for_stream, Column, GenerationContext, RowGenerator};
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Lifecycle of a stream. Moves forward only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreamState {
    Created,
    Running,
    StoppedNormal,
    StoppedError,
}

impl StreamState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, StreamState::StoppedNormal | StreamState::StoppedError)
    }
}

impl fmt::Display for StreamState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match self {
            StreamState::Created => "created",
            StreamState::Running => "running",
            StreamState::StoppedNormal => "stopped",
            StreamState::StoppedError => "failed",
        };
        f.write_str(state)
    }
}

/// Shared, observable handle on a stream's state.
#[derive(Debug, Clone)]
pub struct StreamStatus {
    state: Arc<Mutex<StreamState>>,
}

impl Default for StreamStatus {
    fn default() -> Self {
        Self {
            state: Arc::new(Mutex::new(StreamState::Created)),
        }
    }
}

impl StreamStatus {
    pub fn get(&self) -> StreamState {
        *self.state.lock()
    }

    /// Advance to `next`. A terminal state is never left.
    pub(crate) fn set(&self, next: StreamState) {
        let mut state = self.state.lock();
        if !state.is_terminal() {
            *state = next;
        }
    }
}

/// Validated, immutable settings of one stream.
#[derive(Debug, Clone)]
pub struct StreamConfig {
    name: String,
    columns: Arc<[Column]>,
    events_per_second: f64,
    commit_after_rows: u64,
    timeout: Duration,
    max_rows: Option<u64>,
    partition: PartitionDescriptor,
    seed: u64,
}

impl StreamConfig {
    /// Validate `definition` and resolve its columns. The stream's RNG seed
    /// is derived from `base_seed` and the stream name.
    pub fn from_definition(
        definition: &StreamDefinition,
        database: &str,
        table: &str,
        base_seed: u64,
    ) -> Result<Self, EngineError> {
        definition.validate()?;
        let columns = Column::from_definitions(&definition.resolved_columns())?;

        Ok(Self {
            name: definition.name.clone(),
            columns,
            events_per_second: definition.events_per_second,
            commit_after_rows: definition.commit_after_rows,
            timeout: definition.timeout,
            max_rows: definition.max_rows,
            partition: PartitionDescriptor::new(
                database,
                table,
                definition.name.clone(),
                definition.partition.clone(),
            ),
            seed: seed_for_stream(base_seed, &definition.name),
        })
    }

    /// Replace the column set.
    pub fn with_columns(mut self, columns: Arc<[Column]>) -> Self {
        self.columns = columns;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn events_per_second(&self) -> f64 {
        self.events_per_second
    }

    pub fn commit_after_rows(&self) -> u64 {
        self.commit_after_rows
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn max_rows(&self) -> Option<u64> {
        self.max_rows
    }

    pub fn partition(&self) -> &PartitionDescriptor {
        &self.partition
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}

#[derive(Debug, Default)]
struct Counters {
    rows_written: u64,
    rows_committed: u64,
    uncommitted: u64,
    commits: u64,
}

/// Releases the completion slot once the stream is terminal. A stream that
/// unwinds before reaching a terminal state is marked as failed first.
struct Finish {
    status: StreamStatus,
    completion: Option<BarrierGuard>,
}

impl Drop for Finish {
    fn drop(&mut self) {
        if !self.status.get().is_terminal() {
            self.status.set(StreamState::StoppedError);
        }
        if let Some(completion) = self.completion.take() {
            completion.release();
        }
    }
}

/// Generates, writes and commits rows for one stream until it terminates.
pub struct StreamEngine {
    config: StreamConfig,
    context: Arc<GenerationContext>,
    sinks: Arc<dyn SinkFactory>,
    stop: StopSignal,
    status: StreamStatus,
}

impl StreamEngine {
    pub fn new(
        config: StreamConfig,
        context: Arc<GenerationContext>,
        sinks: Arc<dyn SinkFactory>,
    ) -> Self {
        Self {
            config,
            context,
            sinks,
            stop: StopSignal::new(),
            status: StreamStatus::default(),
        }
    }

    /// Observe `stop` instead of a private signal.
    pub fn with_stop_signal(mut self, stop: StopSignal) -> Self {
        self.stop = stop;
        self
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn config(&self) -> &StreamConfig {
        &self.config
    }

    pub fn status(&self) -> StreamStatus {
        self.status.clone()
    }

    /// Run the stream to completion on the calling thread.
    ///
    /// The state is terminal before `completion` is released, so a waiter
    /// woken by the barrier always observes a finished stream.
    pub fn run(self, completion: BarrierGuard) -> StreamReport {
        let finish = Finish {
            status: self.status.clone(),
            completion: Some(completion),
        };
        let name = self.config.name.clone();
        self.status.set(StreamState::Running);
        info!(
            "Starting stream '{}' into {} ({} events/s, commit every {} rows, timeout {:?})",
            name,
            self.config.partition,
            self.config.events_per_second,
            self.config.commit_after_rows,
            self.config.timeout
        );

        let start = Instant::now();
        let mut counters = Counters::default();
        let outcome = self.drive(start, &mut counters);
        let elapsed = start.elapsed();

        let (state, reason, error) = match outcome {
            Ok(reason) => (StreamState::StoppedNormal, reason, None),
            Err(e) => {
                error!("Stream '{}' failed: {}", name, e);
                (StreamState::StoppedError, StopReason::Failed, Some(e.to_string()))
            }
        };
        self.status.set(state);

        let report = StreamReport {
            name,
            state,
            reason,
            rows_written: counters.rows_written,
            rows_committed: counters.rows_committed,
            commits: counters.commits,
            elapsed,
            error,
        };
        info!(
            "Stream '{}' {} ({}): {} rows in {} commits over {:.2}s ({:.0} rows/s)",
            report.name,
            report.state,
            report.reason,
            report.rows_written,
            report.commits,
            elapsed.as_secs_f64(),
            report.rows_per_second()
        );

        drop(finish);
        report
    }

    /// Open the sink, run the loop and always attempt to close the sink.
    fn drive(&self, start: Instant, counters: &mut Counters) -> Result<StopReason, SinkError> {
        let mut sink = self.sinks.open(&self.config.partition)?;

        match self.generate(sink.as_mut(), start, counters) {
            Ok(reason) => {
                sink.close()?;
                Ok(reason)
            }
            Err(e) => {
                if let Err(close_err) = sink.close() {
                    warn!(
                        "Failed to close sink of stream '{}' after error: {}",
                        self.config.name, close_err
                    );
                }
                Err(e)
            }
        }
    }

    fn generate(
        &self,
        sink: &mut dyn Sink,
        start: Instant,
        counters: &mut Counters,
    ) -> Result<StopReason, SinkError> {
        let config = &self.config;
        let mut generator =
            RowGenerator::new(config.columns.clone(), self.context.clone(), config.seed);
        let mut pacer = Pacer::new(config.events_per_second, start);
        // A timeout past the end of the clock never expires
        let deadline = start.checked_add(config.timeout);

        let reason = loop {
            if self.stop.is_stopped() {
                break StopReason::Stopped;
            }
            if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
                break StopReason::Timeout;
            }
            if config.max_rows.is_some_and(|max| counters.rows_written >= max) {
                break StopReason::RowLimit;
            }

            let record = generator.next_record();
            sink.write(&record)?;
            counters.rows_written += 1;
            counters.uncommitted += 1;

            if counters.uncommitted >= config.commit_after_rows {
                Self::commit(sink, counters)?;
                debug!(
                    "Stream '{}' committed batch {} ({} rows total)",
                    config.name, counters.commits, counters.rows_committed
                );
            }

            pacer.pace(counters.rows_written, deadline, &self.stop);
        };

        if counters.uncommitted > 0 {
            debug!(
                "Stream '{}' committing final batch of {} rows",
                config.name, counters.uncommitted
            );
            Self::commit(sink, counters)?;
        }
        Ok(reason)
    }

    fn commit(sink: &mut dyn Sink, counters: &mut Counters) -> Result<(), SinkError> {
        sink.commit_batch()?;
        counters.commits += 1;
        counters.rows_committed += counters.uncommitted;
        counters.uncommitted = 0;
        Ok(())
    }
}

impl fmt::Debug for StreamEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamEngine")
            .field("config", &self.config)
            .field("state", &self.status.get())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::barrier::CompletionBarrier;
    use culvert_core::{ColumnDefinition, ColumnType};
    use ingest_sink::testing::{Faults, RecordingSinkFactory, SinkEvent};

    fn context() -> Arc<GenerationContext> {
        Arc::new(GenerationContext::build(16, 7).unwrap())
    }

    fn definition(name: &str, commit_after_rows: u64, max_rows: u64) -> StreamDefinition {
        let mut definition = StreamDefinition::new(
            name,
            commit_after_rows,
            1_000_000.0,
            Duration::from_secs(30),
        );
        definition.max_rows = Some(max_rows);
        definition.columns = Some(vec![
            ColumnDefinition::new("id", ColumnType::StringUuidDict),
            ColumnDefinition::new("flag", ColumnType::Boolean),
        ]);
        definition
    }

    fn engine(definition: &StreamDefinition, sinks: &RecordingSinkFactory) -> StreamEngine {
        let config = StreamConfig::from_definition(definition, "db", "events", 1).unwrap();
        StreamEngine::new(config, context(), Arc::new(sinks.clone()))
    }

    #[test]
    fn test_config_rejects_invalid_definition() {
        let mut definition = definition("s", 3, 10);
        definition.events_per_second = 0.0;
        assert!(matches!(
            StreamConfig::from_definition(&definition, "db", "t", 1),
            Err(EngineError::Config(_))
        ));

        let mut definition = self::definition("s", 3, 10);
        definition.columns = Some(vec![ColumnDefinition::new("", ColumnType::Long)]);
        assert!(StreamConfig::from_definition(&definition, "db", "t", 1).is_err());
    }

    #[test]
    fn test_config_resolves_partition_and_seed() {
        let mut definition = definition("s1", 3, 10);
        definition.partition = vec!["2018".into(), "1".into()];
        let config = StreamConfig::from_definition(&definition, "db", "t", 42).unwrap();

        assert_eq!(config.partition().values, vec!["2018", "1"]);
        assert_eq!(config.partition().stream, "s1");
        assert_eq!(config.seed(), seed_for_stream(42, "s1"));
        assert_eq!(config.columns().len(), 2);
    }

    #[test]
    fn test_commits_every_threshold_plus_remainder() {
        let sinks = RecordingSinkFactory::new();
        let engine = engine(&definition("s1", 3, 10), &sinks);
        let status = engine.status();
        assert_eq!(status.get(), StreamState::Created);

        let barrier = CompletionBarrier::new(1);
        let report = engine.run(barrier.guard());

        assert!(barrier.is_complete());
        assert_eq!(status.get(), StreamState::StoppedNormal);
        assert_eq!(report.reason, StopReason::RowLimit);
        assert_eq!(report.rows_written, 10);
        assert_eq!(report.rows_committed, 10);
        assert_eq!(report.commits, 4);
        assert_eq!(sinks.commits("s1"), vec![3, 3, 3, 1]);
        assert_eq!(sinks.writes("s1"), (0..10).collect::<Vec<_>>());
        assert_eq!(sinks.events("s1").last(), Some(&SinkEvent::Closed));
    }

    #[test]
    fn test_exact_multiple_has_no_empty_commit() {
        let sinks = RecordingSinkFactory::new();
        let report = engine(&definition("s1", 5, 10), &sinks).run(CompletionBarrier::new(1).guard());
        assert_eq!(report.commits, 2);
        assert_eq!(sinks.commits("s1"), vec![5, 5]);
    }

    #[test]
    fn test_open_failure_releases_barrier() {
        let sinks = RecordingSinkFactory::new().with_faults(
            "s1",
            Faults {
                fail_open: true,
                ..Default::default()
            },
        );
        let engine = engine(&definition("s1", 3, 10), &sinks);
        let status = engine.status();
        let barrier = CompletionBarrier::new(1);

        let report = engine.run(barrier.guard());

        assert!(barrier.is_complete());
        assert_eq!(status.get(), StreamState::StoppedError);
        assert_eq!(report.reason, StopReason::Failed);
        assert_eq!(report.rows_written, 0);
        assert!(report.error.is_some());
        assert!(sinks.events("s1").is_empty());
    }

    #[test]
    fn test_write_failure_closes_without_committing_open_batch() {
        let sinks = RecordingSinkFactory::new().with_faults(
            "s1",
            Faults {
                fail_write_at: Some(5),
                ..Default::default()
            },
        );
        let barrier = CompletionBarrier::new(1);
        let report = engine(&definition("s1", 3, 10), &sinks).run(barrier.guard());

        assert!(barrier.is_complete());
        assert_eq!(report.state, StreamState::StoppedError);
        assert_eq!(report.rows_written, 4);
        assert_eq!(report.rows_committed, 3);
        assert_eq!(sinks.commits("s1"), vec![3]);
        assert!(sinks.closed("s1"));
    }

    #[test]
    fn test_commit_failure_stops_stream() {
        let sinks = RecordingSinkFactory::new().with_faults(
            "s1",
            Faults {
                fail_commit_at: Some(2),
                ..Default::default()
            },
        );
        let report = engine(&definition("s1", 3, 10), &sinks).run(CompletionBarrier::new(1).guard());

        assert_eq!(report.state, StreamState::StoppedError);
        assert_eq!(report.rows_written, 6);
        assert_eq!(report.commits, 1);
        assert!(sinks.closed("s1"));
    }

    #[test]
    fn test_close_failure_marks_error() {
        let sinks = RecordingSinkFactory::new().with_faults(
            "s1",
            Faults {
                fail_close: true,
                ..Default::default()
            },
        );
        let report = engine(&definition("s1", 3, 4), &sinks).run(CompletionBarrier::new(1).guard());

        assert_eq!(report.state, StreamState::StoppedError);
        assert_eq!(sinks.commits("s1"), vec![3, 1]);
    }

    #[test]
    fn test_stop_signal_ends_normally() {
        let sinks = RecordingSinkFactory::new();
        let stop = StopSignal::new();
        stop.stop();
        let engine = engine(&definition("s1", 3, 10), &sinks).with_stop_signal(stop);

        let report = engine.run(CompletionBarrier::new(1).guard());

        assert_eq!(report.state, StreamState::StoppedNormal);
        assert_eq!(report.reason, StopReason::Stopped);
        assert_eq!(report.rows_written, 0);
        assert!(sinks.commits("s1").is_empty());
        assert!(sinks.closed("s1"));
    }

    #[test]
    fn test_rerun_produces_identical_batches() {
        let context = context();
        let run = |sinks: &RecordingSinkFactory| {
            let config =
                StreamConfig::from_definition(&definition("s1", 2, 6), "db", "t", 9).unwrap();
            StreamEngine::new(config, context.clone(), Arc::new(sinks.clone()))
                .run(CompletionBarrier::new(1).guard());
        };

        let first = RecordingSinkFactory::new();
        let second = RecordingSinkFactory::new();
        run(&first);
        run(&second);
        assert_eq!(first.events("s1"), second.events("s1"));
    }

    #[test]
    fn test_terminal_state_is_sticky() {
        let status = StreamStatus::default();
        status.set(StreamState::Running);
        status.set(StreamState::StoppedError);
        status.set(StreamState::StoppedNormal);
        assert_eq!(status.get(), StreamState::StoppedError);
    }

    #[test]
    fn test_unbounded_timeout_runs_to_row_limit() {
        let sinks = RecordingSinkFactory::new();
        let mut definition = definition("huge", 2, 4);
        definition.timeout = Duration::from_secs(u64::MAX);
        let engine = engine(&definition, &sinks);
        let status = engine.status();
        let barrier = CompletionBarrier::new(1);

        let report = std::thread::spawn({
            let guard = barrier.guard();
            move || engine.run(guard)
        })
        .join()
        .unwrap();

        assert!(barrier.is_complete());
        assert_eq!(status.get(), StreamState::StoppedNormal);
        assert_eq!(report.reason, StopReason::RowLimit);
        assert_eq!(sinks.commits("huge"), vec![2, 2]);
        assert!(sinks.closed("huge"));
    }

    #[test]
    fn test_vanishing_rate_times_out_after_one_row() {
        let sinks = RecordingSinkFactory::new();
        let mut definition = definition("slow", 10, 4);
        definition.events_per_second = 1e-300;
        definition.timeout = Duration::from_millis(100);
        let engine = engine(&definition, &sinks);
        let status = engine.status();
        let barrier = CompletionBarrier::new(1);

        let report = engine.run(barrier.guard());

        assert!(barrier.is_complete());
        assert_eq!(status.get(), StreamState::StoppedNormal);
        assert_eq!(report.reason, StopReason::Timeout);
        assert_eq!(report.rows_written, 1);
        assert_eq!(sinks.commits("slow"), vec![1]);
        assert!(sinks.closed("slow"));
    }

    #[test]
    fn test_unwinding_stream_is_marked_failed_before_release() {
        let status = StreamStatus::default();
        status.set(StreamState::Running);
        let barrier = CompletionBarrier::new(1);

        let observed = status.clone();
        let waiter = barrier.clone();
        let result = std::thread::spawn({
            let guard = barrier.guard();
            move || {
                let _finish = Finish {
                    status,
                    completion: Some(guard),
                };
                panic!("generator blew up");
            }
        })
        .join();

        assert!(result.is_err());
        assert!(waiter.is_complete());
        assert_eq!(observed.get(), StreamState::StoppedError);
    }
}
