//! Launches every stream of a run on its own worker.

use crate::barrier::CompletionBarrier;
use crate::error::EngineError;
use crate::pool::WorkerPool;
use crate::report::{RunReport, StreamReport};
use crate::stop::StopSignal;
use crate::stream::{StreamConfig, StreamEngine, StreamState, StreamStatus};
use culvert_core::{ConfigError, RunConfig};
use ingest_sink::SinkFactory;
use row_generator::{Column, GenerationContext};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

/// Owns the streams of a run, the worker pool and the shared stop signal.
pub struct Orchestrator {
    name: String,
    pending: Vec<StreamEngine>,
    statuses: Vec<(String, StreamStatus)>,
    launch_delay: Duration,
    pool: WorkerPool<StreamReport>,
    stop: StopSignal,
    rejected: HashMap<String, StreamReport>,
}

impl Orchestrator {
    /// Build one engine per stream. When `columns_override` is set it replaces
    /// every stream's own columns. Stream names must be unique.
    pub fn build(
        name: impl Into<String>,
        streams: Vec<StreamConfig>,
        columns_override: Option<Arc<[Column]>>,
        launch_delay: Duration,
        context: Arc<GenerationContext>,
        sinks: Arc<dyn SinkFactory>,
    ) -> Result<Self, EngineError> {
        if streams.is_empty() {
            return Err(EngineError::NoStreams);
        }
        let mut seen = HashSet::new();
        if let Some(duplicate) = streams.iter().find(|config| !seen.insert(config.name())) {
            return Err(ConfigError::DuplicateStream(duplicate.name().to_string()).into());
        }

        let stop = StopSignal::new();
        let pool = WorkerPool::new(streams.len());
        let pending: Vec<StreamEngine> = streams
            .into_iter()
            .map(|config| match &columns_override {
                Some(columns) => config.with_columns(columns.clone()),
                None => config,
            })
            .map(|config| {
                StreamEngine::new(config, context.clone(), sinks.clone())
                    .with_stop_signal(stop.clone())
            })
            .collect();
        let statuses = pending
            .iter()
            .map(|engine| (engine.name().to_string(), engine.status()))
            .collect();

        Ok(Self {
            name: name.into(),
            pending,
            statuses,
            launch_delay,
            pool,
            stop,
            rejected: HashMap::new(),
        })
    }

    /// Build from a validated [`RunConfig`], applying its column override.
    pub fn from_run_config(
        config: &RunConfig,
        context: Arc<GenerationContext>,
        sinks: Arc<dyn SinkFactory>,
    ) -> Result<Self, EngineError> {
        config.validate()?;

        let streams = config
            .streams
            .iter()
            .map(|definition| {
                StreamConfig::from_definition(definition, &config.database, &config.table, config.seed)
            })
            .collect::<Result<Vec<_>, _>>()?;
        let columns_override = config
            .columns
            .as_deref()
            .map(Column::from_definitions)
            .transpose()?;

        Self::build(
            config.name.clone(),
            streams,
            columns_override,
            config.launch_delay,
            context,
            sinks,
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn stream_count(&self) -> usize {
        self.statuses.len()
    }

    /// Raising this signal ends every stream at its next check.
    pub fn stop_signal(&self) -> StopSignal {
        self.stop.clone()
    }

    /// Current state of every stream, in declaration order.
    pub fn statuses(&self) -> Vec<(String, StreamState)> {
        self.statuses
            .iter()
            .map(|(name, status)| (name.clone(), status.get()))
            .collect()
    }

    /// Launch every stream in declaration order, waiting `launch_delay`
    /// between consecutive launches. Returns once all are submitted.
    ///
    /// Each stream releases one slot of `barrier`, which must hold exactly
    /// one slot per stream; otherwise nothing is launched. A stream that
    /// fails to launch releases its slot at once and does not hold back the
    /// rest. Calling this again after a launch does nothing.
    pub fn run(&mut self, barrier: &CompletionBarrier) -> Result<(), EngineError> {
        if self.pending.is_empty() {
            warn!("Orchestration '{}' has already been started", self.name);
            return Ok(());
        }
        if barrier.remaining() != self.pending.len() {
            return Err(EngineError::BarrierMismatch {
                slots: barrier.remaining(),
                streams: self.pending.len(),
            });
        }

        info!(
            "Starting orchestration '{}' with {} streams",
            self.name,
            self.pending.len()
        );

        let engines = std::mem::take(&mut self.pending);
        for (position, engine) in engines.into_iter().enumerate() {
            if position > 0 && !self.launch_delay.is_zero() {
                info!("Waiting {:?} before launching '{}'", self.launch_delay, engine.name());
                self.stop.sleep_for(self.launch_delay);
            }

            let name = engine.name().to_string();
            let status = engine.status();
            let completion = barrier.guard();
            if let Err(e) = self.pool.submit(&name, move || engine.run(completion)) {
                error!("Failed to launch stream '{}': {}", name, e);
                status.set(StreamState::StoppedError);
                self.rejected
                    .insert(name.clone(), StreamReport::not_started(name, e.to_string()));
            }
        }
        Ok(())
    }

    /// Wait for every launched stream and collect reports in declaration
    /// order. Streams that never launched or that panicked report as failed.
    pub fn join(self) -> RunReport {
        let mut reports: HashMap<String, StreamReport> = self.rejected;

        for outcome in self.pool.join() {
            let report = match outcome.result {
                Ok(report) => report,
                Err(message) => {
                    error!("Stream '{}' panicked: {}", outcome.name, message);
                    StreamReport::not_started(&outcome.name, format!("panicked: {message}"))
                }
            };
            reports.insert(outcome.name, report);
        }

        let streams = self
            .statuses
            .iter()
            .map(|(name, status)| {
                if !status.get().is_terminal() {
                    status.set(StreamState::StoppedError);
                }
                reports
                    .remove(name)
                    .unwrap_or_else(|| StreamReport::not_started(name, "never launched"))
            })
            .collect();

        RunReport {
            name: self.name,
            streams,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use culvert_core::StreamDefinition;
    use ingest_sink::testing::RecordingSinkFactory;

    fn stream(name: &str) -> StreamConfig {
        let mut definition = StreamDefinition::new(name, 2, 1_000_000.0, Duration::from_secs(10));
        definition.max_rows = Some(4);
        StreamConfig::from_definition(&definition, "db", "t", 5).unwrap()
    }

    fn context() -> Arc<GenerationContext> {
        Arc::new(GenerationContext::build(8, 1).unwrap())
    }

    #[test]
    fn test_build_requires_streams() {
        let result = Orchestrator::build(
            "empty",
            Vec::new(),
            None,
            Duration::ZERO,
            context(),
            Arc::new(RecordingSinkFactory::new()),
        );
        assert!(matches!(result, Err(EngineError::NoStreams)));
    }

    #[test]
    fn test_statuses_start_created() {
        let orchestrator = Orchestrator::build(
            "run",
            vec![stream("a"), stream("b")],
            None,
            Duration::ZERO,
            context(),
            Arc::new(RecordingSinkFactory::new()),
        )
        .unwrap();

        assert_eq!(orchestrator.stream_count(), 2);
        assert_eq!(
            orchestrator.statuses(),
            vec![
                ("a".to_string(), StreamState::Created),
                ("b".to_string(), StreamState::Created)
            ]
        );
    }

    #[test]
    fn test_second_run_is_ignored() {
        let sinks = RecordingSinkFactory::new();
        let mut orchestrator = Orchestrator::build(
            "run",
            vec![stream("a")],
            None,
            Duration::ZERO,
            context(),
            Arc::new(sinks.clone()),
        )
        .unwrap();

        let barrier = CompletionBarrier::new(1);
        orchestrator.run(&barrier).unwrap();
        orchestrator.run(&barrier).unwrap();
        barrier.wait();

        let report = orchestrator.join();
        assert_eq!(report.streams.len(), 1);
        assert_eq!(sinks.commits("a"), vec![2, 2]);
    }

    #[test]
    fn test_build_rejects_duplicate_names() {
        let result = Orchestrator::build(
            "run",
            vec![stream("a"), stream("b"), stream("a")],
            None,
            Duration::ZERO,
            context(),
            Arc::new(RecordingSinkFactory::new()),
        );
        assert!(matches!(
            result,
            Err(EngineError::Config(ConfigError::DuplicateStream(name))) if name == "a"
        ));
    }

    #[test]
    fn test_mismatched_barrier_launches_nothing() {
        let sinks = RecordingSinkFactory::new();
        let mut orchestrator = Orchestrator::build(
            "run",
            vec![stream("a"), stream("b")],
            None,
            Duration::ZERO,
            context(),
            Arc::new(sinks.clone()),
        )
        .unwrap();

        let barrier = CompletionBarrier::new(1);
        assert!(matches!(
            orchestrator.run(&barrier),
            Err(EngineError::BarrierMismatch { slots: 1, streams: 2 })
        ));
        assert_eq!(barrier.remaining(), 1);
        assert!(orchestrator
            .statuses()
            .iter()
            .all(|(_, state)| *state == StreamState::Created));

        // The streams are still pending and launch with a matching barrier
        let barrier = CompletionBarrier::new(2);
        orchestrator.run(&barrier).unwrap();
        barrier.wait();
        let report = orchestrator.join();
        assert!(report.all_succeeded());
        assert_eq!(sinks.commits("b"), vec![2, 2]);
    }
}
