//! Wires a run configuration into an orchestration and waits for it.

use anyhow::Context;
use culvert_core::{RunConfig, SinkConfig};
use ingest_sink::{FileSinkFactory, NullSinkFactory, SinkFactory};
use row_generator::GenerationContext;
use std::sync::Arc;
use std::time::Instant;
use stream_engine::{CompletionBarrier, Orchestrator, RunReport};
use tracing::info;

/// Sink factory selected by the configuration.
pub fn sink_factory(sink: &SinkConfig) -> Arc<dyn SinkFactory> {
    match sink {
        SinkConfig::File {
            output_dir,
            format,
            delimiter,
        } => {
            info!("Writing {:?} batches under {}", format, output_dir.display());
            // Validation guarantees an ASCII delimiter
            let delimiter = u8::try_from(*delimiter).unwrap_or(b',');
            Arc::new(
                FileSinkFactory::new(output_dir)
                    .with_format(*format)
                    .with_delimiter(delimiter),
            )
        }
        SinkConfig::Null => {
            info!("[DRY-RUN] Rows are generated and paced but discarded");
            Arc::new(NullSinkFactory)
        }
    }
}

/// Build the lookup tables, launch every stream and block until the
/// completion barrier opens.
pub fn run_orchestration(config: &RunConfig) -> anyhow::Result<RunReport> {
    let started = Instant::now();
    let context = GenerationContext::build(config.lookup_table_size, config.seed)
        .context("Failed to build lookup tables")?;
    info!(
        "Lookup tables ready in {:.2}s",
        started.elapsed().as_secs_f64()
    );

    let mut orchestrator =
        Orchestrator::from_run_config(config, Arc::new(context), sink_factory(&config.sink))
            .context("Failed to set up streams")?;

    let barrier = CompletionBarrier::new(orchestrator.stream_count());
    orchestrator
        .run(&barrier)
        .context("Failed to launch streams")?;
    barrier.wait();
    info!("All {} streams finished", orchestrator.stream_count());

    Ok(orchestrator.join())
}

#[cfg(test)]
mod tests {
    use super::*;
    use culvert_core::{RecordFormat, StreamDefinition};
    use std::time::Duration;

    fn small_run(sink: SinkConfig) -> RunConfig {
        let streams = (1..=2)
            .map(|i| StreamDefinition {
                max_rows: Some(25),
                partition: vec!["2018".to_string(), i.to_string()],
                ..StreamDefinition::new(format!("stream-{i}"), 10, 1_000_000.0, Duration::from_secs(30))
            })
            .collect();
        RunConfig {
            lookup_table_size: 100,
            sink,
            streams,
            ..RunConfig::builtin()
        }
    }

    #[test]
    fn test_dry_run_completes() {
        let report = run_orchestration(&small_run(SinkConfig::Null)).unwrap();
        assert!(report.all_succeeded());
        assert_eq!(report.total_rows(), 50);
        assert_eq!(report.total_commits(), 6);
    }

    #[test]
    fn test_file_run_writes_every_partition() {
        let dir = tempfile::tempdir().unwrap();
        let config = small_run(SinkConfig::File {
            output_dir: dir.path().to_path_buf(),
            format: RecordFormat::Csv,
            delimiter: '|',
        });

        let report = run_orchestration(&config).unwrap();
        assert!(report.all_succeeded());

        for i in 1..=2 {
            let path = dir
                .path()
                .join(format!("default/culvert/2018/{i}/stream-{i}.csv"));
            let contents = std::fs::read_to_string(&path).unwrap();
            assert_eq!(contents.lines().count(), 25);
            // Nine default columns
            assert!(contents.lines().all(|line| line.split('|').count() == 9));
        }
    }
}
