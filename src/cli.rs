//! `culvert run` arguments and how they override a run configuration.

use anyhow::Context;
use clap::{Parser, ValueEnum};
use culvert_core::{parse_duration, RecordFormat, RunConfig, SinkConfig, StreamDefinition};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Delimited text
    Csv,
    /// JSON lines
    Jsonl,
}

impl From<OutputFormat> for RecordFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Csv => RecordFormat::Csv,
            OutputFormat::Jsonl => RecordFormat::Jsonl,
        }
    }
}

#[derive(Parser, Clone, Debug, Default)]
pub struct RunArgs {
    /// Run configuration file (YAML). The built-in four stream run when absent
    #[arg(long, env = "CULVERT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Generate and pace rows but discard them
    #[arg(long)]
    pub dry_run: bool,

    /// Directory the file sink writes under
    #[arg(long, env = "CULVERT_OUTPUT_DIR")]
    pub output_dir: Option<PathBuf>,

    /// Output format of the file sink
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Number of streams; extra streams copy the last declared one
    #[arg(long)]
    pub streams: Option<usize>,

    /// Target rate of every stream
    #[arg(long)]
    pub events_per_second: Option<f64>,

    /// Rows per commit for every stream
    #[arg(long)]
    pub commit_after_rows: Option<u64>,

    /// Lifetime of every stream (e.g. "30s", "5m", "90")
    #[arg(long, value_parser = parse_duration)]
    pub timeout: Option<Duration>,

    /// Pause between consecutive stream launches
    #[arg(long, value_parser = parse_duration)]
    pub launch_delay: Option<Duration>,

    /// Stop every stream after this many rows
    #[arg(long)]
    pub max_rows: Option<u64>,

    /// Base seed for lookup tables and per-stream generators
    #[arg(long)]
    pub seed: Option<u64>,

    /// Rows in each lookup table
    #[arg(long)]
    pub lookup_table_size: Option<usize>,
}

impl RunArgs {
    /// Load the configuration file (or the built-in run), apply overrides
    /// and validate the result.
    pub fn resolve(&self) -> anyhow::Result<RunConfig> {
        let mut config = match &self.config {
            Some(path) => RunConfig::from_file(path)
                .with_context(|| format!("Failed to load run configuration from {path:?}"))?,
            None => RunConfig::builtin(),
        };
        self.apply(&mut config);
        config
            .validate()
            .context("Invalid run configuration after command-line overrides")?;
        Ok(config)
    }

    /// Overwrite `config` with every value given on the command line.
    pub fn apply(&self, config: &mut RunConfig) {
        if let Some(count) = self.streams {
            resize_streams(&mut config.streams, count);
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(size) = self.lookup_table_size {
            config.lookup_table_size = size;
        }
        if let Some(delay) = self.launch_delay {
            config.launch_delay = delay;
        }

        for stream in &mut config.streams {
            if let Some(eps) = self.events_per_second {
                stream.events_per_second = eps;
            }
            if let Some(rows) = self.commit_after_rows {
                stream.commit_after_rows = rows;
            }
            if let Some(timeout) = self.timeout {
                stream.timeout = timeout;
            }
            if let Some(max_rows) = self.max_rows {
                stream.max_rows = Some(max_rows);
            }
        }

        if self.dry_run {
            config.sink = SinkConfig::Null;
        } else if self.output_dir.is_some() || self.format.is_some() {
            if let SinkConfig::Null = config.sink {
                config.sink = SinkConfig::default();
            }
            if let SinkConfig::File {
                output_dir, format, ..
            } = &mut config.sink
            {
                if let Some(dir) = &self.output_dir {
                    *output_dir = dir.clone();
                }
                if let Some(requested) = self.format {
                    *format = requested.into();
                }
            }
        }
    }
}

/// Truncate to `count` streams, or append copies of the last stream named
/// `stream-<n>`. A numeric last partition value is replaced by `n`.
fn resize_streams(streams: &mut Vec<StreamDefinition>, count: usize) {
    if count <= streams.len() {
        streams.truncate(count);
        return;
    }
    let Some(template) = streams.last().cloned() else {
        return;
    };

    for n in streams.len() + 1..=count {
        let mut stream = template.clone();
        stream.name = format!("stream-{n}");
        if let Some(last) = stream.partition.last_mut() {
            if last.parse::<u64>().is_ok() {
                *last = n.to_string();
            }
        }
        streams.push(stream);
    }
}
