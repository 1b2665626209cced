//! Run configuration loaded from YAML.
//!
//! A run is an ordered list of streams plus the orchestration settings that
//! apply to all of them. Every value is checked by [`RunConfig::validate`]
//! before any stream starts.

use crate::column::{default_columns, ColumnDefinition};
use crate::duration::serde_str;
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default lookup table size (entries per table).
pub const DEFAULT_LOOKUP_TABLE_SIZE: usize = 1_000_000;

/// Default base seed.
pub const DEFAULT_SEED: u64 = 123;

fn default_name() -> String {
    "culvert".to_string()
}

fn default_database() -> String {
    "default".to_string()
}

fn default_seed() -> u64 {
    DEFAULT_SEED
}

fn default_lookup_table_size() -> usize {
    DEFAULT_LOOKUP_TABLE_SIZE
}

/// Complete configuration for one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Run name, used in logs
    #[serde(default = "default_name")]
    pub name: String,

    /// Target database name handed to the sink
    #[serde(default = "default_database")]
    pub database: String,

    /// Target table name handed to the sink
    #[serde(default = "default_name")]
    pub table: String,

    /// Base seed for lookup tables and per-stream random sources
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Number of entries in each shared lookup table
    #[serde(default = "default_lookup_table_size")]
    pub lookup_table_size: usize,

    /// Delay between consecutive stream launches
    #[serde(default, with = "serde_str")]
    pub launch_delay: Duration,

    /// Column set applied uniformly to every stream
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub columns: Option<Vec<ColumnDefinition>>,

    /// Where committed batches go
    #[serde(default)]
    pub sink: SinkConfig,

    /// Streams in launch order
    pub streams: Vec<StreamDefinition>,
}

/// Configuration for one stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamDefinition {
    /// Stream name, unique within a run
    pub name: String,

    /// Rows per committed batch
    pub commit_after_rows: u64,

    /// Target pacing rate
    pub events_per_second: f64,

    /// Maximum wall-clock run time
    #[serde(with = "serde_str")]
    pub timeout: Duration,

    /// Stop normally after this many rows
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_rows: Option<u64>,

    /// Static partition values the sink is opened with
    #[serde(default)]
    pub partition: Vec<String>,

    /// Columns for this stream; the default ad-event set when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub columns: Option<Vec<ColumnDefinition>>,
}

impl StreamDefinition {
    /// Create a stream definition with no partition and the default columns.
    pub fn new(
        name: impl Into<String>,
        commit_after_rows: u64,
        events_per_second: f64,
        timeout: Duration,
    ) -> Self {
        Self {
            name: name.into(),
            commit_after_rows,
            events_per_second,
            timeout,
            max_rows: None,
            partition: Vec::new(),
            columns: None,
        }
    }

    /// Columns declared for this stream, falling back to [`default_columns`].
    pub fn resolved_columns(&self) -> Vec<ColumnDefinition> {
        self.columns.clone().unwrap_or_else(default_columns)
    }

    /// Check rate, threshold, timeout and columns.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidStream {
            stream: self.name.clone(),
            reason,
        };

        if self.name.trim().is_empty() {
            return Err(invalid("stream name must not be empty".to_string()));
        }
        if self.commit_after_rows == 0 {
            return Err(invalid("commit_after_rows must be positive".to_string()));
        }
        if !self.events_per_second.is_finite() || self.events_per_second <= 0.0 {
            return Err(invalid(format!(
                "events_per_second must be a positive number, got {}",
                self.events_per_second
            )));
        }
        if self.timeout.is_zero() {
            return Err(invalid("timeout must be greater than zero".to_string()));
        }
        if self.max_rows == Some(0) {
            return Err(invalid("max_rows must be positive when set".to_string()));
        }
        if let Some(columns) = &self.columns {
            for column in columns {
                column.validate()?;
            }
        }
        Ok(())
    }
}

/// Output format for file sinks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordFormat {
    /// Delimited text, one row per line
    #[default]
    Csv,
    /// One JSON object per line
    Jsonl,
}

impl RecordFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Jsonl => "jsonl",
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("culvert-data")
}

fn default_delimiter() -> char {
    ','
}

/// Sink selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SinkConfig {
    /// Transactional file sink
    File {
        #[serde(default = "default_output_dir")]
        output_dir: PathBuf,
        #[serde(default)]
        format: RecordFormat,
        #[serde(default = "default_delimiter")]
        delimiter: char,
    },
    /// Discard everything (dry run)
    Null,
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self::File {
            output_dir: default_output_dir(),
            format: RecordFormat::default(),
            delimiter: default_delimiter(),
        }
    }
}

impl RunConfig {
    /// Load and validate a run configuration from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse and validate a run configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: RunConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize back to YAML.
    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// The built-in four stream run: partitions `2018/1` to `2018/4`,
    /// 10000 rows per commit, 10000 events per second, 60 seconds.
    pub fn builtin() -> Self {
        let streams = (1..=4)
            .map(|i| StreamDefinition {
                partition: vec!["2018".to_string(), i.to_string()],
                ..StreamDefinition::new(
                    format!("stream-{i}"),
                    10_000,
                    10_000.0,
                    Duration::from_secs(60),
                )
            })
            .collect();

        Self {
            name: default_name(),
            database: default_database(),
            table: default_name(),
            seed: DEFAULT_SEED,
            lookup_table_size: DEFAULT_LOOKUP_TABLE_SIZE,
            launch_delay: Duration::ZERO,
            columns: None,
            sink: SinkConfig::default(),
            streams,
        }
    }

    /// Stream names in launch order.
    pub fn stream_names(&self) -> Vec<&str> {
        self.streams.iter().map(|s| s.name.as_str()).collect()
    }

    /// Check every run-level and stream-level setting.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.streams.is_empty() {
            return Err(ConfigError::NoStreams);
        }
        if self.lookup_table_size == 0 {
            return Err(ConfigError::InvalidSetting {
                setting: "lookup_table_size".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        if let SinkConfig::File { delimiter, .. } = &self.sink {
            if !delimiter.is_ascii() {
                return Err(ConfigError::InvalidSetting {
                    setting: "sink.delimiter".to_string(),
                    reason: format!("delimiter must be a single ASCII character, got '{delimiter}'"),
                });
            }
        }
        if let Some(columns) = &self.columns {
            for column in columns {
                column.validate()?;
            }
        }

        let mut seen = HashSet::new();
        for stream in &self.streams {
            stream.validate()?;
            if !seen.insert(stream.name.as_str()) {
                return Err(ConfigError::DuplicateStream(stream.name.clone()));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::ColumnType;

    fn full_yaml() -> &'static str {
        r#"
name: clicks
seed: 7
lookup_table_size: 1000
launch_delay: 500ms
columns:
  - name: year
    type: int_year
sink:
  type: file
  output_dir: /tmp/culvert-test
  format: jsonl
streams:
  - name: stream-1
    commit_after_rows: 10
    events_per_second: 100
    timeout: 5s
    partition: ["2018", "1"]
  - name: stream-2
    commit_after_rows: 20
    events_per_second: 50.5
    timeout: 1m
    max_rows: 500
    columns:
      - name: flag
        type: boolean
"#
    }

    #[test]
    fn test_parse_full_config() {
        let config = RunConfig::from_yaml(full_yaml()).unwrap();

        assert_eq!(config.name, "clicks");
        assert_eq!(config.database, "default");
        assert_eq!(config.table, "clicks");
        assert_eq!(config.seed, 7);
        assert_eq!(config.lookup_table_size, 1000);
        assert_eq!(config.launch_delay, Duration::from_millis(500));
        assert_eq!(config.columns.as_ref().unwrap()[0].column_type, ColumnType::IntYear);
        assert_eq!(
            config.sink,
            SinkConfig::File {
                output_dir: PathBuf::from("/tmp/culvert-test"),
                format: RecordFormat::Jsonl,
                delimiter: ',',
            }
        );
        assert_eq!(config.stream_names(), vec!["stream-1", "stream-2"]);

        let second = &config.streams[1];
        assert_eq!(second.timeout, Duration::from_secs(60));
        assert_eq!(second.max_rows, Some(500));
        assert_eq!(second.events_per_second, 50.5);
        assert_eq!(second.resolved_columns().len(), 1);
    }

    #[test]
    fn test_defaults_applied() {
        let config = RunConfig::from_yaml(
            r#"
streams:
  - name: only
    commit_after_rows: 1
    events_per_second: 1
    timeout: 30
"#,
        )
        .unwrap();

        assert_eq!(config.name, "culvert");
        assert_eq!(config.seed, DEFAULT_SEED);
        assert_eq!(config.lookup_table_size, DEFAULT_LOOKUP_TABLE_SIZE);
        assert_eq!(config.launch_delay, Duration::ZERO);
        assert_eq!(config.sink, SinkConfig::default());
        assert_eq!(config.streams[0].timeout, Duration::from_secs(30));
        assert_eq!(config.streams[0].resolved_columns(), default_columns());
    }

    #[test]
    fn test_explicit_empty_columns_kept() {
        let config = RunConfig::from_yaml(
            r#"
sink:
  type: "null"
streams:
  - name: empty
    commit_after_rows: 1
    events_per_second: 1
    timeout: 1s
    columns: []
"#,
        )
        .unwrap();
        assert_eq!(config.sink, SinkConfig::Null);
        assert!(config.streams[0].resolved_columns().is_empty());
    }

    #[test]
    fn test_no_streams_rejected() {
        let err = RunConfig::from_yaml("streams: []").unwrap_err();
        assert!(matches!(err, ConfigError::NoStreams));
    }

    #[test]
    fn test_duplicate_stream_rejected() {
        let mut config = RunConfig::builtin();
        config.streams[1].name = config.streams[0].name.clone();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::DuplicateStream(name)) if name == "stream-1"
        ));
    }

    #[test]
    fn test_non_positive_settings_rejected() {
        let base = StreamDefinition::new("s", 10, 10.0, Duration::from_secs(1));
        assert!(base.validate().is_ok());

        let zero_commit = StreamDefinition {
            commit_after_rows: 0,
            ..base.clone()
        };
        assert!(zero_commit.validate().is_err());

        for rate in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let bad_rate = StreamDefinition {
                events_per_second: rate,
                ..base.clone()
            };
            assert!(bad_rate.validate().is_err(), "rate {rate} accepted");
        }

        let zero_timeout = StreamDefinition {
            timeout: Duration::ZERO,
            ..base.clone()
        };
        assert!(zero_timeout.validate().is_err());

        let zero_rows = StreamDefinition {
            max_rows: Some(0),
            ..base
        };
        assert!(zero_rows.validate().is_err());
    }

    #[test]
    fn test_empty_dictionary_rejected_in_config() {
        let err = RunConfig::from_yaml(
            r#"
streams:
  - name: s
    commit_after_rows: 1
    events_per_second: 1
    timeout: 1s
    columns:
      - name: ad_type
        type: string_dict
        dictionary: []
"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidColumn { .. }));
    }

    #[test]
    fn test_zero_lookup_table_rejected() {
        let mut config = RunConfig::builtin();
        config.lookup_table_size = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidSetting { .. })
        ));
    }

    #[test]
    fn test_builtin_round_trips_through_yaml() {
        let config = RunConfig::builtin();
        assert!(config.validate().is_ok());
        assert_eq!(config.streams.len(), 4);
        assert_eq!(config.streams[3].partition, vec!["2018", "4"]);

        let yaml = config.to_yaml().unwrap();
        let parsed = RunConfig::from_yaml(&yaml).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.yaml");
        fs::write(&path, full_yaml()).unwrap();

        let config = RunConfig::from_file(&path).unwrap();
        assert_eq!(config.streams.len(), 2);

        let missing = RunConfig::from_file(dir.path().join("missing.yaml"));
        assert!(matches!(missing, Err(ConfigError::Io(_))));
    }
}
