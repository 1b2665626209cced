//! Partition descriptor passed to `SinkFactory::open`.

use std::fmt;
use std::path::PathBuf;

/// Identifies where a stream's rows land.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PartitionDescriptor {
    /// Target database
    pub database: String,
    /// Target table
    pub table: String,
    /// Owning stream
    pub stream: String,
    /// Static partition values, outermost first (e.g. `["2018", "1"]`)
    pub values: Vec<String>,
}

impl PartitionDescriptor {
    pub fn new(
        database: impl Into<String>,
        table: impl Into<String>,
        stream: impl Into<String>,
        values: Vec<String>,
    ) -> Self {
        Self {
            database: database.into(),
            table: table.into(),
            stream: stream.into(),
            values,
        }
    }

    /// Relative directory for this partition: `database/table/value/...`.
    pub fn relative_dir(&self) -> PathBuf {
        let mut dir = PathBuf::from(&self.database);
        dir.push(&self.table);
        for value in &self.values {
            dir.push(value);
        }
        dir
    }
}

impl fmt::Display for PartitionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.database, self.table)?;
        if !self.values.is_empty() {
            write!(f, "[{}]", self.values.join(","))?;
        }
        write!(f, " ({})", self.stream)
    }
}
