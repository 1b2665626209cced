//! Column vocabulary.
//!
//! [`ColumnDefinition`] is the configuration-side description of a column:
//! a name, a [`ColumnType`] and an optional dictionary. The runtime column
//! that actually produces values lives in the `row-generator` crate.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The closed set of column value sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    /// Random boolean
    Boolean,
    /// Realistic free text from the string source
    String,
    /// Cyclic value from the column dictionary (string source fallback)
    StringDict,
    /// IPv4 address from the shared lookup table
    StringIpAddress,
    /// UUID from the shared lookup table
    StringUuidDict,
    /// Random 64-bit integer
    Long,
    /// Random floating point number in `[0, 1)`
    Double,
    /// RFC 3339 timestamp from the shared lookup table
    Timestamp,
    /// Year in `2000..=2049` from the shared lookup table
    IntYear,
    /// Month in `1..=12` from the shared lookup table
    IntMonth,
}

impl ColumnType {
    /// Whether this type reads from a column dictionary.
    pub fn is_dictionary_backed(&self) -> bool {
        matches!(self, Self::StringDict)
    }

    /// Whether this type reads from a shared lookup table.
    pub fn is_table_backed(&self) -> bool {
        matches!(
            self,
            Self::StringIpAddress
                | Self::StringUuidDict
                | Self::Timestamp
                | Self::IntYear
                | Self::IntMonth
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Boolean => "boolean",
            Self::String => "string",
            Self::StringDict => "string_dict",
            Self::StringIpAddress => "string_ip_address",
            Self::StringUuidDict => "string_uuid_dict",
            Self::Long => "long",
            Self::Double => "double",
            Self::Timestamp => "timestamp",
            Self::IntYear => "int_year",
            Self::IntMonth => "int_month",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Column definition as it appears in a run configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDefinition {
    /// Column name
    pub name: String,

    /// Value source
    #[serde(rename = "type")]
    pub column_type: ColumnType,

    /// Ordered dictionary for `string_dict` columns
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dictionary: Option<Vec<String>>,
}

impl ColumnDefinition {
    /// Create a column without a dictionary.
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
            dictionary: None,
        }
    }

    /// Create a dictionary-backed column.
    pub fn with_dictionary<I, S>(name: impl Into<String>, dictionary: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            column_type: ColumnType::StringDict,
            dictionary: Some(dictionary.into_iter().map(Into::into).collect()),
        }
    }

    /// Reject empty names, empty dictionaries and dictionaries on columns
    /// that never read them.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::InvalidColumn {
                column: self.name.clone(),
                reason: "column name must not be empty".to_string(),
            });
        }
        match &self.dictionary {
            Some(dictionary) if !self.column_type.is_dictionary_backed() => {
                Err(ConfigError::InvalidColumn {
                    column: self.name.clone(),
                    reason: format!(
                        "dictionary of {} values given for non-dictionary type {}",
                        dictionary.len(),
                        self.column_type
                    ),
                })
            }
            Some(dictionary) if dictionary.is_empty() => Err(ConfigError::InvalidColumn {
                column: self.name.clone(),
                reason: "dictionary must contain at least one value".to_string(),
            }),
            _ => Ok(()),
        }
    }
}

/// The ad-event column set used when a stream declares no columns.
///
/// Matches a table partitioned by `(year, month)`:
///
/// ```text
/// user_id, page_id, ad_id, ad_type, event_type, event_time, ip_address, year, month
/// ```
pub fn default_columns() -> Vec<ColumnDefinition> {
    vec![
        ColumnDefinition::new("user_id", ColumnType::StringUuidDict),
        ColumnDefinition::new("page_id", ColumnType::StringUuidDict),
        ColumnDefinition::new("ad_id", ColumnType::StringUuidDict),
        ColumnDefinition::with_dictionary(
            "ad_type",
            ["banner", "modal", "sponsored-search", "mail", "mobile"],
        ),
        ColumnDefinition::with_dictionary("event_type", ["view", "click", "purchase"]),
        ColumnDefinition::new("event_time", ColumnType::Timestamp),
        ColumnDefinition::new("ip_address", ColumnType::StringIpAddress),
        ColumnDefinition::new("year", ColumnType::IntYear),
        ColumnDefinition::new("month", ColumnType::IntMonth),
    ]
}
