//! Value and record representations.
//!
//! A [`Record`] is the unit written to a sink: an ordered list of named,
//! typed values, one per configured column, in declaration order. There is
//! no separate schema object; the column sequence is the schema.

use serde::ser::{Serialize, SerializeMap, Serializer};
use std::fmt;
use std::sync::Arc;

/// A single generated value.
///
/// Text values are reference counted so that entries drawn from shared
/// lookup tables and dictionaries are handed out without copying.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(untagged)]
pub enum Value {
    /// Boolean value
    Bool(bool),

    /// 32-bit signed integer (bounded years and months)
    Int(i32),

    /// 64-bit signed integer
    Long(i64),

    /// 64-bit floating point
    Double(f64),

    /// String value
    Text(Arc<str>),
}

impl Value {
    /// Create a text value.
    pub fn text(value: impl Into<Arc<str>>) -> Self {
        Self::Text(value.into())
    }

    /// Try to get this value as a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Try to get this value as an i32.
    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Try to get this value as an i64.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Long(i) => Some(*i),
            Self::Int(i) => Some(*i as i64),
            _ => None,
        }
    }

    /// Try to get this value as an f64.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Double(f) => Some(*f),
            _ => None,
        }
    }

    /// Try to get this value as a string reference.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Long(i) => write!(f, "{i}"),
            Self::Double(d) => write!(f, "{d}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// A named value inside a record.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: Arc<str>,
    pub value: Value,
}

impl Field {
    pub fn new(name: Arc<str>, value: Value) -> Self {
        Self { name, value }
    }
}

/// One generated row.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// Row index within the owning stream, starting at 0
    pub index: u64,
    /// Field values in column declaration order
    pub fields: Vec<Field>,
}

impl Record {
    pub fn new(index: u64, fields: Vec<Field>) -> Self {
        Self { index, fields }
    }

    /// Look up a field value by column name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|field| &*field.name == name)
            .map(|field| &field.value)
    }

    /// Iterate over the values in column order.
    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.fields.iter().map(|field| &field.value)
    }

    /// Column names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|field| &*field.name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Records serialize as an object keyed by column name, preserving column order.
impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for field in &self.fields {
            map.serialize_entry(&*field.name, &field.value)?;
        }
        map.end()
    }
}
