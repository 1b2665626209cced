//! Runtime column.

use crate::context::GenerationContext;
use crate::error::GeneratorError;
use culvert_core::{ColumnDefinition, ColumnType, Value};
use rand::Rng;
use std::sync::Arc;

/// An immutable, named value source.
///
/// Columns are built once from validated [`ColumnDefinition`]s and then
/// shared read-only by every stream that uses them.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    name: Arc<str>,
    column_type: ColumnType,
    dictionary: Option<Arc<[Value]>>,
}

impl Column {
    /// Build a column, rejecting an invalid definition up front.
    pub fn new(definition: &ColumnDefinition) -> Result<Self, GeneratorError> {
        definition.validate()?;
        let dictionary = definition.dictionary.as_ref().map(|values| {
            values
                .iter()
                .map(|v| Value::text(v.as_str()))
                .collect::<Arc<[Value]>>()
        });
        Ok(Self {
            name: Arc::from(definition.name.as_str()),
            column_type: definition.column_type,
            dictionary,
        })
    }

    /// Build an ordered column set.
    pub fn from_definitions(
        definitions: &[ColumnDefinition],
    ) -> Result<Arc<[Column]>, GeneratorError> {
        definitions.iter().map(Column::new).collect()
    }

    pub fn name(&self) -> &Arc<str> {
        &self.name
    }

    pub fn column_type(&self) -> ColumnType {
        self.column_type
    }

    pub fn dictionary(&self) -> Option<&[Value]> {
        self.dictionary.as_deref()
    }

    /// Produce the value for `row`.
    ///
    /// Table and dictionary backed types are pure in `row`. Boolean, long and
    /// double draw from `rng`; free text and dictionary fallbacks come from
    /// the context's string source.
    pub fn value_at<R: Rng>(&self, row: u64, context: &GenerationContext, rng: &mut R) -> Value {
        match self.column_type {
            ColumnType::Boolean => Value::Bool(rng.random()),
            ColumnType::Long => Value::Long(rng.random()),
            ColumnType::Double => Value::Double(rng.random()),
            ColumnType::String => Value::text(context.strings().full_name()),
            ColumnType::StringDict => match &self.dictionary {
                Some(dictionary) => dictionary[(row % dictionary.len() as u64) as usize].clone(),
                None => Value::text(context.strings().color_name()),
            },
            ColumnType::StringIpAddress => Value::Text(context.ip_address(row).clone()),
            ColumnType::StringUuidDict => Value::Text(context.uuid(row).clone()),
            ColumnType::Timestamp => Value::Text(context.timestamp(row).clone()),
            ColumnType::IntYear => Value::Int(context.year(row)),
            ColumnType::IntMonth => Value::Int(context.month(row)),
        }
    }
}
