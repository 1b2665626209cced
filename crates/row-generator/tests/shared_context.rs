//! Concurrent readers of one shared generation context.

use culvert_core::{ColumnDefinition, ColumnType, Value};
use row_generator::{Column, GenerationContext, RowGenerator};
use std::sync::Arc;
use std::thread;

#[test]
fn test_concurrent_generators_see_identical_table_values() {
    let context = Arc::new(GenerationContext::build(128, 5).unwrap());
    let columns = Column::from_definitions(&[
        ColumnDefinition::new("user_id", ColumnType::StringUuidDict),
        ColumnDefinition::new("event_time", ColumnType::Timestamp),
        ColumnDefinition::new("ip_address", ColumnType::StringIpAddress),
        ColumnDefinition::new("month", ColumnType::IntMonth),
    ])
    .unwrap();

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let context = context.clone();
            let columns = columns.clone();
            thread::spawn(move || {
                let mut generator =
                    RowGenerator::for_stream(columns, context, 1, &format!("stream-{i}"));
                (0..1_000).map(|_| generator.next_record()).collect::<Vec<_>>()
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    for records in &results {
        assert_eq!(records.len(), 1_000);
        for record in records {
            let row = record.index;
            assert_eq!(
                record.get("user_id"),
                Some(&Value::Text(context.uuid(row).clone()))
            );
            assert_eq!(
                record.get("event_time"),
                Some(&Value::Text(context.timestamp(row).clone()))
            );
            assert_eq!(
                record.get("ip_address"),
                Some(&Value::Text(context.ip_address(row).clone()))
            );
            assert_eq!(record.get("month"), Some(&Value::Int(context.month(row))));
        }
    }
    assert_eq!(results[0], results[3]);
}
