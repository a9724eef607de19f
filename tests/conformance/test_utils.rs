//! Shared fixtures.

use std::sync::Arc;

use crudtable::{Crud, CrudConfig, MemoryTable, Record, TableSchema, Value};

/// Table with an index on `status`.
pub fn table(name: &str) -> Arc<MemoryTable> {
    Arc::new(MemoryTable::new(
        name,
        TableSchema::with_hash_key("id").with_index("status-index", "status"),
    ))
}

/// Facade over a fresh [`table`].
pub fn crud(config: CrudConfig) -> (Arc<Crud>, Arc<MemoryTable>) {
    let table = table(&config.table_name);
    let crud = Crud::builder(config)
        .backend(table.clone())
        .build()
        .expect("facade should build");
    (Arc::new(crud), table)
}

/// Record from a JSON object literal.
pub fn record(json: serde_json::Value) -> Record {
    match Value::from(json) {
        Value::Map(record) => record,
        other => panic!("not an object: {:?}", other),
    }
}

/// Data of a successful response as a record.
pub fn data(response: &crudtable::Response) -> Record {
    assert!(response.is_successful(), "{}", response);
    response
        .data
        .as_map()
        .cloned()
        .unwrap_or_else(|| panic!("data is not a map: {}", response))
}

/// Length of list data.
pub fn list_len(response: &crudtable::Response) -> usize {
    match &response.data {
        Value::List(items) => items.len(),
        other => panic!("expected list, got {:?}", other),
    }
}
