//! In-memory table
//!
//! A [`TableBackend`] kept entirely in process, used for tests, local
//! development and the CLI's snapshot mode.
//!
//! # Design
//!
//! - DashMap keyed by the canonical form of the hash key: sharded writes,
//!   lock-free reads
//! - Numbers are stored as decimals, the way the managed table stores them
//! - Secondary index queries scan the shards; fine at in-memory sizes
//!
//! # Thread Safety
//!
//! All operations are thread-safe. [`MemoryTable::add_to_attribute`] holds
//! the shard write lock across read-add-write, so concurrent increments are
//! never lost.

use std::fs;
use std::path::Path;
use std::str::FromStr;

use crudtable_core::{decimalize_record, Record, Value};
use dashmap::DashMap;
use rust_decimal::Decimal;

use crate::backend::{BackendError, BackendOutput, BackendResult, QueryRequest, TableBackend};
use crate::schema::TableSchema;

/// Table held in process memory
pub struct MemoryTable {
    name: String,
    schema: TableSchema,
    /// Canonical hash key -> item
    items: DashMap<String, Record>,
}

impl MemoryTable {
    /// Create an empty table.
    pub fn new(name: impl Into<String>, schema: TableSchema) -> Self {
        Self {
            name: name.into(),
            schema,
            items: DashMap::new(),
        }
    }

    /// Number of stored items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True when the table holds no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Replace the table contents with the records in a JSON snapshot file.
    ///
    /// The file holds a JSON array of objects. A missing file leaves the
    /// table empty.
    pub fn load_snapshot(&self, path: &Path) -> Result<usize, BackendError> {
        self.items.clear();
        if !path.exists() {
            return Ok(0);
        }
        let text = fs::read_to_string(path).map_err(|e| BackendError::Snapshot {
            reason: format!("reading {}: {}", path.display(), e),
        })?;
        let records: Vec<Record> =
            serde_json::from_str(&text).map_err(|e| BackendError::Snapshot {
                reason: format!("parsing {}: {}", path.display(), e),
            })?;
        let count = records.len();
        for record in records {
            self.put_item(record).map_err(|e| BackendError::Snapshot {
                reason: format!("loading {}: {}", path.display(), e),
            })?;
        }
        tracing::debug!(target: "crudtable::storage", table = %self.name, count, "snapshot loaded");
        Ok(count)
    }

    /// Write every item to a JSON snapshot file, sorted by key.
    pub fn save_snapshot(&self, path: &Path) -> Result<(), BackendError> {
        let mut entries: Vec<(String, Record)> = self
            .items
            .iter()
            .map(|e| (e.key().clone(), e.value().clone()))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        let records: Vec<Value> = entries.into_iter().map(|(_, r)| Value::Map(r)).collect();
        let text = serde_json::to_string_pretty(&records).map_err(|e| BackendError::Snapshot {
            reason: e.to_string(),
        })?;
        fs::write(path, text).map_err(|e| BackendError::Snapshot {
            reason: format!("writing {}: {}", path.display(), e),
        })?;
        tracing::debug!(target: "crudtable::storage", table = %self.name, "snapshot saved");
        Ok(())
    }

    fn hash_attribute(&self) -> Result<&str, BackendError> {
        self.schema
            .hash_key()
            .ok_or_else(|| BackendError::validation("Table has no hash key"))
    }

    fn key_of(&self, key: &Value) -> Result<String, BackendError> {
        canonical_key(key).ok_or_else(|| {
            BackendError::validation(
                "The provided key element does not match the schema: expected a string or number",
            )
        })
    }
}

/// Canonical text form of a key value; `None` for non-key types.
fn canonical_key(key: &Value) -> Option<String> {
    match key {
        Value::String(s) => Some(format!("S:{}", s)),
        Value::Int(_) | Value::Float(_) | Value::Decimal(_) => {
            key.as_decimal().map(|d| format!("N:{}", d.normalize()))
        }
        _ => None,
    }
}

/// Equality as a key comparison: strings by text, numbers by numeric value.
/// A string query value also matches a number it parses to.
fn key_matches(stored: &Value, wanted: &Value) -> bool {
    match (stored, wanted) {
        (Value::String(a), Value::String(b)) => a == b,
        (stored, Value::String(b)) => match (stored.as_decimal(), Decimal::from_str(b)) {
            (Some(a), Ok(b)) => a == b,
            _ => false,
        },
        (stored, wanted) => match (stored.as_decimal(), wanted.as_decimal()) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        },
    }
}

fn project(record: &Record, projection: Option<&[String]>) -> Record {
    match projection {
        None => record.clone(),
        Some(fields) => record
            .iter()
            .filter(|(k, _)| fields.iter().any(|f| f == *k))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect(),
    }
}

impl TableBackend for MemoryTable {
    fn table_name(&self) -> &str {
        &self.name
    }

    fn describe_table(&self) -> Result<TableSchema, BackendError> {
        Ok(self.schema.clone())
    }

    fn scan(&self) -> BackendResult<Vec<Record>> {
        let items = self.items.iter().map(|e| e.value().clone()).collect();
        Ok(BackendOutput::new(items))
    }

    fn query(&self, request: &QueryRequest) -> BackendResult<Vec<Record>> {
        let projection = request.projection.as_deref();
        match &request.index_name {
            None => {
                let hash = self.hash_attribute()?;
                if request.attribute != hash {
                    return Err(BackendError::validation(format!(
                        "Query condition missed key schema element: {}",
                        hash
                    )));
                }
                let key = self.key_of(&request.value)?;
                let items = self
                    .items
                    .get(&key)
                    .map(|item| vec![project(item.value(), projection)])
                    .unwrap_or_default();
                Ok(BackendOutput::new(items))
            }
            Some(index_name) => {
                let index = self.schema.index(index_name).ok_or_else(|| {
                    BackendError::validation(format!(
                        "The table does not have the specified index: {}",
                        index_name
                    ))
                })?;
                if index.hash_key() != Some(request.attribute.as_str()) {
                    return Err(BackendError::validation(format!(
                        "Query condition missed key schema element of index {}",
                        index_name
                    )));
                }
                let items = self
                    .items
                    .iter()
                    .filter(|e| {
                        e.value()
                            .get(&request.attribute)
                            .map(|v| key_matches(v, &request.value))
                            .unwrap_or(false)
                    })
                    .map(|e| project(e.value(), projection))
                    .collect();
                Ok(BackendOutput::new(items))
            }
        }
    }

    fn get_item(&self, key: &Value, _consistent_read: bool) -> BackendResult<Option<Record>> {
        let key = self.key_of(key)?;
        Ok(BackendOutput::new(
            self.items.get(&key).map(|item| item.value().clone()),
        ))
    }

    fn put_item(&self, item: Record) -> BackendResult<()> {
        let hash = self.hash_attribute()?;
        let key_value = item.get(hash).ok_or_else(|| {
            BackendError::validation(format!(
                "One of the required keys was not given a value: {}",
                hash
            ))
        })?;
        let key = self.key_of(key_value)?;
        let stored =
            decimalize_record(item).map_err(|e| BackendError::validation(e.to_string()))?;
        self.items.insert(key, stored);
        Ok(BackendOutput::new(()))
    }

    fn delete_item(&self, key: &Value) -> BackendResult<()> {
        let key = self.key_of(key)?;
        self.items.remove(&key);
        Ok(BackendOutput::new(()))
    }

    fn add_to_attribute(&self, key: &Value, attribute: &str, delta: i64) -> BackendResult<Value> {
        let hash = self.hash_attribute()?;
        if attribute == hash {
            return Err(BackendError::validation(format!(
                "Cannot update attribute {}. This attribute is part of the key",
                attribute
            )));
        }
        let key = self.key_of(key)?;
        let missing = || {
            BackendError::validation(
                "The provided expression refers to an attribute that does not exist in the item",
            )
        };

        // The shard stays write-locked until `item` is dropped.
        let mut item = self.items.get_mut(&key).ok_or_else(missing)?;
        let current = item.get(attribute).ok_or_else(missing)?;
        let current = match current {
            Value::Int(_) | Value::Float(_) | Value::Decimal(_) => current.as_decimal(),
            _ => None,
        }
        .ok_or_else(|| {
            BackendError::validation(
                "An operand in the update expression has an incorrect data type",
            )
        })?;
        let updated = current
            .checked_add(Decimal::from(delta))
            .ok_or_else(|| BackendError::validation("Number overflow. Attempting to store a number with magnitude larger than supported range"))?;
        item.insert(attribute.to_string(), Value::Decimal(updated));
        Ok(BackendOutput::new(Value::Decimal(updated)))
    }
}

impl std::fmt::Debug for MemoryTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryTable")
            .field("name", &self.name)
            .field("schema", &self.schema)
            .field("items", &self.items.len())
            .finish()
    }
}
