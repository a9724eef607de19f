//! Backing table contract
//!
//! The access layer issues exactly one of these calls per logical operation.
//! Every successful call returns its payload together with [`CallMetadata`],
//! the diagnostic data a managed service attaches to each response.

use crudtable_core::{Record, Value};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::schema::TableSchema;

/// Result type for backend calls
pub type BackendResult<T> = std::result::Result<BackendOutput<T>, BackendError>;

/// Failure reported by the backing table
#[derive(Debug, Error, Clone, PartialEq)]
pub enum BackendError {
    /// Structured service error; copied verbatim into response envelopes.
    #[error("{message}")]
    Service {
        /// Service error code, e.g. `ValidationException`
        code: String,
        /// Fault class, `Sender` or `Receiver`
        error_type: String,
        /// Human readable message
        message: String,
    },

    /// Loading or saving a table snapshot failed.
    #[error("snapshot error: {reason}")]
    Snapshot {
        /// What went wrong
        reason: String,
    },
}

impl BackendError {
    /// Client-side validation failure.
    pub fn validation(message: impl Into<String>) -> Self {
        BackendError::Service {
            code: "ValidationException".to_string(),
            error_type: "Sender".to_string(),
            message: message.into(),
        }
    }

    /// Requested table or index does not exist.
    pub fn resource_not_found(message: impl Into<String>) -> Self {
        BackendError::Service {
            code: "ResourceNotFoundException".to_string(),
            error_type: "Sender".to_string(),
            message: message.into(),
        }
    }

    /// Name of the error variant, used when the error carries no code.
    pub fn variant_name(&self) -> &'static str {
        match self {
            BackendError::Service { .. } => "Service",
            BackendError::Snapshot { .. } => "Snapshot",
        }
    }
}

/// Diagnostic metadata attached to every backend response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallMetadata {
    /// Unique id of the request
    pub request_id: String,
    /// Transport status code
    pub http_status_code: u16,
    /// Retries the client performed
    pub retry_attempts: u32,
}

impl CallMetadata {
    /// Metadata for a call that succeeded first time.
    pub fn ok() -> Self {
        Self {
            request_id: Uuid::new_v4().to_string(),
            http_status_code: 200,
            retry_attempts: 0,
        }
    }
}

/// Payload of a successful call plus its metadata
#[derive(Debug, Clone, PartialEq)]
pub struct BackendOutput<T> {
    /// Call result
    pub value: T,
    /// Call diagnostics
    pub metadata: CallMetadata,
}

impl<T> BackendOutput<T> {
    /// Wrap `value` with fresh success metadata.
    pub fn new(value: T) -> Self {
        Self {
            value,
            metadata: CallMetadata::ok(),
        }
    }
}

/// Equality query against the primary key or a secondary index
#[derive(Debug, Clone, PartialEq)]
pub struct QueryRequest {
    /// `None` queries the table's own hash key
    pub index_name: Option<String>,
    /// Key attribute compared
    pub attribute: String,
    /// Value it must equal
    pub value: Value,
    /// Attributes to return; `None` returns whole items
    pub projection: Option<Vec<String>>,
}

/// A single-table key-value store with optional secondary indexes.
///
/// Implementations must make [`TableBackend::add_to_attribute`] atomic: two
/// concurrent calls adding 1 must leave the attribute 2 greater.
pub trait TableBackend: Send + Sync {
    /// Name of the table.
    fn table_name(&self) -> &str;

    /// Key schema and secondary indexes.
    fn describe_table(&self) -> Result<TableSchema, BackendError>;

    /// Every item, in no particular order.
    fn scan(&self) -> BackendResult<Vec<Record>>;

    /// Items whose key attribute equals the requested value.
    fn query(&self, request: &QueryRequest) -> BackendResult<Vec<Record>>;

    /// Item by hash key.
    fn get_item(&self, key: &Value, consistent_read: bool) -> BackendResult<Option<Record>>;

    /// Insert or replace an item. The item must carry its hash key.
    fn put_item(&self, item: Record) -> BackendResult<()>;

    /// Remove an item. Removing a missing item succeeds.
    fn delete_item(&self, key: &Value) -> BackendResult<()>;

    /// Atomically add `delta` to a numeric attribute and return the new value.
    fn add_to_attribute(&self, key: &Value, attribute: &str, delta: i64) -> BackendResult<Value>;
}
