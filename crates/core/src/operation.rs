//! Operation names
//!
//! Every facade operation has a stable lowercase name. The same names are used
//! in configuration (`supported_ops`), in invocation payloads (`operation`)
//! and in the `describe` output.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Operation name that matches no known operation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown operation '{name}'")]
pub struct UnknownOperation {
    /// The name as given (after lower-casing)
    pub name: String,
}

/// A facade operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    /// Full scan
    List,
    /// Lookup by identity
    Get,
    /// Insert a new record
    Create,
    /// Replace an existing record
    Update,
    /// Remove by identity
    Delete,
    /// Equality lookup on an indexed field
    Search,
    /// Atomic add to a numeric field
    IncrementCounter,
    /// Search-then-delete loop
    BulkDelete,
    /// Static self-description
    Describe,
    /// Liveness check
    Ping,
}

impl Operation {
    /// All operations, in canonical order.
    pub const ALL: [Operation; 10] = [
        Operation::List,
        Operation::Get,
        Operation::Create,
        Operation::Update,
        Operation::Delete,
        Operation::Search,
        Operation::IncrementCounter,
        Operation::BulkDelete,
        Operation::Describe,
        Operation::Ping,
    ];

    /// Wire name of the operation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::List => "list",
            Operation::Get => "get",
            Operation::Create => "create",
            Operation::Update => "update",
            Operation::Delete => "delete",
            Operation::Search => "search",
            Operation::IncrementCounter => "increment_counter",
            Operation::BulkDelete => "bulk_delete",
            Operation::Describe => "describe",
            Operation::Ping => "ping",
        }
    }

    /// Whether the operation can modify stored records.
    pub fn is_write(&self) -> bool {
        matches!(
            self,
            Operation::Create
                | Operation::Update
                | Operation::Delete
                | Operation::IncrementCounter
                | Operation::BulkDelete
        )
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = UnknownOperation;

    /// Case-insensitive; surrounding whitespace is ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase();
        Operation::ALL
            .iter()
            .copied()
            .find(|op| op.as_str() == name)
            .ok_or(UnknownOperation { name })
    }
}
