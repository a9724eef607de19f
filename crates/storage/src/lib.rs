//! Storage collaborator for crudtable
//!
//! The access layer talks to its backing table only through [`TableBackend`].
//! [`MemoryTable`] is the in-process implementation.

#![warn(missing_docs)]

pub mod backend;
pub mod memory;
pub mod schema;

pub use backend::{
    BackendError, BackendOutput, BackendResult, CallMetadata, QueryRequest, TableBackend,
};
pub use memory::MemoryTable;
pub use schema::{IndexSchema, KeyElement, KeyType, TableSchema};
