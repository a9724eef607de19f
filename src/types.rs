//! Public types for the crudtable API.
//!
//! This module re-exports types from the workspace crates with a clean public
//! interface.

// ============================================================================
// Value model
// ============================================================================

pub use crudtable_core::{ErrorKind, Operation, Record, Value, ValueType};

// ============================================================================
// Prototype engine
// ============================================================================

pub use crudtable_prototype::{
    CheckOutcome, FieldRule, Generator, Lifecycle, PrototypeError, PrototypeTemplate,
    TemplateError,
};

// ============================================================================
// Collaborators
// ============================================================================

pub use crudtable_security::{
    AttributeCipher, EncryptedAttribute, KeyService, KeyServiceError, LocalKeyService,
    OperationSet,
};
pub use crudtable_storage::{
    BackendError, CallMetadata, KeyElement, MemoryTable, TableBackend, TableSchema,
};

// ============================================================================
// Facade, envelope and dispatch
// ============================================================================

pub use crudtable_executor::{
    Args, Command, Crud, CrudBuilder, CrudConfig, Error, FlatResponse, IndexRegistry,
    LocalTransport, RemoteClient, Response, Status, Transport, TransportError,
};
