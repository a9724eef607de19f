//! crudtable: a configurable CRUD access layer over a single-table key-value
//! store.
//!
//! A deployment is described by a [`CrudConfig`]: which operations are
//! allowed, the prototype new records are resolved against, which attributes
//! are encrypted at rest. [`Crud`] applies it to a [`TableBackend`] and
//! answers every call with a [`Response`] envelope, both for direct calls and
//! for payloads arriving through [`Crud::handle_payload`].
//!
//! ```
//! use std::sync::Arc;
//! use crudtable::{Crud, CrudConfig, MemoryTable, Record, TableSchema, Value};
//!
//! let mut prototype = Record::new();
//! prototype.insert("id".into(), Value::from("<on-create:uuid>"));
//! prototype.insert("status".into(), Value::from("active"));
//!
//! let table = Arc::new(MemoryTable::new("users", TableSchema::with_hash_key("id")));
//! let crud = Crud::builder(CrudConfig::new("users").with_prototype(prototype))
//!     .backend(table)
//!     .build()
//!     .unwrap();
//!
//! let created = crud.create(Record::new());
//! assert!(created.is_successful());
//! assert_eq!(created.data.as_map().unwrap()["status"], Value::from("active"));
//! ```

mod types;

pub use types::*;

