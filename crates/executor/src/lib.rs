//! CRUD facade, response envelope and dispatch for crudtable.
//!
//! # Overview
//!
//! ```text
//! payload ──► Crud::handler ──► Command ──► Crud::execute ──► Crud::<op>
//!                                                               │
//!             prototype check · encryption · TableBackend call ◄┘
//!                                                               │
//! Response ◄──────────────── normalize · prepare ◄──────────────┘
//! ```
//!
//! Direct callers use the [`Crud`] methods; remote callers send a payload
//! through [`Crud::handle_payload`] or a [`RemoteClient`]. Either way the
//! result is a [`Response`].
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use crudtable_executor::{Crud, CrudConfig};
//! use crudtable_storage::{MemoryTable, TableSchema};
//!
//! let table = Arc::new(MemoryTable::new("users", TableSchema::with_hash_key("id")));
//! let crud = Crud::builder(CrudConfig::new("users"))
//!     .backend(table)
//!     .build()
//!     .unwrap();
//! assert!(crud.ping().is_successful());
//! ```

#![warn(missing_docs)]

mod convert;

pub mod command;
pub mod config;
pub mod crud;
pub mod describe;
pub mod dispatch;
pub mod error;
pub mod registry;
pub mod remote;
pub mod response;

pub use command::{Args, Command, ParamError};
pub use config::CrudConfig;
pub use crud::{Crud, CrudBuilder};
pub use describe::{OperationSpec, ParamKind, ParamSpec, OPERATIONS};
pub use error::{Error, Result, TransportError};
pub use registry::IndexRegistry;
pub use remote::{LocalTransport, RemoteClient, Transport};
pub use response::{FlatResponse, RawResponse, Response, Status};
