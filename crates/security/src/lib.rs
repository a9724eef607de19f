//! Access control and attribute encryption for crudtable.
//!
//! - [`OperationSet`]: which operations a deployment answers
//! - [`AttributeCipher`]: encrypts configured attributes through a [`KeyService`]
//! - [`LocalKeyService`]: in-process key service for tests and local use

#![warn(missing_docs)]

pub mod access;
pub mod encryption;
pub mod local;

pub use access::OperationSet;
pub use encryption::{AttributeCipher, CipherError, EncryptedAttribute, KeyService, KeyServiceError};
pub use local::LocalKeyService;
