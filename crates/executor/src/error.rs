//! Construction and transport errors.
//!
//! Operation failures never surface as Rust errors; they are reported inside
//! a [`Response`](crate::Response). The types here cover the two places a
//! caller does get a `Result`: building a [`Crud`](crate::Crud) and talking
//! to a remote handler.

use crudtable_core::UnknownOperation;
use crudtable_prototype::TemplateError;
use crudtable_storage::BackendError;
use thiserror::Error;

/// Result type for facade construction and configuration loading
pub type Result<T> = std::result::Result<T, Error>;

/// Failure building a [`Crud`](crate::Crud)
#[derive(Debug, Error)]
pub enum Error {
    /// The table key schema does not have exactly one element.
    #[error("table must have a single hash key, found {count} key elements")]
    KeySchema {
        /// Number of key elements found
        count: usize,
    },

    /// The table hash key is not the configured identity field.
    #[error("table hash key is '{actual}' but id_name is '{expected}'")]
    KeyName {
        /// Configured `id_name`
        expected: String,
        /// Hash key of the table
        actual: String,
    },

    /// The prototype definition is invalid.
    #[error(transparent)]
    Template(#[from] TemplateError),

    /// `supported_ops` names an operation that does not exist.
    #[error(transparent)]
    UnknownOperation(#[from] UnknownOperation),

    /// Encrypted attributes are configured but no key service was given.
    #[error("encrypted attributes {attributes:?} require a key service")]
    MissingKeyService {
        /// Attributes that would need encrypting
        attributes: Vec<String>,
    },

    /// Configuration could not be read or parsed.
    #[error("configuration error: {reason}")]
    Config {
        /// What went wrong
        reason: String,
    },

    /// The backend could not describe its table.
    #[error("backend error: {0}")]
    Backend(#[from] BackendError),
}

/// Failure invoking a remote handler
#[derive(Debug, Error)]
pub enum TransportError {
    /// The request or reply could not be serialized.
    #[error("serialization failed: {reason}")]
    Serialization {
        /// What went wrong
        reason: String,
    },

    /// The reply was not a response envelope.
    #[error("reply is not a response envelope: {reason}")]
    InvalidReply {
        /// What went wrong
        reason: String,
    },

    /// The transport could not deliver the call.
    #[error("invocation failed: {reason}")]
    Invocation {
        /// What went wrong
        reason: String,
    },
}

impl From<serde_json::Error> for TransportError {
    fn from(e: serde_json::Error) -> Self {
        TransportError::Serialization {
            reason: e.to_string(),
        }
    }
}
