//! Error taxonomy carried by response envelopes
//!
//! Envelope errors are symbolic kinds, not Rust error types: they cross the
//! remote boundary as plain strings in `error_type`. Failures reported by the
//! backing store or the key service keep their own type names verbatim, so
//! `error_type` is a free string and [`ErrorKind`] covers only the kinds this
//! layer raises itself.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Error kinds raised by the access layer itself
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Operation is not in the configured allow-list (or not known at all)
    UnsupportedOperation,
    /// Invocation payload carried no operation name
    MissingOperation,
    /// A required invocation argument is missing or has the wrong shape
    MissingParameter,
    /// Operation needs an identity value and got none
    #[serde(rename = "IDRequired")]
    IdRequired,
    /// No record with the requested identity
    NotFound,
    /// Search query is malformed or targets an unindexed field
    InvalidQuery,
    /// A field value has the wrong type for its prototype rule
    InvalidType,
    /// Record lacks an attribute the operation cannot do without
    MissingRequiredAttributes,
}

impl ErrorKind {
    /// All kinds.
    pub const ALL: [ErrorKind; 8] = [
        ErrorKind::UnsupportedOperation,
        ErrorKind::MissingOperation,
        ErrorKind::MissingParameter,
        ErrorKind::IdRequired,
        ErrorKind::NotFound,
        ErrorKind::InvalidQuery,
        ErrorKind::InvalidType,
        ErrorKind::MissingRequiredAttributes,
    ];

    /// Name as written into `error_type`.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::UnsupportedOperation => "UnsupportedOperation",
            ErrorKind::MissingOperation => "MissingOperation",
            ErrorKind::MissingParameter => "MissingParameter",
            ErrorKind::IdRequired => "IDRequired",
            ErrorKind::NotFound => "NotFound",
            ErrorKind::InvalidQuery => "InvalidQuery",
            ErrorKind::InvalidType => "InvalidType",
            ErrorKind::MissingRequiredAttributes => "MissingRequiredAttributes",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ErrorKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ErrorKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or(())
    }
}
