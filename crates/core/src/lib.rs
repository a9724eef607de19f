//! Core types for crudtable
//!
//! - [`Value`] / [`Record`]: the dynamic record model and numeric normalization
//! - [`Operation`]: operation names shared by config, dispatch and describe
//! - [`ErrorKind`]: the symbolic error taxonomy of response envelopes

#![warn(missing_docs)]

pub mod error;
pub mod operation;
pub mod value;

pub use error::ErrorKind;
pub use operation::{Operation, UnknownOperation};
pub use value::{decimalize_record, normalize_record, Record, Value, ValueError, ValueType};
