//! Prototype engine
//!
//! Validates and normalizes records against a declarative [`PrototypeTemplate`]:
//! static defaults, type constraints, and values computed only on a given
//! write lifecycle (`<on-create:uuid>`, `<on-update:timestamp>`).

#![warn(missing_docs)]

pub mod check;
pub mod generator;
pub mod template;

pub use check::{CheckOutcome, Lifecycle, PrototypeError};
pub use generator::{parse_computed_token, Generator};
pub use template::{FieldRule, PrototypeTemplate, TemplateError};
