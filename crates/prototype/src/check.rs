//! Checking records against a template.
//!
//! [`PrototypeTemplate::check`] takes the record by value and hands back the
//! resolved record together with the verdict. Fields are visited in name
//! order and checking stops at the first failure; whatever was injected or
//! generated before that point stays in the returned record. There is no
//! rollback.

use std::fmt;

use crudtable_core::{Record, Value, ValueType};
use thiserror::Error;

use crate::template::{FieldRule, PrototypeTemplate};

/// Write lifecycle a check runs for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lifecycle {
    /// New record
    Create,
    /// Replacement of an existing record
    Update,
}

impl Lifecycle {
    /// Lowercase name, as used in computed tokens.
    pub fn as_str(&self) -> &'static str {
        match self {
            Lifecycle::Create => "create",
            Lifecycle::Update => "update",
        }
    }
}

impl fmt::Display for Lifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A field failed its rule.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PrototypeError {
    /// Present value has the wrong type.
    #[error("Invalid type for field '{field}': expected {expected}, got {actual}")]
    InvalidType {
        /// Offending field
        field: String,
        /// Type required by the rule
        expected: ValueType,
        /// Type of the value found
        actual: ValueType,
    },
}

impl PrototypeError {
    /// Field the error is about.
    pub fn field(&self) -> &str {
        match self {
            PrototypeError::InvalidType { field, .. } => field,
        }
    }
}

/// Result of [`PrototypeTemplate::check`]
#[derive(Debug, Clone, PartialEq)]
pub struct CheckOutcome {
    /// The record with every resolution applied before the check stopped
    pub record: Record,
    /// `Ok` when every field passed
    pub result: Result<(), PrototypeError>,
}

impl CheckOutcome {
    /// True when every field passed.
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

impl PrototypeTemplate {
    /// Validate and resolve `record` for `lifecycle`.
    pub fn check(&self, mut record: Record, lifecycle: Lifecycle) -> CheckOutcome {
        let result = self
            .fields
            .iter()
            .try_for_each(|(field, rule)| rule.apply(field, &mut record, lifecycle));
        if let Err(ref err) = result {
            tracing::debug!(
                target: "crudtable::prototype",
                lifecycle = %lifecycle,
                field = err.field(),
                "prototype check failed"
            );
        }
        CheckOutcome { record, result }
    }
}

impl FieldRule {
    fn apply(
        &self,
        field: &str,
        record: &mut Record,
        lifecycle: Lifecycle,
    ) -> Result<(), PrototypeError> {
        match self {
            FieldRule::TypeConstraint(expected) => match record.get(field) {
                Some(value) => ensure_type(field, *expected, value),
                None => {
                    record.insert(field.to_string(), expected.zero_value());
                    Ok(())
                }
            },
            FieldRule::StaticDefault(default) => match record.get(field) {
                Some(value) => ensure_type(field, default.value_type(), value),
                None => {
                    record.insert(field.to_string(), default.clone());
                    Ok(())
                }
            },
            FieldRule::ComputedOnCreate(generator) => {
                if lifecycle == Lifecycle::Create {
                    record.insert(field.to_string(), generator.generate());
                }
                Ok(())
            }
            FieldRule::ComputedOnUpdate(generator) => {
                if lifecycle == Lifecycle::Update {
                    record.insert(field.to_string(), generator.generate());
                }
                Ok(())
            }
        }
    }
}

fn ensure_type(field: &str, expected: ValueType, value: &Value) -> Result<(), PrototypeError> {
    let actual = value.value_type();
    if actual == expected {
        Ok(())
    } else {
        Err(PrototypeError::InvalidType {
            field: field.to_string(),
            expected,
            actual,
        })
    }
}
