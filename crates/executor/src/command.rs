//! Typed invocation commands.
//!
//! A remote payload is an operation name plus loosely typed arguments.
//! [`Command::from_args`] turns the pair into one enum variant per operation,
//! so the dispatcher can `match` exhaustively and the facade never sees an
//! untyped argument.

use crudtable_core::{Operation, Record, Value};
use thiserror::Error;

/// Loosely typed invocation arguments
pub type Args = serde_json::Map<String, serde_json::Value>;

/// An argument is missing or has the wrong shape
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParamError {
    /// Required argument absent.
    #[error("{operation} operation requires the '{name}' parameter")]
    Missing {
        /// Operation being dispatched
        operation: Operation,
        /// Argument key
        name: String,
    },

    /// Argument present with the wrong shape.
    #[error("parameter '{name}' must be {expected}")]
    Invalid {
        /// Argument key
        name: String,
        /// Expected shape
        expected: &'static str,
    },
}

/// One operation with its arguments
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Full scan
    List,
    /// Lookup by identity; `Null` id means none was given
    Get {
        /// Identity value
        id: Value,
        /// Decrypt sensitive attributes
        decrypt: bool,
    },
    /// Insert
    Create {
        /// Record to store
        item: Record,
    },
    /// Replace
    Update {
        /// Record to store
        item: Record,
    },
    /// Remove by identity
    Delete {
        /// Identity value
        id: Value,
    },
    /// Equality search
    Search {
        /// `field=value`
        query: String,
    },
    /// Atomic add
    IncrementCounter {
        /// Identity value
        id: Value,
        /// Numeric attribute
        counter_name: String,
        /// Amount to add
        increment: i64,
    },
    /// Search-then-delete
    BulkDelete {
        /// `field=value`
        query: String,
    },
    /// Self-description
    Describe,
    /// Liveness check
    Ping,
}

impl Command {
    /// The operation this command runs.
    pub fn operation(&self) -> Operation {
        match self {
            Command::List => Operation::List,
            Command::Get { .. } => Operation::Get,
            Command::Create { .. } => Operation::Create,
            Command::Update { .. } => Operation::Update,
            Command::Delete { .. } => Operation::Delete,
            Command::Search { .. } => Operation::Search,
            Command::IncrementCounter { .. } => Operation::IncrementCounter,
            Command::BulkDelete { .. } => Operation::BulkDelete,
            Command::Describe => Operation::Describe,
            Command::Ping => Operation::Ping,
        }
    }

    /// Extract the arguments `op` needs. Unused keys are ignored.
    ///
    /// The identity value is read from `id` or, failing that, from the
    /// configured identity field name.
    pub fn from_args(op: Operation, args: &Args, id_name: &str) -> Result<Command, ParamError> {
        let extractor = Extractor { op, args, id_name };
        let command = match op {
            Operation::List => Command::List,
            Operation::Get => Command::Get {
                id: extractor.id()?,
                decrypt: extractor.optional_bool("decrypt")?.unwrap_or(false),
            },
            Operation::Create => Command::Create {
                item: extractor.record("item")?,
            },
            Operation::Update => Command::Update {
                item: extractor.record("item")?,
            },
            Operation::Delete => Command::Delete {
                id: extractor.id()?,
            },
            Operation::Search => Command::Search {
                query: extractor.string("query")?,
            },
            Operation::IncrementCounter => Command::IncrementCounter {
                id: extractor.id()?,
                counter_name: extractor.string("counter_name")?,
                increment: extractor.optional_i64("increment")?.unwrap_or(1),
            },
            Operation::BulkDelete => Command::BulkDelete {
                query: extractor.string("query")?,
            },
            Operation::Describe => Command::Describe,
            Operation::Ping => Command::Ping,
        };
        Ok(command)
    }

    /// Payload form: `{"operation": ..., <args>}`.
    pub fn to_payload(&self, id_name: &str) -> serde_json::Value {
        let mut payload = Args::new();
        payload.insert("operation".into(), self.operation().as_str().into());
        match self {
            Command::List | Command::Describe | Command::Ping => {}
            Command::Get { id, decrypt } => {
                payload.insert(id_name.into(), id.clone().into());
                payload.insert("decrypt".into(), (*decrypt).into());
            }
            Command::Create { item } | Command::Update { item } => {
                payload.insert("item".into(), Value::Map(item.clone()).into());
            }
            Command::Delete { id } => {
                payload.insert(id_name.into(), id.clone().into());
            }
            Command::Search { query } | Command::BulkDelete { query } => {
                payload.insert("query".into(), query.as_str().into());
            }
            Command::IncrementCounter {
                id,
                counter_name,
                increment,
            } => {
                payload.insert(id_name.into(), id.clone().into());
                payload.insert("counter_name".into(), counter_name.as_str().into());
                payload.insert("increment".into(), (*increment).into());
            }
        }
        serde_json::Value::Object(payload)
    }
}

struct Extractor<'a> {
    op: Operation,
    args: &'a Args,
    id_name: &'a str,
}

impl Extractor<'_> {
    fn missing(&self, name: &str) -> ParamError {
        ParamError::Missing {
            operation: self.op,
            name: name.to_string(),
        }
    }

    fn required(&self, name: &str) -> Result<&serde_json::Value, ParamError> {
        self.args.get(name).ok_or_else(|| self.missing(name))
    }

    fn id(&self) -> Result<Value, ParamError> {
        let raw = self
            .args
            .get("id")
            .or_else(|| self.args.get(self.id_name))
            .ok_or_else(|| self.missing("id"))?;
        match raw {
            serde_json::Value::Null
            | serde_json::Value::String(_)
            | serde_json::Value::Number(_) => Ok(Value::from(raw.clone())),
            _ => Err(invalid("id", "a string or number")),
        }
    }

    fn record(&self, name: &str) -> Result<Record, ParamError> {
        match Value::from(self.required(name)?.clone()) {
            Value::Map(record) => Ok(record),
            _ => Err(invalid(name, "an object")),
        }
    }

    fn string(&self, name: &str) -> Result<String, ParamError> {
        self.required(name)?
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| invalid(name, "a string"))
    }

    fn optional_bool(&self, name: &str) -> Result<Option<bool>, ParamError> {
        match self.args.get(name) {
            None | Some(serde_json::Value::Null) => Ok(None),
            Some(v) => v.as_bool().map(Some).ok_or_else(|| invalid(name, "a boolean")),
        }
    }

    fn optional_i64(&self, name: &str) -> Result<Option<i64>, ParamError> {
        match self.args.get(name) {
            None | Some(serde_json::Value::Null) => Ok(None),
            Some(v) => v.as_i64().map(Some).ok_or_else(|| invalid(name, "an integer")),
        }
    }
}

fn invalid(name: &str, expected: &'static str) -> ParamError {
    ParamError::Invalid {
        name: name.to_string(),
        expected,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn args(value: serde_json::Value) -> Args {
        match value {
            serde_json::Value::Object(map) => map,
            _ => panic!("args must be an object"),
        }
    }

    #[test]
    fn get_with_defaults() {
        let cmd = Command::from_args(Operation::Get, &args(json!({"id": "a1"})), "id").unwrap();
        assert_eq!(
            cmd,
            Command::Get {
                id: Value::from("a1"),
                decrypt: false
            }
        );
    }

    #[test]
    fn id_falls_back_to_id_name() {
        let cmd =
            Command::from_args(Operation::Delete, &args(json!({"user_id": 7})), "user_id").unwrap();
        assert_eq!(cmd, Command::Delete { id: Value::Int(7) });
    }

    #[test]
    fn null_id_is_passed_through() {
        let cmd = Command::from_args(Operation::Get, &args(json!({"id": null})), "id").unwrap();
        assert_eq!(
            cmd,
            Command::Get {
                id: Value::Null,
                decrypt: false
            }
        );
    }

    #[test]
    fn missing_required_argument() {
        let err = Command::from_args(Operation::Create, &Args::new(), "id").unwrap_err();
        assert_eq!(
            err,
            ParamError::Missing {
                operation: Operation::Create,
                name: "item".into()
            }
        );
        assert_eq!(err.to_string(), "create operation requires the 'item' parameter");
    }

    #[test]
    fn wrong_shapes_are_rejected() {
        let cases = [
            (Operation::Create, json!({"item": [1, 2]}), "item"),
            (Operation::Search, json!({"query": 5}), "query"),
            (Operation::Get, json!({"id": "x", "decrypt": "yes"}), "decrypt"),
            (
                Operation::IncrementCounter,
                json!({"id": "x", "counter_name": "n", "increment": 1.5}),
                "increment",
            ),
            (Operation::Delete, json!({"id": {"nested": true}}), "id"),
        ];
        for (op, payload, key) in cases {
            match Command::from_args(op, &args(payload), "id") {
                Err(ParamError::Invalid { name, .. }) => assert_eq!(name, key),
                other => panic!("{}: expected Invalid({}), got {:?}", op, key, other),
            }
        }
    }

    #[test]
    fn increment_defaults_to_one() {
        let cmd = Command::from_args(
            Operation::IncrementCounter,
            &args(json!({"id": "x", "counter_name": "views"})),
            "id",
        )
        .unwrap();
        assert_eq!(
            cmd,
            Command::IncrementCounter {
                id: Value::from("x"),
                counter_name: "views".into(),
                increment: 1
            }
        );
    }

    #[test]
    fn extra_keys_are_ignored() {
        let cmd = Command::from_args(Operation::Ping, &args(json!({"junk": 1})), "id").unwrap();
        assert_eq!(cmd, Command::Ping);
    }

    #[test]
    fn payload_parses_back() {
        let cmd = Command::IncrementCounter {
            id: Value::from("x"),
            counter_name: "views".into(),
            increment: 3,
        };
        let payload = cmd.to_payload("id");
        let mut map = args(payload);
        assert_eq!(map.remove("operation"), Some(json!("increment_counter")));
        assert_eq!(
            Command::from_args(Operation::IncrementCounter, &map, "id").unwrap(),
            cmd
        );
    }
}
