//! Static operation registry.
//!
//! One [`OperationSpec`] per operation, in canonical order. Used by
//! `describe` and by front ends that want to list what a deployment offers.

use crudtable_core::{Operation, Record, Value};

/// Kind of an invocation argument
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    /// Record object
    Object,
    /// Identity value (string or number)
    Id,
    /// Free text
    String,
    /// Whole number
    Integer,
    /// Flag
    Bool,
}

impl ParamKind {
    /// Display name.
    pub fn as_str(&self) -> &'static str {
        match self {
            ParamKind::Object => "object",
            ParamKind::Id => "id",
            ParamKind::String => "string",
            ParamKind::Integer => "integer",
            ParamKind::Bool => "bool",
        }
    }
}

/// One invocation argument
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamSpec {
    /// Argument key in the payload
    pub name: &'static str,
    /// Expected shape
    pub kind: ParamKind,
    /// Whether dispatch rejects a payload without it
    pub required: bool,
}

/// Metadata of one operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperationSpec {
    /// The operation
    pub operation: Operation,
    /// One line description
    pub summary: &'static str,
    /// Accepted arguments
    pub params: &'static [ParamSpec],
}

const fn required(name: &'static str, kind: ParamKind) -> ParamSpec {
    ParamSpec {
        name,
        kind,
        required: true,
    }
}

const fn optional(name: &'static str, kind: ParamKind) -> ParamSpec {
    ParamSpec {
        name,
        kind,
        required: false,
    }
}

/// Every operation, in [`Operation::ALL`] order.
pub static OPERATIONS: [OperationSpec; 10] = [
    OperationSpec {
        operation: Operation::List,
        summary: "Return every record in the table",
        params: &[],
    },
    OperationSpec {
        operation: Operation::Get,
        summary: "Fetch one record by id, optionally decrypting sensitive attributes",
        params: &[required("id", ParamKind::Id), optional("decrypt", ParamKind::Bool)],
    },
    OperationSpec {
        operation: Operation::Create,
        summary: "Resolve a new record against the prototype and store it",
        params: &[required("item", ParamKind::Object)],
    },
    OperationSpec {
        operation: Operation::Update,
        summary: "Resolve an existing record against the prototype and replace it",
        params: &[required("item", ParamKind::Object)],
    },
    OperationSpec {
        operation: Operation::Delete,
        summary: "Remove one record by id",
        params: &[required("id", ParamKind::Id)],
    },
    OperationSpec {
        operation: Operation::Search,
        summary: "Find records by field=value on an indexed field",
        params: &[required("query", ParamKind::String)],
    },
    OperationSpec {
        operation: Operation::IncrementCounter,
        summary: "Atomically add to a numeric attribute",
        params: &[
            required("id", ParamKind::Id),
            required("counter_name", ParamKind::String),
            optional("increment", ParamKind::Integer),
        ],
    },
    OperationSpec {
        operation: Operation::BulkDelete,
        summary: "Delete every record matching field=value",
        params: &[required("query", ParamKind::String)],
    },
    OperationSpec {
        operation: Operation::Describe,
        summary: "Describe this deployment",
        params: &[],
    },
    OperationSpec {
        operation: Operation::Ping,
        summary: "Check that the handler answers",
        params: &[],
    },
];

/// Metadata of `op`.
pub fn spec(op: Operation) -> &'static OperationSpec {
    let index = match op {
        Operation::List => 0,
        Operation::Get => 1,
        Operation::Create => 2,
        Operation::Update => 3,
        Operation::Delete => 4,
        Operation::Search => 5,
        Operation::IncrementCounter => 6,
        Operation::BulkDelete => 7,
        Operation::Describe => 8,
        Operation::Ping => 9,
    };
    &OPERATIONS[index]
}

impl OperationSpec {
    /// `{name, summary, params: [{name, type, required}]}`
    pub fn to_value(&self) -> Value {
        let params = self
            .params
            .iter()
            .map(|p| {
                let mut param = Record::new();
                param.insert("name".into(), p.name.into());
                param.insert("type".into(), p.kind.as_str().into());
                param.insert("required".into(), p.required.into());
                Value::Map(param)
            })
            .collect::<Vec<_>>();

        let mut map = Record::new();
        map.insert("name".into(), self.operation.as_str().into());
        map.insert("summary".into(), self.summary.into());
        map.insert("params".into(), Value::List(params));
        Value::Map(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_follows_canonical_order() {
        for (spec, op) in OPERATIONS.iter().zip(Operation::ALL) {
            assert_eq!(spec.operation, op);
        }
    }

    #[test]
    fn every_operation_has_its_own_spec() {
        for op in Operation::ALL {
            assert_eq!(spec(op).operation, op);
        }
    }

    #[test]
    fn spec_lookup() {
        let s = spec(Operation::IncrementCounter);
        assert_eq!(s.operation, Operation::IncrementCounter);
        let names: Vec<_> = s.params.iter().map(|p| p.name).collect();
        assert_eq!(names, ["id", "counter_name", "increment"]);
        assert!(!s.params[2].required);
    }

    #[test]
    fn to_value_shape() {
        let value = spec(Operation::Get).to_value();
        let map = value.as_map().unwrap();
        assert_eq!(map["name"], Value::from("get"));
        match &map["params"] {
            Value::List(params) => {
                assert_eq!(params.len(), 2);
                let first = params[0].as_map().unwrap();
                assert_eq!(first["name"], Value::from("id"));
                assert_eq!(first["required"], Value::Bool(true));
            }
            other => panic!("params should be a list, got {:?}", other),
        }
    }
}
