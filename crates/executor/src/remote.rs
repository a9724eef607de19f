//! Remote invocation adapter.
//!
//! A [`RemoteClient`] turns method calls into JSON payloads, hands them to a
//! [`Transport`] and rebuilds the [`Response`] from the reply. The transport
//! only moves bytes; a function-as-a-service invoker would implement it the
//! same way [`LocalTransport`] does in-process.

use std::sync::Arc;

use crudtable_core::{Record, Value};

use crate::command::{Args, Command};
use crate::crud::Crud;
use crate::error::TransportError;
use crate::response::Response;

/// Moves an encoded payload to a handler and returns the encoded reply
pub trait Transport: Send + Sync {
    /// Deliver `payload` (JSON text) and return the reply (JSON text).
    fn invoke(&self, payload: &[u8]) -> Result<Vec<u8>, TransportError>;
}

/// Transport that calls a [`Crud`] handler in the same process.
///
/// Payloads still go through JSON text both ways, so anything that would not
/// survive a real transport fails here too.
#[derive(Debug, Clone)]
pub struct LocalTransport {
    crud: Arc<Crud>,
}

impl LocalTransport {
    /// Transport delivering to `crud`.
    pub fn new(crud: Arc<Crud>) -> Self {
        Self { crud }
    }
}

impl Transport for LocalTransport {
    fn invoke(&self, payload: &[u8]) -> Result<Vec<u8>, TransportError> {
        let payload: serde_json::Value = serde_json::from_slice(payload)?;
        let reply = self.crud.handle_payload(payload);
        Ok(serde_json::to_vec(&reply)?)
    }
}

/// Client for a remote CRUD handler
#[derive(Debug, Clone)]
pub struct RemoteClient<T: Transport> {
    transport: T,
}

impl<T: Transport> RemoteClient<T> {
    /// Client over `transport`.
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    /// Invoke `operation` with raw arguments.
    pub fn call_operation(&self, operation: &str, args: Args) -> Result<Response, TransportError> {
        let mut payload = args;
        payload.insert("operation".into(), operation.into());
        self.send(serde_json::Value::Object(payload))
    }

    fn call(&self, command: Command) -> Result<Response, TransportError> {
        self.send(command.to_payload("id"))
    }

    fn send(&self, payload: serde_json::Value) -> Result<Response, TransportError> {
        tracing::trace!(target: "crudtable::remote", %payload, "invoking");
        let request = serde_json::to_vec(&payload)?;
        let reply = self.transport.invoke(&request)?;
        let reply: serde_json::Value =
            serde_json::from_slice(&reply).map_err(|e| TransportError::InvalidReply {
                reason: e.to_string(),
            })?;
        Response::from_json(reply).map_err(|e| TransportError::InvalidReply {
            reason: e.to_string(),
        })
    }

    /// Every record.
    pub fn list(&self) -> Result<Response, TransportError> {
        self.call(Command::List)
    }

    /// One record by id.
    pub fn get(&self, id: impl Into<Value>, decrypt: bool) -> Result<Response, TransportError> {
        self.call(Command::Get {
            id: id.into(),
            decrypt,
        })
    }

    /// Create a record.
    pub fn create(&self, item: Record) -> Result<Response, TransportError> {
        self.call(Command::Create { item })
    }

    /// Replace a record.
    pub fn update(&self, item: Record) -> Result<Response, TransportError> {
        self.call(Command::Update { item })
    }

    /// Remove a record by id.
    pub fn delete(&self, id: impl Into<Value>) -> Result<Response, TransportError> {
        self.call(Command::Delete { id: id.into() })
    }

    /// Equality search, `field=value`.
    pub fn search(&self, query: &str) -> Result<Response, TransportError> {
        self.call(Command::Search {
            query: query.to_string(),
        })
    }

    /// Atomic add to a counter attribute.
    pub fn increment(
        &self,
        id: impl Into<Value>,
        counter_name: &str,
        increment: i64,
    ) -> Result<Response, TransportError> {
        self.call(Command::IncrementCounter {
            id: id.into(),
            counter_name: counter_name.to_string(),
            increment,
        })
    }

    /// Delete every record matching `field=value`.
    pub fn bulk_delete(&self, query: &str) -> Result<Response, TransportError> {
        self.call(Command::BulkDelete {
            query: query.to_string(),
        })
    }

    /// Deployment description.
    pub fn describe(&self) -> Result<Response, TransportError> {
        self.call(Command::Describe)
    }

    /// Liveness check.
    pub fn ping(&self) -> Result<Response, TransportError> {
        self.call(Command::Ping)
    }
}
