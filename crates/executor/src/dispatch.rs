//! Remote-invocation dispatch.
//!
//! [`Crud::handler`] is the single entry point for payload-driven calls: it
//! resolves the operation name, checks the allow-list, extracts a typed
//! [`Command`] and runs it through [`Crud::execute`].

use crudtable_core::{ErrorKind, Operation};

use crate::command::{Args, Command};
use crate::crud::{reject_unsupported, Crud};
use crate::response::Response;

impl Crud {
    /// Run a typed command.
    pub fn execute(&self, command: Command) -> Response {
        match command {
            Command::List => self.list(),
            Command::Get { id, decrypt } => self.get(id, decrypt),
            Command::Create { item } => self.create(item),
            Command::Update { item } => self.update(item),
            Command::Delete { id } => self.delete(id),
            Command::Search { query } => self.search(&query),
            Command::IncrementCounter {
                id,
                counter_name,
                increment,
            } => self.increment_counter(id, &counter_name, increment),
            Command::BulkDelete { query } => self.bulk_delete(&query),
            Command::Describe => self.describe(),
            Command::Ping => self.ping(),
        }
    }

    /// Dispatch `operation` with loosely typed `args`.
    ///
    /// The operation name is case-insensitive. Unknown and disallowed
    /// operations both fail with `UnsupportedOperation`; missing or
    /// malformed arguments fail with `MissingParameter`.
    pub fn handler(&self, operation: Option<&str>, args: &Args) -> Response {
        let mut response = Response::new(self.config().debug);

        let name = match operation.map(str::trim) {
            Some(name) if !name.is_empty() => name.to_lowercase(),
            _ => {
                response.fail(ErrorKind::MissingOperation, "No operation was given");
                return response;
            }
        };

        let op = match name.parse::<Operation>() {
            Ok(op) if self.supported_operations().contains(op) => op,
            _ => {
                tracing::debug!(target: "crudtable::executor", operation = %name, "rejected operation");
                reject_unsupported(&mut response, &name);
                return response;
            }
        };

        match Command::from_args(op, args, &self.config().id_name) {
            Ok(command) => self.execute(command),
            Err(err) => {
                response.fail(ErrorKind::MissingParameter, err.to_string());
                response
            }
        }
    }

    /// Handle a JSON payload `{"operation": ..., <args>}` and return the
    /// flattened envelope as JSON.
    pub fn handle_payload(&self, payload: serde_json::Value) -> serde_json::Value {
        let mut args = match payload {
            serde_json::Value::Object(map) => map,
            _ => Args::new(),
        };
        let operation = args.remove("operation");
        let response = self.handler(operation.as_ref().and_then(|v| v.as_str()), &args);
        response.to_json()
    }
}
