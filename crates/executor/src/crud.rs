//! The CRUD facade.
//!
//! [`Crud`] owns everything a deployment needs: the backend handle, the
//! parsed prototype, the allow-list, the index registry and, when sensitive
//! attributes are configured, an [`AttributeCipher`]. Each public operation
//! returns a [`Response`] and never panics or returns `Err`.
//!
//! Every operation follows the same steps: fresh envelope, allow-list check,
//! the operation body, number normalization, [`Response::prepare`].

use std::sync::Arc;

use crudtable_core::{ErrorKind, Operation, Record, Value};
use crudtable_prototype::{CheckOutcome, Lifecycle, PrototypeTemplate};
use crudtable_security::{AttributeCipher, KeyService, OperationSet};
use crudtable_storage::{BackendResult, QueryRequest, TableBackend};
use tracing::Span;

use crate::config::CrudConfig;
use crate::convert::Fault;
use crate::describe;
use crate::error::{Error, Result};
use crate::registry::IndexRegistry;
use crate::response::{RawResponse, Response};

/// Builder for [`Crud`]
pub struct CrudBuilder {
    config: CrudConfig,
    backend: Option<Arc<dyn TableBackend>>,
    key_service: Option<Arc<dyn KeyService>>,
}

impl CrudBuilder {
    /// Backing table.
    pub fn backend(mut self, backend: Arc<dyn TableBackend>) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Key service for encrypted attributes.
    pub fn key_service(mut self, key_service: Arc<dyn KeyService>) -> Self {
        self.key_service = Some(key_service);
        self
    }

    /// Validate the configuration against the table and build the facade.
    pub fn build(self) -> Result<Crud> {
        let config = self.config;
        let backend = self.backend.ok_or_else(|| Error::Config {
            reason: "no backend configured".to_string(),
        })?;

        if backend.table_name() != config.table_name {
            tracing::warn!(
                target: "crudtable::executor",
                configured = %config.table_name,
                backend = %backend.table_name(),
                "backend table name differs from configuration"
            );
        }
        let schema = backend.describe_table()?;
        let indexes = IndexRegistry::from_schema(&schema, &config.id_name)?;
        let template = PrototypeTemplate::from_definition(config.prototype.clone())?;
        let supported = config.operation_set()?;

        let cipher = if config.encrypted_attributes.is_empty() {
            None
        } else {
            let service = self.key_service.ok_or_else(|| Error::MissingKeyService {
                attributes: config
                    .encrypted_attributes
                    .iter()
                    .map(|a| a.attribute.clone())
                    .collect(),
            })?;
            Some(AttributeCipher::new(
                config.encrypted_attributes.clone(),
                service,
            ))
        };

        let span = tracing::info_span!(
            target: "crudtable::executor",
            "crud",
            table = %config.table_name
        );
        tracing::debug!(
            target: "crudtable::executor",
            parent: &span,
            id_name = %config.id_name,
            indexes = indexes.len(),
            prototype_fields = template.len(),
            encrypted = config.encrypted_attributes.len(),
            "facade ready"
        );

        Ok(Crud {
            config,
            backend,
            template,
            supported,
            indexes,
            cipher,
            span,
        })
    }
}

/// Configured CRUD access layer over one table
pub struct Crud {
    config: CrudConfig,
    backend: Arc<dyn TableBackend>,
    template: PrototypeTemplate,
    supported: OperationSet,
    indexes: IndexRegistry,
    cipher: Option<AttributeCipher>,
    span: Span,
}

impl Crud {
    /// Start building a facade for `config`.
    pub fn builder(config: CrudConfig) -> CrudBuilder {
        CrudBuilder {
            config,
            backend: None,
            key_service: None,
        }
    }

    /// Configuration this facade was built from.
    pub fn config(&self) -> &CrudConfig {
        &self.config
    }

    /// Searchable fields.
    pub fn indexes(&self) -> &IndexRegistry {
        &self.indexes
    }

    /// Allowed operations.
    pub fn supported_operations(&self) -> &OperationSet {
        &self.supported
    }

    // =========================================================================
    // Operations
    // =========================================================================

    /// Every record in the table.
    pub fn list(&self) -> Response {
        self.run(Operation::List, |response| {
            let items = self.call(response, "Scan", self.backend.scan())?;
            Ok(records(items))
        })
    }

    /// Record with identity `id`. A `Null` id is treated as missing.
    pub fn get(&self, id: impl Into<Value>, decrypt: bool) -> Response {
        let id = id.into();
        self.run(Operation::Get, |response| {
            if id.is_null() {
                return Err(Fault::kind(ErrorKind::IdRequired, "Get requires an id"));
            }
            let item = self.call(response, "GetItem", self.backend.get_item(&id, true))?;
            let mut item = item.ok_or_else(|| {
                Fault::kind(
                    ErrorKind::NotFound,
                    format!("No item with {} '{}'", self.config.id_name, id),
                )
            })?;
            if decrypt {
                if let Some(cipher) = &self.cipher {
                    cipher.decrypt_record(&mut item)?;
                }
            }
            Ok(Value::Map(item))
        })
    }

    /// Resolve `item` for creation and store it.
    pub fn create(&self, item: Record) -> Response {
        self.run(Operation::Create, |response| {
            self.store(response, item, Lifecycle::Create)
        })
    }

    /// Resolve `item` for update and store it. `item` must carry its identity.
    pub fn update(&self, item: Record) -> Response {
        self.run(Operation::Update, |response| {
            if item.get(&self.config.id_name).map_or(true, Value::is_null) {
                return Err(Fault::kind(
                    ErrorKind::MissingRequiredAttributes,
                    format!("Update requires the '{}' attribute", self.config.id_name),
                ));
            }
            self.store(response, item, Lifecycle::Update)
        })
    }

    /// Remove the record with identity `id`. A `Null` id is treated as missing.
    pub fn delete(&self, id: impl Into<Value>) -> Response {
        let id = id.into();
        self.run(Operation::Delete, |response| self.remove(response, id))
    }

    /// Records whose indexed field equals a value, queried as `field=value`.
    pub fn search(&self, query: &str) -> Response {
        self.run(Operation::Search, |response| {
            self.query(response, query, None).map(records)
        })
    }

    /// Atomically add `increment` to the numeric attribute `counter_name`.
    /// Data is the new value.
    pub fn increment_counter(
        &self,
        id: impl Into<Value>,
        counter_name: &str,
        increment: i64,
    ) -> Response {
        let id = id.into();
        self.run(Operation::IncrementCounter, |response| {
            if id.is_null() {
                return Err(Fault::kind(
                    ErrorKind::IdRequired,
                    "Increment requires an id",
                ));
            }
            if counter_name.is_empty() {
                return Err(Fault::kind(
                    ErrorKind::MissingParameter,
                    "increment_counter requires a counter_name",
                ));
            }
            self.call(
                response,
                "UpdateItem",
                self.backend.add_to_attribute(&id, counter_name, increment),
            )
        })
    }

    /// Delete every record matching `field=value`. Data is `{"deleted": N}`.
    ///
    /// Searches and deletes in rounds until a search comes back empty. The
    /// first failing search or delete ends the operation with that failure.
    pub fn bulk_delete(&self, query: &str) -> Response {
        self.run(Operation::BulkDelete, |response| {
            let projection = vec![self.config.id_name.clone()];
            let mut deleted: i64 = 0;
            loop {
                let matches = self.query(response, query, Some(projection.clone()))?;
                if matches.is_empty() {
                    break;
                }
                for item in matches {
                    let id = item
                        .get(&self.config.id_name)
                        .cloned()
                        .unwrap_or(Value::Null);
                    self.remove(response, id)?;
                    deleted += 1;
                }
            }
            tracing::debug!(target: "crudtable::executor", query, deleted, "bulk delete finished");
            let mut data = Record::new();
            data.insert("deleted".to_string(), Value::Int(deleted));
            Ok(Value::Map(data))
        })
    }

    /// Static description of this deployment.
    pub fn describe(&self) -> Response {
        self.run(Operation::Describe, |_| Ok(self.description()))
    }

    /// Liveness check; data is `null`.
    pub fn ping(&self) -> Response {
        self.run(Operation::Ping, |_| Ok(Value::Null))
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn run<F>(&self, op: Operation, body: F) -> Response
    where
        F: FnOnce(&mut Response) -> std::result::Result<Value, Fault>,
    {
        let _entered = self.span.enter();
        let mut response = Response::new(self.config.debug);
        if !self.supported.contains(op) {
            tracing::debug!(target: "crudtable::executor", operation = %op, "operation not allowed");
            reject_unsupported(&mut response, op.as_str());
        } else {
            match body(&mut response) {
                Ok(data) => response.data = data.normalize(),
                Err(fault) => {
                    tracing::debug!(
                        target: "crudtable::executor",
                        operation = %op,
                        error_type = %fault.error_type,
                        message = %fault.message,
                        "operation failed"
                    );
                    fault.record(&mut response);
                }
            }
        }
        response.prepare();
        response
    }

    /// Unwrap a backend result, remembering its reply on the envelope.
    fn call<T: RawPayload>(
        &self,
        response: &mut Response,
        call: &'static str,
        result: BackendResult<T>,
    ) -> std::result::Result<T, Fault> {
        let output = result.map_err(Fault::from)?;
        let payload = if response.debug() {
            output.value.raw_payload()
        } else {
            Value::Null
        };
        response.set_raw(RawResponse {
            call,
            payload,
            metadata: output.metadata,
        });
        Ok(output.value)
    }

    fn store(
        &self,
        response: &mut Response,
        item: Record,
        lifecycle: Lifecycle,
    ) -> std::result::Result<Value, Fault> {
        let CheckOutcome { mut record, result } = self.template.check(item, lifecycle);
        result?;
        if let Some(cipher) = &self.cipher {
            cipher.encrypt_record(&mut record)?;
        }
        self.call(response, "PutItem", self.backend.put_item(record.clone()))?;
        Ok(Value::Map(record))
    }

    fn remove(&self, response: &mut Response, id: Value) -> std::result::Result<Value, Fault> {
        if id.is_null() {
            return Err(Fault::kind(ErrorKind::IdRequired, "Delete requires an id"));
        }
        self.call(response, "DeleteItem", self.backend.delete_item(&id))?;
        Ok(Value::Bool(true))
    }

    fn query(
        &self,
        response: &mut Response,
        query: &str,
        projection: Option<Vec<String>>,
    ) -> std::result::Result<Vec<Record>, Fault> {
        let (field, value) = parse_query(query)?;
        let index = self.indexes.lookup(field).ok_or_else(|| {
            Fault::kind(
                ErrorKind::InvalidQuery,
                format!("Attribute {} is not indexed", field),
            )
        })?;
        let request = QueryRequest {
            index_name: index.map(str::to_string),
            attribute: field.to_string(),
            value: Value::from(value),
            projection,
        };
        self.call(response, "Query", self.backend.query(&request))
    }

    fn description(&self) -> Value {
        let mut indexes = Record::new();
        for (field, index) in self.indexes.iter() {
            indexes.insert(field.to_string(), index.map_or(Value::Null, Value::from));
        }
        let encrypted = self
            .config
            .encrypted_attributes
            .iter()
            .map(|a| Value::List(vec![a.attribute.as_str().into(), a.key_id.as_str().into()]))
            .collect::<Vec<_>>();
        let operations = self
            .supported
            .iter()
            .map(|op| describe::spec(op).to_value())
            .collect::<Vec<_>>();
        let supported = self
            .supported
            .names()
            .into_iter()
            .map(Value::from)
            .collect::<Vec<_>>();

        let mut map = Record::new();
        map.insert("version".into(), env!("CARGO_PKG_VERSION").into());
        map.insert("table_name".into(), self.config.table_name.as_str().into());
        map.insert("id_name".into(), self.config.id_name.as_str().into());
        map.insert("supported_operations".into(), Value::List(supported));
        map.insert("prototype".into(), Value::Map(self.template.to_definition()));
        map.insert("encrypted_attributes".into(), Value::List(encrypted));
        map.insert("indexes".into(), Value::Map(indexes));
        map.insert("operations".into(), Value::List(operations));
        Value::Map(map)
    }
}

impl std::fmt::Debug for Crud {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Crud")
            .field("table_name", &self.config.table_name)
            .field("id_name", &self.config.id_name)
            .field("supported", &self.supported)
            .field("indexes", &self.indexes)
            .finish_non_exhaustive()
    }
}

/// Fail `response` for an operation that is unknown or not allowed.
pub(crate) fn reject_unsupported(response: &mut Response, name: &str) {
    response.fail(
        ErrorKind::UnsupportedOperation,
        format!("Unsupported operation: {}", name),
    );
}

/// Split `field=value`. Exactly one `=` and a non-empty field are required.
fn parse_query(query: &str) -> std::result::Result<(&str, &str), Fault> {
    let invalid = |message: &str| Fault::kind(ErrorKind::InvalidQuery, message);
    let (field, value) = query
        .split_once('=')
        .ok_or_else(|| invalid("Only the = operation is supported"))?;
    if value.contains('=') {
        return Err(invalid("A query must contain exactly one '='"));
    }
    let field = field.trim();
    if field.is_empty() {
        return Err(invalid("A query must name a field before '='"));
    }
    Ok((field, value.trim()))
}

fn records(items: Vec<Record>) -> Value {
    Value::List(items.into_iter().map(Value::Map).collect())
}

/// Backend reply as a [`Value`], captured in debug mode.
trait RawPayload {
    fn raw_payload(&self) -> Value;
}

impl RawPayload for () {
    fn raw_payload(&self) -> Value {
        Value::Null
    }
}

impl RawPayload for Value {
    fn raw_payload(&self) -> Value {
        self.clone()
    }
}

impl RawPayload for Option<Record> {
    fn raw_payload(&self) -> Value {
        self.clone().map_or(Value::Null, Value::Map)
    }
}

impl RawPayload for Vec<Record> {
    fn raw_payload(&self) -> Value {
        records(self.clone())
    }
}
