//! Deployment configuration.
//!
//! A [`CrudConfig`] is plain data: it names the table, the identity field,
//! the prototype definition, the allow-list and the encrypted attributes.
//! Files are read as TOML or JSON depending on their extension.

use std::path::Path;

use crudtable_core::Record;
use crudtable_security::{EncryptedAttribute, OperationSet};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

fn default_id_name() -> String {
    "id".to_string()
}

/// Configuration of one [`Crud`](crate::Crud) deployment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrudConfig {
    /// Backing table
    pub table_name: String,
    /// Credential profile, passed through to the backend unchanged
    #[serde(default)]
    pub profile_name: Option<String>,
    /// Backend region, passed through unchanged
    #[serde(default)]
    pub region_name: Option<String>,
    /// Identity field; must be the table's hash key
    #[serde(default = "default_id_name")]
    pub id_name: String,
    /// Prototype definition, see [`PrototypeTemplate::from_definition`](crudtable_prototype::PrototypeTemplate::from_definition)
    #[serde(default)]
    pub prototype: Record,
    /// Allowed operation names; all operations when absent
    #[serde(default)]
    pub supported_ops: Option<Vec<String>>,
    /// Attributes encrypted at rest
    #[serde(default)]
    pub encrypted_attributes: Vec<EncryptedAttribute>,
    /// Keep raw backend replies in responses
    #[serde(default)]
    pub debug: bool,
}

impl CrudConfig {
    /// Minimal configuration for `table_name`.
    pub fn new(table_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            profile_name: None,
            region_name: None,
            id_name: default_id_name(),
            prototype: Record::new(),
            supported_ops: None,
            encrypted_attributes: Vec::new(),
            debug: false,
        }
    }

    /// Set the identity field.
    pub fn with_id_name(mut self, id_name: impl Into<String>) -> Self {
        self.id_name = id_name.into();
        self
    }

    /// Set the prototype definition.
    pub fn with_prototype(mut self, prototype: Record) -> Self {
        self.prototype = prototype;
        self
    }

    /// Restrict the allowed operations.
    pub fn with_supported_ops<I, S>(mut self, ops: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.supported_ops = Some(ops.into_iter().map(Into::into).collect());
        self
    }

    /// Encrypt `attribute` with `key_id`.
    pub fn with_encrypted_attribute(
        mut self,
        attribute: impl Into<String>,
        key_id: impl Into<String>,
    ) -> Self {
        self.encrypted_attributes
            .push(EncryptedAttribute::new(attribute, key_id));
        self
    }

    /// Enable debug mode.
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Resolve `supported_ops` into an allow-list.
    pub fn operation_set(&self) -> Result<OperationSet> {
        match &self.supported_ops {
            None => Ok(OperationSet::all()),
            Some(names) => Ok(OperationSet::from_names(names)?),
        }
    }

    /// Load a configuration file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        load(path)
    }
}

/// Deserialize a `.toml` or `.json` file into any configuration type.
pub fn load<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|e| Error::Config {
        reason: format!("cannot read {}: {}", path.display(), e),
    })?;
    let parsed = match path.extension().and_then(|e| e.to_str()) {
        Some("toml") => toml::from_str(&text).map_err(|e| e.to_string()),
        Some("json") => serde_json::from_str(&text).map_err(|e| e.to_string()),
        _ => Err("expected a .toml or .json file".to_string()),
    };
    parsed.map_err(|reason| Error::Config {
        reason: format!("{}: {}", path.display(), reason),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crudtable_core::{Operation, Value};
    use std::io::Write;

    fn write(suffix: &str, body: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(body.as_bytes()).unwrap();
        file
    }

    #[test]
    fn defaults() {
        let config: CrudConfig = serde_json::from_str(r#"{"table_name": "users"}"#).unwrap();
        assert_eq!(config, CrudConfig::new("users"));
        assert_eq!(config.id_name, "id");
        assert!(!config.debug);
        assert_eq!(config.operation_set().unwrap(), OperationSet::all());
    }

    #[test]
    fn loads_toml() {
        let file = write(
            ".toml",
            r#"
table_name = "users"
region_name = "eu-west-1"
supported_ops = ["list", "get"]
encrypted_attributes = [["ssn", "alias/pii"]]
debug = true

[prototype]
id = "<on-create:uuid>"
age = "<type:int>"
status = "active"
"#,
        );
        let config = CrudConfig::from_path(file.path()).unwrap();
        assert_eq!(config.region_name.as_deref(), Some("eu-west-1"));
        assert!(config.debug);
        let ops = config.operation_set().unwrap();
        assert!(ops.contains(Operation::Get));
        assert!(!ops.contains(Operation::Create));
        assert_eq!(
            config.encrypted_attributes,
            vec![EncryptedAttribute::new("ssn", "alias/pii")]
        );
        assert_eq!(config.prototype["status"], Value::from("active"));
        assert_eq!(config.prototype["age"], Value::from("<type:int>"));
    }

    #[test]
    fn loads_json() {
        let file = write(
            ".json",
            r#"{"table_name": "t", "id_name": "pk", "prototype": {"n": 1}}"#,
        );
        let config = CrudConfig::from_path(file.path()).unwrap();
        assert_eq!(config.id_name, "pk");
        assert_eq!(config.prototype["n"], Value::Int(1));
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let file = write(".yaml", "table_name: t");
        assert!(matches!(
            CrudConfig::from_path(file.path()),
            Err(Error::Config { .. })
        ));
    }

    #[test]
    fn missing_table_name_is_rejected() {
        let file = write(".json", r#"{"id_name": "id"}"#);
        assert!(matches!(
            CrudConfig::from_path(file.path()),
            Err(Error::Config { .. })
        ));
    }

    #[test]
    fn unknown_operation_is_a_config_error() {
        let config = CrudConfig::new("t").with_supported_ops(["list", "frobnicate"]);
        assert!(matches!(
            config.operation_set(),
            Err(Error::UnknownOperation(_))
        ));
    }
}
