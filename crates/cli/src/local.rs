//! Local deployment wiring.
//!
//! The CLI runs the handler in-process against a [`MemoryTable`], optionally
//! backed by a JSON snapshot file, and a [`LocalKeyService`].

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use crudtable_executor::{Crud, CrudConfig};
use crudtable_security::LocalKeyService;
use crudtable_storage::{MemoryTable, TableSchema};
use serde::Deserialize;

/// Configuration file: the deployment plus an optional `[local]` section
#[derive(Debug, Clone, Deserialize)]
pub struct CliConfig {
    #[serde(flatten)]
    pub crud: CrudConfig,
    #[serde(default)]
    pub local: LocalSection,
}

/// Settings used only by the in-process substitutes
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LocalSection {
    /// Table key layout; a single hash key on `id_name` when absent
    #[serde(default)]
    pub schema: Option<TableSchema>,
    /// Key id to key material
    #[serde(default)]
    pub keys: BTreeMap<String, String>,
}

/// A facade wired to local collaborators
pub struct LocalDeployment {
    pub crud: Crud,
    table: Arc<MemoryTable>,
    snapshot: Option<PathBuf>,
}

impl LocalDeployment {
    /// Load `config_path` and build the facade, loading `snapshot` if given.
    pub fn open(config_path: &Path, snapshot: Option<PathBuf>) -> anyhow::Result<Self> {
        let config: CliConfig = crudtable_executor::config::load(config_path)
            .with_context(|| format!("loading {}", config_path.display()))?;
        Self::from_config(config, snapshot)
    }

    pub fn from_config(config: CliConfig, snapshot: Option<PathBuf>) -> anyhow::Result<Self> {
        let schema = config
            .local
            .schema
            .unwrap_or_else(|| TableSchema::with_hash_key(config.crud.id_name.clone()));
        let table = Arc::new(MemoryTable::new(config.crud.table_name.clone(), schema));
        if let Some(path) = &snapshot {
            table.load_snapshot(path)?;
        }

        let keys = LocalKeyService::new();
        for (key_id, material) in &config.local.keys {
            keys.add_key(key_id.clone(), material);
        }

        let crud = Crud::builder(config.crud)
            .backend(table.clone())
            .key_service(Arc::new(keys))
            .build()
            .context("building facade")?;
        Ok(Self {
            crud,
            table,
            snapshot,
        })
    }

    /// Write the table back to the snapshot file, if there is one.
    pub fn save(&self) -> anyhow::Result<()> {
        if let Some(path) = &self.snapshot {
            self.table.save_snapshot(path)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(toml_text: &str) -> CliConfig {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("crud.toml");
        std::fs::write(&path, toml_text).unwrap();
        crudtable_executor::config::load(&path).unwrap()
    }

    #[test]
    fn local_section_is_optional() {
        let config = parse("table_name = \"t\"\n");
        assert_eq!(config.crud.table_name, "t");
        assert!(config.local.schema.is_none());
        assert!(config.local.keys.is_empty());
    }

    #[test]
    fn local_section_configures_schema_and_keys() {
        let config = parse(
            r#"
table_name = "users"
encrypted_attributes = [["ssn", "pii"]]

[local.keys]
pii = "local secret"

[local.schema]
key_schema = [{ attribute_name = "id", key_type = "HASH" }]

[[local.schema.global_secondary_indexes]]
index_name = "status-index"
key_schema = [{ attribute_name = "status", key_type = "HASH" }]
"#,
        );
        assert_eq!(config.local.keys["pii"], "local secret");
        let deployment = LocalDeployment::from_config(config, None).unwrap();
        assert_eq!(
            deployment.crud.indexes().lookup("status"),
            Some(Some("status-index"))
        );
    }

    #[test]
    fn snapshot_is_loaded_and_saved() {
        let dir = tempfile::tempdir().unwrap();
        let data = dir.path().join("data.json");
        let config = parse("table_name = \"t\"\n");

        let deployment = LocalDeployment::from_config(config.clone(), Some(data.clone())).unwrap();
        let mut item = crudtable_core::Record::new();
        item.insert("id".into(), "a".into());
        assert!(deployment.crud.create(item).is_successful());
        deployment.save().unwrap();

        let reopened = LocalDeployment::from_config(config, Some(data)).unwrap();
        assert!(reopened.crud.get("a", false).is_successful());
    }
}
