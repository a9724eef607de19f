//! Table key schema
//!
//! Mirrors what a managed table reports about itself: the primary key
//! elements and the secondary indexes with their own key elements.

use serde::{Deserialize, Serialize};

/// Role of a key element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum KeyType {
    /// Partition key
    Hash,
    /// Sort key
    Range,
}

/// One attribute of a key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyElement {
    /// Attribute name
    pub attribute_name: String,
    /// Hash or range
    pub key_type: KeyType,
}

impl KeyElement {
    /// Hash key element on `attribute`.
    pub fn hash(attribute: impl Into<String>) -> Self {
        Self {
            attribute_name: attribute.into(),
            key_type: KeyType::Hash,
        }
    }

    /// Range key element on `attribute`.
    pub fn range(attribute: impl Into<String>) -> Self {
        Self {
            attribute_name: attribute.into(),
            key_type: KeyType::Range,
        }
    }
}

/// Global secondary index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexSchema {
    /// Index name used in queries
    pub index_name: String,
    /// Index key elements
    pub key_schema: Vec<KeyElement>,
}

/// Key layout of a table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    /// Primary key elements
    pub key_schema: Vec<KeyElement>,
    /// Secondary indexes
    #[serde(default)]
    pub global_secondary_indexes: Vec<IndexSchema>,
}

impl TableSchema {
    /// Table keyed by a single hash attribute.
    pub fn with_hash_key(attribute: impl Into<String>) -> Self {
        Self {
            key_schema: vec![KeyElement::hash(attribute)],
            global_secondary_indexes: Vec::new(),
        }
    }

    /// Add a secondary index with a single hash attribute.
    pub fn with_index(mut self, index_name: impl Into<String>, attribute: impl Into<String>) -> Self {
        self.global_secondary_indexes.push(IndexSchema {
            index_name: index_name.into(),
            key_schema: vec![KeyElement::hash(attribute)],
        });
        self
    }

    /// The primary hash attribute, if the schema has one.
    pub fn hash_key(&self) -> Option<&str> {
        self.key_schema
            .iter()
            .find(|k| k.key_type == KeyType::Hash)
            .map(|k| k.attribute_name.as_str())
    }

    /// Index by name.
    pub fn index(&self, index_name: &str) -> Option<&IndexSchema> {
        self.global_secondary_indexes
            .iter()
            .find(|i| i.index_name == index_name)
    }
}

impl IndexSchema {
    /// The index's hash attribute.
    pub fn hash_key(&self) -> Option<&str> {
        self.key_schema
            .iter()
            .find(|k| k.key_type == KeyType::Hash)
            .map(|k| k.attribute_name.as_str())
    }
}
