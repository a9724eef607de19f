//! Searchable field registry.
//!
//! Maps each searchable field to the index that serves it. The identity field
//! is served by the table's own key (`None`); every secondary index whose key
//! is a single hash element serves its hash attribute. Indexes with a range
//! element are not searchable by equality on one field and are skipped.

use std::collections::BTreeMap;

use crudtable_storage::{KeyType, TableSchema};

use crate::error::{Error, Result};

/// Field name to serving index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexRegistry {
    fields: BTreeMap<String, Option<String>>,
}

impl IndexRegistry {
    /// Build the registry from a table description.
    ///
    /// Fails unless the table has exactly one key element, a hash key named
    /// `id_name`.
    pub fn from_schema(schema: &TableSchema, id_name: &str) -> Result<Self> {
        if schema.key_schema.len() != 1 {
            return Err(Error::KeySchema {
                count: schema.key_schema.len(),
            });
        }
        let key = &schema.key_schema[0];
        if key.key_type != KeyType::Hash || key.attribute_name != id_name {
            return Err(Error::KeyName {
                expected: id_name.to_string(),
                actual: key.attribute_name.clone(),
            });
        }

        let mut fields = BTreeMap::new();
        fields.insert(id_name.to_string(), None);
        for index in &schema.global_secondary_indexes {
            if let [element] = index.key_schema.as_slice() {
                if element.key_type == KeyType::Hash {
                    fields.insert(
                        element.attribute_name.clone(),
                        Some(index.index_name.clone()),
                    );
                }
            }
        }
        Ok(Self { fields })
    }

    /// Serving index of `field`: `None` when the field is not searchable,
    /// `Some(None)` for the table key, `Some(Some(name))` for an index.
    pub fn lookup(&self, field: &str) -> Option<Option<&str>> {
        self.fields.get(field).map(|index| index.as_deref())
    }

    /// Searchable fields with their serving index, in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.fields
            .iter()
            .map(|(field, index)| (field.as_str(), index.as_deref()))
    }

    /// Number of searchable fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Always `false` for a registry built from a valid schema.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
