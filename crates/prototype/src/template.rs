//! Prototype templates
//!
//! A template maps field names to exactly one [`FieldRule`]. Templates are
//! built once, from code or from a definition map read out of configuration,
//! and never change afterwards.
//!
//! # Definition format
//!
//! | Definition value | Rule |
//! |------------------|------|
//! | `"<on-create:uuid>"`, `"<on-update:timestamp>"` | computed on that lifecycle |
//! | `"<type:integer>"` | type constraint |
//! | any other value | static default |

use std::collections::BTreeMap;

use crudtable_core::{Record, Value, ValueError, ValueType};
use thiserror::Error;

use crate::check::Lifecycle;
use crate::generator::{computed_token, parse_computed_token, Generator};

/// Error building a template from its definition.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TemplateError {
    /// `<type:NAME>` with a NAME that is not a known type.
    #[error("prototype field '{field}': {source}")]
    UnknownType {
        /// Field whose definition is wrong
        field: String,
        /// Underlying parse failure
        #[source]
        source: ValueError,
    },
}

/// Rule applied to a single field
#[derive(Debug, Clone, PartialEq)]
pub enum FieldRule {
    /// Present values must have this type; absent fields get its zero value.
    TypeConstraint(ValueType),
    /// Absent fields get this value; present values must share its type.
    StaticDefault(Value),
    /// Regenerated on every create, untouched on update.
    ComputedOnCreate(Generator),
    /// Regenerated on every update, untouched on create.
    ComputedOnUpdate(Generator),
}

impl FieldRule {
    /// Parse one definition value.
    pub fn parse(field: &str, definition: Value) -> Result<FieldRule, TemplateError> {
        let Value::String(text) = definition else {
            return Ok(FieldRule::StaticDefault(definition));
        };

        if let Some((lifecycle, generator)) = parse_computed_token(&text) {
            return Ok(match lifecycle {
                Lifecycle::Create => FieldRule::ComputedOnCreate(generator),
                Lifecycle::Update => FieldRule::ComputedOnUpdate(generator),
            });
        }

        if let Some(name) = text
            .strip_prefix("<type:")
            .and_then(|rest| rest.strip_suffix('>'))
        {
            let value_type = name
                .parse::<ValueType>()
                .map_err(|source| TemplateError::UnknownType {
                    field: field.to_string(),
                    source,
                })?;
            return Ok(FieldRule::TypeConstraint(value_type));
        }

        Ok(FieldRule::StaticDefault(Value::String(text)))
    }

    /// Render the rule in definition format.
    pub fn to_definition(&self) -> Value {
        match self {
            FieldRule::TypeConstraint(t) => Value::String(format!("<type:{}>", t)),
            FieldRule::StaticDefault(v) => v.clone(),
            FieldRule::ComputedOnCreate(g) => {
                Value::String(computed_token(Lifecycle::Create, *g))
            }
            FieldRule::ComputedOnUpdate(g) => {
                Value::String(computed_token(Lifecycle::Update, *g))
            }
        }
    }
}

/// Immutable field template applied on create and update
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PrototypeTemplate {
    pub(crate) fields: BTreeMap<String, FieldRule>,
}

impl PrototypeTemplate {
    /// Empty template; every record passes unchanged.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) the rule for a field.
    pub fn with_rule(mut self, field: impl Into<String>, rule: FieldRule) -> Self {
        self.fields.insert(field.into(), rule);
        self
    }

    /// Build a template from a definition map.
    pub fn from_definition(definition: Record) -> Result<Self, TemplateError> {
        let fields = definition
            .into_iter()
            .map(|(field, value)| FieldRule::parse(&field, value).map(|rule| (field, rule)))
            .collect::<Result<BTreeMap<_, _>, _>>()?;
        Ok(Self { fields })
    }

    /// Render the template in definition format.
    pub fn to_definition(&self) -> Record {
        self.fields
            .iter()
            .map(|(field, rule)| (field.clone(), rule.to_definition()))
            .collect()
    }

    /// Rule for a field, if any.
    pub fn rule(&self, field: &str) -> Option<&FieldRule> {
        self.fields.get(field)
    }

    /// Iterate rules in field-name order.
    pub fn rules(&self) -> impl Iterator<Item = (&str, &FieldRule)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of fields with a rule.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// True when no field has a rule.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
