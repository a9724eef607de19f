//! Dynamic record values
//!
//! A record is an open mapping from field name to [`Value`]. The backing store
//! keeps every number as an arbitrary-precision [`Decimal`]; every read path
//! runs [`Value::normalize`] so callers only ever see `Int` or `Float`.
//!
//! `Value` serializes to and from plain JSON:
//! - integers that fit in i64 become `Int`, other numbers `Float` or `Decimal`
//! - decimals are normalized before being written out

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One stored item: field name to value.
pub type Record = BTreeMap<String, Value>;

/// Errors raised while converting values between representations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValueError {
    /// NaN, infinities and magnitudes beyond the decimal range.
    #[error("number {value} cannot be stored as a decimal")]
    UnrepresentableNumber {
        /// The offending value
        value: f64,
    },

    /// Type name not recognized by [`ValueType::from_str`].
    #[error("unknown value type '{name}'")]
    UnknownType {
        /// The name as written
        name: String,
    },
}

/// Dynamically typed record value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "serde_json::Value", into = "serde_json::Value")]
pub enum Value {
    /// Explicit null
    Null,
    /// Boolean
    Bool(bool),
    /// Whole number
    Int(i64),
    /// Floating point number
    Float(f64),
    /// Backend numeric representation, see [`Value::normalize`]
    Decimal(Decimal),
    /// UTF-8 string
    String(String),
    /// Ordered sequence
    List(Vec<Value>),
    /// Nested mapping
    Map(Record),
}

/// Runtime type of a [`Value`], as seen by prototype type checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    /// `null`
    Null,
    /// `true` / `false`
    Bool,
    /// Whole numbers, including whole decimals
    Integer,
    /// Fractional numbers, including fractional decimals
    Float,
    /// Strings
    String,
    /// Lists
    List,
    /// Maps
    Map,
}

impl ValueType {
    /// Canonical lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueType::Null => "null",
            ValueType::Bool => "bool",
            ValueType::Integer => "integer",
            ValueType::Float => "float",
            ValueType::String => "string",
            ValueType::List => "list",
            ValueType::Map => "map",
        }
    }

    /// The value injected for an absent field constrained to this type.
    pub fn zero_value(&self) -> Value {
        match self {
            ValueType::Null => Value::Null,
            ValueType::Bool => Value::Bool(false),
            ValueType::Integer => Value::Int(0),
            ValueType::Float => Value::Float(0.0),
            ValueType::String => Value::String(String::new()),
            ValueType::List => Value::List(Vec::new()),
            ValueType::Map => Value::Map(Record::new()),
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ValueType {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "null" | "none" => Ok(ValueType::Null),
            "bool" | "boolean" => Ok(ValueType::Bool),
            "int" | "integer" => Ok(ValueType::Integer),
            "float" | "number" => Ok(ValueType::Float),
            "str" | "string" => Ok(ValueType::String),
            "list" | "array" => Ok(ValueType::List),
            "map" | "object" | "dict" => Ok(ValueType::Map),
            _ => Err(ValueError::UnknownType {
                name: s.to_string(),
            }),
        }
    }
}

impl Value {
    /// Runtime type of this value.
    ///
    /// A decimal counts as an integer when it has no fractional part.
    pub fn value_type(&self) -> ValueType {
        match self {
            Value::Null => ValueType::Null,
            Value::Bool(_) => ValueType::Bool,
            Value::Int(_) => ValueType::Integer,
            Value::Float(_) => ValueType::Float,
            Value::Decimal(d) if d.fract().is_zero() => ValueType::Integer,
            Value::Decimal(_) => ValueType::Float,
            Value::String(_) => ValueType::String,
            Value::List(_) => ValueType::List,
            Value::Map(_) => ValueType::Map,
        }
    }

    /// Returns true for [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Borrow the string payload, if this is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Borrow the map payload, if this is a map.
    pub fn as_map(&self) -> Option<&Record> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Integer view of a whole number (`Int` or whole `Decimal`).
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            Value::Decimal(d) if d.fract().is_zero() => d.to_i64(),
            _ => None,
        }
    }

    /// Decimal view of any numeric value. Non-finite floats have none.
    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            Value::Int(i) => Some(Decimal::from(*i)),
            Value::Float(f) => Decimal::from_f64(*f),
            Value::Decimal(d) => Some(*d),
            _ => None,
        }
    }

    /// Replace backend decimals with `Int` (whole) or `Float` (fractional),
    /// recursing through lists and maps.
    pub fn normalize(self) -> Value {
        match self {
            Value::Decimal(d) => normalize_decimal(d),
            Value::List(items) => Value::List(items.into_iter().map(Value::normalize).collect()),
            Value::Map(map) => Value::Map(normalize_record(map)),
            other => other,
        }
    }

    /// Convert every number into the backend's decimal representation,
    /// recursing through lists and maps.
    pub fn decimalize(self) -> Result<Value, ValueError> {
        match self {
            Value::Int(i) => Ok(Value::Decimal(Decimal::from(i))),
            Value::Float(f) => Decimal::from_f64(f)
                .map(Value::Decimal)
                .ok_or(ValueError::UnrepresentableNumber { value: f }),
            Value::List(items) => items
                .into_iter()
                .map(Value::decimalize)
                .collect::<Result<Vec<_>, _>>()
                .map(Value::List),
            Value::Map(map) => decimalize_record(map).map(Value::Map),
            other => Ok(other),
        }
    }

    /// Compact JSON text of this value.
    pub fn to_json_string(&self) -> String {
        serde_json::Value::from(self.clone()).to_string()
    }
}

/// [`Value::normalize`] applied to every field of a record.
pub fn normalize_record(record: Record) -> Record {
    record
        .into_iter()
        .map(|(k, v)| (k, v.normalize()))
        .collect()
}

/// [`Value::decimalize`] applied to every field of a record.
pub fn decimalize_record(record: Record) -> Result<Record, ValueError> {
    record
        .into_iter()
        .map(|(k, v)| v.decimalize().map(|v| (k, v)))
        .collect()
}

fn normalize_decimal(d: Decimal) -> Value {
    if d.fract().is_zero() {
        if let Some(i) = d.to_i64() {
            return Value::Int(i);
        }
    }
    // Decimal -> f64 is always representable (possibly rounded).
    Value::Float(d.to_f64().unwrap_or(f64::NAN))
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // Bare strings read better in messages than quoted JSON.
            Value::String(s) => f.write_str(s),
            other => f.write_str(&other.to_json_string()),
        }
    }
}

// =============================================================================
// JSON conversions
// =============================================================================

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Int(i)
                } else if let Some(u) = n.as_u64() {
                    Value::Decimal(Decimal::from(u))
                } else {
                    Value::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => {
                Value::Map(map.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

impl From<Value> for serde_json::Value {
    fn from(v: Value) -> Self {
        match v.normalize() {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(b),
            Value::Int(i) => serde_json::Value::Number(i.into()),
            Value::Float(f) => serde_json::Number::from_f64(f)
                .map_or(serde_json::Value::Null, serde_json::Value::Number),
            // normalize() never leaves a decimal behind
            Value::Decimal(_) => serde_json::Value::Null,
            Value::String(s) => serde_json::Value::String(s),
            Value::List(items) => {
                serde_json::Value::Array(items.into_iter().map(serde_json::Value::from).collect())
            }
            Value::Map(map) => serde_json::Value::Object(
                map.into_iter()
                    .map(|(k, v)| (k, serde_json::Value::from(v)))
                    .collect(),
            ),
        }
    }
}

// From implementations for common types
impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v.into())
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<Decimal> for Value {
    fn from(v: Decimal) -> Self {
        Value::Decimal(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::List(v)
    }
}

impl From<Record> for Value {
    fn from(v: Record) -> Self {
        Value::Map(v)
    }
}
