//! Computed-value generators and the `<on-LIFECYCLE:GENERATOR>` token syntax.
//!
//! A template value such as `"<on-create:uuid>"` means "on create, set this
//! field to a fresh UUID". Tokens are parsed once when the template is built;
//! a string that only looks like a token (unknown lifecycle or generator) is
//! not a token and is treated as a plain default by the template.

use std::fmt;
use std::str::FromStr;

use chrono::Utc;
use crudtable_core::Value;
use uuid::Uuid;

use crate::check::Lifecycle;

/// Named value generator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Generator {
    /// Random v4 UUID, lowercase hyphenated string
    Uuid,
    /// Current time in milliseconds since the Unix epoch, integer
    Timestamp,
}

impl Generator {
    /// Token name of the generator.
    pub fn as_str(&self) -> &'static str {
        match self {
            Generator::Uuid => "uuid",
            Generator::Timestamp => "timestamp",
        }
    }

    /// Produce a fresh value.
    pub fn generate(&self) -> Value {
        match self {
            Generator::Uuid => Value::String(Uuid::new_v4().to_string()),
            Generator::Timestamp => Value::Int(Utc::now().timestamp_millis()),
        }
    }
}

impl fmt::Display for Generator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Generator {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "uuid" => Ok(Generator::Uuid),
            "timestamp" => Ok(Generator::Timestamp),
            _ => Err(()),
        }
    }
}

/// Parse `<on-create:uuid>` style tokens.
///
/// Returns `None` for anything that is not a well-formed token with a known
/// lifecycle and generator.
pub fn parse_computed_token(token: &str) -> Option<(Lifecycle, Generator)> {
    let body = token.strip_prefix("<on-")?.strip_suffix('>')?;
    let (lifecycle, generator) = body.split_once(':')?;
    if lifecycle.is_empty()
        || generator.is_empty()
        || body.chars().any(char::is_whitespace)
    {
        return None;
    }
    let lifecycle = match lifecycle {
        "create" => Lifecycle::Create,
        "update" => Lifecycle::Update,
        _ => return None,
    };
    let generator = generator.parse().ok()?;
    Some((lifecycle, generator))
}

/// Render a computed rule back into its token form.
pub fn computed_token(lifecycle: Lifecycle, generator: Generator) -> String {
    format!("<on-{}:{}>", lifecycle, generator)
}
