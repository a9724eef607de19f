//! Response envelope
//!
//! Every facade operation returns a [`Response`]. Callers check
//! [`Response::is_successful`] instead of matching on error types; failures
//! are described by a free-form `error_type` (one of the [`ErrorKind`] names
//! or a type name passed through from the backend) plus an optional code and
//! message.
//!
//! On the wire the envelope is a [`FlatResponse`]. The raw backend payload
//! and the debug flag never leave the process.

use crudtable_core::{ErrorKind, Value};
use crudtable_storage::CallMetadata;
use serde::{Deserialize, Serialize};

/// Outcome of an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// Operation completed
    Success,
    /// Operation failed; see the error fields
    Error,
}

impl Status {
    /// Wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Success => "success",
            Status::Error => "error",
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reply of the last backend call an operation made
#[derive(Debug, Clone, PartialEq)]
pub struct RawResponse {
    /// Backend call name, e.g. `GetItem`
    pub call: &'static str,
    /// Returned payload; only captured in debug mode
    pub payload: Value,
    /// Call diagnostics
    pub metadata: CallMetadata,
}

/// Uniform result envelope
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    /// Outcome
    pub status: Status,
    /// Operation result; `Null` when there is none
    pub data: Value,
    /// Symbolic error kind or pass-through type name
    pub error_type: Option<String>,
    /// Backend error code, when the failure came with one
    pub error_code: Option<String>,
    /// Human readable explanation
    pub error_message: Option<String>,
    /// Raw backend reply; kept after [`Response::prepare`] only in debug mode
    pub raw_response: Option<RawResponse>,
    /// Backend call metadata, filled by [`Response::prepare`]
    pub metadata: Option<CallMetadata>,
    debug: bool,
}

impl Response {
    /// A successful, empty envelope.
    pub fn new(debug: bool) -> Self {
        Self {
            status: Status::Success,
            data: Value::Null,
            error_type: None,
            error_code: None,
            error_message: None,
            raw_response: None,
            metadata: None,
            debug,
        }
    }

    /// Whether the raw backend reply survives [`Response::prepare`].
    pub fn debug(&self) -> bool {
        self.debug
    }

    /// `true` while no failure has been recorded.
    pub fn is_successful(&self) -> bool {
        self.status == Status::Success
    }

    /// The error type as an [`ErrorKind`], when it is one.
    pub fn error_kind(&self) -> Option<ErrorKind> {
        self.error_type.as_deref().and_then(|t| t.parse().ok())
    }

    /// Record a failure of one of this layer's own kinds.
    pub fn fail(&mut self, kind: ErrorKind, message: impl Into<String>) {
        self.fail_with(kind.as_str(), None, message);
    }

    /// Record a failure with a free-form type and optional code.
    ///
    /// Only the first failure is kept.
    pub fn fail_with(
        &mut self,
        error_type: impl Into<String>,
        error_code: Option<String>,
        message: impl Into<String>,
    ) {
        if self.status == Status::Error {
            return;
        }
        self.status = Status::Error;
        self.error_type = Some(error_type.into());
        self.error_code = error_code;
        self.error_message = Some(message.into());
    }

    /// Remember the reply of a backend call.
    pub fn set_raw(&mut self, raw: RawResponse) {
        self.raw_response = Some(raw);
    }

    /// Finish the envelope before it is returned.
    ///
    /// On success, copies the raw reply's metadata into `metadata` and drops
    /// the raw reply unless in debug mode. Does nothing on error or when no
    /// backend call was made; calling it twice is the same as calling it once.
    pub fn prepare(&mut self) {
        if self.status != Status::Success {
            return;
        }
        let Some(raw) = self.raw_response.take() else {
            return;
        };
        self.metadata = Some(raw.metadata.clone());
        if self.debug {
            self.raw_response = Some(raw);
        }
    }

    /// Wire form of the envelope.
    pub fn flatten(&self) -> FlatResponse {
        FlatResponse {
            status: self.status,
            data: self.data.clone(),
            error_type: self.error_type.clone(),
            error_code: self.error_code.clone(),
            error_message: self.error_message.clone(),
            metadata: self.metadata.clone(),
        }
    }

    /// Rebuild an envelope received over a transport.
    pub fn from_flat(flat: FlatResponse) -> Self {
        Self {
            status: flat.status,
            data: flat.data,
            error_type: flat.error_type,
            error_code: flat.error_code,
            error_message: flat.error_message,
            raw_response: None,
            metadata: flat.metadata,
            debug: false,
        }
    }

    /// Rebuild an envelope from its JSON wire form.
    pub fn from_json(json: serde_json::Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(json).map(Self::from_flat)
    }

    /// JSON wire form.
    pub fn to_json(&self) -> serde_json::Value {
        match serde_json::to_value(self.flatten()) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!(target: "crudtable::executor", error = %e, "envelope did not serialize");
                serde_json::json!({
                    "status": Status::Error.as_str(),
                    "data": null,
                    "error_type": "SerializationError",
                    "error_code": null,
                    "error_message": e.to_string(),
                    "metadata": null,
                })
            }
        }
    }
}

impl std::fmt::Display for Response {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.status {
            Status::Success => write!(f, "success: {}", self.data.to_json_string()),
            Status::Error => write!(
                f,
                "error: {}: {}",
                self.error_type.as_deref().unwrap_or("Unknown"),
                self.error_message.as_deref().unwrap_or("")
            ),
        }
    }
}

/// Serializable envelope, the wire shape of [`Response`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlatResponse {
    /// Outcome
    pub status: Status,
    /// Operation result
    #[serde(default = "null")]
    pub data: Value,
    /// Error type
    #[serde(default)]
    pub error_type: Option<String>,
    /// Error code
    #[serde(default)]
    pub error_code: Option<String>,
    /// Error message
    #[serde(default)]
    pub error_message: Option<String>,
    /// Backend call metadata
    #[serde(default)]
    pub metadata: Option<CallMetadata>,
}

fn null() -> Value {
    Value::Null
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw() -> RawResponse {
        RawResponse {
            call: "GetItem",
            payload: Value::from("payload"),
            metadata: CallMetadata::ok(),
        }
    }

    #[test]
    fn new_is_successful_and_empty() {
        let r = Response::new(false);
        assert!(r.is_successful());
        assert_eq!(r.data, Value::Null);
        assert!(r.error_type.is_none());
        assert!(r.metadata.is_none());
    }

    #[test]
    fn first_failure_wins() {
        let mut r = Response::new(false);
        r.fail(ErrorKind::IdRequired, "Get requires an id");
        r.fail_with("ValidationException", Some("400".into()), "later");
        assert_eq!(r.status, Status::Error);
        assert_eq!(r.error_type.as_deref(), Some("IDRequired"));
        assert_eq!(r.error_kind(), Some(ErrorKind::IdRequired));
        assert_eq!(r.error_code, None);
        assert_eq!(r.error_message.as_deref(), Some("Get requires an id"));
    }

    #[test]
    fn pass_through_type_is_not_a_kind() {
        let mut r = Response::new(false);
        r.fail_with("Sender", Some("ValidationException".into()), "bad");
        assert_eq!(r.error_kind(), None);
        assert_eq!(r.error_type.as_deref(), Some("Sender"));
    }

    #[test]
    fn prepare_moves_metadata_and_drops_raw() {
        let mut r = Response::new(false);
        let raw = raw();
        let expected = raw.metadata.clone();
        r.set_raw(raw);
        r.prepare();
        assert_eq!(r.metadata, Some(expected));
        assert!(r.raw_response.is_none());
    }

    #[test]
    fn prepare_keeps_raw_in_debug_mode() {
        let mut r = Response::new(true);
        r.set_raw(raw());
        r.prepare();
        assert!(r.metadata.is_some());
        assert_eq!(r.raw_response.as_ref().map(|raw| raw.call), Some("GetItem"));
    }

    #[test]
    fn prepare_is_idempotent() {
        let mut r = Response::new(true);
        r.set_raw(raw());
        r.prepare();
        let once = r.clone();
        r.prepare();
        assert_eq!(r, once);
    }

    #[test]
    fn prepare_ignores_errors_and_missing_raw() {
        let mut r = Response::new(false);
        r.prepare();
        assert!(r.metadata.is_none());

        let mut r = Response::new(false);
        r.set_raw(raw());
        r.fail(ErrorKind::NotFound, "gone");
        r.prepare();
        assert!(r.metadata.is_none());
        assert!(r.raw_response.is_some());
    }

    #[test]
    fn flatten_carries_every_wire_field() {
        let mut r = Response::new(true);
        r.set_raw(raw());
        r.fail_with("Sender", Some("ValidationException".into()), "bad key");
        let json = r.to_json();
        let obj = json.as_object().unwrap();
        assert_eq!(obj.len(), 6);
        assert_eq!(obj["status"], "error");
        assert_eq!(obj["data"], serde_json::Value::Null);
        assert_eq!(obj["error_type"], "Sender");
        assert_eq!(obj["error_code"], "ValidationException");
        assert_eq!(obj["error_message"], "bad key");
        assert_eq!(obj["metadata"], serde_json::Value::Null);
        assert!(!obj.contains_key("raw_response"));
        assert!(!obj.contains_key("debug"));
    }

    #[test]
    fn to_json_writes_metadata_fields() {
        let mut r = Response::new(false);
        r.data = Value::from(vec![Value::Int(1), Value::from("a")]);
        r.set_raw(raw());
        r.prepare();
        let json = r.to_json();
        assert_eq!(json["data"], serde_json::json!([1, "a"]));
        let metadata = json["metadata"].as_object().unwrap();
        assert_eq!(metadata.len(), 3);
        assert_eq!(metadata["http_status_code"], 200);
        assert_eq!(metadata["retry_attempts"], 0);
        assert!(metadata["request_id"].is_string());
    }

    #[test]
    fn from_json_rebuilds_envelope() {
        let mut r = Response::new(false);
        r.data = Value::from(true);
        r.set_raw(raw());
        r.prepare();
        let back = Response::from_json(r.to_json()).unwrap();
        assert_eq!(back, r);
    }

    #[test]
    fn from_json_tolerates_missing_optional_fields() {
        let back = Response::from_json(serde_json::json!({"status": "success"})).unwrap();
        assert!(back.is_successful());
        assert_eq!(back.data, Value::Null);
    }

    #[test]
    fn from_json_rejects_non_envelopes() {
        assert!(Response::from_json(serde_json::json!({"hello": 1})).is_err());
        assert!(Response::from_json(serde_json::json!({"status": "maybe"})).is_err());
    }
}
