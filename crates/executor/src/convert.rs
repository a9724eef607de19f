//! Conversion of collaborator errors into envelope failures.
//!
//! Structured service errors are copied verbatim. Any other failure uses the
//! error variant's name as `error_type`, no code, and its display text.

use crudtable_core::ErrorKind;
use crudtable_prototype::PrototypeError;
use crudtable_security::{CipherError, KeyServiceError};
use crudtable_storage::BackendError;

use crate::response::Response;

/// A failure on its way into a [`Response`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Fault {
    pub(crate) error_type: String,
    pub(crate) error_code: Option<String>,
    pub(crate) message: String,
}

impl Fault {
    pub(crate) fn kind(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            error_type: kind.as_str().to_string(),
            error_code: None,
            message: message.into(),
        }
    }

    fn uncoded(variant: &str, message: String) -> Self {
        Self {
            error_type: variant.to_string(),
            error_code: None,
            message,
        }
    }

    pub(crate) fn record(self, response: &mut Response) {
        response.fail_with(self.error_type, self.error_code, self.message);
    }
}

impl From<BackendError> for Fault {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::Service {
                code,
                error_type,
                message,
            } => Fault {
                error_type,
                error_code: Some(code),
                message,
            },
            other => Fault::uncoded(other.variant_name(), other.to_string()),
        }
    }
}

impl From<KeyServiceError> for Fault {
    fn from(err: KeyServiceError) -> Self {
        match err {
            KeyServiceError::Service {
                code,
                error_type,
                message,
            } => Fault {
                error_type,
                error_code: Some(code),
                message,
            },
            other => Fault::uncoded(other.variant_name(), other.to_string()),
        }
    }
}

impl From<CipherError> for Fault {
    fn from(err: CipherError) -> Self {
        match err {
            CipherError::NotAString { .. } => Fault::kind(ErrorKind::InvalidType, err.to_string()),
            CipherError::MalformedCiphertext { .. } => {
                Fault::uncoded("MalformedCiphertext", err.to_string())
            }
            CipherError::NotUtf8 { .. } => Fault::uncoded("NotUtf8", err.to_string()),
            CipherError::KeyService(inner) => Fault::from(inner),
        }
    }
}

impl From<PrototypeError> for Fault {
    fn from(err: PrototypeError) -> Self {
        match err {
            PrototypeError::InvalidType { .. } => {
                Fault::kind(ErrorKind::InvalidType, err.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crudtable_core::ValueType;

    #[test]
    fn service_errors_are_copied_verbatim() {
        let fault = Fault::from(BackendError::validation("bad key"));
        assert_eq!(fault.error_type, "Sender");
        assert_eq!(fault.error_code.as_deref(), Some("ValidationException"));
        assert_eq!(fault.message, "bad key");
    }

    #[test]
    fn other_backend_errors_use_variant_name() {
        let fault = Fault::from(BackendError::Snapshot {
            reason: "disk full".into(),
        });
        assert_eq!(fault.error_type, "Snapshot");
        assert_eq!(fault.error_code, None);
        assert_eq!(fault.message, "snapshot error: disk full");
    }

    #[test]
    fn key_service_errors_use_variant_name() {
        let fault = Fault::from(CipherError::KeyService(KeyServiceError::UnknownKey {
            key_id: "k".into(),
        }));
        assert_eq!(fault.error_type, "UnknownKey");
        assert_eq!(fault.error_code, None);
    }

    #[test]
    fn non_string_encryption_is_invalid_type() {
        let fault = Fault::from(CipherError::NotAString {
            attribute: "ssn".into(),
        });
        assert_eq!(fault.error_type, "InvalidType");
        assert!(fault.message.contains("ssn"));
    }

    #[test]
    fn prototype_errors_name_the_field() {
        let fault = Fault::from(PrototypeError::InvalidType {
            field: "age".into(),
            expected: ValueType::Integer,
            actual: ValueType::String,
        });
        assert_eq!(fault.error_type, "InvalidType");
        assert!(fault.message.contains("'age'"));
    }
}
