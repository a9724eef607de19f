//! Attribute encryption
//!
//! Sensitive attributes are encrypted before a record is written and, on
//! request, decrypted after it is read. The cryptography itself belongs to an
//! external key-management service behind [`KeyService`]; this module only
//! decides which attributes go through it and stores ciphertext as base64
//! text.

use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use crudtable_core::{Record, Value};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure reported by a key service
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum KeyServiceError {
    /// Structured service error, passed through verbatim.
    #[error("{message}")]
    Service {
        /// Service error code
        code: String,
        /// Fault class, `Sender` or `Receiver`
        error_type: String,
        /// Human readable message
        message: String,
    },

    /// The key id is not known to the service.
    #[error("key '{key_id}' does not exist")]
    UnknownKey {
        /// Requested key id
        key_id: String,
    },

    /// The key id cannot be used with this service.
    #[error("key id '{key_id}' is invalid: {reason}")]
    InvalidKeyId {
        /// Offending key id
        key_id: String,
        /// Why it was refused
        reason: String,
    },

    /// Ciphertext was damaged or not produced by this service.
    #[error("ciphertext is malformed or was not produced by this key service")]
    InvalidCiphertext,
}

impl KeyServiceError {
    /// Name of the error variant, used when the error carries no code.
    pub fn variant_name(&self) -> &'static str {
        match self {
            KeyServiceError::Service { .. } => "Service",
            KeyServiceError::UnknownKey { .. } => "UnknownKey",
            KeyServiceError::InvalidKeyId { .. } => "InvalidKeyId",
            KeyServiceError::InvalidCiphertext => "InvalidCiphertext",
        }
    }
}

/// Encrypt/decrypt service.
///
/// Ciphertext must identify its own key, so decryption needs no key id.
pub trait KeyService: Send + Sync {
    /// Encrypt `plaintext` under `key_id`.
    fn encrypt(&self, key_id: &str, plaintext: &[u8]) -> Result<Vec<u8>, KeyServiceError>;

    /// Decrypt ciphertext produced by [`KeyService::encrypt`].
    fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>, KeyServiceError>;
}

/// An attribute to encrypt and the key to encrypt it with.
///
/// Serialized as a two-element array: `["ssn", "alias/pii"]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "(String, String)", into = "(String, String)")]
pub struct EncryptedAttribute {
    /// Record field holding the sensitive value
    pub attribute: String,
    /// Key id handed to the key service
    pub key_id: String,
}

impl EncryptedAttribute {
    /// Pair an attribute with its key.
    pub fn new(attribute: impl Into<String>, key_id: impl Into<String>) -> Self {
        Self {
            attribute: attribute.into(),
            key_id: key_id.into(),
        }
    }
}

impl From<(String, String)> for EncryptedAttribute {
    fn from((attribute, key_id): (String, String)) -> Self {
        Self { attribute, key_id }
    }
}

impl From<EncryptedAttribute> for (String, String) {
    fn from(a: EncryptedAttribute) -> Self {
        (a.attribute, a.key_id)
    }
}

/// Error applying encryption to a record
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CipherError {
    /// Only string values can be encrypted.
    #[error("encrypted attribute '{attribute}' must be a string")]
    NotAString {
        /// Offending attribute
        attribute: String,
    },

    /// Stored value is not base64 text.
    #[error("attribute '{attribute}' does not hold base64 ciphertext")]
    MalformedCiphertext {
        /// Offending attribute
        attribute: String,
    },

    /// Decrypted bytes are not UTF-8.
    #[error("attribute '{attribute}' decrypted to non UTF-8 data")]
    NotUtf8 {
        /// Offending attribute
        attribute: String,
    },

    /// The key service refused.
    #[error(transparent)]
    KeyService(#[from] KeyServiceError),
}

/// Applies a key service to the configured attributes of a record
#[derive(Clone)]
pub struct AttributeCipher {
    attributes: Vec<EncryptedAttribute>,
    service: Arc<dyn KeyService>,
}

impl AttributeCipher {
    /// Cipher for `attributes` backed by `service`.
    pub fn new(attributes: Vec<EncryptedAttribute>, service: Arc<dyn KeyService>) -> Self {
        Self {
            attributes,
            service,
        }
    }

    /// Replace each configured attribute present in `record` with base64
    /// ciphertext. Absent attributes are skipped.
    pub fn encrypt_record(&self, record: &mut Record) -> Result<(), CipherError> {
        for attr in &self.attributes {
            let Some(value) = record.get_mut(&attr.attribute) else {
                continue;
            };
            let plaintext = value.as_str().ok_or_else(|| CipherError::NotAString {
                attribute: attr.attribute.clone(),
            })?;
            let blob = self.service.encrypt(&attr.key_id, plaintext.as_bytes())?;
            *value = Value::String(STANDARD.encode(blob));
        }
        Ok(())
    }

    /// Replace each configured attribute present in `record` with its
    /// plaintext. Absent attributes are skipped.
    pub fn decrypt_record(&self, record: &mut Record) -> Result<(), CipherError> {
        for attr in &self.attributes {
            let Some(value) = record.get_mut(&attr.attribute) else {
                continue;
            };
            let malformed = || CipherError::MalformedCiphertext {
                attribute: attr.attribute.clone(),
            };
            let encoded = value.as_str().ok_or_else(malformed)?;
            let blob = STANDARD.decode(encoded).map_err(|_| malformed())?;
            let plaintext = self.service.decrypt(&blob)?;
            let text = String::from_utf8(plaintext).map_err(|_| CipherError::NotUtf8 {
                attribute: attr.attribute.clone(),
            })?;
            *value = Value::String(text);
        }
        Ok(())
    }
}

impl std::fmt::Debug for AttributeCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AttributeCipher")
            .field("attributes", &self.attributes)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::local::LocalKeyService;

    fn cipher() -> AttributeCipher {
        let keys = LocalKeyService::new().with_key("pii", "correct horse battery staple");
        AttributeCipher::new(vec![EncryptedAttribute::new("ssn", "pii")], Arc::new(keys))
    }

    fn record(pairs: &[(&str, Value)]) -> Record {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn encrypts_and_decrypts_configured_attribute() {
        let cipher = cipher();
        let mut item = record(&[("ssn", "123-45-6789".into()), ("name", "Ann".into())]);

        cipher.encrypt_record(&mut item).unwrap();
        let stored = item["ssn"].as_str().unwrap().to_string();
        assert_ne!(stored, "123-45-6789");
        assert!(STANDARD.decode(&stored).is_ok());
        assert_eq!(item["name"], Value::from("Ann"));

        cipher.decrypt_record(&mut item).unwrap();
        assert_eq!(item["ssn"], Value::from("123-45-6789"));
    }

    #[test]
    fn absent_attributes_are_skipped() {
        let mut item = record(&[("name", "Ann".into())]);
        cipher().encrypt_record(&mut item).unwrap();
        cipher().decrypt_record(&mut item).unwrap();
        assert_eq!(item, record(&[("name", "Ann".into())]));
    }

    #[test]
    fn non_string_values_are_rejected() {
        let mut item = record(&[("ssn", Value::Int(123))]);
        assert_eq!(
            cipher().encrypt_record(&mut item),
            Err(CipherError::NotAString {
                attribute: "ssn".into()
            })
        );
    }

    #[test]
    fn garbage_ciphertext_is_rejected() {
        let mut item = record(&[("ssn", "!!! not base64 !!!".into())]);
        assert!(matches!(
            cipher().decrypt_record(&mut item),
            Err(CipherError::MalformedCiphertext { .. })
        ));
    }

    #[test]
    fn unknown_key_surfaces_key_service_error() {
        let service = Arc::new(LocalKeyService::new());
        let cipher = AttributeCipher::new(vec![EncryptedAttribute::new("ssn", "nope")], service);
        let mut item = record(&[("ssn", "x".into())]);
        assert_eq!(
            cipher.encrypt_record(&mut item),
            Err(CipherError::KeyService(KeyServiceError::UnknownKey {
                key_id: "nope".into()
            }))
        );
    }

    #[test]
    fn encrypted_attribute_serializes_as_pair() {
        let attr = EncryptedAttribute::new("ssn", "alias/pii");
        let json = serde_json::to_string(&attr).unwrap();
        assert_eq!(json, r#"["ssn","alias/pii"]"#);
        let back: EncryptedAttribute = serde_json::from_str(&json).unwrap();
        assert_eq!(back, attr);
    }
}
