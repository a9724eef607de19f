//! Local key service
//!
//! An in-process [`KeyService`] for tests and local development, built on
//! ChaCha20-Poly1305. Each registered key's material is hashed with SHA-256
//! into a 256-bit key; every encryption draws a fresh 12-byte nonce from the
//! OS generator. The key id is bound to the ciphertext as associated data, so
//! a blob relabelled with another key id fails authentication.
//!
//! Blob layout: `[key id len: u16 BE][key id][nonce: 12][ciphertext + tag: 16]`

use std::collections::HashMap;

use chacha20poly1305::aead::{Aead, AeadCore, KeyInit, OsRng, Payload};
use chacha20poly1305::{ChaCha20Poly1305, Key, Nonce};
use parking_lot::RwLock;
use sha2::{Digest, Sha256};

use crate::encryption::{KeyService, KeyServiceError};

/// Nonce length for ChaCha20-Poly1305 (12 bytes)
pub const NONCE_LEN: usize = 12;

/// ChaCha20-Poly1305 auth tag length (16 bytes)
pub const AUTH_TAG_LEN: usize = 16;

const ID_LEN_BYTES: usize = 2;

/// Key service holding key material in memory
#[derive(Default)]
pub struct LocalKeyService {
    keys: RwLock<HashMap<String, Vec<u8>>>,
}

impl LocalKeyService {
    /// Service with no keys.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`LocalKeyService::add_key`].
    pub fn with_key(self, key_id: impl Into<String>, material: impl AsRef<[u8]>) -> Self {
        self.add_key(key_id, material);
        self
    }

    /// Register (or replace) key material under `key_id`.
    pub fn add_key(&self, key_id: impl Into<String>, material: impl AsRef<[u8]>) {
        self.keys
            .write()
            .insert(key_id.into(), material.as_ref().to_vec());
    }

    fn cipher(&self, key_id: &str) -> Result<ChaCha20Poly1305, KeyServiceError> {
        let keys = self.keys.read();
        let material = keys
            .get(key_id)
            .ok_or_else(|| KeyServiceError::UnknownKey {
                key_id: key_id.to_string(),
            })?;
        let digest = Sha256::digest(material);
        Ok(ChaCha20Poly1305::new(Key::from_slice(&digest)))
    }
}

impl KeyService for LocalKeyService {
    fn encrypt(&self, key_id: &str, plaintext: &[u8]) -> Result<Vec<u8>, KeyServiceError> {
        let cipher = self.cipher(key_id)?;
        let id_len = u16::try_from(key_id.len()).map_err(|_| KeyServiceError::InvalidKeyId {
            key_id: key_id.to_string(),
            reason: format!("longer than {} bytes", u16::MAX),
        })?;
        let nonce = ChaCha20Poly1305::generate_nonce(&mut OsRng);
        let sealed = cipher
            .encrypt(
                &nonce,
                Payload {
                    msg: plaintext,
                    aad: key_id.as_bytes(),
                },
            )
            .map_err(|_| KeyServiceError::InvalidCiphertext)?;

        let mut blob = Vec::with_capacity(ID_LEN_BYTES + key_id.len() + NONCE_LEN + sealed.len());
        blob.extend_from_slice(&id_len.to_be_bytes());
        blob.extend_from_slice(key_id.as_bytes());
        blob.extend_from_slice(&nonce);
        blob.extend_from_slice(&sealed);
        Ok(blob)
    }

    fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>, KeyServiceError> {
        if ciphertext.len() < ID_LEN_BYTES {
            return Err(KeyServiceError::InvalidCiphertext);
        }
        let (id_len, rest) = ciphertext.split_at(ID_LEN_BYTES);
        let id_len = u16::from_be_bytes([id_len[0], id_len[1]]) as usize;
        if rest.len() < id_len + NONCE_LEN + AUTH_TAG_LEN {
            return Err(KeyServiceError::InvalidCiphertext);
        }
        let (key_id, rest) = rest.split_at(id_len);
        let (nonce, sealed) = rest.split_at(NONCE_LEN);

        let key_id = std::str::from_utf8(key_id).map_err(|_| KeyServiceError::InvalidCiphertext)?;
        let cipher = self.cipher(key_id)?;
        cipher
            .decrypt(
                Nonce::from_slice(nonce),
                Payload {
                    msg: sealed,
                    aad: key_id.as_bytes(),
                },
            )
            .map_err(|_| {
                tracing::debug!(target: "crudtable::security", key_id, "ciphertext failed authentication");
                KeyServiceError::InvalidCiphertext
            })
    }
}

impl std::fmt::Debug for LocalKeyService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut ids: Vec<String> = self.keys.read().keys().cloned().collect();
        ids.sort();
        f.debug_struct("LocalKeyService").field("keys", &ids).finish()
    }
}
