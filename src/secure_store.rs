use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use base64::{engine::general_purpose::STANDARD as B64, Engine as _};
use log::{error, warn};
use rand::RngCore;
use serde_json::Value;

use crate::config::AppConfig;
use crate::error::{Result, StoreError};
use crate::fingerprint::DeviceFingerprint;
use crate::sanitize::mask_for_storage;
use crate::storage::StorageBackend;

/// Symmetric seal/open over a derived key. Behind a trait so harnesses can
/// exercise the fallback path by injecting a failing implementation.
pub trait Cipher: Send + Sync {
    fn seal(&self, key: &[u8; 32], plaintext: &[u8]) -> Result<String>;
    fn open(&self, key: &[u8; 32], envelope: &str) -> Result<Vec<u8>>;
}

/// AES-256-GCM with a random 12-byte nonce prepended to the ciphertext,
/// base64-encoded as one envelope string.
pub struct GcmCipher;

impl Cipher for GcmCipher {
    fn seal(&self, key: &[u8; 32], plaintext: &[u8]) -> Result<String> {
        let cipher = Aes256Gcm::new_from_slice(key)
            .map_err(|_| StoreError::Encryption("invalid key length".to_string()))?;

        let mut nonce = [0u8; 12];
        rand::thread_rng().fill_bytes(&mut nonce);

        let ciphertext = cipher
            .encrypt(Nonce::from_slice(&nonce), plaintext)
            .map_err(|_| StoreError::Encryption("AEAD seal failed".to_string()))?;

        let mut envelope = Vec::with_capacity(12 + ciphertext.len());
        envelope.extend_from_slice(&nonce);
        envelope.extend_from_slice(&ciphertext);
        Ok(B64.encode(envelope))
    }

    fn open(&self, key: &[u8; 32], envelope: &str) -> Result<Vec<u8>> {
        let raw = B64
            .decode(envelope)
            .map_err(|e| StoreError::Decryption(format!("bad envelope encoding: {}", e)))?;
        if raw.len() <= 12 {
            return Err(StoreError::Decryption("envelope too short".to_string()));
        }

        let (nonce, ciphertext) = raw.split_at(12);
        let cipher = Aes256Gcm::new_from_slice(key)
            .map_err(|_| StoreError::Decryption("invalid key length".to_string()))?;

        cipher
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|_| StoreError::Decryption("AEAD open failed".to_string()))
    }
}

/// Obfuscated wrapper over a [`StorageBackend`].
///
/// Values are serialized to JSON, PII-masked when they are structured data,
/// encrypted under the device-derived key and written under a namespaced
/// key. This is obfuscation, not security: the key is derivable by anything
/// running in the same environment (see [`DeviceFingerprint`]).
///
/// Write failures fall back to a plaintext write under the un-namespaced
/// key so a misbehaving environment never silently loses answers. Read
/// failures are asymmetric on purpose: a namespaced entry that fails to
/// decrypt is treated as absent rather than falling through to the plain
/// entry, so a corrupt blob can never be misread as valid data.
pub struct SecureStore<B: StorageBackend> {
    backend: B,
    fingerprint: DeviceFingerprint,
    config: AppConfig,
    cipher: Box<dyn Cipher>,
}

impl<B: StorageBackend> SecureStore<B> {
    pub fn new(backend: B, fingerprint: DeviceFingerprint, config: AppConfig) -> Self {
        Self::with_cipher(backend, fingerprint, config, Box::new(GcmCipher))
    }

    pub fn with_cipher(
        backend: B,
        fingerprint: DeviceFingerprint,
        config: AppConfig,
        cipher: Box<dyn Cipher>,
    ) -> Self {
        SecureStore {
            backend,
            fingerprint,
            config,
            cipher,
        }
    }

    /// Direct access to the underlying backend, used for the plain UI flags
    /// that deliberately bypass encryption.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    fn namespaced(&self, key: &str) -> String {
        format!("{}{}", self.config.namespace, key)
    }

    fn derived_key(&self, salt: &str) -> [u8; 32] {
        self.fingerprint.derive_key(&self.config.app_salt, salt)
    }

    fn encrypt_value(&self, value: &Value, salt: &str) -> Result<String> {
        let masked = match value {
            Value::Object(map) => Value::Object(mask_for_storage(map)),
            other => other.clone(),
        };
        let plaintext = serde_json::to_vec(&masked)?;
        self.cipher.seal(&self.derived_key(salt), &plaintext)
    }

    fn decrypt_value(&self, envelope: &str, salt: &str) -> Result<Value> {
        let plaintext = self.cipher.open(&self.derived_key(salt), envelope)?;
        Ok(serde_json::from_slice(&plaintext)?)
    }

    /// Encrypt and store a value. Reports success if either the encrypted
    /// write or the plaintext fallback write lands; failure only when both
    /// paths fail.
    pub fn put(&self, key: &str, value: &Value, salt: &str) -> bool {
        let encrypted = self
            .encrypt_value(value, salt)
            .and_then(|envelope| self.backend.set_item(&self.namespaced(key), &envelope));

        match encrypted {
            Ok(()) => true,
            Err(e) => {
                warn!("⚠️ Encrypted write for '{}' failed ({}), falling back to plaintext", key, e);
                let fallback = serde_json::to_string(value)
                    .map_err(StoreError::from)
                    .and_then(|body| self.backend.set_item(key, &body));
                match fallback {
                    Ok(()) => true,
                    Err(fe) => {
                        error!("❌ Fallback write for '{}' also failed: {}", key, fe);
                        false
                    }
                }
            }
        }
    }

    /// Read a value back. A missing namespaced entry falls through to the
    /// plaintext fallback key; a namespaced entry that fails to decrypt or
    /// parse does not.
    pub fn get(&self, key: &str, salt: &str) -> Option<Value> {
        match self.backend.get_item(&self.namespaced(key)) {
            Some(envelope) => match self.decrypt_value(&envelope, salt) {
                Ok(value) => Some(value),
                Err(e) => {
                    error!("❌ Failed to decrypt '{}': {}", key, e);
                    None
                }
            },
            None => {
                let raw = self.backend.get_item(key)?;
                Some(serde_json::from_str(&raw).unwrap_or(Value::String(raw)))
            }
        }
    }

    /// Delete both the namespaced and the plaintext fallback entries.
    pub fn remove(&self, key: &str) {
        self.backend.remove_item(&self.namespaced(key));
        self.backend.remove_item(key);
    }

    /// Delete every entry under the namespace prefix, leaving unrelated
    /// keys untouched.
    pub fn clear(&self) {
        let prefix = &self.config.namespace;
        let secure_keys: Vec<String> = self
            .backend
            .keys()
            .into_iter()
            .filter(|k| k.starts_with(prefix.as_str()))
            .collect();
        for key in secure_keys {
            self.backend.remove_item(&key);
        }
    }
}
