//! AES-256-GCM sealing for secrets kept at rest.
//!
//! [`EncryptionService`] wraps a single 32-byte key. Payloads are sealed into
//! an [`EncryptedData`] envelope (random 96-bit nonce plus ciphertext) and can
//! be flattened into a base64 string suitable for embedding in a JSON file.
//!
//! ```rust
//! use skysync_common::crypto::encryption::EncryptionService;
//!
//! let service = EncryptionService::new(EncryptionService::generate_key())?;
//! let sealed = service.seal_str("refresh-token")?;
//! assert_eq!(service.open_str(&sealed)?, "refresh-token");
//! # Ok::<(), skysync_common::error::CommonError>(())
//! ```

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{CipherOperation, CommonError, CommonResult};

/// Algorithm tag written into every envelope.
pub const ALGORITHM: &str = "AES-256-GCM";

/// Required key length in bytes.
pub const KEY_LEN: usize = 32;

const NONCE_LEN: usize = 12;

/// Sealed payload envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedData {
    /// 96-bit nonce, fresh per envelope
    pub nonce: Vec<u8>,
    /// Ciphertext with the GCM tag appended
    pub ciphertext: Vec<u8>,
    /// Always [`ALGORITHM`]
    pub algorithm: String,
}

/// AES-256-GCM encryption service bound to one key.
pub struct EncryptionService {
    key: Vec<u8>,
    cipher: Aes256Gcm,
}

impl std::fmt::Debug for EncryptionService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncryptionService")
            .field("key", &"[REDACTED]")
            .field("fingerprint", &self.key_fingerprint())
            .finish()
    }
}

impl EncryptionService {
    /// Create a service from a raw 32-byte key.
    ///
    /// # Errors
    /// Returns `CommonError::Validation` when the key is not 32 bytes.
    pub fn new(key: Vec<u8>) -> CommonResult<Self> {
        if key.len() != KEY_LEN {
            return Err(CommonError::validation(
                "key",
                format!("encryption key must be exactly {KEY_LEN} bytes, got {}", key.len()),
            ));
        }

        let cipher = Aes256Gcm::new_from_slice(&key).map_err(|e| {
            CommonError::cipher(CipherOperation::Setup, e.to_string())
        })?;

        Ok(Self { key, cipher })
    }

    /// Create a service from a hex-encoded key (surrounding whitespace ignored).
    ///
    /// # Errors
    /// Returns `CommonError::Validation` for bad hex or a wrong key length.
    pub fn from_hex(encoded: &str) -> CommonResult<Self> {
        let key = hex::decode(encoded.trim())
            .map_err(|e| CommonError::validation("key", format!("key is not valid hex: {e}")))?;
        Self::new(key)
    }

    /// Hex encoding of the key, for persisting to a key file.
    #[must_use]
    pub fn key_hex(&self) -> String {
        hex::encode(&self.key)
    }

    /// Generate a random 32-byte key.
    #[must_use]
    pub fn generate_key() -> Vec<u8> {
        let mut key = vec![0u8; KEY_LEN];
        OsRng.fill_bytes(&mut key);
        key
    }

    /// Encrypt bytes into an envelope with a fresh nonce.
    ///
    /// # Errors
    /// Returns `CommonError::Cipher` if the cipher refuses the input.
    pub fn encrypt(&self, data: &[u8]) -> CommonResult<EncryptedData> {
        let mut nonce_bytes = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut nonce_bytes);

        let ciphertext = self
            .cipher
            .encrypt(&Nonce::from(nonce_bytes), data)
            .map_err(|e| CommonError::cipher(CipherOperation::Seal, e.to_string()))?;

        Ok(EncryptedData {
            nonce: nonce_bytes.to_vec(),
            ciphertext,
            algorithm: ALGORITHM.to_string(),
        })
    }

    /// Decrypt an envelope. Fails on a foreign algorithm tag, a malformed
    /// nonce, or an authentication tag mismatch (wrong key or tampering).
    ///
    /// # Errors
    /// Returns `CommonError::Validation` for a bad envelope and
    /// `CommonError::Cipher` when authentication fails.
    pub fn decrypt(&self, encrypted: &EncryptedData) -> CommonResult<Vec<u8>> {
        if encrypted.algorithm != ALGORITHM {
            return Err(CommonError::validation(
                "algorithm",
                format!("unsupported algorithm: {}", encrypted.algorithm),
            ));
        }

        let nonce: [u8; NONCE_LEN] = encrypted.nonce.as_slice().try_into().map_err(|_| {
            CommonError::validation("nonce", format!("nonce must be {NONCE_LEN} bytes"))
        })?;

        self.cipher
            .decrypt(&Nonce::from(nonce), encrypted.ciphertext.as_ref())
            .map_err(|e| CommonError::cipher(CipherOperation::Open, e.to_string()))
    }

    /// Encrypt bytes and encode the envelope as a base64 string.
    ///
    /// # Errors
    /// Fails as [`EncryptionService::encrypt`] does.
    pub fn encrypt_to_string(&self, data: &[u8]) -> CommonResult<String> {
        let encrypted = self.encrypt(data)?;
        let serialized = serde_json::to_vec(&encrypted)?;
        Ok(BASE64.encode(serialized))
    }

    /// Decode a base64 envelope string and decrypt it.
    ///
    /// # Errors
    /// Returns `CommonError::Encoding` for bad base64 or JSON, otherwise
    /// fails as [`EncryptionService::decrypt`] does.
    pub fn decrypt_from_string(&self, encoded: &str) -> CommonResult<Vec<u8>> {
        let decoded = BASE64
            .decode(encoded)
            .map_err(|e| CommonError::encoding("base64", e.to_string()))?;
        let encrypted: EncryptedData = serde_json::from_slice(&decoded)?;
        self.decrypt(&encrypted)
    }

    /// Seal a UTF-8 string.
    ///
    /// # Errors
    /// Fails as [`EncryptionService::encrypt`] does.
    pub fn seal_str(&self, plaintext: &str) -> CommonResult<String> {
        self.encrypt_to_string(plaintext.as_bytes())
    }

    /// Open a string produced by [`seal_str`](Self::seal_str).
    ///
    /// # Errors
    /// Fails as [`EncryptionService::decrypt_from_string`] does, or with
    /// `CommonError::Encoding` when the plaintext is not UTF-8.
    pub fn open_str(&self, sealed: &str) -> CommonResult<String> {
        let bytes = self.decrypt_from_string(sealed)?;
        String::from_utf8(bytes)
            .map_err(|e| CommonError::encoding("UTF-8", e.to_string()))
    }

    /// Short non-reversible fingerprint of the key, safe to log.
    #[must_use]
    pub fn key_fingerprint(&self) -> String {
        let digest = Sha256::digest(&self.key);
        BASE64.encode(&digest[..8])
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for crypto::encryption.
    use super::*;

    #[test]
    fn generate_key_has_correct_length() {
        assert_eq!(EncryptionService::generate_key().len(), KEY_LEN);
    }

    /// Short keys are a validation failure, not a panic inside the cipher.
    #[test]
    fn new_service_rejects_invalid_key_size() {
        let err = EncryptionService::new(vec![0; 16]).unwrap_err();
        assert!(matches!(err, CommonError::Validation { ref field, .. } if field == "key"));
    }

    #[test]
    fn hex_key_round_trips_through_service() {
        let service = EncryptionService::new(EncryptionService::generate_key()).unwrap();
        let restored = EncryptionService::from_hex(&format!("{}\n", service.key_hex())).unwrap();

        let sealed = service.seal_str("abc").unwrap();
        assert_eq!(restored.open_str(&sealed).unwrap(), "abc");
        assert_eq!(service.key_fingerprint(), restored.key_fingerprint());
    }

    #[test]
    fn from_hex_rejects_garbage() {
        assert!(EncryptionService::from_hex("not-hex").is_err());
        assert!(EncryptionService::from_hex("abcd").is_err());
    }

    /// Two seals of the same plaintext must differ because the nonce is fresh.
    #[test]
    fn sealing_is_randomized() {
        let service = EncryptionService::new(EncryptionService::generate_key()).unwrap();
        let a = service.seal_str("same").unwrap();
        let b = service.seal_str("same").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn wrong_key_fails_to_open() {
        let one = EncryptionService::new(EncryptionService::generate_key()).unwrap();
        let two = EncryptionService::new(EncryptionService::generate_key()).unwrap();

        let sealed = one.seal_str("secret").unwrap();
        assert!(two.open_str(&sealed).is_err());
    }

    #[test]
    fn foreign_algorithm_is_rejected() {
        let service = EncryptionService::new(EncryptionService::generate_key()).unwrap();
        let mut envelope = service.encrypt(b"x").unwrap();
        envelope.algorithm = "ROT13".to_string();
        assert!(service.decrypt(&envelope).is_err());
    }

    #[test]
    fn debug_output_redacts_key() {
        let service = EncryptionService::new(EncryptionService::generate_key()).unwrap();
        let rendered = format!("{service:?}");
        assert!(rendered.contains("[REDACTED]"));
        assert!(!rendered.contains(&service.key_hex()));
    }
}
