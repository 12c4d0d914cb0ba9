//! AES-256-GCM backend.
//!
//! Ciphertext layout: `base64(nonce || ciphertext || tag)` with a random
//! 96-bit nonce per value. When a document supplies a key identifier, the
//! value is sealed with `SHA-256(master || DOC_KEY_CONTEXT || key_id)`
//! instead of the master key.

use aes_gcm::aead::{Aead, AeadCore, KeyInit, OsRng};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use rand::RngCore;
use sha2::{Digest, Sha256};
use tracing::trace;
use zeroize::Zeroizing;

use super::EncryptionService;
use crate::core::constants::DOC_KEY_CONTEXT;
use crate::error::CipherError;

const KEY_SIZE: usize = 32;
const NONCE_SIZE: usize = 12;

/// AES-256-GCM encryption with a local master key.
pub struct AesGcm {
    master: Zeroizing<[u8; KEY_SIZE]>,
}

impl AesGcm {
    /// Create from raw key bytes.
    pub fn new(key: [u8; KEY_SIZE]) -> Self {
        Self {
            master: Zeroizing::new(key),
        }
    }

    /// Create from a base64 encoded 32-byte key.
    ///
    /// # Errors
    ///
    /// Returns `CipherError::InvalidKey` if the key is not valid base64 or
    /// not exactly 32 bytes long.
    pub fn from_base64(key: &str) -> Result<Self, CipherError> {
        let bytes = Zeroizing::new(
            STANDARD
                .decode(key.trim())
                .map_err(|e| CipherError::InvalidKey(format!("invalid base64: {}", e)))?,
        );
        let key: [u8; KEY_SIZE] = bytes.as_slice().try_into().map_err(|_| {
            CipherError::InvalidKey(format!(
                "expected {} bytes, got {}",
                KEY_SIZE,
                bytes.len()
            ))
        })?;
        Ok(Self::new(key))
    }

    /// Generate a fresh random key, base64 encoded.
    pub fn generate_key() -> String {
        let mut key = Zeroizing::new([0u8; KEY_SIZE]);
        OsRng.fill_bytes(&mut key[..]);
        STANDARD.encode(&key[..])
    }

    fn cipher_for(&self, key_id: Option<&str>) -> Aes256Gcm {
        match key_id {
            None => Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&self.master[..])),
            Some(id) => {
                let digest: [u8; KEY_SIZE] = Sha256::new()
                    .chain_update(&self.master[..])
                    .chain_update(DOC_KEY_CONTEXT.as_bytes())
                    .chain_update(id.as_bytes())
                    .finalize()
                    .into();
                let derived = Zeroizing::new(digest);
                Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&derived[..]))
            }
        }
    }

    fn seal(&self, plaintext: &str, key_id: Option<&str>) -> Result<String, CipherError> {
        let cipher = self.cipher_for(key_id);
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        let sealed = cipher
            .encrypt(&nonce, plaintext.as_bytes())
            .map_err(|e| CipherError::EncryptionFailed(format!("{}", e)))?;

        let mut out = Vec::with_capacity(NONCE_SIZE + sealed.len());
        out.extend_from_slice(&nonce);
        out.extend_from_slice(&sealed);
        Ok(STANDARD.encode(out))
    }

    fn open(&self, ciphertext: &str, key_id: Option<&str>) -> Option<String> {
        let bytes = STANDARD.decode(ciphertext).ok()?;
        if bytes.len() <= NONCE_SIZE {
            return None;
        }
        let (nonce, sealed) = bytes.split_at(NONCE_SIZE);
        let plain = self
            .cipher_for(key_id)
            .decrypt(Nonce::from_slice(nonce), sealed)
            .ok()?;
        String::from_utf8(plain).ok()
    }
}

impl std::fmt::Debug for AesGcm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AesGcm").finish_non_exhaustive()
    }
}

#[async_trait]
impl EncryptionService for AesGcm {
    async fn encrypt(&self, plaintext: &str, key: Option<&str>) -> Result<String, CipherError> {
        trace!(
            plaintext_len = plaintext.len(),
            scoped = key.is_some(),
            "encrypting"
        );
        let ciphertext = self.seal(plaintext, key)?;
        trace!(ciphertext_len = ciphertext.len(), "encrypted");
        Ok(ciphertext)
    }

    async fn try_decrypt(&self, ciphertext: &str, key: Option<&str>) -> Option<String> {
        trace!(ciphertext_len = ciphertext.len(), "decrypting");
        self.open(ciphertext, key)
    }

    fn name(&self) -> &'static str {
        "aes"
    }
}
