//! Encryption services.
//!
//! The transformer only talks to [`EncryptionService`]; the concrete cipher
//! is chosen at setup time.
//!
//! ## Backends
//!
//! - **aes**: AES-256-GCM with a local master key and derived per-document keys.
//! - **age**: x25519 identities with a per-document keyring that supports
//!   crypto-shredding through [`EncryptionService::drop_key`].
//! - **vault**: Feature-gated (`vault`). HashiCorp Vault transit engine over HTTP.
//!
//! ## Adding a New Backend
//!
//! 1. Implement the `EncryptionService` trait
//! 2. Add the implementation in a new file (e.g., `kms.rs`)
//! 3. Feature-gate if it pulls in a network client
//! 4. Wire it into `backend::from_config`

use async_trait::async_trait;

use crate::error::CipherError;

pub mod aes;
pub mod age;
pub mod backend;

#[cfg(feature = "vault")]
pub mod vault;

pub use self::aes::AesGcm;
pub use self::age::AgeService;
pub use backend::from_config;

#[cfg(feature = "vault")]
pub use vault::VaultTransit;

/// Raw string encryption used by the field transformer.
///
/// `key` is the optional per-document key identifier supplied by
/// [`crate::core::document::Document::encryption_key`]. `None` selects the
/// backend's default key.
#[async_trait]
pub trait EncryptionService: Send + Sync {
    /// Encrypt `plaintext`.
    ///
    /// # Errors
    ///
    /// Any failure is a hard error. Implementations must never return an
    /// empty string or the plaintext in place of ciphertext.
    async fn encrypt(&self, plaintext: &str, key: Option<&str>) -> Result<String, CipherError>;

    /// Decrypt `ciphertext`, or return `None` if it cannot be decrypted.
    ///
    /// Malformed input, foreign data, wrong or dropped keys and backend
    /// outages all map to `None`.
    async fn try_decrypt(&self, ciphertext: &str, key: Option<&str>) -> Option<String>;

    /// Destroy the dedicated key `key`, making its ciphertexts unreadable.
    ///
    /// Backends without dedicated keys keep the default no-op.
    async fn drop_key(&self, key: &str) -> Result<(), CipherError> {
        let _ = key;
        Ok(())
    }

    /// Backend name for display/config.
    fn name(&self) -> &'static str;
}
