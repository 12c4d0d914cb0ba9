//! HashiCorp Vault transit backend.
//!
//! Encrypts values with Vault's transit secrets engine. Enable with
//! `--features vault` (on by default).
//!
//! ## Usage
//!
//! ```toml
//! [cipher]
//! backend = "vault"
//!
//! [vault]
//! address = "http://127.0.0.1:8200"
//! token = "hvs.XXXX"
//! default_key = "pii-key"
//! ```
//!
//! A document key identifier is used as the transit key name, so every
//! document can get its own named key. Vault creates transit keys on first
//! encrypt when the token's policy allows it. Key names are limited to
//! ASCII letters, digits, `-` and `_` since they become part of the request
//! path.

use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::EncryptionService;
use crate::core::constants::{VAULT_DEFAULT_KEY, VAULT_TIMEOUT_SECS};
use crate::error::CipherError;

/// Vault transit encryption service.
pub struct VaultTransit {
    client: reqwest::Client,
    address: String,
    token: String,
    default_key: String,
}

#[derive(Serialize)]
struct EncryptRequest {
    plaintext: String,
}

#[derive(Serialize)]
struct DecryptRequest<'a> {
    ciphertext: &'a str,
}

#[derive(Serialize)]
struct KeyConfigRequest {
    deletion_allowed: bool,
}

#[derive(Deserialize)]
struct Response<T> {
    data: T,
}

#[derive(Deserialize)]
struct EncryptData {
    ciphertext: String,
}

#[derive(Deserialize)]
struct DecryptData {
    plaintext: String,
}

impl VaultTransit {
    /// Create a client for the Vault server at `address`.
    ///
    /// # Errors
    ///
    /// Returns `CipherError::Backend` if the HTTP client cannot be built.
    pub fn new(address: impl Into<String>, token: impl Into<String>) -> Result<Self, CipherError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(VAULT_TIMEOUT_SECS))
            .build()
            .map_err(|e| CipherError::Backend(format!("failed to build client: {}", e)))?;

        Ok(Self {
            client,
            address: address.into().trim_end_matches('/').to_string(),
            token: token.into(),
            default_key: VAULT_DEFAULT_KEY.to_string(),
        })
    }

    /// Transit key used when a document has no key of its own.
    pub fn with_default_key(mut self, key: impl Into<String>) -> Self {
        self.default_key = key.into();
        self
    }

    pub fn default_key(&self) -> &str {
        &self.default_key
    }

    fn url(&self, path: &str) -> String {
        format!("{}/v1/transit/{}", self.address, path)
    }

    async fn post<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<reqwest::Response, reqwest::Error> {
        self.client
            .post(self.url(path))
            .header("X-Vault-Token", &self.token)
            .json(body)
            .send()
            .await?
            .error_for_status()
    }

    async fn decrypt_with(&self, ciphertext: &str, key: &str) -> Result<String, CipherError> {
        let key = transit_key(key)?;
        let response: Response<DecryptData> = self
            .post(&format!("decrypt/{}", key), &DecryptRequest { ciphertext })
            .await
            .map_err(|e| CipherError::DecryptionFailed(format!("vault decrypt failed: {}", e)))?
            .json()
            .await
            .map_err(|e| CipherError::DecryptionFailed(format!("invalid response: {}", e)))?;

        let bytes = STANDARD
            .decode(response.data.plaintext)
            .map_err(|e| CipherError::DecryptionFailed(format!("invalid base64: {}", e)))?;
        String::from_utf8(bytes)
            .map_err(|e| CipherError::DecryptionFailed(format!("UTF-8 error: {}", e)))
    }
}

/// Check that `key` is a transit key name and cannot leave the transit mount.
fn transit_key(key: &str) -> Result<&str, CipherError> {
    let valid = !key.is_empty()
        && key
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_');
    if valid {
        Ok(key)
    } else {
        Err(CipherError::InvalidKey(format!(
            "`{}` is not a valid transit key name",
            key
        )))
    }
}

impl std::fmt::Debug for VaultTransit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VaultTransit")
            .field("address", &self.address)
            .field("default_key", &self.default_key)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl EncryptionService for VaultTransit {
    async fn encrypt(&self, plaintext: &str, key: Option<&str>) -> Result<String, CipherError> {
        let key = transit_key(key.unwrap_or(&self.default_key))?;
        trace!(key, plaintext_len = plaintext.len(), "encrypting with vault");

        let request = EncryptRequest {
            plaintext: STANDARD.encode(plaintext.as_bytes()),
        };
        let response: Response<EncryptData> = self
            .post(&format!("encrypt/{}", key), &request)
            .await
            .map_err(|e| CipherError::EncryptionFailed(format!("vault encrypt failed: {}", e)))?
            .json()
            .await
            .map_err(|e| CipherError::EncryptionFailed(format!("invalid response: {}", e)))?;

        trace!(
            ciphertext_len = response.data.ciphertext.len(),
            "encrypted with vault"
        );
        Ok(response.data.ciphertext)
    }

    async fn try_decrypt(&self, ciphertext: &str, key: Option<&str>) -> Option<String> {
        let key = key.unwrap_or(&self.default_key);
        trace!(key, ciphertext_len = ciphertext.len(), "decrypting with vault");

        match self.decrypt_with(ciphertext, key).await {
            Ok(plaintext) => Some(plaintext),
            Err(e) => {
                debug!(key, error = %e, "vault decrypt rejected value");
                None
            }
        }
    }

    async fn drop_key(&self, key: &str) -> Result<(), CipherError> {
        if key.trim().is_empty() {
            return Ok(());
        }
        let key = transit_key(key)?;

        let fail = |e: reqwest::Error| CipherError::KeyOperation {
            key: key.to_string(),
            reason: e.to_string(),
        };

        self.post(
            &format!("keys/{}/config", key),
            &KeyConfigRequest {
                deletion_allowed: true,
            },
        )
        .await
        .map_err(fail)?;

        self.client
            .delete(self.url(&format!("keys/{}", key)))
            .header("X-Vault-Token", &self.token)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(fail)?;

        debug!(key, "vault transit key deleted");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "vault"
    }
}
