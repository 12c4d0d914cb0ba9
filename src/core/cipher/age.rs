//! Age encryption backend implementation.
//!
//! Provides encryption/decryption using the age format with x25519 keys
//! and ASCII armor encoding.
//!
//! Values without a document key are encrypted to the default identity.
//! Each document key gets its own identity, created on first encrypt and
//! optionally persisted under a key directory. Dropping a document key
//! deletes its identity, which leaves every value encrypted under it
//! permanently unreadable.

use std::collections::HashMap;
use std::fs;
use std::io::{ErrorKind, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use ::age::secrecy::ExposeSecret;
use ::age::x25519;
use async_trait::async_trait;
use sha2::{Digest, Sha256};
use tokio::sync::RwLock;
use tracing::{debug, trace, warn};
use uuid::Uuid;
use zeroize::Zeroizing;

use super::EncryptionService;
use crate::error::CipherError;

/// Age-based encryption service with a per-document keyring.
pub struct AgeService {
    default: x25519::Identity,
    keyring: RwLock<HashMap<String, Arc<x25519::Identity>>>,
    key_dir: Option<PathBuf>,
}

impl AgeService {
    /// Create a service around an existing default identity.
    pub fn new(default: x25519::Identity) -> Self {
        Self {
            default,
            keyring: RwLock::new(HashMap::new()),
            key_dir: None,
        }
    }

    /// Create a service with a freshly generated default identity.
    pub fn generate() -> Self {
        Self::new(x25519::Identity::generate())
    }

    /// Parse an `AGE-SECRET-KEY-1...` string as the default identity.
    ///
    /// # Errors
    ///
    /// Returns `CipherError::InvalidKey` if the key format is invalid.
    pub fn from_identity_str(identity: &str) -> Result<Self, CipherError> {
        Ok(Self::new(parse_identity(identity)?))
    }

    /// Persist document identities under `dir`.
    pub fn with_key_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.key_dir = Some(dir.into());
        self
    }

    /// Public recipient of the default identity.
    pub fn recipient(&self) -> String {
        self.default.to_public().to_string()
    }

    /// Whether a dedicated identity exists for `key`.
    pub async fn has_key(&self, key: &str) -> bool {
        if self.keyring.read().await.contains_key(key) {
            return true;
        }
        self.key_path(key).map(|p| p.exists()).unwrap_or(false)
    }

    fn key_path(&self, key: &str) -> Option<PathBuf> {
        // Key ids are caller data; hash them so they can't escape the directory.
        let digest = Sha256::digest(key.as_bytes());
        let name: String = digest.iter().map(|b| format!("{:02x}", b)).collect();
        self.key_dir
            .as_ref()
            .map(|dir| dir.join(format!("{}.key", name)))
    }

    /// Identity for a document key, loading it from disk if needed.
    async fn lookup(&self, key: &str) -> Result<Option<Arc<x25519::Identity>>, CipherError> {
        if let Some(identity) = self.keyring.read().await.get(key) {
            return Ok(Some(Arc::clone(identity)));
        }

        let Some(path) = self.key_path(key) else {
            return Ok(None);
        };
        let owner = key.to_string();
        let Some(identity) = off_thread(key, move || load_identity(&path, &owner)).await? else {
            return Ok(None);
        };

        let mut keyring = self.keyring.write().await;
        let identity = keyring
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(identity));
        Ok(Some(Arc::clone(identity)))
    }

    /// Identity for a document key, creating and persisting it on first use.
    ///
    /// The key file is written before the keyring lock is taken. When two
    /// callers race on the same key, the first file published wins and the
    /// other caller adopts it.
    async fn lookup_or_create(&self, key: &str) -> Result<Arc<x25519::Identity>, CipherError> {
        if let Some(identity) = self.lookup(key).await? {
            return Ok(identity);
        }

        debug!("generating document identity");
        let identity = x25519::Identity::generate();
        if let Some(path) = self.key_path(key) {
            let secret = Zeroizing::new(identity_to_string(&identity));
            let owner = key.to_string();
            let published =
                off_thread(key, move || store_identity(&path, &secret, &owner)).await?;
            if !published {
                trace!("identity published concurrently, adopting it");
                return self
                    .lookup(key)
                    .await?
                    .ok_or_else(|| CipherError::KeyOperation {
                        key: key.to_string(),
                        reason: "identity file disappeared".to_string(),
                    });
            }
        }

        let mut keyring = self.keyring.write().await;
        let identity = keyring
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(identity));
        Ok(Arc::clone(identity))
    }
}

impl std::fmt::Debug for AgeService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgeService")
            .field("recipient", &self.recipient())
            .field("key_dir", &self.key_dir)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl EncryptionService for AgeService {
    async fn encrypt(&self, plaintext: &str, key: Option<&str>) -> Result<String, CipherError> {
        let recipient = match key {
            None => self.default.to_public(),
            Some(key) => self.lookup_or_create(key).await?.to_public(),
        };
        encrypt(plaintext, &[recipient])
    }

    async fn try_decrypt(&self, ciphertext: &str, key: Option<&str>) -> Option<String> {
        match key {
            None => decrypt(ciphertext, &self.default).ok(),
            Some(key) => {
                let identity = match self.lookup(key).await {
                    Ok(Some(identity)) => identity,
                    Ok(None) => return None,
                    Err(e) => {
                        warn!(error = %e, "document identity unreadable");
                        return None;
                    }
                };
                decrypt(ciphertext, &identity).ok()
            }
        }
    }

    async fn drop_key(&self, key: &str) -> Result<(), CipherError> {
        let removed = self.keyring.write().await.remove(key).is_some();
        if let Some(path) = self.key_path(key) {
            let owner = key.to_string();
            off_thread(key, move || remove_identity(&path, &owner)).await?;
        }
        debug!(removed, "document identity dropped");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "age"
    }
}

/// Encrypt plaintext for age recipients as ASCII armor.
pub fn encrypt(plaintext: &str, recipients: &[x25519::Recipient]) -> Result<String, CipherError> {
    trace!(
        recipients = recipients.len(),
        plaintext_len = plaintext.len(),
        "encrypting"
    );

    let encryptor =
        ::age::Encryptor::with_recipients(recipients.iter().map(|r| r as &dyn ::age::Recipient))
            .map_err(|e| CipherError::EncryptionFailed(format!("{}", e)))?;

    let mut encrypted = Vec::new();
    let armor = ::age::armor::ArmoredWriter::wrap_output(
        &mut encrypted,
        ::age::armor::Format::AsciiArmor,
    )
    .map_err(|e| CipherError::EncryptionFailed(format!("{}", e)))?;
    let mut writer = encryptor
        .wrap_output(armor)
        .map_err(|e| CipherError::EncryptionFailed(format!("{}", e)))?;

    writer
        .write_all(plaintext.as_bytes())
        .map_err(|e| CipherError::EncryptionFailed(format!("{}", e)))?;
    let armored = writer
        .finish()
        .map_err(|e| CipherError::EncryptionFailed(format!("{}", e)))?;
    armored
        .finish()
        .map_err(|e| CipherError::EncryptionFailed(format!("armor failed: {}", e)))?;

    trace!(ciphertext_len = encrypted.len(), "encrypted");

    String::from_utf8(encrypted)
        .map_err(|e| CipherError::EncryptionFailed(format!("UTF-8 error: {}", e)))
}

/// Decrypt an armored age payload with a single identity.
pub fn decrypt(encrypted: &str, identity: &x25519::Identity) -> Result<String, CipherError> {
    trace!(ciphertext_len = encrypted.len(), "decrypting");

    let reader = ::age::armor::ArmoredReader::new(encrypted.as_bytes());
    let decryptor = ::age::Decryptor::new(reader)
        .map_err(|e| CipherError::DecryptionFailed(format!("{}", e)))?;

    let mut decrypted = Vec::new();
    let mut reader = decryptor
        .decrypt(std::iter::once(identity as &dyn ::age::Identity))
        .map_err(|e| CipherError::DecryptionFailed(format!("{}", e)))?;

    reader
        .read_to_end(&mut decrypted)
        .map_err(|e| CipherError::DecryptionFailed(format!("{}", e)))?;

    trace!(plaintext_len = decrypted.len(), "decrypted");

    String::from_utf8(decrypted)
        .map_err(|e| CipherError::DecryptionFailed(format!("UTF-8 error: {}", e)))
}

/// Parse an age secret key.
pub fn parse_identity(identity: &str) -> Result<x25519::Identity, CipherError> {
    identity
        .trim()
        .parse::<x25519::Identity>()
        .map_err(|e: &str| CipherError::InvalidKey(e.to_string()))
}

/// Render an identity as its `AGE-SECRET-KEY-1...` string.
pub fn identity_to_string(identity: &x25519::Identity) -> String {
    identity.to_string().expose_secret().to_string()
}

/// Run blocking key file I/O on the blocking pool.
async fn off_thread<T, F>(key: &str, f: F) -> Result<T, CipherError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, CipherError> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| CipherError::KeyOperation {
            key: key.to_string(),
            reason: format!("key file task failed: {}", e),
        })?
}

/// Publish an identity at `path`. Returns `false` if one already exists.
///
/// The secret is written to a private temporary file and hard-linked into
/// place, so readers never observe a partial key file.
fn store_identity(path: &Path, secret: &str, key: &str) -> Result<bool, CipherError> {
    let fail = |e: std::io::Error| CipherError::KeyOperation {
        key: key.to_string(),
        reason: format!("failed to store identity: {}", e),
    };

    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).map_err(fail)?;
    }

    let staging = path.with_extension(format!("{}.tmp", Uuid::new_v4().simple()));
    let mut options = fs::OpenOptions::new();
    options.write(true).create_new(true);
    // Restrict permissions on key file (Unix only)
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let written = options
        .open(&staging)
        .and_then(|mut file| writeln!(file, "{}", secret).and_then(|()| file.sync_all()));
    let linked = written.and_then(|()| fs::hard_link(&staging, path));
    if let Err(e) = fs::remove_file(&staging) {
        if e.kind() != ErrorKind::NotFound {
            warn!(error = %e, "failed to remove staged identity");
        }
    }

    match linked {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == ErrorKind::AlreadyExists => Ok(false),
        Err(e) => Err(fail(e)),
    }
}

fn load_identity(path: &Path, key: &str) -> Result<Option<x25519::Identity>, CipherError> {
    match fs::read_to_string(path) {
        Ok(contents) => parse_identity(&contents).map(Some),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(CipherError::KeyOperation {
            key: key.to_string(),
            reason: format!("failed to read identity: {}", e),
        }),
    }
}

fn remove_identity(path: &Path, key: &str) -> Result<(), CipherError> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(CipherError::KeyOperation {
            key: key.to_string(),
            reason: format!("failed to delete identity: {}", e),
        }),
    }
}
