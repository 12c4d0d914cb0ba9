//! Configuration file management.
//!
//! Handles reading, writing, and validating `fieldseal.toml` files, which
//! select and parameterize the encryption backend.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::constants;
use crate::error::{ConfigError, Result};

/// Encryption backend selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// AES-256-GCM with a local key (default)
    #[default]
    Aes,
    /// age x25519 identities
    Age,
    /// HashiCorp Vault transit engine
    Vault,
}

impl BackendKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Aes => "aes",
            Self::Age => "age",
            Self::Vault => "vault",
        }
    }
}

/// Project configuration stored in `fieldseal.toml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Which backend encrypts protected fields
    #[serde(default)]
    pub cipher: CipherConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aes: Option<AesConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<AgeConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vault: Option<VaultConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CipherConfig {
    #[serde(default)]
    pub backend: BackendKind,
}

/// AES backend settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AesConfig {
    /// Base64 encoded 32-byte master key
    pub key: String,
}

/// age backend settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgeConfig {
    /// Default identity (`AGE-SECRET-KEY-1...`)
    pub identity: String,
    /// Directory for per-document identities; in-memory only when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_dir: Option<PathBuf>,
}

/// Vault transit backend settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VaultConfig {
    /// Server address, e.g. `http://127.0.0.1:8200`
    pub address: String,
    pub token: String,
    /// Transit key for documents without their own key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_key: Option<String>,
}

impl Config {
    /// Create a configuration for `backend` with no backend section yet.
    pub fn new(backend: BackendKind) -> Self {
        Self {
            cipher: CipherConfig { backend },
            ..Self::default()
        }
    }

    /// Default path in the current directory.
    pub fn default_path() -> PathBuf {
        PathBuf::from(constants::CONFIG_FILE)
    }

    /// Load and validate a configuration file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NotFound` if the file doesn't exist,
    /// `ConfigError::Parse` if the TOML is malformed, or
    /// `ConfigError::Invalid` if the selected backend is not configured.
    pub fn load(path: &Path) -> Result<Self> {
        debug!(path = %path.display(), "loading config");

        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()).into());
        }
        let contents = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        let config: Self = contents.parse()?;

        debug!(backend = config.cipher.backend.name(), "config loaded");
        Ok(config)
    }

    /// Save configuration as pretty TOML.
    pub fn save(&self, path: &Path) -> Result<()> {
        debug!(path = %path.display(), "saving config");

        let contents = toml::to_string_pretty(self).map_err(ConfigError::Serialize)?;
        std::fs::write(path, contents)?;

        Ok(())
    }

    /// Check that the selected backend has a usable section.
    pub fn validate(&self) -> Result<()> {
        match self.cipher.backend {
            BackendKind::Aes => {
                let aes = self.aes.as_ref().ok_or_else(|| missing("aes"))?;
                if aes.key.trim().is_empty() {
                    return Err(ConfigError::Invalid("aes.key is empty".to_string()).into());
                }
            }
            BackendKind::Age => {
                let age = self.age.as_ref().ok_or_else(|| missing("age"))?;
                if !age.identity.trim().starts_with("AGE-SECRET-KEY-") {
                    return Err(ConfigError::Invalid(
                        "age.identity must be an AGE-SECRET-KEY".to_string(),
                    )
                    .into());
                }
            }
            BackendKind::Vault => {
                let vault = self.vault.as_ref().ok_or_else(|| missing("vault"))?;
                if !(vault.address.starts_with("http://") || vault.address.starts_with("https://"))
                {
                    return Err(ConfigError::Invalid(format!(
                        "vault.address must be an http(s) URL, got {}",
                        vault.address
                    ))
                    .into());
                }
                if vault.token.trim().is_empty() {
                    return Err(ConfigError::Invalid("vault.token is empty".to_string()).into());
                }
            }
        }
        Ok(())
    }
}

impl FromStr for Config {
    type Err = crate::error::Error;

    fn from_str(s: &str) -> Result<Self> {
        let config: Self = toml::from_str(s).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }
}

fn missing(section: &str) -> ConfigError {
    ConfigError::Invalid(format!(
        "backend `{}` selected but [{}] section is missing",
        section, section
    ))
}
