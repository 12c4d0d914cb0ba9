//! Encryption service selection from configuration.

use std::sync::Arc;

use tracing::debug;

use super::{AesGcm, AgeService, EncryptionService};
use crate::core::config::{BackendKind, Config};
use crate::error::{ConfigError, Result};

/// Build the encryption service selected by `config`.
///
/// # Errors
///
/// Returns `ConfigError::Invalid` if the selected backend's section is
/// missing or unusable, or if the backend was not compiled in.
pub fn from_config(config: &Config) -> Result<Arc<dyn EncryptionService>> {
    config.validate()?;

    match config.cipher.backend {
        BackendKind::Aes => {
            debug!("creating aes encryption service");
            let aes = config.aes.as_ref().ok_or_else(|| missing("aes"))?;
            Ok(Arc::new(AesGcm::from_base64(&aes.key)?))
        }

        BackendKind::Age => {
            debug!("creating age encryption service");
            let age = config.age.as_ref().ok_or_else(|| missing("age"))?;
            let mut service = AgeService::from_identity_str(&age.identity)?;
            if let Some(dir) = &age.key_dir {
                service = service.with_key_dir(dir);
            }
            Ok(Arc::new(service))
        }

        #[cfg(feature = "vault")]
        BackendKind::Vault => {
            let vault = config.vault.as_ref().ok_or_else(|| missing("vault"))?;
            debug!(address = %vault.address, "creating vault encryption service");
            let mut service = super::VaultTransit::new(&vault.address, &vault.token)?;
            if let Some(key) = &vault.default_key {
                service = service.with_default_key(key);
            }
            Ok(Arc::new(service))
        }

        #[cfg(not(feature = "vault"))]
        BackendKind::Vault => Err(ConfigError::Invalid(
            "vault support not compiled. Rebuild with: --features vault".to_string(),
        )
        .into()),
    }
}

fn missing(section: &str) -> ConfigError {
    ConfigError::Invalid(format!("[{}] section is missing", section))
}
