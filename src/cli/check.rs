//! Config and backend check.

use std::path::PathBuf;

use tracing::debug;

use crate::cli::{config_path, output};
use crate::core::cipher;
use crate::core::config::Config;
use crate::core::runtime::block_on;
use crate::error::{CipherError, Result};

const SAMPLE: &str = "fieldseal-check";

/// Load the config, build the backend and round-trip a sample value.
pub fn execute(config: Option<PathBuf>) -> Result<()> {
    let path = config_path(config);
    let config = Config::load(&path)?;
    let service = cipher::from_config(&config)?;

    output::section("Fieldseal Check");
    output::kv("config", path.display());
    output::kv("backend", service.name());

    let recovered = block_on(async {
        let sealed = service.encrypt(SAMPLE, None).await?;
        debug!(len = sealed.len(), "sample encrypted");
        Ok::<_, CipherError>(service.try_decrypt(&sealed, None).await)
    })??;

    if recovered.as_deref() != Some(SAMPLE) {
        return Err(CipherError::DecryptionFailed("sample value did not round-trip".to_string()).into());
    }

    println!();
    output::success("round trip ok");
    Ok(())
}
