//! Constants used throughout fieldseal.
//!
//! Centralizes magic strings and configuration values.

/// Configuration file name (fieldseal.toml).
pub const CONFIG_FILE: &str = "fieldseal.toml";

/// Environment variable holding the log filter.
pub const LOG_ENV: &str = "FIELDSEAL_LOG";

/// Domain separation for per-document AES keys.
pub const DOC_KEY_CONTEXT: &str = "fieldseal/doc-key/";

/// Member carrying the Rust type name in typed JSON output.
pub const TYPE_MEMBER: &str = "$type";

/// Transit key used by the Vault backend when a document has no key.
pub const VAULT_DEFAULT_KEY: &str = "pii-key";

/// Per-request timeout for the Vault backend.
pub const VAULT_TIMEOUT_SECS: u64 = 30;
