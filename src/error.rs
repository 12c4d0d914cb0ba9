//! Error types.
//!
//! One top-level [`Error`] with a sub-enum per concern. Decrypt mismatches and
//! broken field paths have no variant: the transformer leaves such fields as
//! they are.

use thiserror::Error;

/// Top-level error for all fieldseal operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Setup(#[from] SetupError),

    #[error(transparent)]
    Cipher(#[from] CipherError),

    /// The encryption backend failed for a protected field.
    ///
    /// The document must not be persisted when this is returned.
    #[error("failed to encrypt field `{path}`: {source}")]
    Encrypt {
        path: String,
        #[source]
        source: CipherError,
    },

    #[error(transparent)]
    Serializer(#[from] SerializerError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Usage errors of the registration surface.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum SetupError {
    #[error("field encryption not initialized: call use_field_encryption first")]
    NotInitialized,

    #[error("field encryption has already been initialized")]
    AlreadyInitialized,
}

/// Errors raised by encryption backends.
#[derive(Error, Debug)]
pub enum CipherError {
    #[error("encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("decryption failed: {0}")]
    DecryptionFailed(String),

    #[error("invalid key: {0}")]
    InvalidKey(String),

    #[error("key operation failed for `{key}`: {reason}")]
    KeyOperation { key: String, reason: String },

    #[error("backend request failed: {0}")]
    Backend(String),
}

/// Errors from the inner serializer or the data sources it reads from.
#[derive(Error, Debug)]
pub enum SerializerError {
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("column {index} out of range (row has {len} columns)")]
    ColumnOutOfRange { index: usize, len: usize },

    #[error("column {0} is null")]
    NullColumn(usize),

    #[error("failed to read document stream: {0}")]
    Read(#[source] std::io::Error),

    #[error("failed to start blocking runtime: {0}")]
    Runtime(#[source] std::io::Error),

    #[error("blocking call inside a current-thread tokio runtime; use the async variant")]
    NestedRuntime,
}

/// Configuration loading and validation errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    NotFound(String),

    #[error("failed to read config: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

pub type Result<T> = std::result::Result<T, Error>;
