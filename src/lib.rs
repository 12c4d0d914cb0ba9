//! Fieldseal - selective field-level encryption for serialized documents.
//!
//! Declare which fields of a document type are sensitive, and the
//! [`EncryptingSerializer`] encrypts exactly those fields on write and
//! decrypts them on read. Everything else is stored as plain JSON, so it
//! stays queryable.
//!
//! # Architecture
//!
//! ```text
//! src/
//! ├── cli/              # Command-line interface
//! │   ├── keygen        # Key generation
//! │   ├── check         # Config and backend check
//! │   └── demo          # End-to-end walkthrough
//! └── core/             # Core library components
//!     ├── document      # Document and FieldValue traits
//!     ├── path          # Typed field accessors and field paths
//!     ├── registry      # Rule registry
//!     ├── transform     # Document transformer
//!     ├── serializer/   # Serializer trait, JSON and encrypting serializers
//!     ├── setup         # Registration surface
//!     ├── runtime       # Blocking calls into async code
//!     ├── config        # fieldseal.toml management
//!     └── cipher/       # Encryption backends
//!         ├── mod       # EncryptionService trait
//!         ├── aes       # AES-256-GCM with derived per-document keys
//!         ├── age       # age identities with a per-document keyring
//!         └── vault     # HashiCorp Vault transit engine
//! ```
//!
//! # Example
//!
//! ```ignore
//! use fieldseal::{field, Document, JsonSerializer, Serializer, StoreOptions};
//!
//! let mut options = StoreOptions::new(JsonSerializer::new());
//! options.use_field_encryption(service)?;
//! options
//!     .schema_for::<Person>()?
//!     .protect(field!(Person.name))
//!     .protect(field!(Person.address).then(field!(Address.street)));
//! let serializer = options.build()?;
//!
//! let stored = serializer.to_json(&person).await?;
//! let loaded: Person = serializer.from_json(&stored).await?;
//! ```

pub mod cli;
pub mod core;
pub mod error;

pub use crate::core::cipher::EncryptionService;
pub use crate::core::document::{Document, FieldValue};
pub use crate::core::path::{Field, FieldPath};
pub use crate::core::registry::RuleRegistry;
pub use crate::core::serializer::{EncryptingSerializer, JsonSerializer, Serializer};
pub use crate::core::setup::StoreOptions;
pub use crate::core::transform::{Direction, Transformer};
pub use crate::error::{Error, Result};
