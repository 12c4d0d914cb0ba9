//! Registration surface: install field encryption and declare protected
//! fields per document type.
//!
//! ```ignore
//! let mut options = StoreOptions::new(JsonSerializer::new());
//! options.use_field_encryption(service)?;
//! options
//!     .schema_for::<Person>()?
//!     .protect(field!(Person.name))
//!     .protect(field!(Person.address?).then(field!(Address.street)));
//! let serializer = options.build()?;
//! ```

use std::marker::PhantomData;
use std::sync::Arc;

use tracing::debug;

use super::cipher::EncryptionService;
use super::document::{Document, FieldValue};
use super::path::Field;
use super::registry::RuleRegistry;
use super::serializer::{EncryptingSerializer, Serializer};
use crate::error::{Result, SetupError};

/// Serializer configuration collected before the store is built.
pub struct StoreOptions<S> {
    serializer: S,
    service: Option<Arc<dyn EncryptionService>>,
    rules: RuleRegistry,
}

impl<S: Serializer> StoreOptions<S> {
    pub fn new(serializer: S) -> Self {
        Self {
            serializer,
            service: None,
            rules: RuleRegistry::new(),
        }
    }

    /// Encrypt protected fields with `service`.
    ///
    /// # Errors
    ///
    /// Returns `SetupError::AlreadyInitialized` if a service was already
    /// installed.
    pub fn use_field_encryption(
        &mut self,
        service: Arc<dyn EncryptionService>,
    ) -> Result<&mut Self> {
        if self.service.is_some() {
            return Err(SetupError::AlreadyInitialized.into());
        }
        debug!(backend = service.name(), "field encryption enabled");
        self.service = Some(service);
        Ok(self)
    }

    pub fn is_initialized(&self) -> bool {
        self.service.is_some()
    }

    /// Start declaring protected fields of `D`.
    ///
    /// # Errors
    ///
    /// Returns `SetupError::NotInitialized` before
    /// [`use_field_encryption`](Self::use_field_encryption).
    pub fn schema_for<D: Document>(&mut self) -> Result<DocumentMapping<'_, D>> {
        if self.service.is_none() {
            return Err(SetupError::NotInitialized.into());
        }
        Ok(DocumentMapping {
            rules: &mut self.rules,
            _doc: PhantomData,
        })
    }

    /// Rules declared so far.
    pub fn rules(&self) -> &RuleRegistry {
        &self.rules
    }

    /// Freeze the rules and wrap the serializer.
    ///
    /// # Errors
    ///
    /// Returns `SetupError::NotInitialized` if no service was installed.
    pub fn build(self) -> Result<EncryptingSerializer<S>> {
        let service = self.service.ok_or(SetupError::NotInitialized)?;
        debug!(
            documents = self.rules.document_types().count(),
            rules = self.rules.len(),
            "building encrypting serializer"
        );
        Ok(EncryptingSerializer::new(
            self.serializer,
            Arc::new(self.rules),
            service,
        ))
    }
}

/// Protected field declarations for one document type.
pub struct DocumentMapping<'a, D> {
    rules: &'a mut RuleRegistry,
    _doc: PhantomData<fn(D)>,
}

impl<D: Document> DocumentMapping<'_, D> {
    /// Protect `field`. Call order is the order rules are applied in.
    pub fn protect<T: FieldValue>(self, field: Field<D, T>) -> Self {
        self.rules.add_rule(field);
        self
    }
}
