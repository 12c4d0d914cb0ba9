//! Document transformer: applies field rules in one direction.
//!
//! For every rule of the document's type, in registration order, the leaf is
//! read from the current value, passed through the encryption service and
//! written back by rebuilding each ancestor with its child replaced. Later
//! rules see the values rebuilt by earlier ones, so two rules under the same
//! nested parent both land in the final document.

use std::borrow::Cow;
use std::sync::Arc;

use tracing::{debug, trace};

use super::cipher::EncryptionService;
use super::document::Document;
use super::registry::RuleRegistry;
use crate::error::{Error, Result};

/// Direction of a transformation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Write path: plaintext to ciphertext.
    Encrypt,
    /// Read path: ciphertext to plaintext, best effort.
    Decrypt,
}

/// Applies registered field rules to documents.
#[derive(Clone)]
pub struct Transformer {
    rules: Arc<RuleRegistry>,
    service: Arc<dyn EncryptionService>,
}

impl Transformer {
    pub fn new(rules: Arc<RuleRegistry>, service: Arc<dyn EncryptionService>) -> Self {
        Self { rules, service }
    }

    pub fn rules(&self) -> &RuleRegistry {
        &self.rules
    }

    pub fn service(&self) -> &Arc<dyn EncryptionService> {
        &self.service
    }

    /// Encrypt every protected field of `doc`.
    ///
    /// # Errors
    ///
    /// Returns `Error::Encrypt` naming the field if the service fails.
    pub async fn encrypt<'d, D: Document>(&self, doc: &'d D) -> Result<Cow<'d, D>> {
        self.transform(doc, Direction::Encrypt).await
    }

    /// Decrypt every protected field of `doc` that holds readable ciphertext.
    ///
    /// Never fails: fields that don't decrypt are left as they are.
    pub async fn decrypt<'d, D: Document>(&self, doc: &'d D) -> Cow<'d, D> {
        match self.transform(doc, Direction::Decrypt).await {
            Ok(doc) => doc,
            // Decrypt passes have no error path.
            Err(_) => Cow::Borrowed(doc),
        }
    }

    /// Apply all rules for `D` in `direction`.
    ///
    /// Returns `Cow::Borrowed(doc)` when the type has no rules or no field
    /// changed, so callers can detect no-op passes without comparing values.
    pub async fn transform<'d, D: Document>(
        &self,
        doc: &'d D,
        direction: Direction,
    ) -> Result<Cow<'d, D>> {
        let paths = self.rules.rules_for::<D>();
        if paths.is_empty() {
            return Ok(Cow::Borrowed(doc));
        }

        let key = doc.encryption_key();
        let mut current: Cow<'d, D> = Cow::Borrowed(doc);

        for path in paths {
            let Some(value) = path.read(&current) else {
                trace!(path = %path, "field absent, skipping");
                continue;
            };
            let value = value.to_owned();

            let replacement = match direction {
                Direction::Encrypt => self
                    .service
                    .encrypt(&value, key.as_deref())
                    .await
                    .map_err(|source| Error::Encrypt {
                        path: path.to_string(),
                        source,
                    })?,
                Direction::Decrypt => {
                    match self.service.try_decrypt(&value, key.as_deref()).await {
                        Some(plaintext) => plaintext,
                        None => {
                            debug!(path = %path, "value did not decrypt, leaving as is");
                            continue;
                        }
                    }
                }
            };

            match path.rebuild(&current, replacement) {
                Some(rebuilt) => {
                    trace!(path = %path, ?direction, "field transformed");
                    current = Cow::Owned(rebuilt);
                }
                None => trace!(path = %path, "path no longer resolves, skipping"),
            }
        }

        Ok(current)
    }
}

impl std::fmt::Debug for Transformer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transformer")
            .field("rules", &self.rules)
            .field("service", &self.service.name())
            .finish()
    }
}
