//! Serializer decorator that encrypts protected fields.
//!
//! Writes encrypt a copy of the document and hand it to the inner
//! serializer; the caller's value is never touched. Reads deserialize with
//! the inner serializer and then decrypt whatever decrypts. Types without
//! rules go straight through.
//!
//! The decorator is itself a [`Serializer`], so it stands in wherever the
//! inner one is expected. The `_blocking` forms drive the async ones through
//! [`block_on`](crate::core::runtime::block_on) and fail with
//! `SerializerError::NestedRuntime` on a current-thread tokio runtime.

use std::borrow::Cow;
use std::io::Read;
use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::io::AsyncRead;
use tracing::debug;

use super::{DataRow, Serializer, SerializerSettings};
use crate::core::cipher::EncryptionService;
use crate::core::document::Document;
use crate::core::registry::RuleRegistry;
use crate::core::runtime::block_on;
use crate::core::transform::Transformer;
use crate::error::Result;

/// Wraps a [`Serializer`] and applies field encryption rules.
#[derive(Debug)]
pub struct EncryptingSerializer<S> {
    inner: S,
    transformer: Transformer,
}

impl<S: Serializer> EncryptingSerializer<S> {
    pub fn new(inner: S, rules: Arc<RuleRegistry>, service: Arc<dyn EncryptionService>) -> Self {
        Self {
            inner,
            transformer: Transformer::new(rules, service),
        }
    }

    /// The wrapped serializer.
    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn transformer(&self) -> &Transformer {
        &self.transformer
    }

    pub fn registry(&self) -> &RuleRegistry {
        self.transformer.rules()
    }

    async fn seal<'d, D: Document>(&self, doc: &'d D) -> Result<Cow<'d, D>> {
        if !self.registry().has_rules(doc) {
            return Ok(Cow::Borrowed(doc));
        }
        debug!(document = std::any::type_name::<D>(), "encrypting protected fields");
        self.transformer.encrypt(doc).await
    }

    async fn open<D: Document>(&self, doc: D) -> D {
        if !self.registry().has_rules(&doc) {
            return doc;
        }
        debug!(document = std::any::type_name::<D>(), "decrypting protected fields");
        let rebuilt = match self.transformer.decrypt(&doc).await {
            Cow::Owned(rebuilt) => Some(rebuilt),
            Cow::Borrowed(_) => None,
        };
        rebuilt.unwrap_or(doc)
    }
}

#[async_trait]
impl<S: Serializer> Serializer for EncryptingSerializer<S> {
    /// Settings of the wrapped serializer.
    fn settings(&self) -> &SerializerSettings {
        self.inner.settings()
    }

    fn to_json_blocking<D>(&self, doc: &D) -> Result<String>
    where
        D: Document + Serialize,
    {
        block_on(self.to_json(doc))?
    }

    fn to_json_with_types_blocking<D>(&self, doc: &D) -> Result<String>
    where
        D: Document + Serialize,
    {
        block_on(self.to_json_with_types(doc))?
    }

    fn to_clean_json_blocking<D>(&self, doc: &D) -> Result<String>
    where
        D: Document + Serialize,
    {
        block_on(self.to_clean_json(doc))?
    }

    fn from_json_blocking<D>(&self, text: &str) -> Result<D>
    where
        D: Document + DeserializeOwned,
    {
        block_on(self.from_json(text))?
    }

    fn from_reader_blocking<D, R>(&self, reader: R) -> Result<D>
    where
        D: Document + DeserializeOwned,
        R: Read + Send,
    {
        block_on(self.from_reader(reader))?
    }

    fn from_async_reader_blocking<D, R>(&self, reader: R) -> Result<D>
    where
        D: Document + DeserializeOwned,
        R: AsyncRead + Unpin + Send,
    {
        block_on(self.from_async_reader(reader))?
    }

    fn from_row_blocking<D, R>(&self, row: &R, index: usize) -> Result<D>
    where
        D: Document + DeserializeOwned,
        R: DataRow + Sync + ?Sized,
    {
        block_on(self.from_row(row, index))?
    }

    /// Serialize `doc` with its protected fields encrypted.
    ///
    /// # Errors
    ///
    /// Returns `Error::Encrypt` if the service fails for any field. Nothing
    /// is serialized in that case.
    async fn to_json<D>(&self, doc: &D) -> Result<String>
    where
        D: Document + Serialize,
    {
        let sealed = self.seal(doc).await?;
        self.inner.to_json(&*sealed).await
    }

    async fn to_json_with_types<D>(&self, doc: &D) -> Result<String>
    where
        D: Document + Serialize,
    {
        let sealed = self.seal(doc).await?;
        self.inner.to_json_with_types(&*sealed).await
    }

    /// Serialize `doc` with protected fields in plaintext.
    ///
    /// Fields holding ciphertext are decrypted first; plaintext fields are
    /// written as they are. No encryption happens on this path.
    async fn to_clean_json<D>(&self, doc: &D) -> Result<String>
    where
        D: Document + Serialize,
    {
        let opened = if self.registry().has_rules(doc) {
            self.transformer.decrypt(doc).await
        } else {
            Cow::Borrowed(doc)
        };
        self.inner.to_clean_json(&*opened).await
    }

    /// Deserialize `text` and decrypt the protected fields.
    ///
    /// Fields that fail to decrypt keep their stored value.
    async fn from_json<D>(&self, text: &str) -> Result<D>
    where
        D: Document + DeserializeOwned,
    {
        let doc = self.inner.from_json(text).await?;
        Ok(self.open(doc).await)
    }

    async fn from_reader<D, R>(&self, reader: R) -> Result<D>
    where
        D: Document + DeserializeOwned,
        R: Read + Send,
    {
        let doc = self.inner.from_reader(reader).await?;
        Ok(self.open(doc).await)
    }

    async fn from_async_reader<D, R>(&self, reader: R) -> Result<D>
    where
        D: Document + DeserializeOwned,
        R: AsyncRead + Unpin + Send,
    {
        let doc = self.inner.from_async_reader(reader).await?;
        Ok(self.open(doc).await)
    }

    async fn from_row<D, R>(&self, row: &R, index: usize) -> Result<D>
    where
        D: Document + DeserializeOwned,
        R: DataRow + Sync + ?Sized,
    {
        let doc = self.inner.from_row(row, index).await?;
        Ok(self.open(doc).await)
    }
}
