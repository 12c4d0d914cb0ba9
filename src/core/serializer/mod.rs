//! Serializer contract and its implementations.
//!
//! [`Serializer`] is the contract a persistence host uses to turn documents
//! into text and back. [`JsonSerializer`] is the plain serde_json
//! implementation; [`EncryptingSerializer`] wraps any serializer and encrypts
//! protected fields on the way out and decrypts them on the way in.

use std::io::Read;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::core::document::Document;
use crate::core::runtime::block_on;
use crate::error::{Result, SerializerError};

mod encrypting;
mod json;

pub use encrypting::EncryptingSerializer;
pub use json::JsonSerializer;

/// Member name casing the host uses when querying serialized documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Casing {
    /// Field names as declared
    #[default]
    Default,
    CamelCase,
    SnakeCase,
}

/// How the host stores enum values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnumStorage {
    #[default]
    AsString,
    AsInteger,
}

/// Format options of a serializer.
///
/// Wrappers must report the settings of the serializer they wrap.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SerializerSettings {
    pub casing: Casing,
    pub enum_storage: EnumStorage,
    /// Indent output
    pub pretty: bool,
}

/// One row of a tabular result, read by column index.
pub trait DataRow {
    /// Number of columns.
    fn len(&self) -> usize;

    /// Column value, `None` if `index` is out of range, `Some(None)` for null.
    fn get(&self, index: usize) -> Option<Option<&str>>;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Column value or an error naming the bad index.
    fn column(&self, index: usize) -> std::result::Result<Option<&str>, SerializerError> {
        self.get(index).ok_or(SerializerError::ColumnOutOfRange {
            index,
            len: self.len(),
        })
    }
}

impl DataRow for [Option<String>] {
    fn len(&self) -> usize {
        <[Option<String>]>::len(self)
    }

    fn get(&self, index: usize) -> Option<Option<&str>> {
        <[Option<String>]>::get(self, index).map(Option::as_deref)
    }
}

impl DataRow for Vec<Option<String>> {
    fn len(&self) -> usize {
        self.as_slice().len()
    }

    fn get(&self, index: usize) -> Option<Option<&str>> {
        DataRow::get(self.as_slice(), index)
    }
}

/// Document to text and back.
///
/// Every operation has an async form and a `_blocking` form so hosts of
/// either kind can program against one trait. A synchronous serializer only
/// implements the required `_blocking` methods; the async forms default to
/// calling them. Wrappers such as [`EncryptingSerializer`] override both.
#[async_trait]
pub trait Serializer: Send + Sync {
    /// Format options of this serializer.
    fn settings(&self) -> &SerializerSettings;

    fn to_json_blocking<D>(&self, doc: &D) -> Result<String>
    where
        D: Document + Serialize;

    /// Serialize with embedded type metadata.
    fn to_json_with_types_blocking<D>(&self, doc: &D) -> Result<String>
    where
        D: Document + Serialize;

    /// Serialize with every protected field in plaintext. A serializer
    /// without field protection writes the plain form.
    fn to_clean_json_blocking<D>(&self, doc: &D) -> Result<String>
    where
        D: Document + Serialize,
    {
        self.to_json_blocking(doc)
    }

    fn from_json_blocking<D>(&self, text: &str) -> Result<D>
    where
        D: Document + DeserializeOwned;

    fn from_reader_blocking<D, R>(&self, reader: R) -> Result<D>
    where
        D: Document + DeserializeOwned,
        R: Read + Send;

    fn from_async_reader_blocking<D, R>(&self, reader: R) -> Result<D>
    where
        D: Document + DeserializeOwned,
        R: AsyncRead + Unpin + Send,
    {
        block_on(self.from_async_reader(reader))?
    }

    /// Deserialize the document stored in column `index` of `row`.
    ///
    /// # Errors
    ///
    /// `ColumnOutOfRange` for a bad index, `NullColumn` for a null value.
    fn from_row_blocking<D, R>(&self, row: &R, index: usize) -> Result<D>
    where
        D: Document + DeserializeOwned,
        R: DataRow + Sync + ?Sized,
    {
        let text = row.column(index)?.ok_or(SerializerError::NullColumn(index))?;
        self.from_json_blocking(text)
    }

    async fn to_json<D>(&self, doc: &D) -> Result<String>
    where
        D: Document + Serialize,
    {
        self.to_json_blocking(doc)
    }

    async fn to_json_with_types<D>(&self, doc: &D) -> Result<String>
    where
        D: Document + Serialize,
    {
        self.to_json_with_types_blocking(doc)
    }

    async fn to_clean_json<D>(&self, doc: &D) -> Result<String>
    where
        D: Document + Serialize,
    {
        self.to_clean_json_blocking(doc)
    }

    async fn from_json<D>(&self, text: &str) -> Result<D>
    where
        D: Document + DeserializeOwned,
    {
        self.from_json_blocking(text)
    }

    async fn from_reader<D, R>(&self, reader: R) -> Result<D>
    where
        D: Document + DeserializeOwned,
        R: Read + Send,
    {
        self.from_reader_blocking(reader)
    }

    /// Deserialize from an async byte stream, read to the end first.
    async fn from_async_reader<D, R>(&self, mut reader: R) -> Result<D>
    where
        D: Document + DeserializeOwned,
        R: AsyncRead + Unpin + Send,
    {
        let mut bytes = Vec::new();
        reader
            .read_to_end(&mut bytes)
            .await
            .map_err(SerializerError::Read)?;
        self.from_reader_blocking(bytes.as_slice())
    }

    async fn from_row<D, R>(&self, row: &R, index: usize) -> Result<D>
    where
        D: Document + DeserializeOwned,
        R: DataRow + Sync + ?Sized,
    {
        self.from_row_blocking(row, index)
    }
}
