//! serde_json backed serializer.

use std::io::Read;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use super::{Serializer, SerializerSettings};
use crate::core::constants::TYPE_MEMBER;
use crate::core::document::Document;
use crate::error::{Result, SerializerError};

/// Plain JSON serializer.
#[derive(Debug, Clone, Default)]
pub struct JsonSerializer {
    settings: SerializerSettings,
}

impl JsonSerializer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: SerializerSettings) -> Self {
        Self { settings }
    }

    /// Indent output.
    pub fn pretty(mut self) -> Self {
        self.settings.pretty = true;
        self
    }

    fn write<T: Serialize + ?Sized>(
        &self,
        value: &T,
    ) -> std::result::Result<String, SerializerError> {
        let text = if self.settings.pretty {
            serde_json::to_string_pretty(value)?
        } else {
            serde_json::to_string(value)?
        };
        Ok(text)
    }
}

#[async_trait]
impl Serializer for JsonSerializer {
    fn settings(&self) -> &SerializerSettings {
        &self.settings
    }

    fn to_json_blocking<D>(&self, doc: &D) -> Result<String>
    where
        D: Document + Serialize,
    {
        Ok(self.write(doc)?)
    }

    /// Objects get a `$type` member holding the Rust type name. Other JSON
    /// values are written unchanged.
    fn to_json_with_types_blocking<D>(&self, doc: &D) -> Result<String>
    where
        D: Document + Serialize,
    {
        let mut value = serde_json::to_value(doc).map_err(SerializerError::Json)?;
        if let Value::Object(members) = &mut value {
            members.insert(
                TYPE_MEMBER.to_string(),
                Value::String(std::any::type_name::<D>().to_string()),
            );
        }
        Ok(self.write(&value)?)
    }

    fn from_json_blocking<D>(&self, text: &str) -> Result<D>
    where
        D: Document + DeserializeOwned,
    {
        serde_json::from_str(text).map_err(|e| SerializerError::Json(e).into())
    }

    fn from_reader_blocking<D, R>(&self, reader: R) -> Result<D>
    where
        D: Document + DeserializeOwned,
        R: Read + Send,
    {
        serde_json::from_reader(reader).map_err(|e| SerializerError::Json(e).into())
    }
}
