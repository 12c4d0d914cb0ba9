//! Document and field value capabilities.

/// A value persisted and retrieved as a unit.
///
/// Documents are treated as immutable: the transformer never edits one in
/// place, it builds a new value through the copy-with functions of the
/// registered fields.
///
/// Override [`Document::encryption_key`] to scope every field transform of
/// a document to its own key (per tenant, per record, ...). Types without a
/// dedicated key keep the default and the backend uses its implicit key.
///
/// ```ignore
/// impl Document for Person {
///     fn encryption_key(&self) -> Option<String> {
///         Some(self.id.to_string())
///     }
/// }
/// ```
pub trait Document: Clone + Send + Sync + 'static {
    /// Key identifier threaded into every encryption call for this document.
    fn encryption_key(&self) -> Option<String> {
        None
    }
}

/// A leaf value that can be protected.
///
/// The leaf must have a text representation (encryption input) and be
/// rebuildable from text (encryption output). Absent values are skipped.
pub trait FieldValue: Send + Sync + 'static {
    /// Text to transform, or `None` when the value is absent.
    fn as_text(&self) -> Option<&str>;

    /// Rebuild the value from transformed text.
    fn from_text(text: String) -> Self;
}

impl FieldValue for String {
    fn as_text(&self) -> Option<&str> {
        Some(self.as_str())
    }

    fn from_text(text: String) -> Self {
        text
    }
}

impl FieldValue for Option<String> {
    fn as_text(&self) -> Option<&str> {
        self.as_deref()
    }

    fn from_text(text: String) -> Self {
        Some(text)
    }
}
