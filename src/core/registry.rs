//! Rule registry: which fields of which document types are protected.
//!
//! Rules are added during setup through `&mut RuleRegistry`. Once the
//! registry is handed to a serializer it lives behind an `Arc` and can only
//! be read, so no lock is needed on the hot path.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;

use tracing::{debug, warn};

use super::document::{Document, FieldValue};
use super::path::{Field, FieldPath};

struct Entry {
    type_name: &'static str,
    /// Always a `Vec<FieldPath<D>>` for the `D` this entry is keyed by.
    paths: Box<dyn Any + Send + Sync>,
    count: usize,
}

/// Document type to ordered field paths.
#[derive(Default)]
pub struct RuleRegistry {
    entries: HashMap<TypeId, Entry>,
}

impl RuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Protect one more field of `D`.
    ///
    /// Rules are applied in the order they are added. Adding the same path
    /// twice is allowed but logged, since it encrypts the value twice.
    pub fn add_rule<D, T>(&mut self, field: Field<D, T>) -> &mut Self
    where
        D: Document,
        T: FieldValue,
    {
        let path = FieldPath::from(field);
        let entry = self.entries.entry(TypeId::of::<D>()).or_insert_with(|| Entry {
            type_name: std::any::type_name::<D>(),
            paths: Box::new(Vec::<FieldPath<D>>::new()),
            count: 0,
        });

        let Some(paths) = entry.paths.downcast_mut::<Vec<FieldPath<D>>>() else {
            unreachable!("registry entry keyed by a different document type");
        };

        if paths.contains(&path) {
            warn!(document = entry.type_name, path = %path, "duplicate encryption rule");
        }
        debug!(document = entry.type_name, path = %path, "encryption rule added");

        paths.push(path);
        entry.count += 1;
        self
    }

    /// Rules for `D` in registration order (empty if none).
    pub fn rules_for<D: Document>(&self) -> &[FieldPath<D>] {
        self.entries
            .get(&TypeId::of::<D>())
            .and_then(|entry| entry.paths.downcast_ref::<Vec<FieldPath<D>>>())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Whether `doc`'s type participates in field encryption.
    pub fn has_rules<D: Document>(&self, _doc: &D) -> bool {
        self.is_registered::<D>()
    }

    pub fn is_registered<D: Document>(&self) -> bool {
        self.entries.contains_key(&TypeId::of::<D>())
    }

    /// Total number of rules across all document types.
    pub fn len(&self) -> usize {
        self.entries.values().map(|entry| entry.count).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Names of the registered document types.
    pub fn document_types(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.values().map(|entry| entry.type_name)
    }
}

impl fmt::Debug for RuleRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(
                self.entries
                    .values()
                    .map(|entry| (entry.type_name, entry.count)),
            )
            .finish()
    }
}
