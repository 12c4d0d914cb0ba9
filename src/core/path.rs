//! Typed field accessors and field path descriptors.
//!
//! A [`Field<S, T>`] knows how to read a `T` out of an `S` and how to build a
//! new `S` with that `T` replaced. Fields compose with [`Field::then`] into
//! nested paths (`person.address` then `address.street`), and a path ending in
//! a [`FieldValue`] erases into a [`FieldPath<D>`] that the registry stores.
//!
//! Paths are assembled from real struct fields at compile time, so renaming a
//! field breaks the build instead of silently disabling encryption.
//!
//! ```ignore
//! let street = field!(Person.address).then(field!(Address.street));
//! let middle = field!(Person.profile?).then(field!(Profile.middle_name));
//! ```

use std::fmt;
use std::sync::Arc;

use super::document::FieldValue;

type Getter<S, T> = Arc<dyn for<'a> Fn(&'a S) -> Option<&'a T> + Send + Sync>;
type Setter<S, T> = Arc<dyn Fn(&S, T) -> Option<S> + Send + Sync>;

fn getter<S, T, F>(f: F) -> Getter<S, T>
where
    F: for<'a> Fn(&'a S) -> Option<&'a T> + Send + Sync + 'static,
{
    Arc::new(f)
}

fn setter<S, T, F>(f: F) -> Setter<S, T>
where
    F: Fn(&S, T) -> Option<S> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Typed accessor for a (possibly nested) field of `S` holding a `T`.
pub struct Field<S, T> {
    segments: Vec<&'static str>,
    get: Getter<S, T>,
    set: Setter<S, T>,
}

impl<S: 'static, T: 'static> Field<S, T> {
    /// Build a single-step field from a reader and a copy-with function.
    ///
    /// `get` returns `None` when the field is absent (an unset optional
    /// child). `with` must return a new `S` equal to the input except for
    /// the replaced field.
    pub fn new<G, W>(name: &'static str, get: G, with: W) -> Self
    where
        G: for<'a> Fn(&'a S) -> Option<&'a T> + Send + Sync + 'static,
        W: Fn(&S, T) -> S + Send + Sync + 'static,
    {
        Self {
            segments: vec![name],
            get: getter(get),
            set: setter(move |doc: &S, value: T| Some(with(doc, value))),
        }
    }

    /// Extend this path into a field of `T`.
    ///
    /// Rebuilding the composed path re-reads the intermediate value from the
    /// document it is applied to, replaces the child field, then rebuilds the
    /// parent with the new child. An absent intermediate stops the rebuild.
    pub fn then<U: 'static>(self, next: Field<T, U>) -> Field<S, U> {
        let Field {
            mut segments,
            get: outer_get,
            set: outer_set,
        } = self;
        let Field {
            segments: inner_segments,
            get: inner_get,
            set: inner_set,
        } = next;
        segments.extend(inner_segments);

        let read_outer = Arc::clone(&outer_get);
        let read_inner = Arc::clone(&inner_get);
        let get = getter(move |doc: &S| (read_outer)(doc).and_then(|child| (read_inner)(child)));

        let set = setter(move |doc: &S, value: U| {
            let child = (outer_get)(doc)?;
            let rebuilt = (inner_set)(child, value)?;
            (outer_set)(doc, rebuilt)
        });

        Field { segments, get, set }
    }

    /// Current value, `None` if any step is absent.
    pub fn get<'a>(&self, doc: &'a S) -> Option<&'a T> {
        (self.get)(doc)
    }

    /// New document with the value replaced, `None` if any ancestor is absent.
    pub fn with(&self, doc: &S, value: T) -> Option<S> {
        (self.set)(doc, value)
    }

    /// Field names from the root.
    pub fn segments(&self) -> &[&'static str] {
        &self.segments
    }
}

impl<S, T> Clone for Field<S, T> {
    fn clone(&self) -> Self {
        Self {
            segments: self.segments.clone(),
            get: Arc::clone(&self.get),
            set: Arc::clone(&self.set),
        }
    }
}

impl<S, T> fmt::Debug for Field<S, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("path", &self.segments.join("."))
            .finish()
    }
}

/// Where a protected value lives inside a document of type `D`.
///
/// Holds the ordered field names (for logs and errors) and the type-erased
/// read and rebuild functions of the typed path it came from.
pub struct FieldPath<D> {
    segments: Vec<&'static str>,
    read: Arc<dyn for<'a> Fn(&'a D) -> Option<&'a str> + Send + Sync>,
    write: Arc<dyn Fn(&D, String) -> Option<D> + Send + Sync>,
}

fn reader<D, F>(f: F) -> Arc<dyn for<'a> Fn(&'a D) -> Option<&'a str> + Send + Sync>
where
    F: for<'a> Fn(&'a D) -> Option<&'a str> + Send + Sync + 'static,
{
    Arc::new(f)
}

impl<D: 'static> FieldPath<D> {
    /// Erase a typed field whose leaf is a [`FieldValue`].
    pub fn from_field<T: FieldValue>(field: Field<D, T>) -> Self {
        let Field { segments, get, set } = field;
        Self {
            segments,
            read: reader(move |doc: &D| (get)(doc).and_then(|value| value.as_text())),
            write: Arc::new(move |doc: &D, text: String| (set)(doc, T::from_text(text))),
        }
    }

    /// Leaf text, `None` when an ancestor or the leaf itself is absent.
    pub fn read<'a>(&self, doc: &'a D) -> Option<&'a str> {
        (self.read)(doc)
    }

    /// New document with the leaf replaced by `text`.
    ///
    /// Returns `None` when the path no longer resolves against `doc`.
    pub fn rebuild(&self, doc: &D, text: String) -> Option<D> {
        (self.write)(doc, text)
    }

    pub fn segments(&self) -> &[&'static str] {
        &self.segments
    }

    /// Number of steps from the root to the leaf.
    pub fn depth(&self) -> usize {
        self.segments.len()
    }
}

impl<D: 'static, T: FieldValue> From<Field<D, T>> for FieldPath<D> {
    fn from(field: Field<D, T>) -> Self {
        Self::from_field(field)
    }
}

impl<D> Clone for FieldPath<D> {
    fn clone(&self) -> Self {
        Self {
            segments: self.segments.clone(),
            read: Arc::clone(&self.read),
            write: Arc::clone(&self.write),
        }
    }
}

impl<D> PartialEq for FieldPath<D> {
    fn eq(&self, other: &Self) -> bool {
        self.segments == other.segments
    }
}

impl<D> fmt::Display for FieldPath<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("."))
    }
}

impl<D> fmt::Debug for FieldPath<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("FieldPath").field(&self.segments).finish()
    }
}

/// Build a [`Field`] for a named struct field.
///
/// `field!(Type.name)` reads `name` directly. `field!(Type.name?)` is for an
/// `Option<Child>` field: it reads through the option and rebuilds with
/// `Some(child)`. The type must be `Clone` and nameable by a single
/// identifier at the call site.
#[macro_export]
macro_rules! field {
    ($ty:ident . $name:ident ?) => {
        $crate::core::path::Field::<$ty, _>::new(
            ::core::stringify!($name),
            |doc| doc.$name.as_ref(),
            |doc, value| $ty {
                $name: ::core::option::Option::Some(value),
                ..::core::clone::Clone::clone(doc)
            },
        )
    };
    ($ty:ident . $name:ident) => {
        $crate::core::path::Field::<$ty, _>::new(
            ::core::stringify!($name),
            |doc| ::core::option::Option::Some(&doc.$name),
            |doc, value| $ty {
                $name: value,
                ..::core::clone::Clone::clone(doc)
            },
        )
    };
}
