//! The name-keyed registry of emitted schemas (C9).

use std::collections::BTreeMap;

use crate::schema::Schema;

/// A stable schema name: either a bare nominal identifier (`UserDto`) or a
/// generic instantiation in unencoded bracket notation
/// (`PaginatedResponse<UserDto>`, §3). Never URL-encoded (§8).
pub type SchemaName = String;

/// Maps [`SchemaName`] to [`Schema`].
///
/// Backed by a [`BTreeMap`] rather than an insertion-ordered map: §5
/// requires `components.schemas` to serialize in sorted order regardless of
/// compilation order, so sorted iteration is the registry's native order
/// rather than something a later pass has to impose.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    entries: BTreeMap<SchemaName, Schema>,
}

impl SchemaRegistry {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces the schema for `name`.
    ///
    /// Returns the previous entry, if any had already been registered under
    /// the same name (e.g. two use sites of the same nominal type).
    pub fn insert(&mut self, name: impl Into<SchemaName>, schema: Schema) -> Option<Schema> {
        self.entries.insert(name.into(), schema)
    }

    /// Looks up a schema by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Schema> {
        self.entries.get(name)
    }

    /// Looks up a schema by name, mutably.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut Schema> {
        self.entries.get_mut(name)
    }

    /// `true` if a schema is already registered under `name`.
    ///
    /// Used by the type compiler's memoization (§4.5): a placeholder is
    /// inserted before descending into a type's properties so a recursive
    /// re-entry finds `contains_key` true and emits a `$ref` instead of
    /// recursing forever.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Removes a schema, returning it if present.
    pub fn remove(&mut self, name: &str) -> Option<Schema> {
        self.entries.remove(name)
    }

    /// Iterates entries in sorted name order.
    pub fn iter(&self) -> impl Iterator<Item = (&SchemaName, &Schema)> {
        self.entries.iter()
    }

    /// The number of registered schemas.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `true` if no schemas are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Consumes the registry, returning the underlying sorted map — used by
    /// document assembly to populate `components.schemas` directly.
    #[must_use]
    pub fn into_inner(self) -> BTreeMap<SchemaName, Schema> {
        self.entries
    }
}
