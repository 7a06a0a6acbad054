use crate::specification::Schema;
use indexmap::IndexMap;
use std::collections::BTreeMap;
use tracing::debug;

/// Component schemas collected during one generation pass.
///
/// A name is reserved before its body is generated, so a type that refers back
/// to itself resolves to a `$ref` instead of recursing forever. Not meant to be
/// shared between concurrent generation passes.
#[derive(Debug)]
pub struct SchemaRegistry {
    schemas: IndexMap<String, Schema>,
    nullable_fields: bool,
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self {
            schemas: IndexMap::new(),
            nullable_fields: true,
        }
    }
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `Option<T>` struct fields render as nullable. On by default.
    pub fn with_nullable_fields(mut self, nullable: bool) -> Self {
        self.nullable_fields = nullable;
        self
    }

    pub fn nullable_fields(&self) -> bool {
        self.nullable_fields
    }

    pub fn contains(&self, name: &str) -> bool {
        self.schemas.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&Schema> {
        self.schemas.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Schema> {
        self.schemas.get_mut(name)
    }

    /// Claim `name` with a placeholder body until [`SchemaRegistry::register`] fills it in
    pub fn reserve(&mut self, name: &str) {
        self.schemas.entry(name.to_string()).or_default();
    }

    /// Store the generated body for `name`
    pub fn register(&mut self, name: &str, schema: Schema) {
        debug!(schema = %name, "registered component schema");
        self.schemas.insert(name.to_string(), schema);
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.schemas.keys().map(String::as_str)
    }

    /// Hand the collected schemas over to the document's components
    pub fn into_schemas(self) -> BTreeMap<String, Schema> {
        self.schemas.into_iter().collect()
    }
}
