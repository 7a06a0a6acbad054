//! `oneOf` schemas for union-shaped types.
//!
//! A type is a union when it is one of the generic `UnionN` wrappers, or when it
//! is an exported struct with at least two fields that are all `Option`s. Every
//! `Option` field is a variant. A discriminator is only emitted when each variant
//! is a struct with exactly one `openapi:"discriminator=<value>"` field and all of
//! those fields share the same wire name.

use crate::registry::SchemaRegistry;
use crate::schema::{generate_schema, schema_name};
use crate::specification::{Discriminator, Schema, SCHEMA_REF_PREFIX};
use gork_core::{discriminator_value, wire_name, TypeDescriptor, TypeKind};
use std::collections::BTreeMap;

/// Whether `ty` should render as `oneOf`
pub fn is_union_type(ty: &TypeDescriptor) -> bool {
    let Some(layout) = ty.as_struct() else {
        return false;
    };
    if layout.is_union_wrapper() {
        return true;
    }
    ty.is_exported()
        && layout.fields().len() >= 2
        && layout.fields().iter().all(|field| field.ty().is_pointer())
}

/// Discriminator state gathered while walking the variants
#[derive(Debug, Clone)]
pub struct DiscriminatorInfo {
    property_name: Option<String>,
    mapping: BTreeMap<String, String>,
    valid: bool,
}

impl Default for DiscriminatorInfo {
    fn default() -> Self {
        Self {
            property_name: None,
            mapping: BTreeMap::new(),
            valid: true,
        }
    }
}

impl DiscriminatorInfo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one variant. Once invalidated the info stays invalid.
    pub fn add_variant(&mut self, variant: &TypeDescriptor, variant_schema: &Schema) {
        if !self.valid {
            return;
        }
        match variant_discriminator(variant) {
            Some((property, value)) => {
                if *self.property_name.get_or_insert_with(|| property.clone()) != property {
                    self.valid = false;
                    return;
                }
                let target = variant_schema
                    .reference
                    .clone()
                    .or_else(|| schema_name(variant).map(|name| format!("{}{}", SCHEMA_REF_PREFIX, name)));
                match target {
                    Some(target) => {
                        self.mapping.insert(value, target);
                    }
                    None => self.valid = false,
                }
            }
            None => self.valid = false,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// The discriminator, if every variant agreed on one
    pub fn into_discriminator(self) -> Option<Discriminator> {
        if !self.valid {
            return None;
        }
        self.property_name.map(|property_name| Discriminator {
            property_name,
            mapping: self.mapping,
        })
    }
}

/// `(wire name, value)` of the single discriminator field of a struct variant
fn variant_discriminator(variant: &TypeDescriptor) -> Option<(String, String)> {
    let layout = variant.as_struct()?;
    let mut found = layout.fields().iter().filter_map(|field| {
        let value = field
            .tag()
            .get("openapi")
            .and_then(|tag| discriminator_value(&tag))?;
        Some((wire_name(field)?, value))
    });
    let first = found.next()?;
    if found.next().is_some() {
        return None;
    }
    Some(first)
}

/// Generate and register the `oneOf` schema of a union type
pub fn generate_union_schema(ty: &TypeDescriptor, registry: &mut SchemaRegistry) -> Schema {
    let name = schema_name(ty);
    if let Some(name) = &name {
        if registry.contains(name) {
            return Schema::reference(name);
        }
        registry.reserve(name);
    }

    let mut info = DiscriminatorInfo::new();
    let mut variants = Vec::new();
    if let Some(layout) = ty.as_struct() {
        for field in layout.fields() {
            let TypeKind::Pointer(target) = field.ty().kind().clone() else {
                continue;
            };
            let variant = target();
            let variant_schema = generate_schema(&variant, registry, false);
            info.add_variant(&variant, &variant_schema);
            variants.push(variant_schema);
        }
    }

    let schema = Schema {
        one_of: variants,
        discriminator: info.into_discriminator(),
        ..Default::default()
    };

    match name {
        Some(name) => {
            registry.register(&name, schema);
            Schema::reference(&name)
        }
        None => schema,
    }
}
