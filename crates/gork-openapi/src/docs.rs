//! Documentation enrichment.
//!
//! Descriptions come from a [`DocExtractor`], looked up by component schema
//! name and by handler name. A type-level description replaces whatever the
//! schema already had; property and operation descriptions only fill gaps.

use crate::specification::{OpenApiSpec, Schema};
use std::collections::BTreeMap;

/// Documentation of a type or function
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Documentation {
    pub description: String,
    pub fields: BTreeMap<String, FieldDoc>,
}

/// Documentation of one struct field
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldDoc {
    pub description: String,
}

/// Source of documentation, e.g. parsed doc comments
pub trait DocExtractor {
    fn extract_type_doc(&self, name: &str) -> Documentation;
    fn extract_function_doc(&self, name: &str) -> Documentation;
}

/// In-memory documentation, filled through builder methods
#[derive(Debug, Clone, Default)]
pub struct StaticDocs {
    types: BTreeMap<String, Documentation>,
    functions: BTreeMap<String, Documentation>,
}

impl StaticDocs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Describe a type
    pub fn type_doc(mut self, name: &str, description: &str) -> Self {
        self.types.entry(name.to_string()).or_default().description = description.to_string();
        self
    }

    /// Describe a field of a type
    pub fn field_doc(mut self, type_name: &str, field: &str, description: &str) -> Self {
        self.types
            .entry(type_name.to_string())
            .or_default()
            .fields
            .insert(
                field.to_string(),
                FieldDoc {
                    description: description.to_string(),
                },
            );
        self
    }

    /// Describe a handler function
    pub fn function_doc(mut self, name: &str, description: &str) -> Self {
        self.functions.entry(name.to_string()).or_default().description = description.to_string();
        self
    }
}

impl DocExtractor for StaticDocs {
    fn extract_type_doc(&self, name: &str) -> Documentation {
        self.types.get(name).cloned().unwrap_or_default()
    }

    fn extract_function_doc(&self, name: &str) -> Documentation {
        self.functions.get(name).cloned().unwrap_or_default()
    }
}

/// Apply documentation to the component schemas and operations of `spec`
pub fn enrich(spec: &mut OpenApiSpec, extractor: &dyn DocExtractor) {
    if let Some(components) = spec.components.as_mut() {
        for (name, schema) in components.schemas.iter_mut() {
            enrich_schema(schema, &extractor.extract_type_doc(name));
        }
    }

    for item in spec.paths.values_mut() {
        for operation in item.operations_mut() {
            let Some(handler) = operation.operation_id.as_deref() else {
                continue;
            };
            let doc = extractor.extract_function_doc(handler);
            if !doc.description.is_empty() && is_blank(&operation.description) {
                operation.description = Some(doc.description);
            }
        }
    }
}

fn enrich_schema(schema: &mut Schema, doc: &Documentation) {
    if !doc.description.is_empty() {
        schema.description = Some(doc.description.clone());
    }

    for (property_name, property) in schema.properties.iter_mut() {
        if !is_blank(&property.description) {
            continue;
        }
        let field = doc.fields.get(property_name).or_else(|| {
            doc.fields
                .iter()
                .find(|(field_name, _)| same_field(field_name, property_name))
                .map(|(_, field)| field)
        });
        if let Some(field) = field.filter(|field| !field.description.is_empty()) {
            property.description = Some(field.description.clone());
        }
    }
}

/// `UserId` matches `user_id` and `userid`
fn same_field(field_name: &str, property_name: &str) -> bool {
    let normalize = |name: &str| {
        name.chars()
            .filter(|c| *c != '_' && *c != '-')
            .map(|c| c.to_ascii_lowercase())
            .collect::<String>()
    };
    normalize(field_name) == normalize(property_name)
}

fn is_blank(description: &Option<String>) -> bool {
    description.as_deref().map(str::is_empty).unwrap_or(true)
}
