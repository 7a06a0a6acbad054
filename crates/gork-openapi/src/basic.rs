//! Schemas for primitive and otherwise unstructured kinds.

use crate::specification::Schema;
use gork_core::{TypeDescriptor, TypeKind};

/// Map a leaf kind to its schema. Composite kinds that reach this point fall back to `object`.
pub fn basic_schema(ty: &TypeDescriptor) -> Schema {
    match ty.kind() {
        TypeKind::Bool => Schema::typed("boolean"),
        TypeKind::Int(width) | TypeKind::Uint(width) => Schema {
            format: Some(width.format().to_string()),
            ..Schema::typed("integer")
        },
        TypeKind::Float32 => with_format(Schema::typed("number"), "float"),
        TypeKind::Float64 => with_format(Schema::typed("number"), "double"),
        TypeKind::String => Schema {
            format: ty.format().map(str::to_string),
            ..Schema::typed("string")
        },
        TypeKind::Uintptr => Schema::described("integer", "Pointer-sized integer"),
        TypeKind::Complex64 | TypeKind::Complex128 => Schema::described("string", "Complex number"),
        TypeKind::UnsafePointer => Schema::described("string", "Unsafe pointer"),
        TypeKind::Chan => Schema::described("object", "Channel"),
        TypeKind::Func => Schema::described("object", "Function"),
        TypeKind::Map { .. } => Schema::described("object", "Map with dynamic keys"),
        TypeKind::Interface => Schema {
            description: Some("Any JSON value".to_string()),
            ..Default::default()
        },
        TypeKind::Slice(_) | TypeKind::Array { .. } | TypeKind::Pointer(_) | TypeKind::Struct(_) => {
            Schema::typed("object")
        }
    }
}

fn with_format(schema: Schema, format: &str) -> Schema {
    Schema {
        format: Some(format.to_string()),
        ..schema
    }
}
