//! Recursive schema synthesis over type descriptors.
//!
//! Named composite types (structs and unions) become component schemas in the
//! [`SchemaRegistry`] and are referenced with `$ref`; everything else is inlined.

use crate::basic::basic_schema;
use crate::constraints::apply_validation_constraints;
use crate::registry::SchemaRegistry;
use crate::specification::{Schema, SchemaType};
use crate::union::{generate_union_schema, is_union_type};
use gork_core::{
    has_explicit_name, parse_param_tag, parse_rule_invocations, wire_name, StructType,
    TypeDescriptor, TypeKind,
};
use tracing::warn;

/// Extension key carrying parsed `rule` tags
pub const RULES_EXTENSION: &str = "x-rules";

/// Generate the schema of `ty`, registering named composite types in `registry`.
///
/// With `make_pointer_nullable` set, `Option<T>` renders as a nullable `T`; otherwise
/// the option layer is unwrapped as-is, which is what top-level request and
/// response bodies use.
pub fn generate_schema(
    ty: &TypeDescriptor,
    registry: &mut SchemaRegistry,
    make_pointer_nullable: bool,
) -> Schema {
    if let TypeKind::Pointer(target) = ty.kind() {
        let inner = generate_schema(&target(), registry, make_pointer_nullable);
        return if make_pointer_nullable {
            make_nullable(inner)
        } else {
            inner
        };
    }

    if is_union_type(ty) {
        return generate_union_schema(ty, registry);
    }

    if let Some(name) = schema_name(ty) {
        if registry.contains(&name) {
            return Schema::reference(&name);
        }
    }

    match ty.kind() {
        TypeKind::Struct(layout) => generate_struct_schema(ty, layout, registry),
        TypeKind::Slice(_) if ty.is_byte_slice() => Schema {
            format: Some("byte".to_string()),
            ..Schema::typed("string")
        },
        TypeKind::Slice(elem) => array_schema(&elem(), registry),
        TypeKind::Array { elem, len } => {
            let len = *len as u64;
            Schema {
                min_items: Some(len),
                max_items: Some(len),
                ..array_schema(&elem(), registry)
            }
        }
        _ => basic_schema(ty),
    }
}

/// Component name of a named type
pub fn schema_name(ty: &TypeDescriptor) -> Option<String> {
    ty.name()
        .filter(|name| !name.is_empty())
        .map(sanitize_schema_name)
}

/// Make a component-safe name: generic arguments lose their package path and are
/// joined with `_`, and characters outside `[A-Za-z0-9.\-_]` become `_`.
pub fn sanitize_schema_name(name: &str) -> String {
    let flattened = match (name.find('['), name.strip_suffix(']')) {
        (Some(open), Some(without_close)) => {
            let mut out = name[..open].to_string();
            for arg in split_generic_args(&without_close[open + 1..]) {
                out.push('_');
                out.push_str(short_type_name(arg.trim()));
            }
            out
        }
        _ => name.to_string(),
    };

    flattened
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

fn split_generic_args(args: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in args.char_indices() {
        match c {
            '[' => depth += 1,
            ']' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(&args[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&args[start..]);
    parts
}

fn short_type_name(arg: &str) -> &str {
    let last_segment = arg.rsplit('/').next().unwrap_or(arg);
    match last_segment.split_once('.') {
        Some((_, rest)) => rest,
        None => last_segment,
    }
}

/// Allow `null` alongside the schema. Primitive types use the type-array form;
/// references, objects and compositions are wrapped in `anyOf`.
pub fn make_nullable(schema: Schema) -> Schema {
    let composite = schema.is_reference()
        || !schema.properties.is_empty()
        || !schema.one_of.is_empty()
        || !schema.any_of.is_empty();

    if composite {
        if schema.any_of.iter().any(is_null_schema) {
            return schema;
        }
        return Schema {
            any_of: vec![schema, Schema::typed("null")],
            ..Default::default()
        };
    }

    match schema.schema_type.clone() {
        Some(SchemaType::Single(t)) if t == "null" => schema,
        Some(SchemaType::Single(t)) => Schema {
            schema_type: Some(SchemaType::Union(vec![t, "null".to_string()])),
            ..schema
        },
        Some(SchemaType::Union(mut types)) => {
            if !types.iter().any(|t| t == "null") {
                types.push("null".to_string());
            }
            Schema {
                schema_type: Some(SchemaType::Union(types)),
                ..schema
            }
        }
        // Untyped schemas already admit null
        None => schema,
    }
}

fn is_null_schema(schema: &Schema) -> bool {
    schema.single_type() == Some("null")
}

fn array_schema(elem: &TypeDescriptor, registry: &mut SchemaRegistry) -> Schema {
    let items = generate_schema(elem, registry, true);
    let label = elem.name().map(|name| format!("Array of {}", name));
    Schema {
        title: label.clone(),
        description: label,
        items: Some(Box::new(items)),
        ..Schema::typed("array")
    }
}

fn generate_struct_schema(
    ty: &TypeDescriptor,
    layout: &StructType,
    registry: &mut SchemaRegistry,
) -> Schema {
    let name = schema_name(ty);
    if let Some(name) = &name {
        registry.reserve(name);
    }

    let mut schema = Schema::typed("object");
    add_struct_fields(layout, &mut schema, registry);

    match name {
        Some(name) => {
            registry.register(&name, schema);
            Schema::reference(&name)
        }
        None => schema,
    }
}

/// Add the body properties of `layout` to `schema`. Untagged embedded structs are flattened in.
fn add_struct_fields(layout: &StructType, schema: &mut Schema, registry: &mut SchemaRegistry) {
    for field in layout.fields().iter().filter(|field| field.is_public()) {
        let tag = field.tag();
        if tag
            .get("openapi")
            .and_then(|value| parse_param_tag(&value))
            .is_some()
        {
            continue;
        }

        let field_type = field.ty();
        if field.is_embedded() && !has_explicit_name(field) {
            if let Some(inner) = field_type.deref().as_struct() {
                add_struct_fields(inner, schema, registry);
                continue;
            }
        }

        let Some(name) = wire_name(field) else {
            continue;
        };

        let nullable = registry.nullable_fields();
        let mut property = generate_schema(&field_type, registry, nullable);

        if let Some(description) = tag.get("description").filter(|d| !d.is_empty()) {
            property.description = Some(description);
        }
        if let Some(rules) = tag.get("validate") {
            apply_validation_constraints(Some(&mut property), &rules, &field_type, schema, &name);
        }
        if let Some(rules) = tag.get("rule") {
            match parse_rule_invocations(&rules) {
                Ok(invocations) => match serde_json::to_value(&invocations) {
                    Ok(value) => {
                        property.extensions.insert(RULES_EXTENSION.to_string(), value);
                    }
                    Err(err) => warn!(field = %name, error = %err, "could not encode rule tag"),
                },
                Err(err) => warn!(field = %name, error = %err, "ignoring malformed rule tag"),
            }
        }

        schema.properties.insert(name, property);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gork_core::Reflect;
    use serde_json::json;
    use tracing_test::traced_test;

    #[test]
    fn test_sanitize_schema_name() {
        assert_eq!(
            sanitize_schema_name("Union2[github.com/foo.Bar,github.com/foo.Baz]"),
            "Union2_Bar_Baz"
        );
        assert_eq!(sanitize_schema_name("*api.Handler"), "_api.Handler");
        assert_eq!(sanitize_schema_name(""), "");
        assert_eq!(sanitize_schema_name("Union2[pets.Cat,String]"), "Union2_Cat_String");
        assert_eq!(sanitize_schema_name("Page<Item>"), "Page_Item_");
    }

    #[test]
    fn test_make_nullable_forms() {
        let primitive = make_nullable(Schema::typed("string"));
        assert_eq!(
            primitive.schema_type,
            Some(SchemaType::Union(vec!["string".into(), "null".into()]))
        );
        assert_eq!(make_nullable(primitive.clone()), primitive);

        let reference = make_nullable(Schema::reference("Pet"));
        assert_eq!(
            serde_json::to_value(&reference).unwrap(),
            json!({"anyOf": [{"$ref": "#/components/schemas/Pet"}, {"type": "null"}]})
        );
        assert_eq!(make_nullable(reference.clone()), reference);
    }

    #[test]
    fn test_pointer_nullability_flag() {
        let mut registry = SchemaRegistry::new();
        let ty = <Option<i64>>::type_descriptor();

        let nullable = generate_schema(&ty, &mut registry, true);
        assert_eq!(
            nullable.schema_type,
            Some(SchemaType::Union(vec!["integer".into(), "null".into()]))
        );

        let unwrapped = generate_schema(&ty, &mut registry, false);
        assert_eq!(unwrapped.single_type(), Some("integer"));
    }

    #[test]
    fn test_byte_slices_and_arrays() {
        let mut registry = SchemaRegistry::new();
        let bytes = generate_schema(&<Vec<u8>>::type_descriptor(), &mut registry, true);
        assert_eq!(bytes.single_type(), Some("string"));
        assert_eq!(bytes.format.as_deref(), Some("byte"));

        let fixed = generate_schema(&<[String; 3]>::type_descriptor(), &mut registry, true);
        assert_eq!(fixed.single_type(), Some("array"));
        assert_eq!((fixed.min_items, fixed.max_items), (Some(3), Some(3)));
        assert_eq!(fixed.description.as_deref(), Some("Array of String"));
        assert_eq!(fixed.items.unwrap().single_type(), Some("string"));
    }

    struct Audit;
    impl Reflect for Audit {
        fn type_descriptor() -> TypeDescriptor {
            TypeDescriptor::structure::<Self>(
                "Audit",
                "app",
                StructType::new()
                    .field::<String>("CreatedBy", r#"json:"created_by" validate:"required""#),
            )
        }
    }

    struct Node;
    impl Reflect for Node {
        fn type_descriptor() -> TypeDescriptor {
            TypeDescriptor::structure::<Self>(
                "Node",
                "graph",
                StructType::new()
                    .embed::<Audit>("")
                    .field::<i64>("ID", r#"openapi:"id,in=path""#)
                    .field::<String>(
                        "Label",
                        r#"json:"label" validate:"required,min=1" description:"Display label""#,
                    )
                    .field::<Option<Box<Node>>>("Next", r#"json:"next""#)
                    .field::<Vec<Node>>("Children", r#"json:"children""#)
                    .field::<String>("Rules", r#"json:"rules" rule:"owned_by('team, a'), audit()""#)
                    .field::<String>("Broken", r#"json:"broken" rule:"owned_by('x""#)
                    .field::<String>("Secret", r#"json:"-""#)
                    .private_field::<String>("cache"),
            )
        }
    }

    #[test]
    #[traced_test]
    fn test_named_struct_registered_once() {
        let mut registry = SchemaRegistry::new();
        let first = generate_schema(&Node::type_descriptor(), &mut registry, true);
        let second = generate_schema(&Node::type_descriptor(), &mut registry, true);

        assert_eq!(first.reference.as_deref(), Some("#/components/schemas/Node"));
        assert_eq!(first, second);
        assert_eq!(registry.len(), 1);

        logs_assert(|lines: &[&str]| {
            let count = lines
                .iter()
                .filter(|line| line.contains("registered component schema") && line.contains("schema=Node"))
                .count();
            if count == 1 {
                Ok(())
            } else {
                Err(format!("expected one registration of Node, saw {count}"))
            }
        });
    }

    #[test]
    #[traced_test]
    fn test_struct_body() {
        let mut registry = SchemaRegistry::new();
        generate_schema(&Node::type_descriptor(), &mut registry, true);
        let node = registry.get("Node").unwrap();

        let names: Vec<_> = node.properties.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["created_by", "label", "next", "children", "rules", "broken"]);
        assert_eq!(node.required, vec!["created_by", "label"]);
        assert!(!registry.contains("Audit"));

        let label = &node.properties["label"];
        assert_eq!(label.min_length, Some(1));
        assert_eq!(label.description.as_deref(), Some("Display label"));

        assert_eq!(
            serde_json::to_value(&node.properties["next"]).unwrap(),
            json!({"anyOf": [{"$ref": "#/components/schemas/Node"}, {"type": "null"}]})
        );
        assert_eq!(
            node.properties["children"].items.as_ref().unwrap().reference.as_deref(),
            Some("#/components/schemas/Node")
        );
        assert_eq!(
            node.properties["rules"].extensions[RULES_EXTENSION],
            json!([
                {"name": "owned_by", "args": ["'team, a'"]},
                {"name": "audit", "args": []}
            ])
        );
        assert!(node.properties["broken"].extensions.is_empty());
        assert!(logs_contain("ignoring malformed rule tag"));
    }
}
