//! Translation of `validate` tag rules into schema constraints.
//!
//! Best effort: a rule whose value does not parse is skipped without an error.

use crate::specification::Schema;
use gork_core::{parse_validate_rules, TypeDescriptor, TypeKind};

/// Apply the rules of a `validate` tag to a property schema. `required` lands on `parent`.
pub fn apply_validation_constraints(
    schema: Option<&mut Schema>,
    tag: &str,
    field_type: &TypeDescriptor,
    parent: &mut Schema,
    json_name: &str,
) {
    let Some(schema) = schema else {
        return;
    };
    let target = field_type.deref();
    let is_string = target.is_string();

    for rule in parse_validate_rules(tag) {
        match (rule.key, rule.value) {
            ("required", _) => parent.add_required(json_name),
            ("min" | "gte" | "gt", Some(value)) => apply_min_constraint(schema, value, is_string),
            ("max" | "lte" | "lt", Some(value)) => apply_max_constraint(schema, value, is_string),
            ("len", Some(value)) if is_string => {
                if let Ok(length) = value.parse::<u64>() {
                    schema.min_length = Some(length);
                    schema.max_length = Some(length);
                }
            }
            ("regexp", Some(value)) => schema.pattern = Some(value.to_string()),
            ("oneof", Some(value)) => {
                schema.enum_values = value
                    .split_whitespace()
                    .map(|item| enum_value(item, &target))
                    .collect();
            }
            _ => {}
        }
    }
}

/// `minLength` for strings, `minimum` otherwise
pub fn apply_min_constraint(schema: &mut Schema, value: &str, is_string: bool) {
    if is_string {
        if let Ok(length) = value.parse::<u64>() {
            schema.min_length = Some(length);
        }
    } else if let Ok(minimum) = value.parse::<f64>() {
        schema.minimum = Some(minimum);
    }
}

/// `maxLength` for strings, `maximum` otherwise
pub fn apply_max_constraint(schema: &mut Schema, value: &str, is_string: bool) {
    if is_string {
        if let Ok(length) = value.parse::<u64>() {
            schema.max_length = Some(length);
        }
    } else if let Ok(maximum) = value.parse::<f64>() {
        schema.maximum = Some(maximum);
    }
}

fn enum_value(item: &str, target: &TypeDescriptor) -> serde_json::Value {
    let number = match target.kind() {
        TypeKind::Int(_) => item.parse::<i64>().ok().map(serde_json::Value::from),
        TypeKind::Uint(_) => item.parse::<u64>().ok().map(serde_json::Value::from),
        TypeKind::Float32 | TypeKind::Float64 => item
            .parse::<f64>()
            .ok()
            .and_then(serde_json::Number::from_f64)
            .map(serde_json::Value::Number),
        _ => None,
    };
    number.unwrap_or_else(|| serde_json::Value::String(item.to_string()))
}
