//! Section binding.
//!
//! Parameter sections (path, query, headers, cookies) are filled field by field
//! from textual values. Coercion is lenient: a value that does not parse leaves
//! the field at its zero value, and kinds with no textual form are skipped.
//! Whatever that lets through is for validation to catch.

use crate::parts::RequestParts;
use gork_core::{param_name, IntWidth, Section, TypeDescriptor, TypeKind, Value};
use tracing::trace;

/// Bind the fields of a parameter section from `parts`
pub fn bind_section(section: Section, ty: &TypeDescriptor, slot: &mut Value, parts: &RequestParts) {
    let target = ty.deref();
    if !target.is_struct() {
        trace!(section = %section, ty = %ty, "section is not a struct, nothing to bind");
        return;
    }
    if let Value::Pointer(inner) = slot {
        if inner.is_none() {
            *inner = Some(Box::new(Value::zero(&target)));
        }
    }

    let value = deref_mut(slot);
    let Some(fields) = value.as_struct_mut() else {
        return;
    };
    for (field, field_value) in fields.fields_mut() {
        if !field.is_public() {
            continue;
        }
        let Some(name) = param_name(field) else {
            continue;
        };
        let values = parts.values(section, &name);
        bind_field(&field.ty(), field_value, &values);
    }
}

/// Fill the body section: byte slices take the raw body, everything else is decoded from JSON.
/// An empty body leaves the zero value.
pub fn bind_body(ty: &TypeDescriptor, slot: &mut Value, body: &[u8]) -> Result<(), String> {
    if body.is_empty() {
        return Ok(());
    }
    if ty.deref().is_byte_slice() {
        let bytes = Value::Bytes(body.to_vec());
        *slot = match ty.kind() {
            TypeKind::Pointer(_) => Value::Pointer(Some(Box::new(bytes))),
            _ => bytes,
        };
        return Ok(());
    }
    let json: serde_json::Value =
        serde_json::from_slice(body).map_err(|e| format!("Invalid JSON body: {}", e))?;
    *slot = Value::from_json(ty, &json).map_err(|e| format!("Invalid request body: {}", e))?;
    Ok(())
}

/// Bind one field from the values found for its name
pub fn bind_field(ty: &TypeDescriptor, slot: &mut Value, values: &[&str]) {
    match ty.kind() {
        TypeKind::Slice(elem) if !ty.is_byte_slice() => {
            if !elem().is_string() {
                trace!(ty = %ty, "only string slices are bound");
                return;
            }
            let items: Vec<Value> = match values {
                [] => return,
                [single] if single.is_empty() => return,
                [single] => single.split(',').map(|s| Value::String(s.to_string())).collect(),
                many => many.iter().map(|s| Value::String(s.to_string())).collect(),
            };
            *slot = Value::Slice(Some(items));
        }
        TypeKind::Pointer(target) => {
            let target = target();
            let Some(raw) = values.first() else {
                return;
            };
            if let Some(value) = coerce(&target, raw) {
                *slot = Value::Pointer(Some(Box::new(value)));
            }
        }
        _ => {
            let Some(raw) = values.first() else {
                return;
            };
            if let Some(value) = coerce(ty, raw) {
                *slot = value;
            }
        }
    }
}

/// Parse `raw` as a value of a primitive descriptor
fn coerce(ty: &TypeDescriptor, raw: &str) -> Option<Value> {
    let value = match ty.kind() {
        TypeKind::String => Some(Value::String(raw.to_string())),
        TypeKind::Int(width) => raw
            .parse::<i64>()
            .ok()
            .filter(|n| int_fits(*n, *width))
            .map(Value::Int),
        TypeKind::Uint(width) => raw
            .parse::<u64>()
            .ok()
            .filter(|n| uint_fits(*n, *width))
            .map(Value::Uint),
        TypeKind::Float32 => raw.parse::<f32>().ok().map(|f| Value::Float(f64::from(f))),
        TypeKind::Float64 => raw.parse::<f64>().ok().map(Value::Float),
        TypeKind::Bool => parse_bool(raw).map(Value::Bool),
        other => {
            trace!(kind = other.label(), "unsupported kind left untouched");
            return None;
        }
    };
    if value.is_none() {
        trace!(ty = %ty, raw, "value did not parse, keeping zero value");
    }
    value
}

fn int_fits(n: i64, width: IntWidth) -> bool {
    let bits = width.bits();
    if bits >= 64 {
        return true;
    }
    let limit = 1i64 << (bits - 1);
    n >= -limit && n < limit
}

fn uint_fits(n: u64, width: IntWidth) -> bool {
    let bits = width.bits();
    bits >= 64 || n < (1u64 << bits)
}

/// Boolean text accepted by Go's `strconv.ParseBool`
fn parse_bool(raw: &str) -> Option<bool> {
    match raw {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}

fn deref_mut(value: &mut Value) -> &mut Value {
    match value {
        Value::Pointer(Some(inner)) => deref_mut(inner),
        other => other,
    }
}
