//! Dynamic values shaped by a [`TypeDescriptor`].
//!
//! Request binding fills these in field by field; validation reads them; handlers
//! turn them into concrete types through serde with [`Value::into_typed`].

use crate::error::ValueError;
use crate::reflect::{Field, IntWidth, StructType, TypeDescriptor, TypeKind};
use crate::tags::{has_explicit_name, wire_name};
use serde::de::DeserializeOwned;
use serde_json::{Map, Number};
use std::collections::BTreeMap;
use std::sync::Arc;

/// A dynamically typed value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Uint(u64),
    Float(f64),
    String(String),
    Bytes(Vec<u8>),
    /// `None` is a nil slice, distinct from an empty one
    Slice(Option<Vec<Value>>),
    Map(Option<BTreeMap<String, Value>>),
    Pointer(Option<Box<Value>>),
    Struct(StructValue),
    /// Interface-typed data kept as raw JSON
    Any(serde_json::Value),
    /// Kinds with no data representation (channels, functions, complex numbers)
    Opaque,
}

/// A struct value: its descriptor, layout and one value per field
#[derive(Debug, Clone)]
pub struct StructValue {
    descriptor: TypeDescriptor,
    layout: Arc<StructType>,
    fields: Vec<Value>,
}

impl PartialEq for StructValue {
    fn eq(&self, other: &Self) -> bool {
        self.descriptor.qualified_name() == other.descriptor.qualified_name()
            && self.fields == other.fields
    }
}

impl StructValue {
    pub fn descriptor(&self) -> &TypeDescriptor {
        &self.descriptor
    }

    pub fn layout(&self) -> &StructType {
        &self.layout
    }

    /// Field value by Rust field name
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.layout.field_index(name).map(|index| &self.fields[index])
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Value> {
        let index = self.layout.field_index(name)?;
        self.fields.get_mut(index)
    }

    /// Replace a field value; returns false for unknown fields
    pub fn set(&mut self, name: &str, value: Value) -> bool {
        match self.get_mut(name) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    pub fn fields(&self) -> impl Iterator<Item = (&Field, &Value)> {
        self.layout.fields().iter().zip(self.fields.iter())
    }

    pub fn fields_mut(&mut self) -> impl Iterator<Item = (&Field, &mut Value)> {
        self.layout.fields().iter().zip(self.fields.iter_mut())
    }
}

impl Value {
    /// The zero value of a descriptor: nil pointers, slices and maps, empty strings, zero numbers
    pub fn zero(ty: &TypeDescriptor) -> Value {
        match ty.kind() {
            TypeKind::Bool => Value::Bool(false),
            TypeKind::Int(_) => Value::Int(0),
            TypeKind::Uint(_) | TypeKind::Uintptr => Value::Uint(0),
            TypeKind::Float32 | TypeKind::Float64 => Value::Float(0.0),
            TypeKind::String => Value::String(String::new()),
            TypeKind::Slice(_) if ty.is_byte_slice() => Value::Bytes(Vec::new()),
            TypeKind::Slice(_) => Value::Slice(None),
            TypeKind::Array { elem, len } => {
                let elem = elem();
                Value::Slice(Some((0..*len).map(|_| Value::zero(&elem)).collect()))
            }
            TypeKind::Map { .. } => Value::Map(None),
            TypeKind::Pointer(_) => Value::Pointer(None),
            TypeKind::Struct(layout) => Value::Struct(StructValue {
                descriptor: ty.clone(),
                layout: Arc::clone(layout),
                fields: layout.fields().iter().map(|f| Value::zero(&f.ty())).collect(),
            }),
            TypeKind::Interface => Value::Any(serde_json::Value::Null),
            TypeKind::Complex64
            | TypeKind::Complex128
            | TypeKind::UnsafePointer
            | TypeKind::Chan
            | TypeKind::Func => Value::Opaque,
        }
    }

    /// Whether this is the zero value of its kind
    pub fn is_zero(&self) -> bool {
        match self {
            Value::Bool(b) => !b,
            Value::Int(i) => *i == 0,
            Value::Uint(u) => *u == 0,
            Value::Float(f) => *f == 0.0,
            Value::String(s) => s.is_empty(),
            Value::Bytes(b) => b.is_empty(),
            Value::Slice(items) => items.is_none(),
            Value::Map(entries) => entries.is_none(),
            Value::Pointer(target) => target.is_none(),
            Value::Struct(value) => value.fields.iter().all(Value::is_zero),
            Value::Any(json) => json.is_null(),
            Value::Opaque => true,
        }
    }

    /// Follow non-nil pointers
    pub fn deref(&self) -> &Value {
        let mut current = self;
        while let Value::Pointer(Some(target)) = current {
            current = target;
        }
        current
    }

    pub fn as_struct(&self) -> Option<&StructValue> {
        match self {
            Value::Struct(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_struct_mut(&mut self) -> Option<&mut StructValue> {
        match self {
            Value::Struct(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Short kind label, used in diagnostics
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Uint(_) => "uint",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Bytes(_) => "bytes",
            Value::Slice(_) => "slice",
            Value::Map(_) => "map",
            Value::Pointer(_) => "pointer",
            Value::Struct(_) => "struct",
            Value::Any(_) => "interface",
            Value::Opaque => "opaque",
        }
    }

    /// Render as JSON using wire names. Private and `json:"-"` fields are left out,
    /// untagged embedded structs are flattened and union wrappers render their populated variant.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Int(i) => serde_json::Value::Number((*i).into()),
            Value::Uint(u) => serde_json::Value::Number((*u).into()),
            Value::Float(f) => Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Bytes(bytes) => serde_json::Value::Array(
                bytes.iter().map(|b| serde_json::Value::Number((*b).into())).collect(),
            ),
            Value::Slice(None) | Value::Map(None) | Value::Pointer(None) | Value::Opaque => {
                serde_json::Value::Null
            }
            Value::Slice(Some(items)) => {
                serde_json::Value::Array(items.iter().map(Value::to_json).collect())
            }
            Value::Map(Some(entries)) => serde_json::Value::Object(
                entries.iter().map(|(k, v)| (k.clone(), v.to_json())).collect(),
            ),
            Value::Pointer(Some(target)) => target.to_json(),
            Value::Struct(value) if value.layout.is_union_wrapper() => value
                .fields
                .iter()
                .find(|variant| !variant.is_zero())
                .map(Value::to_json)
                .unwrap_or(serde_json::Value::Null),
            Value::Struct(value) => {
                let mut object = Map::new();
                write_struct_fields(value, &mut object);
                serde_json::Value::Object(object)
            }
            Value::Any(json) => json.clone(),
        }
    }

    /// Decode JSON into a value of the descriptor's shape. Object keys match wire
    /// names case-insensitively, missing fields keep their zero value, and `null`
    /// leaves non-nullable targets at zero.
    pub fn from_json(ty: &TypeDescriptor, json: &serde_json::Value) -> Result<Value, ValueError> {
        decode(ty, json, "")
    }

    /// Convert into a concrete type through its serde representation
    pub fn into_typed<T: DeserializeOwned>(&self) -> Result<T, ValueError> {
        Ok(serde_json::from_value(self.to_json())?)
    }
}

fn write_struct_fields(value: &StructValue, object: &mut Map<String, serde_json::Value>) {
    for (field, field_value) in value.fields() {
        if !field.is_public() {
            continue;
        }
        if field.is_embedded() && !has_explicit_name(field) {
            if let Value::Struct(inner) = field_value.deref() {
                write_struct_fields(inner, object);
                continue;
            }
        }
        if let Some(name) = wire_name(field) {
            object.insert(name, field_value.to_json());
        }
    }
}

fn decode(ty: &TypeDescriptor, json: &serde_json::Value, path: &str) -> Result<Value, ValueError> {
    use serde_json::Value as Json;

    if json.is_null() {
        return Ok(Value::zero(ty));
    }

    match ty.kind() {
        TypeKind::Bool => json
            .as_bool()
            .map(Value::Bool)
            .ok_or_else(|| ValueError::mismatch(path, "boolean", json)),
        TypeKind::Int(width) => json
            .as_i64()
            .filter(|i| fits_signed(*i, *width))
            .map(Value::Int)
            .ok_or_else(|| ValueError::mismatch(path, "integer", json)),
        TypeKind::Uint(width) => json
            .as_u64()
            .filter(|u| fits_unsigned(*u, *width))
            .map(Value::Uint)
            .ok_or_else(|| ValueError::mismatch(path, "unsigned integer", json)),
        TypeKind::Uintptr => json
            .as_u64()
            .map(Value::Uint)
            .ok_or_else(|| ValueError::mismatch(path, "unsigned integer", json)),
        TypeKind::Float32 | TypeKind::Float64 => json
            .as_f64()
            .map(Value::Float)
            .ok_or_else(|| ValueError::mismatch(path, "number", json)),
        TypeKind::String => json
            .as_str()
            .map(|s| Value::String(s.to_string()))
            .ok_or_else(|| ValueError::mismatch(path, "string", json)),
        TypeKind::Slice(_) if ty.is_byte_slice() => match json {
            Json::Array(items) => items
                .iter()
                .map(|item| item.as_u64().and_then(|b| u8::try_from(b).ok()))
                .collect::<Option<Vec<u8>>>()
                .map(Value::Bytes)
                .ok_or_else(|| ValueError::mismatch(path, "byte array", json)),
            Json::String(s) => Ok(Value::Bytes(s.as_bytes().to_vec())),
            _ => Err(ValueError::mismatch(path, "byte array", json)),
        },
        TypeKind::Slice(elem) | TypeKind::Array { elem, .. } => {
            let items = json
                .as_array()
                .ok_or_else(|| ValueError::mismatch(path, "array", json))?;
            let elem = elem();
            let values = items
                .iter()
                .enumerate()
                .map(|(i, item)| decode(&elem, item, &format!("{}[{}]", path, i)))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Value::Slice(Some(values)))
        }
        TypeKind::Map { value, .. } => {
            let object = json
                .as_object()
                .ok_or_else(|| ValueError::mismatch(path, "object", json))?;
            let value_ty = value();
            let mut entries = BTreeMap::new();
            for (key, item) in object {
                entries.insert(key.clone(), decode(&value_ty, item, &join(path, key))?);
            }
            Ok(Value::Map(Some(entries)))
        }
        TypeKind::Pointer(target) => {
            Ok(Value::Pointer(Some(Box::new(decode(&target(), json, path)?))))
        }
        TypeKind::Struct(layout) if layout.is_union_wrapper() => decode_union(ty, layout, json, path),
        TypeKind::Struct(layout) => {
            let object = json
                .as_object()
                .ok_or_else(|| ValueError::mismatch(path, "object", json))?;
            let mut value = Value::zero(ty);
            if let Value::Struct(target) = &mut value {
                decode_struct_fields(layout, target, object, path)?;
            }
            Ok(value)
        }
        TypeKind::Interface => Ok(Value::Any(json.clone())),
        TypeKind::Complex64
        | TypeKind::Complex128
        | TypeKind::UnsafePointer
        | TypeKind::Chan
        | TypeKind::Func => Ok(Value::Opaque),
    }
}

fn decode_struct_fields(
    layout: &StructType,
    target: &mut StructValue,
    object: &Map<String, serde_json::Value>,
    path: &str,
) -> Result<(), ValueError> {
    for (index, field) in layout.fields().iter().enumerate() {
        if !field.is_public() {
            continue;
        }
        let field_ty = field.ty();
        if field.is_embedded() && !has_explicit_name(field) {
            let inner_ty = field_ty.deref();
            if let Some(inner_layout) = inner_ty.as_struct() {
                let mut inner = Value::zero(&inner_ty);
                if let Value::Struct(inner_value) = &mut inner {
                    decode_struct_fields(inner_layout, inner_value, object, path)?;
                }
                target.fields[index] = if field_ty.is_pointer() {
                    Value::Pointer(Some(Box::new(inner)))
                } else {
                    inner
                };
                continue;
            }
        }
        let Some(name) = wire_name(field) else {
            continue;
        };
        let entry = object
            .get(&name)
            .or_else(|| {
                object
                    .iter()
                    .find(|(key, _)| key.eq_ignore_ascii_case(&name))
                    .map(|(_, v)| v)
            });
        if let Some(entry) = entry {
            target.fields[index] = decode(&field_ty, entry, &join(path, &name))?;
        }
    }
    Ok(())
}

fn decode_union(
    ty: &TypeDescriptor,
    layout: &StructType,
    json: &serde_json::Value,
    path: &str,
) -> Result<Value, ValueError> {
    let mut value = Value::zero(ty);
    if let Value::Struct(target) = &mut value {
        for (index, field) in layout.fields().iter().enumerate() {
            if let Ok(decoded) = decode(&field.ty(), json, path) {
                target.fields[index] = decoded;
                return Ok(value);
            }
        }
    }
    Err(ValueError::mismatch(path, format!("one of the variants of {}", ty), json))
}

fn join(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", path, key)
    }
}

fn fits_signed(value: i64, width: IntWidth) -> bool {
    match width {
        IntWidth::W8 => i8::try_from(value).is_ok(),
        IntWidth::W16 => i16::try_from(value).is_ok(),
        IntWidth::W32 => i32::try_from(value).is_ok(),
        IntWidth::W64 | IntWidth::Size => true,
    }
}

fn fits_unsigned(value: u64, width: IntWidth) -> bool {
    match width {
        IntWidth::W8 => u8::try_from(value).is_ok(),
        IntWidth::W16 => u16::try_from(value).is_ok(),
        IntWidth::W32 => u32::try_from(value).is_ok(),
        IntWidth::W64 | IntWidth::Size => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reflect::Reflect;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Audit {
        created_by: String,
    }

    impl Reflect for Audit {
        fn type_descriptor() -> TypeDescriptor {
            TypeDescriptor::structure::<Self>(
                "Audit",
                "app",
                StructType::new().field::<String>("created_by", r#"json:"created_by""#),
            )
        }
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct Pet {
        name: String,
        age: Option<u8>,
        tags: Option<Vec<String>>,
        created_by: String,
    }

    impl Reflect for Pet {
        fn type_descriptor() -> TypeDescriptor {
            TypeDescriptor::structure::<Self>(
                "Pet",
                "app",
                StructType::new()
                    .embed::<Audit>("")
                    .field::<String>("Name", r#"json:"name""#)
                    .field::<Option<u8>>("Age", r#"json:"age""#)
                    .field::<Vec<String>>("Tags", r#"json:"tags""#)
                    .private_field::<String>("cache"),
            )
        }
    }

    #[test]
    fn test_zero_values() {
        let zero = Value::zero(&Pet::type_descriptor());
        let pet = zero.as_struct().unwrap();
        assert_eq!(pet.get("Name"), Some(&Value::String(String::new())));
        assert_eq!(pet.get("Age"), Some(&Value::Pointer(None)));
        assert_eq!(pet.get("Tags"), Some(&Value::Slice(None)));
        assert!(zero.is_zero());
        assert_eq!(Value::zero(&<Vec<u8>>::type_descriptor()), Value::Bytes(Vec::new()));
    }

    #[test]
    fn test_json_round_trip_through_typed() {
        let ty = Pet::type_descriptor();
        let value = Value::from_json(
            &ty,
            &json!({"name": "Rex", "AGE": 3, "tags": ["good"], "created_by": "ops"}),
        )
        .unwrap();

        let pet = value.as_struct().unwrap();
        assert_eq!(pet.get("Age"), Some(&Value::Pointer(Some(Box::new(Value::Uint(3))))));

        let rendered = value.to_json();
        assert_eq!(rendered["created_by"], json!("ops"));
        assert!(rendered.get("cache").is_none());

        let typed: Pet = value.into_typed().unwrap();
        assert_eq!(
            typed,
            Pet {
                name: "Rex".to_string(),
                age: Some(3),
                tags: Some(vec!["good".to_string()]),
                created_by: "ops".to_string(),
            }
        );
    }

    #[test]
    fn test_decode_type_mismatch_reports_path() {
        let err = Value::from_json(&Pet::type_descriptor(), &json!({"age": 300})).unwrap_err();
        match err {
            ValueError::TypeMismatch { path, expected, found } => {
                assert_eq!(path, "age");
                assert_eq!(expected, "unsigned integer");
                assert_eq!(found, "number");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_null_keeps_zero() {
        let value = Value::from_json(&Pet::type_descriptor(), &json!({"name": null})).unwrap();
        assert_eq!(
            value.as_struct().unwrap().get("Name"),
            Some(&Value::String(String::new()))
        );
    }

    #[test]
    fn test_set_and_deref() {
        let mut value = Value::zero(&Pet::type_descriptor());
        let pet = value.as_struct_mut().unwrap();
        assert!(pet.set("Name", Value::String("Tom".into())));
        assert!(!pet.set("Missing", Value::Bool(true)));

        let pointer = Value::Pointer(Some(Box::new(Value::Pointer(Some(Box::new(Value::Int(7)))))));
        assert_eq!(pointer.deref(), &Value::Int(7));
    }
}
