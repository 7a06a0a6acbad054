//! Type descriptors: the closed variant model that schema generation and request
//! binding walk instead of runtime reflection.
//!
//! Pointer, slice, map and field element types are stored as thunks so that a
//! self-referential type such as `struct Node { next: Option<Box<Node>> }` is a
//! finite value. Recursion is only unrolled by whoever walks the descriptor.

use crate::context::{SelfValidate, ValidationContext};
use crate::tags::StructTag;
use crate::value::Value;
use serde::de::DeserializeOwned;
use std::any::TypeId;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

/// Lazily produces the descriptor of a nested type
pub type TypeThunk = fn() -> TypeDescriptor;

/// Context-aware self-validation hook attached to a struct layout
pub type SelfValidateFn = fn(&Value, &ValidationContext) -> anyhow::Result<()>;

/// Types that can describe their own shape
pub trait Reflect: 'static {
    /// Describe this type
    fn type_descriptor() -> TypeDescriptor;
}

/// Bit width of an integer kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntWidth {
    W8,
    W16,
    W32,
    W64,
    /// Pointer-sized (`isize`/`usize`)
    Size,
}

impl IntWidth {
    /// Number of bits used when parsing textual input
    pub fn bits(self) -> u32 {
        match self {
            IntWidth::W8 => 8,
            IntWidth::W16 => 16,
            IntWidth::W32 => 32,
            IntWidth::W64 | IntWidth::Size => 64,
        }
    }

    /// OpenAPI integer format for this width
    pub fn format(self) -> &'static str {
        match self {
            IntWidth::W64 | IntWidth::Size => "int64",
            _ => "int32",
        }
    }
}

/// The kind of a described type
#[derive(Debug, Clone)]
pub enum TypeKind {
    Bool,
    Int(IntWidth),
    Uint(IntWidth),
    Float32,
    Float64,
    Complex64,
    Complex128,
    String,
    Uintptr,
    UnsafePointer,
    Chan,
    Func,
    Interface,
    Map { key: TypeThunk, value: TypeThunk },
    Slice(TypeThunk),
    Array { elem: TypeThunk, len: usize },
    Pointer(TypeThunk),
    Struct(Arc<StructType>),
}

impl TypeKind {
    /// Short lowercase label, used in diagnostics
    pub fn label(&self) -> &'static str {
        match self {
            TypeKind::Bool => "bool",
            TypeKind::Int(_) => "int",
            TypeKind::Uint(_) => "uint",
            TypeKind::Float32 => "float32",
            TypeKind::Float64 => "float64",
            TypeKind::Complex64 => "complex64",
            TypeKind::Complex128 => "complex128",
            TypeKind::String => "string",
            TypeKind::Uintptr => "uintptr",
            TypeKind::UnsafePointer => "unsafe pointer",
            TypeKind::Chan => "chan",
            TypeKind::Func => "func",
            TypeKind::Interface => "interface",
            TypeKind::Map { .. } => "map",
            TypeKind::Slice(_) => "slice",
            TypeKind::Array { .. } => "array",
            TypeKind::Pointer(_) => "pointer",
            TypeKind::Struct(_) => "struct",
        }
    }
}

/// Description of a type: optional declared name, package and format hint plus its kind
#[derive(Clone)]
pub struct TypeDescriptor {
    name: Option<String>,
    package: Option<String>,
    format: Option<&'static str>,
    type_id: Option<TypeId>,
    kind: TypeKind,
}

impl TypeDescriptor {
    /// Create an anonymous descriptor
    pub fn new(kind: TypeKind) -> Self {
        Self {
            name: None,
            package: None,
            format: None,
            type_id: None,
            kind,
        }
    }

    /// Create a descriptor bound to the Rust type `T`
    pub fn of<T: 'static>(kind: TypeKind) -> Self {
        Self::new(kind).with_type_id::<T>()
    }

    /// Create a named struct descriptor bound to the Rust type `T`
    pub fn structure<T: 'static>(name: &str, package: &str, layout: StructType) -> Self {
        Self::of::<T>(TypeKind::Struct(Arc::new(layout)))
            .with_name(name)
            .with_package(package)
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_package(mut self, package: impl Into<String>) -> Self {
        self.package = Some(package.into());
        self
    }

    pub fn with_format(mut self, format: &'static str) -> Self {
        self.format = Some(format);
        self
    }

    pub fn with_type_id<T: 'static>(mut self) -> Self {
        self.type_id = Some(TypeId::of::<T>());
        self
    }

    /// Declared name, if the type is named
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn package(&self) -> Option<&str> {
        self.package.as_deref()
    }

    /// `package.Name` for named types, the structural spelling otherwise
    pub fn qualified_name(&self) -> String {
        match (&self.package, &self.name) {
            (Some(package), Some(name)) => format!("{}.{}", package, name),
            _ => self.to_string(),
        }
    }

    pub fn format(&self) -> Option<&'static str> {
        self.format
    }

    pub fn type_id(&self) -> Option<TypeId> {
        self.type_id
    }

    pub fn kind(&self) -> &TypeKind {
        &self.kind
    }

    pub fn as_struct(&self) -> Option<&StructType> {
        match &self.kind {
            TypeKind::Struct(layout) => Some(layout),
            _ => None,
        }
    }

    pub fn struct_layout(&self) -> Option<Arc<StructType>> {
        match &self.kind {
            TypeKind::Struct(layout) => Some(Arc::clone(layout)),
            _ => None,
        }
    }

    /// Element type of a pointer, slice or array
    pub fn elem(&self) -> Option<TypeDescriptor> {
        match &self.kind {
            TypeKind::Pointer(target) => Some(target()),
            TypeKind::Slice(elem) | TypeKind::Array { elem, .. } => Some(elem()),
            _ => None,
        }
    }

    /// Strip every pointer layer
    pub fn deref(&self) -> TypeDescriptor {
        let mut current = self.clone();
        while let TypeKind::Pointer(target) = current.kind {
            current = target();
        }
        current
    }

    pub fn is_pointer(&self) -> bool {
        matches!(self.kind, TypeKind::Pointer(_))
    }

    pub fn is_string(&self) -> bool {
        matches!(self.kind, TypeKind::String)
    }

    pub fn is_struct(&self) -> bool {
        matches!(self.kind, TypeKind::Struct(_))
    }

    /// `Vec<u8>` and friends
    pub fn is_byte_slice(&self) -> bool {
        match &self.kind {
            TypeKind::Slice(elem) => matches!(elem().kind, TypeKind::Uint(IntWidth::W8)),
            _ => false,
        }
    }

    /// Named with a leading uppercase letter
    pub fn is_exported(&self) -> bool {
        self.name
            .as_deref()
            .and_then(|name| name.chars().next())
            .map(|c| c.is_ascii_uppercase())
            .unwrap_or(false)
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(name) = &self.name {
            return match &self.package {
                Some(package) => write!(f, "{}.{}", package, name),
                None => f.write_str(name),
            };
        }
        match &self.kind {
            TypeKind::Pointer(target) => write!(f, "*{}", target()),
            TypeKind::Slice(elem) => write!(f, "[]{}", elem()),
            TypeKind::Array { elem, len } => write!(f, "[{}]{}", len, elem()),
            TypeKind::Map { key, value } => write!(f, "map[{}]{}", key(), value()),
            TypeKind::Struct(_) => f.write_str("struct {...}"),
            kind => f.write_str(kind.label()),
        }
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("type", &self.to_string())
            .field("kind", &self.kind.label())
            .finish()
    }
}

/// One field of a struct layout
#[derive(Clone)]
pub struct Field {
    name: String,
    tag: String,
    ty: TypeThunk,
    public: bool,
    embedded: bool,
}

impl Field {
    /// A public field with a struct tag
    pub fn new<T: Reflect>(name: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tag: tag.into(),
            ty: T::type_descriptor,
            public: true,
            embedded: false,
        }
    }

    /// A field hidden from schemas, binding and validation
    pub fn private<T: Reflect>(name: impl Into<String>) -> Self {
        Self {
            public: false,
            ..Self::new::<T>(name, "")
        }
    }

    /// An anonymous field named after its type
    pub fn embedded<T: Reflect>(tag: impl Into<String>) -> Self {
        let name = T::type_descriptor()
            .deref()
            .name()
            .unwrap_or("embedded")
            .to_string();
        Self {
            embedded: true,
            ..Self::new::<T>(name, tag)
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tag(&self) -> StructTag<'_> {
        StructTag::new(&self.tag)
    }

    pub fn raw_tag(&self) -> &str {
        &self.tag
    }

    pub fn ty(&self) -> TypeDescriptor {
        (self.ty)()
    }

    pub fn is_public(&self) -> bool {
        self.public
    }

    pub fn is_embedded(&self) -> bool {
        self.embedded
    }
}

impl fmt::Debug for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("name", &self.name)
            .field("tag", &self.tag)
            .field("public", &self.public)
            .field("embedded", &self.embedded)
            .finish()
    }
}

/// Ordered field layout of a struct, plus its optional self-validation hook
#[derive(Clone, Default)]
pub struct StructType {
    fields: Vec<Field>,
    union: bool,
    self_validator: Option<SelfValidateFn>,
}

impl StructType {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a public field
    pub fn field<T: Reflect>(self, name: impl Into<String>, tag: impl Into<String>) -> Self {
        self.with_field(Field::new::<T>(name, tag))
    }

    /// Append a private field
    pub fn private_field<T: Reflect>(self, name: impl Into<String>) -> Self {
        self.with_field(Field::private::<T>(name))
    }

    /// Append an anonymous (embedded) field
    pub fn embed<T: Reflect>(self, tag: impl Into<String>) -> Self {
        self.with_field(Field::embedded::<T>(tag))
    }

    pub fn with_field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    /// Mark this layout as a generic union wrapper
    pub fn union_wrapper(mut self) -> Self {
        self.union = true;
        self
    }

    /// Run `T::validate` on values of this layout after field validation
    pub fn validated_by<T>(mut self) -> Self
    where
        T: SelfValidate + DeserializeOwned,
    {
        self.self_validator = Some(run_self_validation::<T>);
        self
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|field| field.name == name)
    }

    pub fn is_union_wrapper(&self) -> bool {
        self.union
    }

    pub fn self_validator(&self) -> Option<SelfValidateFn> {
        self.self_validator
    }

    /// Whether any public field, including fields of nested structs, carries a `validate` tag
    pub fn has_validation_tags(&self) -> bool {
        let mut visited = HashSet::new();
        self.has_validation_tags_inner(&mut visited)
    }

    fn has_validation_tags_inner(&self, visited: &mut HashSet<String>) -> bool {
        for field in self.fields.iter().filter(|field| field.public) {
            if field.tag().get("validate").is_some() {
                return true;
            }
            let field_type = field.ty().deref();
            if let Some(layout) = field_type.as_struct() {
                if field_type.name().is_some() && !visited.insert(field_type.qualified_name()) {
                    continue;
                }
                if layout.has_validation_tags_inner(visited) {
                    return true;
                }
            }
        }
        false
    }
}

impl fmt::Debug for StructType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StructType")
            .field("fields", &self.fields)
            .field("union", &self.union)
            .field("self_validated", &self.self_validator.is_some())
            .finish()
    }
}

fn run_self_validation<T>(value: &Value, ctx: &ValidationContext) -> anyhow::Result<()>
where
    T: SelfValidate + DeserializeOwned,
{
    let typed: T = value.into_typed()?;
    typed.validate(ctx)
}

macro_rules! reflect_primitive {
    ($($ty:ty => $name:literal, $kind:expr;)*) => {
        $(
            impl Reflect for $ty {
                fn type_descriptor() -> TypeDescriptor {
                    TypeDescriptor::of::<$ty>($kind).with_name($name)
                }
            }
        )*
    };
}

reflect_primitive! {
    bool => "bool", TypeKind::Bool;
    i8 => "i8", TypeKind::Int(IntWidth::W8);
    i16 => "i16", TypeKind::Int(IntWidth::W16);
    i32 => "i32", TypeKind::Int(IntWidth::W32);
    i64 => "i64", TypeKind::Int(IntWidth::W64);
    isize => "isize", TypeKind::Int(IntWidth::Size);
    u8 => "u8", TypeKind::Uint(IntWidth::W8);
    u16 => "u16", TypeKind::Uint(IntWidth::W16);
    u32 => "u32", TypeKind::Uint(IntWidth::W32);
    u64 => "u64", TypeKind::Uint(IntWidth::W64);
    usize => "usize", TypeKind::Uint(IntWidth::Size);
    f32 => "f32", TypeKind::Float32;
    f64 => "f64", TypeKind::Float64;
    String => "String", TypeKind::String;
}

impl<T: Reflect> Reflect for Vec<T> {
    fn type_descriptor() -> TypeDescriptor {
        TypeDescriptor::of::<Vec<T>>(TypeKind::Slice(T::type_descriptor))
    }
}

impl<T: Reflect, const N: usize> Reflect for [T; N] {
    fn type_descriptor() -> TypeDescriptor {
        TypeDescriptor::of::<[T; N]>(TypeKind::Array {
            elem: T::type_descriptor,
            len: N,
        })
    }
}

impl<T: Reflect> Reflect for Option<T> {
    fn type_descriptor() -> TypeDescriptor {
        TypeDescriptor::of::<Option<T>>(TypeKind::Pointer(T::type_descriptor))
    }
}

// Boxes and shared pointers are transparent: they exist for ownership, not nullability.
impl<T: Reflect> Reflect for Box<T> {
    fn type_descriptor() -> TypeDescriptor {
        T::type_descriptor()
    }
}

impl<T: Reflect> Reflect for Arc<T> {
    fn type_descriptor() -> TypeDescriptor {
        T::type_descriptor()
    }
}

impl<K: Reflect, V: Reflect> Reflect for HashMap<K, V> {
    fn type_descriptor() -> TypeDescriptor {
        TypeDescriptor::of::<HashMap<K, V>>(TypeKind::Map {
            key: K::type_descriptor,
            value: V::type_descriptor,
        })
    }
}

impl<K: Reflect, V: Reflect> Reflect for BTreeMap<K, V> {
    fn type_descriptor() -> TypeDescriptor {
        TypeDescriptor::of::<BTreeMap<K, V>>(TypeKind::Map {
            key: K::type_descriptor,
            value: V::type_descriptor,
        })
    }
}

impl Reflect for serde_json::Value {
    fn type_descriptor() -> TypeDescriptor {
        TypeDescriptor::of::<serde_json::Value>(TypeKind::Interface)
    }
}

impl Reflect for chrono::DateTime<chrono::Utc> {
    fn type_descriptor() -> TypeDescriptor {
        TypeDescriptor::of::<Self>(TypeKind::String)
            .with_name("DateTime")
            .with_package("chrono")
            .with_format("date-time")
    }
}

impl Reflect for chrono::NaiveDate {
    fn type_descriptor() -> TypeDescriptor {
        TypeDescriptor::of::<Self>(TypeKind::String)
            .with_name("NaiveDate")
            .with_package("chrono")
            .with_format("date")
    }
}

impl Reflect for uuid::Uuid {
    fn type_descriptor() -> TypeDescriptor {
        TypeDescriptor::of::<Self>(TypeKind::String)
            .with_name("Uuid")
            .with_package("uuid")
            .with_format("uuid")
    }
}
