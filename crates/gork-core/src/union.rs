//! Generic union wrappers.
//!
//! A `UnionN` holds exactly one populated variant. On the wire it is untagged:
//! serialization writes the populated variant, deserialization picks the first
//! variant that accepts the payload. Schema generation renders it as `oneOf`.

use crate::reflect::{Reflect, StructType, TypeDescriptor};
use serde::de::{self, DeserializeOwned, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

macro_rules! union_type {
    ($name:ident, $count:literal; $($param:ident => $field:ident, $label:literal, $ctor:ident);+) => {
        #[doc = concat!("Untagged union of ", $count, " variants")]
        #[derive(Debug, Clone, PartialEq)]
        pub struct $name<$($param),+> {
            $(pub $field: Option<$param>,)+
        }

        impl<$($param),+> Default for $name<$($param),+> {
            fn default() -> Self {
                Self { $($field: None,)+ }
            }
        }

        impl<$($param),+> $name<$($param),+> {
            $(
                #[doc = concat!("Union holding the `", $label, "` variant")]
                pub fn $ctor(value: $param) -> Self {
                    Self {
                        $field: Some(value),
                        ..Self::default()
                    }
                }
            )+

            /// Whether no variant is populated
            pub fn is_empty(&self) -> bool {
                true $(&& self.$field.is_none())+
            }
        }

        impl<$($param: Reflect),+> Reflect for $name<$($param),+> {
            fn type_descriptor() -> TypeDescriptor {
                let variants = [$($param::type_descriptor().qualified_name()),+];
                let name = format!("{}[{}]", stringify!($name), variants.join(","));
                let layout = StructType::new()
                    $(.field::<Option<$param>>($label, ""))+
                    .union_wrapper();
                TypeDescriptor::structure::<Self>(&name, "gork", layout)
            }
        }

        impl<$($param: Serialize),+> Serialize for $name<$($param),+> {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                $(
                    if let Some(value) = &self.$field {
                        return value.serialize(serializer);
                    }
                )+
                serializer.serialize_none()
            }
        }

        impl<'de, $($param: DeserializeOwned),+> Deserialize<'de> for $name<$($param),+> {
            fn deserialize<De: Deserializer<'de>>(deserializer: De) -> Result<Self, De::Error> {
                let json = serde_json::Value::deserialize(deserializer)?;
                $(
                    if let Ok(value) = serde_json::from_value::<$param>(json.clone()) {
                        return Ok(Self::$ctor(value));
                    }
                )+
                Err(de::Error::custom(concat!(
                    "data did not match any variant of ",
                    stringify!($name)
                )))
            }
        }
    };
}

union_type!(Union2, "two"; A => a, "A", from_a; B => b, "B", from_b);
union_type!(Union3, "three"; A => a, "A", from_a; B => b, "B", from_b; C => c, "C", from_c);
union_type!(
    Union4, "four";
    A => a, "A", from_a;
    B => b, "B", from_b;
    C => c, "C", from_c;
    D => d, "D", from_d
);
