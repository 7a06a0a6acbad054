//! # gork-core
//!
//! Shared building blocks for the gork framework: a closed type-descriptor model
//! standing in for runtime reflection, dynamic values that mirror those
//! descriptors, and the struct-tag mini-languages used by schema generation and
//! request binding.

pub mod context;
pub mod error;
pub mod reflect;
pub mod rules;
pub mod section;
pub mod tags;
pub mod union;
pub mod value;

// Re-exports for easy access
pub use context::{SelfValidate, ValidationContext};
pub use error::{TagParseError, ValueError};
pub use reflect::{Field, IntWidth, Reflect, StructType, TypeDescriptor, TypeKind, TypeThunk};
pub use rules::{parse_rule_invocations, split_top_level, RuleInvocation};
pub use section::Section;
pub use tags::{
    discriminator_value, has_explicit_name, param_name, parse_param_tag, parse_validate_rules,
    wire_name, ParamLocation, ParamTag, StructTag, ValidateRule,
};
pub use union::{Union2, Union3, Union4};
pub use value::{StructValue, Value};
