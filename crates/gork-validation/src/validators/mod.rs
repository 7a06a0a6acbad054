//! Built-in validators behind the `validate` tag rules

pub mod custom;
pub mod email;
pub mod length;
pub mod numeric;
pub mod one_of;
pub mod pattern;
pub mod required;

pub use custom::{CustomValidator, RuleFn};
pub use email::EmailValidator;
pub use length::{length_of, LengthValidator};
pub use numeric::{number_of, NumericValidator};
pub use one_of::OneOfValidator;
pub use pattern::PatternValidator;
pub use required::RequiredValidator;
