//! # gork-validation
//!
//! Field and struct validation driven by `validate:"..."` struct tags.
//!
//! [`FieldValidator`] is the seam request processing validates through;
//! [`TagValidator`] is the built-in implementation. Failures come back as
//! [`ValidatorError::Invalid`] when they describe the client's input and
//! [`ValidatorError::Internal`] when the validator itself is misconfigured.

pub mod error;
pub mod tag;
pub mod traits;
pub mod validators;

pub use error::{FieldError, FieldErrors, RequestValidationError, ValidatorError};
pub use tag::TagValidator;
pub use traits::{FieldValidator, ValidationRule};

pub use validators::{
    CustomValidator, EmailValidator, LengthValidator, NumericValidator, OneOfValidator,
    PatternValidator, RequiredValidator, RuleFn,
};
