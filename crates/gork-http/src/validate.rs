//! Per-section validation.
//!
//! Each section ends in one of three states: no errors, collected errors, or a
//! fatal [`ServerError`]. Collected errors never stop the remaining sections;
//! a fatal error stops the whole request.

use crate::error::{SectionErrors, ServerError};
use gork_core::{Field, Section, ValidationContext, Value};
use gork_validation::{FieldValidator, RequestValidationError, ValidatorError};
use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use tracing::{debug, warn};

/// Validate one bound section of a request.
///
/// Byte-slice sections are checked against the section field's own `validate`
/// tag, with failures collected under `body`. Struct sections run struct
/// validation when any of their fields carries a `validate` tag, then their
/// self-validation hook, with failures collected under the lower-cased section
/// name. Sections with neither are not passed to the validator at all.
pub fn validate_section(
    ctx: &ValidationContext,
    field: &Field,
    value: &Value,
    validator: &dyn FieldValidator,
    errors: &mut SectionErrors,
) -> Result<(), ServerError> {
    let key = field.name().to_lowercase();
    match value.deref() {
        // An absent `Option<Vec<u8>>` body is checked as nil against the same tag
        Value::Bytes(_) | Value::Pointer(None) if field.ty().deref().is_byte_slice() => {
            let Some(tag) = field.tag().get("validate") else {
                return Ok(());
            };
            let target = value.deref();
            let outcome = catch_unwind(AssertUnwindSafe(|| validator.validate_var(target, &tag)))
                .map_err(|panic| panic_error(&key, panic))?;
            collect(outcome, Section::Body.key(), errors)
        }
        Value::Struct(section) => {
            let layout = section.layout();
            if layout.has_validation_tags() {
                let target = value.deref();
                let outcome = catch_unwind(AssertUnwindSafe(|| validator.validate_struct(target)))
                    .map_err(|panic| panic_error(&key, panic))?;
                collect(outcome, &key, errors)?;
            }

            if let Some(hook) = layout.self_validator() {
                let target = value.deref();
                let outcome = catch_unwind(AssertUnwindSafe(|| hook(target, ctx)))
                    .map_err(|panic| panic_error(&key, panic))?;
                if let Err(err) = outcome {
                    match err.downcast::<RequestValidationError>() {
                        Ok(rejected) => errors.extend(&key, rejected.into_messages()),
                        Err(err) => return Err(ServerError::SelfValidation(err)),
                    }
                }
            }
            Ok(())
        }
        // An absent optional section has nothing to validate
        Value::Pointer(None) if field.ty().deref().is_struct() => Ok(()),
        other => Err(ServerError::invalid_section(
            key,
            format!("expected a struct or byte slice, got {}", other.kind_name()),
        )),
    }
}

/// Collect structured failures under `key`; anything else is fatal
fn collect(
    outcome: Result<(), ValidatorError>,
    key: &str,
    errors: &mut SectionErrors,
) -> Result<(), ServerError> {
    match outcome {
        Ok(()) => Ok(()),
        Err(ValidatorError::Invalid(failures)) => {
            debug!(section = key, count = failures.len(), "collected validation errors");
            errors.extend(key, failures.iter().map(ToString::to_string));
            Ok(())
        }
        Err(ValidatorError::Internal(err)) => Err(ServerError::Validator(err)),
    }
}

fn panic_error(key: &str, panic: Box<dyn Any + Send>) -> ServerError {
    let message = if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };
    warn!(section = key, panic = %message, "recovered panic during validation");
    ServerError::ValidationPanic(message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gork_core::{Reflect, StructType, TypeDescriptor};
    use gork_validation::{FieldError, FieldErrors, TagValidator};
    use tracing_test::traced_test;

    struct Panicking;
    impl FieldValidator for Panicking {
        fn validate_var(&self, _: &Value, _: &str) -> Result<(), ValidatorError> {
            panic!("validator exploded")
        }

        fn validate_struct(&self, _: &Value) -> Result<(), ValidatorError> {
            panic!("validator exploded")
        }
    }

    struct Broken;
    impl FieldValidator for Broken {
        fn validate_var(&self, _: &Value, _: &str) -> Result<(), ValidatorError> {
            Err(ValidatorError::internal("validator misconfigured"))
        }

        fn validate_struct(&self, _: &Value) -> Result<(), ValidatorError> {
            Err(ValidatorError::internal("validator misconfigured"))
        }
    }

    struct Rejecting;
    impl FieldValidator for Rejecting {
        fn validate_var(&self, _: &Value, _: &str) -> Result<(), ValidatorError> {
            Err(ValidatorError::Invalid(FieldError::new("", "custom", None).into()))
        }

        fn validate_struct(&self, _: &Value) -> Result<(), ValidatorError> {
            let mut failures = FieldErrors::new();
            failures.push(FieldError::new("Query.Limit", "required", None));
            Err(ValidatorError::Invalid(failures))
        }
    }

    struct Query;
    impl Reflect for Query {
        fn type_descriptor() -> TypeDescriptor {
            TypeDescriptor::structure::<Self>(
                "Query",
                "app",
                StructType::new().field::<i32>("Limit", r#"validate:"required""#),
            )
        }
    }

    fn query_field() -> Field {
        Field::new::<Query>("Query", "")
    }

    fn query_value() -> Value {
        Value::zero(&Query::type_descriptor())
    }

    #[test]
    fn test_struct_failures_collected_under_section() {
        let mut errors = SectionErrors::new();
        validate_section(
            &ValidationContext::default(),
            &query_field(),
            &query_value(),
            &Rejecting,
            &mut errors,
        )
        .unwrap();
        assert_eq!(
            errors.get("query").unwrap(),
            ["Query.Limit: failed on 'required'"]
        );
    }

    #[test]
    fn test_empty_body_min_length() {
        let field = Field::new::<Vec<u8>>("Body", r#"validate:"min=1""#);
        let mut errors = SectionErrors::new();
        let result = validate_section(
            &ValidationContext::default(),
            &field,
            &Value::Bytes(Vec::new()),
            &TagValidator::new(),
            &mut errors,
        );
        assert!(result.is_ok());
        assert_eq!(errors.get("body").unwrap(), ["failed on 'min=1'"]);
    }

    #[test]
    #[traced_test]
    fn test_panic_becomes_server_error() {
        let mut errors = SectionErrors::new();
        let err = validate_section(
            &ValidationContext::default(),
            &query_field(),
            &query_value(),
            &Panicking,
            &mut errors,
        )
        .unwrap_err();

        assert_eq!(err.to_string(), "validation panic: validator exploded");
        assert!(errors.is_empty());
        assert!(logs_contain("recovered panic during validation"));
    }

    #[test]
    #[traced_test]
    fn test_panic_in_byte_body_check_becomes_server_error() {
        let field = Field::new::<Vec<u8>>("Body", r#"validate:"min=1""#);
        let mut errors = SectionErrors::new();
        let err = validate_section(
            &ValidationContext::default(),
            &field,
            &Value::Bytes(Vec::new()),
            &Panicking,
            &mut errors,
        )
        .unwrap_err();

        assert!(matches!(&err, ServerError::ValidationPanic(message) if message == "validator exploded"));
        assert!(errors.is_empty());
        assert!(logs_contain("recovered panic during validation"));
    }

    #[test]
    fn test_optional_byte_body() {
        let field = Field::new::<Option<Vec<u8>>>("Body", r#"validate:"required""#);
        let mut errors = SectionErrors::new();
        validate_section(
            &ValidationContext::default(),
            &field,
            &Value::Pointer(None),
            &TagValidator::new(),
            &mut errors,
        )
        .unwrap();
        assert_eq!(errors.get("body").unwrap(), ["failed on 'required'"]);

        let mut errors = SectionErrors::new();
        validate_section(
            &ValidationContext::default(),
            &field,
            &Value::Pointer(Some(Box::new(Value::Bytes(b"data".to_vec())))),
            &TagValidator::new(),
            &mut errors,
        )
        .unwrap();
        assert!(errors.is_empty());

        let untagged = Field::new::<Option<Vec<u8>>>("Body", "");
        validate_section(
            &ValidationContext::default(),
            &untagged,
            &Value::Pointer(None),
            &Panicking,
            &mut errors,
        )
        .unwrap();
        assert!(errors.is_empty());
    }

    #[test]
    fn test_internal_errors_are_fatal() {
        let mut errors = SectionErrors::new();
        let err = validate_section(
            &ValidationContext::default(),
            &query_field(),
            &query_value(),
            &Broken,
            &mut errors,
        )
        .unwrap_err();
        assert!(matches!(err, ServerError::Validator(_)));
        assert!(errors.is_empty());
    }

    #[test]
    fn test_untagged_byte_body_is_skipped() {
        let field = Field::new::<Vec<u8>>("Body", "");
        let mut errors = SectionErrors::new();
        validate_section(
            &ValidationContext::default(),
            &field,
            &Value::Bytes(Vec::new()),
            &Panicking,
            &mut errors,
        )
        .unwrap();
        assert!(errors.is_empty());
    }

    #[test]
    fn test_non_struct_section_is_fatal() {
        let field = Field::new::<String>("Query", "");
        let err = validate_section(
            &ValidationContext::default(),
            &field,
            &Value::String("q".into()),
            &TagValidator::new(),
            &mut SectionErrors::new(),
        )
        .unwrap_err();
        assert!(matches!(err, ServerError::InvalidSection { .. }));
    }
}
