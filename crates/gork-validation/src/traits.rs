//! Core validation traits

use crate::error::ValidatorError;
use gork_core::Value;
use std::sync::Arc;

/// A single configured constraint
pub trait ValidationRule: Send + Sync {
    /// Check one value. `Ok(false)` is a failed constraint; `Err` means the rule
    /// cannot be applied to this value at all.
    fn check(&self, value: &Value) -> anyhow::Result<bool>;

    /// Name reported in field errors
    fn rule_name(&self) -> &str;
}

/// Field and struct validator used by request validation
pub trait FieldValidator: Send + Sync {
    /// Validate a standalone value against a `validate` tag
    fn validate_var(&self, value: &Value, tag: &str) -> Result<(), ValidatorError>;

    /// Validate every tagged field of a struct value, descending into nested structs
    fn validate_struct(&self, value: &Value) -> Result<(), ValidatorError>;
}

impl<V: FieldValidator + ?Sized> FieldValidator for Arc<V> {
    fn validate_var(&self, value: &Value, tag: &str) -> Result<(), ValidatorError> {
        (**self).validate_var(value, tag)
    }

    fn validate_struct(&self, value: &Value) -> Result<(), ValidatorError> {
        (**self).validate_struct(value)
    }
}

impl<V: FieldValidator + ?Sized> FieldValidator for &V {
    fn validate_var(&self, value: &Value, tag: &str) -> Result<(), ValidatorError> {
        (**self).validate_var(value, tag)
    }

    fn validate_struct(&self, value: &Value) -> Result<(), ValidatorError> {
        (**self).validate_struct(value)
    }
}
