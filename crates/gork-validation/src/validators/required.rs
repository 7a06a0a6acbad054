//! Required field validator

use crate::traits::ValidationRule;
use gork_core::Value;

/// Fails on zero values: nil pointers, slices and maps, empty strings and bytes,
/// zero numbers, `false`, and structs whose fields are all zero
#[derive(Debug, Clone, Copy, Default)]
pub struct RequiredValidator;

impl RequiredValidator {
    pub fn new() -> Self {
        Self
    }
}

impl ValidationRule for RequiredValidator {
    fn check(&self, value: &Value) -> anyhow::Result<bool> {
        Ok(!value.is_zero())
    }

    fn rule_name(&self) -> &str {
        "required"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_values() {
        let validator = RequiredValidator::new();
        assert!(validator.check(&Value::String("a".into())).unwrap());
        assert!(validator.check(&Value::Int(-1)).unwrap());
        assert!(validator.check(&Value::Pointer(Some(Box::new(Value::Int(0))))).unwrap());
        // A non-nil empty slice is present
        assert!(validator.check(&Value::Slice(Some(Vec::new()))).unwrap());
    }

    #[test]
    fn test_missing_values() {
        let validator = RequiredValidator::new();
        assert!(!validator.check(&Value::String(String::new())).unwrap());
        assert!(!validator.check(&Value::Uint(0)).unwrap());
        assert!(!validator.check(&Value::Bool(false)).unwrap());
        assert!(!validator.check(&Value::Pointer(None)).unwrap());
        assert!(!validator.check(&Value::Slice(None)).unwrap());
        assert!(!validator.check(&Value::Bytes(Vec::new())).unwrap());
    }
}
