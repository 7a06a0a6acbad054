//! Length validators for strings, bytes, slices and maps

use crate::traits::ValidationRule;
use gork_core::Value;

/// Length of a value, counting characters for strings. `None` for values without a length.
pub fn length_of(value: &Value) -> Option<usize> {
    match value {
        Value::String(s) => Some(s.chars().count()),
        Value::Bytes(bytes) => Some(bytes.len()),
        Value::Slice(items) => Some(items.as_ref().map_or(0, Vec::len)),
        Value::Map(entries) => Some(entries.as_ref().map_or(0, |entries| entries.len())),
        Value::Any(serde_json::Value::String(s)) => Some(s.chars().count()),
        Value::Any(serde_json::Value::Array(items)) => Some(items.len()),
        Value::Any(serde_json::Value::Object(entries)) => Some(entries.len()),
        _ => None,
    }
}

/// Validator for length constraints
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LengthValidator {
    /// Minimum length
    pub min: Option<usize>,
    /// Maximum length
    pub max: Option<usize>,
    /// Exact length required
    pub exact: Option<usize>,
    /// `min` excludes its bound
    pub exclusive_min: bool,
    /// `max` excludes its bound
    pub exclusive_max: bool,
}

impl LengthValidator {
    /// Create a new length validator with no constraints
    pub fn new() -> Self {
        Self::default()
    }

    /// Length must be at least `min`
    pub fn min(mut self, min: usize) -> Self {
        self.min = Some(min);
        self.exclusive_min = false;
        self
    }

    /// Length must be at most `max`
    pub fn max(mut self, max: usize) -> Self {
        self.max = Some(max);
        self.exclusive_max = false;
        self
    }

    /// Length must be greater than `bound`
    pub fn longer_than(mut self, bound: usize) -> Self {
        self.min = Some(bound);
        self.exclusive_min = true;
        self
    }

    /// Length must be less than `bound`
    pub fn shorter_than(mut self, bound: usize) -> Self {
        self.max = Some(bound);
        self.exclusive_max = true;
        self
    }

    /// Length must be exactly `exact`
    pub fn exact(mut self, exact: usize) -> Self {
        self.exact = Some(exact);
        self
    }

    fn accepts(&self, length: usize) -> bool {
        if let Some(exact) = self.exact {
            return length == exact;
        }
        let above_min = match self.min {
            Some(min) if self.exclusive_min => length > min,
            Some(min) => length >= min,
            None => true,
        };
        let below_max = match self.max {
            Some(max) if self.exclusive_max => length < max,
            Some(max) => length <= max,
            None => true,
        };
        above_min && below_max
    }
}

impl ValidationRule for LengthValidator {
    fn check(&self, value: &Value) -> anyhow::Result<bool> {
        match length_of(value) {
            Some(length) => Ok(self.accepts(length)),
            None => anyhow::bail!("cannot measure the length of a {} value", value.kind_name()),
        }
    }

    fn rule_name(&self) -> &str {
        "length"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unicode_length() {
        let validator = LengthValidator::new().max(3);
        assert!(validator.check(&Value::String("héé".into())).unwrap());
        assert!(!validator.check(&Value::String("héllo".into())).unwrap());
    }

    #[test]
    fn test_collections() {
        let validator = LengthValidator::new().min(1);
        assert!(!validator.check(&Value::Bytes(Vec::new())).unwrap());
        assert!(!validator.check(&Value::Slice(None)).unwrap());
        assert!(validator
            .check(&Value::Slice(Some(vec![Value::Int(1)])))
            .unwrap());
    }

    #[test]
    fn test_exclusive_bounds() {
        let validator = LengthValidator::new().longer_than(2).shorter_than(4);
        assert!(!validator.check(&Value::String("ab".into())).unwrap());
        assert!(validator.check(&Value::String("abc".into())).unwrap());
        assert!(!validator.check(&Value::String("abcd".into())).unwrap());
    }

    #[test]
    fn test_exact_length() {
        let validator = LengthValidator::new().exact(2);
        assert!(validator.check(&Value::String("ab".into())).unwrap());
        assert!(!validator.check(&Value::String("a".into())).unwrap());
    }

    #[test]
    fn test_unmeasurable_value() {
        assert!(LengthValidator::new().min(1).check(&Value::Bool(true)).is_err());
    }
}
