//! Regular expression validator

use crate::traits::ValidationRule;
use gork_core::Value;
use regex::Regex;

/// Validator matching strings against a regular expression
#[derive(Debug, Clone)]
pub struct PatternValidator {
    pattern: Regex,
}

impl PatternValidator {
    /// Create a new pattern validator
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(pattern)?,
        })
    }

    /// Create a validator from an existing Regex
    pub fn from_regex(pattern: Regex) -> Self {
        Self { pattern }
    }

    /// Get the pattern string
    pub fn pattern_string(&self) -> &str {
        self.pattern.as_str()
    }
}

impl ValidationRule for PatternValidator {
    fn check(&self, value: &Value) -> anyhow::Result<bool> {
        match value {
            Value::String(s) => Ok(self.pattern.is_match(s)),
            Value::Any(serde_json::Value::String(s)) => Ok(self.pattern.is_match(s)),
            Value::Bytes(bytes) => match std::str::from_utf8(bytes) {
                Ok(text) => Ok(self.pattern.is_match(text)),
                Err(_) => Ok(false),
            },
            other => anyhow::bail!("cannot match a {} value against a pattern", other.kind_name()),
        }
    }

    fn rule_name(&self) -> &str {
        "regexp"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern_match() {
        let validator = PatternValidator::new(r"^[a-z]+-\d+$").unwrap();
        assert_eq!(validator.pattern_string(), r"^[a-z]+-\d+$");
        assert!(validator.check(&Value::String("ticket-42".into())).unwrap());
        assert!(!validator.check(&Value::String("Ticket-42".into())).unwrap());
        assert!(validator.check(&Value::Bytes(b"abc-1".to_vec())).unwrap());
    }

    #[test]
    fn test_invalid_pattern() {
        assert!(PatternValidator::new("(unclosed").is_err());
    }

    #[test]
    fn test_non_string_value() {
        let validator = PatternValidator::new(".*").unwrap();
        assert!(validator.check(&Value::Int(1)).is_err());
    }
}
