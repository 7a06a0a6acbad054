//! Email address validator

use crate::traits::ValidationRule;
use gork_core::Value;
use once_cell::sync::Lazy;
use regex::Regex;

static EMAIL: Lazy<Option<Regex>> = Lazy::new(|| {
    Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)+$",
    )
    .ok()
});

/// Validator for email addresses
#[derive(Debug, Clone, Copy, Default)]
pub struct EmailValidator;

impl EmailValidator {
    pub fn new() -> Self {
        Self
    }

    /// Whether `text` looks like an email address
    pub fn is_valid_email(&self, text: &str) -> anyhow::Result<bool> {
        let Some(pattern) = EMAIL.as_ref() else {
            anyhow::bail!("email pattern failed to compile");
        };
        Ok(text.len() <= 254 && pattern.is_match(text))
    }
}

impl ValidationRule for EmailValidator {
    fn check(&self, value: &Value) -> anyhow::Result<bool> {
        match value {
            Value::String(s) => self.is_valid_email(s),
            Value::Any(serde_json::Value::String(s)) => self.is_valid_email(s),
            other => anyhow::bail!("cannot check a {} value as an email", other.kind_name()),
        }
    }

    fn rule_name(&self) -> &str {
        "email"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_emails() {
        let validator = EmailValidator::new();
        for email in ["user@example.com", "first.last+tag@mail.example.org"] {
            assert!(validator.check(&Value::String(email.into())).unwrap(), "{email}");
        }
    }

    #[test]
    fn test_invalid_emails() {
        let validator = EmailValidator::new();
        for email in ["", "plainaddress", "@example.com", "user@", "user@localhost"] {
            assert!(!validator.check(&Value::String(email.into())).unwrap(), "{email}");
        }
    }
}
