//! Caller-registered rules

use crate::traits::ValidationRule;
use gork_core::Value;
use std::fmt;
use std::sync::Arc;

/// A registered rule: receives the value and the rule parameter, returns whether it passes
pub type RuleFn = Arc<dyn Fn(&Value, Option<&str>) -> bool + Send + Sync>;

/// A registered rule bound to the parameter it was invoked with
#[derive(Clone)]
pub struct CustomValidator {
    name: String,
    param: Option<String>,
    rule: RuleFn,
}

impl CustomValidator {
    pub fn new(name: impl Into<String>, rule: RuleFn) -> Self {
        Self {
            name: name.into(),
            param: None,
            rule,
        }
    }

    /// Bind the parameter of `name=param`
    pub fn param(mut self, param: Option<&str>) -> Self {
        self.param = param.map(str::to_string);
        self
    }
}

impl fmt::Debug for CustomValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomValidator")
            .field("name", &self.name)
            .field("param", &self.param)
            .finish()
    }
}

impl ValidationRule for CustomValidator {
    fn check(&self, value: &Value) -> anyhow::Result<bool> {
        Ok((self.rule)(value, self.param.as_deref()))
    }

    fn rule_name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_custom_rule_receives_param() {
        let prefix: RuleFn = Arc::new(|value, param| match (value.as_str(), param) {
            (Some(text), Some(prefix)) => text.starts_with(prefix),
            _ => false,
        });
        let validator = CustomValidator::new("prefix", prefix).param(Some("usr_"));
        assert_eq!(validator.rule_name(), "prefix");
        assert!(validator.check(&Value::String("usr_1".into())).unwrap());
        assert!(!validator.check(&Value::String("org_1".into())).unwrap());
    }
}
