//! Enumerated value validator

use crate::traits::ValidationRule;
use crate::validators::numeric::number_of;
use gork_core::Value;

/// Value must be one of a fixed set of options
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OneOfValidator {
    options: Vec<String>,
}

impl OneOfValidator {
    pub fn new<I, S>(options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            options: options.into_iter().map(Into::into).collect(),
        }
    }

    /// Parse the space-separated options of a `oneof=...` rule
    pub fn parse(param: &str) -> Self {
        Self::new(param.split_whitespace())
    }

    pub fn options(&self) -> &[String] {
        &self.options
    }
}

impl ValidationRule for OneOfValidator {
    fn check(&self, value: &Value) -> anyhow::Result<bool> {
        if let Some(text) = value.as_str() {
            return Ok(self.options.iter().any(|option| option == text));
        }
        if let Value::Any(serde_json::Value::String(text)) = value {
            return Ok(self.options.iter().any(|option| option == text));
        }
        match number_of(value) {
            Some(number) => Ok(self
                .options
                .iter()
                .filter_map(|option| option.parse::<f64>().ok())
                .any(|option| option == number)),
            None => anyhow::bail!("oneof does not apply to {} values", value.kind_name()),
        }
    }

    fn rule_name(&self) -> &str {
        "oneof"
    }
}
