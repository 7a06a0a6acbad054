//! Numeric range validators

use crate::traits::ValidationRule;
use gork_core::Value;

/// Numeric value of a number, `None` for anything else
pub fn number_of(value: &Value) -> Option<f64> {
    match value {
        Value::Int(i) => Some(*i as f64),
        Value::Uint(u) => Some(*u as f64),
        Value::Float(f) => Some(*f),
        Value::Any(serde_json::Value::Number(n)) => n.as_f64(),
        _ => None,
    }
}

/// Validator for numeric ranges
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NumericValidator {
    /// Minimum value
    pub min: Option<f64>,
    /// Maximum value
    pub max: Option<f64>,
    /// Exact value required
    pub exact: Option<f64>,
    /// `min` excludes its bound
    pub exclusive_min: bool,
    /// `max` excludes its bound
    pub exclusive_max: bool,
}

impl NumericValidator {
    /// Create a new numeric validator with no constraints
    pub fn new() -> Self {
        Self::default()
    }

    /// Value must be at least `min`
    pub fn min(mut self, min: f64) -> Self {
        self.min = Some(min);
        self.exclusive_min = false;
        self
    }

    /// Value must be at most `max`
    pub fn max(mut self, max: f64) -> Self {
        self.max = Some(max);
        self.exclusive_max = false;
        self
    }

    /// Value must be greater than `bound`
    pub fn greater_than(mut self, bound: f64) -> Self {
        self.min = Some(bound);
        self.exclusive_min = true;
        self
    }

    /// Value must be less than `bound`
    pub fn less_than(mut self, bound: f64) -> Self {
        self.max = Some(bound);
        self.exclusive_max = true;
        self
    }

    /// Value must equal `exact`
    pub fn exact(mut self, exact: f64) -> Self {
        self.exact = Some(exact);
        self
    }

    fn accepts(&self, number: f64) -> bool {
        if let Some(exact) = self.exact {
            return number == exact;
        }
        let above_min = match self.min {
            Some(min) if self.exclusive_min => number > min,
            Some(min) => number >= min,
            None => true,
        };
        let below_max = match self.max {
            Some(max) if self.exclusive_max => number < max,
            Some(max) => number <= max,
            None => true,
        };
        above_min && below_max
    }
}

impl ValidationRule for NumericValidator {
    fn check(&self, value: &Value) -> anyhow::Result<bool> {
        match number_of(value) {
            Some(number) => Ok(self.accepts(number)),
            None => anyhow::bail!("a {} value is not numeric", value.kind_name()),
        }
    }

    fn rule_name(&self) -> &str {
        "numeric"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inclusive_range() {
        let validator = NumericValidator::new().min(1.0).max(100.0);
        assert!(validator.check(&Value::Int(1)).unwrap());
        assert!(validator.check(&Value::Uint(100)).unwrap());
        assert!(!validator.check(&Value::Int(0)).unwrap());
        assert!(!validator.check(&Value::Float(100.5)).unwrap());
    }

    #[test]
    fn test_exclusive_range() {
        let validator = NumericValidator::new().greater_than(0.0).less_than(1.0);
        assert!(validator.check(&Value::Float(0.5)).unwrap());
        assert!(!validator.check(&Value::Float(0.0)).unwrap());
        assert!(!validator.check(&Value::Float(1.0)).unwrap());
    }

    #[test]
    fn test_json_numbers() {
        let validator = NumericValidator::new().exact(3.0);
        assert!(validator.check(&Value::Any(serde_json::json!(3))).unwrap());
        assert!(validator.check(&Value::String("3".into())).is_err());
    }
}
