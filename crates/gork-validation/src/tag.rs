//! The built-in `validate` tag validator.
//!
//! Rules run left to right and a field reports at most one failure: the first
//! rule it breaks. `omitempty` skips the remaining rules for zero values. A nil
//! pointer fails on its first rule unless `omitempty` is present.
//!
//! Bound rules (`min`, `max`, `len`, `gte`, `gt`, `lte`, `lt`) compare numbers by
//! value and everything else by length.

use crate::error::{FieldError, FieldErrors, ValidatorError};
use crate::traits::{FieldValidator, ValidationRule};
use crate::validators::{
    length_of, number_of, CustomValidator, EmailValidator, LengthValidator, NumericValidator,
    OneOfValidator, PatternValidator, RequiredValidator, RuleFn,
};
use gork_core::{parse_validate_rules, StructValue, ValidateRule, Value};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};
use tracing::trace;

/// Validator driven by `validate:"..."` struct tags
#[derive(Default)]
pub struct TagValidator {
    custom: HashMap<String, RuleFn>,
    patterns: Mutex<HashMap<String, PatternValidator>>,
}

impl fmt::Debug for TagValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut custom: Vec<_> = self.custom.keys().collect();
        custom.sort();
        f.debug_struct("TagValidator")
            .field("custom_rules", &custom)
            .finish()
    }
}

impl TagValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a rule for `validate:"name"` / `validate:"name=param"`.
    /// Built-in rule names are matched first and cannot be overridden.
    pub fn register_rule<F>(mut self, name: &str, rule: F) -> Self
    where
        F: Fn(&Value, Option<&str>) -> bool + Send + Sync + 'static,
    {
        self.custom.insert(name.to_string(), Arc::new(rule));
        self
    }

    /// Check `value` against every rule of `tag`, recording the first failure under `path`
    fn check_tag(
        &self,
        path: &str,
        value: &Value,
        tag: &str,
        errors: &mut FieldErrors,
    ) -> anyhow::Result<()> {
        let rules = parse_validate_rules(tag);
        let omit_empty = rules.iter().any(|rule| rule.key == "omitempty");
        let mut active = rules.iter().filter(|rule| rule.key != "omitempty").peekable();

        let value = value.deref();
        if let Value::Pointer(None) = value {
            if !omit_empty {
                if let Some(rule) = active.peek() {
                    trace!(path, rule = rule.key, "nil value failed validation");
                    errors.push(FieldError::new(path, rule.key, rule.value));
                }
            }
            return Ok(());
        }
        if omit_empty && value.is_zero() {
            return Ok(());
        }

        for rule in active {
            let passed = self.rule_for(rule, value)?.check(value)?;
            if !passed {
                trace!(path, rule = rule.key, "value failed validation");
                errors.push(FieldError::new(path, rule.key, rule.value));
                break;
            }
        }
        Ok(())
    }

    fn rule_for(
        &self,
        rule: &ValidateRule<'_>,
        value: &Value,
    ) -> anyhow::Result<Box<dyn ValidationRule>> {
        match (rule.key, rule.value) {
            ("required", _) => Ok(Box::new(RequiredValidator::new())),
            ("email", _) => Ok(Box::new(EmailValidator::new())),
            ("min" | "max" | "len" | "gte" | "gt" | "lte" | "lt", Some(param)) => {
                bound_rule(rule.key, param, value)
            }
            ("oneof", Some(param)) => Ok(Box::new(OneOfValidator::parse(param))),
            ("regexp", Some(param)) => Ok(Box::new(self.pattern(param)?)),
            (name, param) => match self.custom.get(name) {
                Some(custom) => Ok(Box::new(
                    CustomValidator::new(name, Arc::clone(custom)).param(param),
                )),
                None if is_builtin(name) => {
                    anyhow::bail!("validation rule '{}' requires a parameter", name)
                }
                None => anyhow::bail!("undefined validation rule '{}'", name),
            },
        }
    }

    fn pattern(&self, source: &str) -> anyhow::Result<PatternValidator> {
        let mut cache = self
            .patterns
            .lock()
            .map_err(|_| anyhow::anyhow!("regexp cache lock poisoned"))?;
        if let Some(pattern) = cache.get(source) {
            return Ok(pattern.clone());
        }
        let pattern = PatternValidator::new(source)
            .map_err(|e| anyhow::anyhow!("invalid regexp '{}': {}", source, e))?;
        cache.insert(source.to_string(), pattern.clone());
        Ok(pattern)
    }

    fn walk_struct(
        &self,
        prefix: &str,
        value: &StructValue,
        errors: &mut FieldErrors,
    ) -> anyhow::Result<()> {
        for (field, field_value) in value.fields() {
            if !field.is_public() {
                continue;
            }
            let tag = field.tag().get("validate");
            if tag.as_deref() == Some("-") {
                continue;
            }

            let path = if prefix.is_empty() {
                field.name().to_string()
            } else {
                format!("{}.{}", prefix, field.name())
            };
            if let Some(tag) = tag {
                self.check_tag(&path, field_value, &tag, errors)?;
            }
            if let Some(nested) = field_value.deref().as_struct() {
                self.walk_struct(&path, nested, errors)?;
            }
        }
        Ok(())
    }
}

fn is_builtin(name: &str) -> bool {
    matches!(
        name,
        "min" | "max" | "len" | "gte" | "gt" | "lte" | "lt" | "oneof" | "regexp"
    )
}

fn bound_rule(key: &str, param: &str, value: &Value) -> anyhow::Result<Box<dyn ValidationRule>> {
    if number_of(value).is_some() {
        let bound: f64 = param
            .parse()
            .map_err(|_| anyhow::anyhow!("'{}={}' needs a numeric parameter", key, param))?;
        let validator = NumericValidator::new();
        let validator = match key {
            "min" | "gte" => validator.min(bound),
            "max" | "lte" => validator.max(bound),
            "gt" => validator.greater_than(bound),
            "lt" => validator.less_than(bound),
            _ => validator.exact(bound),
        };
        return Ok(Box::new(validator));
    }

    if length_of(value).is_some() {
        let bound: usize = param
            .parse()
            .map_err(|_| anyhow::anyhow!("'{}={}' needs a length parameter", key, param))?;
        let validator = LengthValidator::new();
        let validator = match key {
            "min" | "gte" => validator.min(bound),
            "max" | "lte" => validator.max(bound),
            "gt" => validator.longer_than(bound),
            "lt" => validator.shorter_than(bound),
            _ => validator.exact(bound),
        };
        return Ok(Box::new(validator));
    }

    anyhow::bail!("'{}' does not apply to {} values", key, value.kind_name())
}

impl FieldValidator for TagValidator {
    fn validate_var(&self, value: &Value, tag: &str) -> Result<(), ValidatorError> {
        let mut errors = FieldErrors::new();
        self.check_tag("", value, tag, &mut errors)?;
        errors.into_result()
    }

    fn validate_struct(&self, value: &Value) -> Result<(), ValidatorError> {
        let target = value.deref();
        let Some(structure) = target.as_struct() else {
            return Err(ValidatorError::internal(format!(
                "validate_struct expects a struct value, got {}",
                target.kind_name()
            )));
        };
        let root = structure.descriptor().name().unwrap_or_default().to_string();
        let mut errors = FieldErrors::new();
        self.walk_struct(&root, structure, &mut errors)?;
        errors.into_result()
    }
}
