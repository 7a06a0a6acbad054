//! Validation error types

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// One failed constraint on one field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// Dotted field path, empty for a standalone value
    pub path: String,
    /// Rule that failed, e.g. `min`
    pub rule: String,
    /// Rule parameter, e.g. `1` for `min=1`
    pub param: Option<String>,
}

impl FieldError {
    pub fn new(path: impl Into<String>, rule: impl Into<String>, param: Option<&str>) -> Self {
        Self {
            path: path.into(),
            rule: rule.into(),
            param: param.map(str::to_string),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.path.is_empty() {
            write!(f, "{}: ", self.path)?;
        }
        match &self.param {
            Some(param) => write!(f, "failed on '{}={}'", self.rule, param),
            None => write!(f, "failed on '{}'", self.rule),
        }
    }
}

/// Failed constraints collected while validating a value
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(Vec<FieldError>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, error: FieldError) {
        self.0.push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FieldError> {
        self.0.iter()
    }

    /// Errors for the field at `path`
    pub fn for_path<'a>(&'a self, path: &'a str) -> impl Iterator<Item = &'a FieldError> {
        self.0.iter().filter(move |error| error.path == path)
    }

    /// `Ok` when nothing failed
    pub fn into_result(self) -> Result<(), ValidatorError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(ValidatorError::Invalid(self))
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}", error)?;
        }
        Ok(())
    }
}

impl IntoIterator for FieldErrors {
    type Item = FieldError;
    type IntoIter = std::vec::IntoIter<FieldError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a FieldErrors {
    type Item = &'a FieldError;
    type IntoIter = std::slice::Iter<'a, FieldError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl From<FieldError> for FieldErrors {
    fn from(error: FieldError) -> Self {
        Self(vec![error])
    }
}

/// Outcome of a failed `FieldValidator` call.
///
/// `Invalid` carries data to report back to the client; `Internal` means the
/// validator itself could not do its job.
#[derive(Debug, Error)]
pub enum ValidatorError {
    #[error("validation failed: {0}")]
    Invalid(FieldErrors),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ValidatorError {
    /// Create an internal error
    pub fn internal<T: fmt::Display>(message: T) -> Self {
        ValidatorError::Internal(anyhow::anyhow!("{}", message))
    }

    pub fn is_invalid(&self) -> bool {
        matches!(self, ValidatorError::Invalid(_))
    }
}

/// Messages returned by a `SelfValidate` hook that belong to the client's request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Error)]
#[error("{}", .messages.join("; "))]
pub struct RequestValidationError {
    messages: Vec<String>,
}

impl RequestValidationError {
    pub fn new<I, S>(messages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            messages: messages.into_iter().map(Into::into).collect(),
        }
    }

    pub fn single(message: impl Into<String>) -> Self {
        Self {
            messages: vec![message.into()],
        }
    }

    pub fn push(&mut self, message: impl Into<String>) {
        self.messages.push(message.into());
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    pub fn into_messages(self) -> Vec<String> {
        self.messages
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_error_display() {
        assert_eq!(
            FieldError::new("ListQuery.Limit", "gte", Some("1")).to_string(),
            "ListQuery.Limit: failed on 'gte=1'"
        );
        assert_eq!(
            FieldError::new("", "required", None).to_string(),
            "failed on 'required'"
        );
    }

    #[test]
    fn test_field_errors_into_result() {
        assert!(FieldErrors::new().into_result().is_ok());

        let mut errors = FieldErrors::new();
        errors.push(FieldError::new("A.Name", "required", None));
        errors.push(FieldError::new("A.Age", "min", Some("18")));
        assert_eq!(errors.for_path("A.Age").count(), 1);

        let err = errors.into_result().unwrap_err();
        assert!(err.is_invalid());
        assert_eq!(
            err.to_string(),
            "validation failed: A.Name: failed on 'required'; A.Age: failed on 'min=18'"
        );
    }

    #[test]
    fn test_request_validation_error_downcast() {
        let err: anyhow::Error = RequestValidationError::new(["name is taken", "try again"]).into();
        assert_eq!(err.to_string(), "name is taken; try again");

        let found = err.downcast_ref::<RequestValidationError>().unwrap();
        assert_eq!(found.messages().len(), 2);
    }

    #[test]
    fn test_internal_error() {
        let err = ValidatorError::internal("undefined validation rule 'nope'");
        assert!(!err.is_invalid());
        assert_eq!(err.to_string(), "undefined validation rule 'nope'");
    }
}
