//! Request processing errors
//!
//! Collected validation messages and fatal server failures are different types
//! so callers map them to 400 and 500 without inspecting messages.

use http::{header, HeaderValue, Response, StatusCode};
use serde::Serialize;
use serde_json::json;
use std::collections::BTreeMap;
use thiserror::Error;

/// Result type for request processing
pub type RequestResult<T> = Result<T, RequestError>;

/// Validation messages collected per section (`query`, `body`, ...)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SectionErrors(BTreeMap<String, Vec<String>>);

impl SectionErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Errors holding a single message
    pub fn single(section: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(section, message);
        errors
    }

    pub fn add(&mut self, section: &str, message: impl Into<String>) {
        self.0
            .entry(section.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn extend<I, S>(&mut self, section: &str, messages: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.0
            .entry(section.to_string())
            .or_default()
            .extend(messages.into_iter().map(Into::into));
    }

    pub fn get(&self, section: &str) -> Option<&[String]> {
        self.0.get(section).map(Vec::as_slice)
    }

    pub fn contains(&self, section: &str) -> bool {
        self.0.contains_key(section)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of sections with errors
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Total number of messages across sections
    pub fn total(&self) -> usize {
        self.0.values().map(Vec::len).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0.iter().map(|(section, messages)| (section.as_str(), messages.as_slice()))
    }

    pub fn into_inner(self) -> BTreeMap<String, Vec<String>> {
        self.0
    }
}

/// Failures that abort the request
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Invalid request type: {message}")]
    InvalidRequestType { message: String },

    #[error("Invalid section {section}: {message}")]
    InvalidSection { section: String, message: String },

    #[error("validation panic: {0}")]
    ValidationPanic(String),

    /// The field validator could not run
    #[error(transparent)]
    Validator(anyhow::Error),

    /// A self-validation hook failed with something other than a `RequestValidationError`
    #[error(transparent)]
    SelfValidation(anyhow::Error),
}

impl ServerError {
    /// Create an invalid request type error
    pub fn invalid_request_type<T: Into<String>>(message: T) -> Self {
        ServerError::InvalidRequestType {
            message: message.into(),
        }
    }

    /// Create an invalid section error
    pub fn invalid_section<S: Into<String>, T: Into<String>>(section: S, message: T) -> Self {
        ServerError::InvalidSection {
            section: section.into(),
            message: message.into(),
        }
    }

    /// Get error code for consistent API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            ServerError::InvalidRequestType { .. } => "INVALID_REQUEST_TYPE",
            ServerError::InvalidSection { .. } => "INVALID_SECTION",
            ServerError::ValidationPanic(_) => "VALIDATION_PANIC",
            ServerError::Validator(_) => "VALIDATOR_ERROR",
            ServerError::SelfValidation(_) => "SELF_VALIDATION_ERROR",
        }
    }
}

/// Outcome of a failed `RequestProcessor::process`
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("Request validation failed")]
    Validation(SectionErrors),

    #[error(transparent)]
    Server(#[from] ServerError),
}

impl RequestError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            RequestError::Validation(_) => StatusCode::BAD_REQUEST,
            RequestError::Server(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// JSON body in the `ValidationErrorResponse` / `ErrorResponse` shape.
    /// Server error details are not exposed to the client.
    pub fn to_response_body(&self) -> serde_json::Value {
        match self {
            RequestError::Validation(errors) => json!({
                "error": "Validation failed",
                "details": errors,
            }),
            RequestError::Server(err) => json!({
                "error": "Internal server error",
                "details": { "code": err.error_code() },
            }),
        }
    }

    /// Build the HTTP response for this error
    pub fn into_response(self) -> Response<Vec<u8>> {
        let body = serde_json::to_vec(&self.to_response_body()).unwrap_or_default();
        let mut response = Response::new(body);
        *response.status_mut() = self.status_code();
        response.headers_mut().insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        response
    }
}
