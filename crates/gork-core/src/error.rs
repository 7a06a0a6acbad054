use thiserror::Error;

/// Errors raised by the rule-invocation grammar
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TagParseError {
    /// A closing parenthesis appeared without a matching opening one
    #[error("unbalanced parentheses at position {position}")]
    UnbalancedParens { position: usize },

    /// Input ended while a quoted string was still open
    #[error("unterminated {quote} quote")]
    UnterminatedQuote { quote: char },

    /// A segment looked like an invocation but did not have the `name(args)` shape
    #[error("malformed rule invocation: {0}")]
    MalformedInvocation(String),
}

/// Errors raised while converting between dynamic values and JSON or typed data
#[derive(Debug, Error)]
pub enum ValueError {
    /// JSON data did not have the shape the descriptor expects
    #[error("type mismatch at '{path}': expected {expected}, found {found}")]
    TypeMismatch {
        path: String,
        expected: String,
        found: String,
    },

    /// Conversion into a concrete Rust type failed
    #[error("conversion failed: {0}")]
    Conversion(#[from] serde_json::Error),
}

impl ValueError {
    pub(crate) fn mismatch(path: &str, expected: impl Into<String>, found: &serde_json::Value) -> Self {
        let found = match found {
            serde_json::Value::Null => "null",
            serde_json::Value::Bool(_) => "boolean",
            serde_json::Value::Number(_) => "number",
            serde_json::Value::String(_) => "string",
            serde_json::Value::Array(_) => "array",
            serde_json::Value::Object(_) => "object",
        };
        Self::TypeMismatch {
            path: if path.is_empty() { "$".to_string() } else { path.to_string() },
            expected: expected.into(),
            found: found.to_string(),
        }
    }
}
