use http::{Extensions, Method};

/// Request-scoped data handed to self-validation hooks
#[derive(Debug, Clone, Default)]
pub struct ValidationContext {
    method: Method,
    path: String,
    extensions: Extensions,
}

impl ValidationContext {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            extensions: Extensions::new(),
        }
    }

    /// Attach a request-scoped value, e.g. the authenticated user
    pub fn with_extension<T>(mut self, value: T) -> Self
    where
        T: Clone + Send + Sync + 'static,
    {
        self.extensions.insert(value);
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn extension<T: Send + Sync + 'static>(&self) -> Option<&T> {
        self.extensions.get::<T>()
    }

    pub fn extensions(&self) -> &Extensions {
        &self.extensions
    }

    pub fn extensions_mut(&mut self) -> &mut Extensions {
        &mut self.extensions
    }
}

/// Context-aware validation implemented by a request section type.
///
/// Runs after tag-based field validation. Returning a
/// `RequestValidationError` (from `gork-validation`) reports collected messages
/// for the section; any other error aborts the request as a server error.
pub trait SelfValidate {
    fn validate(&self, ctx: &ValidationContext) -> anyhow::Result<()>;
}
