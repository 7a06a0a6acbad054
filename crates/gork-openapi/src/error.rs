use thiserror::Error;

pub type OpenApiResult<T> = Result<T, OpenApiError>;

/// Failures while generating, loading configuration for, or exporting a document
#[derive(Debug, Error)]
pub enum OpenApiError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A route that cannot be placed in the document
    #[error("Route discovery error for {method} {path}: {message}")]
    RouteDiscovery {
        method: String,
        path: String,
        message: String,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Export format error: {0}")]
    Export(String),
}

impl OpenApiError {
    pub fn route_discovery_error<T: ToString>(method: &str, path: &str, msg: T) -> Self {
        Self::RouteDiscovery {
            method: method.to_string(),
            path: path.to_string(),
            message: msg.to_string(),
        }
    }

    pub fn config_error<T: ToString>(msg: T) -> Self {
        Self::Config(msg.to_string())
    }

    pub fn export_error<T: ToString>(msg: T) -> Self {
        Self::Export(msg.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_discovery_message() {
        let err = OpenApiError::route_discovery_error("CONNECT", "/tunnel", "unsupported HTTP method");
        assert_eq!(
            err.to_string(),
            "Route discovery error for CONNECT /tunnel: unsupported HTTP method"
        );
    }

    #[test]
    fn test_from_serde_json() {
        let err: OpenApiError = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert!(err.to_string().starts_with("JSON error"));
    }
}
