use crate::error::{OpenApiError, OpenApiResult};
use serde::{Deserialize, Serialize};

/// Configuration for OpenAPI document generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenApiConfig {
    /// API information
    pub info: ApiInfo,

    /// Server configurations
    pub servers: Vec<ServerConfig>,

    /// Global tags for grouping operations
    pub tags: Vec<TagConfig>,

    /// Render `Option<T>` fields as nullable
    pub nullable_optional: bool,
}

/// API information section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiInfo {
    pub title: String,
    pub description: Option<String>,
    pub version: String,
}

/// Server configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    pub url: String,
    pub description: Option<String>,
}

/// Tag configuration for grouping operations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagConfig {
    pub name: String,
    pub description: Option<String>,
}

impl Default for OpenApiConfig {
    fn default() -> Self {
        Self {
            info: ApiInfo {
                title: "API Documentation".to_string(),
                description: None,
                version: "1.0.0".to_string(),
            },
            servers: Vec::new(),
            tags: Vec::new(),
            nullable_optional: true,
        }
    }
}

impl OpenApiConfig {
    /// Create a new configuration with custom API info
    pub fn new(title: &str, version: &str) -> Self {
        let mut config = Self::default();
        config.info.title = title.to_string();
        config.info.version = version.to_string();
        config
    }

    /// Load configuration from TOML text
    pub fn from_toml_str(text: &str) -> OpenApiResult<Self> {
        let config: Self = toml::from_str(text)?;
        if config.info.title.trim().is_empty() {
            return Err(OpenApiError::config_error("info.title must not be empty"));
        }
        if config.info.version.trim().is_empty() {
            return Err(OpenApiError::config_error("info.version must not be empty"));
        }
        Ok(config)
    }

    /// Set the API description
    pub fn with_description(mut self, description: &str) -> Self {
        self.info.description = Some(description.to_string());
        self
    }

    /// Add a server configuration
    pub fn add_server(mut self, url: &str, description: Option<&str>) -> Self {
        self.servers.push(ServerConfig {
            url: url.to_string(),
            description: description.map(|s| s.to_string()),
        });
        self
    }

    /// Add a tag
    pub fn add_tag(mut self, name: &str, description: Option<&str>) -> Self {
        self.tags.push(TagConfig {
            name: name.to_string(),
            description: description.map(|s| s.to_string()),
        });
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let config = OpenApiConfig::new("Pets", "2.0.0")
            .with_description("Pet store")
            .add_server("https://api.example.com", Some("Production"))
            .add_tag("pets", None);

        assert_eq!(config.info.title, "Pets");
        assert_eq!(config.info.description.as_deref(), Some("Pet store"));
        assert_eq!(config.servers.len(), 1);
        assert_eq!(config.tags[0].name, "pets");
        assert!(config.nullable_optional);
    }

    #[test]
    fn test_from_toml() {
        let config = OpenApiConfig::from_toml_str(
            r#"
            nullable_optional = false

            [info]
            title = "Inventory"
            version = "0.3.0"

            [[servers]]
            url = "http://localhost:8080"
            "#,
        )
        .unwrap();

        assert_eq!(config.info.title, "Inventory");
        assert_eq!(config.info.description, None);
        assert_eq!(config.servers[0].url, "http://localhost:8080");
        assert!(!config.nullable_optional);
        assert!(config.tags.is_empty());
    }

    #[test]
    fn test_from_toml_rejects_empty_title() {
        let err = OpenApiConfig::from_toml_str(
            r#"
            [info]
            title = " "
            version = "1"
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, OpenApiError::Config(_)));

        assert!(matches!(
            OpenApiConfig::from_toml_str("info = 3"),
            Err(OpenApiError::Toml(_))
        ));
    }
}
