/*!
Writing generated documents to disk.

Export is driven by an explicit [`ExportConfig`]; whether a process exports and
exits is left to the caller.
*/

use crate::{
    error::{OpenApiError, OpenApiResult},
    specification::OpenApiSpec,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Available export formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Json,
    Yaml,
}

impl ExportFormat {
    /// Infer the format from a file extension (`json`, `yaml`, `yml`)
    pub fn from_path(path: &Path) -> OpenApiResult<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Ok(ExportFormat::Json),
            Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
                Ok(ExportFormat::Yaml)
            }
            _ => Err(OpenApiError::export_error(format!(
                "cannot infer export format from {}",
                path.display()
            ))),
        }
    }
}

/// Where and how to write a document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportConfig {
    pub path: PathBuf,
    pub format: ExportFormat,
    /// Pretty print JSON output
    pub pretty: bool,
}

impl ExportConfig {
    pub fn new(path: impl Into<PathBuf>, format: ExportFormat) -> Self {
        Self {
            path: path.into(),
            format,
            pretty: true,
        }
    }

    /// Configuration whose format follows the file extension
    pub fn for_path(path: impl Into<PathBuf>) -> OpenApiResult<Self> {
        let path = path.into();
        let format = ExportFormat::from_path(&path)?;
        Ok(Self::new(path, format))
    }

    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }
}

/// Render a document in the given format
pub fn render_spec(spec: &OpenApiSpec, format: ExportFormat, pretty: bool) -> OpenApiResult<String> {
    match format {
        ExportFormat::Json if pretty => Ok(serde_json::to_string_pretty(spec)?),
        ExportFormat::Json => Ok(serde_json::to_string(spec)?),
        ExportFormat::Yaml => Ok(serde_yaml::to_string(spec)?),
    }
}

/// Write a document as configured, creating parent directories as needed
pub fn export_spec(spec: &OpenApiSpec, config: &ExportConfig) -> OpenApiResult<()> {
    let rendered = render_spec(spec, config.format, config.pretty)?;
    if let Some(parent) = config.path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(&config.path, rendered)?;
    info!(path = %config.path.display(), format = ?config.format, "exported OpenAPI document");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_format_from_path() {
        assert_eq!(ExportFormat::from_path(Path::new("api.json")).unwrap(), ExportFormat::Json);
        assert_eq!(ExportFormat::from_path(Path::new("api.YML")).unwrap(), ExportFormat::Yaml);
        assert!(matches!(
            ExportFormat::from_path(Path::new("api.txt")),
            Err(OpenApiError::Export(_))
        ));
    }

    #[test]
    fn test_export_json_and_yaml() {
        let dir = TempDir::new().unwrap();
        let spec = OpenApiSpec::new("Export", "1.2.3");

        let json_path = dir.path().join("nested/openapi.json");
        export_spec(&spec, &ExportConfig::for_path(&json_path).unwrap()).unwrap();
        let parsed: OpenApiSpec =
            serde_json::from_str(&fs::read_to_string(&json_path).unwrap()).unwrap();
        assert_eq!(parsed, spec);

        let yaml_path = dir.path().join("openapi.yaml");
        export_spec(&spec, &ExportConfig::new(&yaml_path, ExportFormat::Yaml)).unwrap();
        let text = fs::read_to_string(&yaml_path).unwrap();
        assert!(text.contains("openapi:"));
        assert!(text.contains("3.1.0"));
    }

    #[test]
    fn test_compact_json() {
        let spec = OpenApiSpec::new("Compact", "1");
        let text = render_spec(&spec, ExportFormat::Json, false).unwrap();
        assert!(!text.contains('\n'));
    }
}
