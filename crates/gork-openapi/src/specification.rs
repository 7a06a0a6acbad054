use gork_core::{Reflect, StructType, TypeDescriptor};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// OpenAPI version written into every generated document
pub const OPENAPI_VERSION: &str = "3.1.0";

/// Prefix of component schema references
pub const SCHEMA_REF_PREFIX: &str = "#/components/schemas/";

/// Prefix of component response references
pub const RESPONSE_REF_PREFIX: &str = "#/components/responses/";

/// Complete OpenAPI 3.1 document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenApiSpec {
    /// OpenAPI specification version
    pub openapi: String,

    /// API metadata
    pub info: ApiInfo,

    /// Server URLs
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub servers: Vec<Server>,

    /// API paths and operations
    #[serde(default)]
    pub paths: BTreeMap<String, PathItem>,

    /// Reusable components
    #[serde(skip_serializing_if = "Option::is_none")]
    pub components: Option<Components>,

    /// Tags for grouping operations
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub tags: Vec<Tag>,
}

/// API metadata information
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiInfo {
    pub title: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    pub version: String,
}

/// Server entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Server {
    pub url: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Operations available on one path
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct PathItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub get: Option<Operation>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub put: Option<Operation>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub post: Option<Operation>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete: Option<Operation>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Operation>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub head: Option<Operation>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub patch: Option<Operation>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace: Option<Operation>,
}

impl PathItem {
    /// Operations in document order, paired with their lowercase method
    pub fn operations(&self) -> impl Iterator<Item = (&'static str, &Operation)> {
        [
            ("get", &self.get),
            ("put", &self.put),
            ("post", &self.post),
            ("delete", &self.delete),
            ("options", &self.options),
            ("head", &self.head),
            ("patch", &self.patch),
            ("trace", &self.trace),
        ]
        .into_iter()
        .filter_map(|(method, operation)| operation.as_ref().map(|op| (method, op)))
    }

    pub fn operations_mut(&mut self) -> impl Iterator<Item = &mut Operation> {
        [
            &mut self.get,
            &mut self.put,
            &mut self.post,
            &mut self.delete,
            &mut self.options,
            &mut self.head,
            &mut self.patch,
            &mut self.trace,
        ]
        .into_iter()
        .filter_map(Option::as_mut)
    }
}

/// HTTP operation (GET, POST, etc.)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Operation {
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub tags: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(rename = "operationId", skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<String>,

    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub parameters: Vec<Parameter>,

    #[serde(rename = "requestBody", skip_serializing_if = "Option::is_none")]
    pub request_body: Option<RequestBody>,

    /// Responses keyed by status code
    #[serde(default)]
    pub responses: BTreeMap<String, Response>,

    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub security: Vec<SecurityRequirements>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<bool>,
}

/// Operation parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,

    /// Parameter location (query, header, path, cookie)
    #[serde(rename = "in")]
    pub location: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<Schema>,
}

/// Request body specification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    pub content: BTreeMap<String, MediaType>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
}

/// Response specification, or a reference to a shared response component
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Response {
    #[serde(rename = "$ref", skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,

    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub description: String,

    #[serde(skip_serializing_if = "BTreeMap::is_empty", default)]
    pub content: BTreeMap<String, MediaType>,
}

impl Response {
    /// Reference to `#/components/responses/<name>`
    pub fn reference(name: &str) -> Self {
        Self {
            reference: Some(format!("{}{}", RESPONSE_REF_PREFIX, name)),
            ..Default::default()
        }
    }

    /// Response with a JSON body
    pub fn json(description: &str, schema: Schema) -> Self {
        Self {
            reference: None,
            description: description.to_string(),
            content: json_content(schema),
        }
    }
}

/// Media type specification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaType {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<Schema>,
}

/// `application/json` content map around a schema
pub fn json_content(schema: Schema) -> BTreeMap<String, MediaType> {
    let mut content = BTreeMap::new();
    content.insert(
        "application/json".to_string(),
        MediaType {
            schema: Some(schema),
        },
    );
    content
}

/// The `type` keyword: a single type, or a list for nullable unions such as `["string","null"]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SchemaType {
    Single(String),
    Union(Vec<String>),
}

/// Discriminator of a `oneOf` union
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Discriminator {
    #[serde(rename = "propertyName")]
    pub property_name: String,

    #[serde(skip_serializing_if = "BTreeMap::is_empty", default)]
    pub mapping: BTreeMap<String, String>,
}

/// Schema for data types
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Schema {
    /// Reference to another schema
    #[serde(rename = "$ref", skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Data type
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<SchemaType>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    /// Properties for object types, in declaration order
    #[serde(skip_serializing_if = "IndexMap::is_empty", default)]
    pub properties: IndexMap<String, Schema>,

    /// Required properties, in first-insertion order
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub required: Vec<String>,

    /// Items schema for arrays
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Schema>>,

    #[serde(rename = "oneOf", skip_serializing_if = "Vec::is_empty", default)]
    pub one_of: Vec<Schema>,

    #[serde(rename = "anyOf", skip_serializing_if = "Vec::is_empty", default)]
    pub any_of: Vec<Schema>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub discriminator: Option<Discriminator>,

    #[serde(rename = "enum", skip_serializing_if = "Vec::is_empty", default)]
    pub enum_values: Vec<serde_json::Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum: Option<f64>,

    #[serde(rename = "minLength", skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u64>,

    #[serde(rename = "maxLength", skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,

    #[serde(rename = "minItems", skip_serializing_if = "Option::is_none")]
    pub min_items: Option<u64>,

    #[serde(rename = "maxItems", skip_serializing_if = "Option::is_none")]
    pub max_items: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,

    /// Specification extensions (`x-...`)
    #[serde(flatten, default)]
    pub extensions: IndexMap<String, serde_json::Value>,
}

impl Schema {
    /// Schema with a single `type`
    pub fn typed(schema_type: &str) -> Self {
        Self {
            schema_type: Some(SchemaType::Single(schema_type.to_string())),
            ..Default::default()
        }
    }

    /// Schema with a single `type` and a description
    pub fn described(schema_type: &str, description: &str) -> Self {
        Self {
            description: Some(description.to_string()),
            ..Self::typed(schema_type)
        }
    }

    /// Reference to `#/components/schemas/<name>`
    pub fn reference(name: &str) -> Self {
        Self {
            reference: Some(format!("{}{}", SCHEMA_REF_PREFIX, name)),
            ..Default::default()
        }
    }

    pub fn is_reference(&self) -> bool {
        self.reference.is_some()
    }

    /// The single `type` keyword, if that is what this schema carries
    pub fn single_type(&self) -> Option<&str> {
        match &self.schema_type {
            Some(SchemaType::Single(t)) => Some(t),
            _ => None,
        }
    }

    /// Append `name` to `required` unless already present
    pub fn add_required(&mut self, name: &str) {
        if !self.required.iter().any(|existing| existing == name) {
            self.required.push(name.to_string());
        }
    }
}

/// Reusable components
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Components {
    #[serde(skip_serializing_if = "BTreeMap::is_empty", default)]
    pub schemas: BTreeMap<String, Schema>,

    #[serde(skip_serializing_if = "BTreeMap::is_empty", default)]
    pub responses: BTreeMap<String, Response>,

    #[serde(rename = "securitySchemes", skip_serializing_if = "BTreeMap::is_empty", default)]
    pub security_schemes: BTreeMap<String, SecurityScheme>,
}

/// Security scheme
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SecurityScheme {
    #[serde(rename = "apiKey")]
    ApiKey {
        name: String,
        #[serde(rename = "in")]
        location: String,
    },
    #[serde(rename = "http")]
    Http {
        scheme: String,
        #[serde(rename = "bearerFormat", skip_serializing_if = "Option::is_none")]
        bearer_format: Option<String>,
    },
}

/// Security requirement: scheme name to required scopes
pub type SecurityRequirements = BTreeMap<String, Vec<String>>;

/// Tag for grouping operations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl OpenApiSpec {
    /// Create an empty document
    pub fn new(title: &str, version: &str) -> Self {
        Self {
            openapi: OPENAPI_VERSION.to_string(),
            info: ApiInfo {
                title: title.to_string(),
                description: None,
                version: version.to_string(),
            },
            servers: Vec::new(),
            paths: BTreeMap::new(),
            components: None,
            tags: Vec::new(),
        }
    }
}

// Described as an opaque struct so that the documentation route can be recognized by type.
impl Reflect for OpenApiSpec {
    fn type_descriptor() -> TypeDescriptor {
        TypeDescriptor::structure::<Self>("OpenApiSpec", "gork_openapi", StructType::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_add_required_is_idempotent() {
        let mut schema = Schema {
            required: vec!["existing".to_string()],
            ..Schema::typed("object")
        };
        schema.add_required("test_field");
        assert_eq!(schema.required, vec!["existing", "test_field"]);
        schema.add_required("test_field");
        assert_eq!(schema.required, vec!["existing", "test_field"]);
    }

    #[test]
    fn test_schema_serialization() {
        let mut schema = Schema::typed("object");
        schema.properties.insert(
            "name".to_string(),
            Schema {
                schema_type: Some(SchemaType::Union(vec!["string".into(), "null".into()])),
                ..Default::default()
            },
        );
        schema.properties.insert("owner".to_string(), Schema::reference("User"));
        schema
            .extensions
            .insert("x-rules".to_string(), json!([{"name": "owned", "args": []}]));

        assert_eq!(
            serde_json::to_value(&schema).unwrap(),
            json!({
                "type": "object",
                "properties": {
                    "name": {"type": ["string", "null"]},
                    "owner": {"$ref": "#/components/schemas/User"}
                },
                "x-rules": [{"name": "owned", "args": []}]
            })
        );
    }

    #[test]
    fn test_response_reference_serialization() {
        assert_eq!(
            serde_json::to_value(Response::reference("BadRequest")).unwrap(),
            json!({"$ref": "#/components/responses/BadRequest"})
        );
    }

    #[test]
    fn test_document_round_trip() {
        let mut spec = OpenApiSpec::new("Pets", "1.0.0");
        spec.paths.insert("/pets".to_string(), PathItem::default());
        let text = serde_json::to_string(&spec).unwrap();
        let parsed: OpenApiSpec = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, spec);
        assert_eq!(parsed.openapi, "3.1.0");
    }
}
