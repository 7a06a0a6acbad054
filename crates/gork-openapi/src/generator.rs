use crate::{
    config::OpenApiConfig,
    constraints::apply_validation_constraints,
    docs::{enrich, DocExtractor},
    error::{OpenApiError, OpenApiResult},
    registry::SchemaRegistry,
    schema::generate_schema,
    specification::*,
};
use gork_core::{param_name, parse_param_tag, ParamLocation, Section, StructType, TypeDescriptor};
use once_cell::sync::Lazy;
use regex::Regex;
use std::any::TypeId;
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

static PATH_PARAM: Lazy<Result<Regex, regex::Error>> = Lazy::new(|| Regex::new(r"\{([^}]+)\}"));

/// Name of the shared error body schema
pub const ERROR_RESPONSE: &str = "ErrorResponse";

/// Name of the shared validation error body schema
pub const VALIDATION_ERROR_RESPONSE: &str = "ValidationErrorResponse";

/// Predicate deciding which routes are documented
pub type RouteFilter = Box<dyn Fn(&RouteInfo) -> bool + Send + Sync>;

/// Route information for OpenAPI generation
#[derive(Debug, Clone)]
pub struct RouteInfo {
    /// HTTP method
    pub method: String,
    /// Path pattern, with `{name}` placeholders
    pub path: String,
    /// Handler function name, used as the operation ID
    pub handler_name: String,
    pub request_type: Option<TypeDescriptor>,
    pub response_type: Option<TypeDescriptor>,
    pub options: RouteOptions,
}

impl RouteInfo {
    pub fn new(method: &str, path: &str, handler_name: &str) -> Self {
        Self {
            method: method.to_string(),
            path: path.to_string(),
            handler_name: handler_name.to_string(),
            request_type: None,
            response_type: None,
            options: RouteOptions::default(),
        }
    }

    pub fn with_request(mut self, ty: TypeDescriptor) -> Self {
        self.request_type = Some(ty);
        self
    }

    pub fn with_response(mut self, ty: TypeDescriptor) -> Self {
        self.response_type = Some(ty);
        self
    }

    pub fn with_options(mut self, options: RouteOptions) -> Self {
        self.options = options;
        self
    }
}

/// Per-route documentation options
#[derive(Debug, Clone, Default)]
pub struct RouteOptions {
    pub tags: Vec<String>,
    pub security: Vec<SecurityRequirement>,
    pub summary: Option<String>,
    pub deprecated: bool,
}

/// A security requirement declared on a route: `basic`, `bearer` or `apiKey`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityRequirement {
    pub kind: String,
    pub scopes: Vec<String>,
}

impl SecurityRequirement {
    pub fn new(kind: &str) -> Self {
        Self {
            kind: kind.to_string(),
            scopes: Vec::new(),
        }
    }

    pub fn basic() -> Self {
        Self::new("basic")
    }

    pub fn bearer() -> Self {
        Self::new("bearer")
    }

    pub fn api_key() -> Self {
        Self::new("apiKey")
    }

    pub fn with_scopes(mut self, scopes: &[&str]) -> Self {
        self.scopes = scopes.iter().map(|s| s.to_string()).collect();
        self
    }
}

/// Documents every route except the one serving the document itself
pub fn default_route_filter(route: &RouteInfo) -> bool {
    match &route.response_type {
        Some(ty) => ty.type_id() != Some(TypeId::of::<OpenApiSpec>()),
        None => true,
    }
}

/// Main OpenAPI specification generator
pub struct OpenApiGenerator {
    /// Configuration
    config: OpenApiConfig,
    /// Route predicate
    filter: RouteFilter,
    /// Optional documentation source
    docs: Option<Box<dyn DocExtractor + Send + Sync>>,
    /// Generated specification
    spec: Option<OpenApiSpec>,
}

impl fmt::Debug for OpenApiGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenApiGenerator")
            .field("config", &self.config)
            .field("has_docs", &self.docs.is_some())
            .field("generated", &self.spec.is_some())
            .finish()
    }
}

impl OpenApiGenerator {
    /// Create a new OpenAPI generator
    pub fn new(config: OpenApiConfig) -> Self {
        Self {
            config,
            filter: Box::new(default_route_filter),
            docs: None,
            spec: None,
        }
    }

    /// Replace the route predicate
    pub fn with_route_filter<F>(mut self, filter: F) -> Self
    where
        F: Fn(&RouteInfo) -> bool + Send + Sync + 'static,
    {
        self.filter = Box::new(filter);
        self
    }

    /// Enrich generated documents with descriptions from `docs`
    pub fn with_docs<D>(mut self, docs: D) -> Self
    where
        D: DocExtractor + Send + Sync + 'static,
    {
        self.docs = Some(Box::new(docs));
        self
    }

    /// Generate the document for `routes`. Each call starts from an empty schema registry.
    pub fn generate(&mut self, routes: &[RouteInfo]) -> OpenApiResult<&OpenApiSpec> {
        let mut spec = OpenApiSpec::new(&self.config.info.title, &self.config.info.version);
        spec.info.description = self.config.info.description.clone();
        spec.servers = self
            .config
            .servers
            .iter()
            .map(|s| Server {
                url: s.url.clone(),
                description: s.description.clone(),
            })
            .collect();
        spec.tags = self
            .config
            .tags
            .iter()
            .map(|t| Tag {
                name: t.name.clone(),
                description: t.description.clone(),
            })
            .collect();

        let mut registry =
            SchemaRegistry::new().with_nullable_fields(self.config.nullable_optional);
        let mut components = Components::default();

        for route in routes {
            if !(self.filter)(route) {
                debug!(method = %route.method, path = %route.path, "route excluded from document");
                continue;
            }
            self.process_route(&mut spec, &mut components, &mut registry, route)?;
        }

        if !spec.paths.is_empty() {
            add_error_components(&mut components, &mut registry);
        }
        components.schemas = registry.into_schemas();

        let has_components = !components.schemas.is_empty()
            || !components.responses.is_empty()
            || !components.security_schemes.is_empty();
        if has_components {
            spec.components = Some(components);
        }

        if let Some(docs) = &self.docs {
            enrich(&mut spec, docs.as_ref());
        }

        Ok(self.spec.insert(spec))
    }

    /// Process a single route and add it to the document
    fn process_route(
        &self,
        spec: &mut OpenApiSpec,
        components: &mut Components,
        registry: &mut SchemaRegistry,
        route: &RouteInfo,
    ) -> OpenApiResult<()> {
        let method = route.method.to_uppercase();
        let operation = self.create_operation(&method, components, registry, route)?;

        let path_item = spec.paths.entry(route.path.clone()).or_default();
        let slot = match method.as_str() {
            "GET" => &mut path_item.get,
            "POST" => &mut path_item.post,
            "PUT" => &mut path_item.put,
            "DELETE" => &mut path_item.delete,
            "PATCH" => &mut path_item.patch,
            "OPTIONS" => &mut path_item.options,
            "HEAD" => &mut path_item.head,
            "TRACE" => &mut path_item.trace,
            _ => {
                return Err(OpenApiError::route_discovery_error(
                    &route.method,
                    &route.path,
                    "unsupported HTTP method",
                ));
            }
        };
        *slot = Some(operation);

        debug!(method = %method, path = %route.path, handler = %route.handler_name, "documented route");
        Ok(())
    }

    /// Create the operation for one route
    fn create_operation(
        &self,
        method: &str,
        components: &mut Components,
        registry: &mut SchemaRegistry,
        route: &RouteInfo,
    ) -> OpenApiResult<Operation> {
        let (mut parameters, body_type) = match &route.request_type {
            Some(ty) => request_parts(ty, registry),
            None => (Vec::new(), None),
        };
        add_path_template_parameters(route, &mut parameters)?;

        let request_body = match body_type {
            Some(body) if matches!(method, "POST" | "PUT" | "PATCH") => Some(RequestBody {
                description: None,
                content: json_content(generate_schema(&body, registry, false)),
                required: Some(true),
            }),
            _ => None,
        };

        let mut responses = BTreeMap::new();
        match &route.response_type {
            Some(ty) => {
                let schema = generate_schema(ty, registry, false);
                responses.insert("200".to_string(), Response::json("Successful response", schema));
            }
            None => {
                responses.insert(
                    "204".to_string(),
                    Response {
                        description: "No Content".to_string(),
                        ..Default::default()
                    },
                );
            }
        }
        responses.insert("400".to_string(), Response::reference("BadRequest"));
        responses.insert("422".to_string(), Response::reference("UnprocessableEntity"));
        responses.insert("500".to_string(), Response::reference("InternalServerError"));

        let security = route
            .options
            .security
            .iter()
            .filter_map(|requirement| {
                let (name, scheme) = security_scheme(&requirement.kind)?;
                components
                    .security_schemes
                    .entry(name.to_string())
                    .or_insert(scheme);
                let mut entry = SecurityRequirements::new();
                entry.insert(name.to_string(), requirement.scopes.clone());
                Some(entry)
            })
            .collect();

        Ok(Operation {
            tags: route.options.tags.clone(),
            summary: route.options.summary.clone(),
            description: None,
            operation_id: Some(route.handler_name.clone()).filter(|name| !name.is_empty()),
            parameters,
            request_body,
            responses,
            security,
            deprecated: route.options.deprecated.then_some(true),
        })
    }

    /// Export specification as JSON
    pub fn export_json(&self, pretty: bool) -> OpenApiResult<String> {
        let spec = self.require_spec()?;
        if pretty {
            serde_json::to_string_pretty(spec).map_err(OpenApiError::from)
        } else {
            serde_json::to_string(spec).map_err(OpenApiError::from)
        }
    }

    /// Export specification as YAML
    pub fn export_yaml(&self) -> OpenApiResult<String> {
        serde_yaml::to_string(self.require_spec()?).map_err(OpenApiError::from)
    }

    /// Get the generated specification
    pub fn specification(&self) -> Option<&OpenApiSpec> {
        self.spec.as_ref()
    }

    fn require_spec(&self) -> OpenApiResult<&OpenApiSpec> {
        self.spec.as_ref().ok_or_else(|| {
            OpenApiError::export_error("No specification generated yet. Call generate() first.")
        })
    }
}

/// Scheme component for a declared security kind; unknown kinds are skipped
fn security_scheme(kind: &str) -> Option<(&'static str, SecurityScheme)> {
    match kind {
        "basic" => Some((
            "BasicAuth",
            SecurityScheme::Http {
                scheme: "basic".to_string(),
                bearer_format: None,
            },
        )),
        "bearer" => Some((
            "BearerAuth",
            SecurityScheme::Http {
                scheme: "bearer".to_string(),
                bearer_format: Some("JWT".to_string()),
            },
        )),
        "apiKey" => Some((
            "ApiKeyAuth",
            SecurityScheme::ApiKey {
                name: "X-API-Key".to_string(),
                location: "header".to_string(),
            },
        )),
        other => {
            debug!(kind = other, "skipping unknown security kind");
            None
        }
    }
}

/// Parameters and body type of a request type.
///
/// Section-style requests (`Path`, `Query`, `Headers`, `Cookies`, `Body` fields)
/// take parameters from each section's fields. Otherwise parameters come from
/// `openapi:"name,in=..."` fields and the request type itself is the body.
fn request_parts(
    request: &TypeDescriptor,
    registry: &mut SchemaRegistry,
) -> (Vec<Parameter>, Option<TypeDescriptor>) {
    let request = request.deref();
    let Some(layout) = request.struct_layout() else {
        return (Vec::new(), Some(request));
    };

    if !is_section_request(&layout) {
        return (tagged_parameters(&layout, registry), Some(request));
    }

    let mut parameters = Vec::new();
    let mut body = None;
    for field in layout.fields().iter().filter(|field| field.is_public()) {
        let Some(section) = Section::from_field_name(field.name()) else {
            continue;
        };
        match section.location() {
            None => body = Some(field.ty()),
            Some(location) => {
                let section_type = field.ty().deref();
                if let Some(section_layout) = section_type.as_struct() {
                    section_parameters(section_layout, location, registry, &mut parameters);
                }
            }
        }
    }
    (parameters, body)
}

/// Whether the layout splits the request into named sections
pub fn is_section_request(layout: &StructType) -> bool {
    layout
        .fields()
        .iter()
        .any(|field| field.is_public() && Section::from_field_name(field.name()).is_some())
}

fn section_parameters(
    layout: &StructType,
    location: ParamLocation,
    registry: &mut SchemaRegistry,
    parameters: &mut Vec<Parameter>,
) {
    for field in layout.fields().iter().filter(|field| field.is_public()) {
        let Some(name) = param_name(field) else {
            continue;
        };
        parameters.push(parameter(field, &name, location, registry));
    }
}

fn tagged_parameters(layout: &StructType, registry: &mut SchemaRegistry) -> Vec<Parameter> {
    layout
        .fields()
        .iter()
        .filter(|field| field.is_public())
        .filter_map(|field| {
            let param = field
                .tag()
                .get("openapi")
                .and_then(|value| parse_param_tag(&value))?;
            Some(parameter(field, &param.name, param.location, registry))
        })
        .collect()
}

fn parameter(
    field: &gork_core::Field,
    name: &str,
    location: ParamLocation,
    registry: &mut SchemaRegistry,
) -> Parameter {
    let field_type = field.ty();
    let mut schema = generate_schema(&field_type, registry, false);
    let mut scratch = Schema::typed("object");
    if let Some(rules) = field.tag().get("validate") {
        apply_validation_constraints(Some(&mut schema), &rules, &field_type, &mut scratch, name);
    }
    let description = field.tag().get("description").filter(|d| !d.is_empty());
    let required = location == ParamLocation::Path || !scratch.required.is_empty();

    Parameter {
        name: name.to_string(),
        location: location.to_string(),
        description,
        required: Some(required),
        schema: Some(schema),
    }
}

/// Add `{name}` placeholders of `path` that no declared path parameter covers
fn add_path_template_parameters(
    route: &RouteInfo,
    parameters: &mut Vec<Parameter>,
) -> OpenApiResult<()> {
    let pattern = PATH_PARAM
        .as_ref()
        .map_err(|e| path_pattern_error(route, e))?;
    for capture in pattern.captures_iter(&route.path) {
        let name = &capture[1];
        let covered = parameters
            .iter()
            .any(|p| p.location == ParamLocation::Path.as_str() && p.name == name);
        if !covered {
            parameters.push(Parameter {
                name: name.to_string(),
                location: ParamLocation::Path.to_string(),
                description: None,
                required: Some(true),
                schema: Some(Schema::typed("string")),
            });
        }
    }
    Ok(())
}

fn path_pattern_error(route: &RouteInfo, err: &regex::Error) -> OpenApiError {
    OpenApiError::route_discovery_error(
        &route.method,
        &route.path,
        format!("Failed to compile path parameter regex: {}", err),
    )
}

/// Shared error schemas and responses referenced by every operation
fn add_error_components(components: &mut Components, registry: &mut SchemaRegistry) {
    for name in [ERROR_RESPONSE, VALIDATION_ERROR_RESPONSE] {
        if !registry.contains(name) {
            registry.register(name, error_body_schema());
        }
    }

    let responses = [
        ("BadRequest", "Bad Request", VALIDATION_ERROR_RESPONSE),
        ("UnprocessableEntity", "Unprocessable Entity", ERROR_RESPONSE),
        ("InternalServerError", "Internal Server Error", ERROR_RESPONSE),
    ];
    for (name, description, schema) in responses {
        components
            .responses
            .entry(name.to_string())
            .or_insert_with(|| Response::json(description, Schema::reference(schema)));
    }
}

fn error_body_schema() -> Schema {
    let mut schema = Schema::typed("object");
    schema
        .properties
        .insert("error".to_string(), Schema::typed("string"));
    schema
        .properties
        .insert("details".to_string(), Schema::typed("object"));
    schema.add_required("error");
    schema
}
