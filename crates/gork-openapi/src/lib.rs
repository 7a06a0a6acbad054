/*!
# gork-openapi

OpenAPI 3.1 document generation from gork type descriptors.

Route metadata plus the [`gork_core::Reflect`] descriptions of request and
response types are turned into a document: named structs and unions become
component schemas, `Option<T>` fields become nullable, `validate` tags become
schema constraints and section-style requests become parameters plus a body.

## Usage

```rust,no_run
use gork_openapi::{OpenApiConfig, OpenApiGenerator, RouteInfo};

let mut generator = OpenApiGenerator::new(OpenApiConfig::new("Pets", "1.0.0"));
let routes = vec![RouteInfo::new("GET", "/pets/{id}", "GetPet")];
let spec = generator.generate(&routes).unwrap();
```
*/

// Re-export main types
pub use crate::{
    config::OpenApiConfig,
    constraints::{apply_max_constraint, apply_min_constraint, apply_validation_constraints},
    docs::{enrich, DocExtractor, Documentation, FieldDoc, StaticDocs},
    error::{OpenApiError, OpenApiResult},
    export::{export_spec, render_spec, ExportConfig, ExportFormat},
    generator::{
        default_route_filter, OpenApiGenerator, RouteFilter, RouteInfo, RouteOptions,
        SecurityRequirement,
    },
    registry::SchemaRegistry,
    schema::{generate_schema, make_nullable, sanitize_schema_name},
    specification::{OpenApiSpec, Schema, SchemaType},
    union::{generate_union_schema, is_union_type, DiscriminatorInfo},
};

// Core modules
pub mod config;
pub mod error;
pub mod generator;
pub mod specification;

// Schema generation
pub mod basic;
pub mod constraints;
pub mod registry;
pub mod schema;
pub mod union;

// Documentation enrichment
pub mod docs;

// Export functionality
pub mod export;
