use gork_core::{Reflect, StructType, TypeDescriptor, Union2};
use gork_openapi::specification::{Response, SecurityScheme, SCHEMA_REF_PREFIX};
use gork_openapi::{
    OpenApiConfig, OpenApiGenerator, OpenApiSpec, RouteInfo, RouteOptions, SecurityRequirement,
    StaticDocs,
};
use serde_json::json;

struct Pet;
impl Reflect for Pet {
    fn type_descriptor() -> TypeDescriptor {
        TypeDescriptor::structure::<Self>(
            "Pet",
            "petstore",
            StructType::new()
                .field::<String>("ID", r#"json:"id""#)
                .field::<String>("Name", r#"json:"name" validate:"required,min=1,max=64""#)
                .field::<Option<String>>("Nickname", r#"json:"nickname""#)
                .field::<Vec<String>>("Tags", r#"json:"tags""#),
        )
    }
}

struct CreatePetBody;
impl Reflect for CreatePetBody {
    fn type_descriptor() -> TypeDescriptor {
        TypeDescriptor::structure::<Self>(
            "CreatePetBody",
            "petstore",
            StructType::new()
                .field::<String>("Name", r#"json:"name" validate:"required""#)
                .field::<String>("Kind", r#"json:"kind" validate:"oneof=cat dog""#),
        )
    }
}

struct OwnerPath;
impl Reflect for OwnerPath {
    fn type_descriptor() -> TypeDescriptor {
        TypeDescriptor::structure::<Self>(
            "OwnerPath",
            "petstore",
            StructType::new().field::<String>("OwnerID", r#"gork:"owner_id""#),
        )
    }
}

struct ListQuery;
impl Reflect for ListQuery {
    fn type_descriptor() -> TypeDescriptor {
        TypeDescriptor::structure::<Self>(
            "ListQuery",
            "petstore",
            StructType::new()
                .field::<i32>("Limit", r#"gork:"limit" validate:"required,gte=1,lte=100""#)
                .field::<Vec<String>>("Tag", r#"gork:"tag""#),
        )
    }
}

struct RequestHeaders;
impl Reflect for RequestHeaders {
    fn type_descriptor() -> TypeDescriptor {
        TypeDescriptor::structure::<Self>(
            "RequestHeaders",
            "petstore",
            StructType::new().field::<String>("RequestID", r#"gork:"X-Request-ID""#),
        )
    }
}

struct CreatePetRequest;
impl Reflect for CreatePetRequest {
    fn type_descriptor() -> TypeDescriptor {
        TypeDescriptor::structure::<Self>(
            "CreatePetRequest",
            "petstore",
            StructType::new()
                .field::<OwnerPath>("Path", "")
                .field::<ListQuery>("Query", "")
                .field::<RequestHeaders>("Headers", "")
                .field::<CreatePetBody>("Body", ""),
        )
    }
}

struct GetPetRequest;
impl Reflect for GetPetRequest {
    fn type_descriptor() -> TypeDescriptor {
        TypeDescriptor::structure::<Self>(
            "GetPetRequest",
            "petstore",
            StructType::new()
                .field::<String>("ID", r#"openapi:"pet_id,in=path" validate:"required""#)
                .field::<Option<bool>>("Verbose", r#"openapi:"verbose,in=query""#)
                .field::<String>("Note", r#"json:"note""#),
        )
    }
}

struct Cat;
impl Reflect for Cat {
    fn type_descriptor() -> TypeDescriptor {
        TypeDescriptor::structure::<Self>(
            "Cat",
            "petstore",
            StructType::new()
                .field::<String>("Type", r#"json:"type" openapi:"discriminator=cat""#)
                .field::<bool>("Indoor", r#"json:"indoor""#),
        )
    }
}

struct Dog;
impl Reflect for Dog {
    fn type_descriptor() -> TypeDescriptor {
        TypeDescriptor::structure::<Self>(
            "Dog",
            "petstore",
            StructType::new()
                .field::<String>("Type", r#"json:"type" openapi:"discriminator=dog""#)
                .field::<u8>("Tricks", r#"json:"tricks""#),
        )
    }
}

fn routes() -> Vec<RouteInfo> {
    vec![
        RouteInfo::new("POST", "/owners/{owner_id}/pets", "CreatePet")
            .with_request(CreatePetRequest::type_descriptor())
            .with_response(Pet::type_descriptor())
            .with_options(RouteOptions {
                tags: vec!["pets".to_string()],
                security: vec![SecurityRequirement::bearer()],
                summary: Some("Create a pet".to_string()),
                deprecated: false,
            }),
        RouteInfo::new("GET", "/pets/{pet_id}/{revision}", "GetPet")
            .with_request(GetPetRequest::type_descriptor())
            .with_response(<Option<Pet>>::type_descriptor()),
        RouteInfo::new("PUT", "/animals", "ReplaceAnimal")
            .with_request(<Union2<Cat, Dog>>::type_descriptor()),
        RouteInfo::new("GET", "/openapi.json", "OpenApiDocument")
            .with_response(OpenApiSpec::type_descriptor()),
    ]
}

fn generate() -> OpenApiSpec {
    let mut generator = OpenApiGenerator::new(OpenApiConfig::new("Petstore", "1.0.0"));
    generator.generate(&routes()).unwrap().clone()
}

#[test]
fn test_documentation_route_is_excluded() {
    let spec = generate();
    assert!(!spec.paths.contains_key("/openapi.json"));
    assert_eq!(spec.paths.len(), 3);
}

#[test]
fn test_section_request_parameters_and_body() {
    let spec = generate();
    let operation = spec.paths["/owners/{owner_id}/pets"].post.as_ref().unwrap();

    assert_eq!(operation.operation_id.as_deref(), Some("CreatePet"));
    assert_eq!(operation.summary.as_deref(), Some("Create a pet"));
    assert_eq!(operation.tags, vec!["pets"]);

    let params: Vec<_> = operation
        .parameters
        .iter()
        .map(|p| (p.name.as_str(), p.location.as_str(), p.required))
        .collect();
    assert_eq!(
        params,
        vec![
            ("owner_id", "path", Some(true)),
            ("limit", "query", Some(true)),
            ("tag", "query", Some(false)),
            ("X-Request-ID", "header", Some(false)),
        ]
    );

    let limit = operation.parameters[1].schema.as_ref().unwrap();
    assert_eq!(limit.minimum, Some(1.0));
    assert_eq!(limit.maximum, Some(100.0));

    let body = operation.request_body.as_ref().unwrap();
    assert_eq!(body.required, Some(true));
    assert_eq!(
        body.content["application/json"].schema.as_ref().unwrap().reference.as_deref(),
        Some("#/components/schemas/CreatePetBody")
    );

    let components = spec.components.as_ref().unwrap();
    let created = &components.schemas["CreatePetBody"];
    assert_eq!(created.required, vec!["name"]);
    assert_eq!(created.properties["kind"].enum_values, vec![json!("cat"), json!("dog")]);
    assert!(!components.schemas.contains_key("CreatePetRequest"));
}

#[test]
fn test_tagged_parameters_and_template_variables() {
    let spec = generate();
    let operation = spec.paths["/pets/{pet_id}/{revision}"].get.as_ref().unwrap();

    let params: Vec<_> = operation
        .parameters
        .iter()
        .map(|p| (p.name.as_str(), p.location.as_str()))
        .collect();
    assert_eq!(
        params,
        vec![("pet_id", "path"), ("verbose", "query"), ("revision", "path")]
    );
    assert_eq!(
        operation.parameters[2].schema.as_ref().unwrap().single_type(),
        Some("string")
    );

    // GET carries no body even though the request type has body fields
    assert!(operation.request_body.is_none());

    // The response type is unwrapped, not made nullable
    let ok = &operation.responses["200"];
    assert_eq!(
        ok.content["application/json"].schema.as_ref().unwrap().reference.as_deref(),
        Some("#/components/schemas/Pet")
    );
}

#[test]
fn test_error_responses_and_components() {
    let spec = generate();
    let components = spec.components.as_ref().unwrap();

    for (_, item) in &spec.paths {
        for (_, operation) in item.operations() {
            assert_eq!(operation.responses["400"], Response::reference("BadRequest"));
            assert_eq!(operation.responses["422"], Response::reference("UnprocessableEntity"));
            assert_eq!(operation.responses["500"], Response::reference("InternalServerError"));
        }
    }

    let error = serde_json::to_value(&components.schemas["ErrorResponse"]).unwrap();
    assert_eq!(
        error,
        json!({
            "type": "object",
            "properties": {"error": {"type": "string"}, "details": {"type": "object"}},
            "required": ["error"]
        })
    );
    assert_eq!(
        components.schemas["ValidationErrorResponse"],
        components.schemas["ErrorResponse"]
    );

    let bad_request = &components.responses["BadRequest"];
    assert_eq!(
        bad_request.content["application/json"].schema.as_ref().unwrap().reference,
        Some(format!("{}ValidationErrorResponse", SCHEMA_REF_PREFIX))
    );
    assert_eq!(components.responses.len(), 3);

    assert_eq!(
        components.security_schemes["BearerAuth"],
        SecurityScheme::Http {
            scheme: "bearer".to_string(),
            bearer_format: Some("JWT".to_string())
        }
    );
}

#[test]
fn test_union_body_and_no_content_response() {
    let spec = generate();
    let operation = spec.paths["/animals"].put.as_ref().unwrap();
    assert!(operation.responses.contains_key("204"));
    assert!(!operation.responses.contains_key("200"));

    let schemas = &spec.components.as_ref().unwrap().schemas;
    let union = &schemas["Union2_Cat_Dog"];
    assert_eq!(union.one_of.len(), 2);
    let discriminator = union.discriminator.as_ref().unwrap();
    assert_eq!(discriminator.property_name, "type");
    assert_eq!(discriminator.mapping["cat"], "#/components/schemas/Cat");
    assert_eq!(discriminator.mapping["dog"], "#/components/schemas/Dog");
}

#[test]
fn test_nullable_fields() {
    let spec = generate();
    let pet = serde_json::to_value(&spec.components.as_ref().unwrap().schemas["Pet"]).unwrap();
    assert_eq!(pet["properties"]["nickname"], json!({"type": ["string", "null"]}));
    assert_eq!(pet["properties"]["name"]["minLength"], json!(1));
    assert_eq!(pet["properties"]["tags"]["type"], json!("array"));
}

#[test]
fn test_custom_filter_and_docs() {
    let docs = StaticDocs::new()
        .type_doc("Pet", "A pet")
        .field_doc("Pet", "Name", "The pet's name")
        .function_doc("GetPet", "Fetch one pet");
    let mut generator = OpenApiGenerator::new(OpenApiConfig::new("Petstore", "1.0.0"))
        .with_route_filter(|route| route.method != "PUT")
        .with_docs(docs);
    let spec = generator.generate(&routes()).unwrap();

    assert!(!spec.paths.contains_key("/animals"));
    assert!(spec.paths.contains_key("/openapi.json"));

    let pet = &spec.components.as_ref().unwrap().schemas["Pet"];
    assert_eq!(pet.description.as_deref(), Some("A pet"));
    assert_eq!(pet.properties["name"].description.as_deref(), Some("The pet's name"));

    let get = spec.paths["/pets/{pet_id}/{revision}"].get.as_ref().unwrap();
    assert_eq!(get.description.as_deref(), Some("Fetch one pet"));
}

#[test]
fn test_each_generation_uses_a_fresh_registry() {
    let mut generator = OpenApiGenerator::new(OpenApiConfig::new("Petstore", "1.0.0"));
    let first = generator.generate(&routes()).unwrap().clone();
    let second = generator.generate(&routes()).unwrap().clone();
    assert_eq!(first, second);

    let yaml = generator.export_yaml().unwrap();
    let parsed: OpenApiSpec = serde_yaml::from_str(&yaml).unwrap();
    assert_eq!(parsed, second);
}

#[test]
fn test_optional_fields_without_nullability() {
    let config = OpenApiConfig {
        nullable_optional: false,
        ..OpenApiConfig::new("Petstore", "1.0.0")
    };
    let mut generator = OpenApiGenerator::new(config);
    let spec = generator.generate(&routes()).unwrap();
    let pet = &spec.components.as_ref().unwrap().schemas["Pet"];
    assert_eq!(pet.properties["nickname"].single_type(), Some("string"));
}
