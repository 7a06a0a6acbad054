//! # gork-http
//!
//! Binding and validation of section-style requests. A request type splits into
//! `Path`, `Query`, `Headers`, `Cookies` and `Body` sections; [`RequestProcessor`]
//! fills each from [`RequestParts`] and validates it, returning either the bound
//! value or a [`RequestError`] that maps to a 400 or 500 response.
//!
//! ```no_run
//! use gork_core::{Reflect, StructType, TypeDescriptor, ValidationContext};
//! use gork_http::{RequestParts, RequestProcessor};
//!
//! struct ListQuery;
//! impl Reflect for ListQuery {
//!     fn type_descriptor() -> TypeDescriptor {
//!         TypeDescriptor::structure::<Self>(
//!             "ListQuery",
//!             "app",
//!             StructType::new().field::<i32>("Limit", r#"gork:"limit" validate:"required""#),
//!         )
//!     }
//! }
//!
//! struct ListRequest;
//! impl Reflect for ListRequest {
//!     fn type_descriptor() -> TypeDescriptor {
//!         TypeDescriptor::structure::<Self>(
//!             "ListRequest",
//!             "app",
//!             StructType::new().field::<ListQuery>("Query", ""),
//!         )
//!     }
//! }
//!
//! let parts = RequestParts::new(http::Method::GET, "/pets").with_query("limit", "10");
//! let processor = RequestProcessor::default();
//! match processor.process(&ValidationContext::default(), &ListRequest::type_descriptor(), &parts) {
//!     Ok(value) => println!("{:?}", value.to_json()),
//!     Err(err) => println!("{} {}", err.status_code(), err.to_response_body()),
//! }
//! ```

pub mod binder;
pub mod error;
pub mod parts;
pub mod processor;
pub mod validate;

pub use binder::{bind_body, bind_field, bind_section};
pub use error::{RequestError, RequestResult, SectionErrors, ServerError};
pub use parts::RequestParts;
pub use processor::RequestProcessor;
pub use validate::validate_section;
