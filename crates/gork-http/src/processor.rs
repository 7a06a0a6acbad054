//! Request processing pipeline: bind every section, then validate every section

use crate::binder::{bind_body, bind_section};
use crate::error::{RequestError, RequestResult, SectionErrors, ServerError};
use crate::parts::RequestParts;
use crate::validate::validate_section;
use gork_core::{Section, TypeDescriptor, ValidationContext, Value};
use gork_validation::{FieldValidator, TagValidator};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// Binds and validates section-style request types
#[derive(Clone)]
pub struct RequestProcessor {
    validator: Arc<dyn FieldValidator>,
}

impl fmt::Debug for RequestProcessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestProcessor").finish_non_exhaustive()
    }
}

impl Default for RequestProcessor {
    fn default() -> Self {
        Self::new(TagValidator::new())
    }
}

impl RequestProcessor {
    /// Create a processor validating through `validator`
    pub fn new<V: FieldValidator + 'static>(validator: V) -> Self {
        Self {
            validator: Arc::new(validator),
        }
    }

    /// Create a processor sharing an existing validator
    pub fn with_shared_validator(validator: Arc<dyn FieldValidator>) -> Self {
        Self { validator }
    }

    pub fn validator(&self) -> &dyn FieldValidator {
        self.validator.as_ref()
    }

    /// Build a value of `request` from `parts` and validate it.
    ///
    /// Collected errors from every section are returned together as
    /// [`RequestError::Validation`]. A fatal error stops at the section that raised it.
    pub fn process(
        &self,
        ctx: &ValidationContext,
        request: &TypeDescriptor,
        parts: &RequestParts,
    ) -> RequestResult<Value> {
        let request = request.deref();
        let Some(layout) = request.struct_layout() else {
            return Err(ServerError::invalid_request_type(format!(
                "{} is not a struct",
                request
            ))
            .into());
        };
        let has_sections = layout
            .fields()
            .iter()
            .any(|field| field.is_public() && Section::from_field_name(field.name()).is_some());
        if !has_sections {
            return Err(ServerError::invalid_request_type(format!(
                "{} has no path, query, headers, cookies or body section",
                request
            ))
            .into());
        }

        let mut value = Value::zero(&request);
        let mut errors = SectionErrors::new();
        let Some(fields) = value.as_struct_mut() else {
            return Err(ServerError::invalid_request_type(format!(
                "{} has no struct value",
                request
            ))
            .into());
        };

        for (field, slot) in fields.fields_mut() {
            if !field.is_public() {
                continue;
            }
            let Some(section) = Section::from_field_name(field.name()) else {
                trace!(field = field.name(), "not a request section");
                continue;
            };
            match section {
                Section::Body => {
                    if let Err(message) = bind_body(&field.ty(), slot, &parts.body) {
                        errors.add(section.key(), message);
                    }
                }
                _ => bind_section(section, &field.ty(), slot, parts),
            }
        }

        for (field, slot) in fields.fields() {
            if !field.is_public() {
                continue;
            }
            let Some(section) = Section::from_field_name(field.name()) else {
                continue;
            };
            // An undecodable body is reported once, not re-validated as a zero value
            if section == Section::Body && errors.contains(section.key()) {
                continue;
            }
            if let Err(err) = validate_section(ctx, field, slot, self.validator(), &mut errors) {
                warn!(section = %section, error = %err, "request validation failed");
                return Err(err.into());
            }
        }

        if errors.is_empty() {
            debug!(request = %request, "request bound and validated");
            Ok(value)
        } else {
            debug!(request = %request, sections = errors.len(), "request rejected");
            Err(RequestError::Validation(errors))
        }
    }
}
