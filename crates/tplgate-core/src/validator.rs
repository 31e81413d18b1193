//! # Schema Validator Seam
//!
//! The registry never interprets JSON Schema itself. It hands each
//! descriptor to a [`SchemaValidator`] and records whatever structured
//! errors come back. `tplgate-schema` provides the `jsonschema`-backed
//! implementation; tests substitute their own.

use semver::Version;
use serde::{Deserialize, Serialize};

use crate::descriptor::TemplateDescriptor;

/// A single structural violation reported by a schema validator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaError {
    /// Human-readable description, surfaced to users verbatim.
    pub message: String,
    /// JSON Pointer to the violating location in the descriptor.
    pub instance_path: String,
    /// JSON Pointer to the schema keyword that failed.
    pub schema_path: String,
    /// The failing keyword (last segment of `schema_path`).
    pub keyword: String,
}

impl SchemaError {
    /// Build an error, deriving `keyword` from the schema path.
    pub fn new(
        message: impl Into<String>,
        instance_path: impl Into<String>,
        schema_path: impl Into<String>,
    ) -> Self {
        let schema_path = schema_path.into();
        let keyword = schema_path.rsplit('/').next().unwrap_or_default().to_string();
        Self {
            message: message.into(),
            instance_path: instance_path.into(),
            schema_path,
            keyword,
        }
    }
}

/// Outcome of validating one descriptor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaValidation {
    /// Whether the descriptor conforms to the schema.
    pub valid: bool,
    /// Raw violations, unfiltered. Empty when `valid`.
    pub errors: Vec<SchemaError>,
}

impl SchemaValidation {
    /// A passing result.
    pub fn valid() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
        }
    }

    /// A failing result carrying the given violations.
    pub fn invalid(errors: Vec<SchemaError>) -> Self {
        Self {
            valid: false,
            errors,
        }
    }
}

/// Validates descriptors against a versioned element template schema.
pub trait SchemaValidator {
    /// Validate one descriptor.
    fn validate(&self, descriptor: &TemplateDescriptor) -> SchemaValidation;

    /// The highest schema version this validator understands.
    fn supported_version(&self) -> Version;

    /// Reduce raw violations to those worth showing a user.
    ///
    /// The registry calls this for every failing descriptor. The default
    /// keeps everything.
    fn filter_errors(&self, errors: Vec<SchemaError>) -> Vec<SchemaError> {
        errors
    }
}

impl<T: SchemaValidator + ?Sized> SchemaValidator for &T {
    fn validate(&self, descriptor: &TemplateDescriptor) -> SchemaValidation {
        (**self).validate(descriptor)
    }

    fn supported_version(&self) -> Version {
        (**self).supported_version()
    }

    fn filter_errors(&self, errors: Vec<SchemaError>) -> Vec<SchemaError> {
        (**self).filter_errors(errors)
    }
}
