//! # Schema Validation
//!
//! Runtime validation of element template descriptors against a JSON
//! Schema (Draft 2020-12), backed by the `jsonschema` crate.
//!
//! ## Supported Version
//!
//! Every element template schema carries its own version inside its
//! `$id`, e.g.
//!   `https://schemas.tplgate.dev/element-templates/0.9.0/element-template.schema.json`
//!
//! [`JsonSchemaValidator::from_schema`] reads the supported version from
//! there using the same extraction rule applied to a descriptor's
//! `$schema`. [`JsonSchemaValidator::new`] takes it explicitly.
//!
//! ## Schema Resolution
//!
//! Internal `$ref`s (`#/$defs/<name>`) are resolved by the jsonschema
//! crate natively. Remote `$ref`s are refused: validation never touches
//! the network.

use std::fmt;
use std::path::Path;

use jsonschema::{Retrieve, Uri, Validator};
use semver::Version;
use serde_json::Value;
use thiserror::Error;
use tplgate_core::{
    extract_schema_version, SchemaError, SchemaValidation, SchemaValidator, TemplateDescriptor,
};

use crate::filter::filtered_schema_errors;

/// The element template schema shipped with this crate.
pub const BUNDLED_SCHEMA: &str = include_str!("../schemas/element-template.schema.json");

/// Refuses every remote `$ref` so that validation stays offline.
struct OfflineRetriever;

impl Retrieve for OfflineRetriever {
    fn retrieve(
        &self,
        uri: &Uri<&str>,
    ) -> Result<Value, Box<dyn std::error::Error + Send + Sync>> {
        Err(format!("remote schema reference '{}' is not resolved", uri.as_str()).into())
    }
}

/// Error while loading or compiling an element template schema.
#[derive(Error, Debug)]
pub enum SchemaLoadError {
    /// The schema file could not be read.
    #[error("cannot read schema '{path}': {source}")]
    Io {
        /// Path of the schema file.
        path: String,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The schema text is not valid JSON.
    #[error("schema '{schema_name}' is not valid JSON: {source}")]
    InvalidJson {
        /// Schema path or identifier.
        schema_name: String,
        /// Underlying parse error.
        #[source]
        source: serde_json::Error,
    },

    /// The schema `$id` does not embed a semantic version.
    #[error("schema '{schema_name}' does not declare a version in its $id")]
    MissingVersion {
        /// Schema path or identifier.
        schema_name: String,
    },

    /// The compiled validator could not be built (e.g., invalid schema).
    #[error("validator build error for schema '{schema_name}': {reason}")]
    ValidatorBuildError {
        /// Schema path or identifier.
        schema_name: String,
        /// Reason the validator could not be built.
        reason: String,
    },
}

/// An element template validator backed by the `jsonschema` crate.
///
/// The schema is compiled once at construction; validating a descriptor
/// afterwards does no further IO.
///
/// ## Thread Safety
///
/// `JsonSchemaValidator` is `Send + Sync`: a single instance may back
/// registries on several threads.
pub struct JsonSchemaValidator {
    /// Schema `$id`, or `"<inline>"` when absent.
    schema_name: String,
    /// Highest schema version descriptors may declare.
    supported_version: Version,
    /// Compiled schema.
    compiled: Validator,
}

impl JsonSchemaValidator {
    /// Compile `schema` and declare `supported_version` explicitly.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaLoadError::ValidatorBuildError`] if the schema does
    /// not compile.
    pub fn new(schema: &Value, supported_version: Version) -> Result<Self, SchemaLoadError> {
        let schema_name = schema
            .get("$id")
            .and_then(Value::as_str)
            .unwrap_or("<inline>")
            .to_string();

        let mut opts = jsonschema::options();
        opts.with_draft(jsonschema::Draft::Draft202012);
        opts.with_retriever(OfflineRetriever);

        let compiled = opts
            .build(schema)
            .map_err(|e| SchemaLoadError::ValidatorBuildError {
                schema_name: schema_name.clone(),
                reason: e.to_string(),
            })?;

        tracing::debug!(
            schema = %schema_name,
            supported_version = %supported_version,
            "compiled element template schema"
        );

        Ok(Self {
            schema_name,
            supported_version,
            compiled,
        })
    }

    /// Compile `schema`, reading the supported version from its `$id`.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaLoadError::MissingVersion`] if `$id` is absent or
    /// carries no `MAJOR.MINOR.PATCH` token.
    pub fn from_schema(schema: &Value) -> Result<Self, SchemaLoadError> {
        let id = schema.get("$id").and_then(Value::as_str);
        let version = id
            .and_then(extract_schema_version)
            .ok_or_else(|| SchemaLoadError::MissingVersion {
                schema_name: id.unwrap_or("<inline>").to_string(),
            })?;
        Self::new(schema, version)
    }

    /// Load and compile the schema at `path`.
    ///
    /// The supported version comes from `supported_version` when given,
    /// otherwise from the schema `$id`.
    pub fn from_file(
        path: impl AsRef<Path>,
        supported_version: Option<Version>,
    ) -> Result<Self, SchemaLoadError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| SchemaLoadError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let schema: Value =
            serde_json::from_str(&content).map_err(|source| SchemaLoadError::InvalidJson {
                schema_name: path.display().to_string(),
                source,
            })?;

        match supported_version {
            Some(version) => Self::new(&schema, version),
            None => Self::from_schema(&schema),
        }
    }

    /// The bundled element template schema.
    pub fn bundled() -> Result<Self, SchemaLoadError> {
        let schema: Value =
            serde_json::from_str(BUNDLED_SCHEMA).map_err(|source| SchemaLoadError::InvalidJson {
                schema_name: "element-template.schema.json".to_string(),
                source,
            })?;
        Self::from_schema(&schema)
    }

    /// The schema `$id`, or `"<inline>"`.
    pub fn schema_name(&self) -> &str {
        &self.schema_name
    }

    /// Validate a raw JSON value, returning every violation unfiltered.
    pub fn validate_value(&self, instance: &Value) -> SchemaValidation {
        let errors: Vec<SchemaError> = self
            .compiled
            .iter_errors(instance)
            .map(|e| {
                SchemaError::new(
                    e.to_string(),
                    e.instance_path.to_string(),
                    e.schema_path.to_string(),
                )
            })
            .collect();

        if errors.is_empty() {
            SchemaValidation::valid()
        } else {
            SchemaValidation::invalid(errors)
        }
    }
}

impl SchemaValidator for JsonSchemaValidator {
    fn validate(&self, descriptor: &TemplateDescriptor) -> SchemaValidation {
        self.validate_value(descriptor.as_value())
    }

    fn supported_version(&self) -> Version {
        self.supported_version.clone()
    }

    fn filter_errors(&self, errors: Vec<SchemaError>) -> Vec<SchemaError> {
        filtered_schema_errors(errors)
    }
}

impl fmt::Debug for JsonSchemaValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonSchemaValidator")
            .field("schema_name", &self.schema_name)
            .field("supported_version", &self.supported_version)
            .finish_non_exhaustive()
    }
}
