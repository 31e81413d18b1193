//! # Error Types
//!
//! Two families live here. [`DescriptorError`] is a real `Error` raised
//! when a JSON value cannot be read as a descriptor at all.
//! [`RejectionKind`] classifies the validation outcomes the registry
//! records as data; it is never returned through `Result`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A JSON value could not be read as a template descriptor.
#[derive(Error, Debug)]
pub enum DescriptorError {
    /// The value is not a JSON object.
    #[error("template descriptor must be an object, got {found}")]
    NotAnObject {
        /// JSON type name of the offending value.
        found: &'static str,
    },

    /// A header field is missing or has the wrong type.
    #[error("invalid template descriptor: {0}")]
    InvalidHeader(#[from] serde_json::Error),
}

/// Why a descriptor was not registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionKind {
    /// The descriptor's `$schema` names a newer schema than the installation supports.
    SchemaVersionUnsupported,
    /// Another accepted descriptor already holds the same `(id, version)` pair.
    DuplicateTemplateIdentity,
    /// The descriptor violates the element template JSON Schema.
    SchemaComplianceFailure,
    /// The submitted value could not be read as a descriptor.
    MalformedDescriptor,
    /// The submitted batch itself was not a list of descriptors.
    InvalidBatch,
}

impl RejectionKind {
    /// Stable snake_case name, matching the serialized form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SchemaVersionUnsupported => "schema_version_unsupported",
            Self::DuplicateTemplateIdentity => "duplicate_template_identity",
            Self::SchemaComplianceFailure => "schema_compliance_failure",
            Self::MalformedDescriptor => "malformed_descriptor",
            Self::InvalidBatch => "invalid_batch",
        }
    }
}

impl std::fmt::Display for RejectionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
