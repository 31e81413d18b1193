//! # tplgate-schema — Element Template Schema Integration
//!
//! Implements the [`tplgate_core::SchemaValidator`] seam with the
//! `jsonschema` crate.
//!
//! ## Runtime Validation (`validate`)
//!
//! [`JsonSchemaValidator`] compiles an element template schema once and
//! validates descriptors against it. The schema's `$id` carries the
//! schema version it implements, which becomes the supported version
//! reported to the registry. A Draft 2020-12 element template schema is
//! bundled as [`BUNDLED_SCHEMA`].
//!
//! ## Error Filtering (`filter`)
//!
//! [`filtered_schema_errors`] is the policy deciding which raw violations
//! reach users. The validator applies it through
//! `SchemaValidator::filter_errors`.
//!
//! ## Crate Policy
//!
//! - Depends only on `tplgate-core` internally.
//! - Validation never fetches remote schemas.

pub mod filter;
pub mod validate;

pub use filter::filtered_schema_errors;
pub use validate::{JsonSchemaValidator, SchemaLoadError, BUNDLED_SCHEMA};
