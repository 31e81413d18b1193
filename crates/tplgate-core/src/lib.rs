//! # tplgate-core — Foundational Types for Template Registration
//!
//! This crate defines the types every other `tplgate-*` crate shares:
//! the element template descriptor, the version slot used for identity
//! checks, schema-version extraction, and the two collaborator seams
//! ([`SchemaValidator`] and [`VersionComparator`]) the registry is
//! generic over.
//!
//! ## Key Design Principles
//!
//! 1. **Typed descriptor header.** `id`, `name`, `version` and `$schema`
//!    are read once into typed optional fields. The raw JSON is retained
//!    verbatim for schema validation.
//!
//! 2. **No sentinel strings.** A missing `version` is
//!    [`VersionSlot::Unversioned`], never a magic `"_"` value, so a
//!    template that literally declares version `"_"` cannot collide with
//!    an unversioned one.
//!
//! 3. **Validation is data.** Rejections are described by
//!    [`RejectionKind`] and carried as records, not raised as errors.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `tplgate-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod descriptor;
pub mod error;
pub mod validator;
pub mod version;

// Re-export primary types for ergonomic imports.
pub use descriptor::{TemplateDescriptor, TemplateVersion};
pub use error::{DescriptorError, RejectionKind};
pub use validator::{SchemaError, SchemaValidation, SchemaValidator};
pub use version::{extract_schema_version, SemverPrecedence, VersionComparator, VersionSlot};
