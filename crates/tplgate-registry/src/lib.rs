//! # tplgate-registry — Element Template Registration Gate
//!
//! Accepts batches of element template descriptors and partitions them
//! into registered templates and error records.
//!
//! ## Checks
//!
//! Each descriptor runs through three checks, stopping at the first
//! failure (see [`pipeline`]):
//!
//! 1. **Schema-version compatibility**: the version embedded in
//!    `$schema` must not exceed the validator's supported version.
//! 2. **Identity/version uniqueness**: `(id, version)` must be free.
//!    Unversioned templates share one slot per id.
//! 3. **Schema compliance**: the descriptor must satisfy the element
//!    template JSON Schema. This check may record several errors.
//!
//! ## Error Semantics
//!
//! Batch submission never fails. Every rejection becomes an
//! [`ErrorRecord`]; callers read [`TemplateRegistry::errors`] for
//! diagnostics and [`TemplateRegistry::valid_templates`] for the usable
//! result. A descriptor is in exactly one of the two.
//!
//! ## Crate Policy
//!
//! - Depends only on `tplgate-core` internally; the schema backend is
//!   injected through [`tplgate_core::SchemaValidator`].
//! - Single-threaded: submission takes `&mut self`.

pub mod pipeline;
pub mod record;
pub mod registry;

pub use pipeline::{Check, CheckContext, Rejection, Verdict, CHECKS};
pub use record::{ErrorLog, ErrorRecord, TemplateRef};
pub use registry::{
    AcceptedIndex, AcceptedTemplate, Outcome, TemplateRegistry, ValidationReport,
    TEMPLATES_MUST_BE_LIST,
};
