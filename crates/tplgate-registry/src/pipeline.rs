//! # Validation Pipeline
//!
//! The per-descriptor checks, in the order they run:
//!
//! 1. [`check_schema_version`]: the `$schema` version must not exceed the
//!    supported schema version.
//! 2. [`check_identity`]: `(id, version slot)` must not already be
//!    registered.
//! 3. [`check_schema_compliance`]: the descriptor must satisfy the schema.
//!
//! [`run`] folds over [`CHECKS`] and stops at the first failure, so a
//! descriptor with an unsupported schema version is never schema
//! validated. Only the last check may produce more than one message.

use std::cmp::Ordering;

use semver::Version;
use tplgate_core::{
    extract_schema_version, RejectionKind, SchemaValidator, TemplateDescriptor,
    VersionComparator, VersionSlot,
};

use crate::registry::AcceptedIndex;

/// Message recorded when a validator reports failure without any
/// user-facing error surviving the filter.
pub const INVALID_TEMPLATE: &str = "invalid template";

/// Everything a check may consult. Checks never mutate registry state.
pub struct CheckContext<'a> {
    /// Highest schema version descriptors may declare.
    pub supported_version: &'a Version,
    /// Orders schema versions.
    pub comparator: &'a dyn VersionComparator,
    /// Templates accepted so far.
    pub index: &'a AcceptedIndex,
    /// Structural validator.
    pub validator: &'a dyn SchemaValidator,
}

/// Why a descriptor failed: one kind, at least one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    /// The failing check.
    pub kind: RejectionKind,
    /// User-facing messages, one error record each.
    pub messages: Vec<String>,
}

impl Rejection {
    fn single(kind: RejectionKind, message: String) -> Self {
        Self {
            kind,
            messages: vec![message],
        }
    }
}

/// Result of a single check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// Continue with the next check.
    Pass,
    /// Stop; the descriptor is rejected.
    Fail(Rejection),
}

/// A single check.
pub type Check = fn(&CheckContext<'_>, &TemplateDescriptor) -> Verdict;

/// The checks, in execution order.
pub const CHECKS: [(&str, Check); 3] = [
    ("schema_version", check_schema_version),
    ("identity", check_identity),
    ("schema_compliance", check_schema_compliance),
];

/// Run every check against `descriptor`, stopping at the first failure.
pub fn run(ctx: &CheckContext<'_>, descriptor: &TemplateDescriptor) -> Result<(), Rejection> {
    CHECKS.iter().try_fold((), |(), (name, check)| match check(ctx, descriptor) {
        Verdict::Pass => Ok(()),
        Verdict::Fail(rejection) => {
            tracing::trace!(template_id = %descriptor.id(), check = *name, "check failed");
            Err(rejection)
        }
    })
}

/// Reject descriptors written against a newer schema than supported.
///
/// A descriptor without `$schema`, or whose `$schema` carries no
/// parseable version, passes.
pub fn check_schema_version(ctx: &CheckContext<'_>, descriptor: &TemplateDescriptor) -> Verdict {
    let Some(declared) = descriptor.schema_uri().and_then(extract_schema_version) else {
        return Verdict::Pass;
    };

    match ctx.comparator.compare(&declared, ctx.supported_version) {
        Ordering::Greater => Verdict::Fail(Rejection::single(
            RejectionKind::SchemaVersionUnsupported,
            unsupported_schema_version_message(&declared, ctx.supported_version),
        )),
        Ordering::Equal | Ordering::Less => Verdict::Pass,
    }
}

/// Reject descriptors whose `(id, version slot)` is already registered.
pub fn check_identity(ctx: &CheckContext<'_>, descriptor: &TemplateDescriptor) -> Verdict {
    let slot = descriptor.slot();
    if ctx.index.contains(descriptor.id(), &slot) {
        Verdict::Fail(Rejection::single(
            RejectionKind::DuplicateTemplateIdentity,
            duplicate_identity_message(descriptor.id(), &slot),
        ))
    } else {
        Verdict::Pass
    }
}

/// Reject descriptors that violate the schema, one message per filtered error.
pub fn check_schema_compliance(
    ctx: &CheckContext<'_>,
    descriptor: &TemplateDescriptor,
) -> Verdict {
    let result = ctx.validator.validate(descriptor);
    if result.valid {
        return Verdict::Pass;
    }

    let mut messages: Vec<String> = ctx
        .validator
        .filter_errors(result.errors)
        .into_iter()
        .map(|e| e.message)
        .collect();
    if messages.is_empty() {
        messages.push(INVALID_TEMPLATE.to_string());
    }

    Verdict::Fail(Rejection {
        kind: RejectionKind::SchemaComplianceFailure,
        messages,
    })
}

/// Message for a descriptor declaring a too-new schema version.
pub fn unsupported_schema_version_message(declared: &Version, supported: &Version) -> String {
    format!(
        "unsupported element template schema version <{declared}>. \
         Your installation only supports up to version <{supported}>. \
         Please update your installation"
    )
}

/// Message for a descriptor whose identity is already taken.
pub fn duplicate_identity_message(id: &str, slot: &VersionSlot) -> String {
    match slot {
        VersionSlot::Unversioned => format!("template id <{id}> already used"),
        VersionSlot::Versioned(version) => {
            format!("template id <{id}> and version <{version}> already used")
        }
    }
}
