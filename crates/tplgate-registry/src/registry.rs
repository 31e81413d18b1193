//! # Template Registry
//!
//! [`TemplateRegistry`] accumulates descriptors across submission batches.
//! Each descriptor runs through the [`pipeline`](crate::pipeline) in input
//! order and ends up in exactly one place: the accepted index, or the
//! error log (one or more records). Nothing is ever raised to the caller.
//!
//! ## Invariants
//!
//! - No two accepted descriptors share `(id, version slot)`.
//! - Accepted descriptors and rejected descriptors are disjoint, and
//!   together account for every submitted descriptor.
//! - Acceptance is immediate: a duplicate later in the same batch is
//!   caught against an earlier descriptor of that batch.

use std::collections::{BTreeMap, HashMap};

use semver::Version;
use serde::Serialize;
use serde_json::Value;
use tplgate_core::{
    RejectionKind, SchemaValidator, SemverPrecedence, TemplateDescriptor, TemplateVersion,
    VersionComparator, VersionSlot,
};

use crate::pipeline::{self, CheckContext, Rejection};
use crate::record::{ErrorLog, ErrorRecord, TemplateRef};

/// Message recorded when a batch is not a list.
pub const TEMPLATES_MUST_BE_LIST: &str = "templates must be []";

/// Accepted templates, indexed by id and version slot.
#[derive(Debug, Clone, Default)]
pub struct AcceptedIndex {
    /// id -> slot -> position in `templates`.
    slots: HashMap<String, HashMap<VersionSlot, usize>>,
    /// Accepted templates in registration order.
    templates: Vec<TemplateDescriptor>,
}

impl AcceptedIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `(id, slot)` is taken.
    pub fn contains(&self, id: &str, slot: &VersionSlot) -> bool {
        self.slots.get(id).is_some_and(|by_slot| by_slot.contains_key(slot))
    }

    /// Look up the template registered under `(id, slot)`.
    pub fn get(&self, id: &str, slot: &VersionSlot) -> Option<&TemplateDescriptor> {
        let position = *self.slots.get(id)?.get(slot)?;
        self.templates.get(position)
    }

    /// Insert a template. Returns `false`, leaving the index unchanged, if
    /// its `(id, slot)` is already taken.
    pub fn insert(&mut self, descriptor: TemplateDescriptor) -> bool {
        let by_slot = self.slots.entry(descriptor.id().to_string()).or_default();
        let slot = descriptor.slot();
        if by_slot.contains_key(&slot) {
            return false;
        }
        by_slot.insert(slot, self.templates.len());
        self.templates.push(descriptor);
        true
    }

    /// Accepted templates in registration order.
    pub fn templates(&self) -> &[TemplateDescriptor] {
        &self.templates
    }

    /// Returns the number of accepted templates.
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// Returns true if nothing has been accepted.
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

/// What happened to one submitted descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Registered.
    Accepted,
    /// Not registered; see the error log.
    Rejected(RejectionKind),
}

/// Summary line for an accepted template in a [`ValidationReport`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AcceptedTemplate {
    /// Template id.
    pub id: String,
    /// Template name, if declared.
    pub name: Option<String>,
    /// Explicit template version, if declared.
    pub version: Option<TemplateVersion>,
}

impl From<&TemplateDescriptor> for AcceptedTemplate {
    fn from(d: &TemplateDescriptor) -> Self {
        Self {
            id: d.id().to_string(),
            name: d.name().map(str::to_owned),
            version: d.version().cloned(),
        }
    }
}

/// Serializable snapshot of a registry.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    /// Highest schema version accepted.
    pub supported_schema_version: String,
    /// Accepted templates in registration order.
    pub accepted: Vec<AcceptedTemplate>,
    /// Number of descriptors rejected.
    pub rejected: usize,
    /// Every error record in occurrence order.
    pub errors: Vec<ErrorRecord>,
}

impl ValidationReport {
    /// Whether every batch was readable and every descriptor was accepted.
    pub fn is_clean(&self) -> bool {
        self.rejected == 0 && self.invalid_batches() == 0
    }

    /// Number of batches rejected as a whole.
    pub fn invalid_batches(&self) -> usize {
        self.errors
            .iter()
            .filter(|e| e.kind == RejectionKind::InvalidBatch)
            .count()
    }
}

/// Registration gate for element templates.
///
/// Generic over the schema validator and the version comparator. The
/// supported schema version is queried from the validator once, at
/// construction.
///
/// Submission takes `&mut self`; wrap the registry in a mutex to share it.
#[derive(Debug)]
pub struct TemplateRegistry<V, C = SemverPrecedence> {
    validator: V,
    comparator: C,
    supported_version: Version,
    index: AcceptedIndex,
    errors: ErrorLog,
    rejected: usize,
}

impl<V: SchemaValidator> TemplateRegistry<V> {
    /// Create an empty registry ordering schema versions by semver precedence.
    pub fn new(validator: V) -> Self {
        Self::with_comparator(validator, SemverPrecedence)
    }
}

impl<V: SchemaValidator, C: VersionComparator> TemplateRegistry<V, C> {
    /// Create an empty registry with a custom version comparator.
    pub fn with_comparator(validator: V, comparator: C) -> Self {
        let supported_version = validator.supported_version();
        Self {
            validator,
            comparator,
            supported_version,
            index: AcceptedIndex::new(),
            errors: ErrorLog::new(),
            rejected: 0,
        }
    }

    /// Validate and register one descriptor.
    pub fn add(&mut self, descriptor: TemplateDescriptor) -> Outcome {
        let ctx = CheckContext {
            supported_version: &self.supported_version,
            comparator: &self.comparator,
            index: &self.index,
            validator: &self.validator,
        };

        match pipeline::run(&ctx, &descriptor) {
            Ok(()) => {
                tracing::debug!(
                    template_id = %descriptor.id(),
                    version = %descriptor.slot(),
                    "template accepted"
                );
                self.index.insert(descriptor);
                Outcome::Accepted
            }
            Err(rejection) => self.reject(&descriptor, rejection),
        }
    }

    /// Validate and register descriptors in input order.
    ///
    /// Each descriptor is independent: a rejection never undoes an
    /// earlier acceptance, and never stops later descriptors from being
    /// processed.
    pub fn add_all<I>(&mut self, descriptors: I)
    where
        I: IntoIterator<Item = TemplateDescriptor>,
    {
        let (mut accepted, mut rejected) = (0usize, 0usize);
        for descriptor in descriptors {
            match self.add(descriptor) {
                Outcome::Accepted => accepted += 1,
                Outcome::Rejected(_) => rejected += 1,
            }
        }
        tracing::info!(accepted, rejected, "template batch processed");
    }

    /// Validate and register a raw JSON batch.
    ///
    /// A non-array value is recorded as a single
    /// [`RejectionKind::InvalidBatch`] error. Elements that cannot be read
    /// as descriptors are recorded as [`RejectionKind::MalformedDescriptor`]
    /// and the rest of the batch proceeds.
    pub fn add_all_json(&mut self, templates: Value) {
        let Value::Array(items) = templates else {
            self.reject_batch(TEMPLATES_MUST_BE_LIST);
            return;
        };

        let (mut accepted, mut rejected) = (0usize, 0usize);
        for (position, item) in items.into_iter().enumerate() {
            let outcome = match TemplateDescriptor::from_value(item) {
                Ok(descriptor) => self.add(descriptor),
                Err(e) => {
                    tracing::warn!(position, error = %e, "malformed template descriptor");
                    self.errors.push(ErrorRecord {
                        kind: RejectionKind::MalformedDescriptor,
                        message: e.to_string(),
                        template: None,
                    });
                    self.rejected += 1;
                    Outcome::Rejected(RejectionKind::MalformedDescriptor)
                }
            };
            match outcome {
                Outcome::Accepted => accepted += 1,
                Outcome::Rejected(_) => rejected += 1,
            }
        }
        tracing::info!(accepted, rejected, "template batch processed");
    }

    /// Record a batch that could not be submitted at all.
    ///
    /// The record carries [`RejectionKind::InvalidBatch`] and no template
    /// reference. No descriptor is counted as rejected.
    pub fn reject_batch(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!(%message, "template batch rejected");
        self.errors.push(ErrorRecord {
            kind: RejectionKind::InvalidBatch,
            message,
            template: None,
        });
    }

    /// Accepted descriptors in registration order.
    pub fn valid_templates(&self) -> &[TemplateDescriptor] {
        self.index.templates()
    }

    /// Every error record in occurrence order.
    pub fn errors(&self) -> &[ErrorRecord] {
        self.errors.records()
    }

    /// Error records grouped by template id.
    pub fn errors_by_template_id(&self) -> BTreeMap<&str, Vec<&ErrorRecord>> {
        self.errors.by_template_id()
    }

    /// Look up an accepted template.
    pub fn get(&self, id: &str, slot: &VersionSlot) -> Option<&TemplateDescriptor> {
        self.index.get(id, slot)
    }

    /// Number of descriptors rejected so far.
    pub fn rejected_count(&self) -> usize {
        self.rejected
    }

    /// The schema version queried from the validator at construction.
    pub fn supported_schema_version(&self) -> &Version {
        &self.supported_version
    }

    /// The schema validator.
    pub fn validator(&self) -> &V {
        &self.validator
    }

    /// Snapshot of the current state.
    pub fn report(&self) -> ValidationReport {
        ValidationReport {
            supported_schema_version: self.supported_version.to_string(),
            accepted: self.index.templates().iter().map(AcceptedTemplate::from).collect(),
            rejected: self.rejected,
            errors: self.errors.records().to_vec(),
        }
    }

    fn reject(&mut self, descriptor: &TemplateDescriptor, rejection: Rejection) -> Outcome {
        let Rejection { kind, messages } = rejection;
        let template = TemplateRef::from(descriptor);
        for message in messages {
            tracing::warn!(
                template_id = %descriptor.id(),
                kind = %kind,
                %message,
                "template rejected"
            );
            self.errors.push(ErrorRecord {
                kind,
                message,
                template: Some(template.clone()),
            });
        }
        self.rejected += 1;
        Outcome::Rejected(kind)
    }
}
