//! # Error Records
//!
//! Every rejection the registry observes becomes an [`ErrorRecord`] in
//! an append-only [`ErrorLog`]. Records are never mutated or removed.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tplgate_core::{RejectionKind, TemplateDescriptor};

/// Identifies the descriptor an error record is about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateRef {
    /// Template id.
    pub id: String,
    /// Template name, if declared.
    pub name: Option<String>,
}

impl From<&TemplateDescriptor> for TemplateRef {
    fn from(descriptor: &TemplateDescriptor) -> Self {
        Self {
            id: descriptor.id().to_string(),
            name: descriptor.name().map(str::to_owned),
        }
    }
}

/// One recorded validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorRecord {
    /// Which check failed.
    pub kind: RejectionKind,
    /// Human-readable reason, without the template prefix.
    pub message: String,
    /// The descriptor at fault. `None` for batch-level failures and
    /// values that could not be read as descriptors.
    pub template: Option<TemplateRef>,
}

impl fmt::Display for ErrorRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.template {
            Some(t) => write!(
                f,
                "template(id: <{}>, name: <{}>): {}",
                t.id,
                t.name.as_deref().unwrap_or_default(),
                self.message
            ),
            None => f.write_str(&self.message),
        }
    }
}

/// Append-only log of error records, in occurrence order.
#[derive(Debug, Clone, Default)]
pub struct ErrorLog {
    records: Vec<ErrorRecord>,
}

impl ErrorLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record.
    pub fn push(&mut self, record: ErrorRecord) {
        self.records.push(record);
    }

    /// All records, oldest first.
    pub fn records(&self) -> &[ErrorRecord] {
        &self.records
    }

    /// Returns the number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records grouped by template id, each group in occurrence order.
    ///
    /// Records without a template reference are omitted.
    pub fn by_template_id(&self) -> BTreeMap<&str, Vec<&ErrorRecord>> {
        let mut groups: BTreeMap<&str, Vec<&ErrorRecord>> = BTreeMap::new();
        for record in &self.records {
            if let Some(t) = &record.template {
                groups.entry(t.id.as_str()).or_default().push(record);
            }
        }
        groups
    }
}
