//! # Versions
//!
//! Two unrelated notions of "version" meet in an element template:
//!
//! - The **template version** (`version` field) identifies a revision of
//!   one template. It is an opaque label compared only for equality, and
//!   determines the [`VersionSlot`] the template occupies under its id.
//!
//! - The **schema version** is embedded in the `$schema` URI and names the
//!   revision of the element template JSON Schema the descriptor was
//!   written against. It is a semantic version, ordered by
//!   [`VersionComparator`].

use std::cmp::Ordering;
use std::sync::OnceLock;

use regex::Regex;
use semver::Version;
use serde::{Deserialize, Serialize};

use crate::descriptor::TemplateVersion;

/// The identity slot a template occupies under its id.
///
/// `Unversioned` is a distinct slot: it collides with another unversioned
/// template of the same id and never with a versioned one, including a
/// template whose version text happens to be `"_"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VersionSlot {
    /// No explicit `version` was declared.
    Unversioned,
    /// An explicit `version` was declared.
    Versioned(TemplateVersion),
}

impl VersionSlot {
    /// The explicit version, if any.
    pub fn version(&self) -> Option<&TemplateVersion> {
        match self {
            Self::Unversioned => None,
            Self::Versioned(v) => Some(v),
        }
    }
}

impl From<Option<TemplateVersion>> for VersionSlot {
    fn from(version: Option<TemplateVersion>) -> Self {
        version.map_or(Self::Unversioned, Self::Versioned)
    }
}

impl std::fmt::Display for VersionSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unversioned => f.write_str("(unversioned)"),
            Self::Versioned(v) => write!(f, "{v}"),
        }
    }
}

fn schema_version_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\d+\.\d+\.\d+").expect("schema version pattern compiles"))
}

/// Extract the schema version asserted by a `$schema` URI.
///
/// Takes the first `MAJOR.MINOR.PATCH` token in the URI, e.g.
/// `https://unpkg.com/@camunda/zeebe-element-templates-json-schema@0.9.0/resources/schema.json`
/// yields `0.9.0`. Returns `None` when no token is present or the token
/// is not a valid semantic version (leading zeros, overflow); both mean
/// "no version asserted".
pub fn extract_schema_version(schema_uri: &str) -> Option<Version> {
    let token = schema_version_pattern().find(schema_uri)?;
    Version::parse(token.as_str()).ok()
}

/// Orders two semantic versions.
pub trait VersionComparator {
    /// Compare `a` to `b`.
    fn compare(&self, a: &Version, b: &Version) -> Ordering;
}

/// Semantic-versioning precedence: pre-releases sort before their
/// release, build metadata is ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct SemverPrecedence;

impl VersionComparator for SemverPrecedence {
    fn compare(&self, a: &Version, b: &Version) -> Ordering {
        a.cmp_precedence(b)
    }
}
