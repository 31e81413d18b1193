//! # Error Filtering
//!
//! Raw validator output is noisy: combinator keywords (`anyOf`, `oneOf`)
//! report a summary next to the specific failure underneath them, and the
//! same violation can surface more than once through different schema
//! paths. Users see only what [`filtered_schema_errors`] keeps.

use std::collections::HashSet;

use tplgate_core::SchemaError;

/// Keywords whose errors only summarize failures of their subschemas.
const SUMMARY_KEYWORDS: &[&str] = &["anyOf", "oneOf"];

/// Reduce raw schema errors to the user-facing subset.
///
/// 1. Exact duplicates (same instance path and message) collapse to the
///    first occurrence.
/// 2. A summary error is dropped when a non-summary error targets the same
///    instance location or a descendant of it.
///
/// Relative order of the surviving errors is preserved.
pub fn filtered_schema_errors(errors: Vec<SchemaError>) -> Vec<SchemaError> {
    let mut seen = HashSet::new();
    let unique: Vec<SchemaError> = errors
        .into_iter()
        .filter(|e| seen.insert((e.instance_path.clone(), e.message.clone())))
        .collect();

    let specific: Vec<&str> = unique
        .iter()
        .filter(|e| !is_summary(e))
        .map(|e| e.instance_path.as_str())
        .collect();

    unique
        .iter()
        .filter(|e| {
            !(is_summary(e)
                && specific
                    .iter()
                    .any(|path| is_within(path, &e.instance_path)))
        })
        .cloned()
        .collect()
}

fn is_summary(error: &SchemaError) -> bool {
    SUMMARY_KEYWORDS.contains(&error.keyword.as_str())
}

/// Whether JSON Pointer `path` equals `ancestor` or lies beneath it.
fn is_within(path: &str, ancestor: &str) -> bool {
    match path.strip_prefix(ancestor) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}
