//! # Descriptor Loading
//!
//! Reads element template files from disk. `.yaml`/`.yml` files are
//! parsed as YAML and converted to JSON; anything else is parsed as JSON.

use std::path::Path;

use serde_json::Value;
use thiserror::Error;

/// A descriptor file could not be read or parsed.
#[derive(Error, Debug)]
#[error("document load error for '{path}': {reason}")]
pub struct DocumentLoadError {
    /// Path to the document that failed to load.
    pub path: String,
    /// Reason the document could not be loaded.
    pub reason: String,
}

impl DocumentLoadError {
    fn new(path: &Path, reason: impl Into<String>) -> Self {
        Self {
            path: path.display().to_string(),
            reason: reason.into(),
        }
    }
}

/// Load a descriptor file as JSON.
///
/// The result is whatever the file holds: a single descriptor object, an
/// array of them, or anything else (which the registry rejects).
pub fn load_document(path: &Path) -> Result<Value, DocumentLoadError> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| DocumentLoadError::new(path, format!("cannot read file: {e}")))?;

    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

    match ext {
        "yaml" | "yml" => {
            let yaml_value: serde_yaml::Value = serde_yaml::from_str(&content)
                .map_err(|e| DocumentLoadError::new(path, format!("invalid YAML: {e}")))?;
            yaml_to_json_value(&yaml_value).map_err(|e| {
                DocumentLoadError::new(path, format!("YAML-to-JSON conversion failed: {e}"))
            })
        }
        _ => serde_json::from_str(&content)
            .map_err(|e| DocumentLoadError::new(path, format!("invalid JSON: {e}"))),
    }
}

/// Wrap a single descriptor object into a one-element batch.
pub fn as_batch(document: Value) -> Value {
    match document {
        Value::Object(_) => Value::Array(vec![document]),
        other => other,
    }
}

/// A YAML node with no JSON counterpart.
#[derive(Error, Debug, PartialEq, Eq)]
#[error("at '{pointer}': {reason}")]
struct YamlConversionError {
    /// JSON pointer to the offending node; empty for the document root.
    pointer: String,
    reason: String,
}

/// Convert a YAML template document to JSON.
///
/// Tags are dropped. Map keys must be scalars; numeric and boolean keys
/// become their text.
fn yaml_to_json_value(yaml: &serde_yaml::Value) -> Result<Value, YamlConversionError> {
    convert_node(yaml, String::new())
}

fn convert_node(node: &serde_yaml::Value, pointer: String) -> Result<Value, YamlConversionError> {
    use serde_yaml::Value as Yaml;

    let value = match node {
        Yaml::Null => Value::Null,
        Yaml::Bool(b) => Value::Bool(*b),
        Yaml::Number(n) => match convert_number(n) {
            Some(number) => Value::Number(number),
            None => {
                return Err(YamlConversionError {
                    pointer,
                    reason: format!("number {n} has no JSON representation"),
                })
            }
        },
        Yaml::String(s) => Value::String(s.clone()),
        Yaml::Sequence(items) => Value::Array(
            items
                .iter()
                .enumerate()
                .map(|(i, item)| convert_node(item, format!("{pointer}/{i}")))
                .collect::<Result<_, _>>()?,
        ),
        Yaml::Mapping(entries) => {
            let mut object = serde_json::Map::with_capacity(entries.len());
            for (key, item) in entries {
                let Some(key) = scalar_key(key) else {
                    return Err(YamlConversionError {
                        pointer,
                        reason: "map keys must be strings, numbers or booleans".to_string(),
                    });
                };
                let child = convert_node(item, format!("{pointer}/{}", escape_pointer(&key)))?;
                object.insert(key, child);
            }
            Value::Object(object)
        }
        Yaml::Tagged(tagged) => return convert_node(&tagged.value, pointer),
    };
    Ok(value)
}

fn convert_number(n: &serde_yaml::Number) -> Option<serde_json::Number> {
    if let Some(i) = n.as_i64() {
        Some(i.into())
    } else if let Some(u) = n.as_u64() {
        Some(u.into())
    } else {
        n.as_f64().and_then(serde_json::Number::from_f64)
    }
}

fn scalar_key(key: &serde_yaml::Value) -> Option<String> {
    match key {
        serde_yaml::Value::String(s) => Some(s.clone()),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        serde_yaml::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn escape_pointer(segment: &str) -> String {
    segment.replace('~', "~0").replace('/', "~1")
}
