//! # Template Descriptors
//!
//! A [`TemplateDescriptor`] is one element template as submitted by a
//! caller: a JSON object with a required `id`, a handful of optional
//! header fields the registry reasons about, and any number of
//! schema-governed fields it does not interpret.
//!
//! ## Header Fields
//!
//! | field      | type                 | use                                   |
//! |------------|----------------------|---------------------------------------|
//! | `id`       | string (required)    | identity check                        |
//! | `name`     | string               | diagnostics only                      |
//! | `version`  | string or integer    | identity check, see [`VersionSlot`]   |
//! | `$schema`  | string (URI)         | schema-version compatibility          |
//!
//! Only `id` is strict. A `name` or `$schema` of the wrong JSON type is
//! read as absent, leaving the complaint to schema validation.
//!
//! [`VersionSlot`]: crate::version::VersionSlot

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::error::DescriptorError;
use crate::version::VersionSlot;

/// The explicit `version` of a template, normalized to text.
///
/// Element templates declare versions as strings (`"1.0"`) or integers
/// (`3`). Both normalize to their textual form so that `3` and `"3"`
/// occupy the same slot. Numbers are compared by value: `1` and `1.0`
/// both read as `"1"`, while the string `"1.0"` stays `"1.0"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TemplateVersion(String);

impl TemplateVersion {
    /// Wrap a version string.
    pub fn new(version: impl Into<String>) -> Self {
        Self(version.into())
    }

    /// Read a `version` field value.
    ///
    /// Returns `None` for the values that mean "no explicit version":
    /// `null`, `false`, the empty string, and the number zero.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Null | Value::Bool(false) => None,
            Value::String(s) if s.is_empty() => None,
            Value::String(s) => Some(Self(s.clone())),
            Value::Number(n) => canonical_number(n).map(Self),
            other => Some(Self(other.to_string())),
        }
    }

    /// Access the version text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TemplateVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Deserialize)]
struct Header {
    id: String,
    #[serde(default)]
    name: Option<Value>,
    #[serde(default)]
    version: Option<Value>,
    #[serde(default, rename = "$schema")]
    schema: Option<Value>,
}

/// One element template descriptor.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateDescriptor {
    id: String,
    name: Option<String>,
    version: Option<TemplateVersion>,
    schema_uri: Option<String>,
    raw: Value,
}

impl TemplateDescriptor {
    /// Read a descriptor from a JSON value.
    ///
    /// # Errors
    ///
    /// Returns [`DescriptorError::NotAnObject`] for non-object values and
    /// [`DescriptorError::InvalidHeader`] when `id` is missing or is not
    /// a string.
    pub fn from_value(raw: Value) -> Result<Self, DescriptorError> {
        if !raw.is_object() {
            return Err(DescriptorError::NotAnObject {
                found: json_type_name(&raw),
            });
        }

        let header = Header::deserialize(&raw)?;

        Ok(Self {
            id: header.id,
            name: header.name.and_then(|v| v.as_str().map(str::to_owned)),
            version: header.version.as_ref().and_then(TemplateVersion::from_json),
            schema_uri: header.schema.and_then(|v| v.as_str().map(str::to_owned)),
            raw,
        })
    }

    /// The template id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The human-readable template name, if declared.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The explicit template version, if declared.
    pub fn version(&self) -> Option<&TemplateVersion> {
        self.version.as_ref()
    }

    /// The identity slot this descriptor occupies under its id.
    pub fn slot(&self) -> VersionSlot {
        VersionSlot::from(self.version.clone())
    }

    /// The `$schema` URI, if declared.
    pub fn schema_uri(&self) -> Option<&str> {
        self.schema_uri.as_deref()
    }

    /// The descriptor exactly as submitted.
    pub fn as_value(&self) -> &Value {
        &self.raw
    }

    /// Consume the descriptor, returning the submitted JSON.
    pub fn into_value(self) -> Value {
        self.raw
    }
}

impl TryFrom<Value> for TemplateDescriptor {
    type Error = DescriptorError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_value(value)
    }
}

impl Serialize for TemplateDescriptor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.raw.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for TemplateDescriptor {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Value::deserialize(deserializer)?;
        Self::from_value(raw).map_err(serde::de::Error::custom)
    }
}

/// Largest integer an `f64` holds exactly.
const MAX_EXACT_FLOAT: f64 = 9_007_199_254_740_992.0;

/// Textual form of a numeric version, or `None` for zero.
///
/// Integral floats print without a fraction so they match the integer
/// of the same value.
fn canonical_number(n: &serde_json::Number) -> Option<String> {
    if let Some(i) = n.as_i64() {
        return (i != 0).then(|| i.to_string());
    }
    if let Some(u) = n.as_u64() {
        return Some(u.to_string());
    }
    let f = n.as_f64()?;
    if f == 0.0 {
        None
    } else if f.fract() == 0.0 && f.abs() < MAX_EXACT_FLOAT {
        Some((f as i64).to_string())
    } else {
        Some(f.to_string())
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_reads_header_fields() {
        let d = TemplateDescriptor::from_value(json!({
            "$schema": "https://unpkg.com/@camunda/zeebe-element-templates-json-schema@0.9.0/resources/schema.json",
            "id": "com.example.rest",
            "name": "REST Connector",
            "version": "1.0",
            "appliesTo": ["bpmn:Task"],
            "properties": []
        }))
        .unwrap();

        assert_eq!(d.id(), "com.example.rest");
        assert_eq!(d.name(), Some("REST Connector"));
        assert_eq!(d.version().map(TemplateVersion::as_str), Some("1.0"));
        assert!(d.schema_uri().unwrap().contains("0.9.0"));
        assert_eq!(d.as_value()["appliesTo"][0], "bpmn:Task");
    }

    #[test]
    fn test_integer_version_normalizes_to_text() {
        let a = TemplateDescriptor::from_value(json!({"id": "a", "version": 3})).unwrap();
        let b = TemplateDescriptor::from_value(json!({"id": "a", "version": "3"})).unwrap();
        assert_eq!(a.slot(), b.slot());
    }

    #[test]
    fn test_integral_float_version_matches_integer() {
        let a = TemplateDescriptor::from_value(json!({"id": "a", "version": 1})).unwrap();
        let b = TemplateDescriptor::from_value(json!({"id": "a", "version": 1.0})).unwrap();
        assert_eq!(a.slot(), b.slot());
        assert_eq!(b.version().map(TemplateVersion::as_str), Some("1"));
    }

    #[test]
    fn test_string_version_keeps_its_fraction() {
        let text = TemplateDescriptor::from_value(json!({"id": "a", "version": "1.0"})).unwrap();
        let number = TemplateDescriptor::from_value(json!({"id": "a", "version": 1.0})).unwrap();
        assert_ne!(text.slot(), number.slot());

        let fractional = TemplateDescriptor::from_value(json!({"id": "a", "version": 1.5})).unwrap();
        assert_eq!(fractional.version().map(TemplateVersion::as_str), Some("1.5"));
    }

    #[test]
    fn test_absent_like_versions_are_unversioned() {
        for version in [json!(""), json!(null), json!(false), json!(0), json!(0.0)] {
            let d = TemplateDescriptor::from_value(json!({"id": "a", "version": version})).unwrap();
            assert_eq!(d.slot(), VersionSlot::Unversioned, "version {version}");
        }
    }

    #[test]
    fn test_missing_id_is_rejected() {
        let err = TemplateDescriptor::from_value(json!({"name": "No Id"})).unwrap_err();
        assert!(matches!(err, DescriptorError::InvalidHeader(_)));
        assert!(err.to_string().contains("id"), "got: {err}");
    }

    #[test]
    fn test_non_string_id_is_rejected() {
        let err = TemplateDescriptor::from_value(json!({"id": 42})).unwrap_err();
        assert!(matches!(err, DescriptorError::InvalidHeader(_)));
    }

    #[test]
    fn test_non_object_is_rejected() {
        let err = TemplateDescriptor::from_value(json!(["a"])).unwrap_err();
        assert!(matches!(err, DescriptorError::NotAnObject { found: "array" }));
    }

    #[test]
    fn test_wrongly_typed_optional_fields_read_as_absent() {
        let d = TemplateDescriptor::from_value(json!({
            "id": "a",
            "name": 7,
            "$schema": false
        }))
        .unwrap();
        assert_eq!(d.name(), None);
        assert_eq!(d.schema_uri(), None);
    }

    #[test]
    fn test_serde_preserves_raw_value() {
        let raw = json!({"id": "a", "custom": {"nested": [1, 2]}});
        let d: TemplateDescriptor = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(serde_json::to_value(&d).unwrap(), raw);
    }
}
