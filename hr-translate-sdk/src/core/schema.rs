//! Output schema definitions
//!
//! Schemas are written for strict structured output: every property is
//! listed in `required`, optional values are nullable, and no additional
//! properties are allowed. The serde helpers here let the typed records
//! accept the `null`s that shape produces.

use serde::{Deserialize, Deserializer};
use serde_json::{json, Value};

/// A named JSON schema
#[derive(Debug, Clone, PartialEq)]
pub struct OutputSchema {
    /// Schema name reported to the backend
    pub name: String,

    /// JSON schema document
    pub schema: Value,
}

impl OutputSchema {
    /// Create a schema
    pub fn new(name: impl Into<String>, schema: Value) -> Self {
        Self {
            name: name.into(),
            schema,
        }
    }

    /// Names of the top-level properties
    pub fn property_names(&self) -> Vec<&str> {
        self.schema
            .get("properties")
            .and_then(Value::as_object)
            .map(|props| props.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }
}

/// Schema for a nullable list of strings
pub fn nullable_string_list(description: &str) -> Value {
    json!({
        "type": ["array", "null"],
        "items": { "type": "string" },
        "description": description,
    })
}

/// Schema for a nullable string
pub fn nullable_string(description: &str) -> Value {
    json!({
        "type": ["string", "null"],
        "description": description,
    })
}

/// Schema for a required string
pub fn string(description: &str) -> Value {
    json!({
        "type": "string",
        "description": description,
    })
}

/// Build a strict object schema where every property is required
pub fn strict_object(properties: Vec<(&str, Value)>) -> Value {
    let required: Vec<&str> = properties.iter().map(|(name, _)| *name).collect();
    let properties: serde_json::Map<String, Value> = properties
        .into_iter()
        .map(|(name, schema)| (name.to_string(), schema))
        .collect();

    json!({
        "type": "object",
        "properties": properties,
        "required": required,
        "additionalProperties": false,
    })
}

/// Deserialize a missing or `null` list as empty
pub fn null_as_empty<'de, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Sample {
        #[serde(default, deserialize_with = "null_as_empty")]
        items: Vec<String>,
    }

    #[test]
    fn test_strict_object_requires_everything() {
        let schema = strict_object(vec![
            ("a", string("first")),
            ("b", nullable_string("second")),
        ]);

        assert_eq!(schema["required"], json!(["a", "b"]));
        assert_eq!(schema["additionalProperties"], json!(false));
        assert_eq!(schema["properties"]["b"]["type"], json!(["string", "null"]));
    }

    #[test]
    fn test_property_names() {
        let schema = OutputSchema::new("sample", strict_object(vec![("items", nullable_string_list("x"))]));
        assert_eq!(schema.property_names(), vec!["items"]);
    }

    #[test]
    fn test_null_as_empty() {
        let sample: Sample = serde_json::from_value(json!({ "items": null })).unwrap();
        assert!(sample.items.is_empty());

        let sample: Sample = serde_json::from_value(json!({})).unwrap();
        assert!(sample.items.is_empty());

        let sample: Sample = serde_json::from_value(json!({ "items": ["x"] })).unwrap();
        assert_eq!(sample.items, vec!["x"]);
    }
}
