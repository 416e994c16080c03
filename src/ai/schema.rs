//! Strict JSON Schema construction for structured output requests.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;

/// Name given to the schema in `response_format`
pub const SCHEMA_NAME: &str = "structured_output";

/// Primitive JSON type of an output field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    String,
    Number,
    Integer,
    Boolean,
}

impl FieldType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Number => "number",
            FieldType::Integer => "integer",
            FieldType::Boolean => "boolean",
        }
    }
}

/// Type and description of one output field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub description: String,
}

impl FieldDescriptor {
    pub fn new(field_type: FieldType, description: impl Into<String>) -> Self {
        Self {
            field_type,
            description: description.into(),
        }
    }

    pub fn string(description: impl Into<String>) -> Self {
        Self::new(FieldType::String, description)
    }

    pub fn number(description: impl Into<String>) -> Self {
        Self::new(FieldType::Number, description)
    }

    pub fn integer(description: impl Into<String>) -> Self {
        Self::new(FieldType::Integer, description)
    }

    pub fn boolean(description: impl Into<String>) -> Self {
        Self::new(FieldType::Boolean, description)
    }
}

/// Output field name to descriptor. Ordered so the generated schema is stable.
pub type FieldDescriptors = BTreeMap<String, FieldDescriptor>;

/// Object schema where every field is required and no other field is allowed.
pub fn build_strict_schema(fields: &FieldDescriptors) -> Value {
    let properties: Map<String, Value> = fields
        .iter()
        .map(|(name, field)| {
            (
                name.clone(),
                json!({
                    "description": field.description,
                    "type": field.field_type.as_str(),
                }),
            )
        })
        .collect();
    let required: Vec<&str> = fields.keys().map(String::as_str).collect();

    json!({
        "additionalProperties": false,
        "properties": properties,
        "required": required,
        "type": "object",
    })
}

/// `response_format` value for a chat completion request
pub fn response_format(fields: &FieldDescriptors) -> Value {
    json!({
        "json_schema": {
            "name": SCHEMA_NAME,
            "schema": build_strict_schema(fields),
            "strict": true,
        },
        "type": "json_schema",
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn person_fields() -> FieldDescriptors {
        let mut fields = FieldDescriptors::new();
        fields.insert("name".to_string(), FieldDescriptor::string("Full name"));
        fields.insert("age".to_string(), FieldDescriptor::integer("Age in years"));
        fields
    }

    #[test]
    fn test_required_matches_keys() {
        let fields = person_fields();
        let schema = build_strict_schema(&fields);
        let required: Vec<&str> = schema["required"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap())
            .collect();
        let keys: Vec<&str> = fields.keys().map(String::as_str).collect();
        assert_eq!(required, keys);
        assert_eq!(schema["additionalProperties"], Value::Bool(false));
    }

    #[test]
    fn test_empty_fields() {
        let schema = build_strict_schema(&FieldDescriptors::new());
        assert_eq!(schema["required"], json!([]));
        assert_eq!(schema["properties"], json!({}));
        assert_eq!(schema["additionalProperties"], Value::Bool(false));
        assert_eq!(schema["type"], "object");
    }

    #[test]
    fn test_field_descriptor_deserialize() {
        let fields: FieldDescriptors = serde_json::from_str(
            r#"{"done": {"type": "boolean", "description": "Whether finished"},
                "score": {"type": "number", "description": "Confidence"}}"#,
        )
        .unwrap();
        assert_eq!(fields["done"], FieldDescriptor::boolean("Whether finished"));
        assert_eq!(fields["score"].field_type, FieldType::Number);
    }

    #[test]
    fn test_unknown_field_type_rejected() {
        let result: Result<FieldDescriptors, _> =
            serde_json::from_str(r#"{"x": {"type": "date", "description": "d"}}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_response_format_snapshot() {
        insta::assert_json_snapshot!(response_format(&person_fields()), @r#"
        {
          "json_schema": {
            "name": "structured_output",
            "schema": {
              "additionalProperties": false,
              "properties": {
                "age": {
                  "description": "Age in years",
                  "type": "integer"
                },
                "name": {
                  "description": "Full name",
                  "type": "string"
                }
              },
              "required": [
                "age",
                "name"
              ],
              "type": "object"
            },
            "strict": true
          },
          "type": "json_schema"
        }
        "#);
    }
}
