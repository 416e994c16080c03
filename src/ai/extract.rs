//! Structured output extraction from chat completion responses.

use crate::ai::{ClientError, Result};
use serde_json::{Map, Value};

/// Message of an API-reported `error` payload, if the response carries one.
pub fn api_error_message(response: &Value) -> Option<String> {
    let error = response.get("error").filter(|e| !e.is_null())?;
    let message = error
        .get("message")
        .and_then(|m| m.as_str())
        .or_else(|| error.as_str())
        .map(str::to_string)
        .unwrap_or_else(|| error.to_string());
    Some(message)
}

/// Decode the JSON object the model returned.
///
/// Reads `choices[0].message.content`, or the legacy
/// `choices[0].message.function_call.arguments` when content is absent.
pub fn extract_structured_output(response: &Value) -> Result<Map<String, Value>> {
    if let Some(message) = api_error_message(response) {
        return Err(ClientError::Api(message));
    }

    let message = response
        .pointer("/choices/0/message")
        .ok_or_else(|| ClientError::MissingContent("response has no choices".to_string()))?;

    if let Some(refusal) = message.get("refusal").and_then(|r| r.as_str()) {
        return Err(ClientError::Api(format!("model refused: {}", refusal)));
    }

    let raw = message
        .get("content")
        .and_then(|c| c.as_str())
        .or_else(|| {
            message
                .pointer("/function_call/arguments")
                .and_then(|a| a.as_str())
        })
        .ok_or_else(|| {
            ClientError::MissingContent("no structured output found in the response".to_string())
        })?;

    match serde_json::from_str::<Value>(raw)? {
        Value::Object(map) => Ok(map),
        other => Err(ClientError::SchemaMismatch(json_kind(&other).to_string())),
    }
}

fn json_kind(value: &Value) -> &'static str {
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

    fn response_with_content(content: &str) -> Value {
        json!({
            "choices": [{
                "index": 0,
                "message": { "role": "assistant", "content": content }
            }]
        })
    }

    #[test]
    fn test_extract_object_unchanged() {
        let response = response_with_content(r#"{"name": "Ada", "age": 36, "tags": ["x"]}"#);
        let map = extract_structured_output(&response).unwrap();
        assert_eq!(
            Value::Object(map),
            json!({ "name": "Ada", "age": 36, "tags": ["x"] })
        );
    }

    #[test]
    fn test_extract_api_error() {
        let response = json!({
            "error": { "message": "Invalid schema", "type": "invalid_request_error" }
        });
        match extract_structured_output(&response) {
            Err(ClientError::Api(message)) => assert_eq!(message, "Invalid schema"),
            other => panic!("expected API error, got {:?}", other),
        }
    }

    #[test]
    fn test_null_error_is_ignored() {
        let mut response = response_with_content(r#"{"ok": true}"#);
        response["error"] = Value::Null;
        assert!(extract_structured_output(&response).is_ok());
    }

    #[test]
    fn test_extract_malformed_json() {
        let response = response_with_content("{not json");
        assert!(matches!(
            extract_structured_output(&response),
            Err(ClientError::Decode(_))
        ));
    }

    #[test]
    fn test_extract_non_object() {
        let response = response_with_content("[1, 2, 3]");
        match extract_structured_output(&response) {
            Err(ClientError::SchemaMismatch(kind)) => assert_eq!(kind, "array"),
            other => panic!("expected schema mismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_extract_no_choices() {
        let response = json!({ "choices": [] });
        assert!(matches!(
            extract_structured_output(&response),
            Err(ClientError::MissingContent(_))
        ));
    }

    #[test]
    fn test_extract_legacy_function_call() {
        let response = json!({
            "choices": [{
                "message": {
                    "role": "assistant",
                    "content": null,
                    "function_call": { "name": "emit", "arguments": "{\"city\": \"Oslo\"}" }
                }
            }]
        });
        let map = extract_structured_output(&response).unwrap();
        assert_eq!(map.get("city"), Some(&json!("Oslo")));
    }

    #[test]
    fn test_extract_refusal() {
        let response = json!({
            "choices": [{
                "message": { "role": "assistant", "content": null, "refusal": "I can't help with that." }
            }]
        });
        assert!(matches!(
            extract_structured_output(&response),
            Err(ClientError::Api(_))
        ));
    }

    #[test]
    fn test_api_error_message_without_message_field() {
        let response = json!({ "error": "quota exceeded" });
        assert_eq!(
            api_error_message(&response).as_deref(),
            Some("quota exceeded")
        );
    }
}
