//! File upload and the file-id chat request.
//!
//! This is the older structured-output path: a local file is uploaded with a
//! multipart form, and its id is referenced from a plain chat request.

use crate::ai::{api_error_message, read_json, ClientError, Message, OpenAiClient, PlainMessage, Result};
use reqwest::blocking::multipart::{Form, Part};
use serde_json::{json, Map, Value};
use std::path::Path;

pub const FILES_PATH: &str = "/files";

/// Purpose sent with every upload
pub const UPLOAD_PURPOSE: &str = "assistants";

/// Request body for a chat completion that references uploaded files
pub fn file_chat_request_body(model: &str, messages: &[Message], file_id: Option<&str>) -> Value {
    let messages: Vec<PlainMessage<'_>> = messages.iter().map(PlainMessage::from).collect();
    let mut body = json!({
        "model": model,
        "messages": messages,
    });
    if let Some(id) = file_id {
        body["file_ids"] = json!([id]);
    }
    body
}

impl OpenAiClient {
    /// Upload a local file and return the id the API assigned to it
    pub fn upload_file(&self, path: &Path) -> Option<String> {
        match self.try_upload_file(path) {
            Ok(id) => Some(id),
            Err(e) => self.report("upload_file", e),
        }
    }

    fn try_upload_file(&self, path: &Path) -> Result<String> {
        let bytes = std::fs::read(path).map_err(|e| ClientError::io(path, e))?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());

        let form = Form::new()
            .text("purpose", UPLOAD_PURPOSE)
            .part("file", Part::bytes(bytes).file_name(file_name.clone()));

        let url = self.config.endpoint(FILES_PATH);
        self.request_log
            .record("POST", FILES_PATH, &format!("file={}", file_name));
        tracing::info!(url = %url, file = %file_name, "uploading file");

        let response = self
            .http
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .multipart(form)
            .send()?;

        let result = read_json(response)?;
        if let Some(message) = api_error_message(&result) {
            return Err(ClientError::Api(message));
        }

        result
            .get("id")
            .and_then(|id| id.as_str())
            .map(str::to_string)
            .ok_or_else(|| ClientError::MissingContent("upload response has no file id".to_string()))
    }

    /// Send a plain chat request referencing an uploaded file.
    ///
    /// Returns the raw response JSON, which may itself carry an `error`.
    pub fn send_message_with_file(&self, messages: &[Message], file_id: &str) -> Option<Value> {
        let body = file_chat_request_body(&self.config.model, messages, Some(file_id));
        match self.post_chat(&body) {
            Ok(response) => Some(response),
            Err(e) => self.report("send_message_with_file", e),
        }
    }

    /// Upload `file_path` when given, send the messages and decode the
    /// structured output of the reply.
    pub fn perform_request(
        &self,
        messages: &[Message],
        file_path: Option<&Path>,
    ) -> Option<Map<String, Value>> {
        let response = match file_path {
            Some(path) => {
                let file_id = self.upload_file(path)?;
                self.send_message_with_file(messages, &file_id)?
            }
            None => {
                let body = file_chat_request_body(&self.config.model, messages, None);
                match self.post_chat(&body) {
                    Ok(response) => response,
                    Err(e) => return self.report("perform_request", e),
                }
            }
        };
        self.extract_structured_output(&response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_chat_request_body_with_file() {
        let messages = vec![Message::user("Extract the totals")];
        let body = file_chat_request_body("gpt-4o-mini", &messages, Some("file-abc"));
        assert_eq!(
            body,
            json!({
                "model": "gpt-4o-mini",
                "messages": [{ "role": "user", "content": "Extract the totals" }],
                "file_ids": ["file-abc"],
            })
        );
    }

    #[test]
    fn test_file_chat_request_body_without_file() {
        let body = file_chat_request_body("gpt-4o-mini", &[Message::user("hi")], None);
        assert!(body.get("file_ids").is_none());
    }
}
