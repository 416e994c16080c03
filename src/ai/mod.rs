//! OpenAI API client
//!
//! [`OpenAiClient`] turns a handful of high-level calls into single blocking
//! HTTPS requests. Every public operation returns `Option`: a failure is
//! reported once through the client's [`Notifier`] and the caller gets `None`.

pub mod extract;
pub mod schema;
pub mod types;

pub use extract::{api_error_message, extract_structured_output};
pub use schema::{build_strict_schema, response_format, FieldDescriptor, FieldDescriptors, FieldType};
pub use types::*;

use crate::config::{ClientConfig, ConfigError};
use crate::logging::RequestLog;
use crate::notify::Notifier;
use crate::tts::{AudioPlayer, CommandPlayer, PlaybackError};
use serde_json::{json, Map, Value};
use std::path::Path;

pub const CHAT_COMPLETIONS_PATH: &str = "/chat/completions";

/// Errors raised while talking to the API
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("{0}")]
    Api(String),

    #[error("failed to decode JSON: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("structured output is not a JSON object (got {0})")]
    SchemaMismatch(String),

    #[error("{0}")]
    MissingContent(String),

    #[error("unsupported image type: {0}")]
    UnsupportedImage(String),

    #[error("output name must be relative to the audio directory: {0}")]
    InvalidOutputName(String),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("audio playback failed: {0}")]
    Playback(#[from] PlaybackError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl ClientError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        ClientError::Io {
            path: path.display().to_string(),
            source,
        }
    }

    /// Notification title for this kind of failure
    pub fn title(&self) -> &'static str {
        match self {
            ClientError::Transport(_) => "API Request Failed",
            ClientError::Api(_) => "API Error",
            ClientError::Decode(_) => "JSON Parsing Error",
            ClientError::SchemaMismatch(_) => "Schema Validation Failed",
            ClientError::MissingContent(_) => "Invalid Response",
            ClientError::UnsupportedImage(_)
            | ClientError::InvalidOutputName(_)
            | ClientError::Io { .. } => "File Error",
            ClientError::Playback(_) => "Audio Playback Error",
            ClientError::Config(_) => "Configuration Error",
        }
    }
}

/// Result type for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// Blocking client for the speech, chat and files endpoints
pub struct OpenAiClient {
    pub(crate) config: ClientConfig,
    pub(crate) http: reqwest::blocking::Client,
    pub(crate) notifier: Notifier,
    pub(crate) request_log: RequestLog,
    pub(crate) player: Box<dyn AudioPlayer>,
}

impl OpenAiClient {
    /// Build a client. Fails when the configuration is invalid, most
    /// importantly when the API key is missing.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let player = CommandPlayer::new(config.player_command.clone());
        Self::with_player(config, Box::new(player))
    }

    /// Build a client from environment variables
    pub fn from_env() -> Result<Self> {
        Self::new(ClientConfig::from_env()?)
    }

    /// Build a client with a custom audio player
    pub fn with_player(config: ClientConfig, player: Box<dyn AudioPlayer>) -> Result<Self> {
        config.validate()?;

        let http = reqwest::blocking::Client::builder().build()?;
        let notifier = Notifier::new(config.notification_method);
        let request_log = RequestLog::new(config.request_log.clone());

        Ok(Self {
            config,
            http,
            notifier,
            request_log,
            player,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    /// Notify about a failed operation and yield `None`
    pub(crate) fn report<T>(&self, operation: &str, err: ClientError) -> Option<T> {
        tracing::debug!(operation = operation, error = ?err, "operation failed");
        self.notifier.notify(err.title(), &err.to_string());
        None
    }

    /// POST a JSON body with the bearer token
    pub(crate) fn post_json(
        &self,
        path: &str,
        body: &Value,
        detail: &str,
    ) -> Result<reqwest::blocking::Response> {
        let url = self.config.endpoint(path);
        self.request_log.record("POST", path, detail);
        tracing::info!(url = %url, "sending request");

        let response = self
            .http
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .header("Content-Type", "application/json")
            .json(body)
            .send()?;

        tracing::debug!(status = %response.status(), "response received");
        Ok(response)
    }

    /// Send a chat completion request and return the raw response JSON
    pub(crate) fn post_chat(&self, body: &Value) -> Result<Value> {
        let detail = format!("model={}", self.config.model);
        let response = self.post_json(CHAT_COMPLETIONS_PATH, body, &detail)?;
        read_json(response)
    }

    /// Request a strict structured output and decode it.
    ///
    /// Each message's attachments are inlined, the field descriptors become a
    /// strict JSON Schema and the decoded object is returned.
    pub fn structured_request(
        &self,
        messages: &[Message],
        fields: &FieldDescriptors,
    ) -> Option<Map<String, Value>> {
        let response = match self.try_structured_request(messages, fields) {
            Ok(response) => response,
            Err(e) => return self.report("structured_request", e),
        };
        self.extract_structured_output(&response)
    }

    fn try_structured_request(
        &self,
        messages: &[Message],
        fields: &FieldDescriptors,
    ) -> Result<Value> {
        let body = structured_request_body(&self.config.model, messages, fields)?;
        self.post_chat(&body)
    }

    /// Decode the structured output of a chat response, reporting failures
    pub fn extract_structured_output(&self, response: &Value) -> Option<Map<String, Value>> {
        match extract_structured_output(response) {
            Ok(map) => Some(map),
            Err(e) => self.report("extract_structured_output", e),
        }
    }
}

impl std::fmt::Debug for OpenAiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiClient")
            .field("model", &self.config.model)
            .field("base_url", &self.config.base_url)
            .field("notification_method", &self.notifier.method())
            .finish_non_exhaustive()
    }
}

/// Request body for a strict structured output chat completion
pub fn structured_request_body(
    model: &str,
    messages: &[Message],
    fields: &FieldDescriptors,
) -> Result<Value> {
    let messages = messages
        .iter()
        .map(Message::to_request_message)
        .collect::<Result<Vec<_>>>()?;

    Ok(json!({
        "model": model,
        "messages": messages,
        "response_format": response_format(fields),
    }))
}

/// Parse a response body as JSON.
///
/// Error statuses usually carry a JSON `error` payload, which is returned
/// as-is for the caller to inspect. A non-JSON error body becomes an API error.
pub(crate) fn read_json(response: reqwest::blocking::Response) -> Result<Value> {
    let status = response.status();
    let text = response.text()?;
    match serde_json::from_str::<Value>(&text) {
        Ok(value) => Ok(value),
        Err(e) if status.is_success() => Err(ClientError::Decode(e)),
        Err(_) => Err(ClientError::Api(format!("{}: {}", status, text.trim()))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::NotificationMethod;

    fn test_config() -> ClientConfig {
        ClientConfig::new("sk-test")
            .with_notification_method(NotificationMethod::None)
            .with_request_log(std::env::temp_dir().join("openai-helper-unit.log"))
    }

    #[test]
    fn test_new_rejects_missing_key() {
        let result = OpenAiClient::new(ClientConfig::new(""));
        assert!(matches!(
            result,
            Err(ClientError::Config(ConfigError::MissingApiKey))
        ));
    }

    #[test]
    fn test_structured_request_body_shape() {
        let mut fields = FieldDescriptors::new();
        fields.insert("answer".to_string(), FieldDescriptor::string("The answer"));
        let messages = vec![Message::system("Be terse"), Message::user("2+2?")];

        let body = structured_request_body("gpt-4o-mini", &messages, &fields).unwrap();

        assert_eq!(body["model"], "gpt-4o-mini");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(
            body["messages"][1]["content"],
            json!([{ "type": "text", "text": "2+2?" }])
        );
        assert_eq!(body["response_format"]["type"], "json_schema");
        assert_eq!(body["response_format"]["json_schema"]["strict"], true);
        assert_eq!(
            body["response_format"]["json_schema"]["schema"]["required"],
            json!(["answer"])
        );
    }

    #[test]
    fn test_extract_reports_once_on_failure() {
        let client = OpenAiClient::new(test_config()).unwrap();
        let response = json!({ "error": { "message": "bad key" } });

        assert!(client.extract_structured_output(&response).is_none());
        assert_eq!(client.notifier().count(), 1);
    }

    #[test]
    fn test_extract_success_does_not_notify() {
        let client = OpenAiClient::new(test_config()).unwrap();
        let response = json!({
            "choices": [{ "message": { "role": "assistant", "content": "{\"a\": 1}" } }]
        });

        let map = client.extract_structured_output(&response).unwrap();
        assert_eq!(map.get("a"), Some(&json!(1)));
        assert_eq!(client.notifier().count(), 0);
    }

    #[test]
    fn test_error_titles() {
        assert_eq!(ClientError::Api("x".into()).title(), "API Error");
        assert_eq!(
            ClientError::SchemaMismatch("array".into()).title(),
            "Schema Validation Failed"
        );
        assert_eq!(
            ClientError::InvalidOutputName("/tmp/x.mp3".into()).title(),
            "File Error"
        );
        assert_eq!(
            ClientError::Config(ConfigError::MissingApiKey).title(),
            "Configuration Error"
        );
    }

    #[test]
    fn test_debug_hides_api_key() {
        let client = OpenAiClient::new(test_config()).unwrap();
        let debug = format!("{:?}", client);
        assert!(!debug.contains("sk-test"));
        assert!(debug.contains("gpt-4o-mini"));
    }
}
