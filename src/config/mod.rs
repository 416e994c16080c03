//! Client configuration
//!
//! Static settings read once (normally from the environment) and handed to
//! [`crate::ai::OpenAiClient`] by value. Nothing here changes after the
//! client is built.

use crate::notify::NotificationMethod;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Environment variable holding the bearer token
pub const ENV_API_KEY: &str = "OPENAI_API_KEY";
/// Environment variable overriding the chat model
pub const ENV_MODEL: &str = "GPT_MODEL";
/// Environment variable overriding the speech output directory
pub const ENV_AUDIO_PATH: &str = "OPENAI_AUDIO_PATH";
/// Environment variable overriding the request log file
pub const ENV_REQUEST_LOG: &str = "OPENAI_REQUEST_LOG";
/// Environment variable overriding the API base URL
pub const ENV_BASE_URL: &str = "OPENAI_BASE_URL";

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_TTS_MODEL: &str = "tts-1-hd";
pub const DEFAULT_TTS_VOICE: &str = "alloy";
pub const DEFAULT_PLAYER_COMMAND: &str = "afplay";

/// Configuration errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("OPENAI_API_KEY is not set")]
    MissingApiKey,

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Settings for [`crate::ai::OpenAiClient`]
#[derive(Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Bearer token for the `Authorization` header
    pub api_key: String,
    /// Chat completion model
    #[serde(default = "default_model")]
    pub model: String,
    /// Text-to-speech model
    #[serde(default = "default_tts_model")]
    pub tts_model: String,
    /// Text-to-speech voice
    #[serde(default = "default_tts_voice")]
    pub tts_voice: String,
    /// API root, endpoints are appended to it
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Directory speech files are written to
    pub audio_dir: PathBuf,
    /// Append-only request log
    pub request_log: PathBuf,
    /// Where failures are reported
    #[serde(default)]
    pub notification_method: NotificationMethod,
    /// Program used for autoplay
    #[serde(default = "default_player_command")]
    pub player_command: String,
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_key", &"[REDACTED]")
            .field("model", &self.model)
            .field("tts_model", &self.tts_model)
            .field("tts_voice", &self.tts_voice)
            .field("base_url", &self.base_url)
            .field("audio_dir", &self.audio_dir)
            .field("request_log", &self.request_log)
            .field("notification_method", &self.notification_method)
            .field("player_command", &self.player_command)
            .finish()
    }
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_tts_model() -> String {
    DEFAULT_TTS_MODEL.to_string()
}

fn default_tts_voice() -> String {
    DEFAULT_TTS_VOICE.to_string()
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_player_command() -> String {
    DEFAULT_PLAYER_COMMAND.to_string()
}

/// `~/Local Resources/API Logs`, falling back to the working directory
fn api_logs_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("Local Resources")
        .join("API Logs")
}

/// Default speech output directory
pub fn default_audio_dir() -> PathBuf {
    api_logs_dir().join("OpenAI Whisper")
}

/// Default request log location
pub fn default_request_log() -> PathBuf {
    api_logs_dir().join("openai_requests.log")
}

impl ClientConfig {
    /// Create a config with the given key and default everything else
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: default_model(),
            tts_model: default_tts_model(),
            tts_voice: default_tts_voice(),
            base_url: default_base_url(),
            audio_dir: default_audio_dir(),
            request_log: default_request_log(),
            notification_method: NotificationMethod::default(),
            player_command: default_player_command(),
        }
    }

    /// Load from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using an arbitrary variable lookup.
    ///
    /// Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_key = get(ENV_API_KEY).ok_or(ConfigError::MissingApiKey)?;
        let mut config = Self::new(api_key);

        if let Some(model) = get(ENV_MODEL) {
            config.model = model;
        }
        if let Some(dir) = get(ENV_AUDIO_PATH) {
            config.audio_dir = PathBuf::from(dir);
        }
        if let Some(path) = get(ENV_REQUEST_LOG) {
            config.request_log = PathBuf::from(path);
        }
        if let Some(url) = get(ENV_BASE_URL) {
            config.base_url = url;
        }

        Ok(config)
    }

    /// Set the chat model
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the TTS model
    pub fn with_tts_model(mut self, model: impl Into<String>) -> Self {
        self.tts_model = model.into();
        self
    }

    /// Set the TTS voice
    pub fn with_tts_voice(mut self, voice: impl Into<String>) -> Self {
        self.tts_voice = voice.into();
        self
    }

    /// Set the API root
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the speech output directory
    pub fn with_audio_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.audio_dir = dir.into();
        self
    }

    /// Set the request log file
    pub fn with_request_log(mut self, path: impl Into<PathBuf>) -> Self {
        self.request_log = path.into();
        self
    }

    /// Set the notification method
    pub fn with_notification_method(mut self, method: NotificationMethod) -> Self {
        self.notification_method = method;
        self
    }

    /// Set the autoplay program
    pub fn with_player_command(mut self, command: impl Into<String>) -> Self {
        self.player_command = command.into();
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_key.trim().is_empty() {
            return Err(ConfigError::MissingApiKey);
        }
        if self.model.trim().is_empty() {
            return Err(ConfigError::Invalid("model must not be empty".to_string()));
        }
        if self.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid("base URL must not be empty".to_string()));
        }
        Ok(())
    }

    /// Full URL for an endpoint path such as `/chat/completions`
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}
