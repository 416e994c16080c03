//! Text-to-Speech (TTS) Module
//!
//! Generates speech through the OpenAI speech endpoint, saves it under the
//! configured audio directory and optionally plays it back.

pub mod player;

pub use player::{AudioPlayer, CommandPlayer, PlaybackError};

use crate::ai::{api_error_message, ClientError, OpenAiClient, Result};
use serde_json::{json, Value};
use std::path::{Component, Path, PathBuf};

pub const SPEECH_PATH: &str = "/audio/speech";

/// Default output file name
pub const DEFAULT_OUTPUT_FILE: &str = "output.mp3";

/// Request body for the speech endpoint
pub fn speech_request_body(model: &str, voice: &str, text: &str) -> Value {
    json!({
        "model": model,
        "voice": voice,
        "input": text,
    })
}

impl OpenAiClient {
    /// Synthesize `text`, write it to `<audio dir>/<file_name>` and play it
    /// when `autoplay` is set.
    ///
    /// Returns the written path. A playback failure is reported but the file
    /// is kept and its path still returned.
    pub fn generate_speech(&self, text: &str, file_name: &str, autoplay: bool) -> Option<PathBuf> {
        let path = match self.try_generate_speech(text, file_name) {
            Ok(path) => path,
            Err(e) => return self.report("generate_speech", e),
        };

        if autoplay {
            self.play_audio(&path);
        }
        Some(path)
    }

    fn try_generate_speech(&self, text: &str, file_name: &str) -> Result<PathBuf> {
        let output_path = output_path_in(&self.config.audio_dir, file_name)?;

        let body = speech_request_body(&self.config.tts_model, &self.config.tts_voice, text);
        let detail = format!("model={} voice={}", self.config.tts_model, self.config.tts_voice);
        let response = self.post_json(SPEECH_PATH, &body, &detail)?;

        let status = response.status();
        let bytes = response.bytes()?;
        if !status.is_success() {
            let message = serde_json::from_slice::<Value>(&bytes)
                .ok()
                .and_then(|v| api_error_message(&v))
                .unwrap_or_else(|| String::from_utf8_lossy(&bytes).trim().to_string());
            return Err(ClientError::Api(format!("{}: {}", status, message)));
        }

        if let Some(parent) = output_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ClientError::io(parent, e))?;
        }
        std::fs::write(&output_path, &bytes).map_err(|e| ClientError::io(&output_path, e))?;

        tracing::info!(path = %output_path.display(), bytes = bytes.len(), "speech written");
        Ok(output_path)
    }

    /// Play an audio file with the configured player. Returns whether
    /// playback succeeded; failures are reported.
    pub fn play_audio(&self, path: &Path) -> bool {
        match self.player.play(path) {
            Ok(()) => true,
            Err(e) => {
                self.report::<()>("play_audio", e.into());
                false
            }
        }
    }
}

/// Join `file_name` onto `dir`, refusing names that would land outside it.
fn output_path_in(dir: &Path, file_name: &str) -> Result<PathBuf> {
    let name = Path::new(file_name);
    let nested = name
        .components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
    if !nested || name.file_name().is_none() {
        return Err(ClientError::InvalidOutputName(file_name.to_string()));
    }
    Ok(dir.join(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_path_nests_under_dir() {
        let dir = Path::new("/srv/audio");
        assert_eq!(
            output_path_in(dir, "greeting.mp3").unwrap(),
            dir.join("greeting.mp3")
        );
        assert_eq!(
            output_path_in(dir, "daily/brief.mp3").unwrap(),
            dir.join("daily").join("brief.mp3")
        );
    }

    #[test]
    fn test_output_path_rejects_escaping_names() {
        let dir = Path::new("/srv/audio");
        for name in ["/tmp/escaped.mp3", "../escaped.mp3", "a/../../b.mp3", "", "."] {
            assert!(
                matches!(
                    output_path_in(dir, name),
                    Err(ClientError::InvalidOutputName(_))
                ),
                "accepted {:?}",
                name
            );
        }
    }

    #[test]
    fn test_speech_request_body() {
        assert_eq!(
            speech_request_body("tts-1-hd", "alloy", "Hello there"),
            json!({ "model": "tts-1-hd", "voice": "alloy", "input": "Hello there" })
        );
    }
}
