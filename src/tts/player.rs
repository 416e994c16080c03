//! Local audio playback
//!
//! Playback is delegated to an OS-level player program (`afplay` on macOS
//! by default).

use std::path::Path;
use std::process::{Command, Stdio};
use thiserror::Error;

/// Playback errors
#[derive(Error, Debug)]
pub enum PlaybackError {
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with {status}: {stderr}")]
    Failed {
        program: String,
        status: std::process::ExitStatus,
        stderr: String,
    },
}

/// Something that can play an audio file
pub trait AudioPlayer: Send + Sync {
    /// Play the file, blocking until playback ends
    fn play(&self, path: &Path) -> Result<(), PlaybackError>;
}

/// Plays audio by running `<program> <path>`
#[derive(Debug, Clone)]
pub struct CommandPlayer {
    program: String,
}

impl CommandPlayer {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

impl AudioPlayer for CommandPlayer {
    fn play(&self, path: &Path) -> Result<(), PlaybackError> {
        tracing::info!(program = %self.program, path = %path.display(), "playing audio");

        let output = Command::new(&self.program)
            .arg(path)
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .map_err(|source| PlaybackError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(PlaybackError::Failed {
                program: self.program.clone(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_program_is_spawn_error() {
        let player = CommandPlayer::new("definitely-not-an-audio-player-xyz");
        let result = player.play(Path::new("out.mp3"));
        assert!(matches!(result, Err(PlaybackError::Spawn { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn test_successful_program() {
        let player = CommandPlayer::new("true");
        assert!(player.play(Path::new("out.mp3")).is_ok());
    }

    #[cfg(unix)]
    #[test]
    fn test_failing_program() {
        let player = CommandPlayer::new("false");
        assert!(matches!(
            player.play(Path::new("out.mp3")),
            Err(PlaybackError::Failed { .. })
        ));
    }
}
