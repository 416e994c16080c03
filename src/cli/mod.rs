//! CLI subcommand definitions and handlers.
//!
//! Uses clap derive to define the subcommands:
//! - `speak` -- synthesize speech to a file and optionally play it
//! - `structured` -- request a strict structured output
//! - `upload` -- upload a file and print its id
//! - `version` -- print build/version info

use crate::ai::{FieldDescriptors, Message, OpenAiClient};
use crate::config::ClientConfig;
use crate::logging::LogFormat;
use crate::notify::NotificationMethod;
use crate::tts::DEFAULT_OUTPUT_FILE;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

/// Command-line helper for the OpenAI speech, chat and files endpoints.
#[derive(Parser, Debug)]
#[command(
    name = "openai-helper",
    version = env!("CARGO_PKG_VERSION"),
    about = "Text-to-speech, structured output and file upload against the OpenAI API"
)]
pub struct Cli {
    /// Where failures are reported: console, desktop or none.
    #[arg(long, global = true, default_value_t = NotificationMethod::Console)]
    pub notify: NotificationMethod,

    /// Log line format: text or json.
    #[arg(long, global = true, default_value = "text")]
    pub log_format: LogFormat,

    /// Log filter directive (overridden by RUST_LOG).
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Synthesize speech and save it under the audio directory.
    Speak {
        /// Text to speak.
        text: String,

        /// Output file name inside the audio directory.
        #[arg(short, long, default_value = DEFAULT_OUTPUT_FILE)]
        output: String,

        /// Do not play the file after saving it.
        #[arg(long)]
        no_play: bool,
    },

    /// Request a strict structured output and print it as JSON.
    Structured {
        /// JSON file holding an array of messages.
        #[arg(short, long)]
        messages: PathBuf,

        /// JSON file mapping field names to {"type", "description"}.
        #[arg(short, long)]
        fields: PathBuf,
    },

    /// Upload a file and print the assigned id.
    Upload {
        /// File to upload.
        path: PathBuf,
    },

    /// Print version, build date, and git commit information.
    Version,
}

// ---------------------------------------------------------------------------
// Subcommand handlers
// ---------------------------------------------------------------------------

/// Run a parsed command line. `Ok(false)` means the operation failed and was
/// already reported.
pub fn run(cli: Cli) -> Result<bool, Box<dyn std::error::Error>> {
    if let Command::Version = cli.command {
        handle_version();
        return Ok(true);
    }

    let config = ClientConfig::from_env()?.with_notification_method(cli.notify);
    let client = OpenAiClient::new(config)?;

    match cli.command {
        Command::Speak {
            text,
            output,
            no_play,
        } => Ok(handle_speak(&client, &text, &output, !no_play)),
        Command::Structured { messages, fields } => handle_structured(&client, &messages, &fields),
        Command::Upload { path } => Ok(handle_upload(&client, &path)),
        Command::Version => Ok(true),
    }
}

/// Run the `speak` subcommand.
pub fn handle_speak(client: &OpenAiClient, text: &str, output: &str, autoplay: bool) -> bool {
    match client.generate_speech(text, output, autoplay) {
        Some(path) => {
            println!("Audio saved to {}", path.display());
            true
        }
        None => false,
    }
}

/// Run the `structured` subcommand.
pub fn handle_structured(
    client: &OpenAiClient,
    messages_path: &Path,
    fields_path: &Path,
) -> Result<bool, Box<dyn std::error::Error>> {
    let messages: Vec<Message> = read_json_file(messages_path)?;
    let fields: FieldDescriptors = read_json_file(fields_path)?;

    match client.structured_request(&messages, &fields) {
        Some(output) => {
            println!("{}", serde_json::to_string_pretty(&output)?);
            Ok(true)
        }
        None => Ok(false),
    }
}

/// Run the `upload` subcommand.
pub fn handle_upload(client: &OpenAiClient, path: &Path) -> bool {
    match client.upload_file(path) {
        Some(id) => {
            println!("{}", id);
            true
        }
        None => false,
    }
}

/// Run the `version` subcommand.
pub fn handle_version() {
    println!("openai-helper {}", env!("CARGO_PKG_VERSION"));
    println!("  Build date: {}", env!("OPENAI_HELPER_BUILD_DATE"));
    println!("  Git commit: {}", env!("OPENAI_HELPER_GIT_HASH"));
    println!(
        "  Platform:   {} ({})",
        std::env::consts::OS,
        std::env::consts::ARCH
    );
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_json_file<T: serde::de::DeserializeOwned>(
    path: &Path,
) -> Result<T, Box<dyn std::error::Error>> {
    let data = std::fs::read_to_string(path)
        .map_err(|e| format!("failed to read {}: {}", path.display(), e))?;
    let value = serde_json::from_str(&data)
        .map_err(|e| format!("failed to parse {}: {}", path.display(), e))?;
    Ok(value)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
