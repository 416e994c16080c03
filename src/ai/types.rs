//! Chat message types
//!
//! Callers describe messages with plain text plus optional local attachments.
//! Before sending, attachments are read and inlined as content blocks.

use crate::ai::{ClientError, Result};
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Role of a message in a conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

impl MessageRole {
    /// Get the role as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageRole::System => "system",
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
        }
    }
}

/// A caller-side message with optional local attachments
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Role of the message sender
    pub role: MessageRole,
    /// Text content
    pub content: String,
    /// Local images inlined as base64 data URLs
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub image_files: Vec<PathBuf>,
    /// Local text files inlined as extra text blocks
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub text_files: Vec<PathBuf>,
}

impl Message {
    fn with_role(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            image_files: Vec::new(),
            text_files: Vec::new(),
        }
    }

    /// Create a system message
    pub fn system(content: impl Into<String>) -> Self {
        Self::with_role(MessageRole::System, content)
    }

    /// Create a user message
    pub fn user(content: impl Into<String>) -> Self {
        Self::with_role(MessageRole::User, content)
    }

    /// Create an assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::with_role(MessageRole::Assistant, content)
    }

    /// Attach a local image
    pub fn with_image(mut self, path: impl Into<PathBuf>) -> Self {
        self.image_files.push(path.into());
        self
    }

    /// Attach a local text file
    pub fn with_text_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.text_files.push(path.into());
        self
    }

    /// Rewrite into content blocks: the text first, then one block per
    /// image, then one block per text file, each group in attachment order.
    pub fn to_content_blocks(&self) -> Result<Vec<ContentBlock>> {
        let mut blocks = Vec::with_capacity(1 + self.image_files.len() + self.text_files.len());
        blocks.push(ContentBlock::text(&self.content));

        for path in &self.image_files {
            blocks.push(ContentBlock::image_url(image_data_url(path)?));
        }

        for path in &self.text_files {
            blocks.push(ContentBlock::text(inline_text_file(path)?));
        }

        Ok(blocks)
    }

    /// Wire form with content blocks
    pub fn to_request_message(&self) -> Result<RequestMessage> {
        Ok(RequestMessage {
            role: self.role,
            content: self.to_content_blocks()?,
        })
    }
}

/// One unit of a multi-part chat message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    /// Text content part
    Text { text: String },
    /// Image content part
    ImageUrl { image_url: ImageUrl },
}

impl ContentBlock {
    pub fn text(text: impl Into<String>) -> Self {
        ContentBlock::Text { text: text.into() }
    }

    pub fn image_url(url: impl Into<String>) -> Self {
        ContentBlock::ImageUrl {
            image_url: ImageUrl { url: url.into() },
        }
    }
}

/// Image reference, here always a `data:` URL
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageUrl {
    pub url: String,
}

/// Message as sent to the chat completions endpoint
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestMessage {
    pub role: MessageRole,
    pub content: Vec<ContentBlock>,
}

/// Message with plain string content, used by the file-id chat request
#[derive(Debug, Clone, Serialize)]
pub struct PlainMessage<'a> {
    pub role: MessageRole,
    pub content: &'a str,
}

impl<'a> From<&'a Message> for PlainMessage<'a> {
    fn from(message: &'a Message) -> Self {
        Self {
            role: message.role,
            content: &message.content,
        }
    }
}

/// Read an image and encode it as a base64 data URL
fn image_data_url(path: &Path) -> Result<String> {
    let mime = image_mime_for_path(path)
        .ok_or_else(|| ClientError::UnsupportedImage(path.display().to_string()))?;
    let bytes = std::fs::read(path).map_err(|e| ClientError::io(path, e))?;
    let b64 = base64::engine::general_purpose::STANDARD.encode(bytes);
    Ok(format!("data:{};base64,{}", mime, b64))
}

/// Read a text file and label it with its file name
fn inline_text_file(path: &Path) -> Result<String> {
    let contents = std::fs::read_to_string(path).map_err(|e| ClientError::io(path, e))?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    Ok(format!("{}:\n{}", name, contents))
}

/// Map an image file extension to the MIME type the vision API accepts.
fn image_mime_for_path(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        _ => None,
    }
}
