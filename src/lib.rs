//! openai-helper library
//!
//! A small blocking client for the OpenAI API: text-to-speech with optional
//! local playback, strict structured output requests with inlined image and
//! text attachments, and file upload.
//!
//! ```no_run
//! use openai_helper::ai::{FieldDescriptor, FieldDescriptors, Message, OpenAiClient};
//!
//! let client = OpenAiClient::from_env().expect("OPENAI_API_KEY must be set");
//!
//! let mut fields = FieldDescriptors::new();
//! fields.insert("city".to_string(), FieldDescriptor::string("City named in the text"));
//!
//! let messages = vec![Message::user("I flew into Oslo last night.")];
//! if let Some(output) = client.structured_request(&messages, &fields) {
//!     println!("{:?}", output.get("city"));
//! }
//! ```

pub mod ai;
pub mod cli;
pub mod config;
pub mod files;
pub mod logging;
pub mod notify;
pub mod tts;
