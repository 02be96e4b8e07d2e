//! Generation request types for Chatline.
//!
//! These types model the data shapes exchanged with a text-generation backend:
//! the role of a conversation turn, the request parameters, and error handling.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Role of a turn in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageRole::System => write!(f, "system"),
            MessageRole::User => write!(f, "user"),
            MessageRole::Assistant => write!(f, "assistant"),
        }
    }
}

impl FromStr for MessageRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "system" => Ok(MessageRole::System),
            "user" => Ok(MessageRole::User),
            "assistant" => Ok(MessageRole::Assistant),
            other => Err(format!("invalid message role: '{other}'")),
        }
    }
}

/// Request to a text-generation backend.
///
/// The backend continues `prompt` and returns the full text, echoed prompt
/// included.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub prompt: String,
    /// Upper bound on newly generated tokens (not counting the prompt).
    pub max_new_tokens: u32,
    pub temperature: f64,
    /// Nucleus sampling cutoff. Ignored when sampling is disabled.
    pub top_p: f64,
    /// `false` requests greedy decoding.
    pub sampling_enabled: bool,
}

/// Errors from generation backend operations.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("backend error: {message}")]
    Backend { message: String },

    #[error("generation timed out after {secs}s")]
    Timeout { secs: u64 },

    #[error("backend did not echo the prompt")]
    EchoMismatch,

    #[error("deserialization error: {0}")]
    Deserialization(String),

    #[error("backend unavailable: {0}")]
    Unavailable(String),
}
