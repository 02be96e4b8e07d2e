//! Configuration types for Chatline.
//!
//! `ChatlineConfig` represents the top-level `config.toml` that controls the
//! conversation window, generation parameters, the history backend, and the
//! Telegram client. Every field has a default, so an empty file is a valid
//! configuration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Top-level configuration for a Chatline deployment.
///
/// Loaded from `{data_dir}/config.toml`. All fields have sensible defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatlineConfig {
    /// Which backend persists the history table.
    #[serde(default)]
    pub history_backend: HistoryBackendKind,

    /// History snapshot file (JSON backend) or database file (SQLite backend),
    /// relative to the data directory unless absolute.
    #[serde(default)]
    pub history_file: Option<String>,

    #[serde(default)]
    pub conversation: ConversationConfig,

    #[serde(default)]
    pub generation: GenerationConfig,

    #[serde(default)]
    pub telegram: TelegramConfig,
}

impl ChatlineConfig {
    /// History file name, defaulting per backend.
    pub fn history_file_name(&self) -> &str {
        match (&self.history_file, &self.history_backend) {
            (Some(name), _) => name,
            (None, HistoryBackendKind::Json) => "historial.json",
            (None, HistoryBackendKind::Sqlite) => "historial.db",
        }
    }
}

/// Storage backend for the history table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryBackendKind {
    #[default]
    Json,
    Sqlite,
}

impl fmt::Display for HistoryBackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HistoryBackendKind::Json => write!(f, "json"),
            HistoryBackendKind::Sqlite => write!(f, "sqlite"),
        }
    }
}

impl FromStr for HistoryBackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(HistoryBackendKind::Json),
            "sqlite" => Ok(HistoryBackendKind::Sqlite),
            other => Err(format!("invalid history backend: '{other}'")),
        }
    }
}

/// Parameters of the conversation pipeline.
///
/// One structure replaces the per-model copies of the bot that differed only
/// in window size, token budgets, and sampling settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationConfig {
    /// Number of non-system turns retained per user.
    #[serde(default = "default_window_size")]
    pub window_size: usize,

    #[serde(default = "default_temperature")]
    pub temperature: f64,

    #[serde(default = "default_top_p")]
    pub top_p: f64,

    /// Maximum number of new tokens the backend may generate per reply.
    #[serde(default = "default_max_response_tokens")]
    pub max_response_tokens: u32,

    /// Approximate token budget for the rendered prompt.
    #[serde(default = "default_max_prompt_tokens")]
    pub max_prompt_tokens: u32,

    #[serde(default = "default_sampling_enabled")]
    pub sampling_enabled: bool,

    /// Seconds before a generation call is abandoned.
    #[serde(default = "default_generation_timeout_secs")]
    pub generation_timeout_secs: u64,

    /// Content of the system turn that opens every transcript.
    #[serde(default = "default_system_persona")]
    pub system_persona: String,

    /// Sent when the model's reply is empty after trimming.
    #[serde(default = "default_fallback_reply")]
    pub fallback_reply: String,

    /// Sent when generation fails.
    #[serde(default = "default_apology_reply")]
    pub apology_reply: String,

    /// Sent after `/reset`.
    #[serde(default = "default_reset_confirmation")]
    pub reset_confirmation: String,
}

fn default_window_size() -> usize {
    5
}

fn default_temperature() -> f64 {
    0.7
}

fn default_top_p() -> f64 {
    0.9
}

fn default_max_response_tokens() -> u32 {
    100
}

fn default_max_prompt_tokens() -> u32 {
    256
}

fn default_sampling_enabled() -> bool {
    true
}

fn default_generation_timeout_secs() -> u64 {
    120
}

fn default_system_persona() -> String {
    "Eres un asistente útil y amable.".to_string()
}

fn default_fallback_reply() -> String {
    "🤖 No he entendido eso, ¿puedes repetirlo?".to_string()
}

fn default_apology_reply() -> String {
    "⚠️ Lo siento, no he podido generar una respuesta. Inténtalo de nuevo más tarde.".to_string()
}

fn default_reset_confirmation() -> String {
    "✅ Historial reiniciado.".to_string()
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            window_size: default_window_size(),
            temperature: default_temperature(),
            top_p: default_top_p(),
            max_response_tokens: default_max_response_tokens(),
            max_prompt_tokens: default_max_prompt_tokens(),
            sampling_enabled: default_sampling_enabled(),
            generation_timeout_secs: default_generation_timeout_secs(),
            system_persona: default_system_persona(),
            fallback_reply: default_fallback_reply(),
            apology_reply: default_apology_reply(),
            reset_confirmation: default_reset_confirmation(),
        }
    }
}

/// Connection settings for the text-completion backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Base URL of an OpenAI-compatible server (e.g. llama.cpp, vLLM).
    #[serde(default = "default_generation_base_url")]
    pub base_url: String,

    #[serde(default = "default_generation_model")]
    pub model: String,

    /// Whether to request `echo: true` and take the prompt back from the
    /// server. Off by default: llama.cpp does not echo, and servers that do
    /// may re-detokenize the prompt so it no longer matches byte for byte.
    /// When false the client prepends the prompt to the completion itself.
    #[serde(default = "default_echo_prompt")]
    pub echo_prompt: bool,
}

fn default_generation_base_url() -> String {
    "http://127.0.0.1:8080/v1".to_string()
}

fn default_generation_model() -> String {
    "TinyLlama/TinyLlama-1.1B-Chat-v1.0".to_string()
}

fn default_echo_prompt() -> bool {
    false
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            base_url: default_generation_base_url(),
            model: default_generation_model(),
            echo_prompt: default_echo_prompt(),
        }
    }
}

/// Telegram Bot API client settings. The bot token comes from the environment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    #[serde(default = "default_telegram_api_base")]
    pub api_base: String,

    /// `parse_mode` sent with every outgoing message; `None` sends plain text.
    #[serde(default = "default_parse_mode")]
    pub parse_mode: Option<String>,
}

fn default_telegram_api_base() -> String {
    "https://api.telegram.org".to_string()
}

fn default_parse_mode() -> Option<String> {
    Some("HTML".to_string())
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            api_base: default_telegram_api_base(),
            parse_mode: default_parse_mode(),
        }
    }
}
