//! Infrastructure layer for Chatline.
//!
//! Contains implementations of the ports defined in `chatline-core`: JSON file
//! and SQLite history backends, the OpenAI-compatible completions client, the
//! Telegram Bot API client, and config/data-dir resolution.

pub mod config;
pub mod filesystem;
pub mod history;
pub mod llm;
pub mod sqlite;
pub mod telegram;

#[cfg(test)]
pub(crate) mod test_support;
