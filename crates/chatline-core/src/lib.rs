//! Conversation pipeline and port traits for Chatline.
//!
//! This crate defines the "ports" (`HistoryBackend`, `TextGenerator`) that the
//! infrastructure layer implements, plus the pure conversation logic built on
//! them. It depends only on `chatline-types` -- never on `chatline-infra` or
//! any database/IO crate.

pub mod conversation;
pub mod history;
pub mod llm;
pub mod prompt;
