//! Shared domain types for Chatline.
//!
//! This crate contains the core domain types used across the Chatline workspace:
//! turns and transcripts, generation requests, configuration, Telegram update
//! shapes, and their associated error types.
//!
//! Zero infrastructure dependencies -- only serde and thiserror.

pub mod config;
pub mod error;
pub mod llm;
pub mod telegram;
pub mod transcript;
