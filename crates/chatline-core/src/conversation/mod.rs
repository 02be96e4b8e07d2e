//! Conversation orchestration for Chatline.
//!
//! `ConversationEngine` is the single entry point the boundary layer calls:
//! it routes commands, keeps each user's history consistent across the
//! generation call, and degrades backend failures to plain-text replies.

pub mod engine;
pub mod locks;
