//! HTTP layer for Chatline.
//!
//! Axum server with the Telegram webhook at `/webhook`, liveness checks, and
//! a JSON API at `/api/v1/` using the envelope response format.

pub mod error;
pub mod handlers;
pub mod response;
pub mod router;
