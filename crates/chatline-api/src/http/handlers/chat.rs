//! JSON chat endpoint.
//!
//! - POST /api/v1/chat - Run one message through the engine.

use std::time::Instant;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use chatline_types::error::ConversationError;

use crate::http::error::AppError;
use crate::http::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub user_id: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ChatReply {
    /// `None` when the message was blank.
    pub reply: Option<String>,
    /// Whether the exchange was saved to history.
    pub persisted: bool,
}

/// POST /api/v1/chat - Send a message as `user_id`.
///
/// `/reset` is routed like on the webhook. A reply produced while history
/// could not be saved is still returned, with `persisted: false`.
pub async fn chat(
    State(state): State<AppState>,
    Json(body): Json<ChatRequest>,
) -> Result<ApiResponse<ChatReply>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let user_id = body.user_id.trim();
    if user_id.is_empty() {
        return Err(AppError::Validation("user_id is required".to_string()));
    }

    let data = match state.engine.handle_message(user_id, &body.message).await {
        Ok(reply) => ChatReply {
            reply,
            persisted: true,
        },
        Err(ConversationError::NotPersisted { reply, source }) => {
            tracing::warn!(user_id, error = %source, "Reply returned without saving history");
            ChatReply {
                reply: Some(reply),
                persisted: false,
            }
        }
        Err(e) => return Err(e.into()),
    };

    let elapsed = start.elapsed().as_millis() as u64;
    Ok(ApiResponse::success(data, request_id, elapsed))
}
