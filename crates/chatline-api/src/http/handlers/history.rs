//! History inspection endpoints.
//!
//! - GET  /api/v1/history/{user_id}       - Current transcript
//! - POST /api/v1/history/{user_id}/reset - Clear back to the system turn

use std::time::Instant;

use axum::extract::{Path, State};
use serde::Serialize;
use uuid::Uuid;

use chatline_types::transcript::Transcript;

use crate::http::error::AppError;
use crate::http::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HistoryView {
    pub user_id: String,
    pub turns: Transcript,
}

#[derive(Debug, Serialize)]
pub struct ResetView {
    pub user_id: String,
    pub message: String,
}

/// GET /api/v1/history/{user_id}
///
/// Unknown users get the fresh system-only transcript; nothing is written.
pub async fn get_history(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> ApiResponse<HistoryView> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let turns = state.engine.transcript(&user_id).await;

    let elapsed = start.elapsed().as_millis() as u64;
    ApiResponse::success(HistoryView { user_id, turns }, request_id, elapsed)
}

/// POST /api/v1/history/{user_id}/reset
pub async fn reset_history(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<ApiResponse<ResetView>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let message = state.engine.reset(&user_id).await?;

    let elapsed = start.elapsed().as_millis() as u64;
    Ok(ApiResponse::success(
        ResetView { user_id, message },
        request_id,
        elapsed,
    ))
}
