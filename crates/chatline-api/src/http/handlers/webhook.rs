//! Telegram webhook receiver.
//!
//! Decodes the update, runs it through the conversation engine, and delivers
//! the reply with `sendMessage`. Always answers `200 "ok"`: Telegram retries
//! any other status, which would replay the message into the history.

use axum::body::Bytes;
use axum::extract::State;
use tracing::{debug, info, warn};

use chatline_types::telegram::{InboundText, Update};

use crate::state::AppState;

/// POST /webhook - Receive a Telegram update.
pub async fn telegram_webhook(State(state): State<AppState>, body: Bytes) -> &'static str {
    let update: Update = match serde_json::from_slice(&body) {
        Ok(update) => update,
        Err(e) => {
            debug!(error = %e, "Ignoring undecodable update");
            return "ok";
        }
    };
    info!(update_id = update.update_id, "Update received");

    let Some(inbound) = update.text_message() else {
        debug!(update_id = update.update_id, "Update carries no text message");
        return "ok";
    };

    handle_inbound(&state, inbound).await;
    "ok"
}

async fn handle_inbound(state: &AppState, inbound: InboundText) {
    info!(user_id = %inbound.user_id, chat_id = inbound.chat_id, "Message received");

    let reply = match state
        .engine
        .handle_message(&inbound.user_id, &inbound.text)
        .await
    {
        Ok(Some(reply)) => reply,
        Ok(None) => return,
        Err(e) => match e.reply() {
            Some(reply) => {
                warn!(user_id = %inbound.user_id, error = %e, "Delivering reply that was not saved");
                reply.to_string()
            }
            None => {
                warn!(user_id = %inbound.user_id, error = %e, "Message dropped");
                return;
            }
        },
    };

    let Some(telegram) = &state.telegram else {
        warn!(chat_id = inbound.chat_id, "No Telegram token configured, reply not delivered");
        return;
    };
    if let Err(e) = telegram.send_message(inbound.chat_id, &reply).await {
        warn!(chat_id = inbound.chat_id, error = %e, "Failed to deliver reply");
    }
}
