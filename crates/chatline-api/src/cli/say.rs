//! `chatline say`: one conversation turn from the terminal.

use anyhow::Result;
use console::style;

use chatline_types::error::ConversationError;

use crate::state::AppState;

pub async fn say(state: &AppState, user_id: &str, message: &str, json: bool) -> Result<()> {
    let (reply, persisted) = match state.engine.handle_message(user_id, message).await {
        Ok(reply) => (reply, true),
        Err(ConversationError::NotPersisted { reply, source }) => {
            tracing::warn!(error = %source, "History was not saved");
            (Some(reply), false)
        }
        Err(e) => return Err(e.into()),
    };

    if json {
        let result = serde_json::json!({
            "user_id": user_id,
            "reply": reply,
            "persisted": persisted,
        });
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    match reply {
        Some(reply) => {
            println!();
            println!("  {} {}", style("bot").cyan().bold(), reply);
            if !persisted {
                println!(
                    "  {}",
                    style("(history could not be saved)").yellow()
                );
            }
            println!();
        }
        None => {
            println!();
            println!("  {} Nothing to send.", style("i").blue().bold());
            println!();
        }
    }

    Ok(())
}
