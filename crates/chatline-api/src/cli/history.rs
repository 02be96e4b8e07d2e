//! History CLI subcommands (list, show, reset).

use anyhow::Result;
use clap::Subcommand;
use comfy_table::{presets, Cell, Color, ContentArrangement, Table};
use console::style;

use chatline_types::transcript::{MessageRole, Transcript};

use crate::state::AppState;

/// Longest content shown in a table cell.
const PREVIEW_CHARS: usize = 60;

#[derive(Subcommand)]
pub enum HistoryCommand {
    /// List users with stored history.
    #[command(alias = "ls")]
    List,

    /// Show one user's transcript.
    Show {
        /// User id.
        user: String,
    },

    /// Clear one user's transcript back to the system persona.
    Reset {
        /// User id.
        user: String,
    },
}

pub async fn handle_history_command(cmd: HistoryCommand, state: &AppState, json: bool) -> Result<()> {
    match cmd {
        HistoryCommand::List => list(state, json).await,
        HistoryCommand::Show { user } => show(state, &user, json).await,
        HistoryCommand::Reset { user } => reset(state, &user, json).await,
    }
}

fn preview(text: &str) -> String {
    let one_line = text.replace('\n', " ");
    if one_line.chars().count() > PREVIEW_CHARS {
        let cut: String = one_line.chars().take(PREVIEW_CHARS - 3).collect();
        format!("{cut}...")
    } else {
        one_line
    }
}

fn role_color(role: MessageRole) -> Color {
    match role {
        MessageRole::System => Color::DarkGrey,
        MessageRole::User => Color::Cyan,
        MessageRole::Assistant => Color::Green,
    }
}

async fn list(state: &AppState, json: bool) -> Result<()> {
    let table_data = state.engine.store().load().await;

    if json {
        let users: Vec<serde_json::Value> = table_data
            .iter()
            .map(|(user_id, t)| {
                serde_json::json!({
                    "user_id": user_id,
                    "turns": t.len(),
                    "last": t.last().map(|turn| turn.content.as_str()),
                })
            })
            .collect();
        let result = serde_json::json!({ "users": users, "count": users.len() });
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    if table_data.is_empty() {
        println!();
        println!(
            "  {} No stored history in {}.",
            style("i").blue().bold(),
            style(&state.history_location).dim(),
        );
        println!();
        return Ok(());
    }

    println!();
    println!(
        "  History in {} ({} users)",
        style(&state.history_location).cyan(),
        table_data.len(),
    );
    println!();

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("User").fg(Color::White),
        Cell::new("Turns").fg(Color::White),
        Cell::new("Last message").fg(Color::White),
    ]);

    for (user_id, t) in table_data.iter() {
        let last = t.last().map(|turn| preview(&turn.content)).unwrap_or_default();
        table.add_row(vec![
            Cell::new(user_id).fg(Color::Cyan),
            Cell::new(t.len()),
            Cell::new(last).fg(Color::DarkGrey),
        ]);
    }

    println!("{table}");
    println!();
    Ok(())
}

fn transcript_table(transcript: &Transcript) -> Table {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("#").fg(Color::White),
        Cell::new("Role").fg(Color::White),
        Cell::new("Content").fg(Color::White),
    ]);
    for (i, turn) in transcript.iter().enumerate() {
        table.add_row(vec![
            Cell::new(i),
            Cell::new(turn.role).fg(role_color(turn.role)),
            Cell::new(&turn.content),
        ]);
    }
    table
}

async fn show(state: &AppState, user_id: &str, json: bool) -> Result<()> {
    let transcript = state.engine.transcript(user_id).await;

    if json {
        let result = serde_json::json!({ "user_id": user_id, "turns": transcript });
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    println!();
    println!(
        "  Transcript for {} ({} of {} turns kept)",
        style(user_id).cyan(),
        transcript.conversation().len(),
        state.engine.store().window_size(),
    );
    println!();
    println!("{}", transcript_table(&transcript));
    println!();
    Ok(())
}

async fn reset(state: &AppState, user_id: &str, json: bool) -> Result<()> {
    let message = state.engine.reset(user_id).await?;

    if json {
        let result = serde_json::json!({ "user_id": user_id, "message": message });
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!();
        println!("  {} {}", style("ok").green(), message);
        println!();
    }
    Ok(())
}
