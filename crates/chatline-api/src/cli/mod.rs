//! CLI command definitions for the `chatline` binary.

pub mod history;
pub mod say;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

use self::history::HistoryCommand;

/// Conversational Telegram bot backed by a local text-generation model.
#[derive(Parser)]
#[command(name = "chatline", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Export spans through OpenTelemetry (stdout exporter).
    #[arg(long, global = true)]
    pub otel: bool,

    /// Bearer token for the generation server, if it requires one.
    #[arg(long, env = "CHATLINE_GENERATION_API_KEY", hide_env_values = true, global = true)]
    pub generation_api_key: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the webhook and JSON API server.
    Serve {
        /// Port to listen on.
        #[arg(long, env = "PORT", default_value_t = 5000)]
        port: u16,

        /// Host to bind to.
        #[arg(long, default_value = "0.0.0.0")]
        host: String,

        /// Telegram bot token used to deliver replies.
        #[arg(long, env = "TELEGRAM_TOKEN", hide_env_values = true)]
        telegram_token: Option<String>,
    },

    /// Send one message as a user and print the reply.
    Say {
        /// User id the message is attributed to.
        #[arg(long, short)]
        user: String,

        /// Keep history in memory only.
        #[arg(long)]
        ephemeral: bool,

        /// Message text (joined with spaces).
        #[arg(required = true, num_args = 1..)]
        message: Vec<String>,
    },

    /// Inspect or clear stored conversation history.
    History {
        #[command(subcommand)]
        action: HistoryCommand,
    },

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}
