//! Chatline CLI, Telegram webhook, and JSON API entry point.
//!
//! Binary name: `chatline`
//!
//! Parses CLI arguments, sets up tracing, builds the conversation engine,
//! then dispatches to the command handler or starts the HTTP server.

mod cli;
mod http;
mod state;

#[cfg(test)]
mod test_support;

use clap::Parser;
use clap_complete::generate;
use secrecy::SecretString;

use chatline_observe::tracing_setup::{init_tracing, shutdown_tracing, TracingOptions};

use cli::{Cli, Commands};
use state::{AppState, Credentials};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut tracing_options = TracingOptions::from_verbosity(cli.verbose, cli.quiet);
    tracing_options.json = cli.log_json;
    tracing_options.otel = cli.otel;
    init_tracing(&tracing_options)
        .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

    let result = run(cli).await;
    shutdown_tracing();
    result
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    // Shell completions don't need app state
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "chatline", &mut std::io::stdout());
        return Ok(());
    }

    let generation_api_key = cli.generation_api_key.map(SecretString::from);

    match cli.command {
        Commands::Serve {
            port,
            host,
            telegram_token,
        } => {
            let telegram_token = telegram_token.map(SecretString::from);
            if telegram_token.is_none() {
                tracing::warn!("TELEGRAM_TOKEN not set, replies will not be delivered to Telegram");
            }

            let state = AppState::init(
                Credentials {
                    telegram_token,
                    generation_api_key,
                },
                false,
            )
            .await?;

            let addr = format!("{host}:{port}");
            let listener = tokio::net::TcpListener::bind(&addr).await?;

            if !cli.quiet {
                println!(
                    "  {} Chatline listening on {}",
                    console::style("⚡").bold(),
                    console::style(format!("http://{addr}")).cyan()
                );
                println!(
                    "  {} history: {}",
                    console::style("•").dim(),
                    state.history_location
                );
                println!("  {}", console::style("Press Ctrl+C to stop").dim());
            }

            let router = http::router::build_router(state);

            axum::serve(listener, router)
                .with_graceful_shutdown(shutdown_signal())
                .await?;

            if !cli.quiet {
                println!("\n  Server stopped.");
            }
        }

        Commands::Say {
            user,
            ephemeral,
            message,
        } => {
            let state = AppState::init(
                Credentials {
                    telegram_token: None,
                    generation_api_key,
                },
                ephemeral,
            )
            .await?;
            cli::say::say(&state, &user, &message.join(" "), cli.json).await?;
        }

        Commands::History { action } => {
            let state = AppState::init(
                Credentials {
                    telegram_token: None,
                    generation_api_key,
                },
                false,
            )
            .await?;
            cli::history::handle_history_command(action, &state, cli.json).await?;
        }

        Commands::Completions { .. } => unreachable!("handled above"),
    }

    Ok(())
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("Shutting down");
}
