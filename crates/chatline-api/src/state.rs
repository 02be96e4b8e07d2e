//! Application state wiring the conversation engine and delivery clients.
//!
//! AppState holds the concrete instances shared by the CLI and the HTTP
//! server. The engine is generic over its history and generation backends;
//! AppState pins it to the runtime-selected infra implementations.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use secrecy::SecretString;

use chatline_core::conversation::engine::ConversationEngine;
use chatline_core::llm::box_generator::BoxTextGenerator;
use chatline_infra::config::{load_config, resolve_history_path};
use chatline_infra::filesystem::{ensure_data_dir, resolve_data_dir};
use chatline_infra::history::{open_backend, AnyHistoryBackend};
use chatline_infra::llm::create_generator;
use chatline_infra::telegram::TelegramClient;
use chatline_types::config::ChatlineConfig;

/// The engine pinned to the infra backends.
pub type ConcreteEngine = ConversationEngine<AnyHistoryBackend, BoxTextGenerator>;

/// Credentials resolved from flags or the environment.
#[derive(Default)]
pub struct Credentials {
    pub telegram_token: Option<SecretString>,
    pub generation_api_key: Option<SecretString>,
}

/// Shared application state.
///
/// Cloned into every axum handler; everything heavy sits behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<ConcreteEngine>,
    pub telegram: Option<Arc<TelegramClient>>,
    pub config: Arc<ChatlineConfig>,
    /// Where history lives, for display ("memory" when ephemeral).
    pub history_location: String,
}

impl AppState {
    /// Initialize from the data directory: load config, open the history
    /// backend, and create the generation backend.
    ///
    /// With `ephemeral`, history is kept in memory only.
    pub async fn init(credentials: Credentials, ephemeral: bool) -> anyhow::Result<Self> {
        let data_dir = resolve_data_dir();
        ensure_data_dir(&data_dir)
            .await
            .with_context(|| format!("cannot create data directory {}", data_dir.display()))?;

        let config = load_config(&data_dir).await;

        let (backend, history_location) = if ephemeral {
            (AnyHistoryBackend::ephemeral(), "memory".to_string())
        } else {
            let path: PathBuf = resolve_history_path(&data_dir, &config);
            let backend = open_backend(config.history_backend, &path).await?;
            (backend, path.display().to_string())
        };
        tracing::debug!(backend = %config.history_backend, location = %history_location, "History backend opened");

        let generator = create_generator(&config.generation, credentials.generation_api_key)?;
        let engine = ConversationEngine::new(backend, generator, config.conversation.clone());

        let telegram = match credentials.telegram_token {
            Some(token) => Some(TelegramClient::new(token, &config.telegram)?),
            None => None,
        };

        Ok(Self::new(engine, telegram, config, history_location))
    }

    pub fn new(
        engine: ConcreteEngine,
        telegram: Option<TelegramClient>,
        config: ChatlineConfig,
        history_location: String,
    ) -> Self {
        Self {
            engine: Arc::new(engine),
            telegram: telegram.map(Arc::new),
            config: Arc::new(config),
            history_location,
        }
    }
}
