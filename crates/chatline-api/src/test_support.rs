//! Fixtures for HTTP and CLI tests.

use secrecy::SecretString;

use chatline_core::conversation::engine::ConversationEngine;
use chatline_core::llm::box_generator::BoxTextGenerator;
use chatline_core::llm::generator::TextGenerator;
use chatline_infra::history::AnyHistoryBackend;
use chatline_infra::telegram::TelegramClient;
use chatline_types::config::{ChatlineConfig, TelegramConfig};
use chatline_types::llm::{GenerationError, GenerationRequest};

use crate::http::router::build_router;
use crate::state::{AppState, ConcreteEngine};

pub const PERSONA: &str = "Eres un asistente útil y amable.";

/// Echoes the prompt and always continues with " buenas".
pub struct CannedGenerator;

impl TextGenerator for CannedGenerator {
    fn name(&self) -> &str {
        "canned"
    }

    fn model(&self) -> &str {
        "canned-model"
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        Ok(format!("{} buenas", request.prompt))
    }
}

fn test_engine(config: &ChatlineConfig) -> ConcreteEngine {
    ConversationEngine::new(
        AnyHistoryBackend::ephemeral(),
        BoxTextGenerator::new(CannedGenerator),
        config.conversation.clone(),
    )
}

/// In-memory history, canned generator, no Telegram delivery.
pub fn test_state() -> AppState {
    let config = ChatlineConfig::default();
    AppState::new(test_engine(&config), None, config, "memory".to_string())
}

/// Like [`test_state`], with a Telegram client whose API host refuses
/// connections.
pub async fn test_state_with_unreachable_telegram() -> AppState {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let config = ChatlineConfig::default();
    let telegram = TelegramClient::new(
        SecretString::from("1:test"),
        &TelegramConfig {
            api_base: format!("http://{addr}"),
            parse_mode: Some("HTML".to_string()),
        },
    )
    .unwrap();
    AppState::new(test_engine(&config), Some(telegram), config, "memory".to_string())
}

/// Serve the router on an ephemeral local port and return its base URL.
pub async fn spawn_app(state: AppState) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, build_router(state)).await.unwrap();
    });
    format!("http://{addr}")
}
