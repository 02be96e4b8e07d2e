//! TextGenerator trait definition.
//!
//! The backend is a long-lived collaborator: created once at startup, shared
//! across all requests, no explicit teardown.

use chatline_types::llm::{GenerationError, GenerationRequest};

/// Trait for text-generation backends.
///
/// `generate` returns the full text, echoed prompt included. Uses native
/// async fn in traits (RPITIT, Rust 2024 edition).
///
/// Implementations live in chatline-infra (e.g., `CompletionsGenerator`).
pub trait TextGenerator: Send + Sync {
    /// Human-readable backend name (e.g., "completions").
    fn name(&self) -> &str;

    /// Model identifier, for logs and spans.
    fn model(&self) -> &str;

    /// Continue the prompt.
    fn generate(
        &self,
        request: &GenerationRequest,
    ) -> impl std::future::Future<Output = Result<String, GenerationError>> + Send;
}
