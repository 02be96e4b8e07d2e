//! Conversation engine for Chatline.
//!
//! ConversationEngine runs one exchange: append the user turn, render the
//! prompt, call the generation backend, extract the reply, append the
//! assistant turn. The user's lock is held for the whole exchange so that a
//! second message from the same user waits until the first reply is stored.

use std::time::Duration;

use chatline_types::config::ConversationConfig;
use chatline_types::error::{ConversationError, HistoryError};
use chatline_types::llm::{GenerationError, GenerationRequest};
use chatline_types::transcript::{MessageRole, Transcript, Turn};
use tracing::{Instrument, debug, info, info_span, warn};

use crate::history::backend::HistoryBackend;
use crate::history::store::HistoryStore;
use crate::llm::generator::TextGenerator;
use crate::prompt::{PromptBuilder, estimate_tokens};

use super::locks::UserLocks;

/// Command that clears a user's history.
pub const RESET_COMMAND: &str = "/reset";

/// Whether `text` is the reset command (trimmed, case-insensitive).
pub fn is_reset_command(text: &str) -> bool {
    text.trim().eq_ignore_ascii_case(RESET_COMMAND)
}

/// Orchestrates history, prompt rendering, and generation for every user.
pub struct ConversationEngine<B: HistoryBackend, G: TextGenerator> {
    store: HistoryStore<B>,
    generator: G,
    prompts: PromptBuilder,
    locks: UserLocks,
    config: ConversationConfig,
}

impl<B: HistoryBackend, G: TextGenerator> ConversationEngine<B, G> {
    /// Create an engine over a history backend and a generation backend.
    pub fn new(backend: B, generator: G, config: ConversationConfig) -> Self {
        let store = HistoryStore::new(backend, config.window_size, config.system_persona.clone());
        let prompts = PromptBuilder::new(config.fallback_reply.clone())
            .with_max_prompt_tokens(config.max_prompt_tokens);
        Self {
            store,
            generator,
            prompts,
            locks: UserLocks::new(),
            config,
        }
    }

    pub fn store(&self) -> &HistoryStore<B> {
        &self.store
    }

    /// Route an inbound message.
    ///
    /// `/reset` goes to [`Self::reset`], anything else to [`Self::respond`]
    /// with surrounding whitespace removed. Blank messages are ignored and
    /// yield `Ok(None)`.
    pub async fn handle_message(
        &self,
        user_id: &str,
        text: &str,
    ) -> Result<Option<String>, ConversationError> {
        let text = text.trim();
        if text.is_empty() {
            debug!(user_id, "Ignoring blank message");
            return Ok(None);
        }

        if is_reset_command(text) {
            self.reset(user_id).await.map(Some)
        } else {
            self.respond(user_id, text).await.map(Some)
        }
    }

    /// Produce a reply to `message` and record the exchange.
    ///
    /// Generation failures (backend error, timeout, prompt not echoed) yield
    /// the apology text and leave no assistant turn behind. If history cannot
    /// be written, the reply is still produced from the in-memory transcript
    /// and returned inside [`ConversationError::NotPersisted`].
    pub async fn respond(&self, user_id: &str, message: &str) -> Result<String, ConversationError> {
        let _user = self.locks.acquire(user_id).await;

        let mut write_error: Option<HistoryError> = None;
        let transcript = match self
            .store
            .append_turn(user_id, MessageRole::User, message)
            .await
        {
            Ok(transcript) => transcript,
            Err(e) => {
                warn!(user_id, error = %e, "Failed to persist user turn, continuing in memory");
                write_error = Some(e);
                let current = self.store.get_transcript(user_id).await;
                self.store.preview_append(current, Turn::user(message))
            }
        };

        let prompt = self.prompts.build_prompt(&transcript);
        debug!(
            user_id,
            turns = transcript.len(),
            prompt_tokens = estimate_tokens(&prompt),
            "Prompt built"
        );

        let reply = match self.generate_reply(&prompt).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!(user_id, error = %e, "Generation failed, sending apology");
                let apology = self.config.apology_reply.clone();
                return match write_error {
                    Some(source) => Err(ConversationError::NotPersisted {
                        reply: apology,
                        source,
                    }),
                    None => Ok(apology),
                };
            }
        };

        // Without the user turn on disk, storing the reply would leave an
        // orphaned assistant turn.
        if write_error.is_none() {
            if let Err(e) = self
                .store
                .append_turn(user_id, MessageRole::Assistant, reply.as_str())
                .await
            {
                warn!(user_id, error = %e, "Failed to persist assistant turn");
                write_error = Some(e);
            }
        }

        match write_error {
            Some(source) => Err(ConversationError::NotPersisted { reply, source }),
            None => {
                info!(user_id, reply_len = reply.len(), "Replied");
                Ok(reply)
            }
        }
    }

    /// Clear the user's history back to the system turn.
    pub async fn reset(&self, user_id: &str) -> Result<String, ConversationError> {
        let _user = self.locks.acquire(user_id).await;
        self.store.reset_transcript(user_id).await?;
        info!(user_id, "History reset");
        Ok(self.config.reset_confirmation.clone())
    }

    /// The user's current transcript (fresh system transcript if unseen).
    pub async fn transcript(&self, user_id: &str) -> Transcript {
        self.store.get_transcript(user_id).await
    }

    async fn generate_reply(&self, prompt: &str) -> Result<String, GenerationError> {
        let request = GenerationRequest {
            prompt: prompt.to_string(),
            max_new_tokens: self.config.max_response_tokens,
            temperature: self.config.temperature,
            top_p: self.config.top_p,
            sampling_enabled: self.config.sampling_enabled,
        };

        let span = info_span!(
            "gen_ai.generate",
            gen_ai.operation.name = "text_completion",
            gen_ai.system = self.generator.name(),
            gen_ai.request.model = self.generator.model(),
            gen_ai.request.max_tokens = request.max_new_tokens,
            gen_ai.request.temperature = request.temperature,
        );

        let secs = self.config.generation_timeout_secs;
        let raw = if secs == 0 {
            self.generator.generate(&request).instrument(span).await?
        } else {
            tokio::time::timeout(
                Duration::from_secs(secs),
                self.generator.generate(&request).instrument(span),
            )
            .await
            .map_err(|_| GenerationError::Timeout { secs })??
        };

        self.prompts
            .extract_reply(&raw, prompt)
            .map_err(|_| GenerationError::EchoMismatch)
    }
}
