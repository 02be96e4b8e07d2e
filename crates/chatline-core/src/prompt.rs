//! Plain-text prompt rendering and reply extraction.
//!
//! A transcript renders as one `"<role>: <content>\n"` line per non-system
//! turn followed by a bare `"assistant:"` cue. The backend continues from the
//! cue and returns the echoed prompt plus its continuation; the reply is the
//! text after the prompt.
//!
//! ```text
//! user: hi
//! assistant: hello
//! assistant:
//! ```

use chatline_types::error::PromptError;
use chatline_types::transcript::{MessageRole, Transcript, Turn};
use tracing::debug;

/// Cue appended after the rendered turns.
pub const ASSISTANT_CUE: &str = "assistant:";

/// Rough bytes-per-token ratio used for the prompt budget.
const BYTES_PER_TOKEN: usize = 4;

/// Renders transcripts into prompts and extracts replies from raw output.
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    max_prompt_tokens: Option<u32>,
    fallback_reply: String,
}

impl PromptBuilder {
    /// A builder with no prompt budget.
    pub fn new(fallback_reply: impl Into<String>) -> Self {
        Self {
            max_prompt_tokens: None,
            fallback_reply: fallback_reply.into(),
        }
    }

    /// Limit the rendered prompt to roughly `max_prompt_tokens` tokens.
    pub fn with_max_prompt_tokens(mut self, max_prompt_tokens: u32) -> Self {
        self.max_prompt_tokens = Some(max_prompt_tokens);
        self
    }

    /// Render the transcript as a prompt.
    ///
    /// System turns are skipped. When a token budget is set and the full
    /// rendering exceeds it, the oldest turns are left out until it fits; the
    /// newest turn is always kept.
    pub fn build_prompt(&self, transcript: &Transcript) -> String {
        let lines: Vec<String> = transcript
            .iter()
            .filter(|t| t.role != MessageRole::System)
            .map(render_turn)
            .collect();

        let mut start = 0;
        if let Some(budget) = self.max_prompt_tokens {
            let budget_bytes = budget as usize * BYTES_PER_TOKEN;
            let mut total: usize = lines.iter().map(String::len).sum::<usize>() + ASSISTANT_CUE.len();
            while total > budget_bytes && start + 1 < lines.len() {
                total -= lines[start].len();
                start += 1;
            }
            if start > 0 {
                debug!(dropped = start, budget, "Prompt over budget, leaving out oldest turns");
            }
        }

        let mut prompt = lines[start..].concat();
        prompt.push_str(ASSISTANT_CUE);
        prompt
    }

    /// Extract the model's reply from raw backend output.
    ///
    /// Takes everything after the echoed prompt and trims it. An empty reply
    /// becomes the fallback text. Output that does not start with the prompt
    /// is rejected instead of being sliced at an arbitrary offset.
    pub fn extract_reply(&self, raw_output: &str, prompt: &str) -> Result<String, PromptError> {
        let continuation = raw_output
            .strip_prefix(prompt)
            .ok_or(PromptError::EchoMismatch)?;

        let reply = continuation.trim();
        if reply.is_empty() {
            Ok(self.fallback_reply.clone())
        } else {
            Ok(reply.to_string())
        }
    }
}

fn render_turn(turn: &Turn) -> String {
    format!("{}: {}\n", turn.role, turn.content)
}

/// Estimated token count of a prompt.
pub fn estimate_tokens(text: &str) -> u32 {
    text.len().div_ceil(BYTES_PER_TOKEN) as u32
}
