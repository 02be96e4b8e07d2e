//! CompletionsGenerator -- [`TextGenerator`] over an OpenAI-compatible
//! `/completions` endpoint (llama.cpp server, vLLM, TGI's OpenAI shim).
//!
//! The engine expects the prompt followed by the continuation. By default the
//! prompt is prepended here; with `echo_prompt = true` the server is asked
//! for `echo: true` and its text is returned as is.
//!
//! The optional bearer token is a [`SecretString`] and is only exposed while
//! building request headers.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use chatline_core::llm::generator::TextGenerator;
use chatline_types::config::GenerationConfig;
use chatline_types::llm::{GenerationError, GenerationRequest};

/// HTTP-level ceiling; the engine applies its own, usually shorter, timeout.
const HTTP_TIMEOUT: Duration = Duration::from_secs(300);

#[derive(Debug, Serialize)]
struct CompletionsBody<'a> {
    model: &'a str,
    prompt: &'a str,
    max_tokens: u32,
    temperature: f64,
    top_p: f64,
    echo: bool,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct CompletionsResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    text: String,
}

// No Debug derive: keeps the API key out of any formatted output.
pub struct CompletionsGenerator {
    client: reqwest::Client,
    api_key: Option<SecretString>,
    base_url: String,
    model: String,
    echo_prompt: bool,
}

impl CompletionsGenerator {
    pub fn new(
        config: &GenerationConfig,
        api_key: Option<SecretString>,
    ) -> Result<Self, GenerationError> {
        let client = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(|e| GenerationError::Unavailable(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            echo_prompt: config.echo_prompt,
        })
    }

    fn url(&self) -> String {
        format!("{}/completions", self.base_url)
    }

    fn to_body<'a>(&'a self, request: &'a GenerationRequest) -> CompletionsBody<'a> {
        // Greedy decoding: temperature 0 with the full nucleus.
        let (temperature, top_p) = if request.sampling_enabled {
            (request.temperature, request.top_p)
        } else {
            (0.0, 1.0)
        };

        CompletionsBody {
            model: &self.model,
            prompt: &request.prompt,
            max_tokens: request.max_new_tokens,
            temperature,
            top_p,
            echo: self.echo_prompt,
            stream: false,
        }
    }

    /// Full text as the engine expects it: prompt followed by continuation.
    fn assemble(&self, prompt: &str, text: String) -> String {
        if self.echo_prompt {
            text
        } else {
            let mut full = String::with_capacity(prompt.len() + text.len());
            full.push_str(prompt);
            full.push_str(&text);
            full
        }
    }
}

impl TextGenerator for CompletionsGenerator {
    fn name(&self) -> &str {
        "completions"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        let mut builder = self.client.post(self.url()).json(&self.to_body(request));
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key.expose_secret());
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_connect() {
                GenerationError::Unavailable(format!("cannot reach {}: {e}", self.base_url))
            } else {
                GenerationError::Backend {
                    message: format!("HTTP request failed: {e}"),
                }
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(match status.as_u16() {
                401 | 403 => GenerationError::Unavailable(format!("authentication failed: {error_body}")),
                503 => GenerationError::Unavailable(error_body),
                _ => GenerationError::Backend {
                    message: format!("HTTP {status}: {error_body}"),
                },
            });
        }

        let parsed: CompletionsResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::Deserialization(format!("failed to parse response: {e}")))?;

        let text = parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.text)
            .ok_or_else(|| GenerationError::Deserialization("response has no choices".to_string()))?;

        tracing::debug!(model = %self.model, chars = text.len(), "Completion received");
        Ok(self.assemble(&request.prompt, text))
    }
}
