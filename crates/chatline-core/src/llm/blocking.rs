//! Adapter for synchronous generation backends.
//!
//! In-process model inference is CPU/GPU bound and blocks the calling thread.
//! `BlockingGenerator` moves each call onto tokio's blocking pool so the async
//! runtime keeps serving other users while a reply is being generated.

use std::sync::Arc;

use chatline_types::llm::{GenerationError, GenerationRequest};

use super::generator::TextGenerator;

/// A backend whose `generate` blocks until the text is ready.
pub trait SyncTextGenerator: Send + Sync + 'static {
    fn name(&self) -> &str;

    fn model(&self) -> &str;

    fn generate_blocking(&self, request: &GenerationRequest) -> Result<String, GenerationError>;
}

/// Runs a [`SyncTextGenerator`] on the blocking thread pool.
pub struct BlockingGenerator<G: SyncTextGenerator> {
    inner: Arc<G>,
}

impl<G: SyncTextGenerator> BlockingGenerator<G> {
    pub fn new(generator: G) -> Self {
        Self {
            inner: Arc::new(generator),
        }
    }
}

impl<G: SyncTextGenerator> TextGenerator for BlockingGenerator<G> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn model(&self) -> &str {
        self.inner.model()
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        let inner = Arc::clone(&self.inner);
        let request = request.clone();
        tokio::task::spawn_blocking(move || inner.generate_blocking(&request))
            .await
            .map_err(|e| GenerationError::Backend {
                message: format!("generation task failed: {e}"),
            })?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Upper;

    impl SyncTextGenerator for Upper {
        fn name(&self) -> &str {
            "upper"
        }

        fn model(&self) -> &str {
            "upper-1"
        }

        fn generate_blocking(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
            std::thread::sleep(std::time::Duration::from_millis(5));
            Ok(format!("{} {}", request.prompt, "HI"))
        }
    }

    struct Panics;

    impl SyncTextGenerator for Panics {
        fn name(&self) -> &str {
            "panics"
        }

        fn model(&self) -> &str {
            "panics-1"
        }

        fn generate_blocking(&self, _request: &GenerationRequest) -> Result<String, GenerationError> {
            panic!("out of memory");
        }
    }

    fn request() -> GenerationRequest {
        GenerationRequest {
            prompt: "assistant:".to_string(),
            max_new_tokens: 5,
            temperature: 0.7,
            top_p: 0.9,
            sampling_enabled: false,
        }
    }

    #[tokio::test]
    async fn test_blocking_generator_runs_off_runtime() {
        let g = BlockingGenerator::new(Upper);
        assert_eq!(g.name(), "upper");
        assert_eq!(g.generate(&request()).await.unwrap(), "assistant: HI");
    }

    #[tokio::test]
    async fn test_panicking_backend_becomes_error() {
        let g = BlockingGenerator::new(Panics);
        let err = g.generate(&request()).await.unwrap_err();
        assert!(matches!(err, GenerationError::Backend { .. }));
    }
}
