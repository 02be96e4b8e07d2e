//! Text-generation backends.
//!
//! Concrete implementations of the [`TextGenerator`] trait defined in
//! `chatline-core`.
//!
//! [`TextGenerator`]: chatline_core::llm::generator::TextGenerator

pub mod completions;

use secrecy::SecretString;

use chatline_core::llm::box_generator::BoxTextGenerator;
use chatline_types::config::GenerationConfig;
use chatline_types::llm::GenerationError;

use self::completions::CompletionsGenerator;

/// Create the configured backend as a [`BoxTextGenerator`].
pub fn create_generator(
    config: &GenerationConfig,
    api_key: Option<SecretString>,
) -> Result<BoxTextGenerator, GenerationError> {
    let generator = CompletionsGenerator::new(config, api_key)?;
    tracing::info!(
        backend = "completions",
        base_url = %config.base_url,
        model = %config.model,
        "Generation backend ready"
    );
    Ok(BoxTextGenerator::new(generator))
}
