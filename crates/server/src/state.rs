use completion::{CompletionConfig, OpenAiClient};
use poem_core::{GeneratorConfig, PoemError, PoemGenerator};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub generator: Arc<PoemGenerator>,
}

impl AppState {
    pub fn new(generator: PoemGenerator) -> Self {
        Self {
            generator: Arc::new(generator),
        }
    }

    /// State backed by an OpenAI-compatible completion API.
    pub fn with_openai(
        completion: CompletionConfig,
        generator: GeneratorConfig,
    ) -> Result<Self, PoemError> {
        tracing::info!(
            base_url = %completion.base_url,
            model = %generator.model,
            inspire_lines = generator.inspire_lines,
            "Using completion API"
        );

        let backend = Arc::new(OpenAiClient::new(completion));
        Ok(Self::new(PoemGenerator::new(backend, generator)?))
    }
}
