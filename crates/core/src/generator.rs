//! Poem generation on top of an opaque completion backend.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::domain::{PoemRequest, PoemResult, PoemVariant};
use crate::error::{GenerationError, PoemError};
use crate::prompts;
use crate::validator::validate_poem;

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DAILY_LINE_COUNT: usize = 6;
pub const ALLOWED_INSPIRE_LINE_COUNTS: &[usize] = &[4, 6];

/// A single prompt pair plus sampling parameters for the completion service.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub model: String,
    pub system: String,
    pub user: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

/// Remote text-completion service.
///
/// Implementations make exactly one call and return the first candidate's
/// text. No retries.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn complete(&self, request: CompletionRequest) -> Result<String, GenerationError>;
}

/// Anything that can hand back a poem for a variant: the in-process
/// generator, or a remote poem API.
#[async_trait]
pub trait PoemSource: Send + Sync {
    async fn fetch_poem(
        &self,
        variant: PoemVariant,
        request: &PoemRequest,
    ) -> Result<PoemResult, GenerationError>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Model name passed through to the completion service
    pub model: String,
    /// Line count of the free-form variant (4 or 6)
    pub inspire_lines: usize,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            inspire_lines: 6,
        }
    }
}

impl GeneratorConfig {
    pub fn validate(&self) -> Result<(), PoemError> {
        if !ALLOWED_INSPIRE_LINE_COUNTS.contains(&self.inspire_lines) {
            return Err(PoemError::InvalidConfig(format!(
                "inspire_lines must be one of {:?}, got {}",
                ALLOWED_INSPIRE_LINE_COUNTS, self.inspire_lines
            )));
        }
        if self.model.trim().is_empty() {
            return Err(PoemError::InvalidConfig("model must not be empty".into()));
        }
        Ok(())
    }
}

pub struct PoemGenerator {
    backend: Arc<dyn CompletionBackend>,
    config: GeneratorConfig,
}

impl PoemGenerator {
    pub fn new(backend: Arc<dyn CompletionBackend>, config: GeneratorConfig) -> Result<Self, PoemError> {
        config.validate()?;
        Ok(Self { backend, config })
    }

    pub fn expected_lines(&self, variant: PoemVariant) -> usize {
        match variant {
            PoemVariant::Inspire => self.config.inspire_lines,
            PoemVariant::Daily => DAILY_LINE_COUNT,
        }
    }

    pub fn build_request(&self, variant: PoemVariant, request: &PoemRequest) -> CompletionRequest {
        let lines = self.expected_lines(variant);
        let (system, user, max_tokens, temperature) = match variant {
            PoemVariant::Inspire => (
                prompts::inspire_system_prompt(lines),
                prompts::inspire_user_prompt(request.input(), lines),
                100,
                0.7,
            ),
            PoemVariant::Daily => (
                prompts::DAILY_SYSTEM_PROMPT.to_string(),
                prompts::DAILY_USER_PROMPT.to_string(),
                120,
                0.6,
            ),
        };

        CompletionRequest {
            model: self.config.model.clone(),
            system,
            user,
            max_tokens,
            temperature,
        }
    }

    pub async fn generate(
        &self,
        variant: PoemVariant,
        request: &PoemRequest,
    ) -> Result<PoemResult, GenerationError> {
        let expected = self.expected_lines(variant);
        let completion = self.build_request(variant, request);

        debug!(variant = variant.as_str(), model = %completion.model, "Calling completion service");
        let text = self.backend.complete(completion).await?;

        let poem = match validate_poem(&text, expected) {
            Ok(poem) => poem,
            Err(e) => {
                warn!(variant = variant.as_str(), error = %e, "Invalid poem format");
                return Err(e);
            }
        };

        debug!(variant = variant.as_str(), lines = ?poem.lines(), "Processed poem lines");
        Ok(poem)
    }
}

#[async_trait]
impl PoemSource for PoemGenerator {
    async fn fetch_poem(
        &self,
        variant: PoemVariant,
        request: &PoemRequest,
    ) -> Result<PoemResult, GenerationError> {
        self.generate(variant, request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct StubBackend {
        reply: Result<String, GenerationError>,
        seen: Mutex<Vec<CompletionRequest>>,
    }

    impl StubBackend {
        fn replying(reply: Result<String, GenerationError>) -> Arc<Self> {
            Arc::new(Self {
                reply,
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl CompletionBackend for StubBackend {
        async fn complete(&self, request: CompletionRequest) -> Result<String, GenerationError> {
            self.seen.lock().unwrap().push(request);
            self.reply.clone()
        }
    }

    fn generator(backend: Arc<StubBackend>, inspire_lines: usize) -> PoemGenerator {
        let config = GeneratorConfig {
            inspire_lines,
            ..Default::default()
        };
        PoemGenerator::new(backend, config).unwrap()
    }

    #[test]
    fn test_config_rejects_unsupported_line_count() {
        let config = GeneratorConfig {
            inspire_lines: 5,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(PoemError::InvalidConfig(_))));
        assert!(GeneratorConfig::default().validate().is_ok());
    }

    #[tokio::test]
    async fn test_generate_returns_validated_lines() {
        let backend = StubBackend::replying(Ok("Line1\nLine2\n\nLine3\nLine4\nLine5\nLine6\n".into()));
        let generator = generator(backend.clone(), 6);

        let request = PoemRequest::new("hope").unwrap();
        let poem = generator.generate(PoemVariant::Inspire, &request).await.unwrap();

        assert_eq!(poem.len(), 6);
        assert_eq!(poem.lines()[2], "Line3");

        let seen = backend.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert!(seen[0].user.contains("\"hope\""));
        assert_eq!(seen[0].max_tokens, 100);
        assert_eq!(seen[0].model, DEFAULT_MODEL);
    }

    #[tokio::test]
    async fn test_generate_rejects_wrong_shape() {
        let backend = StubBackend::replying(Ok("1\n2\n3\n4\n5".into()));
        let generator = generator(backend, 6);

        let request = PoemRequest::new("hope").unwrap();
        let err = generator.generate(PoemVariant::Inspire, &request).await.unwrap_err();
        assert_eq!(
            err,
            GenerationError::MalformedResponse {
                expected: 6,
                actual: 5
            }
        );
    }

    #[tokio::test]
    async fn test_four_line_variant() {
        let backend = StubBackend::replying(Ok("a\nb\nc\nd".into()));
        let generator = generator(backend.clone(), 4);

        let request = PoemRequest::new("rain").unwrap();
        let poem = generator.generate(PoemVariant::Inspire, &request).await.unwrap();
        assert_eq!(poem.len(), 4);
        assert!(backend.seen.lock().unwrap()[0].user.contains("exactly 4 lines"));
    }

    #[tokio::test]
    async fn test_daily_always_expects_six_lines() {
        let backend = StubBackend::replying(Ok("a\nb\nc\nd".into()));
        let generator = generator(backend.clone(), 4);

        let err = generator
            .fetch_poem(PoemVariant::Daily, &PoemRequest::daily())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "malformed_response");

        let seen = backend.seen.lock().unwrap();
        assert_eq!(seen[0].user, prompts::DAILY_USER_PROMPT);
        assert_eq!(seen[0].max_tokens, 120);
    }

    #[tokio::test]
    async fn test_transport_failure_is_passed_through() {
        let backend = StubBackend::replying(Err(GenerationError::Transport("connection reset".into())));
        let generator = generator(backend, 6);

        let request = PoemRequest::new("hope").unwrap();
        let err = generator.generate(PoemVariant::Inspire, &request).await.unwrap_err();
        assert_eq!(err.kind(), "transport");
    }
}
