use async_trait::async_trait;
use poem_core::{CompletionBackend, CompletionRequest, GenerationError};
use reqwest::Client;
use tracing::{debug, error, warn};

use crate::error::{CompletionError, CompletionResult};
use crate::types::*;
use crate::CompletionConfig;

/// Client for an OpenAI-compatible chat completions API.
///
/// One request per call. Failures are returned as-is, never retried.
#[derive(Clone)]
pub struct OpenAiClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl OpenAiClient {
    pub fn new(config: CompletionConfig) -> Self {
        Self {
            client: Client::new(),
            api_key: config.api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn chat_completion(
        &self,
        messages: Vec<ChatMessage>,
        model: &str,
        temperature: Option<f32>,
        max_tokens: Option<u32>,
    ) -> CompletionResult<String> {
        debug!(
            "Creating chat completion with {} messages, model {}",
            messages.len(),
            model
        );

        let request = ChatCompletionRequest {
            model: model.to_string(),
            messages,
            temperature,
            max_tokens,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();

            if status.as_u16() == 429 {
                warn!("Rate limited by completion API");
                return Err(CompletionError::RateLimited);
            }

            if let Ok(error_resp) = serde_json::from_str::<ApiErrorBody>(&error_text) {
                error!(
                    "Completion API error: {} (type: {:?})",
                    error_resp.error.message, error_resp.error.error_type
                );
                return Err(CompletionError::Api {
                    message: error_resp.error.message,
                    status_code: Some(status.as_u16()),
                });
            }

            return Err(CompletionError::Api {
                message: error_text,
                status_code: Some(status.as_u16()),
            });
        }

        let chat_response: ChatCompletionResponse = response.json().await?;

        if let Some(usage) = &chat_response.usage {
            debug!(
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "Completion received"
            );
        }

        chat_response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content.unwrap_or_default())
            .ok_or(CompletionError::NoChoices)
    }
}

#[async_trait]
impl CompletionBackend for OpenAiClient {
    async fn complete(&self, request: CompletionRequest) -> Result<String, GenerationError> {
        let messages = vec![
            ChatMessage::system(request.system),
            ChatMessage::user(request.user),
        ];

        self.chat_completion(
            messages,
            &request.model,
            Some(request.temperature),
            Some(request.max_tokens),
        )
        .await
        .map_err(|e| GenerationError::Transport(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> OpenAiClient {
        OpenAiClient::new(CompletionConfig {
            api_key: "test-key".to_string(),
            base_url: server.uri(),
        })
    }

    fn completion_body(content: serde_json::Value) -> serde_json::Value {
        json!({
            "id": "chatcmpl-123",
            "model": "gpt-4o-mini",
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": content},
                "finish_reason": "stop"
            }],
            "usage": {"prompt_tokens": 50, "completion_tokens": 40, "total_tokens": 90}
        })
    }

    #[test]
    fn test_client_creation_trims_trailing_slash() {
        let client = OpenAiClient::new(CompletionConfig {
            api_key: "test-key".to_string(),
            base_url: "https://api.openai.com/v1/".to_string(),
        });
        assert_eq!(client.api_key, "test-key");
        assert_eq!(client.base_url(), "https://api.openai.com/v1");
    }

    #[tokio::test]
    async fn test_chat_completion_returns_first_choice() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("Authorization", "Bearer test-key"))
            .and(body_partial_json(json!({"model": "gpt-4o-mini", "max_tokens": 100})))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion_body(json!("a\nb"))))
            .expect(1)
            .mount(&server)
            .await;

        let text = client_for(&server)
            .chat_completion(
                vec![ChatMessage::user("hope")],
                "gpt-4o-mini",
                Some(0.7),
                Some(100),
            )
            .await
            .unwrap();
        assert_eq!(text, "a\nb");
    }

    #[tokio::test]
    async fn test_null_content_becomes_empty_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion_body(json!(null))))
            .mount(&server)
            .await;

        let text = client_for(&server)
            .chat_completion(vec![ChatMessage::user("hope")], "gpt-4o-mini", None, None)
            .await
            .unwrap();
        assert_eq!(text, "");
    }

    #[tokio::test]
    async fn test_empty_choices() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .chat_completion(vec![ChatMessage::user("hope")], "gpt-4o-mini", None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, CompletionError::NoChoices));
    }

    #[tokio::test]
    async fn test_api_error_is_parsed_and_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({
                "error": {"message": "The server had an error", "type": "server_error"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let err = client_for(&server)
            .chat_completion(vec![ChatMessage::user("hope")], "gpt-4o-mini", None, None)
            .await
            .unwrap_err();
        match err {
            CompletionError::Api {
                message,
                status_code,
            } => {
                assert_eq!(message, "The server had an error");
                assert_eq!(status_code, Some(500));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_rate_limit() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(429))
            .expect(1)
            .mount(&server)
            .await;

        let err = client_for(&server)
            .chat_completion(vec![ChatMessage::user("hope")], "gpt-4o-mini", None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, CompletionError::RateLimited));
    }

    #[tokio::test]
    async fn test_backend_sends_prompt_pair_and_maps_errors() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(body_partial_json(json!({
                "messages": [
                    {"role": "system", "content": "be a poet"},
                    {"role": "user", "content": "write"}
                ],
                "max_tokens": 120
            })))
            .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
            .mount(&server)
            .await;

        let request = CompletionRequest {
            model: "gpt-4o-mini".to_string(),
            system: "be a poet".to_string(),
            user: "write".to_string(),
            max_tokens: 120,
            temperature: 0.6,
        };

        let err = client_for(&server).complete(request).await.unwrap_err();
        assert_eq!(err.kind(), "transport");
        assert!(err.to_string().contains("unavailable"));
    }
}
