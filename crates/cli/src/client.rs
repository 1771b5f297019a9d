//! HTTP client for the poem API, standing in for the browser front end.

use async_trait::async_trait;
use poem_core::{GenerationError, PoemRequest, PoemResult, PoemSource, PoemVariant};
use reqwest::Client;
use serde_json::json;
use server::error::ErrorResponse;
use server::routes::PoemResponse;
use tracing::debug;

#[derive(Clone)]
pub struct HttpPoemSource {
    client: Client,
    server_url: String,
}

impl HttpPoemSource {
    pub fn new(server_url: impl Into<String>) -> Self {
        let server_url: String = server_url.into();
        Self {
            client: Client::new(),
            server_url: server_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    fn endpoint_url(&self, variant: PoemVariant) -> String {
        format!("{}/api/{}", self.server_url, variant.endpoint())
    }
}

#[async_trait]
impl PoemSource for HttpPoemSource {
    async fn fetch_poem(
        &self,
        variant: PoemVariant,
        request: &PoemRequest,
    ) -> Result<PoemResult, GenerationError> {
        let url = self.endpoint_url(variant);
        debug!(%url, input = request.input(), "Requesting poem");

        let response = self
            .client
            .post(&url)
            .json(&json!({ "input": request.input() }))
            .send()
            .await
            .map_err(|e| GenerationError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.error)
                .unwrap_or(body);
            return Err(GenerationError::Transport(format!(
                "{} returned {}: {}",
                variant.endpoint(),
                status.as_u16(),
                message
            )));
        }

        let body: PoemResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::Transport(e.to_string()))?;

        Ok(PoemResult::new(body.poem))
    }
}
