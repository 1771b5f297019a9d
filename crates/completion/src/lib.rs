//! Chat-completions client used to generate poems.

pub mod client;
pub mod error;
pub mod types;

pub use client::OpenAiClient;
pub use error::{CompletionError, CompletionResult};
pub use types::ChatMessage;

use serde::{Deserialize, Serialize};

pub const API_KEY_ENV: &str = "OPENAI_API_KEY";
pub const BASE_URL_ENV: &str = "OPENAI_BASE_URL";
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Connection settings for the completion API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionConfig {
    /// Bearer token sent with every request
    pub api_key: String,

    /// API base URL, without the `/chat/completions` suffix
    pub base_url: String,
}

impl CompletionConfig {
    /// Reads `OPENAI_API_KEY` (required) and `OPENAI_BASE_URL` (optional).
    pub fn from_env() -> CompletionResult<Self> {
        let api_key = std::env::var(API_KEY_ENV)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or(CompletionError::MissingApiKey(API_KEY_ENV))?;

        let base_url = std::env::var(BASE_URL_ENV)
            .ok()
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        Ok(Self { api_key, base_url })
    }
}
