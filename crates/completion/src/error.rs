use thiserror::Error;

#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("Completion API error: {message}")]
    Api {
        message: String,
        status_code: Option<u16>,
    },

    #[error("Completion API rate limited")]
    RateLimited,

    #[error("No completion returned")]
    NoChoices,

    #[error("Missing API key: set {0}")]
    MissingApiKey(&'static str),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

pub type CompletionResult<T> = Result<T, CompletionError>;
