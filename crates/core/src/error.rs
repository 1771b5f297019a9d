use thiserror::Error;

#[derive(Error, Debug)]
pub enum PoemError {
    #[error("Input is required")]
    InputMissing,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Generation(#[from] GenerationError),
}

/// Failure of a single generation attempt.
///
/// Both kinds collapse to the same response for callers, but stay distinct
/// here so logs and tests can tell a dead upstream from a badly shaped poem.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
    #[error("Completion request failed: {0}")]
    Transport(String),

    #[error("Invalid poem format: expected {expected} lines, got {actual}")]
    MalformedResponse { expected: usize, actual: usize },
}

impl GenerationError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Transport(_) => "transport",
            Self::MalformedResponse { .. } => "malformed_response",
        }
    }
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
