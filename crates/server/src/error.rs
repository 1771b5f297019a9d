use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use poem_core::{GenerationError, PoemError, PoemVariant};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    MethodNotAllowed,
    Generation {
        variant: PoemVariant,
        source: GenerationError,
    },
}

impl AppError {
    pub fn input_missing() -> Self {
        AppError::BadRequest(PoemError::InputMissing.to_string())
    }

    pub fn generation(variant: PoemVariant) -> impl FnOnce(GenerationError) -> Self {
        move |source| AppError::Generation { variant, source }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::MethodNotAllowed => {
                return (StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed").into_response();
            }
            AppError::Generation { variant, source } => {
                tracing::error!(
                    variant = variant.as_str(),
                    kind = source.kind(),
                    "Poem generation failed: {}",
                    source
                );
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    variant.failure_message().to_string(),
                )
            }
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}
