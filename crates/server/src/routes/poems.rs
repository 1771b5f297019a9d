use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, Method};
use axum::response::IntoResponse;
use axum::Json;
use poem_core::{PoemRequest, PoemVariant};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use utoipa::ToSchema;

use crate::error::{AppError, ErrorResponse};
use crate::state::AppState;

pub const DAILY_CACHE_CONTROL: &str = "public, max-age=86400";

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct PoemRequestBody {
    /// Word or phrase the poem is based on
    #[serde(default)]
    pub input: Option<String>,
}

impl PoemRequestBody {
    /// Parses a raw body. Anything that is not a JSON object with a string
    /// `input` reads as an empty request.
    pub fn parse(body: &[u8]) -> Self {
        serde_json::from_slice(body).unwrap_or_default()
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PoemResponse {
    pub poem: Vec<String>,
}

async fn generate(state: &AppState, variant: PoemVariant, body: &[u8]) -> Result<PoemResponse, AppError> {
    let payload = PoemRequestBody::parse(body);
    let request = PoemRequest::new(payload.input.as_deref().unwrap_or_default())
        .map_err(|_| AppError::input_missing())?;

    let poem = state
        .generator
        .generate(variant, &request)
        .await
        .map_err(AppError::generation(variant))?;

    Ok(PoemResponse {
        poem: poem.into_lines(),
    })
}

#[utoipa::path(
    post,
    path = "/api/generate-poem",
    request_body = PoemRequestBody,
    responses(
        (status = 200, description = "Generated poem", body = PoemResponse),
        (status = 400, description = "Input is required", body = ErrorResponse),
        (status = 405, description = "Method not allowed"),
        (status = 500, description = "Generation failed", body = ErrorResponse)
    ),
    tag = "poems"
)]
pub async fn generate_poem(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<PoemResponse>, AppError> {
    let response = generate(&state, PoemVariant::Inspire, &body).await?;
    Ok(Json(response))
}

#[utoipa::path(
    post,
    path = "/api/daily-inspiration",
    request_body = PoemRequestBody,
    responses(
        (status = 200, description = "Today's poem, cacheable for one day", body = PoemResponse),
        (status = 400, description = "Input is required", body = ErrorResponse),
        (status = 405, description = "Method not allowed"),
        (status = 500, description = "Generation failed", body = ErrorResponse)
    ),
    tag = "poems"
)]
pub async fn daily_inspiration(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    info!("Daily inspiration triggered");
    debug!(body = %String::from_utf8_lossy(&body), "Received daily inspiration request");

    let response = generate(&state, PoemVariant::Daily, &body).await?;
    info!(lines = response.poem.len(), "Returning daily inspiration");

    Ok((
        [(header::CACHE_CONTROL, DAILY_CACHE_CONTROL)],
        Json(response),
    ))
}

/// Fallback for any method other than POST on the poem routes.
pub async fn method_not_allowed(method: Method) -> AppError {
    info!("Method not allowed: {}", method);
    AppError::MethodNotAllowed
}
