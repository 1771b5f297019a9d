pub mod error;
pub mod routes;
pub mod state;

use axum::routing::{get, post, MethodRouter};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use state::AppState;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Poem Studio API",
        version = "0.1.0",
        description = "Short generated poems and a daily inspiration poem"
    ),
    paths(
        routes::health_check,
        routes::generate_poem,
        routes::daily_inspiration,
    ),
    components(schemas(
        routes::HealthResponse,
        routes::PoemRequestBody,
        routes::PoemResponse,
        error::ErrorResponse,
    )),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "poems", description = "Poem generation endpoints"),
    )
)]
pub struct ApiDoc;

fn generate_poem_route() -> MethodRouter<AppState> {
    post(routes::generate_poem).fallback(routes::method_not_allowed)
}

fn daily_inspiration_route() -> MethodRouter<AppState> {
    post(routes::daily_inspiration).fallback(routes::method_not_allowed)
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api/openapi.json", ApiDoc::openapi()))
        .route("/health", get(routes::health_check))
        .route("/api/generate-poem", generate_poem_route())
        .route("/api/daily-inspiration", daily_inspiration_route())
        // Paths used by front ends built for the serverless deployment
        .route("/.netlify/functions/generate-poem", generate_poem_route())
        .route(
            "/.netlify/functions/daily-inspiration",
            daily_inspiration_route(),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Installs the tracing subscriber used by the server binaries.
pub fn init_tracing(default_filter: &str) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .init();
}
