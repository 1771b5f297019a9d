use anyhow::Context;
use completion::CompletionConfig;
use poem_core::GeneratorConfig;
use server::{create_router, init_tracing, state::AppState};

const DEFAULT_ADDR: &str = "0.0.0.0:3001";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing("server=info,poem_core=info,completion=info,tower_http=info");

    let completion = CompletionConfig::from_env().context("Failed to configure completion API")?;
    let state = AppState::with_openai(completion, GeneratorConfig::default())?;
    let app = create_router(state);

    let addr = std::env::var("POEM_STUDIO_ADDR").unwrap_or_else(|_| DEFAULT_ADDR.to_string());
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
