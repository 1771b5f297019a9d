mod client;
mod config;
mod reveal;

use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand};
use completion::CompletionConfig;
use poem_core::prompts::INSPIRATIONAL_PHRASES;
use poem_core::{
    DailyInspiration, DailyOutcome, Freshness, JsonFileStore, OutcomeSource, PoemRequest,
    PoemSource, PoemVariant, SystemClock, RECHECK_INTERVAL,
};
use rand::Rng;
use server::{create_router, init_tracing, state::AppState};

use client::HttpPoemSource;
use config::{StudioConfig, CONFIG_FILE, STUDIO_DIR};
use reveal::{reveal, DEFAULT_REVEAL_DELAY};

const TRACING_FILTER: &str =
    "poem_studio=info,poem_core=info,completion=info,server=info,tower_http=info";
const QUIET_TRACING_FILTER: &str = "warn";

#[derive(Parser)]
#[command(name = "poem-studio")]
#[command(about = "Short generated poems and a daily inspiration", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Poem API base URL, overrides the config file
    #[arg(long, global = true)]
    server_url: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default .poem-studio/config.toml
    Init,
    /// Run the poem API
    Serve {
        #[arg(short, long)]
        port: Option<u16>,

        #[arg(long)]
        host: Option<String>,
    },
    /// Turn a word or phrase into a poem
    Poem {
        input: Option<String>,

        /// Use a random inspirational phrase as input
        #[arg(long, conflicts_with = "input")]
        surprise: bool,

        /// Print the whole poem at once
        #[arg(long)]
        no_reveal: bool,

        /// Delay between revealed lines, in milliseconds
        #[arg(long, default_value_t = DEFAULT_REVEAL_DELAY.as_millis() as u64)]
        delay_ms: u64,
    },
    /// Show today's inspiration, refreshing it after the daily rollover
    Daily,
    /// Keep today's inspiration current, re-checking every minute
    Watch,
    /// Show configuration and the cached daily poem
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let cwd = std::env::current_dir()?;

    match cli.command {
        Some(Commands::Init) => init_project(&cwd).await,
        Some(Commands::Serve { port, host }) => serve(&cwd, port, host).await,
        Some(Commands::Poem {
            input,
            surprise,
            no_reveal,
            delay_ms,
        }) => {
            let delay = if no_reveal {
                Duration::ZERO
            } else {
                Duration::from_millis(delay_ms)
            };
            poem(&cwd, cli.server_url, input, surprise, delay).await
        }
        Some(Commands::Daily) => daily(&cwd, cli.server_url).await,
        Some(Commands::Watch) => watch(&cwd, cli.server_url).await,
        Some(Commands::Status) => status(&cwd).await,
        None => serve(&cwd, None, None).await,
    }
}

async fn init_project(cwd: &Path) -> Result<()> {
    let config_path = StudioConfig::config_path(cwd);

    if config_path.exists() {
        println!("Project already initialized at {}", config_path.display());
        return Ok(());
    }

    println!("Initializing Poem Studio in {}", cwd.display());
    StudioConfig::default().save(cwd).await?;

    println!();
    println!("Created:");
    println!("  {}/", STUDIO_DIR);
    println!("  └── {}", CONFIG_FILE);
    println!();
    println!("Next steps:");
    println!("  1. Export OPENAI_API_KEY");
    println!("  2. Run 'poem-studio serve' to start the API");
    println!("  3. Run 'poem-studio poem \"ocean breeze\"' or 'poem-studio daily'");

    Ok(())
}

async fn serve(cwd: &Path, port: Option<u16>, host: Option<String>) -> Result<()> {
    let config = StudioConfig::load(cwd).await?;
    init_tracing(TRACING_FILTER);

    let port = port.unwrap_or(config.server.port);
    let host = host.unwrap_or_else(|| config.server.host.clone());

    let completion =
        CompletionConfig::from_env().context("Set OPENAI_API_KEY before starting the server")?;
    let state = AppState::with_openai(completion, config.generator_config())?;
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(format!("{}:{}", host, port))
        .await
        .with_context(|| format!("Failed to bind {}:{}", host, port))?;

    println!();
    println!("Poem Studio");
    println!("════════════════════════════════════════");
    println!();
    println!("  API Server:  http://localhost:{}", port);
    println!("  Swagger UI:  http://localhost:{}/swagger-ui", port);
    println!("  Model:       {}", config.server.model);
    println!();
    println!("Press Ctrl+C to stop");
    println!();

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn poem(
    cwd: &Path,
    server_url: Option<String>,
    input: Option<String>,
    surprise: bool,
    delay: Duration,
) -> Result<()> {
    let config = StudioConfig::load(cwd).await?;
    init_tracing(QUIET_TRACING_FILTER);

    let input = match (surprise, input) {
        (true, _) => surprise_phrase().to_string(),
        (false, Some(input)) => input,
        (false, None) => bail!("Give a word or phrase, or pass --surprise"),
    };
    let request = PoemRequest::new(&input)?;

    let source = HttpPoemSource::new(server_url.unwrap_or(config.client.server_url));
    let poem = source
        .fetch_poem(PoemVariant::Inspire, &request)
        .await
        .context("Could not generate a poem")?;

    println!("✨ {}", request.input());
    println!();
    let mut stdout = std::io::stdout();
    reveal(poem.lines(), delay, shutdown_signal(), &mut stdout).await?;

    Ok(())
}

fn surprise_phrase() -> &'static str {
    let mut rng = rand::rng();
    INSPIRATIONAL_PHRASES[rng.random_range(0..INSPIRATIONAL_PHRASES.len())]
}

type CliDaily = DailyInspiration<HttpPoemSource, JsonFileStore, SystemClock>;

fn daily_service(config: &StudioConfig, server_url: Option<String>) -> Result<CliDaily> {
    let source = HttpPoemSource::new(server_url.unwrap_or_else(|| config.client.server_url.clone()));
    let cache_path = config.cache_path()?;
    tracing::debug!(
        cache = %cache_path.display(),
        server_url = source.server_url(),
        "Daily cache"
    );

    Ok(DailyInspiration::new(
        source,
        JsonFileStore::new(cache_path),
        config.client.rollover.policy(),
        SystemClock,
    ))
}

fn print_outcome(outcome: &DailyOutcome) {
    match outcome.source {
        OutcomeSource::Empty => {
            println!("No daily inspiration available right now. Try again later.");
            return;
        }
        OutcomeSource::Fallback => {
            println!("(Could not refresh, showing the last saved inspiration)");
        }
        OutcomeSource::Unsaved => {
            println!("(Could not save today's inspiration, it will be fetched again)");
        }
        OutcomeSource::Cache | OutcomeSource::Refreshed => {}
    }

    println!("Today's inspiration:");
    println!();
    for line in outcome.poem.lines() {
        println!("  {}", line);
    }
    println!();
}

async fn daily(cwd: &Path, server_url: Option<String>) -> Result<()> {
    let config = StudioConfig::load(cwd).await?;
    init_tracing(QUIET_TRACING_FILTER);

    let service = daily_service(&config, server_url)?;
    let outcome = service.check().await;
    print_outcome(&outcome);

    Ok(())
}

async fn watch(cwd: &Path, server_url: Option<String>) -> Result<()> {
    let config = StudioConfig::load(cwd).await?;
    init_tracing(TRACING_FILTER);

    let service = daily_service(&config, server_url)?;
    println!("Watching daily inspiration (Ctrl+C to stop)");
    println!();

    let mut first = true;
    service
        .watch(RECHECK_INTERVAL, shutdown_signal(), |outcome| {
            if first || outcome.is_refreshed() {
                print_outcome(outcome);
            }
            first = false;
        })
        .await;

    Ok(())
}

async fn status(cwd: &Path) -> Result<()> {
    let config = StudioConfig::load(cwd).await?;
    init_tracing(QUIET_TRACING_FILTER);
    let config_path = StudioConfig::config_path(cwd);
    let cache_path = config.cache_path()?;

    println!();
    if config_path.exists() {
        println!("Config:    {}", config_path.display());
    } else {
        println!("Config:    defaults (run 'poem-studio init' to write one)");
    }
    println!("Server:    {}", config.client.server_url);
    println!("Cache:     {}", cache_path.display());
    println!("Rollover:  {}", config.client.rollover.policy().rule_name());
    println!();

    let service = daily_service(&config, None)?;
    let status = service.status().await;

    match &status.entry {
        Some(entry) => {
            println!(
                "Cached poem (fetched {}):",
                entry.fetched_at.with_timezone(&Local).format("%Y-%m-%d %H:%M")
            );
            for line in entry.poem.lines() {
                println!("  {}", line);
            }
        }
        None => println!("No cached daily poem."),
    }
    println!();

    let freshness = match status.freshness {
        Freshness::Fresh => "fresh".to_string(),
        Freshness::Stale(reason) => format!("stale ({})", reason.as_str()),
    };
    println!("State:          {}", freshness);
    println!(
        "Next rollover:  {}",
        status.next_boundary.with_timezone(&Local).format("%Y-%m-%d %H:%M %Z")
    );
    println!();

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
}
