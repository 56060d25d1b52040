//! Sift server
//!
//! Main entry point for the conversational web-RAG service.

use clap::Parser;
use sift::{create_router, Gateway};
use sift_core::{config::AppConfig, logging, AppError, AppResult};
use sift_knowledge::{
    create_provider, AnsweringEngine, EmbeddingConfig, EngineOptions, HistoryStore, SessionCache,
};
use sift_llm::create_client;
use sift_prompt::PromptSet;
use sift_web::{ContentAcquirer, HttpFetcher, SerperClient};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;

/// Sift - answer questions from freshly searched web articles
#[derive(Parser, Debug)]
#[command(name = "sift")]
#[command(about = "Conversational retrieval-augmented answers over web search results", long_about = None)]
#[command(version)]
struct Cli {
    /// Address to bind
    #[arg(long, env = "SIFT_HOST")]
    host: Option<String>,

    /// Port to listen on
    #[arg(long, env = "SIFT_PORT")]
    port: Option<u16>,

    /// Path to config file
    #[arg(short, long, env = "SIFT_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, env = "RUST_LOG")]
    log_level: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, env = "NO_COLOR")]
    no_color: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    json_logs: bool,

    /// Generative model provider (together, ollama)
    #[arg(short, long, env = "SIFT_PROVIDER")]
    provider: Option<String>,

    /// Model identifier
    #[arg(short, long, env = "SIFT_MODEL")]
    model: Option<String>,
}

#[tokio::main]
async fn main() -> AppResult<()> {
    let cli = Cli::parse();

    let config = AppConfig::load(cli.config.as_deref())?.with_overrides(
        cli.host,
        cli.port,
        cli.provider,
        cli.model,
        cli.log_level,
        cli.verbose,
        cli.no_color,
        cli.json_logs,
    );

    logging::init_logging(
        config.logging.level.as_deref(),
        config.logging.no_color,
        config.logging.json,
    )?;

    tracing::info!("Sift v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::debug!("Config file: {:?}", config.config_file);
    tracing::debug!("Provider: {} ({})", config.llm.provider, config.llm.model);
    tracing::debug!(
        "Embeddings: {} ({})",
        config.embedding.provider,
        config.embedding.model
    );

    let result = serve(config).await;

    match &result {
        Ok(_) => tracing::info!("Server shutdown complete"),
        Err(e) => tracing::error!("Server failed: {}", e),
    }

    result
}

async fn serve(config: AppConfig) -> AppResult<()> {
    config.validate()?;

    let gateway = Arc::new(build_gateway(&config)?);
    let app = create_router(gateway);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

fn build_gateway(config: &AppConfig) -> AppResult<Gateway> {
    let serper_key = config
        .serper_api_key
        .as_deref()
        .ok_or_else(|| AppError::Config("SERPER_API_KEY is not set".to_string()))?;

    let search = SerperClient::new(&config.search.endpoint, serper_key, config.search.max_sources)?;
    let fetcher = HttpFetcher::new(Duration::from_secs(config.search.fetch_timeout_secs))?;
    let acquirer = ContentAcquirer::new(
        Arc::new(search),
        Arc::new(fetcher),
        config.search.fetch_concurrency,
    );

    let llm = create_client(
        &config.llm.provider,
        config.llm.endpoint.as_deref(),
        config.llm_api_key(),
    )?;

    let embedding_config = EmbeddingConfig::from_settings(&config.embedding);
    let embedder = create_provider(&embedding_config, config.embedding_api_key())?;

    let prompts = PromptSet::load(config.prompts_dir.as_deref())?;

    let engine = AnsweringEngine::new(
        llm,
        embedder,
        Arc::new(HistoryStore::new()),
        prompts,
        EngineOptions::from_config(config),
    );

    Ok(Gateway::new(acquirer, engine, Arc::new(SessionCache::new())))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C, starting shutdown..."),
        _ = terminate => tracing::info!("Received SIGTERM, starting shutdown..."),
    }
}
