//! finsight AI Server
//!
//! REST backend for the financial assistant: transaction categorization,
//! spending analysis, recommendations, chat and budget optimization over
//! one or more LLM backends.
//!
//! # Usage
//!
//! ```bash
//! # Start with default settings
//! finsight-server
//!
//! # Start with a custom config file
//! finsight-server --config /path/to/config.toml
//!
//! # Start with environment overrides
//! FINSIGHT__SERVER__PORT=8080 OPENAI_API_KEY=sk-... finsight-server
//! ```

mod config;

use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::signal;
use tokio::sync::Notify;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use finsight_advisor::MemoryInsightStore;
use finsight_api::{create_router, AppState};
use finsight_llm::{Embedder, ModelGateway, OpenAIEmbedder};

use crate::config::{validate_config, ServerConfig};

// =============================================================================
// CLI Arguments
// =============================================================================

/// finsight AI Server - LLM backend for financial insights
#[derive(Parser, Debug)]
#[command(name = "finsight-server")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file (TOML, JSON, or YAML)
    #[arg(short, long, env = "FINSIGHT_CONFIG")]
    config: Option<String>,

    /// Host to bind to
    #[arg(long, env = "FINSIGHT_HOST")]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "FINSIGHT_PORT")]
    port: Option<u16>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "FINSIGHT_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format (json, pretty)
    #[arg(long, env = "FINSIGHT_LOG_FORMAT")]
    log_format: Option<String>,

    /// OpenAI API key
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    openai_api_key: Option<String>,

    /// Anthropic API key
    #[arg(long, env = "ANTHROPIC_API_KEY", hide_env_values = true)]
    anthropic_api_key: Option<String>,

    /// Ollama base URL, e.g. http://localhost:11434
    #[arg(long, env = "OLLAMA_URL")]
    ollama_url: Option<String>,
}

impl Args {
    /// CLI values win over files and `FINSIGHT__` variables
    fn apply(self, config: &mut ServerConfig) {
        if let Some(host) = self.host {
            config.server.host = host;
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(level) = self.log_level {
            config.logging.level = level;
        }
        if let Some(format) = self.log_format {
            config.logging.format = format;
        }
        if self.openai_api_key.is_some() {
            config.llm.openai_api_key = self.openai_api_key;
        }
        if self.anthropic_api_key.is_some() {
            config.llm.anthropic_api_key = self.anthropic_api_key;
        }
        if self.ollama_url.is_some() {
            config.llm.ollama_url = self.ollama_url;
        }
    }
}

// =============================================================================
// Main Entry Point
// =============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut server_config = ServerConfig::load(args.config.as_deref())?;
    args.apply(&mut server_config);

    init_logging(&server_config.logging)?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "Starting finsight AI Server"
    );

    validate_config(&server_config)?;

    let gateway = Arc::new(build_gateway(&server_config.llm));
    if !gateway.is_configured() {
        tracing::warn!("No LLM backend configured; AI endpoints will answer 503");
    }

    let embedder = build_embedder(&server_config.llm);

    let store = Arc::new(MemoryInsightStore::new(server_config.cache.ttl()));
    spawn_cache_purge(store.clone(), server_config.cache.purge_interval());

    let state = Arc::new(AppState::new(
        gateway,
        server_config.advisor_config(),
        store,
        embedder,
    ));

    let app = create_router(state, server_config.api.api_config());

    if server_config.metrics.enabled {
        start_metrics_server(&server_config.metrics)?;
    }

    let addr = server_config.server.socket_addr()?;

    tracing::info!(
        host = %server_config.server.host,
        port = %server_config.server.port,
        "Server listening"
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;

    let stop = Arc::new(Notify::new());
    let server = axum::serve(listener, app)
        .with_graceful_shutdown({
            let stop = stop.clone();
            async move { stop.notified().await }
        })
        .into_future();
    tokio::pin!(server);

    tokio::select! {
        result = &mut server => result?,
        _ = shutdown_signal() => {
            stop.notify_one();
            let grace = server_config.server.shutdown_timeout();
            tracing::info!(timeout_secs = grace.as_secs(), "Draining in-flight requests");
            match tokio::time::timeout(grace, &mut server).await {
                Ok(result) => result?,
                Err(_) => tracing::warn!("Shutdown grace period elapsed, dropping open connections"),
            }
        }
    }

    tracing::info!("Server shutdown complete");

    Ok(())
}

// =============================================================================
// Initialization Functions
// =============================================================================

/// Initialize tracing/logging
fn init_logging(config: &config::LoggingConfig) -> anyhow::Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let subscriber = tracing_subscriber::registry().with(env_filter);

    match config.format.as_str() {
        "json" => {
            subscriber
                .with(fmt::layer().json().with_target(true))
                .try_init()?;
        }
        _ => {
            subscriber
                .with(fmt::layer().pretty().with_target(true))
                .try_init()?;
        }
    }

    Ok(())
}

/// Register every backend that has credentials, in configured priority order
fn build_gateway(settings: &config::LlmSettings) -> ModelGateway {
    let mut builder = ModelGateway::builder()
        .with_config(settings.gateway_config())
        .with_order(settings.provider_order());

    if let Some(openai) = settings.openai() {
        tracing::info!(model = %openai.model, "OpenAI backend enabled");
        builder = builder.with_openai(openai);
    }
    if let Some(anthropic) = settings.anthropic() {
        tracing::info!(model = %anthropic.model, "Anthropic backend enabled");
        builder = builder.with_anthropic(anthropic);
    }
    if let Some(ollama) = settings.ollama() {
        tracing::info!(model = %ollama.model, url = %ollama.base_url, "Ollama backend enabled");
        builder = builder.with_ollama(ollama);
    }

    builder.build()
}

fn build_embedder(settings: &config::LlmSettings) -> Option<Arc<dyn Embedder>> {
    let embedder = settings.embedder().and_then(OpenAIEmbedder::new);
    match &embedder {
        Some(embedder) => {
            tracing::info!(dimension = embedder.dimension(), "Embedding backend enabled");
        }
        None => tracing::info!("No embedding backend configured"),
    }
    embedder.map(|e| Arc::new(e) as Arc<dyn Embedder>)
}

/// Sweep expired insight entries in the background
fn spawn_cache_purge(store: Arc<MemoryInsightStore>, interval: Duration) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let removed = store.purge_expired();
            if removed > 0 {
                tracing::debug!(removed, remaining = store.len(), "Purged expired insights");
            }
        }
    });
}

/// Start Prometheus metrics server
fn start_metrics_server(config: &config::MetricsConfig) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));

    tracing::info!(port = config.port, "Starting metrics server");

    // The exporter serves /metrics from its own background task
    metrics_exporter_prometheus::PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()?;

    Ok(())
}

// =============================================================================
// Graceful Shutdown
// =============================================================================

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown...");
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
