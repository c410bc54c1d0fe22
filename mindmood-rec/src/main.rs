//! mindmood-rec - emotion-aware content recommender
//!
//! Fuses emotion evidence from a voice recording and free text, then ranks
//! a content catalog (exercises, meditations, playlists) against the result.
//!
//! Settings resolve CLI flag → environment variable → TOML file → default.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{fmt, layer::SubscriberExt, reload, util::SubscriberInitExt, EnvFilter};

use mindmood_common::config::{load_config, resolve_config_path};
use mindmood_common::Catalog;
use mindmood_rec::evidence::EvidenceSources;
use mindmood_rec::{build_router, AppState, Recommender};

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(name = "mindmood-rec", version, about = "Emotion-aware content recommender")]
struct Args {
    /// Config file (falls back to MINDMOOD_CONFIG, then the platform config dir)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Bind address
    #[arg(long, env = "MINDMOOD_HOST")]
    host: Option<String>,

    /// Listen port
    #[arg(short, long, env = "MINDMOOD_PORT")]
    port: Option<u16>,

    /// Catalog file (.json or .toml); built-in sample catalog if unset
    #[arg(long, env = "MINDMOOD_CATALOG")]
    catalog: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // RUST_LOG wins; otherwise start at info and switch to the configured
    // level once the config file has been read
    let rust_log_set = std::env::var_os("RUST_LOG").is_some();
    let initial_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let (filter, reload_handle) = reload::Layer::new(initial_filter);
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .init();

    info!(
        "Starting MindMood Recommender (mindmood-rec) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let config_path = resolve_config_path(args.config.as_deref());
    let config = load_config(config_path.as_deref()).context("Failed to load configuration")?;

    if !rust_log_set {
        let level = config.logging.level.clone();
        reload_handle
            .modify(|filter| *filter = EnvFilter::new(&level))
            .context("Failed to apply configured log level")?;
    }

    let catalog = match args.catalog.or_else(|| config.catalog.path.clone()) {
        Some(path) => Catalog::load(&path)
            .with_context(|| format!("Failed to load catalog {}", path.display()))?,
        None => {
            info!("No catalog configured, using built-in sample catalog");
            Catalog::sample()
        }
    };
    info!("Catalog ready: {} items", catalog.len());

    let sources =
        EvidenceSources::from_config(&config.evidence).context("Failed to set up evidence sources")?;
    info!(
        text_source = sources.text_name().unwrap_or("none"),
        audio_source = sources.audio_name().unwrap_or("none"),
        timeout_ms = config.evidence.timeout_ms,
        "Evidence sources ready"
    );

    let recommender = Recommender::new(catalog, sources, config.recommendation.clone());
    let state = AppState::new(recommender, &config.server);
    let app = build_router(state);

    let host = args.host.unwrap_or_else(|| config.server.host.clone());
    let port = args.port.unwrap_or(config.server.port);
    let addr = format!("{}:{}", host, port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("mindmood-rec listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
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
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
