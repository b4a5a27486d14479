use std::{net::SocketAddr, path::PathBuf, sync::Arc};

use anyhow::Context;
use axum::http::{HeaderValue, Method};
use clap::Parser;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use folio_core::thumbs::ThumbnailCache;
use folio_server::infra::{app_state::AppState, config::Config};
use folio_server::routes;
use folio_store::CalibreStore;

/// CLI entry point
#[derive(Parser, Debug)]
#[command(name = "folio-server")]
#[command(about = "Read-only HTTP server for browsing a Calibre book catalog")]
struct Cli {
    /// Bind host (overrides SERVER_HOST)
    #[arg(long)]
    host: Option<String>,

    /// Bind port (overrides SERVER_PORT)
    #[arg(long)]
    port: Option<u16>,

    /// Calibre library directory (overrides LIBRARY_ROOT)
    #[arg(long)]
    library: Option<PathBuf>,

    /// Thumbnail cache directory (overrides THUMBNAIL_CACHE_DIR)
    #[arg(long)]
    cache_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = Config::from_env()?;
    if let Some(host) = cli.host {
        config.server_host = host;
    }
    if let Some(port) = cli.port {
        config.server_port = port;
    }
    if let Some(library) = cli.library {
        config.library_root = library;
    }
    if let Some(cache_dir) = cli.cache_dir {
        config.thumbnail_cache_dir = cache_dir;
    }

    // Log filter is fixed at startup; RUST_LOG wins over the config value.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_filter.clone()));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    config.validate()?;
    config.ensure_directories()?;
    config.normalize_paths()?;

    let store = CalibreStore::open(config.library_root.clone())
        .await
        .map_err(|e| anyhow::anyhow!("opening catalog: {e}"))?;

    let cors_origins: Vec<HeaderValue> = config
        .cors_allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();
    let cors = CorsLayer::new()
        .allow_origin(cors_origins)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    let state = AppState {
        store: Arc::new(store),
        thumbs: ThumbnailCache::new(config.thumbnail_cache_dir.clone()),
        config: Arc::new(config),
    };

    let addr: SocketAddr = format!(
        "{}:{}",
        state.config.server_host, state.config.server_port
    )
    .parse()
    .context("invalid bind address")?;

    let app = routes::create_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!("folio server listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("failed to install ctrl-c handler: {e}");
    }
}
