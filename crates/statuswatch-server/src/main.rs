//! statuswatch server binary.
//!
//! Reads `config.toml` (or the path given with `--config`), opens the
//! SQLite-backed cache, starts the background poll worker, and serves the
//! read API over HTTP. `--once` runs a single poll cycle and exits, for
//! cron-style deployments.

mod config;
mod worker;

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use clap::Parser;
use statuswatch_source_http::{HttpEventSource, SourceConfig};
use statuswatch_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::{config::ServerConfig, worker::PollWorker};

#[derive(Parser)]
#[command(author, version, about = "Cloud health-event cache and dashboard server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Run a single poll cycle and exit instead of serving.
  #[arg(long)]
  once: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  // Load configuration.
  let settings = ::config::Config::builder()
    .add_source(::config::File::from(cli.config).required(false))
    .add_source(::config::Environment::with_prefix("STATUSWATCH"))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;
  server_cfg.validate().context("invalid configuration")?;

  // Open the SQLite cache.
  let store = Arc::new(
    SqliteStore::open(&server_cfg.store_path)
      .await
      .with_context(|| {
        format!("failed to open store at {:?}", server_cfg.store_path)
      })?,
  );

  // Build the feed client.
  let source = HttpEventSource::new(SourceConfig {
    endpoint: server_cfg.source_endpoint.clone(),
    token:    server_cfg.source_token.clone(),
  })
  .context("failed to build feed client")?;

  let shutdown = CancellationToken::new();
  let worker = PollWorker::new(
    store.clone(),
    source,
    server_cfg.subscription_id.clone(),
    server_cfg.cache_key.clone(),
    server_cfg.poll_interval(),
    shutdown.clone(),
  );

  if cli.once {
    let outcome = worker.poll_once().await.context("poll cycle failed")?;
    tracing::info!(
      fetched = outcome.fetched,
      new = outcome.new_events,
      updated = outcome.updated_events,
      written = outcome.written,
      "single poll cycle finished"
    );
    return Ok(());
  }

  let worker_handle = tokio::spawn(worker.run());

  let app = axum::Router::new()
    .nest(
      "/api",
      statuswatch_api::api_router(store, server_cfg.cache_key.clone()),
    )
    .layer(TraceLayer::new_for_http());

  let address = format!("{}:{}", server_cfg.host, server_cfg.port);
  tracing::info!("listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  let shutdown_trigger = shutdown.clone();
  axum::serve(listener, app)
    .with_graceful_shutdown(async move {
      shutdown_signal().await;
      shutdown_trigger.cancel();
    })
    .await
    .context("server error")?;

  worker_handle.await.context("poll worker panicked")?;

  Ok(())
}

/// Resolve on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
  use tokio::signal;

  let ctrl_c = async {
    signal::ctrl_c().await.expect("failed to install Ctrl+C handler");
  };

  #[cfg(unix)]
  let terminate = async {
    signal::unix::signal(signal::unix::SignalKind::terminate())
      .expect("failed to install SIGTERM handler")
      .recv()
      .await;
  };

  #[cfg(not(unix))]
  let terminate = std::future::pending::<()>();

  tokio::select! {
    _ = ctrl_c => tracing::info!("received Ctrl+C, shutting down"),
    _ = terminate => tracing::info!("received SIGTERM, shutting down"),
  }
}
