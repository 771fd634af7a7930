//! telbook-server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`), opens the
//! SQLite store, and serves the directory API over HTTP. Asset files are
//! written beneath `asset_dir` and expected to be served by the front
//! proxy under `asset_base_url`.

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use axum::{Json, Router, routing::get};
use clap::Parser;
use serde::Deserialize;
use serde_json::json;
use telbook_api::FsAssetStore;
use telbook_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Telbook directory server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
struct ServerConfig {
  #[serde(default = "default_host")]
  host:           String,
  #[serde(default = "default_port")]
  port:           u16,
  store_path:     PathBuf,
  #[serde(default = "default_asset_dir")]
  asset_dir:      PathBuf,
  #[serde(default = "default_asset_base")]
  asset_base_url: String,
}

fn default_host() -> String { "127.0.0.1".to_string() }
fn default_port() -> u16 { 8000 }
fn default_asset_dir() -> PathBuf { PathBuf::from("assets") }
fn default_asset_base() -> String { "/assets".to_string() }

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("TELBOOK"))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  let store = SqliteStore::open(&server_cfg.store_path)
    .await
    .with_context(|| {
      format!("failed to open store at {:?}", server_cfg.store_path)
    })?;

  let assets = FsAssetStore::new(
    &server_cfg.asset_dir,
    server_cfg.asset_base_url.clone(),
  );

  let app = Router::new()
    .route(
      "/health",
      get(|| async { Json(json!({ "status": "healthy" })) }),
    )
    .nest("/api", telbook_api::api_router(Arc::new(store), Arc::new(assets)))
    .layer(TraceLayer::new_for_http());

  let address = format!("{}:{}", server_cfg.host, server_cfg.port);
  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}
