//! telbook-migrate — bulk-import legacy contact data.
//!
//! Reads a legacy export (JSON array or HTML document), normalizes every
//! record, and reconciles the batch against the store configured in
//! `config.toml` (or the path given with `--config`). Exits nonzero when
//! any record failed, so the run can gate deployment scripts.

use std::path::PathBuf;

use anyhow::Context as _;
use clap::Parser;
use serde::Deserialize;
use telbook_ingest::{DEFAULT_SCRIPT_ID, LegacySource, migrate};
use telbook_store_sqlite::SqliteStore;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Import legacy contact data into Telbook")]
struct Cli {
  /// Path to the legacy export (JSON array or HTML document).
  input: PathBuf,

  /// Force the input format instead of inferring it from the extension.
  #[arg(long, value_enum)]
  format: Option<Format>,

  /// Id of the script tag carrying the embedded payload.
  #[arg(long, default_value = DEFAULT_SCRIPT_ID)]
  script_id: String,

  /// Leave existing records untouched instead of updating them.
  #[arg(long)]
  skip_duplicates: bool,

  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum Format {
  Json,
  Html,
}

#[derive(Debug, Deserialize)]
struct StoreConfig {
  store_path: PathBuf,
}

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
    .add_source(config::File::from(cli.config.clone()).required(false))
    .add_source(config::Environment::with_prefix("TELBOOK"))
    .build()
    .context("failed to read config file")?;

  let store_cfg: StoreConfig = settings
    .try_deserialize()
    .context("failed to deserialise StoreConfig")?;

  let input = std::fs::read_to_string(&cli.input)
    .with_context(|| format!("failed to read {:?}", cli.input))?;

  let source = match cli.format {
    Some(Format::Json) => LegacySource::JsonArray,
    Some(Format::Html) => {
      LegacySource::EmbeddedScript { script_id: cli.script_id.clone() }
    }
    None => match cli.input.extension().and_then(|e| e.to_str()) {
      Some("html") | Some("htm") => {
        LegacySource::EmbeddedScript { script_id: cli.script_id.clone() }
      }
      _ => LegacySource::JsonArray,
    },
  };

  let store = SqliteStore::open(&store_cfg.store_path)
    .await
    .with_context(|| {
      format!("failed to open store at {:?}", store_cfg.store_path)
    })?;

  let stats = migrate(&store, &input, &source, cli.skip_duplicates).await?;

  tracing::info!(
    total = stats.total,
    inserted = stats.inserted,
    updated = stats.updated,
    skipped = stats.skipped,
    errors = stats.errors,
    "migration finished"
  );

  if !stats.is_clean() {
    anyhow::bail!(
      "{} of {} records failed to migrate",
      stats.errors,
      stats.total
    );
  }
  Ok(())
}
