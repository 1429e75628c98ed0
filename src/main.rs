mod api;
mod app;
mod catalog;
mod config;
mod event;
mod fetch;
mod filters;
mod ui;

use clap::Parser;
use color_eyre::{eyre::eyre, Result};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "tritab")]
#[command(about = "Cached fetches, paginated lists and URL-synced filters in the terminal")]
#[command(version)]
struct Args {
  /// Path to config file (default: ./tritab.yaml or $XDG_CONFIG_HOME/tritab/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Root of the JSON API
  #[arg(long)]
  api_url: Option<String>,

  /// Posts per page on the paginated tab
  #[arg(long)]
  page_size: Option<u32>,

  /// Initial product filters, e.g. "category=Home&maxPrice=200"
  #[arg(short, long)]
  query: Option<String>,

  /// Log file (default: $XDG_DATA_HOME/tritab/tritab.log)
  #[arg(long)]
  log_file: Option<PathBuf>,
}

/// Log to a file; the terminal belongs to the UI.
///
/// Level comes from `RUST_LOG`, defaulting to `tritab=info`.
fn init_logging(log_file: Option<&Path>) -> Result<WorkerGuard> {
  let path = match log_file {
    Some(p) => p.to_path_buf(),
    None => dirs::data_local_dir()
      .ok_or_else(|| eyre!("Could not determine a data directory for the log file"))?
      .join("tritab")
      .join("tritab.log"),
  };

  let dir = match path.parent() {
    Some(d) if !d.as_os_str().is_empty() => d.to_path_buf(),
    _ => PathBuf::from("."),
  };
  let file_name = path
    .file_name()
    .ok_or_else(|| eyre!("Invalid log file path: {}", path.display()))?;
  std::fs::create_dir_all(&dir)?;

  let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::never(
    &dir, file_name,
  ));

  tracing_subscriber::registry()
    .with(
      tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "tritab=info".into()),
    )
    .with(
      tracing_subscriber::fmt::layer()
        .with_writer(writer)
        .with_ansi(false),
    )
    .init();

  Ok(guard)
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();
  let _log_guard = init_logging(args.log_file.as_deref())?;

  // Load configuration
  let mut config = config::Config::load(args.config.as_deref())?;

  // Command line wins over the config file
  if let Some(url) = args.api_url {
    config.api.base_url = url;
  }
  if let Some(page_size) = args.page_size {
    config.posts.page_size = page_size;
  }
  if let Some(query) = args.query {
    config.catalog.initial_query = query;
  }
  config.validate()?;
  info!(api = %config.api.base_url, page_size = config.posts.page_size, "configuration loaded");

  let mut app = app::App::new(config)?;
  app.run().await?;

  Ok(())
}
