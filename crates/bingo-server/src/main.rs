//! bingo-server binary.
//!
//! Reads `bingo.toml` (or the path specified with `--config`), overlays
//! `BINGO_*` environment variables, opens the SQLite store, and serves the
//! JSON API over HTTP. Every game event is written to the log.

mod config;

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use bingo_game::Game;
use bingo_store_sqlite::SqliteStore;
use clap::Parser;
use tokio::{net::TcpListener, sync::broadcast};
use tower_http::trace::TraceLayer;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::config::ServerConfig;

#[derive(Parser)]
#[command(author, version, about = "Bingo game-session server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "bingo.toml")]
  config: PathBuf,
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
    .add_source(::config::Environment::with_prefix("BINGO").try_parsing(true))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  let store_path = expand_tilde(&server_cfg.store_path);

  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  let game = Game::with_options(store, server_cfg.game_options());
  tokio::spawn(log_events(game.subscribe()));

  let app = bingo_api::api_router(game).layer(TraceLayer::new_for_http());
  let address = server_cfg.address();

  tracing::info!(store = ?store_path, "Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("server error")?;

  Ok(())
}

/// Write every published game event to the log until the channel closes.
async fn log_events(mut events: broadcast::Receiver<bingo_core::event::GameEvent>) {
  loop {
    match events.recv().await {
      Ok(event) => {
        let payload = serde_json::to_string(&event.payload).unwrap_or_default();
        tracing::info!(
          room_code = %event.room_code,
          event_type = event.payload.event_type(),
          %payload,
          "game event"
        );
      }
      Err(broadcast::error::RecvError::Lagged(missed)) => {
        tracing::warn!(missed, "event logger fell behind");
      }
      Err(broadcast::error::RecvError::Closed) => break,
    }
  }
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    tracing::error!(error = %e, "failed to listen for ctrl-c");
    std::future::pending::<()>().await;
  }
  tracing::info!("shutting down");
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
