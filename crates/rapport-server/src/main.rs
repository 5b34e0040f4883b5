//! rapport-server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`), overlays
//! `RAPPORT_*` environment variables, opens the SQLite store and serves the
//! JSON API over HTTP.
//!
//! Nested keys use a double underscore, e.g.
//! `RAPPORT_ENGINE__MAX_ROOM_MEMBERS=200`.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::Parser;
use rapport_server::{ServerConfig, build_state, router, user_cache};
use rapport_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Rapport social graph and chat server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,
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
    .add_source(config::File::from(cli.config).required(false))
    .add_source(
      config::Environment::with_prefix("RAPPORT")
        .prefix_separator("_")
        .separator("__"),
    )
    .build()
    .context("failed to read config file")?;

  let mut server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;
  server_cfg.store_path = expand_tilde(&server_cfg.store_path);
  server_cfg.media_dir = expand_tilde(&server_cfg.media_dir);

  let store = SqliteStore::open(&server_cfg.store_path)
    .await
    .with_context(|| format!("failed to open store at {:?}", server_cfg.store_path))?;

  tokio::fs::create_dir_all(&server_cfg.media_dir)
    .await
    .with_context(|| format!("failed to create media dir {:?}", server_cfg.media_dir))?;

  let cache = user_cache(&server_cfg).context("invalid redis_url")?;
  if cache.is_none() {
    tracing::info!("user cache disabled");
  }

  let app = router(build_state(store, cache, &server_cfg));
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!(
    max_room_members = server_cfg.engine.max_room_members,
    user_cache_ttl_secs = server_cfg.user_cache_ttl_secs,
    "Listening on http://{address}"
  );
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
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
