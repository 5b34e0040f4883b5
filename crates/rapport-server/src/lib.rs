//! Wiring for the Rapport HTTP server: configuration, collaborators and the
//! top-level router.

pub mod cache;
pub mod storage;

use std::{path::PathBuf, sync::Arc};

use axum::{Router, routing::get};
use rapport_api::{AppState, api_router};
use rapport_core::cache::UserCache;
use rapport_engine::{ChatEngine, EngineConfig, RelationshipEngine, UserDirectory};
use rapport_store_sqlite::SqliteStore;
use serde::Deserialize;
use tower_http::trace::TraceLayer;

use cache::{CacheError, RedisCache};
use storage::LocalDiskStorage;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml`.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  pub host:                String,
  pub port:                u16,
  pub store_path:          PathBuf,
  /// Root directory for uploaded attachments.
  pub media_dir:           PathBuf,
  /// Public URL prefix under which `media_dir` is served.
  pub media_base_url:      String,
  /// Redis holding the user cache. Without it profiles are always read from
  /// the store.
  #[serde(default)]
  pub redis_url:           Option<String>,
  /// Expiry of cached profiles; `0` disables the user cache.
  #[serde(default = "default_user_cache_ttl")]
  pub user_cache_ttl_secs: u64,
  #[serde(default)]
  pub engine:              EngineConfig,
}

fn default_user_cache_ttl() -> u64 { 60 }

// ─── Application state ────────────────────────────────────────────────────────

pub type ServerState = AppState<SqliteStore, LocalDiskStorage>;

/// The configured user cache, if any.
pub fn user_cache(config: &ServerConfig) -> Result<Option<Arc<dyn UserCache>>, CacheError> {
  let Some(url) = config.redis_url.as_deref() else {
    return Ok(None);
  };
  if config.user_cache_ttl_secs == 0 {
    return Ok(None);
  }
  let cache: Arc<dyn UserCache> = Arc::new(RedisCache::open(url, config.user_cache_ttl_secs)?);
  Ok(Some(cache))
}

/// Assemble both engines over `store`, sharing one user directory.
pub fn build_state(
  store:  SqliteStore,
  cache:  Option<Arc<dyn UserCache>>,
  config: &ServerConfig,
) -> ServerState {
  let store = Arc::new(store);
  let storage = Arc::new(LocalDiskStorage::new(&config.media_dir, &config.media_base_url));
  let engine = Arc::new(config.engine.clone());

  let users = UserDirectory::new(store.clone(), cache);

  let chat = Arc::new(ChatEngine::new(store.clone(), storage, users, engine.clone()));
  let relationships = RelationshipEngine::new(store, chat.clone(), engine);
  AppState { relationships, chat }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// The API under `/api`, plus a liveness probe.
pub fn router(state: ServerState) -> Router {
  Router::new()
    .route("/healthz", get(|| async { "ok" }))
    .nest("/api", api_router(state))
    .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
  use axum::{
    body::Body,
    http::{Request, StatusCode},
  };
  use tower::ServiceExt as _;

  use super::*;

  fn parse(toml: &str) -> ServerConfig {
    config::Config::builder()
      .add_source(config::File::from_str(toml, config::FileFormat::Toml))
      .build()
      .unwrap()
      .try_deserialize()
      .unwrap()
  }

  const MINIMAL: &str = r#"
    host = "127.0.0.1"
    port = 8080
    store_path = ":memory:"
    media_dir = "/tmp/rapport-media"
    media_base_url = "http://localhost:8080/media"
  "#;

  #[test]
  fn engine_settings_default_when_omitted() {
    let cfg = parse(MINIMAL);
    assert_eq!(cfg.user_cache_ttl_secs, 60);
    assert!(cfg.redis_url.is_none());
    assert_eq!(cfg.engine.max_room_members, 500);
    assert_eq!(cfg.engine.media_directory, "chat");
  }

  #[test]
  fn engine_table_overrides_individual_fields() {
    let cfg = parse(&format!("{MINIMAL}\n[engine]\nmax_room_members = 8\n"));
    assert_eq!(cfg.engine.max_room_members, 8);
    assert_eq!(cfg.engine.default_message_limit, 50);
  }

  #[test]
  fn cache_needs_redis_and_a_ttl() {
    assert!(user_cache(&parse(MINIMAL)).unwrap().is_none());

    let with_redis = format!("redis_url = \"redis://127.0.0.1:6379\"\n{MINIMAL}");
    assert!(user_cache(&parse(&with_redis)).unwrap().is_some());

    let disabled = format!("{with_redis}\nuser_cache_ttl_secs = 0\n");
    assert!(user_cache(&parse(&disabled)).unwrap().is_none());

    let broken = format!("redis_url = \"nonsense\"\n{MINIMAL}");
    assert!(user_cache(&parse(&broken)).is_err());
  }

  #[tokio::test]
  async fn api_is_mounted_under_prefix() {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let app = router(build_state(store, None, &parse(MINIMAL)));

    let resp = app
      .clone()
      .oneshot(Request::builder().uri("/healthz").body(Body::empty()).unwrap())
      .await
      .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    // Reaches the API's identity check rather than a 404.
    let resp = app
      .oneshot(Request::builder().uri("/api/rooms").body(Body::empty()).unwrap())
      .await
      .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
  }
}
