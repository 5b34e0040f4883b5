//! Redis-backed user cache.
//!
//! Profiles are stored as JSON under `user:info:<id>` with a per-key expiry,
//! so Redis does the evicting.

use async_trait::async_trait;
use rapport_core::{cache::UserCache, user::User};
use redis::AsyncCommands;
use thiserror::Error;
use uuid::Uuid;

const USER_INFO_PREFIX: &str = "user:info:";

pub fn user_info_key(user_id: Uuid) -> String { format!("{USER_INFO_PREFIX}{user_id}") }

#[derive(Debug, Error)]
pub enum CacheError {
  #[error("redis error: {0}")]
  Redis(#[from] redis::RedisError),

  #[error("cached profile is not valid JSON: {0}")]
  Codec(#[from] serde_json::Error),
}

pub struct RedisCache {
  client:   redis::Client,
  ttl_secs: u64,
}

impl RedisCache {
  /// Validates `url`; no connection is made until the first lookup.
  pub fn open(url: &str, ttl_secs: u64) -> Result<Self, CacheError> {
    Ok(Self { client: redis::Client::open(url)?, ttl_secs })
  }

  async fn try_get(&self, user_id: Uuid) -> Result<Option<User>, CacheError> {
    let mut conn = self.client.get_multiplexed_async_connection().await?;
    let json: Option<String> = conn.get(user_info_key(user_id)).await?;
    Ok(json.map(|json| serde_json::from_str(&json)).transpose()?)
  }

  async fn try_set(&self, user: &User) -> Result<(), CacheError> {
    let json = serde_json::to_string(user)?;
    let mut conn = self.client.get_multiplexed_async_connection().await?;
    let _: () = conn.set_ex(user_info_key(user.user_id), json, self.ttl_secs).await?;
    Ok(())
  }

  async fn try_delete(&self, user_id: Uuid) -> Result<(), CacheError> {
    let mut conn = self.client.get_multiplexed_async_connection().await?;
    let _: () = conn.del(user_info_key(user_id)).await?;
    Ok(())
  }
}

#[async_trait]
impl UserCache for RedisCache {
  async fn get(&self, user_id: Uuid) -> Option<User> {
    self.try_get(user_id).await.unwrap_or_else(|error| {
      tracing::warn!(%user_id, %error, "user cache read failed");
      None
    })
  }

  async fn set(&self, user: &User) {
    if let Err(error) = self.try_set(user).await {
      tracing::warn!(user_id = %user.user_id, %error, "user cache write failed");
    }
  }

  async fn delete(&self, user_id: Uuid) {
    if let Err(error) = self.try_delete(user_id).await {
      tracing::warn!(%user_id, %error, "user cache invalidation failed");
    }
  }
}

#[cfg(test)]
mod tests {
  use chrono::Utc;
  use rapport_core::user::Privacy;

  use super::*;

  #[test]
  fn keys_are_namespaced_per_user() {
    let id = Uuid::new_v4();
    assert_eq!(user_info_key(id), format!("user:info:{id}"));
  }

  #[test]
  fn malformed_urls_are_rejected_up_front() {
    assert!(matches!(RedisCache::open("not a url", 60), Err(CacheError::Redis(_))));
    assert!(RedisCache::open("redis://127.0.0.1:6379/0", 60).is_ok());
  }

  #[tokio::test]
  async fn an_unreachable_server_reads_as_a_miss() {
    // Nothing listens on port 1.
    let cache = RedisCache::open("redis://127.0.0.1:1/", 60).unwrap();
    let user = User {
      user_id:    Uuid::new_v4(),
      nickname:   "ada".into(),
      avatar_url: None,
      privacy:    Privacy::Public,
      created_at: Utc::now(),
    };

    cache.set(&user).await;
    assert!(cache.get(user.user_id).await.is_none());
    cache.delete(user.user_id).await;
  }
}
