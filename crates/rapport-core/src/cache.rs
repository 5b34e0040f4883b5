//! The optional user cache.
//!
//! A cache is a read-through latency optimisation only. Engines hold it as an
//! `Option<Arc<dyn UserCache>>` and every correctness check still goes to the
//! store; running without a cache changes timing, never behaviour.

use async_trait::async_trait;
use uuid::Uuid;

use crate::user::User;

/// Key/value access to cached user profiles. Expiry is the implementation's
/// concern.
///
/// The methods cannot fail: an unreachable cache is logged by the
/// implementation and reported as a miss, so callers fall through to the
/// store.
#[async_trait]
pub trait UserCache: Send + Sync {
  async fn get(&self, user_id: Uuid) -> Option<User>;
  async fn set(&self, user: &User);
  async fn delete(&self, user_id: Uuid);
}
