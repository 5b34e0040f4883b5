//! Read-through user lookups.

use std::sync::Arc;

use rapport_core::{Error, Result, cache::UserCache, store::SocialStore, user::User};
use uuid::Uuid;

/// Resolves users from the store, consulting the optional cache first.
///
/// The cache is never trusted for anything but the profile payload; a miss
/// or an absent cache always falls through to the store.
pub struct UserDirectory<S> {
  store: Arc<S>,
  cache: Option<Arc<dyn UserCache>>,
}

impl<S> Clone for UserDirectory<S> {
  fn clone(&self) -> Self { Self { store: self.store.clone(), cache: self.cache.clone() } }
}

impl<S: SocialStore> UserDirectory<S> {
  pub fn new(store: Arc<S>, cache: Option<Arc<dyn UserCache>>) -> Self { Self { store, cache } }

  pub async fn get(&self, user_id: Uuid) -> Result<Option<User>> {
    if let Some(cache) = &self.cache
      && let Some(user) = cache.get(user_id).await
    {
      return Ok(Some(user));
    }
    let user = self.store.get_user(user_id).await.map_err(Error::from_store)?;
    if let (Some(cache), Some(user)) = (&self.cache, &user) {
      cache.set(user).await;
    }
    Ok(user)
  }

  /// Like [`get`](Self::get), but a missing user is [`Error::NotFound`].
  pub async fn require(&self, user_id: Uuid) -> Result<User> {
    self.get(user_id).await?.ok_or_else(|| Error::not_found(format!("user {user_id}")))
  }

  /// Store fresh profile claims and drop any cached copy.
  pub async fn sync(&self, user: User) -> Result<User> {
    let user_id = user.user_id;
    let stored = self.store.upsert_user(user).await.map_err(Error::from_store)?;
    if let Some(cache) = &self.cache {
      cache.delete(user_id).await;
    }
    Ok(stored)
  }
}
