//! The directed follow-edge lifecycle.
//!
//! ```text
//! (none) ──follow──▶ pending ──accept──▶ accepted
//!    ▲                  │                   │
//!    └──reject/unfollow─┴──────unfollow─────┘
//! (any) ──block──▶ blocked ──unblock──▶ (none)
//! ```
//!
//! Following a public user skips `pending`. Whenever an edge becomes
//! `accepted` and the reverse edge is accepted too, the chat engine is asked
//! for the pair's private room.

use std::sync::Arc;

use chrono::Utc;
use rapport_core::{
  Error, Result,
  page::{Page, PageRequest},
  relationship::{Relationship, RelationshipStatus},
  storage::ObjectStorage,
  store::SocialStore,
  user::User,
};
use uuid::Uuid;

use crate::{chat::ChatEngine, config::EngineConfig, directory::UserDirectory};

pub struct RelationshipEngine<S, O> {
  store:  Arc<S>,
  users:  UserDirectory<S>,
  chat:   Arc<ChatEngine<S, O>>,
  config: Arc<EngineConfig>,
}

impl<S, O> Clone for RelationshipEngine<S, O> {
  fn clone(&self) -> Self {
    Self {
      store:  self.store.clone(),
      users:  self.users.clone(),
      chat:   self.chat.clone(),
      config: self.config.clone(),
    }
  }
}

impl<S, O> RelationshipEngine<S, O>
where
  S: SocialStore + 'static,
  O: ObjectStorage + 'static,
{
  pub fn new(store: Arc<S>, chat: Arc<ChatEngine<S, O>>, config: Arc<EngineConfig>) -> Self {
    let users = chat.users().clone();
    Self { store, users, chat, config }
  }

  async fn edge(&self, follower_id: Uuid, following_id: Uuid) -> Result<Option<Relationship>> {
    self
      .store
      .get_relationship(follower_id, following_id)
      .await
      .map_err(Error::from_store)
  }

  // ─── Lifecycle ─────────────────────────────────────────────────────────────

  /// Create the edge `follower_id → target_id`: accepted at once for a public
  /// target, pending otherwise.
  pub async fn follow(&self, follower_id: Uuid, target_id: Uuid) -> Result<Relationship> {
    if follower_id == target_id {
      return Err(Error::SelfReference);
    }
    self.users.require(follower_id).await?;
    let target = self.users.require(target_id).await?;

    if self.is_blocked(target_id, follower_id).await? {
      return Err(Error::Blocked);
    }
    if self.edge(follower_id, target_id).await?.is_some() {
      return Err(Error::Duplicate(format!("{follower_id} already follows {target_id}")));
    }

    let status = if target.privacy.auto_accepts() {
      RelationshipStatus::Accepted
    } else {
      RelationshipStatus::Pending
    };
    let rel = Relationship::new(follower_id, target_id, status);
    // A concurrent follow for the same pair loses here as a conflict.
    self.store.insert_relationship(rel.clone()).await.map_err(Error::from_store)?;
    tracing::debug!(%follower_id, %target_id, ?status, "follow");

    if rel.is_accepted() {
      self.check_mutual_follow(follower_id, target_id).await;
    }
    Ok(rel)
  }

  /// Delete the edge regardless of its status. Missing edges are fine.
  pub async fn unfollow(&self, follower_id: Uuid, target_id: Uuid) -> Result<()> {
    if follower_id == target_id {
      return Err(Error::SelfReference);
    }
    let removed = self
      .store
      .delete_relationship(follower_id, target_id)
      .await
      .map_err(Error::from_store)?;
    tracing::debug!(%follower_id, %target_id, removed, "unfollow");
    Ok(())
  }

  /// Accept the pending request `follower_id → user_id`.
  pub async fn accept_follow(&self, user_id: Uuid, follower_id: Uuid) -> Result<Relationship> {
    let mut rel = self
      .edge(follower_id, user_id)
      .await?
      .ok_or_else(|| Error::not_found(format!("follow request from {follower_id}")))?;
    if rel.status != RelationshipStatus::Pending {
      return Err(Error::InvalidState(format!("follow request is {:?}, not pending", rel.status)));
    }

    rel.status = RelationshipStatus::Accepted;
    rel.accepted_at = Some(Utc::now());
    self.store.update_relationship(rel.clone()).await.map_err(Error::from_store)?;
    tracing::debug!(%user_id, %follower_id, "follow accepted");

    self.check_mutual_follow(follower_id, user_id).await;
    Ok(rel)
  }

  /// Drop the edge `follower_id → user_id`. Idempotent. A `blocked` edge is
  /// the follower's own block and is left in place.
  pub async fn reject_follow(&self, user_id: Uuid, follower_id: Uuid) -> Result<()> {
    match self.edge(follower_id, user_id).await? {
      Some(rel) if !rel.is_blocked() => {
        self
          .store
          .delete_relationship(follower_id, user_id)
          .await
          .map_err(Error::from_store)?;
        tracing::debug!(%user_id, %follower_id, "follow rejected");
      }
      _ => {}
    }
    Ok(())
  }

  /// Mark `blocker_id → target_id` as blocked and drop the target's edge
  /// towards the blocker.
  pub async fn block(&self, blocker_id: Uuid, target_id: Uuid) -> Result<Relationship> {
    if blocker_id == target_id {
      return Err(Error::SelfReference);
    }
    self.users.require(blocker_id).await?;
    self.users.require(target_id).await?;

    let rel = match self.edge(blocker_id, target_id).await? {
      Some(rel) if rel.is_blocked() => rel,
      Some(mut rel) => {
        rel.status = RelationshipStatus::Blocked;
        rel.accepted_at = None;
        self.store.update_relationship(rel.clone()).await.map_err(Error::from_store)?;
        rel
      }
      None => {
        let rel = Relationship::new(blocker_id, target_id, RelationshipStatus::Blocked);
        self.store.insert_relationship(rel.clone()).await.map_err(Error::from_store)?;
        rel
      }
    };

    self
      .store
      .delete_relationship(target_id, blocker_id)
      .await
      .map_err(Error::from_store)?;
    tracing::debug!(%blocker_id, %target_id, "blocked");
    Ok(rel)
  }

  /// Lift a block. Idempotent; an edge that is not a block is left alone.
  pub async fn unblock(&self, blocker_id: Uuid, target_id: Uuid) -> Result<()> {
    if let Some(rel) = self.edge(blocker_id, target_id).await?
      && rel.is_blocked()
    {
      self
        .store
        .delete_relationship(blocker_id, target_id)
        .await
        .map_err(Error::from_store)?;
      tracing::debug!(%blocker_id, %target_id, "unblocked");
    }
    Ok(())
  }

  /// Runs after any transition into `accepted`. If the reverse edge is
  /// accepted too, ensure the pair has a private room. Never fails the
  /// caller.
  async fn check_mutual_follow(&self, a: Uuid, b: Uuid) {
    // Boolean gate: a failed lookup means "not mutual".
    let mutual = self.is_following(b, a).await.unwrap_or_else(|error| {
      tracing::warn!(%a, %b, %error, "mutual-follow lookup failed");
      false
    });
    if !mutual {
      return;
    }

    match self.chat.create_private_room(a, b).await {
      Ok(room) => tracing::debug!(%a, %b, room_id = %room.room_id, "mutual follow; private room ready"),
      Err(error) => tracing::warn!(%a, %b, %error, "private room for mutual follow not created"),
    }
  }

  // ─── Predicates ────────────────────────────────────────────────────────────

  /// `a → b` exists and is accepted.
  pub async fn is_following(&self, a: Uuid, b: Uuid) -> Result<bool> {
    Ok(self.edge(a, b).await?.is_some_and(|rel| rel.is_accepted()))
  }

  /// `b` follows `a`.
  pub async fn is_followed(&self, a: Uuid, b: Uuid) -> Result<bool> { self.is_following(b, a).await }

  /// `blocker → b` exists and is blocked.
  pub async fn is_blocked(&self, blocker: Uuid, b: Uuid) -> Result<bool> {
    Ok(self.edge(blocker, b).await?.is_some_and(|rel| rel.is_blocked()))
  }

  pub async fn is_friend(&self, a: Uuid, b: Uuid) -> Result<bool> {
    Ok(self.is_following(a, b).await? && self.is_following(b, a).await?)
  }

  // ─── Listings ──────────────────────────────────────────────────────────────

  pub async fn get_followers(
    &self,
    user_id: Uuid,
    status:  Option<RelationshipStatus>,
    page:    PageRequest,
  ) -> Result<Page<Relationship>> {
    let page = page.clamp(self.config.default_page_size, self.config.max_page_size);
    let (items, total) = self
      .store
      .list_followers(user_id, status, page.offset(), page.limit())
      .await
      .map_err(Error::from_store)?;
    Ok(Page::new(items, page, total))
  }

  pub async fn get_followings(
    &self,
    user_id: Uuid,
    status:  Option<RelationshipStatus>,
    page:    PageRequest,
  ) -> Result<Page<Relationship>> {
    let page = page.clamp(self.config.default_page_size, self.config.max_page_size);
    let (items, total) = self
      .store
      .list_followings(user_id, status, page.offset(), page.limit())
      .await
      .map_err(Error::from_store)?;
    Ok(Page::new(items, page, total))
  }

  /// Friends are computed, not stored: page through accepted followings and
  /// keep those whose reverse edge is accepted. That costs one reverse lookup
  /// per following; a materialised friendship index would replace it if read
  /// volume demands. `total` counts accepted followings, so it is an upper
  /// bound on the number of friends.
  pub async fn get_friends(&self, user_id: Uuid, page: PageRequest) -> Result<Page<User>> {
    let followings = self
      .get_followings(user_id, Some(RelationshipStatus::Accepted), page)
      .await?;

    let mut friends = Vec::with_capacity(followings.items.len());
    for rel in &followings.items {
      if !self.is_following(rel.following_id, user_id).await? {
        continue;
      }
      if let Some(user) = self.users.get(rel.following_id).await? {
        friends.push(user);
      }
    }

    Ok(Page {
      items: friends,
      page:  followings.page,
      size:  followings.size,
      total: followings.total,
    })
  }
}
