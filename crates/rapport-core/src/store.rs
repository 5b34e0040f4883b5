//! The `SocialStore` trait, the persistence gateway.
//!
//! The trait is implemented by storage backends (e.g. `rapport-store-sqlite`).
//! The engines depend on this abstraction, not on any concrete backend.
//!
//! The backend is the sole arbiter of concurrent writes. It must enforce:
//!
//! - one relationship per ordered `(follower, following)` pair;
//! - one individual room per unordered pair of users;
//! - one membership per `(room, user)`;
//! - the member cap passed to [`SocialStore::add_member`];
//!
//! and report uniqueness violations through [`StoreError::is_conflict`], so a race
//! surfaces as a detectable conflict rather than a silent duplicate.

use std::future::Future;

use uuid::Uuid;

use crate::{
  message::{Message, MessageMedia, NewMessage},
  relationship::{Relationship, RelationshipStatus},
  room::{ChatRoom, ChatRoomMember, RoomKind},
  user::User,
};

/// Error bound for store backends.
pub trait StoreError: std::error::Error + Send + Sync + 'static {
  /// `true` when the write was rejected by a uniqueness constraint.
  fn is_conflict(&self) -> bool;
}

/// Abstraction over a Rapport persistence backend.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`) and from detached tasks.
pub trait SocialStore: Send + Sync {
  type Error: StoreError;

  // ── Users ─────────────────────────────────────────────────────────────

  /// Insert or refresh a user's profile. `created_at` of an existing row is
  /// preserved; the stored row is returned.
  fn upsert_user(&self, user: User) -> impl Future<Output = Result<User, Self::Error>> + Send + '_;

  fn get_user(&self, user_id: Uuid) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  // ── Relationships ─────────────────────────────────────────────────────

  /// Insert a new edge. Fails with a conflict if the ordered pair exists.
  fn insert_relationship(
    &self,
    rel: Relationship,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn get_relationship(
    &self,
    follower_id: Uuid,
    following_id: Uuid,
  ) -> impl Future<Output = Result<Option<Relationship>, Self::Error>> + Send + '_;

  /// Persist `status` and `accepted_at` of an existing edge (matched by id).
  fn update_relationship(
    &self,
    rel: Relationship,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Delete the edge for the ordered pair. Returns whether a row was removed.
  fn delete_relationship(
    &self,
    follower_id: Uuid,
    following_id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Edges pointing at `user_id`, newest first, with the unpaged total.
  fn list_followers(
    &self,
    user_id: Uuid,
    status: Option<RelationshipStatus>,
    offset: u64,
    limit: u64,
  ) -> impl Future<Output = Result<(Vec<Relationship>, u64), Self::Error>> + Send + '_;

  /// Edges leaving `user_id`, newest first, with the unpaged total.
  fn list_followings(
    &self,
    user_id: Uuid,
    status: Option<RelationshipStatus>,
    offset: u64,
    limit: u64,
  ) -> impl Future<Output = Result<(Vec<Relationship>, u64), Self::Error>> + Send + '_;

  // ── Rooms ─────────────────────────────────────────────────────────────

  /// Atomically create a room together with its initial members: either all
  /// rows are written or none are.
  fn create_room(
    &self,
    room: ChatRoom,
    members: Vec<ChatRoomMember>,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn get_room(&self, room_id: Uuid) -> impl Future<Output = Result<Option<ChatRoom>, Self::Error>> + Send + '_;

  /// Persist name, announcement and avatar of an existing room.
  fn update_room(&self, room: ChatRoom) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Rooms `user_id` is a member of, optionally restricted to one kind.
  fn list_rooms_for_user(
    &self,
    user_id: Uuid,
    kind: Option<RoomKind>,
  ) -> impl Future<Output = Result<Vec<ChatRoom>, Self::Error>> + Send + '_;

  // ── Members ───────────────────────────────────────────────────────────

  /// Insert `member` unless the room already holds `max_members` members.
  /// Counting and inserting are one atomic step; returns `false` when the
  /// room is full. Fails with a conflict if the user is already a member.
  fn add_member(
    &self,
    member: ChatRoomMember,
    max_members: u64,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  fn get_member(
    &self,
    room_id: Uuid,
    user_id: Uuid,
  ) -> impl Future<Output = Result<Option<ChatRoomMember>, Self::Error>> + Send + '_;

  fn list_members(
    &self,
    room_id: Uuid,
  ) -> impl Future<Output = Result<Vec<ChatRoomMember>, Self::Error>> + Send + '_;

  fn count_members(&self, room_id: Uuid) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  /// Persist role, nickname and mute flag. The read cursor is not touched.
  fn update_member(
    &self,
    member: ChatRoomMember,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn remove_member(
    &self,
    room_id: Uuid,
    user_id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Move the read cursor to `message_id` only if that is forward. Returns
  /// whether the cursor moved.
  fn advance_read_cursor(
    &self,
    room_id: Uuid,
    user_id: Uuid,
    message_id: i64,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Messages ──────────────────────────────────────────────────────────

  /// Store a message, assigning the next id within its room.
  fn insert_message(
    &self,
    message: NewMessage,
  ) -> impl Future<Output = Result<Message, Self::Error>> + Send + '_;

  fn get_message(
    &self,
    room_id: Uuid,
    message_id: i64,
  ) -> impl Future<Output = Result<Option<Message>, Self::Error>> + Send + '_;

  /// Up to `limit` messages with id below `before_id` (or the newest when
  /// `None`), in descending id order, media included.
  fn list_messages(
    &self,
    room_id: Uuid,
    before_id: Option<i64>,
    limit: u32,
  ) -> impl Future<Output = Result<Vec<Message>, Self::Error>> + Send + '_;

  /// Highest message id in the room, or 0 when it has no messages.
  fn latest_message_id(&self, room_id: Uuid) -> impl Future<Output = Result<i64, Self::Error>> + Send + '_;

  fn add_media(&self, media: MessageMedia) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Pins ──────────────────────────────────────────────────────────────

  /// Idempotent.
  fn pin_room(&self, user_id: Uuid, room_id: Uuid) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Idempotent.
  fn unpin_room(&self, user_id: Uuid, room_id: Uuid) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn list_pinned_rooms(
    &self,
    user_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Uuid>, Self::Error>> + Send + '_;
}
