//! A store whose room creation always fails, for exercising best-effort
//! side effects. Everything else is passed through to SQLite.

use std::fmt;

use rapport_core::{
  message::{Message, MessageMedia, NewMessage},
  relationship::{Relationship, RelationshipStatus},
  room::{ChatRoom, ChatRoomMember, RoomKind},
  store::{SocialStore, StoreError},
  user::User,
};
use rapport_store_sqlite::SqliteStore;
use uuid::Uuid;

#[derive(Debug)]
pub(crate) enum RoomlessError {
  Sqlite(rapport_store_sqlite::Error),
  RoomsOffline,
}

impl fmt::Display for RoomlessError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Sqlite(e) => e.fmt(f),
      Self::RoomsOffline => f.write_str("room creation is offline"),
    }
  }
}

impl std::error::Error for RoomlessError {}

impl StoreError for RoomlessError {
  fn is_conflict(&self) -> bool { matches!(self, Self::Sqlite(e) if e.is_conflict()) }
}

impl From<rapport_store_sqlite::Error> for RoomlessError {
  fn from(e: rapport_store_sqlite::Error) -> Self { Self::Sqlite(e) }
}

type Result<T> = std::result::Result<T, RoomlessError>;

pub(crate) struct RoomlessStore(pub SqliteStore);

impl SocialStore for RoomlessStore {
  type Error = RoomlessError;

  async fn upsert_user(&self, user: User) -> Result<User> { Ok(self.0.upsert_user(user).await?) }

  async fn get_user(&self, user_id: Uuid) -> Result<Option<User>> { Ok(self.0.get_user(user_id).await?) }

  async fn insert_relationship(&self, rel: Relationship) -> Result<()> {
    Ok(self.0.insert_relationship(rel).await?)
  }

  async fn get_relationship(&self, follower_id: Uuid, following_id: Uuid) -> Result<Option<Relationship>> {
    Ok(self.0.get_relationship(follower_id, following_id).await?)
  }

  async fn update_relationship(&self, rel: Relationship) -> Result<()> {
    Ok(self.0.update_relationship(rel).await?)
  }

  async fn delete_relationship(&self, follower_id: Uuid, following_id: Uuid) -> Result<bool> {
    Ok(self.0.delete_relationship(follower_id, following_id).await?)
  }

  async fn list_followers(
    &self,
    user_id: Uuid,
    status:  Option<RelationshipStatus>,
    offset:  u64,
    limit:   u64,
  ) -> Result<(Vec<Relationship>, u64)> {
    Ok(self.0.list_followers(user_id, status, offset, limit).await?)
  }

  async fn list_followings(
    &self,
    user_id: Uuid,
    status:  Option<RelationshipStatus>,
    offset:  u64,
    limit:   u64,
  ) -> Result<(Vec<Relationship>, u64)> {
    Ok(self.0.list_followings(user_id, status, offset, limit).await?)
  }

  async fn create_room(&self, _room: ChatRoom, _members: Vec<ChatRoomMember>) -> Result<()> {
    Err(RoomlessError::RoomsOffline)
  }

  async fn get_room(&self, room_id: Uuid) -> Result<Option<ChatRoom>> { Ok(self.0.get_room(room_id).await?) }

  async fn update_room(&self, room: ChatRoom) -> Result<()> { Ok(self.0.update_room(room).await?) }

  async fn list_rooms_for_user(&self, user_id: Uuid, kind: Option<RoomKind>) -> Result<Vec<ChatRoom>> {
    Ok(self.0.list_rooms_for_user(user_id, kind).await?)
  }

  async fn add_member(&self, member: ChatRoomMember, max_members: u64) -> Result<bool> {
    Ok(self.0.add_member(member, max_members).await?)
  }

  async fn get_member(&self, room_id: Uuid, user_id: Uuid) -> Result<Option<ChatRoomMember>> {
    Ok(self.0.get_member(room_id, user_id).await?)
  }

  async fn list_members(&self, room_id: Uuid) -> Result<Vec<ChatRoomMember>> {
    Ok(self.0.list_members(room_id).await?)
  }

  async fn count_members(&self, room_id: Uuid) -> Result<u64> { Ok(self.0.count_members(room_id).await?) }

  async fn update_member(&self, member: ChatRoomMember) -> Result<()> {
    Ok(self.0.update_member(member).await?)
  }

  async fn remove_member(&self, room_id: Uuid, user_id: Uuid) -> Result<bool> {
    Ok(self.0.remove_member(room_id, user_id).await?)
  }

  async fn advance_read_cursor(&self, room_id: Uuid, user_id: Uuid, message_id: i64) -> Result<bool> {
    Ok(self.0.advance_read_cursor(room_id, user_id, message_id).await?)
  }

  async fn insert_message(&self, message: NewMessage) -> Result<Message> {
    Ok(self.0.insert_message(message).await?)
  }

  async fn get_message(&self, room_id: Uuid, message_id: i64) -> Result<Option<Message>> {
    Ok(self.0.get_message(room_id, message_id).await?)
  }

  async fn list_messages(&self, room_id: Uuid, before_id: Option<i64>, limit: u32) -> Result<Vec<Message>> {
    Ok(self.0.list_messages(room_id, before_id, limit).await?)
  }

  async fn latest_message_id(&self, room_id: Uuid) -> Result<i64> {
    Ok(self.0.latest_message_id(room_id).await?)
  }

  async fn add_media(&self, media: MessageMedia) -> Result<()> { Ok(self.0.add_media(media).await?) }

  async fn pin_room(&self, user_id: Uuid, room_id: Uuid) -> Result<()> {
    Ok(self.0.pin_room(user_id, room_id).await?)
  }

  async fn unpin_room(&self, user_id: Uuid, room_id: Uuid) -> Result<()> {
    Ok(self.0.unpin_room(user_id, room_id).await?)
  }

  async fn list_pinned_rooms(&self, user_id: Uuid) -> Result<Vec<Uuid>> {
    Ok(self.0.list_pinned_rooms(user_id).await?)
  }
}
