//! The SQLite implementation of [`SocialStore`].

use std::{collections::HashMap, path::Path};

use chrono::Utc;
use rapport_core::{
  message::{Message, MessageMedia, NewMessage},
  relationship::{Relationship, RelationshipStatus},
  room::{ChatRoom, ChatRoomMember, RoomKind},
  store::SocialStore,
  user::User,
};
use rusqlite::{OptionalExtension as _, TransactionBehavior};
use uuid::Uuid;

use crate::{
  Error, Result,
  encode::{
    RawMedia, RawMember, RawMessage, RawRelationship, RawRoom, RawUser, decode_uuid,
    encode_content_type, encode_dt, encode_privacy, encode_role, encode_room_kind, encode_status, encode_uuid,
    pair_key,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Rapport store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted. All access
/// is serialised on the connection's background thread, which makes each
/// `call` closure an atomic unit.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

/// Which side of an edge a relationship listing is anchored on.
#[derive(Clone, Copy)]
enum EdgeSide {
  Followers,
  Followings,
}

impl EdgeSide {
  fn column(self) -> &'static str {
    match self {
      EdgeSide::Followers => "following_id",
      EdgeSide::Followings => "follower_id",
    }
  }
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn list_edges(
    &self,
    side:    EdgeSide,
    user_id: Uuid,
    status:  Option<RelationshipStatus>,
    offset:  u64,
    limit:   u64,
  ) -> Result<(Vec<Relationship>, u64)> {
    let id_str     = encode_uuid(user_id);
    let status_str = status.map(encode_status).map(str::to_owned);
    let column     = side.column();
    let limit_val  = i64::try_from(limit).unwrap_or(i64::MAX);
    let offset_val = i64::try_from(offset).unwrap_or(i64::MAX);

    let (raws, total): (Vec<RawRelationship>, i64) = self
      .conn
      .call(move |conn| {
        let filter = format!("{column} = ?1 AND (?2 IS NULL OR status = ?2)");

        let total: i64 = conn.query_row(
          &format!("SELECT COUNT(*) FROM relationships WHERE {filter}"),
          rusqlite::params![id_str, status_str],
          |r| r.get(0),
        )?;

        let mut stmt = conn.prepare(&format!(
          "SELECT {} FROM relationships WHERE {filter}
           ORDER BY created_at DESC, rowid DESC
           LIMIT ?3 OFFSET ?4",
          RawRelationship::COLUMNS
        ))?;
        let rows = stmt
          .query_map(
            rusqlite::params![id_str, status_str, limit_val, offset_val],
            RawRelationship::from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok((rows, total))
      })
      .await?;

    let edges = raws
      .into_iter()
      .map(RawRelationship::into_relationship)
      .collect::<Result<Vec<_>>>()?;
    Ok((edges, u64::try_from(total).unwrap_or_default()))
  }

  /// Load media rows for the given messages of one room, grouped by id.
  async fn media_for(
    &self,
    room_id: Uuid,
    low:     i64,
    high:    i64,
  ) -> Result<HashMap<i64, Vec<MessageMedia>>> {
    let room_str = encode_uuid(room_id);

    let raws: Vec<RawMedia> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {} FROM message_media
           WHERE room_id = ?1 AND message_id BETWEEN ?2 AND ?3
           ORDER BY rowid",
          RawMedia::COLUMNS
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![room_str, low, high], RawMedia::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    let mut grouped: HashMap<i64, Vec<MessageMedia>> = HashMap::new();
    for raw in raws {
      let media = raw.into_media()?;
      grouped.entry(media.message_id).or_default().push(media);
    }
    Ok(grouped)
  }
}

// ─── SocialStore impl ────────────────────────────────────────────────────────

impl SocialStore for SqliteStore {
  type Error = Error;

  // ── Users ─────────────────────────────────────────────────────────────────

  async fn upsert_user(&self, user: User) -> Result<User> {
    let id_str      = encode_uuid(user.user_id);
    let nickname    = user.nickname.clone();
    let avatar_url  = user.avatar_url.clone();
    let privacy_str = encode_privacy(user.privacy).to_owned();
    let at_str      = encode_dt(user.created_at);

    let raw: RawUser = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO users (user_id, nickname, avatar_url, privacy, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5)
           ON CONFLICT (user_id) DO UPDATE SET
             nickname   = excluded.nickname,
             avatar_url = excluded.avatar_url,
             privacy    = excluded.privacy",
          rusqlite::params![id_str, nickname, avatar_url, privacy_str, at_str],
        )?;
        Ok(conn.query_row(
          &format!("SELECT {} FROM users WHERE user_id = ?1", RawUser::COLUMNS),
          rusqlite::params![id_str],
          RawUser::from_row,
        )?)
      })
      .await?;

    raw.into_user()
  }

  async fn get_user(&self, user_id: Uuid) -> Result<Option<User>> {
    let id_str = encode_uuid(user_id);

    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {} FROM users WHERE user_id = ?1", RawUser::COLUMNS),
              rusqlite::params![id_str],
              RawUser::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawUser::into_user).transpose()
  }

  // ── Relationships ─────────────────────────────────────────────────────────

  async fn insert_relationship(&self, rel: Relationship) -> Result<()> {
    let id_str        = encode_uuid(rel.relationship_id);
    let follower_str  = encode_uuid(rel.follower_id);
    let following_str = encode_uuid(rel.following_id);
    let status_str    = encode_status(rel.status).to_owned();
    let created_str   = encode_dt(rel.created_at);
    let accepted_str  = rel.accepted_at.map(encode_dt);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO relationships (
             relationship_id, follower_id, following_id, status, created_at, accepted_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![
            id_str,
            follower_str,
            following_str,
            status_str,
            created_str,
            accepted_str,
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn get_relationship(
    &self,
    follower_id:  Uuid,
    following_id: Uuid,
  ) -> Result<Option<Relationship>> {
    let follower_str  = encode_uuid(follower_id);
    let following_str = encode_uuid(following_id);

    let raw: Option<RawRelationship> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {} FROM relationships WHERE follower_id = ?1 AND following_id = ?2",
                RawRelationship::COLUMNS
              ),
              rusqlite::params![follower_str, following_str],
              RawRelationship::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawRelationship::into_relationship).transpose()
  }

  async fn update_relationship(&self, rel: Relationship) -> Result<()> {
    let id_str       = encode_uuid(rel.relationship_id);
    let status_str   = encode_status(rel.status).to_owned();
    let accepted_str = rel.accepted_at.map(encode_dt);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "UPDATE relationships SET status = ?2, accepted_at = ?3 WHERE relationship_id = ?1",
          rusqlite::params![id_str, status_str, accepted_str],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn delete_relationship(&self, follower_id: Uuid, following_id: Uuid) -> Result<bool> {
    let follower_str  = encode_uuid(follower_id);
    let following_str = encode_uuid(following_id);

    let removed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM relationships WHERE follower_id = ?1 AND following_id = ?2",
          rusqlite::params![follower_str, following_str],
        )?)
      })
      .await?;
    Ok(removed > 0)
  }

  async fn list_followers(
    &self,
    user_id: Uuid,
    status:  Option<RelationshipStatus>,
    offset:  u64,
    limit:   u64,
  ) -> Result<(Vec<Relationship>, u64)> {
    self.list_edges(EdgeSide::Followers, user_id, status, offset, limit).await
  }

  async fn list_followings(
    &self,
    user_id: Uuid,
    status:  Option<RelationshipStatus>,
    offset:  u64,
    limit:   u64,
  ) -> Result<(Vec<Relationship>, u64)> {
    self.list_edges(EdgeSide::Followings, user_id, status, offset, limit).await
  }

  // ── Rooms ─────────────────────────────────────────────────────────────────

  async fn create_room(&self, room: ChatRoom, members: Vec<ChatRoomMember>) -> Result<()> {
    let pair = match (room.kind, members.as_slice()) {
      (RoomKind::Individual, [a, b]) => Some(pair_key(a.user_id, b.user_id)),
      _ => None,
    };
    let room_str     = encode_uuid(room.room_id);
    let kind_str     = encode_room_kind(room.kind).to_owned();
    let created_str  = encode_dt(room.created_at);
    let member_rows: Vec<_> = members
      .iter()
      .map(|m| {
        (
          encode_uuid(m.user_id),
          encode_role(m.role).to_owned(),
          m.nickname.clone(),
          m.is_muted,
          m.last_read_message_id,
          encode_dt(m.joined_at),
        )
      })
      .collect();

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        tx.execute(
          "INSERT INTO chat_rooms (
             room_id, kind, name, announcement, avatar_url, pair_key, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          rusqlite::params![
            room_str,
            kind_str,
            room.name,
            room.announcement,
            room.avatar_url,
            pair,
            created_str,
          ],
        )?;
        {
          let mut stmt = tx.prepare(
            "INSERT INTO chat_room_members (
               room_id, user_id, role, nickname, is_muted, last_read_message_id, joined_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          )?;
          for (user_str, role_str, nickname, is_muted, last_read, joined_str) in member_rows {
            stmt.execute(rusqlite::params![
              room_str, user_str, role_str, nickname, is_muted, last_read, joined_str,
            ])?;
          }
        }
        tx.commit()?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn get_room(&self, room_id: Uuid) -> Result<Option<ChatRoom>> {
    let id_str = encode_uuid(room_id);

    let raw: Option<RawRoom> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {} FROM chat_rooms WHERE room_id = ?1", RawRoom::COLUMNS),
              rusqlite::params![id_str],
              RawRoom::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawRoom::into_room).transpose()
  }

  async fn update_room(&self, room: ChatRoom) -> Result<()> {
    let id_str = encode_uuid(room.room_id);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "UPDATE chat_rooms SET name = ?2, announcement = ?3, avatar_url = ?4
           WHERE room_id = ?1",
          rusqlite::params![id_str, room.name, room.announcement, room.avatar_url],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn list_rooms_for_user(&self, user_id: Uuid, kind: Option<RoomKind>) -> Result<Vec<ChatRoom>> {
    let user_str = encode_uuid(user_id);
    let kind_str = kind.map(encode_room_kind).map(str::to_owned);

    let raws: Vec<RawRoom> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT r.room_id, r.kind, r.name, r.announcement, r.avatar_url, r.created_at
           FROM chat_rooms r
           JOIN chat_room_members m ON m.room_id = r.room_id
           WHERE m.user_id = ?1 AND (?2 IS NULL OR r.kind = ?2)
           ORDER BY r.created_at DESC",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![user_str, kind_str], RawRoom::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawRoom::into_room).collect()
  }

  // ── Members ───────────────────────────────────────────────────────────────

  async fn add_member(&self, member: ChatRoomMember, max_members: u64) -> Result<bool> {
    let room_str   = encode_uuid(member.room_id);
    let user_str   = encode_uuid(member.user_id);
    let role_str   = encode_role(member.role).to_owned();
    let joined_str = encode_dt(member.joined_at);
    let cap        = i64::try_from(max_members).unwrap_or(i64::MAX);

    // The count is taken under the write lock, so concurrent adds to the same
    // room cannot all see a free seat.
    let added = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let count: i64 = tx.query_row(
          "SELECT COUNT(*) FROM chat_room_members WHERE room_id = ?1",
          rusqlite::params![room_str],
          |r| r.get(0),
        )?;
        if count >= cap {
          return Ok(false);
        }
        tx.execute(
          "INSERT INTO chat_room_members (
             room_id, user_id, role, nickname, is_muted, last_read_message_id, joined_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          rusqlite::params![
            room_str,
            user_str,
            role_str,
            member.nickname,
            member.is_muted,
            member.last_read_message_id,
            joined_str,
          ],
        )?;
        tx.commit()?;
        Ok(true)
      })
      .await?;
    Ok(added)
  }

  async fn get_member(&self, room_id: Uuid, user_id: Uuid) -> Result<Option<ChatRoomMember>> {
    let room_str = encode_uuid(room_id);
    let user_str = encode_uuid(user_id);

    let raw: Option<RawMember> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {} FROM chat_room_members WHERE room_id = ?1 AND user_id = ?2",
                RawMember::COLUMNS
              ),
              rusqlite::params![room_str, user_str],
              RawMember::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawMember::into_member).transpose()
  }

  async fn list_members(&self, room_id: Uuid) -> Result<Vec<ChatRoomMember>> {
    let room_str = encode_uuid(room_id);

    let raws: Vec<RawMember> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {} FROM chat_room_members WHERE room_id = ?1 ORDER BY joined_at, rowid",
          RawMember::COLUMNS
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![room_str], RawMember::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawMember::into_member).collect()
  }

  async fn count_members(&self, room_id: Uuid) -> Result<u64> {
    let room_str = encode_uuid(room_id);

    let count: i64 = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          "SELECT COUNT(*) FROM chat_room_members WHERE room_id = ?1",
          rusqlite::params![room_str],
          |r| r.get(0),
        )?)
      })
      .await?;
    Ok(u64::try_from(count).unwrap_or_default())
  }

  async fn update_member(&self, member: ChatRoomMember) -> Result<()> {
    let room_str = encode_uuid(member.room_id);
    let user_str = encode_uuid(member.user_id);
    let role_str = encode_role(member.role).to_owned();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "UPDATE chat_room_members SET role = ?3, nickname = ?4, is_muted = ?5
           WHERE room_id = ?1 AND user_id = ?2",
          rusqlite::params![room_str, user_str, role_str, member.nickname, member.is_muted],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn remove_member(&self, room_id: Uuid, user_id: Uuid) -> Result<bool> {
    let room_str = encode_uuid(room_id);
    let user_str = encode_uuid(user_id);

    let removed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM chat_room_members WHERE room_id = ?1 AND user_id = ?2",
          rusqlite::params![room_str, user_str],
        )?)
      })
      .await?;
    Ok(removed > 0)
  }

  async fn advance_read_cursor(&self, room_id: Uuid, user_id: Uuid, message_id: i64) -> Result<bool> {
    let room_str = encode_uuid(room_id);
    let user_str = encode_uuid(user_id);

    // The comparison lives in the statement so concurrent markers can only
    // ever move the cursor forward.
    let moved = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE chat_room_members SET last_read_message_id = ?3
           WHERE room_id = ?1 AND user_id = ?2 AND last_read_message_id < ?3",
          rusqlite::params![room_str, user_str, message_id],
        )?)
      })
      .await?;
    Ok(moved > 0)
  }

  // ── Messages ──────────────────────────────────────────────────────────────

  async fn insert_message(&self, message: NewMessage) -> Result<Message> {
    let created_at = Utc::now();
    let room_str   = encode_uuid(message.room_id);
    let sender_str = encode_uuid(message.sender_id);
    let type_str   = encode_content_type(message.content_type).to_owned();
    let created_str = encode_dt(created_at);
    let content    = message.content.clone();

    let message_id: i64 = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let next: i64 = tx.query_row(
          "SELECT COALESCE(MAX(message_id), 0) + 1 FROM messages WHERE room_id = ?1",
          rusqlite::params![room_str],
          |r| r.get(0),
        )?;
        tx.execute(
          "INSERT INTO messages (
             room_id, message_id, sender_id, content_type, content, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![room_str, next, sender_str, type_str, content, created_str],
        )?;
        tx.commit()?;
        Ok(next)
      })
      .await?;

    Ok(Message {
      message_id,
      room_id: message.room_id,
      sender_id: message.sender_id,
      content_type: message.content_type,
      content: message.content,
      created_at,
      media: Vec::new(),
    })
  }

  async fn get_message(&self, room_id: Uuid, message_id: i64) -> Result<Option<Message>> {
    let room_str = encode_uuid(room_id);

    let raw: Option<RawMessage> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {} FROM messages WHERE room_id = ?1 AND message_id = ?2",
                RawMessage::COLUMNS
              ),
              rusqlite::params![room_str, message_id],
              RawMessage::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    let Some(raw) = raw else { return Ok(None) };
    let mut message = raw.into_message()?;
    if let Some(media) = self.media_for(room_id, message_id, message_id).await?.remove(&message_id) {
      message.media = media;
    }
    Ok(Some(message))
  }

  async fn list_messages(&self, room_id: Uuid, before_id: Option<i64>, limit: u32) -> Result<Vec<Message>> {
    let room_str = encode_uuid(room_id);

    let raws: Vec<RawMessage> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {} FROM messages
           WHERE room_id = ?1 AND (?2 IS NULL OR message_id < ?2)
           ORDER BY message_id DESC
           LIMIT ?3",
          RawMessage::COLUMNS
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![room_str, before_id, limit], RawMessage::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    let mut messages = raws
      .into_iter()
      .map(RawMessage::into_message)
      .collect::<Result<Vec<_>>>()?;

    if let (Some(newest), Some(oldest)) = (messages.first(), messages.last()) {
      let mut media = self.media_for(room_id, oldest.message_id, newest.message_id).await?;
      for message in &mut messages {
        if let Some(items) = media.remove(&message.message_id) {
          message.media = items;
        }
      }
    }
    Ok(messages)
  }

  async fn latest_message_id(&self, room_id: Uuid) -> Result<i64> {
    let room_str = encode_uuid(room_id);

    let latest: i64 = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          "SELECT COALESCE(MAX(message_id), 0) FROM messages WHERE room_id = ?1",
          rusqlite::params![room_str],
          |r| r.get(0),
        )?)
      })
      .await?;
    Ok(latest)
  }

  async fn add_media(&self, media: MessageMedia) -> Result<()> {
    let media_str = encode_uuid(media.media_id);
    let room_str  = encode_uuid(media.room_id);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO message_media (
             media_id, room_id, message_id, media_type, url, filename, size
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          rusqlite::params![
            media_str,
            room_str,
            media.message_id,
            media.media_type,
            media.url,
            media.filename,
            media.size,
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Pins ──────────────────────────────────────────────────────────────────

  async fn pin_room(&self, user_id: Uuid, room_id: Uuid) -> Result<()> {
    let user_str = encode_uuid(user_id);
    let room_str = encode_uuid(room_id);
    let at_str   = encode_dt(Utc::now());

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT OR IGNORE INTO room_pins (user_id, room_id, pinned_at) VALUES (?1, ?2, ?3)",
          rusqlite::params![user_str, room_str, at_str],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn unpin_room(&self, user_id: Uuid, room_id: Uuid) -> Result<()> {
    let user_str = encode_uuid(user_id);
    let room_str = encode_uuid(room_id);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "DELETE FROM room_pins WHERE user_id = ?1 AND room_id = ?2",
          rusqlite::params![user_str, room_str],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn list_pinned_rooms(&self, user_id: Uuid) -> Result<Vec<Uuid>> {
    let user_str = encode_uuid(user_id);

    let ids: Vec<String> = self
      .conn
      .call(move |conn| {
        let mut stmt =
          conn.prepare("SELECT room_id FROM room_pins WHERE user_id = ?1 ORDER BY pinned_at DESC")?;
        let rows = stmt
          .query_map(rusqlite::params![user_str], |r| r.get(0))?
          .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(rows)
      })
      .await?;

    ids.iter().map(|s| decode_uuid(s)).collect()
  }
}
