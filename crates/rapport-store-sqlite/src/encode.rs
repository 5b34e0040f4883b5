//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as fixed-width RFC 3339 strings (microseconds, `Z`)
//! so they sort lexically. UUIDs are stored as hyphenated lowercase strings.
//! Enums are stored as their lowercase names.

use chrono::{DateTime, SecondsFormat, Utc};
use rapport_core::{
  message::{ContentType, Message, MessageMedia},
  relationship::{Relationship, RelationshipStatus},
  room::{ChatRoom, ChatRoomMember, Role, RoomKind},
  user::{Privacy, User},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

/// Order-independent key identifying the pair of an individual room.
pub fn pair_key(a: Uuid, b: Uuid) -> String {
  let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
  format!("{}:{}", encode_uuid(lo), encode_uuid(hi))
}

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339_opts(SecondsFormat::Micros, true) }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Enums ───────────────────────────────────────────────────────────────────

fn unknown(column: &'static str, value: &str) -> Error {
  Error::Decode { column, value: value.to_owned() }
}

pub fn encode_privacy(p: Privacy) -> &'static str {
  match p {
    Privacy::Public => "public",
    Privacy::Friends => "friends",
    Privacy::Private => "private",
  }
}

pub fn decode_privacy(s: &str) -> Result<Privacy> {
  match s {
    "public" => Ok(Privacy::Public),
    "friends" => Ok(Privacy::Friends),
    "private" => Ok(Privacy::Private),
    other => Err(unknown("privacy", other)),
  }
}

pub fn encode_status(s: RelationshipStatus) -> &'static str {
  match s {
    RelationshipStatus::Pending => "pending",
    RelationshipStatus::Accepted => "accepted",
    RelationshipStatus::Blocked => "blocked",
  }
}

pub fn decode_status(s: &str) -> Result<RelationshipStatus> {
  match s {
    "pending" => Ok(RelationshipStatus::Pending),
    "accepted" => Ok(RelationshipStatus::Accepted),
    "blocked" => Ok(RelationshipStatus::Blocked),
    other => Err(unknown("status", other)),
  }
}

pub fn encode_room_kind(k: RoomKind) -> &'static str {
  match k {
    RoomKind::Individual => "individual",
    RoomKind::Group => "group",
  }
}

pub fn decode_room_kind(s: &str) -> Result<RoomKind> {
  match s {
    "individual" => Ok(RoomKind::Individual),
    "group" => Ok(RoomKind::Group),
    other => Err(unknown("kind", other)),
  }
}

pub fn encode_role(r: Role) -> &'static str {
  match r {
    Role::Owner => "owner",
    Role::Admin => "admin",
    Role::Member => "member",
  }
}

pub fn decode_role(s: &str) -> Result<Role> {
  match s {
    "owner" => Ok(Role::Owner),
    "admin" => Ok(Role::Admin),
    "member" => Ok(Role::Member),
    other => Err(unknown("role", other)),
  }
}

pub fn encode_content_type(c: ContentType) -> &'static str {
  match c {
    ContentType::Text => "text",
    ContentType::Image => "image",
    ContentType::File => "file",
    ContentType::System => "system",
  }
}

pub fn decode_content_type(s: &str) -> Result<ContentType> {
  match s {
    "text" => Ok(ContentType::Text),
    "image" => Ok(ContentType::Image),
    "file" => Ok(ContentType::File),
    "system" => Ok(ContentType::System),
    other => Err(unknown("content_type", other)),
  }
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `users` row.
pub struct RawUser {
  pub user_id:    String,
  pub nickname:   String,
  pub avatar_url: Option<String>,
  pub privacy:    String,
  pub created_at: String,
}

impl RawUser {
  pub const COLUMNS: &'static str = "user_id, nickname, avatar_url, privacy, created_at";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      user_id:    row.get(0)?,
      nickname:   row.get(1)?,
      avatar_url: row.get(2)?,
      privacy:    row.get(3)?,
      created_at: row.get(4)?,
    })
  }

  pub fn into_user(self) -> Result<User> {
    Ok(User {
      user_id:    decode_uuid(&self.user_id)?,
      nickname:   self.nickname,
      avatar_url: self.avatar_url,
      privacy:    decode_privacy(&self.privacy)?,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read directly from a `relationships` row.
pub struct RawRelationship {
  pub relationship_id: String,
  pub follower_id:     String,
  pub following_id:    String,
  pub status:          String,
  pub created_at:      String,
  pub accepted_at:     Option<String>,
}

impl RawRelationship {
  pub const COLUMNS: &'static str =
    "relationship_id, follower_id, following_id, status, created_at, accepted_at";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      relationship_id: row.get(0)?,
      follower_id:     row.get(1)?,
      following_id:    row.get(2)?,
      status:          row.get(3)?,
      created_at:      row.get(4)?,
      accepted_at:     row.get(5)?,
    })
  }

  pub fn into_relationship(self) -> Result<Relationship> {
    Ok(Relationship {
      relationship_id: decode_uuid(&self.relationship_id)?,
      follower_id:     decode_uuid(&self.follower_id)?,
      following_id:    decode_uuid(&self.following_id)?,
      status:          decode_status(&self.status)?,
      created_at:      decode_dt(&self.created_at)?,
      accepted_at:     self.accepted_at.as_deref().map(decode_dt).transpose()?,
    })
  }
}

/// Raw strings read directly from a `chat_rooms` row.
pub struct RawRoom {
  pub room_id:      String,
  pub kind:         String,
  pub name:         String,
  pub announcement: String,
  pub avatar_url:   Option<String>,
  pub created_at:   String,
}

impl RawRoom {
  pub const COLUMNS: &'static str = "room_id, kind, name, announcement, avatar_url, created_at";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      room_id:      row.get(0)?,
      kind:         row.get(1)?,
      name:         row.get(2)?,
      announcement: row.get(3)?,
      avatar_url:   row.get(4)?,
      created_at:   row.get(5)?,
    })
  }

  pub fn into_room(self) -> Result<ChatRoom> {
    Ok(ChatRoom {
      room_id:      decode_uuid(&self.room_id)?,
      kind:         decode_room_kind(&self.kind)?,
      name:         self.name,
      announcement: self.announcement,
      avatar_url:   self.avatar_url,
      created_at:   decode_dt(&self.created_at)?,
    })
  }
}

/// Raw values read directly from a `chat_room_members` row.
pub struct RawMember {
  pub room_id:              String,
  pub user_id:              String,
  pub role:                 String,
  pub nickname:             String,
  pub is_muted:             bool,
  pub last_read_message_id: i64,
  pub joined_at:            String,
}

impl RawMember {
  pub const COLUMNS: &'static str =
    "room_id, user_id, role, nickname, is_muted, last_read_message_id, joined_at";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      room_id:              row.get(0)?,
      user_id:              row.get(1)?,
      role:                 row.get(2)?,
      nickname:             row.get(3)?,
      is_muted:             row.get(4)?,
      last_read_message_id: row.get(5)?,
      joined_at:            row.get(6)?,
    })
  }

  pub fn into_member(self) -> Result<ChatRoomMember> {
    Ok(ChatRoomMember {
      room_id:              decode_uuid(&self.room_id)?,
      user_id:              decode_uuid(&self.user_id)?,
      role:                 decode_role(&self.role)?,
      nickname:             self.nickname,
      is_muted:             self.is_muted,
      last_read_message_id: self.last_read_message_id,
      joined_at:            decode_dt(&self.joined_at)?,
    })
  }
}

/// Raw values read directly from a `messages` row.
pub struct RawMessage {
  pub room_id:      String,
  pub message_id:   i64,
  pub sender_id:    String,
  pub content_type: String,
  pub content:      String,
  pub created_at:   String,
}

impl RawMessage {
  pub const COLUMNS: &'static str =
    "room_id, message_id, sender_id, content_type, content, created_at";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      room_id:      row.get(0)?,
      message_id:   row.get(1)?,
      sender_id:    row.get(2)?,
      content_type: row.get(3)?,
      content:      row.get(4)?,
      created_at:   row.get(5)?,
    })
  }

  /// Decode without media; the caller attaches media rows separately.
  pub fn into_message(self) -> Result<Message> {
    Ok(Message {
      message_id:   self.message_id,
      room_id:      decode_uuid(&self.room_id)?,
      sender_id:    decode_uuid(&self.sender_id)?,
      content_type: decode_content_type(&self.content_type)?,
      content:      self.content,
      created_at:   decode_dt(&self.created_at)?,
      media:        Vec::new(),
    })
  }
}

/// Raw values read directly from a `message_media` row.
pub struct RawMedia {
  pub media_id:   String,
  pub room_id:    String,
  pub message_id: i64,
  pub media_type: String,
  pub url:        String,
  pub filename:   String,
  pub size:       i64,
}

impl RawMedia {
  pub const COLUMNS: &'static str = "media_id, room_id, message_id, media_type, url, filename, size";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      media_id:   row.get(0)?,
      room_id:    row.get(1)?,
      message_id: row.get(2)?,
      media_type: row.get(3)?,
      url:        row.get(4)?,
      filename:   row.get(5)?,
      size:       row.get(6)?,
    })
  }

  pub fn into_media(self) -> Result<MessageMedia> {
    Ok(MessageMedia {
      media_id:   decode_uuid(&self.media_id)?,
      room_id:    decode_uuid(&self.room_id)?,
      message_id: self.message_id,
      media_type: self.media_type,
      url:        self.url,
      filename:   self.filename,
      size:       self.size,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn pair_key_ignores_order() {
    let a = Uuid::new_v4();
    let b = Uuid::new_v4();
    assert_eq!(pair_key(a, b), pair_key(b, a));
  }

  #[test]
  fn timestamps_sort_lexically() {
    let early = encode_dt(DateTime::from_timestamp(1_700_000_000, 0).unwrap());
    let late = encode_dt(DateTime::from_timestamp(1_700_000_000, 500_000_000).unwrap());
    assert!(early < late);
    assert_eq!(decode_dt(&early).unwrap().timestamp(), 1_700_000_000);
  }
}
