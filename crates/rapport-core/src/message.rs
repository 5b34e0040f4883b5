//! Messages and their attached media. Both are immutable once stored.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
  #[default]
  Text,
  Image,
  File,
  System,
}

/// A stored message. `message_id` increases strictly within a room and is the
/// unit of the read cursor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
  pub message_id:   i64,
  pub room_id:      Uuid,
  pub sender_id:    Uuid,
  pub content_type: ContentType,
  pub content:      String,
  pub created_at:   DateTime<Utc>,
  pub media:        Vec<MessageMedia>,
}

/// Input for [`crate::store::SocialStore::insert_message`]. The store assigns
/// the id and timestamp.
#[derive(Debug, Clone)]
pub struct NewMessage {
  pub room_id:      Uuid,
  pub sender_id:    Uuid,
  pub content_type: ContentType,
  pub content:      String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageMedia {
  pub media_id:   Uuid,
  pub room_id:    Uuid,
  pub message_id: i64,
  pub media_type: String,
  pub url:        String,
  pub filename:   String,
  pub size:       i64,
}

/// A file attached to an outgoing message, before upload.
#[derive(Debug, Clone)]
pub struct Attachment {
  pub filename:   String,
  pub media_type: String,
  pub data:       Bytes,
}
