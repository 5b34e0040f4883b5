//! Handlers for messages and read state.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/rooms/{room}/messages` | Body: [`SendBody`]; files are base64; 201 |
//! | `GET`  | `/rooms/{room}/messages` | `?before_id=&limit=`; newest first |
//! | `POST` | `/rooms/{room}/read` | Body: `{"message_id":7}` |
//! | `GET`  | `/rooms/{room}/unread` | `{"unread_count":n}` |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use base64::{Engine as _, engine::general_purpose::STANDARD as B64};
use bytes::Bytes;
use rapport_core::{
  message::{Attachment, ContentType, Message},
  storage::ObjectStorage,
  store::SocialStore,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{AppState, error::ApiError, identity::Identity};

// ─── Send ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct FileBody {
  pub filename:   String,
  #[serde(default = "default_media_type")]
  pub media_type: String,
  /// Standard base64, padded.
  pub data:       String,
}

fn default_media_type() -> String { "application/octet-stream".to_owned() }

impl FileBody {
  fn decode(self) -> Result<Attachment, ApiError> {
    let data = B64
      .decode(self.data.as_bytes())
      .map_err(|e| ApiError::BadRequest(format!("file {}: {e}", self.filename)))?;
    Ok(Attachment { filename: self.filename, media_type: self.media_type, data: Bytes::from(data) })
  }
}

#[derive(Debug, Deserialize)]
pub struct SendBody {
  #[serde(default)]
  pub content_type: ContentType,
  #[serde(default)]
  pub content:      String,
  #[serde(default)]
  pub files:        Vec<FileBody>,
}

/// `POST /rooms/{room}/messages`
pub async fn send<S, O>(
  State(state): State<AppState<S, O>>,
  Identity(me): Identity,
  Path(room_id): Path<Uuid>,
  Json(body): Json<SendBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: SocialStore + 'static,
  O: ObjectStorage + 'static,
{
  let files = body
    .files
    .into_iter()
    .map(FileBody::decode)
    .collect::<Result<Vec<_>, _>>()?;
  let message = state
    .chat
    .send_message(me, room_id, body.content_type, body.content, files)
    .await?;
  Ok((StatusCode::CREATED, Json(message)))
}

// ─── History ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct HistoryParams {
  /// Return messages older than this id; `0` starts from the newest.
  #[serde(default)]
  pub before_id: i64,
  #[serde(default)]
  pub limit:     i64,
}

/// `GET /rooms/{room}/messages`
pub async fn history<S, O>(
  State(state): State<AppState<S, O>>,
  Identity(me): Identity,
  Path(room_id): Path<Uuid>,
  Query(params): Query<HistoryParams>,
) -> Result<Json<Vec<Message>>, ApiError>
where
  S: SocialStore + 'static,
  O: ObjectStorage + 'static,
{
  let messages = state
    .chat
    .get_messages(me, room_id, params.before_id, params.limit)
    .await?;
  Ok(Json(messages))
}

// ─── Read state ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ReadBody {
  pub message_id: i64,
}

/// `POST /rooms/{room}/read`
pub async fn mark_read<S, O>(
  State(state): State<AppState<S, O>>,
  Identity(me): Identity,
  Path(room_id): Path<Uuid>,
  Json(body): Json<ReadBody>,
) -> Result<StatusCode, ApiError>
where
  S: SocialStore + 'static,
  O: ObjectStorage + 'static,
{
  state.chat.mark_messages_as_read(me, room_id, body.message_id).await?;
  Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UnreadCount {
  pub unread_count: i64,
}

/// `GET /rooms/{room}/unread`
pub async fn unread<S, O>(
  State(state): State<AppState<S, O>>,
  Identity(me): Identity,
  Path(room_id): Path<Uuid>,
) -> Result<Json<UnreadCount>, ApiError>
where
  S: SocialStore + 'static,
  O: ObjectStorage + 'static,
{
  let unread_count = state.chat.get_unread_count(me, room_id).await?;
  Ok(Json(UnreadCount { unread_count }))
}
