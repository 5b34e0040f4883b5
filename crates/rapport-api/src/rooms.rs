//! Handlers for rooms, memberships and pins.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `POST`   | `/private-rooms/{user}` | Returns the pair's room, creating it once |
//! | `GET`    | `/rooms` | Caller's rooms, pinned first |
//! | `POST`   | `/rooms` | Body: [`CreateGroupBody`]; 201 |
//! | `GET`    | `/rooms/{room}` | Room plus members |
//! | `PATCH`  | `/rooms/{room}` | Body: [`RoomPatch`]; admin or owner |
//! | `GET`    | `/rooms/{room}/members` | |
//! | `POST`   | `/rooms/{room}/members` | Body: `{"user_id":"…"}`; 201 |
//! | `PATCH`  | `/rooms/{room}/members/{user}` | Body: [`MemberPatch`] |
//! | `DELETE` | `/rooms/{room}/members/{user}` | |
//! | `POST`   | `/rooms/{room}/leave` | Owners cannot leave |
//! | `PUT`    | `/rooms/{room}/pin` | |
//! | `DELETE` | `/rooms/{room}/pin` | No membership required |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use rapport_core::{
  room::{ChatRoom, ChatRoomMember, MemberPatch, RoomDetail, RoomPatch, RoomSummary},
  storage::ObjectStorage,
  store::SocialStore,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{AppState, error::ApiError, identity::Identity};

// ─── Rooms ────────────────────────────────────────────────────────────────────

/// `POST /private-rooms/{user}`
pub async fn private_room<S, O>(
  State(state): State<AppState<S, O>>,
  Identity(me): Identity,
  Path(other): Path<Uuid>,
) -> Result<Json<ChatRoom>, ApiError>
where
  S: SocialStore + 'static,
  O: ObjectStorage + 'static,
{
  Ok(Json(state.chat.create_private_room(me, other).await?))
}

#[derive(Debug, Deserialize)]
pub struct CreateGroupBody {
  pub name:         String,
  #[serde(default)]
  pub announcement: String,
  #[serde(default)]
  pub members:      Vec<Uuid>,
}

/// `POST /rooms`
pub async fn create_group<S, O>(
  State(state): State<AppState<S, O>>,
  Identity(me): Identity,
  Json(body): Json<CreateGroupBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: SocialStore + 'static,
  O: ObjectStorage + 'static,
{
  let room = state
    .chat
    .create_group_room(me, body.name, body.announcement, body.members)
    .await?;
  Ok((StatusCode::CREATED, Json(room)))
}

/// `GET /rooms`
pub async fn list<S, O>(
  State(state): State<AppState<S, O>>,
  Identity(me): Identity,
) -> Result<Json<Vec<RoomSummary>>, ApiError>
where
  S: SocialStore + 'static,
  O: ObjectStorage + 'static,
{
  Ok(Json(state.chat.list_rooms(me).await?))
}

/// `GET /rooms/{room}`
pub async fn get_one<S, O>(
  State(state): State<AppState<S, O>>,
  Identity(me): Identity,
  Path(room_id): Path<Uuid>,
) -> Result<Json<RoomDetail>, ApiError>
where
  S: SocialStore + 'static,
  O: ObjectStorage + 'static,
{
  Ok(Json(state.chat.get_room(me, room_id).await?))
}

/// `PATCH /rooms/{room}`
pub async fn update<S, O>(
  State(state): State<AppState<S, O>>,
  Identity(me): Identity,
  Path(room_id): Path<Uuid>,
  Json(patch): Json<RoomPatch>,
) -> Result<Json<ChatRoom>, ApiError>
where
  S: SocialStore + 'static,
  O: ObjectStorage + 'static,
{
  Ok(Json(state.chat.update_room(me, room_id, patch).await?))
}

// ─── Members ──────────────────────────────────────────────────────────────────

/// `GET /rooms/{room}/members`
pub async fn members<S, O>(
  State(state): State<AppState<S, O>>,
  Identity(me): Identity,
  Path(room_id): Path<Uuid>,
) -> Result<Json<Vec<ChatRoomMember>>, ApiError>
where
  S: SocialStore + 'static,
  O: ObjectStorage + 'static,
{
  Ok(Json(state.chat.list_members(me, room_id).await?))
}

#[derive(Debug, Deserialize)]
pub struct AddMemberBody {
  pub user_id: Uuid,
}

/// `POST /rooms/{room}/members`
pub async fn add_member<S, O>(
  State(state): State<AppState<S, O>>,
  Identity(me): Identity,
  Path(room_id): Path<Uuid>,
  Json(body): Json<AddMemberBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: SocialStore + 'static,
  O: ObjectStorage + 'static,
{
  let member = state.chat.add_member(me, room_id, body.user_id).await?;
  Ok((StatusCode::CREATED, Json(member)))
}

/// `PATCH /rooms/{room}/members/{user}`
pub async fn update_member<S, O>(
  State(state): State<AppState<S, O>>,
  Identity(me): Identity,
  Path((room_id, user_id)): Path<(Uuid, Uuid)>,
  Json(patch): Json<MemberPatch>,
) -> Result<Json<ChatRoomMember>, ApiError>
where
  S: SocialStore + 'static,
  O: ObjectStorage + 'static,
{
  Ok(Json(state.chat.update_member(me, room_id, user_id, patch).await?))
}

/// `DELETE /rooms/{room}/members/{user}`
pub async fn remove_member<S, O>(
  State(state): State<AppState<S, O>>,
  Identity(me): Identity,
  Path((room_id, user_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, ApiError>
where
  S: SocialStore + 'static,
  O: ObjectStorage + 'static,
{
  state.chat.remove_member(me, room_id, user_id).await?;
  Ok(StatusCode::NO_CONTENT)
}

/// `POST /rooms/{room}/leave`
pub async fn leave<S, O>(
  State(state): State<AppState<S, O>>,
  Identity(me): Identity,
  Path(room_id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: SocialStore + 'static,
  O: ObjectStorage + 'static,
{
  state.chat.leave_room(me, room_id).await?;
  Ok(StatusCode::NO_CONTENT)
}

// ─── Pins ─────────────────────────────────────────────────────────────────────

/// `PUT /rooms/{room}/pin`
pub async fn pin<S, O>(
  State(state): State<AppState<S, O>>,
  Identity(me): Identity,
  Path(room_id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: SocialStore + 'static,
  O: ObjectStorage + 'static,
{
  state.chat.pin_room(me, room_id).await?;
  Ok(StatusCode::NO_CONTENT)
}

/// `DELETE /rooms/{room}/pin`
pub async fn unpin<S, O>(
  State(state): State<AppState<S, O>>,
  Identity(me): Identity,
  Path(room_id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: SocialStore + 'static,
  O: ObjectStorage + 'static,
{
  state.chat.unpin_room(me, room_id).await?;
  Ok(StatusCode::NO_CONTENT)
}
