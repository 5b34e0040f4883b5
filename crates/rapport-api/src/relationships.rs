//! Handlers for the follow graph.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `POST`   | `/follows/{user}` | 201 + edge; `accepted` at once for public users |
//! | `DELETE` | `/follows/{user}` | Idempotent |
//! | `POST`   | `/follow-requests/{follower}/accept` | Pending only |
//! | `POST`   | `/follow-requests/{follower}/reject` | Idempotent |
//! | `POST`   | `/blocks/{user}` | Severs both directions |
//! | `DELETE` | `/blocks/{user}` | Idempotent |
//! | `GET`    | `/relationships/{user}` | Predicates between caller and `user` |
//! | `GET`    | `/users/{user}/followers` | `?status=&page=&size=` |
//! | `GET`    | `/users/{user}/followings` | `?status=&page=&size=` |
//! | `GET`    | `/me/friends` | `?page=&size=` |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use rapport_core::{
  page::{Page, PageRequest},
  relationship::{Relationship, RelationshipStatus},
  storage::ObjectStorage,
  store::SocialStore,
  user::User,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{AppState, error::ApiError, identity::Identity};

// ─── Lifecycle ────────────────────────────────────────────────────────────────

/// `POST /follows/{user}`
pub async fn follow<S, O>(
  State(state): State<AppState<S, O>>,
  Identity(me): Identity,
  Path(target): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError>
where
  S: SocialStore + 'static,
  O: ObjectStorage + 'static,
{
  let rel = state.relationships.follow(me, target).await?;
  Ok((StatusCode::CREATED, Json(rel)))
}

/// `DELETE /follows/{user}`
pub async fn unfollow<S, O>(
  State(state): State<AppState<S, O>>,
  Identity(me): Identity,
  Path(target): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: SocialStore + 'static,
  O: ObjectStorage + 'static,
{
  state.relationships.unfollow(me, target).await?;
  Ok(StatusCode::NO_CONTENT)
}

/// `POST /follow-requests/{follower}/accept`
pub async fn accept<S, O>(
  State(state): State<AppState<S, O>>,
  Identity(me): Identity,
  Path(follower): Path<Uuid>,
) -> Result<Json<Relationship>, ApiError>
where
  S: SocialStore + 'static,
  O: ObjectStorage + 'static,
{
  Ok(Json(state.relationships.accept_follow(me, follower).await?))
}

/// `POST /follow-requests/{follower}/reject`
pub async fn reject<S, O>(
  State(state): State<AppState<S, O>>,
  Identity(me): Identity,
  Path(follower): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: SocialStore + 'static,
  O: ObjectStorage + 'static,
{
  state.relationships.reject_follow(me, follower).await?;
  Ok(StatusCode::NO_CONTENT)
}

/// `POST /blocks/{user}`
pub async fn block<S, O>(
  State(state): State<AppState<S, O>>,
  Identity(me): Identity,
  Path(target): Path<Uuid>,
) -> Result<Json<Relationship>, ApiError>
where
  S: SocialStore + 'static,
  O: ObjectStorage + 'static,
{
  Ok(Json(state.relationships.block(me, target).await?))
}

/// `DELETE /blocks/{user}`
pub async fn unblock<S, O>(
  State(state): State<AppState<S, O>>,
  Identity(me): Identity,
  Path(target): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: SocialStore + 'static,
  O: ObjectStorage + 'static,
{
  state.relationships.unblock(me, target).await?;
  Ok(StatusCode::NO_CONTENT)
}

// ─── Predicates ───────────────────────────────────────────────────────────────

/// How the caller and another user relate, seen from the caller.
#[derive(Debug, Serialize, Deserialize)]
pub struct RelationshipView {
  pub following:  bool,
  pub followed:   bool,
  pub blocking:   bool,
  pub blocked_by: bool,
  pub friend:     bool,
}

/// `GET /relationships/{user}`
pub async fn view<S, O>(
  State(state): State<AppState<S, O>>,
  Identity(me): Identity,
  Path(other): Path<Uuid>,
) -> Result<Json<RelationshipView>, ApiError>
where
  S: SocialStore + 'static,
  O: ObjectStorage + 'static,
{
  let graph = &state.relationships;
  let following = graph.is_following(me, other).await?;
  let followed = graph.is_followed(me, other).await?;
  Ok(Json(RelationshipView {
    following,
    followed,
    blocking: graph.is_blocked(me, other).await?,
    blocked_by: graph.is_blocked(other, me).await?,
    friend: following && followed,
  }))
}

// ─── Listings ─────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub status: Option<RelationshipStatus>,
  #[serde(default)]
  pub page:   u32,
  #[serde(default)]
  pub size:   u32,
}

/// `GET /users/{user}/followers`
pub async fn followers<S, O>(
  State(state): State<AppState<S, O>>,
  Identity(_): Identity,
  Path(user): Path<Uuid>,
  Query(params): Query<ListParams>,
) -> Result<Json<Page<Relationship>>, ApiError>
where
  S: SocialStore + 'static,
  O: ObjectStorage + 'static,
{
  let page = PageRequest::new(params.page, params.size);
  Ok(Json(state.relationships.get_followers(user, params.status, page).await?))
}

/// `GET /users/{user}/followings`
pub async fn followings<S, O>(
  State(state): State<AppState<S, O>>,
  Identity(_): Identity,
  Path(user): Path<Uuid>,
  Query(params): Query<ListParams>,
) -> Result<Json<Page<Relationship>>, ApiError>
where
  S: SocialStore + 'static,
  O: ObjectStorage + 'static,
{
  let page = PageRequest::new(params.page, params.size);
  Ok(Json(state.relationships.get_followings(user, params.status, page).await?))
}

#[derive(Debug, Deserialize)]
pub struct PageParams {
  #[serde(default)]
  pub page: u32,
  #[serde(default)]
  pub size: u32,
}

/// `GET /me/friends`
pub async fn friends<S, O>(
  State(state): State<AppState<S, O>>,
  Identity(me): Identity,
  Query(params): Query<PageParams>,
) -> Result<Json<Page<User>>, ApiError>
where
  S: SocialStore + 'static,
  O: ObjectStorage + 'static,
{
  let page = PageRequest::new(params.page, params.size);
  Ok(Json(state.relationships.get_friends(me, page).await?))
}
