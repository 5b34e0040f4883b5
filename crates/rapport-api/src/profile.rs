//! Handlers for the caller's own profile.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `PUT`  | `/me` | Body: [`ProfileClaims`]; mirrors the identity provider's claims |
//! | `GET`  | `/users/{user}` | 404 if the user never synced |

use axum::{
  Json,
  extract::{Path, State},
};
use rapport_core::{
  Error,
  storage::ObjectStorage,
  store::SocialStore,
  user::{ProfileClaims, User},
};
use uuid::Uuid;

use crate::{AppState, error::ApiError, identity::Identity};

/// `PUT /me`
pub async fn sync<S, O>(
  State(state): State<AppState<S, O>>,
  Identity(me): Identity,
  Json(claims): Json<ProfileClaims>,
) -> Result<Json<User>, ApiError>
where
  S: SocialStore + 'static,
  O: ObjectStorage + 'static,
{
  if claims.nickname.trim().is_empty() {
    return Err(Error::InvalidInput("nickname is required".into()).into());
  }
  let user = state.chat.users().sync(claims.into_user(me)).await?;
  tracing::debug!(user_id = %me, "profile synced");
  Ok(Json(user))
}

/// `GET /users/{user}`
pub async fn get_user<S, O>(
  State(state): State<AppState<S, O>>,
  Identity(_): Identity,
  Path(user_id): Path<Uuid>,
) -> Result<Json<User>, ApiError>
where
  S: SocialStore + 'static,
  O: ObjectStorage + 'static,
{
  Ok(Json(state.chat.users().require(user_id).await?))
}
