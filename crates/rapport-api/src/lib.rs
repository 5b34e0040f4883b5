//! JSON REST API for Rapport.
//!
//! Exposes an axum [`Router`] over the relationship and chat engines. TLS and
//! authentication are the caller's responsibility; the verified user id is
//! read from the `x-user-id` header (see [`identity`]).
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", rapport_api::api_router(state))
//! ```

pub mod error;
pub mod identity;
pub mod messages;
pub mod profile;
pub mod relationships;
pub mod rooms;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, patch, post, put},
};
use rapport_core::{storage::ObjectStorage, store::SocialStore};
use rapport_engine::{ChatEngine, RelationshipEngine};

pub use error::ApiError;
pub use identity::Identity;

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all handlers.
pub struct AppState<S, O> {
  pub relationships: RelationshipEngine<S, O>,
  pub chat:          Arc<ChatEngine<S, O>>,
}

impl<S, O> Clone for AppState<S, O> {
  fn clone(&self) -> Self {
    Self { relationships: self.relationships.clone(), chat: self.chat.clone() }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S, O>(state: AppState<S, O>) -> Router<()>
where
  S: SocialStore + 'static,
  O: ObjectStorage + 'static,
{
  Router::new()
    // Profile
    .route("/me", put(profile::sync::<S, O>))
    .route("/me/friends", get(relationships::friends::<S, O>))
    .route("/users/{user}", get(profile::get_user::<S, O>))
    // Follow graph
    .route("/users/{user}/followers", get(relationships::followers::<S, O>))
    .route("/users/{user}/followings", get(relationships::followings::<S, O>))
    .route("/relationships/{user}", get(relationships::view::<S, O>))
    .route(
      "/follows/{user}",
      post(relationships::follow::<S, O>).delete(relationships::unfollow::<S, O>),
    )
    .route("/follow-requests/{user}/accept", post(relationships::accept::<S, O>))
    .route("/follow-requests/{user}/reject", post(relationships::reject::<S, O>))
    .route(
      "/blocks/{user}",
      post(relationships::block::<S, O>).delete(relationships::unblock::<S, O>),
    )
    // Rooms
    .route("/private-rooms/{user}", post(rooms::private_room::<S, O>))
    .route("/rooms", get(rooms::list::<S, O>).post(rooms::create_group::<S, O>))
    .route("/rooms/{room}", get(rooms::get_one::<S, O>).patch(rooms::update::<S, O>))
    .route(
      "/rooms/{room}/members",
      get(rooms::members::<S, O>).post(rooms::add_member::<S, O>),
    )
    .route(
      "/rooms/{room}/members/{user}",
      patch(rooms::update_member::<S, O>).delete(rooms::remove_member::<S, O>),
    )
    .route("/rooms/{room}/leave", post(rooms::leave::<S, O>))
    .route("/rooms/{room}/pin", put(rooms::pin::<S, O>).delete(rooms::unpin::<S, O>))
    // Messages
    .route(
      "/rooms/{room}/messages",
      get(messages::history::<S, O>).post(messages::send::<S, O>),
    )
    .route("/rooms/{room}/read", post(messages::mark_read::<S, O>))
    .route("/rooms/{room}/unread", get(messages::unread::<S, O>))
    .with_state(state)
}

// ─── Integration tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use std::sync::Arc;

  use axum::{
    body::Body,
    http::{Request, StatusCode},
  };
  use bytes::Bytes;
  use rapport_engine::{EngineConfig, UserDirectory};
  use rapport_store_sqlite::SqliteStore;
  use serde_json::{Value, json};
  use tower::ServiceExt as _;
  use uuid::Uuid;

  use super::*;
  use crate::identity::USER_ID_HEADER;

  struct NullStorage;

  impl ObjectStorage for NullStorage {
    type Error = std::io::Error;

    async fn upload(&self, _: Bytes, directory: String, filename: String) -> Result<String, Self::Error> {
      Ok(format!("null://{directory}/{filename}"))
    }
  }

  async fn make_state() -> AppState<SqliteStore, NullStorage> {
    let store = Arc::new(SqliteStore::open_in_memory().await.unwrap());
    let config = Arc::new(EngineConfig::default());
    let users = UserDirectory::new(store.clone(), None);
    let chat = Arc::new(ChatEngine::new(store.clone(), Arc::new(NullStorage), users, config.clone()));
    AppState {
      relationships: RelationshipEngine::new(store, chat.clone(), config),
      chat,
    }
  }

  async fn call(
    state:  &AppState<SqliteStore, NullStorage>,
    method: &str,
    uri:    &str,
    user:   Option<Uuid>,
    body:   Option<Value>,
  ) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(user) = user {
      builder = builder.header(USER_ID_HEADER, user.to_string());
    }
    let req = match body {
      Some(json) => builder
        .header("content-type", "application/json")
        .body(Body::from(json.to_string()))
        .unwrap(),
      None => builder.body(Body::empty()).unwrap(),
    };
    let resp = api_router(state.clone()).oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
    (status, value)
  }

  async fn signed_up(state: &AppState<SqliteStore, NullStorage>, nickname: &str, privacy: &str) -> Uuid {
    let id = Uuid::new_v4();
    let (status, _) = call(
      state,
      "PUT",
      "/me",
      Some(id),
      Some(json!({ "nickname": nickname, "privacy": privacy })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    id
  }

  // ── Identity ────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn requests_without_identity_are_unauthorized() {
    let state = make_state().await;
    let (status, body) = call(&state, "GET", "/rooms", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"].as_str().unwrap().contains(USER_ID_HEADER));

    let req = Request::builder()
      .uri("/rooms")
      .header(USER_ID_HEADER, "not-a-uuid")
      .body(Body::empty())
      .unwrap();
    let resp = api_router(state).oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
  }

  // ── Follow graph ────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn mutual_follow_over_http_opens_a_private_room() {
    let state = make_state().await;
    let a = signed_up(&state, "a", "public").await;
    let b = signed_up(&state, "b", "private").await;

    let (status, rel) = call(&state, "POST", &format!("/follows/{b}"), Some(a), None).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(rel["status"], "pending");

    let (status, _) = call(&state, "POST", &format!("/follows/{b}"), Some(a), None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, rel) =
      call(&state, "POST", &format!("/follow-requests/{a}/accept"), Some(b), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(rel["status"], "accepted");

    let (status, _) = call(&state, "POST", &format!("/follows/{a}"), Some(b), None).await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, view) = call(&state, "GET", &format!("/relationships/{b}"), Some(a), None).await;
    assert_eq!(view["friend"], true);

    let (_, rooms) = call(&state, "GET", "/rooms", Some(a), None).await;
    assert_eq!(rooms.as_array().unwrap().len(), 1);
    assert_eq!(rooms[0]["room"]["kind"], "individual");

    let (_, followers) =
      call(&state, "GET", &format!("/users/{b}/followers?status=accepted"), Some(a), None).await;
    assert_eq!(followers["total"], 1);
  }

  #[tokio::test]
  async fn self_follow_is_a_bad_request() {
    let state = make_state().await;
    let a = signed_up(&state, "a", "public").await;
    let (status, _) = call(&state, "POST", &format!("/follows/{a}"), Some(a), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
  }

  // ── Rooms and messages ──────────────────────────────────────────────────────

  #[tokio::test]
  async fn group_chat_round_trip() {
    let state = make_state().await;
    let owner = signed_up(&state, "owner", "public").await;
    let member = signed_up(&state, "member", "public").await;

    let (status, room) = call(
      &state,
      "POST",
      "/rooms",
      Some(owner),
      Some(json!({ "name": "hikers", "members": [member] })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let room_id = room["room_id"].as_str().unwrap().to_owned();

    let (status, message) = call(
      &state,
      "POST",
      &format!("/rooms/{room_id}/messages"),
      Some(owner),
      Some(json!({
        "content": "trail at nine",
        "files": [{ "filename": "map.txt", "data": "dHJhaWw=" }],
      })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(message["media"][0]["url"], "null://chat/map.txt");
    assert_eq!(message["media"][0]["size"], 5);

    let (_, unread) = call(&state, "GET", &format!("/rooms/{room_id}/unread"), Some(member), None).await;
    assert_eq!(unread["unread_count"], 1);

    let (status, _) = call(
      &state,
      "POST",
      &format!("/rooms/{room_id}/read"),
      Some(member),
      Some(json!({ "message_id": message["message_id"] })),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (_, unread) = call(&state, "GET", &format!("/rooms/{room_id}/unread"), Some(member), None).await;
    assert_eq!(unread["unread_count"], 0);

    let (status, _) = call(&state, "POST", &format!("/rooms/{room_id}/leave"), Some(owner), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = call(
      &state,
      "DELETE",
      &format!("/rooms/{room_id}/members/{owner}"),
      Some(member),
      None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
  }

  #[tokio::test]
  async fn malformed_attachments_are_rejected() {
    let state = make_state().await;
    let owner = signed_up(&state, "owner", "public").await;
    let (_, room) = call(&state, "POST", "/rooms", Some(owner), Some(json!({ "name": "g" }))).await;
    let room_id = room["room_id"].as_str().unwrap().to_owned();

    let (status, _) = call(
      &state,
      "POST",
      &format!("/rooms/{room_id}/messages"),
      Some(owner),
      Some(json!({ "files": [{ "filename": "x", "data": "%%%" }] })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
  }

  #[tokio::test]
  async fn strangers_cannot_read_a_room() {
    let state = make_state().await;
    let owner = signed_up(&state, "owner", "public").await;
    let stranger = signed_up(&state, "stranger", "public").await;
    let (_, room) = call(&state, "POST", "/rooms", Some(owner), Some(json!({ "name": "g" }))).await;
    let room_id = room["room_id"].as_str().unwrap().to_owned();

    let (status, _) = call(&state, "GET", &format!("/rooms/{room_id}/messages"), Some(stranger), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = call(&state, "GET", &format!("/rooms/{}", Uuid::new_v4()), Some(owner), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }
}
