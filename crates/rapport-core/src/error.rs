//! Error types for `rapport-core`.
//!
//! Every engine operation returns [`Error`]. The API layer translates the
//! variants into transport responses; engines never talk to a transport.

use thiserror::Error;
use uuid::Uuid;

use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum Error {
  #[error("{0} not found")]
  NotFound(String),

  #[error("forbidden: {0}")]
  Forbidden(String),

  #[error("user {user_id} is not a member of room {room_id}")]
  NotAMember { room_id: Uuid, user_id: Uuid },

  #[error("already exists: {0}")]
  Duplicate(String),

  #[error("invalid state: {0}")]
  InvalidState(String),

  #[error("a user cannot target themselves")]
  SelfReference,

  #[error("the target user has blocked this action")]
  Blocked,

  #[error("room is at its member limit of {limit}")]
  CapacityExceeded { limit: usize },

  #[error("invalid input: {0}")]
  InvalidInput(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  /// Convert a backend error, surfacing uniqueness violations as
  /// [`Error::Duplicate`].
  pub fn from_store<E: StoreError>(err: E) -> Self {
    if err.is_conflict() {
      Error::Duplicate(err.to_string())
    } else {
      Error::Store(Box::new(err))
    }
  }

  pub fn not_found(what: impl std::fmt::Display) -> Self {
    Error::NotFound(what.to_string())
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
