//! Caller identity.
//!
//! Authentication happens upstream; the identity provider forwards the
//! verified user id in the `x-user-id` header. Requests without a valid id are
//! rejected before reaching a handler.

use axum::{extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use crate::error::ApiError;

pub const USER_ID_HEADER: &str = "x-user-id";

/// The authenticated caller.
#[derive(Debug, Clone, Copy)]
pub struct Identity(pub Uuid);

impl<S: Send + Sync> FromRequestParts<S> for Identity {
  type Rejection = ApiError;

  async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
    let value = parts
      .headers
      .get(USER_ID_HEADER)
      .ok_or_else(|| ApiError::Unauthorized(format!("missing {USER_ID_HEADER} header")))?;
    let user_id = value
      .to_str()
      .ok()
      .and_then(|v| Uuid::parse_str(v.trim()).ok())
      .ok_or_else(|| ApiError::Unauthorized(format!("malformed {USER_ID_HEADER} header")))?;
    Ok(Identity(user_id))
  }
}
