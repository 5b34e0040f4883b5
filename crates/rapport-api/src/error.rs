//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use rapport_core::Error;
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("unauthorized: {0}")]
  Unauthorized(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error(transparent)]
  Engine(#[from] Error),
}

impl ApiError {
  fn status(&self) -> StatusCode {
    match self {
      ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
      ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
      ApiError::Engine(e) => match e {
        Error::NotFound(_) => StatusCode::NOT_FOUND,
        Error::Forbidden(_) | Error::NotAMember { .. } | Error::Blocked => StatusCode::FORBIDDEN,
        Error::Duplicate(_) => StatusCode::CONFLICT,
        Error::InvalidState(_) | Error::CapacityExceeded { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        Error::SelfReference | Error::InvalidInput(_) => StatusCode::BAD_REQUEST,
        Error::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
      },
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status();
    let message = if status.is_server_error() {
      // Backend details stay in the log.
      tracing::error!(error = %self, "request failed");
      "internal error".to_owned()
    } else {
      self.to_string()
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}

#[cfg(test)]
mod tests {
  use uuid::Uuid;

  use super::*;

  #[test]
  fn engine_errors_map_to_statuses() {
    let cases = [
      (Error::not_found("room"), StatusCode::NOT_FOUND),
      (Error::Blocked, StatusCode::FORBIDDEN),
      (Error::NotAMember { room_id: Uuid::nil(), user_id: Uuid::nil() }, StatusCode::FORBIDDEN),
      (Error::Duplicate("edge".into()), StatusCode::CONFLICT),
      (Error::CapacityExceeded { limit: 2 }, StatusCode::UNPROCESSABLE_ENTITY),
      (Error::SelfReference, StatusCode::BAD_REQUEST),
    ];
    for (error, status) in cases {
      assert_eq!(ApiError::from(error).status(), status);
    }
  }

  #[test]
  fn store_failures_are_opaque() {
    let error = ApiError::from(Error::Store("disk on fire".into()));
    let response = error.into_response();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
  }
}
