//! Error type for `rapport-store-sqlite`.

use rapport_core::store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// A column held a value outside its enum's vocabulary.
  #[error("cannot decode {column}: {value:?}")]
  Decode { column: &'static str, value: String },
}

impl StoreError for Error {
  fn is_conflict(&self) -> bool {
    match self {
      Error::Database(tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqliteFailure(e, _))) => {
        e.code == rusqlite::ErrorCode::ConstraintViolation
          && matches!(
            e.extended_code,
            rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE | rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
          )
      }
      _ => false,
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
