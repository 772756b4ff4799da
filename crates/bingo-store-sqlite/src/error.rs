//! Error type for `bingo-store-sqlite`.

use bingo_core::store::StoreFailure;
use rusqlite::ErrorCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// A stored value does not decode into its domain type.
  #[error("corrupt column {column}: {value:?}")]
  Corrupt { column: &'static str, value: String },
}

impl StoreFailure for Error {
  fn is_transient(&self) -> bool {
    match self {
      Self::Database(tokio_rusqlite::Error::ConnectionClosed) => true,
      Self::Database(tokio_rusqlite::Error::Rusqlite(e)) => is_busy(e),
      _ => false,
    }
  }
}

/// SQLite reports lock contention as BUSY or LOCKED.
pub(crate) fn is_busy(e: &rusqlite::Error) -> bool {
  matches!(
    e.sqlite_error_code(),
    Some(ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked)
  )
}

/// A UNIQUE or PRIMARY KEY constraint rejected the statement.
pub(crate) fn is_unique_violation(e: &rusqlite::Error) -> bool {
  match e {
    rusqlite::Error::SqliteFailure(err, _) => {
      err.code == ErrorCode::ConstraintViolation
        && matches!(
          err.extended_code,
          rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
            | rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
        )
    }
    _ => false,
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
