//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use bingo_core::Error as GameError;
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  /// The identity headers are missing or unreadable.
  #[error("unauthorized: {0}")]
  Unauthorized(&'static str),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error(transparent)]
  Game(#[from] GameError),
}

impl ApiError {
  pub fn kind(&self) -> &'static str {
    match self {
      Self::Unauthorized(_) => "unauthorized",
      Self::BadRequest(_) => "bad_request",
      Self::Game(e) => e.kind(),
    }
  }

  pub fn status(&self) -> StatusCode {
    match self {
      Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
      Self::BadRequest(_) => StatusCode::BAD_REQUEST,
      Self::Game(e) => game_status(e),
    }
  }
}

fn game_status(e: &GameError) -> StatusCode {
  match e {
    GameError::PermissionDenied(_) | GameError::NotInRoom { .. } => StatusCode::FORBIDDEN,

    GameError::RoomNotFound(_)
    | GameError::NotInAnyRoom(_)
    | GameError::SessionNotFound(_)
    | GameError::NoCardInRoom { .. }
    | GameError::HistoryNotFound(_) => StatusCode::NOT_FOUND,

    GameError::RoomClosed(_)
    | GameError::AlreadyInRoom(_)
    | GameError::DuplicateCard { .. }
    | GameError::RoomCodeUnavailable
    | GameError::SessionAlreadyEnded(_)
    | GameError::SessionAlreadyStarted(_)
    | GameError::SessionActive(_)
    | GameError::WinnerAlreadyDeclared(_) => StatusCode::CONFLICT,

    GameError::SessionInactive(_)
    | GameError::SessionEnded(_)
    | GameError::PoolExhausted(_)
    | GameError::NoWinningPattern => StatusCode::BAD_REQUEST,

    GameError::StorageUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
    GameError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status();
    // Storage details stay in the server log.
    let message = match &self {
      Self::Game(e) if e.is_storage() => "storage failure".to_owned(),
      other => other.to_string(),
    };
    let body = json!({ "error": message, "kind": self.kind() });
    (status, Json(body)).into_response()
  }
}
