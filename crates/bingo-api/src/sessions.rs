//! Handlers for `/sessions` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/sessions` | Newest first |
//! | `GET`  | `/sessions/{id}` | 404 if not found |
//! | `POST` | `/sessions/{id}/draw` | Creator or admin; 201 |
//! | `GET`  | `/sessions/{id}/draws` | Draw order |
//! | `POST` | `/sessions/{id}/end` | Creator or admin |
//! | `POST` | `/sessions/{id}/bingo` | Claim a win with the caller's card |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use bingo_core::{
  session::{DrawnNumber, Session},
  store::GameStore,
};
use bingo_game::{BingoWin, Game};
use uuid::Uuid;

use crate::{error::ApiError, identity::Identity};

/// `GET /sessions`
pub async fn list<S: GameStore>(
  State(game): State<Game<S>>,
  Identity(_): Identity,
) -> Result<Json<Vec<Session>>, ApiError> {
  Ok(Json(game.list_sessions().await?))
}

/// `GET /sessions/{id}`
pub async fn get_one<S: GameStore>(
  State(game): State<Game<S>>,
  Identity(_): Identity,
  Path(id): Path<Uuid>,
) -> Result<Json<Session>, ApiError> {
  Ok(Json(game.get_session(id).await?))
}

/// `POST /sessions/{id}/draw`
pub async fn draw<S: GameStore>(
  State(game): State<Game<S>>,
  Identity(caller): Identity,
  Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
  let draw = game.draw_next(caller, id).await?;
  Ok((StatusCode::CREATED, Json(draw)))
}

/// `GET /sessions/{id}/draws`
pub async fn draws<S: GameStore>(
  State(game): State<Game<S>>,
  Identity(_): Identity,
  Path(id): Path<Uuid>,
) -> Result<Json<Vec<DrawnNumber>>, ApiError> {
  Ok(Json(game.list_draws(id).await?))
}

/// `POST /sessions/{id}/end`
pub async fn end<S: GameStore>(
  State(game): State<Game<S>>,
  Identity(caller): Identity,
  Path(id): Path<Uuid>,
) -> Result<Json<Session>, ApiError> {
  Ok(Json(game.end_session(caller, id).await?))
}

/// `POST /sessions/{id}/bingo`
pub async fn bingo<S: GameStore>(
  State(game): State<Game<S>>,
  Identity(caller): Identity,
  Path(id): Path<Uuid>,
) -> Result<Json<BingoWin>, ApiError> {
  Ok(Json(game.validate_bingo(caller, id).await?))
}
