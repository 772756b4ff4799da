//! Handlers for `/rooms` and `/me/room` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `POST`   | `/rooms` | Hosts and admins; 201 |
//! | `GET`    | `/rooms` | Newest first |
//! | `GET`    | `/rooms/{id}` | 404 if not found |
//! | `DELETE` | `/rooms/{id}` | Creator only; 204 |
//! | `POST`   | `/rooms/{id}/join` | |
//! | `GET`    | `/rooms/by-code/{code}/participants` | Host first |
//! | `POST`   | `/rooms/{id}/cards` | Caller's card; 201 |
//! | `GET`    | `/rooms/{id}/cards` | |
//! | `GET`    | `/rooms/{id}/cards/mine` | 404 if the caller has none |
//! | `POST`   | `/rooms/{id}/session` | Creator or admin; 201 |
//! | `GET`    | `/me/room` | `null` outside any room |
//! | `DELETE` | `/me/room` | Leave |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use bingo_core::{
  card::Card,
  room::{Participant, Room, Seat},
  store::GameStore,
};
use bingo_game::{Game, RoomLeft};
use uuid::Uuid;

use crate::{error::ApiError, identity::Identity};

// ─── Rooms ────────────────────────────────────────────────────────────────────

/// `POST /rooms`
pub async fn create<S: GameStore>(
  State(game): State<Game<S>>,
  Identity(caller): Identity,
) -> Result<impl IntoResponse, ApiError> {
  let room = game.create_room(caller).await?;
  Ok((StatusCode::CREATED, Json(room)))
}

/// `GET /rooms`
pub async fn list<S: GameStore>(
  State(game): State<Game<S>>,
  Identity(_): Identity,
) -> Result<Json<Vec<Room>>, ApiError> {
  Ok(Json(game.list_rooms().await?))
}

/// `GET /rooms/{id}`
pub async fn get_one<S: GameStore>(
  State(game): State<Game<S>>,
  Identity(_): Identity,
  Path(id): Path<Uuid>,
) -> Result<Json<Room>, ApiError> {
  Ok(Json(game.get_room(id).await?))
}

/// `DELETE /rooms/{id}`
pub async fn delete_one<S: GameStore>(
  State(game): State<Game<S>>,
  Identity(caller): Identity,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
  game.delete_room(caller, id).await?;
  Ok(StatusCode::NO_CONTENT)
}

/// `POST /rooms/{id}/join`
pub async fn join<S: GameStore>(
  State(game): State<Game<S>>,
  Identity(caller): Identity,
  Path(id): Path<Uuid>,
) -> Result<Json<Participant>, ApiError> {
  Ok(Json(game.join_room(caller, id).await?))
}

/// `GET /rooms/by-code/{code}/participants`
pub async fn participants<S: GameStore>(
  State(game): State<Game<S>>,
  Identity(_): Identity,
  Path(code): Path<String>,
) -> Result<Json<Vec<Seat>>, ApiError> {
  Ok(Json(game.list_participants(&code).await?))
}

// ─── Cards ────────────────────────────────────────────────────────────────────

/// `POST /rooms/{id}/cards`
pub async fn create_card<S: GameStore>(
  State(game): State<Game<S>>,
  Identity(caller): Identity,
  Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
  let card = game.generate_card(caller, id).await?;
  Ok((StatusCode::CREATED, Json(card)))
}

/// `GET /rooms/{id}/cards`
pub async fn list_cards<S: GameStore>(
  State(game): State<Game<S>>,
  Identity(_): Identity,
  Path(id): Path<Uuid>,
) -> Result<Json<Vec<Card>>, ApiError> {
  Ok(Json(game.list_cards(id).await?))
}

/// `GET /rooms/{id}/cards/mine`
pub async fn my_card<S: GameStore>(
  State(game): State<Game<S>>,
  Identity(caller): Identity,
  Path(id): Path<Uuid>,
) -> Result<Json<Card>, ApiError> {
  Ok(Json(game.card_for(caller, id).await?))
}

// ─── Session start ────────────────────────────────────────────────────────────

/// `POST /rooms/{id}/session`
pub async fn start_session<S: GameStore>(
  State(game): State<Game<S>>,
  Identity(caller): Identity,
  Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
  let session = game.start_session(caller, id).await?;
  Ok((StatusCode::CREATED, Json(session)))
}

// ─── Current room ─────────────────────────────────────────────────────────────

/// `GET /me/room`
pub async fn current<S: GameStore>(
  State(game): State<Game<S>>,
  Identity(caller): Identity,
) -> Result<Json<Option<Room>>, ApiError> {
  Ok(Json(game.current_room(caller).await?))
}

/// `DELETE /me/room`
pub async fn leave<S: GameStore>(
  State(game): State<Game<S>>,
  Identity(caller): Identity,
) -> Result<Json<RoomLeft>, ApiError> {
  Ok(Json(game.leave_room(caller).await?))
}
