//! Handlers for `/audit` and `/history` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/audit` | Admins only; optional `?limit=<n>` (default 100) |
//! | `GET`  | `/history` | Newest first |
//! | `GET`  | `/history/{session_id}` | 404 if not recorded |

use axum::{
  Json,
  extract::{Path, Query, State},
};
use bingo_core::{
  audit::{AuditEntry, HistoryRecord},
  store::GameStore,
};
use bingo_game::Game;
use serde::Deserialize;
use uuid::Uuid;

use crate::{error::ApiError, identity::Identity};

#[derive(Debug, Deserialize)]
pub struct AuditParams {
  pub limit: Option<usize>,
}

/// `GET /audit[?limit=<n>]`
pub async fn list<S: GameStore>(
  State(game): State<Game<S>>,
  Identity(caller): Identity,
  Query(params): Query<AuditParams>,
) -> Result<Json<Vec<AuditEntry>>, ApiError> {
  Ok(Json(game.list_audit(caller, params.limit).await?))
}

/// `GET /history`
pub async fn history<S: GameStore>(
  State(game): State<Game<S>>,
  Identity(_): Identity,
) -> Result<Json<Vec<HistoryRecord>>, ApiError> {
  Ok(Json(game.list_history().await?))
}

/// `GET /history/{session_id}`
pub async fn history_one<S: GameStore>(
  State(game): State<Game<S>>,
  Identity(_): Identity,
  Path(session_id): Path<Uuid>,
) -> Result<Json<HistoryRecord>, ApiError> {
  Ok(Json(game.get_history(session_id).await?))
}
