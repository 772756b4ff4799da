//! JSON REST API for the bingo coordinator.
//!
//! Exposes an axum [`Router`] backed by a [`bingo_game::Game`] over any
//! [`GameStore`]. Authentication happens upstream; handlers trust the
//! `x-user-id` and `x-user-role` headers (see [`identity`]).
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", bingo_api::api_router(game.clone()))
//! ```

pub mod audit;
pub mod error;
pub mod identity;
pub mod rooms;
pub mod sessions;

use axum::{
  Router,
  routing::{get, post},
};
use bingo_core::store::GameStore;
use bingo_game::Game;

pub use error::ApiError;

/// Build a fully-materialised API router for `game`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(game: Game<S>) -> Router<()>
where
  S: GameStore + 'static,
{
  Router::new()
    // Rooms
    .route("/rooms", get(rooms::list::<S>).post(rooms::create::<S>))
    .route("/rooms/{id}", get(rooms::get_one::<S>).delete(rooms::delete_one::<S>))
    .route("/rooms/{id}/join", post(rooms::join::<S>))
    .route("/rooms/by-code/{code}/participants", get(rooms::participants::<S>))
    .route("/rooms/{id}/cards", get(rooms::list_cards::<S>).post(rooms::create_card::<S>))
    .route("/rooms/{id}/cards/mine", get(rooms::my_card::<S>))
    .route("/rooms/{id}/session", post(rooms::start_session::<S>))
    .route("/me/room", get(rooms::current::<S>).delete(rooms::leave::<S>))
    // Sessions
    .route("/sessions", get(sessions::list::<S>))
    .route("/sessions/{id}", get(sessions::get_one::<S>))
    .route("/sessions/{id}/draw", post(sessions::draw::<S>))
    .route("/sessions/{id}/draws", get(sessions::draws::<S>))
    .route("/sessions/{id}/end", post(sessions::end::<S>))
    .route("/sessions/{id}/bingo", post(sessions::bingo::<S>))
    // Audit & history
    .route("/audit", get(audit::list::<S>))
    .route("/history", get(audit::history::<S>))
    .route("/history/{session_id}", get(audit::history_one::<S>))
    .with_state(game)
}

// ─── Integration tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use axum::{
    body::Body,
    http::{Request, StatusCode},
  };
  use bingo_core::identity::{Caller, Role};
  use bingo_store_sqlite::SqliteStore;
  use serde_json::Value;
  use tower::ServiceExt as _;
  use uuid::Uuid;

  use super::*;
  use crate::identity::{ROLE_HEADER, USER_ID_HEADER};

  async fn app() -> Router {
    let store = SqliteStore::open_in_memory().await.unwrap();
    api_router(Game::new(store))
  }

  fn caller(role: Role) -> Caller { Caller::new(Uuid::new_v4(), role) }

  async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    caller: Option<Caller>,
  ) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(c) = caller {
      builder = builder
        .header(USER_ID_HEADER, c.user_id.to_string())
        .header(ROLE_HEADER, c.role.to_string());
    }
    let req = builder.body(Body::empty()).unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
    (status, body)
  }

  // ── Identity ────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn missing_identity_is_401() {
    let app = app().await;
    let (status, body) = send(&app, "GET", "/rooms", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["kind"], "unauthorized");
  }

  #[tokio::test]
  async fn unknown_role_is_400() {
    let app = app().await;
    let req = Request::builder()
      .uri("/rooms")
      .header(USER_ID_HEADER, Uuid::new_v4().to_string())
      .header(ROLE_HEADER, "superuser")
      .body(Body::empty())
      .unwrap();
    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  }

  // ── Rooms ───────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn players_cannot_create_rooms() {
    let app = app().await;
    let (status, body) = send(&app, "POST", "/rooms", Some(caller(Role::Player))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["kind"], "permission_denied");
    assert!(body["error"].as_str().unwrap().contains("permission denied"));
  }

  #[tokio::test]
  async fn create_join_and_list_participants() {
    let app = app().await;
    let host = caller(Role::Host);
    let player = caller(Role::Player);

    let (status, room) = send(&app, "POST", "/rooms", Some(host)).await;
    assert_eq!(status, StatusCode::CREATED);
    let room_id = room["room_id"].as_str().unwrap().to_owned();
    let code = room["code"].as_str().unwrap().to_owned();

    let (status, _) = send(&app, "POST", &format!("/rooms/{room_id}/join"), Some(player)).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app, "POST", &format!("/rooms/{room_id}/join"), Some(player)).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let uri = format!("/rooms/by-code/{code}/participants");
    let (status, seats) = send(&app, "GET", &uri, Some(player)).await;
    assert_eq!(status, StatusCode::OK);
    let seats = seats.as_array().unwrap();
    assert_eq!(seats.len(), 2);
    assert_eq!(seats[0]["role"], "host");
    assert_eq!(seats[1]["role"], "player");

    let (_, mine) = send(&app, "GET", "/me/room", Some(player)).await;
    assert_eq!(mine["room_id"], room_id.as_str());
  }

  #[tokio::test]
  async fn unknown_room_is_404() {
    let app = app().await;
    let uri = format!("/rooms/{}", Uuid::new_v4());
    let (status, body) = send(&app, "GET", &uri, Some(caller(Role::Player))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["kind"], "room_not_found");
  }

  #[tokio::test]
  async fn leaving_last_deletes_room() {
    let app = app().await;
    let host = caller(Role::Host);
    let (_, room) = send(&app, "POST", "/rooms", Some(host)).await;

    let (status, left) = send(&app, "DELETE", "/me/room", Some(host)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(left["room_deleted"], true);

    let uri = format!("/rooms/{}", room["room_id"].as_str().unwrap());
    let (status, _) = send(&app, "GET", &uri, Some(host)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, "DELETE", "/me/room", Some(host)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }

  // ── Sessions ────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn session_flow_over_http() {
    let app = app().await;
    let host = caller(Role::Host);
    let player = caller(Role::Player);

    let (_, room) = send(&app, "POST", "/rooms", Some(host)).await;
    let room_id = room["room_id"].as_str().unwrap().to_owned();
    send(&app, "POST", &format!("/rooms/{room_id}/join"), Some(player)).await;

    let (status, card) = send(&app, "POST", &format!("/rooms/{room_id}/cards"), Some(player)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(card["numbers"][2][2], 0);
    let (status, _) = send(&app, "POST", &format!("/rooms/{room_id}/cards"), Some(player)).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send(&app, "POST", &format!("/rooms/{room_id}/session"), Some(player)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, session) =
      send(&app, "POST", &format!("/rooms/{room_id}/session"), Some(host)).await;
    assert_eq!(status, StatusCode::CREATED);
    let session_id = session["session_id"].as_str().unwrap().to_owned();

    let (status, draw) = send(&app, "POST", &format!("/sessions/{session_id}/draw"), Some(host)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(draw["sequence"], 1);

    let (status, body) =
      send(&app, "POST", &format!("/sessions/{session_id}/bingo"), Some(player)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "no_winning_pattern");

    let (status, ended) = send(&app, "POST", &format!("/sessions/{session_id}/end"), Some(host)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ended["is_active"], false);
    let (status, _) = send(&app, "POST", &format!("/sessions/{session_id}/end"), Some(host)).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, draws) = send(&app, "GET", &format!("/sessions/{session_id}/draws"), Some(player)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(draws.as_array().unwrap().len(), 1);

    let (status, record) = send(&app, "GET", &format!("/history/{session_id}"), Some(player)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(record["is_completed"], true);
    assert_eq!(record["winner_id"], Value::Null);
    assert_eq!(record["drawn_numbers"][0], draw["number"]);
  }

  // ── Audit ───────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn audit_requires_admin() {
    let app = app().await;
    let host = caller(Role::Host);
    send(&app, "POST", "/rooms", Some(host)).await;

    let (status, _) = send(&app, "GET", "/audit", Some(host)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, entries) = send(&app, "GET", "/audit?limit=5", Some(caller(Role::Admin))).await;
    assert_eq!(status, StatusCode::OK);
    let entries = entries.as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert!(entries[0]["action"].as_str().unwrap().starts_with("Created room "));
  }
}
