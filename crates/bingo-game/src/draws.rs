//! Session lifecycle and the draw engine.

use bingo_core::{
  Error, Result,
  event::{EventPayload, GameEvent},
  identity::Caller,
  room::Room,
  session::{DrawnNumber, Session, pick_next},
  store::{DrawOutcome, GameStore, SessionEnd, SessionStart},
};
use chrono::Utc;
use uuid::Uuid;

use crate::Game;

impl<S: GameStore> Game<S> {
  /// Start the room's one session and close the room to new players.
  pub async fn start_session(&self, caller: Caller, room_id: Uuid) -> Result<Session> {
    let room = self.get_room(room_id).await?;
    if !caller.controls(room.created_by) {
      return Err(Error::PermissionDenied("only the room creator or an admin can start a session"));
    }

    let session = Session::start(room_id, Utc::now());
    let pending = &session;
    let outcome = self
      .retry
      .run("start_session", move || self.store.start_session(pending.clone()))
      .await?;

    match outcome {
      SessionStart::Started => {
        let session_id = session.session_id;
        tracing::info!(room_code = %room.code, %session_id, "session started");
        self
          .log_action(
            caller.user_id,
            format!("Started session for room {}", room.code),
            Some(session_id),
          )
          .await;
        self.publish(GameEvent {
          room_code: room.code.to_string(),
          payload:   EventPayload::SessionStarted { session_id },
        });
        Ok(session)
      }
      SessionStart::RoomNotFound => Err(Error::RoomNotFound(room_id.to_string())),
      SessionStart::AlreadyStarted => Err(Error::SessionAlreadyStarted(room_id)),
    }
  }

  /// Reveal the next number: uniform over what is left of the pool.
  pub async fn draw_next(&self, caller: Caller, session_id: Uuid) -> Result<DrawnNumber> {
    let (_, room) = self.session_and_room(session_id).await?;
    if !caller.controls(room.created_by) {
      return Err(Error::PermissionDenied("only the room creator or an admin can draw"));
    }

    let now = Utc::now();
    let outcome = self
      .retry
      .run("draw_number", move || {
        self.store.draw_number(session_id, now, |drawn| pick_next(drawn, &mut rand::rng()))
      })
      .await?;

    match outcome {
      DrawOutcome::Drawn(draw) => {
        tracing::info!(
          room_code = %room.code,
          %session_id,
          number = draw.number,
          sequence = draw.sequence,
          "number drawn"
        );
        self
          .log_action(caller.user_id, format!("Number drawn: {}", draw.number), Some(session_id))
          .await;
        self.publish(GameEvent {
          room_code: room.code.to_string(),
          payload:   EventPayload::NumberDrawn {
            session_id,
            number: draw.number,
            sequence: draw.sequence,
          },
        });
        Ok(draw)
      }
      DrawOutcome::SessionNotFound => Err(Error::SessionNotFound(session_id)),
      DrawOutcome::SessionInactive => Err(Error::SessionInactive(session_id)),
      DrawOutcome::PoolExhausted => Err(Error::PoolExhausted(session_id)),
    }
  }

  /// End a running session without a winner.
  pub async fn end_session(&self, caller: Caller, session_id: Uuid) -> Result<Session> {
    let (_, room) = self.session_and_room(session_id).await?;
    if !caller.controls(room.created_by) {
      return Err(Error::PermissionDenied("only the room creator or an admin can end a session"));
    }

    let now = Utc::now();
    let outcome = self
      .retry
      .run("end_session", move || self.store.end_session(session_id, now))
      .await?;

    let session = match outcome {
      SessionEnd::Ended(session) => session,
      SessionEnd::NotFound => return Err(Error::SessionNotFound(session_id)),
      SessionEnd::AlreadyEnded => return Err(Error::SessionAlreadyEnded(session_id)),
    };

    tracing::info!(room_code = %room.code, %session_id, "session ended");
    self
      .log_action(caller.user_id, format!("Ended session for room {}", room.code), Some(session_id))
      .await;
    self.record_history(session_id).await;
    self.publish(GameEvent {
      room_code: room.code.to_string(),
      payload:   EventPayload::SessionEnded { session_id },
    });
    Ok(session)
  }

  pub async fn get_session(&self, session_id: Uuid) -> Result<Session> {
    self
      .retry
      .run("get_session", move || self.store.get_session(session_id))
      .await?
      .ok_or(Error::SessionNotFound(session_id))
  }

  /// The session of `room_id`, if one was ever started.
  pub async fn session_for_room(&self, room_id: Uuid) -> Result<Option<Session>> {
    self.retry.run("session_for_room", move || self.store.session_for_room(room_id)).await
  }

  /// All sessions, newest first.
  pub async fn list_sessions(&self) -> Result<Vec<Session>> {
    self.retry.run("list_sessions", move || self.store.list_sessions()).await
  }

  /// Draws in the order they were made.
  pub async fn list_draws(&self, session_id: Uuid) -> Result<Vec<DrawnNumber>> {
    self.get_session(session_id).await?;
    self.retry.run("list_draws", move || self.store.list_draws(session_id)).await
  }

  pub(crate) async fn session_and_room(&self, session_id: Uuid) -> Result<(Session, Room)> {
    let session = self.get_session(session_id).await?;
    let room = self.get_room(session.room_id).await?;
    Ok((session, room))
  }
}
