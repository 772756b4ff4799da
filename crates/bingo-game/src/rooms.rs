//! Room lifecycle: create, join, leave, delete, and listings.

use bingo_core::{
  Error, Result,
  identity::Caller,
  room::{Participant, Room, RoomCode, Seat, roster},
  store::{GameStore, JoinOutcome, LeaveOutcome, RoomDelete, RoomInsert},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::Game;

/// Fresh codes tried before [`Game::create_room`] gives up.
pub const MAX_CODE_ATTEMPTS: usize = 16;

/// What [`Game::leave_room`] did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomLeft {
  pub room:         Room,
  /// The caller was the last one out and the room is gone.
  pub room_deleted: bool,
}

impl<S: GameStore> Game<S> {
  /// Open a room with a fresh code and seat the caller in it.
  pub async fn create_room(&self, caller: Caller) -> Result<Room> {
    if !caller.role.can_create_rooms() {
      return Err(Error::PermissionDenied("only hosts and admins can create rooms"));
    }

    for _ in 0..MAX_CODE_ATTEMPTS {
      let code = RoomCode::generate(&mut rand::rng());
      let room = Room::new(code, caller.user_id, Utc::now());
      let candidate = &room;
      let outcome = self
        .retry
        .run("create_room", move || self.store.create_room(candidate.clone()))
        .await?;

      match outcome {
        RoomInsert::Created => {
          tracing::info!(room_code = %room.code, room_id = %room.room_id, "room created");
          self
            .log_action(caller.user_id, format!("Created room {}", room.code), Some(room.room_id))
            .await;
          return Ok(room);
        }
        RoomInsert::CodeTaken => {
          tracing::debug!(room_code = %room.code, "room code taken, drawing another");
        }
        RoomInsert::CreatorInRoom => return Err(Error::AlreadyInRoom(caller.user_id)),
      }
    }

    tracing::warn!(attempts = MAX_CODE_ATTEMPTS, "no free room code");
    Err(Error::RoomCodeUnavailable)
  }

  pub async fn join_room(&self, caller: Caller, room_id: Uuid) -> Result<Participant> {
    let now = Utc::now();
    let user_id = caller.user_id;
    let outcome = self
      .retry
      .run("join_room", move || self.store.join_room(room_id, user_id, now))
      .await?;

    match outcome {
      JoinOutcome::Joined { participant, room } => {
        tracing::info!(room_code = %room.code, %user_id, "player joined");
        self.log_action(user_id, format!("Joined room {}", room.code), Some(room_id)).await;
        Ok(participant)
      }
      JoinOutcome::RoomNotFound => Err(Error::RoomNotFound(room_id.to_string())),
      JoinOutcome::RoomClosed(room) => Err(Error::RoomClosed(room.code.to_string())),
      JoinOutcome::AlreadyInRoom => Err(Error::AlreadyInRoom(user_id)),
    }
  }

  /// Leave the caller's room. The last one out of a room with no running
  /// session takes the room with them.
  pub async fn leave_room(&self, caller: Caller) -> Result<RoomLeft> {
    let user_id = caller.user_id;
    let outcome = self
      .retry
      .run("leave_room", move || self.store.leave_room(user_id))
      .await?;

    let (room, room_deleted) = match outcome {
      LeaveOutcome::NotInAnyRoom => return Err(Error::NotInAnyRoom(user_id)),
      LeaveOutcome::Left { room, room_deleted } => (room, room_deleted),
    };

    tracing::info!(room_code = %room.code, %user_id, room_deleted, "player left");
    self.log_action(user_id, format!("Left room {}", room.code), Some(room.room_id)).await;
    if room_deleted {
      self
        .log_action(user_id, format!("Auto-deleted empty room {}", room.code), Some(room.room_id))
        .await;
    }
    Ok(RoomLeft { room, room_deleted })
  }

  /// Delete a room and everything in it. Creator only, and never while a
  /// session is running.
  pub async fn delete_room(&self, caller: Caller, room_id: Uuid) -> Result<()> {
    let room = self.get_room(room_id).await?;
    if room.created_by != caller.user_id {
      return Err(Error::PermissionDenied("only the room creator can delete it"));
    }

    match self.retry.run("delete_room", move || self.store.delete_room(room_id)).await? {
      RoomDelete::Deleted => {
        tracing::info!(room_code = %room.code, %room_id, "room deleted");
        self
          .log_action(caller.user_id, format!("Deleted room {}", room.code), Some(room_id))
          .await;
        Ok(())
      }
      RoomDelete::NotFound => Err(Error::RoomNotFound(room_id.to_string())),
      RoomDelete::SessionActive => Err(Error::SessionActive(room_id)),
    }
  }

  /// The room's creator as host, then every other participant as a player.
  pub async fn list_participants(&self, room_code: &str) -> Result<Vec<Seat>> {
    let code = room_code.to_owned();
    let room = self
      .retry
      .run("get_room_by_code", move || self.store.get_room_by_code(code.clone()))
      .await?
      .ok_or_else(|| Error::RoomNotFound(room_code.to_owned()))?;
    let room_id = room.room_id;
    let participants = self
      .retry
      .run("list_participants", move || self.store.list_participants(room_id))
      .await?;
    Ok(roster(&room, &participants))
  }

  pub async fn get_room(&self, room_id: Uuid) -> Result<Room> {
    self
      .retry
      .run("get_room", move || self.store.get_room(room_id))
      .await?
      .ok_or_else(|| Error::RoomNotFound(room_id.to_string()))
  }

  /// All rooms, newest first.
  pub async fn list_rooms(&self) -> Result<Vec<Room>> {
    self.retry.run("list_rooms", move || self.store.list_rooms()).await
  }

  /// The room the caller currently sits in, if any.
  pub async fn current_room(&self, caller: Caller) -> Result<Option<Room>> {
    let user_id = caller.user_id;
    let Some(membership) = self
      .retry
      .run("current_membership", move || self.store.current_membership(user_id))
      .await?
    else {
      return Ok(None);
    };
    let room_id = membership.room_id;
    self.retry.run("get_room", move || self.store.get_room(room_id)).await
  }
}
