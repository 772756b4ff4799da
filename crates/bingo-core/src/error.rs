//! Error types for `bingo-core`.
//!
//! Every business-rule violation an operation can report is a variant here.
//! Storage failures are carried opaquely in the two trailing variants.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  #[error("permission denied: {0}")]
  PermissionDenied(&'static str),

  #[error("room not found: {0}")]
  RoomNotFound(String),

  #[error("room {0} is closed")]
  RoomClosed(String),

  #[error("user {0} is already in a room")]
  AlreadyInRoom(Uuid),

  #[error("user {0} is not in any room")]
  NotInAnyRoom(Uuid),

  #[error("user {user} is not in room {room}")]
  NotInRoom { user: Uuid, room: Uuid },

  #[error("user {user} already holds a card in room {room}")]
  DuplicateCard { user: Uuid, room: Uuid },

  #[error("could not allocate a free room code")]
  RoomCodeUnavailable,

  #[error("session not found: {0}")]
  SessionNotFound(Uuid),

  #[error("session {0} is not active")]
  SessionInactive(Uuid),

  #[error("session {0} has already ended")]
  SessionAlreadyEnded(Uuid),

  #[error("session {0} has ended")]
  SessionEnded(Uuid),

  #[error("room {0} already has a session")]
  SessionAlreadyStarted(Uuid),

  #[error("room {0} has an active session")]
  SessionActive(Uuid),

  #[error("all numbers have been drawn in session {0}")]
  PoolExhausted(Uuid),

  #[error("a winner has already been declared in session {0}")]
  WinnerAlreadyDeclared(Uuid),

  #[error("user {user} holds no card in room {room}")]
  NoCardInRoom { user: Uuid, room: Uuid },

  #[error("no winning pattern on the card")]
  NoWinningPattern,

  #[error("no history recorded for session {0}")]
  HistoryNotFound(Uuid),

  /// Transient storage failures persisted through every retry.
  #[error("storage unavailable: {0}")]
  StorageUnavailable(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("storage error: {0}")]
  Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  /// Stable snake_case name of the variant, used on the wire.
  pub fn kind(&self) -> &'static str {
    match self {
      Self::PermissionDenied(_) => "permission_denied",
      Self::RoomNotFound(_) => "room_not_found",
      Self::RoomClosed(_) => "room_closed",
      Self::AlreadyInRoom(_) => "already_in_room",
      Self::NotInAnyRoom(_) => "not_in_any_room",
      Self::NotInRoom { .. } => "not_in_room",
      Self::DuplicateCard { .. } => "duplicate_card",
      Self::RoomCodeUnavailable => "room_code_unavailable",
      Self::SessionNotFound(_) => "session_not_found",
      Self::SessionInactive(_) => "session_inactive",
      Self::SessionAlreadyEnded(_) => "session_already_ended",
      Self::SessionEnded(_) => "session_ended",
      Self::SessionAlreadyStarted(_) => "session_already_started",
      Self::SessionActive(_) => "session_active",
      Self::PoolExhausted(_) => "pool_exhausted",
      Self::WinnerAlreadyDeclared(_) => "winner_already_declared",
      Self::NoCardInRoom { .. } => "no_card_in_room",
      Self::NoWinningPattern => "no_winning_pattern",
      Self::HistoryNotFound(_) => "history_not_found",
      Self::StorageUnavailable(_) => "storage_unavailable",
      Self::Storage(_) => "storage",
    }
  }

  /// `true` for failures of the storage layer rather than of a game rule.
  pub fn is_storage(&self) -> bool {
    matches!(self, Self::StorageUnavailable(_) | Self::Storage(_))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
