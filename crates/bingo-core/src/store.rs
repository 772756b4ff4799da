//! The `GameStore` trait and the outcomes of its atomic operations.
//!
//! The trait is implemented by storage backends (e.g. `bingo-store-sqlite`).
//! Every method that mutates shared state does so atomically: the checks an
//! operation depends on and the write itself happen in one transaction or one
//! conditional statement, and the result is reported as an outcome enum rather
//! than leaving the caller to read-then-write.

use std::future::Future;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
  audit::{AuditEntry, HistoryRecord},
  card::Card,
  room::{Participant, Room},
  session::{DrawnNumber, Session},
};

// ─── Failure classification ──────────────────────────────────────────────────

/// Storage errors that know whether retrying may help.
pub trait StoreFailure: std::error::Error + Send + Sync + 'static {
  /// `true` for conditions such as a busy database or a dropped connection.
  fn is_transient(&self) -> bool;
}

// ─── Outcomes ────────────────────────────────────────────────────────────────

/// Result of [`GameStore::create_room`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoomInsert {
  /// The room exists and its creator is enrolled.
  Created,
  /// Another room already uses this code; nothing was written.
  CodeTaken,
  /// The creator already sits in a room; nothing was written.
  CreatorInRoom,
}

/// Result of [`GameStore::join_room`], in precedence order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JoinOutcome {
  Joined { participant: Participant, room: Room },
  RoomNotFound,
  RoomClosed(Room),
  AlreadyInRoom,
}

/// Result of [`GameStore::leave_room`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeaveOutcome {
  NotInAnyRoom,
  Left {
    room:         Room,
    /// The room was empty with no active session and has been removed.
    room_deleted: bool,
  },
}

/// Result of [`GameStore::delete_room`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoomDelete {
  Deleted,
  NotFound,
  SessionActive,
}

/// Result of [`GameStore::insert_card`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CardInsert {
  Inserted,
  /// The owner's membership is not in the card's room.
  NotInRoom,
  /// The owner already holds a card in this room.
  Duplicate,
}

/// Result of [`GameStore::start_session`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionStart {
  Started,
  RoomNotFound,
  AlreadyStarted,
}

/// Result of [`GameStore::draw_number`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DrawOutcome {
  Drawn(DrawnNumber),
  SessionNotFound,
  SessionInactive,
  PoolExhausted,
}

/// Result of [`GameStore::end_session`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEnd {
  Ended(Session),
  NotFound,
  AlreadyEnded,
}

/// Result of [`GameStore::declare_winner`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WinnerClaim {
  Declared(Session),
  NotFound,
  AlreadyDeclared,
  SessionEnded,
}

/// Result of [`GameStore::insert_history`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryInsert {
  Inserted,
  /// A record for this session already exists and was left untouched.
  AlreadyRecorded,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a bingo persistence backend.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait GameStore: Send + Sync {
  type Error: StoreFailure;

  // ── Rooms ─────────────────────────────────────────────────────────────

  /// Insert `room` and enroll its creator as the first participant.
  fn create_room(
    &self,
    room: Room,
  ) -> impl Future<Output = Result<RoomInsert, Self::Error>> + Send + '_;

  fn get_room(
    &self,
    room_id: Uuid,
  ) -> impl Future<Output = Result<Option<Room>, Self::Error>> + Send + '_;

  fn get_room_by_code(
    &self,
    code: String,
  ) -> impl Future<Output = Result<Option<Room>, Self::Error>> + Send + '_;

  /// All rooms, newest first.
  fn list_rooms(&self) -> impl Future<Output = Result<Vec<Room>, Self::Error>> + Send + '_;

  /// Delete a room and everything it owns, unless a session is active.
  fn delete_room(
    &self,
    room_id: Uuid,
  ) -> impl Future<Output = Result<RoomDelete, Self::Error>> + Send + '_;

  // ── Membership ────────────────────────────────────────────────────────

  /// Add `user_id` to a room. Membership uniqueness is enforced by the
  /// insert itself.
  fn join_room(
    &self,
    room_id: Uuid,
    user_id: Uuid,
    joined_at: DateTime<Utc>,
  ) -> impl Future<Output = Result<JoinOutcome, Self::Error>> + Send + '_;

  /// Remove `user_id` from their room, deleting the room if it is left
  /// empty and has no active session.
  fn leave_room(
    &self,
    user_id: Uuid,
  ) -> impl Future<Output = Result<LeaveOutcome, Self::Error>> + Send + '_;

  fn current_membership(
    &self,
    user_id: Uuid,
  ) -> impl Future<Output = Result<Option<Participant>, Self::Error>> + Send + '_;

  /// Participants of a room in join order.
  fn list_participants(
    &self,
    room_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Participant>, Self::Error>> + Send + '_;

  // ── Cards ─────────────────────────────────────────────────────────────

  /// Insert `card` if its owner is a participant of its room and holds no
  /// other card there.
  fn insert_card(
    &self,
    card: Card,
  ) -> impl Future<Output = Result<CardInsert, Self::Error>> + Send + '_;

  fn get_card(
    &self,
    card_id: Uuid,
  ) -> impl Future<Output = Result<Option<Card>, Self::Error>> + Send + '_;

  fn card_for(
    &self,
    room_id: Uuid,
    owner_id: Uuid,
  ) -> impl Future<Output = Result<Option<Card>, Self::Error>> + Send + '_;

  fn list_cards(
    &self,
    room_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Card>, Self::Error>> + Send + '_;

  // ── Sessions ──────────────────────────────────────────────────────────

  /// Insert an active session and close its room.
  fn start_session(
    &self,
    session: Session,
  ) -> impl Future<Output = Result<SessionStart, Self::Error>> + Send + '_;

  fn get_session(
    &self,
    session_id: Uuid,
  ) -> impl Future<Output = Result<Option<Session>, Self::Error>> + Send + '_;

  fn session_for_room(
    &self,
    room_id: Uuid,
  ) -> impl Future<Output = Result<Option<Session>, Self::Error>> + Send + '_;

  /// All sessions, newest first.
  fn list_sessions(
    &self,
  ) -> impl Future<Output = Result<Vec<Session>, Self::Error>> + Send + '_;

  /// Read the drawn set, let `pick` choose the next number, and insert it,
  /// all atomically. `pick` receives the numbers already drawn in order and
  /// returns `None` when nothing is left.
  fn draw_number<P>(
    &self,
    session_id: Uuid,
    drawn_at: DateTime<Utc>,
    pick: P,
  ) -> impl Future<Output = Result<DrawOutcome, Self::Error>> + Send + '_
  where
    P: FnOnce(&[u8]) -> Option<u8> + Send + 'static;

  /// Draws in sequence order.
  fn list_draws(
    &self,
    session_id: Uuid,
  ) -> impl Future<Output = Result<Vec<DrawnNumber>, Self::Error>> + Send + '_;

  /// Deactivate an active session without a winner.
  fn end_session(
    &self,
    session_id: Uuid,
    ended_at: DateTime<Utc>,
  ) -> impl Future<Output = Result<SessionEnd, Self::Error>> + Send + '_;

  /// Set the winner if, and only if, the session is active and has none.
  fn declare_winner(
    &self,
    session_id: Uuid,
    winner_id: Uuid,
    card_id: Uuid,
    ended_at: DateTime<Utc>,
  ) -> impl Future<Output = Result<WinnerClaim, Self::Error>> + Send + '_;

  // ── Audit & history ───────────────────────────────────────────────────

  fn append_audit(
    &self,
    entry: AuditEntry,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Newest entries first.
  fn list_audit(
    &self,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<AuditEntry>, Self::Error>> + Send + '_;

  fn insert_history(
    &self,
    record: HistoryRecord,
  ) -> impl Future<Output = Result<HistoryInsert, Self::Error>> + Send + '_;

  fn get_history(
    &self,
    session_id: Uuid,
  ) -> impl Future<Output = Result<Option<HistoryRecord>, Self::Error>> + Send + '_;

  /// Newest records first.
  fn list_history(
    &self,
  ) -> impl Future<Output = Result<Vec<HistoryRecord>, Self::Error>> + Send + '_;
}
