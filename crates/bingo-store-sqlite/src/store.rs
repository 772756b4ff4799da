//! [`SqliteStore`], the SQLite implementation of [`GameStore`].
//!
//! Every mutating method runs as a single `call` on the connection thread,
//! inside an `IMMEDIATE` transaction where it reads before it writes, so the
//! checks and the write it guards commit together. Uniqueness invariants are
//! left to the schema's constraints and surfaced as outcome variants.

use std::path::Path;

use bingo_core::{
  audit::{AuditEntry, HistoryRecord},
  card::Card,
  room::{Participant, Room},
  session::{DrawnNumber, POOL_SIZE, Session},
  store::{
    CardInsert, DrawOutcome, GameStore, HistoryInsert, JoinOutcome, LeaveOutcome, RoomDelete,
    RoomInsert, SessionEnd, SessionStart, WinnerClaim,
  },
};
use chrono::{DateTime, Utc};
use rusqlite::{OptionalExtension as _, TransactionBehavior};
use uuid::Uuid;

use crate::{
  Result,
  encode::{
    CARD_COLUMNS, HISTORY_COLUMNS, PARTICIPANT_COLUMNS, RawAudit, RawCard, RawDraw, RawHistory,
    RawParticipant, RawRoom, RawSession, ROOM_COLUMNS, SESSION_COLUMNS, encode_dt, encode_uuid,
  },
  error::is_unique_violation,
  schema::SCHEMA,
};

type RowMapper<R> = fn(&rusqlite::Row<'_>) -> rusqlite::Result<R>;

// ─── Store ───────────────────────────────────────────────────────────────────

/// A bingo store backed by a single SQLite file.
///
/// Cloning is cheap: the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Run `sql` with one text parameter and map the first row, if any.
  async fn query_opt<R: Send + 'static>(
    &self,
    sql: String,
    key: String,
    map: RowMapper<R>,
  ) -> Result<Option<R>> {
    Ok(
      self
        .conn
        .call(move |conn| Ok(conn.query_row(&sql, rusqlite::params![key], map).optional()?))
        .await?,
    )
  }

  /// Run `sql` with the given text parameters and map every row.
  async fn query_all<R: Send + 'static>(
    &self,
    sql: String,
    params: Vec<String>,
    map: RowMapper<R>,
  ) -> Result<Vec<R>> {
    Ok(
      self
        .conn
        .call(move |conn| {
          let mut stmt = conn.prepare(&sql)?;
          let rows = stmt
            .query_map(rusqlite::params_from_iter(params.iter()), map)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
          Ok(rows)
        })
        .await?,
    )
  }
}

// ─── Synchronous helpers (run on the connection thread) ──────────────────────

fn select_room(conn: &rusqlite::Connection, room_id: &str) -> rusqlite::Result<Option<RawRoom>> {
  conn
    .query_row(
      &format!("SELECT {ROOM_COLUMNS} FROM rooms WHERE room_id = ?1"),
      rusqlite::params![room_id],
      RawRoom::from_row,
    )
    .optional()
}

fn select_session(
  conn: &rusqlite::Connection,
  session_id: &str,
) -> rusqlite::Result<Option<RawSession>> {
  conn
    .query_row(
      &format!("SELECT {SESSION_COLUMNS} FROM sessions WHERE session_id = ?1"),
      rusqlite::params![session_id],
      RawSession::from_row,
    )
    .optional()
}

fn has_active_session(conn: &rusqlite::Connection, room_id: &str) -> rusqlite::Result<bool> {
  Ok(
    conn
      .query_row(
        "SELECT 1 FROM sessions WHERE room_id = ?1 AND is_active = 1",
        rusqlite::params![room_id],
        |_| Ok(true),
      )
      .optional()?
      .unwrap_or(false),
  )
}

/// Remove a room and everything that references it, dependents first.
fn delete_room_cascade(conn: &rusqlite::Connection, room_id: &str) -> rusqlite::Result<()> {
  conn.execute(
    "DELETE FROM drawn_numbers
     WHERE session_id IN (SELECT session_id FROM sessions WHERE room_id = ?1)",
    rusqlite::params![room_id],
  )?;
  conn.execute("DELETE FROM sessions WHERE room_id = ?1", rusqlite::params![room_id])?;
  conn.execute("DELETE FROM cards WHERE room_id = ?1", rusqlite::params![room_id])?;
  conn.execute("DELETE FROM participants WHERE room_id = ?1", rusqlite::params![room_id])?;
  conn.execute("DELETE FROM rooms WHERE room_id = ?1", rusqlite::params![room_id])?;
  Ok(())
}

// Outcomes as they leave the connection thread, before decoding.

enum RawJoin {
  Joined(RawRoom),
  RoomNotFound,
  RoomClosed(RawRoom),
  AlreadyInRoom,
}

enum RawLeave {
  NotInAnyRoom,
  Left { room: RawRoom, room_deleted: bool },
}

enum RawDrawOutcome {
  Drawn { number: u8, sequence: u16 },
  SessionNotFound,
  SessionInactive,
  PoolExhausted,
}

enum RawTransition {
  Changed(RawSession),
  NotFound,
  AlreadyDeclared,
  Inactive,
}

// ─── GameStore impl ──────────────────────────────────────────────────────────

impl GameStore for SqliteStore {
  type Error = crate::Error;

  // ── Rooms ─────────────────────────────────────────────────────────────────

  async fn create_room(&self, room: Room) -> Result<RoomInsert> {
    let id_str = encode_uuid(room.room_id);
    let code = room.code.to_string();
    let by_str = encode_uuid(room.created_by);
    let at_str = encode_dt(room.created_at);

    Ok(
      self
        .conn
        .call(move |conn| {
          let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

          match tx.execute(
            "INSERT INTO rooms (room_id, code, created_by, is_closed, created_at)
             VALUES (?1, ?2, ?3, 0, ?4)",
            rusqlite::params![id_str, code, by_str, at_str],
          ) {
            Ok(_) => {}
            Err(e) if is_unique_violation(&e) => return Ok(RoomInsert::CodeTaken),
            Err(e) => return Err(e.into()),
          }

          match tx.execute(
            "INSERT INTO participants (user_id, room_id, joined_at) VALUES (?1, ?2, ?3)",
            rusqlite::params![by_str, id_str, at_str],
          ) {
            Ok(_) => {}
            Err(e) if is_unique_violation(&e) => return Ok(RoomInsert::CreatorInRoom),
            Err(e) => return Err(e.into()),
          }

          tx.commit()?;
          Ok(RoomInsert::Created)
        })
        .await?,
    )
  }

  async fn get_room(&self, room_id: Uuid) -> Result<Option<Room>> {
    let raw = self
      .query_opt(
        format!("SELECT {ROOM_COLUMNS} FROM rooms WHERE room_id = ?1"),
        encode_uuid(room_id),
        RawRoom::from_row,
      )
      .await?;
    raw.map(RawRoom::into_room).transpose()
  }

  async fn get_room_by_code(&self, code: String) -> Result<Option<Room>> {
    let raw = self
      .query_opt(
        format!("SELECT {ROOM_COLUMNS} FROM rooms WHERE code = ?1"),
        code,
        RawRoom::from_row,
      )
      .await?;
    raw.map(RawRoom::into_room).transpose()
  }

  async fn list_rooms(&self) -> Result<Vec<Room>> {
    let raws = self
      .query_all(
        format!("SELECT {ROOM_COLUMNS} FROM rooms ORDER BY created_at DESC, rowid DESC"),
        vec![],
        RawRoom::from_row,
      )
      .await?;
    raws.into_iter().map(RawRoom::into_room).collect()
  }

  async fn delete_room(&self, room_id: Uuid) -> Result<RoomDelete> {
    let id_str = encode_uuid(room_id);

    Ok(
      self
        .conn
        .call(move |conn| {
          let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
          if select_room(&tx, &id_str)?.is_none() {
            return Ok(RoomDelete::NotFound);
          }
          if has_active_session(&tx, &id_str)? {
            return Ok(RoomDelete::SessionActive);
          }
          delete_room_cascade(&tx, &id_str)?;
          tx.commit()?;
          Ok(RoomDelete::Deleted)
        })
        .await?,
    )
  }

  // ── Membership ────────────────────────────────────────────────────────────

  async fn join_room(
    &self,
    room_id: Uuid,
    user_id: Uuid,
    joined_at: DateTime<Utc>,
  ) -> Result<JoinOutcome> {
    let room_str = encode_uuid(room_id);
    let user_str = encode_uuid(user_id);
    let at_str = encode_dt(joined_at);

    let raw = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let room = match select_room(&tx, &room_str)? {
          Some(room) => room,
          None => return Ok(RawJoin::RoomNotFound),
        };
        if room.is_closed {
          return Ok(RawJoin::RoomClosed(room));
        }

        match tx.execute(
          "INSERT INTO participants (user_id, room_id, joined_at) VALUES (?1, ?2, ?3)",
          rusqlite::params![user_str, room_str, at_str],
        ) {
          Ok(_) => {}
          Err(e) if is_unique_violation(&e) => return Ok(RawJoin::AlreadyInRoom),
          Err(e) => return Err(e.into()),
        }

        tx.commit()?;
        Ok(RawJoin::Joined(room))
      })
      .await?;

    Ok(match raw {
      RawJoin::Joined(room) => JoinOutcome::Joined {
        participant: Participant { user_id, room_id, joined_at },
        room:        room.into_room()?,
      },
      RawJoin::RoomNotFound => JoinOutcome::RoomNotFound,
      RawJoin::RoomClosed(room) => JoinOutcome::RoomClosed(room.into_room()?),
      RawJoin::AlreadyInRoom => JoinOutcome::AlreadyInRoom,
    })
  }

  async fn leave_room(&self, user_id: Uuid) -> Result<LeaveOutcome> {
    let user_str = encode_uuid(user_id);

    let raw = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let room_id: Option<String> = tx
          .query_row(
            "SELECT room_id FROM participants WHERE user_id = ?1",
            rusqlite::params![user_str],
            |r| r.get(0),
          )
          .optional()?;
        let Some(room_id) = room_id else {
          return Ok(RawLeave::NotInAnyRoom);
        };
        let room = tx.query_row(
          &format!("SELECT {ROOM_COLUMNS} FROM rooms WHERE room_id = ?1"),
          rusqlite::params![room_id],
          RawRoom::from_row,
        )?;

        tx.execute("DELETE FROM participants WHERE user_id = ?1", rusqlite::params![user_str])?;

        let remaining: i64 = tx.query_row(
          "SELECT COUNT(*) FROM participants WHERE room_id = ?1",
          rusqlite::params![room_id],
          |r| r.get(0),
        )?;
        let room_deleted = remaining == 0 && !has_active_session(&tx, &room_id)?;
        if room_deleted {
          delete_room_cascade(&tx, &room_id)?;
        }

        tx.commit()?;
        Ok(RawLeave::Left { room, room_deleted })
      })
      .await?;

    Ok(match raw {
      RawLeave::NotInAnyRoom => LeaveOutcome::NotInAnyRoom,
      RawLeave::Left { room, room_deleted } => {
        LeaveOutcome::Left { room: room.into_room()?, room_deleted }
      }
    })
  }

  async fn current_membership(&self, user_id: Uuid) -> Result<Option<Participant>> {
    let raw = self
      .query_opt(
        format!("SELECT {PARTICIPANT_COLUMNS} FROM participants WHERE user_id = ?1"),
        encode_uuid(user_id),
        RawParticipant::from_row,
      )
      .await?;
    raw.map(RawParticipant::into_participant).transpose()
  }

  async fn list_participants(&self, room_id: Uuid) -> Result<Vec<Participant>> {
    let raws = self
      .query_all(
        format!(
          "SELECT {PARTICIPANT_COLUMNS} FROM participants
           WHERE room_id = ?1 ORDER BY joined_at, rowid"
        ),
        vec![encode_uuid(room_id)],
        RawParticipant::from_row,
      )
      .await?;
    raws.into_iter().map(RawParticipant::into_participant).collect()
  }

  // ── Cards ─────────────────────────────────────────────────────────────────

  async fn insert_card(&self, card: Card) -> Result<CardInsert> {
    let card_str = encode_uuid(card.card_id);
    let room_str = encode_uuid(card.room_id);
    let owner_str = encode_uuid(card.owner_id);
    let numbers_json = serde_json::to_string(&card.numbers)?;
    let hash = card.content_hash;
    let at_str = encode_dt(card.created_at);

    Ok(
      self
        .conn
        .call(move |conn| {
          let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

          let member_of: Option<String> = tx
            .query_row(
              "SELECT room_id FROM participants WHERE user_id = ?1",
              rusqlite::params![owner_str],
              |r| r.get(0),
            )
            .optional()?;
          if member_of.as_deref() != Some(room_str.as_str()) {
            return Ok(CardInsert::NotInRoom);
          }

          match tx.execute(
            "INSERT INTO cards (card_id, room_id, owner_id, numbers, content_hash, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            rusqlite::params![card_str, room_str, owner_str, numbers_json, hash, at_str],
          ) {
            Ok(_) => {}
            Err(e) if is_unique_violation(&e) => return Ok(CardInsert::Duplicate),
            Err(e) => return Err(e.into()),
          }

          tx.commit()?;
          Ok(CardInsert::Inserted)
        })
        .await?,
    )
  }

  async fn get_card(&self, card_id: Uuid) -> Result<Option<Card>> {
    let raw = self
      .query_opt(
        format!("SELECT {CARD_COLUMNS} FROM cards WHERE card_id = ?1"),
        encode_uuid(card_id),
        RawCard::from_row,
      )
      .await?;
    raw.map(RawCard::into_card).transpose()
  }

  async fn card_for(&self, room_id: Uuid, owner_id: Uuid) -> Result<Option<Card>> {
    let mut raws = self
      .query_all(
        format!("SELECT {CARD_COLUMNS} FROM cards WHERE room_id = ?1 AND owner_id = ?2"),
        vec![encode_uuid(room_id), encode_uuid(owner_id)],
        RawCard::from_row,
      )
      .await?;
    raws.pop().map(RawCard::into_card).transpose()
  }

  async fn list_cards(&self, room_id: Uuid) -> Result<Vec<Card>> {
    let raws = self
      .query_all(
        format!("SELECT {CARD_COLUMNS} FROM cards WHERE room_id = ?1 ORDER BY created_at, rowid"),
        vec![encode_uuid(room_id)],
        RawCard::from_row,
      )
      .await?;
    raws.into_iter().map(RawCard::into_card).collect()
  }

  // ── Sessions ──────────────────────────────────────────────────────────────

  async fn start_session(&self, session: Session) -> Result<SessionStart> {
    let session_str = encode_uuid(session.session_id);
    let room_str = encode_uuid(session.room_id);
    let at_str = encode_dt(session.created_at);

    Ok(
      self
        .conn
        .call(move |conn| {
          let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
          if select_room(&tx, &room_str)?.is_none() {
            return Ok(SessionStart::RoomNotFound);
          }

          match tx.execute(
            "INSERT INTO sessions (session_id, room_id, is_active, created_at)
             VALUES (?1, ?2, 1, ?3)",
            rusqlite::params![session_str, room_str, at_str],
          ) {
            Ok(_) => {}
            Err(e) if is_unique_violation(&e) => return Ok(SessionStart::AlreadyStarted),
            Err(e) => return Err(e.into()),
          }
          tx.execute("UPDATE rooms SET is_closed = 1 WHERE room_id = ?1", rusqlite::params![room_str])?;

          tx.commit()?;
          Ok(SessionStart::Started)
        })
        .await?,
    )
  }

  async fn get_session(&self, session_id: Uuid) -> Result<Option<Session>> {
    let raw = self
      .query_opt(
        format!("SELECT {SESSION_COLUMNS} FROM sessions WHERE session_id = ?1"),
        encode_uuid(session_id),
        RawSession::from_row,
      )
      .await?;
    raw.map(RawSession::into_session).transpose()
  }

  async fn session_for_room(&self, room_id: Uuid) -> Result<Option<Session>> {
    let raw = self
      .query_opt(
        format!("SELECT {SESSION_COLUMNS} FROM sessions WHERE room_id = ?1"),
        encode_uuid(room_id),
        RawSession::from_row,
      )
      .await?;
    raw.map(RawSession::into_session).transpose()
  }

  async fn list_sessions(&self) -> Result<Vec<Session>> {
    let raws = self
      .query_all(
        format!("SELECT {SESSION_COLUMNS} FROM sessions ORDER BY created_at DESC, rowid DESC"),
        vec![],
        RawSession::from_row,
      )
      .await?;
    raws.into_iter().map(RawSession::into_session).collect()
  }

  async fn draw_number<P>(
    &self,
    session_id: Uuid,
    drawn_at: DateTime<Utc>,
    pick: P,
  ) -> Result<DrawOutcome>
  where
    P: FnOnce(&[u8]) -> Option<u8> + Send + 'static,
  {
    let session_str = encode_uuid(session_id);
    let at_str = encode_dt(drawn_at);

    let raw = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let active: Option<bool> = tx
          .query_row(
            "SELECT is_active FROM sessions WHERE session_id = ?1",
            rusqlite::params![session_str],
            |r| r.get(0),
          )
          .optional()?;
        match active {
          None => return Ok(RawDrawOutcome::SessionNotFound),
          Some(false) => return Ok(RawDrawOutcome::SessionInactive),
          Some(true) => {}
        }

        let drawn: Vec<u8> = {
          let mut stmt = tx.prepare(
            "SELECT number FROM drawn_numbers WHERE session_id = ?1 ORDER BY sequence",
          )?;
          let numbers = stmt
            .query_map(rusqlite::params![session_str], |r| r.get(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
          numbers
        };
        if drawn.len() >= usize::from(POOL_SIZE) {
          return Ok(RawDrawOutcome::PoolExhausted);
        }
        let Some(number) = pick(&drawn) else {
          return Ok(RawDrawOutcome::PoolExhausted);
        };
        let sequence = drawn.len() as u16 + 1;

        tx.execute(
          "INSERT INTO drawn_numbers (session_id, number, sequence, drawn_at)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![session_str, number, sequence, at_str],
        )?;

        tx.commit()?;
        Ok(RawDrawOutcome::Drawn { number, sequence })
      })
      .await?;

    Ok(match raw {
      RawDrawOutcome::Drawn { number, sequence } => {
        DrawOutcome::Drawn(DrawnNumber { session_id, number, sequence, drawn_at })
      }
      RawDrawOutcome::SessionNotFound => DrawOutcome::SessionNotFound,
      RawDrawOutcome::SessionInactive => DrawOutcome::SessionInactive,
      RawDrawOutcome::PoolExhausted => DrawOutcome::PoolExhausted,
    })
  }

  async fn list_draws(&self, session_id: Uuid) -> Result<Vec<DrawnNumber>> {
    let raws = self
      .query_all(
        "SELECT session_id, number, sequence, drawn_at FROM drawn_numbers
         WHERE session_id = ?1 ORDER BY sequence"
          .to_owned(),
        vec![encode_uuid(session_id)],
        RawDraw::from_row,
      )
      .await?;
    raws.into_iter().map(RawDraw::into_draw).collect()
  }

  async fn end_session(&self, session_id: Uuid, ended_at: DateTime<Utc>) -> Result<SessionEnd> {
    let session_str = encode_uuid(session_id);
    let at_str = encode_dt(ended_at);

    let raw = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let changed = tx.execute(
          "UPDATE sessions SET is_active = 0, ended_at = ?2
           WHERE session_id = ?1 AND is_active = 1",
          rusqlite::params![session_str, at_str],
        )?;
        let current = select_session(&tx, &session_str)?;
        tx.commit()?;

        Ok(match current {
          None => RawTransition::NotFound,
          Some(session) if changed == 1 => RawTransition::Changed(session),
          Some(_) => RawTransition::Inactive,
        })
      })
      .await?;

    Ok(match raw {
      RawTransition::Changed(session) => SessionEnd::Ended(session.into_session()?),
      RawTransition::NotFound => SessionEnd::NotFound,
      RawTransition::AlreadyDeclared | RawTransition::Inactive => SessionEnd::AlreadyEnded,
    })
  }

  async fn declare_winner(
    &self,
    session_id: Uuid,
    winner_id: Uuid,
    card_id: Uuid,
    ended_at: DateTime<Utc>,
  ) -> Result<WinnerClaim> {
    let session_str = encode_uuid(session_id);
    let winner_str = encode_uuid(winner_id);
    let card_str = encode_uuid(card_id);
    let at_str = encode_dt(ended_at);

    let raw = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let changed = tx.execute(
          "UPDATE sessions
           SET winner_id = ?2, winning_card_id = ?3, is_active = 0, ended_at = ?4
           WHERE session_id = ?1 AND is_active = 1 AND winner_id IS NULL",
          rusqlite::params![session_str, winner_str, card_str, at_str],
        )?;
        let current = select_session(&tx, &session_str)?;
        tx.commit()?;

        Ok(match current {
          None => RawTransition::NotFound,
          Some(session) if changed == 1 => RawTransition::Changed(session),
          Some(session) if session.winner_id.is_some() => RawTransition::AlreadyDeclared,
          Some(_) => RawTransition::Inactive,
        })
      })
      .await?;

    Ok(match raw {
      RawTransition::Changed(session) => WinnerClaim::Declared(session.into_session()?),
      RawTransition::NotFound => WinnerClaim::NotFound,
      RawTransition::AlreadyDeclared => WinnerClaim::AlreadyDeclared,
      RawTransition::Inactive => WinnerClaim::SessionEnded,
    })
  }

  // ── Audit & history ───────────────────────────────────────────────────────

  async fn append_audit(&self, entry: AuditEntry) -> Result<()> {
    let id_str = encode_uuid(entry.entry_id);
    let actor_str = encode_uuid(entry.actor_id);
    let target_str = entry.target_id.map(encode_uuid);
    let at_str = encode_dt(entry.timestamp);
    let action = entry.action;

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO audit_log (entry_id, actor_id, action, target_id, timestamp)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![id_str, actor_str, action, target_str, at_str],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn list_audit(&self, limit: usize) -> Result<Vec<AuditEntry>> {
    let limit = i64::try_from(limit).unwrap_or(i64::MAX);
    let raws = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT entry_id, actor_id, action, target_id, timestamp FROM audit_log
           ORDER BY timestamp DESC, rowid DESC LIMIT ?1",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![limit], RawAudit::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    raws.into_iter().map(RawAudit::into_entry).collect()
  }

  async fn insert_history(&self, record: HistoryRecord) -> Result<HistoryInsert> {
    let id_str = encode_uuid(record.history_id);
    let session_str = encode_uuid(record.session_id);
    let winner_str = record.winner_id.map(encode_uuid);
    let drawn_json = serde_json::to_string(&record.drawn_numbers)?;
    let started_str = encode_dt(record.started_at);
    let ended_str = encode_dt(record.ended_at);
    let HistoryRecord { room_code, winning_card_hash, is_completed, .. } = record;

    Ok(
      self
        .conn
        .call(move |conn| {
          match conn.execute(
            "INSERT INTO history (
               history_id, session_id, room_code, winner_id, winning_card_hash,
               drawn_numbers, started_at, ended_at, is_completed
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            rusqlite::params![
              id_str,
              session_str,
              room_code,
              winner_str,
              winning_card_hash,
              drawn_json,
              started_str,
              ended_str,
              is_completed,
            ],
          ) {
            Ok(_) => Ok(HistoryInsert::Inserted),
            Err(e) if is_unique_violation(&e) => Ok(HistoryInsert::AlreadyRecorded),
            Err(e) => Err(e.into()),
          }
        })
        .await?,
    )
  }

  async fn get_history(&self, session_id: Uuid) -> Result<Option<HistoryRecord>> {
    let raw = self
      .query_opt(
        format!("SELECT {HISTORY_COLUMNS} FROM history WHERE session_id = ?1"),
        encode_uuid(session_id),
        RawHistory::from_row,
      )
      .await?;
    raw.map(RawHistory::into_record).transpose()
  }

  async fn list_history(&self) -> Result<Vec<HistoryRecord>> {
    let raws = self
      .query_all(
        format!("SELECT {HISTORY_COLUMNS} FROM history ORDER BY ended_at DESC, rowid DESC"),
        vec![],
        RawHistory::from_row,
      )
      .await?;
    raws.into_iter().map(RawHistory::into_record).collect()
  }
}
