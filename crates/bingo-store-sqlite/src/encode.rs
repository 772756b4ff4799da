//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 UTC strings with fixed microsecond
//! precision, so that lexical order is chronological order. Grids and number
//! lists are stored as compact JSON. UUIDs are hyphenated lowercase strings.

use bingo_core::{
  audit::{AuditEntry, HistoryRecord},
  card::{Card, CardGrid},
  room::{Participant, Room, RoomCode},
  session::{DrawnNumber, Session},
};
use chrono::{DateTime, SecondsFormat, Utc};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Scalars ─────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

fn decode_opt_uuid(s: Option<String>) -> Result<Option<Uuid>> {
  s.as_deref().map(decode_uuid).transpose()
}

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339_opts(SecondsFormat::Micros, true) }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

fn decode_opt_dt(s: Option<String>) -> Result<Option<DateTime<Utc>>> {
  s.as_deref().map(decode_dt).transpose()
}

fn decode_code(s: String) -> Result<RoomCode> {
  RoomCode::try_from(s).map_err(|e| Error::Corrupt { column: "rooms.code", value: e.0 })
}

fn decode_number(column: &'static str, n: i64) -> Result<u8> {
  u8::try_from(n).map_err(|_| Error::Corrupt { column, value: n.to_string() })
}

// ─── Row types ───────────────────────────────────────────────────────────────

pub const ROOM_COLUMNS: &str = "room_id, code, created_by, is_closed, created_at";

/// Raw values read directly from a `rooms` row.
pub struct RawRoom {
  pub room_id:    String,
  pub code:       String,
  pub created_by: String,
  pub is_closed:  bool,
  pub created_at: String,
}

impl RawRoom {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      room_id:    row.get(0)?,
      code:       row.get(1)?,
      created_by: row.get(2)?,
      is_closed:  row.get(3)?,
      created_at: row.get(4)?,
    })
  }

  pub fn into_room(self) -> Result<Room> {
    Ok(Room {
      room_id:    decode_uuid(&self.room_id)?,
      code:       decode_code(self.code)?,
      created_by: decode_uuid(&self.created_by)?,
      is_closed:  self.is_closed,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

pub const PARTICIPANT_COLUMNS: &str = "user_id, room_id, joined_at";

/// Raw values read directly from a `participants` row.
pub struct RawParticipant {
  pub user_id:   String,
  pub room_id:   String,
  pub joined_at: String,
}

impl RawParticipant {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self { user_id: row.get(0)?, room_id: row.get(1)?, joined_at: row.get(2)? })
  }

  pub fn into_participant(self) -> Result<Participant> {
    Ok(Participant {
      user_id:   decode_uuid(&self.user_id)?,
      room_id:   decode_uuid(&self.room_id)?,
      joined_at: decode_dt(&self.joined_at)?,
    })
  }
}

pub const CARD_COLUMNS: &str = "card_id, room_id, owner_id, numbers, content_hash, created_at";

/// Raw values read directly from a `cards` row.
pub struct RawCard {
  pub card_id:      String,
  pub room_id:      String,
  pub owner_id:     String,
  pub numbers:      String,
  pub content_hash: String,
  pub created_at:   String,
}

impl RawCard {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      card_id:      row.get(0)?,
      room_id:      row.get(1)?,
      owner_id:     row.get(2)?,
      numbers:      row.get(3)?,
      content_hash: row.get(4)?,
      created_at:   row.get(5)?,
    })
  }

  pub fn into_card(self) -> Result<Card> {
    let numbers: CardGrid = serde_json::from_str(&self.numbers)?;
    Ok(Card {
      card_id: decode_uuid(&self.card_id)?,
      room_id: decode_uuid(&self.room_id)?,
      owner_id: decode_uuid(&self.owner_id)?,
      numbers,
      content_hash: self.content_hash,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

pub const SESSION_COLUMNS: &str =
  "session_id, room_id, is_active, winner_id, winning_card_id, created_at, ended_at";

/// Raw values read directly from a `sessions` row.
pub struct RawSession {
  pub session_id:      String,
  pub room_id:         String,
  pub is_active:       bool,
  pub winner_id:       Option<String>,
  pub winning_card_id: Option<String>,
  pub created_at:      String,
  pub ended_at:        Option<String>,
}

impl RawSession {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      session_id:      row.get(0)?,
      room_id:         row.get(1)?,
      is_active:       row.get(2)?,
      winner_id:       row.get(3)?,
      winning_card_id: row.get(4)?,
      created_at:      row.get(5)?,
      ended_at:        row.get(6)?,
    })
  }

  pub fn into_session(self) -> Result<Session> {
    Ok(Session {
      session_id:      decode_uuid(&self.session_id)?,
      room_id:         decode_uuid(&self.room_id)?,
      is_active:       self.is_active,
      winner_id:       decode_opt_uuid(self.winner_id)?,
      winning_card_id: decode_opt_uuid(self.winning_card_id)?,
      created_at:      decode_dt(&self.created_at)?,
      ended_at:        decode_opt_dt(self.ended_at)?,
    })
  }
}

/// Raw values read directly from a `drawn_numbers` row.
pub struct RawDraw {
  pub session_id: String,
  pub number:     i64,
  pub sequence:   i64,
  pub drawn_at:   String,
}

impl RawDraw {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      session_id: row.get(0)?,
      number:     row.get(1)?,
      sequence:   row.get(2)?,
      drawn_at:   row.get(3)?,
    })
  }

  pub fn into_draw(self) -> Result<DrawnNumber> {
    Ok(DrawnNumber {
      session_id: decode_uuid(&self.session_id)?,
      number:     decode_number("drawn_numbers.number", self.number)?,
      sequence:   u16::try_from(self.sequence).map_err(|_| Error::Corrupt {
        column: "drawn_numbers.sequence",
        value:  self.sequence.to_string(),
      })?,
      drawn_at:   decode_dt(&self.drawn_at)?,
    })
  }
}

/// Raw values read directly from an `audit_log` row.
pub struct RawAudit {
  pub entry_id:  String,
  pub actor_id:  String,
  pub action:    String,
  pub target_id: Option<String>,
  pub timestamp: String,
}

impl RawAudit {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      entry_id:  row.get(0)?,
      actor_id:  row.get(1)?,
      action:    row.get(2)?,
      target_id: row.get(3)?,
      timestamp: row.get(4)?,
    })
  }

  pub fn into_entry(self) -> Result<AuditEntry> {
    Ok(AuditEntry {
      entry_id:  decode_uuid(&self.entry_id)?,
      actor_id:  decode_uuid(&self.actor_id)?,
      action:    self.action,
      target_id: decode_opt_uuid(self.target_id)?,
      timestamp: decode_dt(&self.timestamp)?,
    })
  }
}

pub const HISTORY_COLUMNS: &str = "history_id, session_id, room_code, winner_id, \
   winning_card_hash, drawn_numbers, started_at, ended_at, is_completed";

/// Raw values read directly from a `history` row.
pub struct RawHistory {
  pub history_id:        String,
  pub session_id:        String,
  pub room_code:         String,
  pub winner_id:         Option<String>,
  pub winning_card_hash: Option<String>,
  pub drawn_numbers:     String,
  pub started_at:        String,
  pub ended_at:          String,
  pub is_completed:      bool,
}

impl RawHistory {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      history_id:        row.get(0)?,
      session_id:        row.get(1)?,
      room_code:         row.get(2)?,
      winner_id:         row.get(3)?,
      winning_card_hash: row.get(4)?,
      drawn_numbers:     row.get(5)?,
      started_at:        row.get(6)?,
      ended_at:          row.get(7)?,
      is_completed:      row.get(8)?,
    })
  }

  pub fn into_record(self) -> Result<HistoryRecord> {
    Ok(HistoryRecord {
      history_id:        decode_uuid(&self.history_id)?,
      session_id:        decode_uuid(&self.session_id)?,
      room_code:         self.room_code,
      winner_id:         decode_opt_uuid(self.winner_id)?,
      winning_card_hash: self.winning_card_hash,
      drawn_numbers:     serde_json::from_str(&self.drawn_numbers)?,
      started_at:        decode_dt(&self.started_at)?,
      ended_at:          decode_dt(&self.ended_at)?,
      is_completed:      self.is_completed,
    })
  }
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;

  #[test]
  fn timestamps_sort_lexically() {
    let a = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
    let b = Utc.timestamp_opt(1_700_000_000, 5_000).unwrap();
    let c = Utc.timestamp_opt(1_700_000_001, 0).unwrap();
    let (ea, eb, ec) = (encode_dt(a), encode_dt(b), encode_dt(c));
    assert!(ea < eb && eb < ec, "{ea} {eb} {ec}");
    assert_eq!(decode_dt(&eb).unwrap(), b);
  }

  #[test]
  fn out_of_range_number_is_corrupt() {
    assert!(matches!(
      decode_number("drawn_numbers.number", 300),
      Err(Error::Corrupt { .. })
    ));
  }
}
