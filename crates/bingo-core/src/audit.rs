//! Audit log entries and finished-game history records.
//!
//! Both are append-only. Audit entries are never updated or deleted; a
//! history record is written once per session and outlives the session and
//! room it describes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{card::Card, room::Room, session::{DrawnNumber, Session}};

// ─── Audit log ───────────────────────────────────────────────────────────────

/// One recorded action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
  pub entry_id:  Uuid,
  pub actor_id:  Uuid,
  pub action:    String,
  /// The room, session or card the action concerned, if any.
  pub target_id: Option<Uuid>,
  pub timestamp: DateTime<Utc>,
}

impl AuditEntry {
  pub fn new(actor_id: Uuid, action: impl Into<String>, target_id: Option<Uuid>) -> Self {
    Self {
      entry_id: Uuid::new_v4(),
      actor_id,
      action: action.into(),
      target_id,
      timestamp: Utc::now(),
    }
  }
}

// ─── History ─────────────────────────────────────────────────────────────────

/// The permanent record of a finished session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRecord {
  pub history_id:        Uuid,
  pub session_id:        Uuid,
  pub room_code:         String,
  pub winner_id:         Option<Uuid>,
  pub winning_card_hash: Option<String>,
  /// Every number drawn, in draw order.
  pub drawn_numbers:     Vec<u8>,
  pub started_at:        DateTime<Utc>,
  pub ended_at:          DateTime<Utc>,
  /// Always `true` once written; `winner_id` tells a win from a manual end.
  pub is_completed:      bool,
}

impl HistoryRecord {
  /// Snapshot a terminated `session`. `draws` must already be in sequence
  /// order; `winning_card` is the card referenced by the session, if any.
  pub fn snapshot(
    session: &Session,
    room: &Room,
    winning_card: Option<&Card>,
    draws: &[DrawnNumber],
  ) -> Self {
    Self {
      history_id:        Uuid::new_v4(),
      session_id:        session.session_id,
      room_code:         room.code.to_string(),
      winner_id:         session.winner_id,
      winning_card_hash: winning_card.map(|c| c.content_hash.clone()),
      drawn_numbers:     draws.iter().map(|d| d.number).collect(),
      started_at:        session.created_at,
      ended_at:          session.ended_at.unwrap_or_else(Utc::now),
      is_completed:      true,
    }
  }
}
