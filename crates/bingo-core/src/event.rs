//! State-change notifications for connected clients, keyed by room code.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::pattern::Pattern;

/// A notification that something visible happened in a room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameEvent {
  pub room_code: String,
  #[serde(flatten)]
  pub payload:   EventPayload,
}

/// Serialised as `{"event_type": "...", "payload": {...}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event_type", content = "payload", rename_all = "snake_case")]
pub enum EventPayload {
  SessionStarted {
    session_id: Uuid,
  },
  NumberDrawn {
    session_id: Uuid,
    number:     u8,
    sequence:   u16,
  },
  WinnerDeclared {
    session_id: Uuid,
    winner_id:  Uuid,
    card_id:    Uuid,
    pattern:    Pattern,
  },
  SessionEnded {
    session_id: Uuid,
  },
}

impl EventPayload {
  /// The `event_type` tag.
  pub fn event_type(&self) -> &'static str {
    match self {
      Self::SessionStarted { .. } => "session_started",
      Self::NumberDrawn { .. } => "number_drawn",
      Self::WinnerDeclared { .. } => "winner_declared",
      Self::SessionEnded { .. } => "session_ended",
    }
  }
}
