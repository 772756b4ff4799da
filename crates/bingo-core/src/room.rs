//! Rooms, their human-readable codes, and room membership.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ─── Room code ───────────────────────────────────────────────────────────────

const CODE_PREFIX_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const CODE_SUFFIX_ALPHABET: &[u8] = b"0123456789";

/// A short code players type to find a room, formatted `XXX-999`: three
/// characters from `[A-Z0-9]`, a dash, three digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RoomCode(String);

impl RoomCode {
  /// Draw a fresh random code. Uniqueness is the store's concern.
  pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
    let mut code = String::with_capacity(7);
    for _ in 0..3 {
      code.push(pick(rng, CODE_PREFIX_ALPHABET));
    }
    code.push('-');
    for _ in 0..3 {
      code.push(pick(rng, CODE_SUFFIX_ALPHABET));
    }
    Self(code)
  }

  pub fn as_str(&self) -> &str { &self.0 }

  fn is_well_formed(s: &str) -> bool {
    let bytes = s.as_bytes();
    bytes.len() == 7
      && bytes[..3].iter().all(|b| CODE_PREFIX_ALPHABET.contains(b))
      && bytes[3] == b'-'
      && bytes[4..].iter().all(u8::is_ascii_digit)
  }
}

fn pick<R: Rng + ?Sized>(rng: &mut R, alphabet: &[u8]) -> char {
  char::from(alphabet[rng.random_range(0..alphabet.len())])
}

/// Returned when a string does not have the `XXX-999` shape.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("malformed room code: {0:?}")]
pub struct InvalidRoomCode(pub String);

impl FromStr for RoomCode {
  type Err = InvalidRoomCode;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    if Self::is_well_formed(s) {
      Ok(Self(s.to_owned()))
    } else {
      Err(InvalidRoomCode(s.to_owned()))
    }
  }
}

impl TryFrom<String> for RoomCode {
  type Error = InvalidRoomCode;

  fn try_from(s: String) -> Result<Self, Self::Error> {
    if Self::is_well_formed(&s) { Ok(Self(s)) } else { Err(InvalidRoomCode(s)) }
  }
}

impl From<RoomCode> for String {
  fn from(code: RoomCode) -> Self { code.0 }
}

impl fmt::Display for RoomCode {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

// ─── Room ────────────────────────────────────────────────────────────────────

/// A lobby grouping a host and players for one game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
  pub room_id:    Uuid,
  pub code:       RoomCode,
  pub created_by: Uuid,
  /// Set once the session starts; closed rooms accept no joins.
  pub is_closed:  bool,
  pub created_at: DateTime<Utc>,
}

impl Room {
  /// A new open room owned by `created_by`.
  pub fn new(code: RoomCode, created_by: Uuid, created_at: DateTime<Utc>) -> Self {
    Self {
      room_id: Uuid::new_v4(),
      code,
      created_by,
      is_closed: false,
      created_at,
    }
  }
}

// ─── Membership ──────────────────────────────────────────────────────────────

/// A user's current room. A user has at most one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
  pub user_id:   Uuid,
  pub room_id:   Uuid,
  pub joined_at: DateTime<Utc>,
}

/// How a participant is presented in a room listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeatRole {
  Host,
  Player,
}

/// One line of a room's participant listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seat {
  pub user_id:   Uuid,
  pub role:      SeatRole,
  /// `None` for a creator who has since left the room.
  pub joined_at: Option<DateTime<Utc>>,
}

/// Build the listing for `room`: the creator first as host, then every other
/// participant as a player, in the order given.
pub fn roster(room: &Room, participants: &[Participant]) -> Vec<Seat> {
  let host_joined = participants
    .iter()
    .find(|p| p.user_id == room.created_by)
    .map(|p| p.joined_at);

  let mut seats = vec![Seat {
    user_id:   room.created_by,
    role:      SeatRole::Host,
    joined_at: host_joined,
  }];
  seats.extend(
    participants
      .iter()
      .filter(|p| p.user_id != room.created_by)
      .map(|p| Seat {
        user_id:   p.user_id,
        role:      SeatRole::Player,
        joined_at: Some(p.joined_at),
      }),
  );
  seats
}
