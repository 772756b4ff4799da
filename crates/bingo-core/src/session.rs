//! Game sessions and the draw pool.

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Size of the shared number pool, `1..=POOL_SIZE`.
pub const POOL_SIZE: u8 = 75;

/// One game played in a room. A room has at most one session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
  pub session_id:      Uuid,
  pub room_id:         Uuid,
  pub is_active:       bool,
  pub winner_id:       Option<Uuid>,
  pub winning_card_id: Option<Uuid>,
  pub created_at:      DateTime<Utc>,
  /// When the session reached a terminal state.
  pub ended_at:        Option<DateTime<Utc>>,
}

/// Lifecycle state, derived from the stored fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
  Active,
  Ended,
  EndedWithWinner,
}

impl Session {
  /// A fresh active session for `room_id`.
  pub fn start(room_id: Uuid, created_at: DateTime<Utc>) -> Self {
    Self {
      session_id: Uuid::new_v4(),
      room_id,
      is_active: true,
      winner_id: None,
      winning_card_id: None,
      created_at,
      ended_at: None,
    }
  }

  pub fn state(&self) -> SessionState {
    match (self.is_active, self.winner_id) {
      (true, _) => SessionState::Active,
      (false, None) => SessionState::Ended,
      (false, Some(_)) => SessionState::EndedWithWinner,
    }
  }
}

/// A number revealed in a session. `sequence` is the 1-based draw ordinal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawnNumber {
  pub session_id: Uuid,
  pub number:     u8,
  pub sequence:   u16,
  pub drawn_at:   DateTime<Utc>,
}

/// Choose uniformly among the pool numbers not yet in `drawn`.
///
/// Returns `None` once the pool is exhausted.
pub fn pick_next<R: Rng + ?Sized>(drawn: &[u8], rng: &mut R) -> Option<u8> {
  let remaining: Vec<u8> = (1..=POOL_SIZE).filter(|n| !drawn.contains(n)).collect();
  if remaining.is_empty() {
    return None;
  }
  Some(remaining[rng.random_range(0..remaining.len())])
}

#[cfg(test)]
mod tests {
  use std::collections::HashSet;

  use rand::{SeedableRng, rngs::StdRng};

  use super::*;

  #[test]
  fn pick_never_repeats_and_exhausts_after_pool() {
    let mut rng = StdRng::seed_from_u64(11);
    let mut drawn = Vec::new();
    while let Some(n) = pick_next(&drawn, &mut rng) {
      assert!((1..=POOL_SIZE).contains(&n));
      assert!(!drawn.contains(&n));
      drawn.push(n);
    }
    assert_eq!(drawn.len(), usize::from(POOL_SIZE));
    assert_eq!(drawn.iter().collect::<HashSet<_>>().len(), drawn.len());
  }

  #[test]
  fn pick_returns_the_last_remaining_number() {
    let mut rng = StdRng::seed_from_u64(0);
    let drawn: Vec<u8> = (1..=POOL_SIZE).filter(|&n| n != 42).collect();
    assert_eq!(pick_next(&drawn, &mut rng), Some(42));
  }

  #[test]
  fn state_follows_activity_and_winner() {
    let mut session = Session::start(Uuid::new_v4(), Utc::now());
    assert_eq!(session.state(), SessionState::Active);

    session.is_active = false;
    assert_eq!(session.state(), SessionState::Ended);

    session.winner_id = Some(Uuid::new_v4());
    assert_eq!(session.state(), SessionState::EndedWithWinner);
  }
}
