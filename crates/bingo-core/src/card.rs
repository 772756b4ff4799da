//! Bingo cards: grid generation and the content fingerprint.
//!
//! A card is a 5x5 grid stored row-major. Column `c` holds numbers from
//! `15c + 1 ..= 15c + 15`; the center cell is the free marker.

use chrono::{DateTime, Utc};
use rand::{Rng, seq::index};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Side length of a card.
pub const CARD_SIZE: usize = 5;

/// Value of the pre-covered center cell.
pub const FREE_CELL: u8 = 0;

/// Numbers available to each column.
pub const COLUMN_SPAN: u8 = 15;

const CENTER: usize = CARD_SIZE / 2;

// ─── Grid ────────────────────────────────────────────────────────────────────

/// The numbers on a card, row-major: `rows()[r][c]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardGrid([[u8; CARD_SIZE]; CARD_SIZE]);

impl CardGrid {
  /// Sample a fresh grid. Each column draws without replacement from its own
  /// range; the middle column draws four and takes the free marker third.
  pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
    let mut columns = [[FREE_CELL; CARD_SIZE]; CARD_SIZE];

    for (c, column) in columns.iter_mut().enumerate() {
      let base = column_range(c).0;
      let wanted = if c == CENTER { CARD_SIZE - 1 } else { CARD_SIZE };
      let mut picked = index::sample(rng, usize::from(COLUMN_SPAN), wanted)
        .into_iter()
        .map(|offset| base + offset as u8);

      for (r, cell) in column.iter_mut().enumerate() {
        if c == CENTER && r == CENTER {
          continue;
        }
        if let Some(n) = picked.next() {
          *cell = n;
        }
      }
    }

    Self::from_columns(columns)
  }

  /// Build a grid from row-major rows as given.
  pub fn from_rows(rows: [[u8; CARD_SIZE]; CARD_SIZE]) -> Self { Self(rows) }

  fn from_columns(columns: [[u8; CARD_SIZE]; CARD_SIZE]) -> Self {
    let mut rows = [[FREE_CELL; CARD_SIZE]; CARD_SIZE];
    for (c, column) in columns.iter().enumerate() {
      for (r, &value) in column.iter().enumerate() {
        rows[r][c] = value;
      }
    }
    Self(rows)
  }

  pub fn rows(&self) -> &[[u8; CARD_SIZE]; CARD_SIZE] { &self.0 }

  /// Column `c`, top to bottom.
  pub fn column(&self, c: usize) -> [u8; CARD_SIZE] {
    std::array::from_fn(|r| self.0[r][c])
  }

  pub fn cell(&self, row: usize, col: usize) -> u8 { self.0[row][col] }

  /// Canonical text form of the rows, e.g. `[[1, 16, 31, 46, 61], ...]`.
  pub fn canonical(&self) -> String {
    let rows: Vec<String> = self
      .0
      .iter()
      .map(|row| {
        let cells: Vec<String> = row.iter().map(u8::to_string).collect();
        format!("[{}]", cells.join(", "))
      })
      .collect();
    format!("[{}]", rows.join(", "))
  }
}

/// Inclusive number range of column `c`.
pub fn column_range(c: usize) -> (u8, u8) {
  let base = c as u8 * COLUMN_SPAN + 1;
  (base, base + COLUMN_SPAN - 1)
}

// ─── Fingerprint ─────────────────────────────────────────────────────────────

/// SHA-256 hex digest over the canonical grid, the owner and the room.
///
/// Identical grids handed to different owners or rooms hash differently.
pub fn content_hash(grid: &CardGrid, owner_id: Uuid, room_id: Uuid) -> String {
  let mut hasher = Sha256::new();
  hasher.update(grid.canonical().as_bytes());
  hasher.update(owner_id.hyphenated().to_string().as_bytes());
  hasher.update(room_id.hyphenated().to_string().as_bytes());
  hex::encode(hasher.finalize())
}

// ─── Card ────────────────────────────────────────────────────────────────────

/// A player's card in one room. Never modified after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
  pub card_id:      Uuid,
  pub room_id:      Uuid,
  pub owner_id:     Uuid,
  pub numbers:      CardGrid,
  pub content_hash: String,
  pub created_at:   DateTime<Utc>,
}

impl Card {
  /// Assemble a card for `owner_id` in `room_id`, computing its hash.
  pub fn new(
    room_id: Uuid,
    owner_id: Uuid,
    numbers: CardGrid,
    created_at: DateTime<Utc>,
  ) -> Self {
    Self {
      card_id: Uuid::new_v4(),
      room_id,
      owner_id,
      content_hash: content_hash(&numbers, owner_id, room_id),
      numbers,
      created_at,
    }
  }
}
