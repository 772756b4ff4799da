//! Winning-line detection.

use std::{collections::HashSet, fmt};

use serde::{Deserialize, Serialize};

use crate::card::{CARD_SIZE, CardGrid, FREE_CELL};

/// A fully covered line on a card. Indices are 0-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Pattern {
  Row { index: usize },
  Column { index: usize },
  MainDiagonal,
  AntiDiagonal,
}

impl fmt::Display for Pattern {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Row { index } => write!(f, "row {}", index + 1),
      Self::Column { index } => write!(f, "column {}", index + 1),
      Self::MainDiagonal => f.write_str("main diagonal"),
      Self::AntiDiagonal => f.write_str("anti-diagonal"),
    }
  }
}

/// First covered line on `grid`, checking rows, then columns, then the main
/// diagonal, then the anti-diagonal.
pub fn find_winning_pattern(grid: &CardGrid, drawn: &HashSet<u8>) -> Option<Pattern> {
  let covered = |r: usize, c: usize| {
    let value = grid.cell(r, c);
    value == FREE_CELL || drawn.contains(&value)
  };

  (0..CARD_SIZE)
    .find(|&r| (0..CARD_SIZE).all(|c| covered(r, c)))
    .map(|index| Pattern::Row { index })
    .or_else(|| {
      (0..CARD_SIZE)
        .find(|&c| (0..CARD_SIZE).all(|r| covered(r, c)))
        .map(|index| Pattern::Column { index })
    })
    .or_else(|| (0..CARD_SIZE).all(|i| covered(i, i)).then_some(Pattern::MainDiagonal))
    .or_else(|| {
      (0..CARD_SIZE)
        .all(|i| covered(i, CARD_SIZE - 1 - i))
        .then_some(Pattern::AntiDiagonal)
    })
}
