//! Win validation.

use std::collections::HashSet;

use bingo_core::{
  Error, Result,
  card::Card,
  event::{EventPayload, GameEvent},
  identity::Caller,
  pattern::{Pattern, find_winning_pattern},
  session::Session,
  store::{GameStore, WinnerClaim},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::Game;

/// A successful claim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BingoWin {
  /// The session as it ended.
  pub session: Session,
  pub card:    Card,
  pub pattern: Pattern,
}

impl<S: GameStore> Game<S> {
  /// Check the caller's card against the draws and, on a covered line, try
  /// to become the session's one winner.
  pub async fn validate_bingo(&self, caller: Caller, session_id: Uuid) -> Result<BingoWin> {
    let (session, room) = self.session_and_room(session_id).await?;
    if session.winner_id.is_some() {
      return Err(Error::WinnerAlreadyDeclared(session_id));
    }
    if !session.is_active {
      return Err(Error::SessionEnded(session_id));
    }

    let card = self.card_for(caller, session.room_id).await?;
    let draws = self.retry.run("list_draws", move || self.store.list_draws(session_id)).await?;
    let drawn: HashSet<u8> = draws.iter().map(|d| d.number).collect();

    let Some(pattern) = find_winning_pattern(&card.numbers, &drawn) else {
      tracing::info!(room_code = %room.code, %session_id, user_id = %caller.user_id, "invalid bingo claim");
      self
        .log_action(caller.user_id, "Invalid bingo attempt".to_owned(), Some(session_id))
        .await;
      return Err(Error::NoWinningPattern);
    };

    let (winner_id, card_id, now) = (caller.user_id, card.card_id, Utc::now());
    let claim = self
      .retry
      .run("declare_winner", move || self.store.declare_winner(session_id, winner_id, card_id, now))
      .await?;

    let session = match claim {
      WinnerClaim::Declared(session) => session,
      WinnerClaim::NotFound => return Err(Error::SessionNotFound(session_id)),
      WinnerClaim::AlreadyDeclared => return Err(Error::WinnerAlreadyDeclared(session_id)),
      WinnerClaim::SessionEnded => return Err(Error::SessionEnded(session_id)),
    };

    tracing::info!(room_code = %room.code, %session_id, %winner_id, %pattern, "winner declared");
    self.log_action(winner_id, format!("BINGO by {pattern}"), Some(session_id)).await;
    self.record_history(session_id).await;
    self.publish(GameEvent {
      room_code: room.code.to_string(),
      payload:   EventPayload::WinnerDeclared { session_id, winner_id, card_id, pattern },
    });
    Ok(BingoWin { session, card, pattern })
  }
}
