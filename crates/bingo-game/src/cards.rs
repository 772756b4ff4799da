//! Card generation and lookup.

use bingo_core::{
  Error, Result,
  card::{Card, CardGrid},
  identity::Caller,
  store::{CardInsert, GameStore},
};
use chrono::Utc;
use uuid::Uuid;

use crate::Game;

impl<S: GameStore> Game<S> {
  /// Deal the caller a fresh card in `room_id`. One card per player and room.
  pub async fn generate_card(&self, caller: Caller, room_id: Uuid) -> Result<Card> {
    let room = self.get_room(room_id).await?;

    let numbers = CardGrid::generate(&mut rand::rng());
    let card = Card::new(room_id, caller.user_id, numbers, Utc::now());
    let pending = &card;
    let outcome = self
      .retry
      .run("insert_card", move || self.store.insert_card(pending.clone()))
      .await?;

    match outcome {
      CardInsert::Inserted => {
        tracing::info!(
          room_code = %room.code,
          owner_id = %card.owner_id,
          hash = %card.content_hash,
          "card generated"
        );
        self
          .log_action(
            caller.user_id,
            format!("Generated card for room {} with hash {}", room.code, card.content_hash),
            Some(card.card_id),
          )
          .await;
        Ok(card)
      }
      CardInsert::NotInRoom => Err(Error::NotInRoom { user: caller.user_id, room: room_id }),
      CardInsert::Duplicate => Err(Error::DuplicateCard { user: caller.user_id, room: room_id }),
    }
  }

  /// The caller's card in `room_id`.
  pub async fn card_for(&self, caller: Caller, room_id: Uuid) -> Result<Card> {
    let owner_id = caller.user_id;
    self
      .retry
      .run("card_for", move || self.store.card_for(room_id, owner_id))
      .await?
      .ok_or(Error::NoCardInRoom { user: owner_id, room: room_id })
  }

  pub async fn list_cards(&self, room_id: Uuid) -> Result<Vec<Card>> {
    self.get_room(room_id).await?;
    self.retry.run("list_cards", move || self.store.list_cards(room_id)).await
  }
}
