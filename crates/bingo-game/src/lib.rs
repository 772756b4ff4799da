//! Game-session coordination on top of a [`GameStore`].
//!
//! [`Game`] exposes one async method per operation: room lifecycle, card
//! generation, drawing, win validation and the audit/history trail. It checks
//! permissions, calls the store's atomic primitives, records the audit entry
//! once a mutation commits, and publishes [`GameEvent`]s to subscribers.
//!
//! ```rust,ignore
//! let game = Game::new(SqliteStore::open("bingo.db").await?);
//! let room = game.create_room(host).await?;
//! ```

mod audit;
mod cards;
mod draws;
mod retry;
mod rooms;
mod validate;

use std::sync::Arc;

use bingo_core::{event::GameEvent, store::GameStore};
use tokio::sync::broadcast;

pub use retry::RetryPolicy;
pub use rooms::RoomLeft;
pub use validate::BingoWin;

/// Default number of events a lagging subscriber may fall behind by.
pub const DEFAULT_EVENT_BUFFER: usize = 256;

/// Tunables for a [`Game`].
#[derive(Debug, Clone, Copy)]
pub struct GameOptions {
  pub event_buffer: usize,
  pub retry:        RetryPolicy,
}

impl Default for GameOptions {
  fn default() -> Self {
    Self { event_buffer: DEFAULT_EVENT_BUFFER, retry: RetryPolicy::default() }
  }
}

/// The game coordinator. Cloning shares the store and the event channel.
pub struct Game<S> {
  store:  Arc<S>,
  events: broadcast::Sender<GameEvent>,
  retry:  RetryPolicy,
}

impl<S> Clone for Game<S> {
  fn clone(&self) -> Self {
    Self {
      store:  Arc::clone(&self.store),
      events: self.events.clone(),
      retry:  self.retry,
    }
  }
}

impl<S: GameStore> Game<S> {
  pub fn new(store: S) -> Self { Self::with_options(store, GameOptions::default()) }

  pub fn with_options(store: S, options: GameOptions) -> Self {
    let (events, _) = broadcast::channel(options.event_buffer.max(1));
    Self { store: Arc::new(store), events, retry: options.retry }
  }

  /// A receiver for every event published after this call.
  pub fn subscribe(&self) -> broadcast::Receiver<GameEvent> { self.events.subscribe() }

  fn publish(&self, event: GameEvent) {
    tracing::debug!(
      room_code = %event.room_code,
      event_type = event.payload.event_type(),
      "publishing event"
    );
    // An error only means nobody is listening.
    let _ = self.events.send(event);
  }
}

#[cfg(test)]
mod tests;
