//! Server configuration, deserialised from `bingo.toml` and `BINGO_*`
//! environment variables.

use std::{path::PathBuf, time::Duration};

use bingo_game::{GameOptions, RetryPolicy};
use serde::Deserialize;

/// Runtime server configuration. Every field has a default.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
  pub host:                String,
  pub port:                u16,
  pub store_path:          PathBuf,
  /// Events a slow subscriber may lag behind before it misses some.
  pub event_buffer:        usize,
  pub retry_attempts:      u32,
  pub retry_base_delay_ms: u64,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:                "127.0.0.1".to_string(),
      port:                8080,
      store_path:          PathBuf::from("bingo.db"),
      event_buffer:        bingo_game::DEFAULT_EVENT_BUFFER,
      retry_attempts:      3,
      retry_base_delay_ms: 25,
    }
  }
}

impl ServerConfig {
  pub fn game_options(&self) -> GameOptions {
    GameOptions {
      event_buffer: self.event_buffer,
      retry:        RetryPolicy {
        max_attempts: self.retry_attempts,
        base_delay:   Duration::from_millis(self.retry_base_delay_ms),
      },
    }
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}
