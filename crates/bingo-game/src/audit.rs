//! Audit trail and session history.

use bingo_core::{
  Error, Result,
  audit::{AuditEntry, HistoryRecord},
  identity::Caller,
  store::{GameStore, HistoryInsert},
};
use uuid::Uuid;

use crate::Game;

/// Entries returned by [`Game::list_audit`] when no limit is given.
pub const DEFAULT_AUDIT_LIMIT: usize = 100;

impl<S: GameStore> Game<S> {
  /// Append an audit entry. Called once the mutation it describes has
  /// committed, so a failure here is logged and swallowed.
  pub async fn log_action(&self, actor_id: Uuid, action: String, target_id: Option<Uuid>) {
    let entry = AuditEntry::new(actor_id, action, target_id);
    let result = self
      .retry
      .run("append_audit", move || self.store.append_audit(entry.clone()))
      .await;
    if let Err(e) = result {
      tracing::error!(%actor_id, error = %e, "failed to write audit entry");
    }
  }

  /// Newest entries first. Admins only.
  pub async fn list_audit(&self, caller: Caller, limit: Option<usize>) -> Result<Vec<AuditEntry>> {
    if !caller.role.is_admin() {
      return Err(Error::PermissionDenied("only admins can read the audit log"));
    }
    let limit = limit.unwrap_or(DEFAULT_AUDIT_LIMIT);
    self.retry.run("list_audit", move || self.store.list_audit(limit)).await
  }

  /// Write the history record for a terminated session.
  ///
  /// Idempotent: when a record exists it is returned unchanged.
  pub async fn snapshot_history(&self, session_id: Uuid) -> Result<HistoryRecord> {
    if let Some(existing) =
      self.retry.run("get_history", move || self.store.get_history(session_id)).await?
    {
      return Ok(existing);
    }

    let session = self
      .retry
      .run("get_session", move || self.store.get_session(session_id))
      .await?
      .ok_or(Error::SessionNotFound(session_id))?;
    if session.is_active {
      return Err(Error::SessionActive(session.room_id));
    }
    let room_id = session.room_id;
    let room = self
      .retry
      .run("get_room", move || self.store.get_room(room_id))
      .await?
      .ok_or_else(|| Error::RoomNotFound(room_id.to_string()))?;
    let winning_card = match session.winning_card_id {
      Some(card_id) => self.retry.run("get_card", move || self.store.get_card(card_id)).await?,
      None => None,
    };
    let draws = self.retry.run("list_draws", move || self.store.list_draws(session_id)).await?;

    let record = HistoryRecord::snapshot(&session, &room, winning_card.as_ref(), &draws);
    let pending = &record;
    let inserted = self
      .retry
      .run("insert_history", move || self.store.insert_history(pending.clone()))
      .await?;

    match inserted {
      HistoryInsert::Inserted => {
        tracing::info!(
          %session_id,
          room_code = %record.room_code,
          draws = record.drawn_numbers.len(),
          completed = record.is_completed,
          "history recorded"
        );
        Ok(record)
      }
      HistoryInsert::AlreadyRecorded => self.get_history(session_id).await,
    }
  }

  /// Newest records first.
  pub async fn list_history(&self) -> Result<Vec<HistoryRecord>> {
    self.retry.run("list_history", move || self.store.list_history()).await
  }

  pub async fn get_history(&self, session_id: Uuid) -> Result<HistoryRecord> {
    self
      .retry
      .run("get_history", move || self.store.get_history(session_id))
      .await?
      .ok_or(Error::HistoryNotFound(session_id))
  }

  /// Snapshot after termination; a failure is logged for later repair
  /// through [`Game::snapshot_history`].
  pub(crate) async fn record_history(&self, session_id: Uuid) {
    if let Err(e) = self.snapshot_history(session_id).await {
      tracing::error!(%session_id, error = %e, "failed to snapshot session history");
    }
  }
}
