//! Caller identity as handed over by the external identity provider.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;

/// The closed set of roles a caller may hold.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
  Admin,
  Host,
  Player,
}

impl Role {
  /// Whether this role may open new rooms.
  pub fn can_create_rooms(self) -> bool {
    match self {
      Self::Admin | Self::Host => true,
      Self::Player => false,
    }
  }

  /// Whether this role overrides room ownership for session control.
  pub fn is_admin(self) -> bool {
    match self {
      Self::Admin => true,
      Self::Host | Self::Player => false,
    }
  }
}

/// An authenticated caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Caller {
  pub user_id: Uuid,
  pub role:    Role,
}

impl Caller {
  pub fn new(user_id: Uuid, role: Role) -> Self { Self { user_id, role } }

  /// Room creator or admin: the callers allowed to run a room's session.
  pub fn controls(&self, created_by: Uuid) -> bool {
    self.user_id == created_by || self.role.is_admin()
  }
}
