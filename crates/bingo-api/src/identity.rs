//! Caller identity, read from headers set by the upstream identity provider.

use axum::{
  extract::FromRequestParts,
  http::{HeaderMap, request::Parts},
};
use bingo_core::identity::{Caller, Role};
use uuid::Uuid;

use crate::error::ApiError;

pub const USER_ID_HEADER: &str = "x-user-id";
pub const ROLE_HEADER: &str = "x-user-role";

/// Extractor for the authenticated [`Caller`].
#[derive(Debug, Clone, Copy)]
pub struct Identity(pub Caller);

/// Read the caller from `headers`.
pub fn caller_from_headers(headers: &HeaderMap) -> Result<Caller, ApiError> {
  let user_id = headers
    .get(USER_ID_HEADER)
    .ok_or(ApiError::Unauthorized("missing x-user-id"))?
    .to_str()
    .ok()
    .and_then(|v| Uuid::parse_str(v).ok())
    .ok_or(ApiError::Unauthorized("malformed x-user-id"))?;

  let role = headers
    .get(ROLE_HEADER)
    .ok_or(ApiError::Unauthorized("missing x-user-role"))?
    .to_str()
    .map_err(|_| ApiError::BadRequest("unreadable x-user-role".into()))?;
  let role: Role = role
    .parse()
    .map_err(|_| ApiError::BadRequest(format!("unknown role {role:?}")))?;

  Ok(Caller::new(user_id, role))
}

impl<St: Send + Sync> FromRequestParts<St> for Identity {
  type Rejection = ApiError;

  async fn from_request_parts(parts: &mut Parts, _state: &St) -> Result<Self, Self::Rejection> {
    caller_from_headers(&parts.headers).map(Identity)
  }
}
