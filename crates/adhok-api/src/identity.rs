//! Request-scoped identity extractor.
//!
//! Session handling belongs to the external identity provider, which
//! forwards the resolved user id in a header. This extractor only reads and
//! parses that header; it never consults ambient state.

use adhok_core::{identity::Identity, store::MarketplaceStore};
use axum::{
  extract::FromRequestParts,
  http::{HeaderMap, HeaderName, request::Parts},
};
use uuid::Uuid;

use crate::{AppState, error::ApiError};

/// The header carrying the acting user's id, e.g. `x-adhok-user`.
#[derive(Clone, Debug)]
pub struct IdentityConfig {
  pub header: HeaderName,
}

impl Default for IdentityConfig {
  fn default() -> Self {
    Self {
      header: HeaderName::from_static("x-adhok-user"),
    }
  }
}

/// Resolve the acting user from `headers`.
///
/// A missing header is `Ok(None)`; a present but malformed one is rejected.
pub fn resolve_identity(
  headers: &HeaderMap,
  config: &IdentityConfig,
) -> Result<Option<Identity>, ApiError> {
  let Some(value) = headers.get(&config.header) else {
    return Ok(None);
  };
  let id = value
    .to_str()
    .ok()
    .and_then(|s| Uuid::parse_str(s.trim()).ok())
    .ok_or_else(|| ApiError::Unauthorized(format!("malformed {} header", config.header)))?;
  Ok(Some(Identity::new(id)))
}

/// The acting user, if the request carried one.
pub struct Actor(pub Option<Identity>);

impl Actor {
  /// The identity, or 401.
  pub fn require(self) -> Result<Identity, ApiError> {
    self
      .0
      .ok_or_else(|| ApiError::Unauthorized("no acting user".into()))
  }
}

impl<S> FromRequestParts<AppState<S>> for Actor
where
  S: MarketplaceStore,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    resolve_identity(&parts.headers, &state.identity).map(Actor)
  }
}
