//! Request-scoped identity.
//!
//! The marketplace never reads identity from ambient state. Whatever
//! resolves the session (an HTTP extractor, a CLI flag, a test) builds an
//! [`Identity`] and passes it into the workflow explicitly.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The user on whose behalf a request acts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
  pub user_id: Uuid,
}

impl Identity {
  pub fn new(user_id: Uuid) -> Self { Self { user_id } }
}
