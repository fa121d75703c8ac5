//! Users: the clients who post projects and the talent who bid on them.
//!
//! Identity proofing lives with the external identity provider; this module
//! only records what the marketplace needs to know about an account.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use uuid::Uuid;

/// Which side of the marketplace an account is on.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Role {
  Client,
  Talent,
}

/// Qualification badge held by talent and required by projects.
///
/// Variants are declared in ascending order so the derived `Ord` compares
/// badges by rank.
#[derive(
  Debug,
  Clone,
  Copy,
  Default,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Badge {
  #[default]
  None,
  Bronze,
  Silver,
  Gold,
}

impl Badge {
  /// Whether a holder of `self` meets a requirement of `required`.
  pub fn satisfies(self, required: Badge) -> bool { self >= required }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
  pub user_id:      Uuid,
  pub role:         Role,
  pub display_name: String,
  pub badge:        Badge,
  pub created_at:   DateTime<Utc>,
}

impl User {
  pub fn is_client(&self) -> bool { self.role == Role::Client }

  pub fn is_talent(&self) -> bool { self.role == Role::Talent }
}

/// Input for [`MarketplaceStore::add_user`](crate::store::MarketplaceStore::add_user).
#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
  pub role:         Role,
  pub display_name: String,
  #[serde(default)]
  pub badge:        Badge,
}
