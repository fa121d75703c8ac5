//! Client tiers and the features they unlock.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use uuid::Uuid;

/// A gated capability. Only recognized keys parse; anything else is an error.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
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
pub enum Feature {
  /// Accept a bid immediately rather than waiting for the bidding window.
  AcceptBid,
}

/// The subscription tier currently recorded for a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientTier {
  pub client_id:       Uuid,
  /// Opaque tier identifier assigned by the payment provider (e.g. `"pro"`).
  pub tier:            String,
  pub features:        Vec<Feature>,
  /// `None` means the tier never lapses.
  pub tier_expires_at: Option<DateTime<Utc>>,
}

impl ClientTier {
  pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
    self.tier_expires_at.is_some_and(|at| at <= now)
  }

  /// An expired tier grants nothing.
  pub fn grants(&self, feature: Feature, now: DateTime<Utc>) -> bool {
    !self.is_expired(now) && self.features.contains(&feature)
  }
}

#[cfg(test)]
mod tests {
  use chrono::Duration;

  use super::*;

  fn tier(expires_in: Option<Duration>) -> ClientTier {
    ClientTier {
      client_id:       Uuid::new_v4(),
      tier:            "pro".into(),
      features:        vec![Feature::AcceptBid],
      tier_expires_at: expires_in.map(|d| Utc::now() + d),
    }
  }

  #[test]
  fn unexpired_tier_grants_listed_feature() {
    assert!(tier(Some(Duration::days(3))).grants(Feature::AcceptBid, Utc::now()));
    assert!(tier(None).grants(Feature::AcceptBid, Utc::now()));
  }

  #[test]
  fn expired_tier_grants_nothing() {
    let t = tier(Some(-Duration::minutes(1)));
    assert!(t.is_expired(Utc::now()));
    assert!(!t.grants(Feature::AcceptBid, Utc::now()));
  }

  #[test]
  fn tier_without_feature_grants_nothing() {
    let mut t = tier(None);
    t.features.clear();
    assert!(!t.grants(Feature::AcceptBid, Utc::now()));
  }

  #[test]
  fn unknown_feature_key_is_rejected() {
    assert_eq!("accept_bid".parse::<Feature>().unwrap(), Feature::AcceptBid);
    assert!("instant_payout".parse::<Feature>().is_err());
  }
}
