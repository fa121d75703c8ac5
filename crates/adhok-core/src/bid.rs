//! Bids: a talent's hourly-rate offer on an open project.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use uuid::Uuid;

use crate::{Error, Result};

/// `Accepted` and `Rejected` are final.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum BidStatus {
  Pending,
  Accepted,
  #[serde(alias = "outbid")]
  #[strum(to_string = "rejected", serialize = "outbid")]
  Rejected,
}

impl BidStatus {
  pub fn is_final(self) -> bool { self != Self::Pending }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bid {
  pub bid_id:            Uuid,
  pub project_id:        Uuid,
  pub talent_id:         Uuid,
  pub hourly_rate_cents: i64,
  pub status:            BidStatus,
  pub created_at:        DateTime<Utc>,
  pub updated_at:        DateTime<Utc>,
}

/// Input for [`MarketplaceStore::submit_bid`](crate::store::MarketplaceStore::submit_bid).
#[derive(Debug, Clone)]
pub struct NewBid {
  pub project_id:        Uuid,
  pub talent_id:         Uuid,
  pub hourly_rate_cents: i64,
}

impl NewBid {
  pub fn validate(&self) -> Result<()> {
    if self.hourly_rate_cents <= 0 {
      return Err(Error::Invalid(format!(
        "hourly rate must be positive, got {}",
        self.hourly_rate_cents
      )));
    }
    Ok(())
  }
}
