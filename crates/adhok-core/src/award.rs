//! The outcome of a successful bid acceptance.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{bid::Bid, notification::Notification, project::Project};

/// The domain event produced when a client awards a project to a bid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AwardEvent {
  pub project_id:        Uuid,
  pub bid_id:            Uuid,
  pub talent_id:         Uuid,
  pub client_id:         Uuid,
  pub hourly_rate_cents: i64,
  pub at:                DateTime<Utc>,
}

/// Everything the acceptance transaction committed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Award {
  pub event:         AwardEvent,
  /// The project after the transition to `awarded`.
  pub project:       Project,
  /// The accepted bid.
  pub bid:           Bid,
  /// Sibling bids moved to `rejected` by this award.
  pub rejected_bids: Vec<Uuid>,
  pub notifications: Vec<Notification>,
}
