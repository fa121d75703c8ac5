//! Notifications and the emitter that derives them from domain events.
//!
//! Notifications are append-only. The single permitted mutation is flipping
//! `read` to `true`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use uuid::Uuid;

use crate::award::AwardEvent;

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum NotificationKind {
  /// Client-facing: "you accepted a bid".
  BidAcceptConfirmed,
  /// Talent-facing: "your bid was accepted".
  BidAccepted,
}

/// Structured payload attached to a notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NotificationPayload {
  BidAccepted {
    project_id: Uuid,
    bid_id:     Uuid,
    talent_id:  Uuid,
    client_id:  Uuid,
  },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
  pub notification_id: Uuid,
  pub user_id:         Uuid,
  pub kind:            NotificationKind,
  pub message:         String,
  pub payload:         NotificationPayload,
  pub read:            bool,
  pub created_at:      DateTime<Utc>,
}

/// A notification that has not been persisted yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNotification {
  pub user_id: Uuid,
  pub kind:    NotificationKind,
  pub message: String,
  pub payload: NotificationPayload,
}

/// Build one notification per party affected by an award: the client first,
/// then the talent.
pub fn notifications_for(event: &AwardEvent, project_title: &str) -> [NewNotification; 2] {
  let payload = NotificationPayload::BidAccepted {
    project_id: event.project_id,
    bid_id:     event.bid_id,
    talent_id:  event.talent_id,
    client_id:  event.client_id,
  };

  [
    NewNotification {
      user_id: event.client_id,
      kind:    NotificationKind::BidAcceptConfirmed,
      message: format!("You accepted a bid on \"{project_title}\""),
      payload: payload.clone(),
    },
    NewNotification {
      user_id: event.talent_id,
      kind:    NotificationKind::BidAccepted,
      message: format!("Your bid on \"{project_title}\" was accepted"),
      payload,
    },
  ]
}
